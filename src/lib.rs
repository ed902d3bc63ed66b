//! id3rs - ID3v2 tag reader/writer
//!
//! Reads the ID3v2 tag at the start of a file into an owned [`Tag`], lets the
//! caller set per-user popularity (POPM) ratings, and writes the tag back
//! while preserving every other frame and the audio payload byte for byte.
//!
//! ```rust,no_run
//! use id3rs::Tag;
//!
//! # fn main() -> id3rs::Result<()> {
//! let mut tag = Tag::read("song.mp3")?;
//! tag.set_popularity("someone@example.com", 196);
//! tag.write_to("song.mp3")?;
//! # Ok(())
//! # }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub mod error;
pub mod ffi;
pub mod id3;
pub mod utils;

pub use error::{Id3Error, Result};
pub use id3::frames::frame_ids;
pub use id3::{
    AttachedPicture, EncapsulatedObject, Frame, FrameFlags, FrameKey, PictureType,
    PopularityFrame, Tag, TagHeader, Version, WriteOptions,
};

/// Check whether a file starts with an ID3v2 signature
pub fn has_id3v2<P: AsRef<Path>>(path: P) -> Result<bool> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    Ok(utils::io::check_signature(&mut reader, &TagHeader::ID)?)
}
