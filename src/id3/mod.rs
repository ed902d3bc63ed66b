// ID3v2 tag handling module
pub mod attached;
pub mod frame;
pub mod frames;
pub mod header;
pub mod popm;
pub mod reader;
pub mod synchsafe;
pub mod tag;
pub mod unsync;
pub mod writer;

pub use attached::{AttachedPicture, EncapsulatedObject, PictureType};
pub use frame::{decode_frame, encode_frame, Frame, FrameFlags};
pub use header::{TagHeader, Version};
pub use popm::{decode_popm, encode_popm, PopularityFrame};
pub use synchsafe::{decode_synchsafe, encode_synchsafe, SYNCHSAFE_MAX};
pub use tag::{FrameKey, Tag};
pub use writer::{FileSplice, WriteOptions, DEFAULT_PADDING};
