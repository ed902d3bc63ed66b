// Tag reader: header, then frames until the declared size or padding

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;

use crate::error::{Id3Error, Result};
use crate::id3::frame::{decode_frame, Frame};
use crate::id3::header::{extended_header_len, TagHeader, Version};
use crate::id3::tag::Tag;
use crate::id3::unsync;
use crate::utils::io::read_up_to;

impl Tag {
    /// Read the ID3v2 tag at the start of the file at `path`.
    ///
    /// The file is closed before returning. The tag remembers `path` as its
    /// source, whose audio payload a later write places behind the tag.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading tag from {}", path.display());
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let source = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Ok(Self::read_from(&mut reader)?.with_source(source))
    }

    /// Read an ID3v2 tag from the current position of `reader`
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let header = TagHeader::read(reader)?;
        debug!(
            "ID3v{}.{} flags {:#04x} tag size {}",
            header.version, header.revision, header.flags, header.size
        );

        if header.compressed() {
            return Err(Id3Error::UnsupportedFeature("v2.2 tag compression").at(5));
        }

        let declared = header.size as usize;
        let body = read_up_to(reader, declared)?;
        if body.len() < declared {
            return Err(Id3Error::TruncatedTag {
                declared,
                available: body.len(),
            }
            .at(TagHeader::SIZE));
        }

        // v2.4 unsynchronises per frame instead
        let body = if header.unsynchronised() && header.version != Version::V24 {
            unsync::decode(&body)
        } else {
            body
        };

        let start = if header.has_extended_header() {
            let len = extended_header_len(header.version, &body).map_err(|e| e.at(TagHeader::SIZE))?;
            debug!("Skipping {} byte extended header", len);
            len
        } else {
            0
        };

        let (frames, padding) = parse_frames(&body, start, header.version)?;
        debug!("Read {} frames, {} bytes of padding", frames.len(), padding);

        Ok(Tag::from_parts(header, frames, padding))
    }
}

/// Decode frames from `body` starting at `start` until the body is exhausted
/// or padding begins. Returns the frames and the number of padding bytes.
pub fn parse_frames(body: &[u8], start: usize, version: Version) -> Result<(Vec<Frame>, usize)> {
    let mut frames = Vec::new();
    let mut offset = start;

    while let Some((frame, consumed)) =
        decode_frame(body, offset, version).map_err(|e| e.at(TagHeader::SIZE + offset))?
    {
        debug!("frame {} {} bytes at {}", frame.id, frame.data.len(), offset);
        frames.push(frame);
        offset += consumed;
    }

    Ok((frames, body.len().saturating_sub(offset)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(bytes: &[u8]) -> Result<Tag> {
        Tag::read_from(&mut Cursor::new(bytes.to_vec()))
    }

    #[test]
    fn test_reads_single_popm() {
        let tag = read(b"ID3\x04\x00\x00\x00\x00\x00\x10POPM\x00\x00\x00\x06\x00\x00a@b\x00\xC8").unwrap();
        assert_eq!(tag.version(), Version::V24);
        assert_eq!(tag.len(), 1);
        assert_eq!(tag.padding(), 0);
        let popm = tag.popularity("a@b").unwrap();
        assert_eq!(popm.rating, 200);
        assert_eq!(popm.play_count, None);
    }

    #[test]
    fn test_padding_ends_frames() {
        let mut bytes = b"ID3\x03\x00\x00\x00\x00\x00\x1CTIT2\x00\x00\x00\x02\x00\x00\x00x".to_vec();
        bytes.extend([0u8; 16]);
        let tag = read(&bytes).unwrap();
        assert_eq!(tag.len(), 1);
        assert_eq!(tag.padding(), 16);
        assert_eq!(tag.title().as_deref(), Some("x"));
    }

    #[test]
    fn test_not_id3() {
        assert!(matches!(read(b"\xFF\xFB\x90\x00 mpeg audio"), Err(Id3Error::NotAnId3File)));
        assert!(matches!(read(b""), Err(Id3Error::NotAnId3File)));
    }

    #[test]
    fn test_truncated_tag() {
        let err = read(b"ID3\x04\x00\x00\x00\x00\x01\x00POPM").unwrap_err();
        assert!(matches!(err, Id3Error::MalformedTag { offset: 10, .. }));
    }

    #[test]
    fn test_frame_overrunning_tag_is_malformed() {
        let err = read(b"ID3\x04\x00\x00\x00\x00\x00\x0CPOPM\x00\x00\x00\x06\x00\x00a@").unwrap_err();
        match err {
            Id3Error::MalformedTag { offset, source } => {
                assert_eq!(offset, 10);
                assert!(matches!(*source, Id3Error::TruncatedFrame { declared: 6, available: 2, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_second_frame_reports_offset() {
        let err = read(b"ID3\x03\x00\x00\x00\x00\x00\x15TIT2\x00\x00\x00\x01\x00\x00\x00tit2\x00\x00\x00\x00\x00\x00")
            .unwrap_err();
        assert!(matches!(err, Id3Error::MalformedTag { offset: 21, .. }));
    }

    #[test]
    fn test_unsynchronised_v23_tag() {
        // PRIV payload 0xFF 0xE0 stored as 0xFF 0x00 0xE0
        let tag = read(b"ID3\x03\x00\x80\x00\x00\x00\x0DPRIV\x00\x00\x00\x02\x00\x00\xFF\x00\xE0").unwrap();
        assert_eq!(tag.frames()[0].data, vec![0xFF, 0xE0]);
    }

    #[test]
    fn test_skips_extended_header() {
        let tag = read(
            b"ID3\x03\x00\x40\x00\x00\x00\x14\x00\x00\x00\x06\x00\x00\x00\x00\x00\x00TIT2\x00\x00\x00\x00\x00\x00",
        )
        .unwrap();
        assert_eq!(tag.len(), 1);
        assert_eq!(tag.frames()[0].id, "TIT2");
    }

    #[test]
    fn test_v22_tag() {
        let tag = read(b"ID3\x02\x00\x00\x00\x00\x00\x0BTT2\x00\x00\x05\x00Tink").unwrap();
        assert_eq!(tag.version(), Version::V22);
        assert_eq!(tag.title().as_deref(), Some("Tink"));
    }

    #[test]
    fn test_v22_compression_rejected() {
        let err = read(b"ID3\x02\x00\x40\x00\x00\x00\x00").unwrap_err();
        assert!(matches!(err, Id3Error::MalformedTag { offset: 5, .. }));
    }
}
