// ID3v2 frames: header decoding and encoding, payloads kept opaque

use std::borrow::Cow;

use serde::Serialize;

use crate::error::{Id3Error, Result};
use crate::id3::header::Version;
use crate::id3::synchsafe::{decode_synchsafe, encode_synchsafe};
use crate::id3::unsync;

/// Frame header flags, interpreted against the tag version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FrameFlags(pub u16);

impl FrameFlags {
    pub fn grouped(self, version: Version) -> bool {
        match version {
            Version::V22 => false,
            Version::V23 => self.0 & 0x0020 != 0,
            Version::V24 => self.0 & 0x0040 != 0,
        }
    }

    pub fn compressed(self, version: Version) -> bool {
        match version {
            Version::V22 => false,
            Version::V23 => self.0 & 0x0080 != 0,
            Version::V24 => self.0 & 0x0008 != 0,
        }
    }

    pub fn encrypted(self, version: Version) -> bool {
        match version {
            Version::V22 => false,
            Version::V23 => self.0 & 0x0040 != 0,
            Version::V24 => self.0 & 0x0004 != 0,
        }
    }

    /// v2.4 only; earlier versions unsynchronise the whole tag instead
    pub fn unsynchronised(self, version: Version) -> bool {
        version == Version::V24 && self.0 & 0x0002 != 0
    }

    /// v2.4 data length indicator
    pub fn has_data_length(self, version: Version) -> bool {
        version == Version::V24 && self.0 & 0x0001 != 0
    }

    /// Keep only the status bits (tag/file alter preservation, read-only)
    pub fn status_only(self) -> FrameFlags {
        FrameFlags(self.0 & 0xFF00)
    }
}

/// ID3v2 frame structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub id: String,
    pub flags: FrameFlags,
    /// Payload exactly as stored after the frame header
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(id: impl Into<String>, data: Vec<u8>) -> Self {
        Frame {
            id: id.into(),
            flags: FrameFlags::default(),
            data,
        }
    }

    /// Bytes this frame occupies once encoded, header included
    pub fn encoded_len(&self, version: Version) -> usize {
        version.frame_header_len() + self.data.len()
    }

    /// Interpretable frame content.
    ///
    /// Strips the grouping byte and data length indicator and removes
    /// unsynchronisation. Returns `None` for compressed or encrypted frames,
    /// which stay opaque.
    pub fn content(&self, version: Version) -> Option<Cow<'_, [u8]>> {
        if self.flags.compressed(version) || self.flags.encrypted(version) {
            return None;
        }

        let mut skip = 0;
        if self.flags.grouped(version) {
            skip += 1;
        }
        if self.flags.has_data_length(version) {
            skip += 4;
        }
        let body = self.data.get(skip..)?;

        if self.flags.unsynchronised(version) {
            Some(Cow::Owned(unsync::decode(body)))
        } else {
            Some(Cow::Borrowed(body))
        }
    }
}

fn is_id_byte(byte: u8) -> bool {
    byte.is_ascii_uppercase() || byte.is_ascii_digit()
}

/// Check a frame id against the version's id length and character set
pub fn validate_id(id: &[u8], version: Version) -> Result<()> {
    if id.len() != version.id_len() || !id.iter().copied().all(is_id_byte) {
        return Err(Id3Error::InvalidFrameId(id.to_vec()));
    }
    Ok(())
}

/// Decode one frame starting at `offset` in the tag body.
///
/// Returns `None` when `offset` reaches the end of the body or the start of
/// padding (a zero byte where a frame id would begin). On success also
/// returns the number of bytes consumed, header included.
pub fn decode_frame(buffer: &[u8], offset: usize, version: Version) -> Result<Option<(Frame, usize)>> {
    let rest = buffer.get(offset..).unwrap_or(&[]);
    if rest.first().map_or(true, |&b| b == 0) {
        return Ok(None);
    }

    let header_len = version.frame_header_len();
    let id_len = version.id_len();
    if rest.len() < header_len {
        return Err(Id3Error::TruncatedFrame {
            id: String::from_utf8_lossy(&rest[..rest.len().min(id_len)]).into_owned(),
            declared: header_len,
            available: rest.len(),
        });
    }

    let id_bytes = &rest[..id_len];
    validate_id(id_bytes, version)?;
    // validated as ASCII above
    let id = String::from_utf8_lossy(id_bytes).into_owned();

    // Frame size parsing depends on version
    let (size, flags) = match version {
        Version::V22 => {
            let size = ((rest[3] as usize) << 16) | ((rest[4] as usize) << 8) | (rest[5] as usize);
            (size, FrameFlags::default())
        }
        Version::V23 => {
            let size = u32::from_be_bytes([rest[4], rest[5], rest[6], rest[7]]) as usize;
            (size, FrameFlags(u16::from_be_bytes([rest[8], rest[9]])))
        }
        Version::V24 => {
            let size = decode_synchsafe([rest[4], rest[5], rest[6], rest[7]])? as usize;
            (size, FrameFlags(u16::from_be_bytes([rest[8], rest[9]])))
        }
    };

    let available = rest.len() - header_len;
    if size > available {
        return Err(Id3Error::TruncatedFrame {
            id,
            declared: size,
            available,
        });
    }

    let data = rest[header_len..header_len + size].to_vec();
    Ok(Some((Frame { id, flags, data }, header_len + size)))
}

/// Append the encoded frame (header + payload) to `out`
pub fn encode_frame(frame: &Frame, version: Version, out: &mut Vec<u8>) -> Result<()> {
    validate_id(frame.id.as_bytes(), version)?;
    let size = frame.data.len();

    out.extend_from_slice(frame.id.as_bytes());
    match version {
        Version::V22 => {
            if size > 0x00FF_FFFF {
                return Err(Id3Error::ValueTooLarge(size as u64));
            }
            out.extend_from_slice(&(size as u32).to_be_bytes()[1..]);
        }
        Version::V23 => {
            let size = u32::try_from(size).map_err(|_| Id3Error::ValueTooLarge(size as u64))?;
            out.extend_from_slice(&size.to_be_bytes());
            out.extend_from_slice(&frame.flags.0.to_be_bytes());
        }
        Version::V24 => {
            let size = u32::try_from(size).map_err(|_| Id3Error::ValueTooLarge(size as u64))?;
            out.extend_from_slice(&encode_synchsafe(size)?);
            out.extend_from_slice(&frame.flags.0.to_be_bytes());
        }
    }
    out.extend_from_slice(&frame.data);

    Ok(())
}
