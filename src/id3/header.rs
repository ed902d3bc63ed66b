// ID3v2 tag header: "ID3", major, revision, flags, synchsafe size

use std::fmt;
use std::io::Read;

use serde::Serialize;

use crate::error::{Id3Error, Result};
use crate::id3::synchsafe::{decode_synchsafe, encode_synchsafe};

/// Tag header flag bits
pub mod flags {
    pub const UNSYNCHRONISATION: u8 = 0x80;
    /// Extended header in v2.3/v2.4
    pub const EXTENDED_HEADER: u8 = 0x40;
    /// Same bit as `EXTENDED_HEADER`, but means compression in v2.2
    pub const COMPRESSION: u8 = 0x40;
    pub const EXPERIMENTAL: u8 = 0x20;
    /// v2.4 only
    pub const FOOTER: u8 = 0x10;
}

/// Supported ID3v2 major versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Version {
    V22,
    V23,
    V24,
}

impl Version {
    /// Map the major version byte; anything but 2, 3 or 4 is refused
    pub fn from_major(major: u8) -> Result<Self> {
        match major {
            2 => Ok(Version::V22),
            3 => Ok(Version::V23),
            4 => Ok(Version::V24),
            other => Err(Id3Error::UnsupportedVersion(other)),
        }
    }

    pub fn major(self) -> u8 {
        match self {
            Version::V22 => 2,
            Version::V23 => 3,
            Version::V24 => 4,
        }
    }

    /// Length of a frame identifier
    pub fn id_len(self) -> usize {
        match self {
            Version::V22 => 3,
            Version::V23 | Version::V24 => 4,
        }
    }

    /// Length of a frame header (id + size + flags)
    pub fn frame_header_len(self) -> usize {
        match self {
            Version::V22 => 6,
            Version::V23 | Version::V24 => 10,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "2.{}", self.major())
    }
}

/// ID3v2 header structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    pub version: Version,
    pub revision: u8,
    pub flags: u8,
    /// Tag size excluding this 10-byte header (and the footer, if any)
    pub size: u32,
}

impl TagHeader {
    pub const SIZE: usize = 10;
    pub const ID: [u8; 3] = [b'I', b'D', b'3'];

    /// Read ID3v2 header from reader
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buffer = [0u8; Self::SIZE];
        match reader.read_exact(&mut buffer) {
            Ok(()) => {}
            // too short to even hold a header
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(Id3Error::NotAnId3File)
            }
            Err(e) => return Err(e.into()),
        }
        Self::parse(&buffer)
    }

    /// Parse the 10 header bytes
    pub fn parse(buffer: &[u8; Self::SIZE]) -> Result<Self> {
        if buffer[0..3] != Self::ID {
            return Err(Id3Error::NotAnId3File);
        }

        let version = Version::from_major(buffer[3]).map_err(|e| e.at(3))?;
        let size = decode_synchsafe([buffer[6], buffer[7], buffer[8], buffer[9]])
            .map_err(|e| e.at(6))?;

        Ok(TagHeader {
            version,
            revision: buffer[4],
            flags: buffer[5],
            size,
        })
    }

    /// Encode the header; `size` must be synchsafe-representable
    pub fn to_bytes(&self) -> Result<[u8; Self::SIZE]> {
        let size = encode_synchsafe(self.size)?;
        Ok([
            b'I',
            b'D',
            b'3',
            self.version.major(),
            self.revision,
            self.flags,
            size[0],
            size[1],
            size[2],
            size[3],
        ])
    }

    pub fn unsynchronised(&self) -> bool {
        self.flags & flags::UNSYNCHRONISATION != 0
    }

    pub fn has_extended_header(&self) -> bool {
        self.version != Version::V22 && self.flags & flags::EXTENDED_HEADER != 0
    }

    pub fn compressed(&self) -> bool {
        self.version == Version::V22 && self.flags & flags::COMPRESSION != 0
    }

    pub fn experimental(&self) -> bool {
        self.flags & flags::EXPERIMENTAL != 0
    }

    pub fn has_footer(&self) -> bool {
        self.version == Version::V24 && self.flags & flags::FOOTER != 0
    }

    /// Bytes the whole tag occupies at the start of the file
    pub fn region_len(&self) -> usize {
        let footer = if self.has_footer() { Self::SIZE } else { 0 };
        Self::SIZE + self.size as usize + footer
    }
}

/// Length of the extended header at the start of `body`, including its
/// own size field.
pub fn extended_header_len(version: Version, body: &[u8]) -> Result<usize> {
    if body.len() < 4 {
        return Err(Id3Error::TruncatedTag {
            declared: 4,
            available: body.len(),
        });
    }
    let size_bytes = [body[0], body[1], body[2], body[3]];

    let len = match version {
        // v2.3 size excludes the size field itself
        Version::V23 => u32::from_be_bytes(size_bytes) as usize + 4,
        // v2.4 size is synchsafe and covers the whole extended header
        Version::V24 => decode_synchsafe(size_bytes)? as usize,
        Version::V22 => return Err(Id3Error::UnsupportedFeature("v2.2 extended header")),
    };

    if len > body.len() || len < 4 {
        return Err(Id3Error::TruncatedTag {
            declared: len,
            available: body.len(),
        });
    }
    Ok(len)
}
