// Error types for ID3v2 reading and writing

use thiserror::Error;

/// Result type alias using `Id3Error`
pub type Result<T> = std::result::Result<T, Id3Error>;

/// ID3v2 error types
#[derive(Error, Debug)]
pub enum Id3Error {
    /// Filesystem-level failure
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The file does not start with an "ID3" header
    #[error("Not an ID3v2 file")]
    NotAnId3File,

    /// Major version other than 2, 3 or 4
    #[error("Unsupported ID3v2 version 2.{0}")]
    UnsupportedVersion(u8),

    /// Valid tag that uses a feature this crate cannot represent
    #[error("Unsupported ID3v2 feature: {0}")]
    UnsupportedFeature(&'static str),

    /// Header or frame decoding failed at `offset` bytes into the tag
    #[error("Malformed tag at offset {offset}: {source}")]
    MalformedTag {
        offset: usize,
        #[source]
        source: Box<Id3Error>,
    },

    /// The file ends before the declared tag size
    #[error("Tag truncated: declares {declared} bytes, file holds {available}")]
    TruncatedTag { declared: usize, available: usize },

    /// A frame declares more bytes than remain in the tag
    #[error("Frame {id} truncated: declares {declared} bytes, {available} remain")]
    TruncatedFrame {
        id: String,
        declared: usize,
        available: usize,
    },

    /// Frame identifier bytes are not uppercase ASCII letters or digits
    #[error("Invalid frame id {}", String::from_utf8_lossy(.0))]
    InvalidFrameId(Vec<u8>),

    /// Text setter called with an id that is not a plain text frame
    #[error("{0} is not a text frame")]
    NotATextFrame(String),

    /// A synchsafe integer has a byte with its top bit set
    #[error("Malformed synchsafe size {0:02X?}")]
    MalformedSize([u8; 4]),

    /// A size does not fit in its on-disk field
    #[error("Value {0} too large for size field")]
    ValueTooLarge(u64),

    /// Null or released handle passed through the C ABI
    #[error("Invalid tag handle")]
    InvalidHandle,
}

impl Id3Error {
    /// Wrap a decoding failure with the offset where it happened.
    ///
    /// I/O failures and a missing signature pass through unchanged.
    pub fn at(self, offset: usize) -> Self {
        match self {
            Id3Error::Io(_) | Id3Error::NotAnId3File | Id3Error::MalformedTag { .. } => self,
            other => Id3Error::MalformedTag {
                offset,
                source: Box::new(other),
            },
        }
    }

    /// Stable status code for the C ABI; always negative
    pub fn code(&self) -> i32 {
        match self {
            Id3Error::Io(_) => -1,
            Id3Error::NotAnId3File => -2,
            Id3Error::MalformedTag { .. }
            | Id3Error::UnsupportedVersion(_)
            | Id3Error::UnsupportedFeature(_)
            | Id3Error::TruncatedTag { .. } => -3,
            Id3Error::TruncatedFrame { .. } => -4,
            Id3Error::InvalidFrameId(_) | Id3Error::NotATextFrame(_) => -5,
            Id3Error::MalformedSize(_) => -6,
            Id3Error::ValueTooLarge(_) => -7,
            Id3Error::InvalidHandle => -8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_wrapping() {
        let err = Id3Error::InvalidFrameId(b"ab!c".to_vec()).at(42);
        match &err {
            Id3Error::MalformedTag { offset, source } => {
                assert_eq!(*offset, 42);
                assert!(matches!(**source, Id3Error::InvalidFrameId(_)));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(err.to_string(), "Malformed tag at offset 42: Invalid frame id ab!c");

        // already positioned errors keep their innermost offset
        assert!(matches!(err.at(7), Id3Error::MalformedTag { offset: 42, .. }));
        assert!(matches!(Id3Error::NotAnId3File.at(0), Id3Error::NotAnId3File));
    }

    #[test]
    fn test_status_codes_are_negative() {
        let errors = [
            Id3Error::NotAnId3File,
            Id3Error::ValueTooLarge(1 << 28),
            Id3Error::InvalidHandle,
            Id3Error::MalformedSize([0x80, 0, 0, 0]),
        ];
        for err in &errors {
            assert!(err.code() < 0);
        }
        assert_eq!(Id3Error::InvalidHandle.code(), -8);
    }
}
