// Unsynchronisation removal
//
// An unsynchronised buffer has a 0x00 inserted after every 0xFF that would
// otherwise start a false MPEG sync. Reading drops those inserted zeros.
// The writer never unsynchronises, so there is no encoding counterpart.

/// Remove unsynchronisation: every `0xFF 0x00` pair becomes `0xFF`.
pub fn decode(content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len());
    let mut after_ff = false;

    for &byte in content {
        if after_ff && byte == 0x00 {
            after_ff = false;
            continue;
        }
        out.push(byte);
        after_ff = byte == 0xFF;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_inserted_zero() {
        assert_eq!(decode(&[0xFF, 0x00, 0xE0]), vec![0xFF, 0xE0]);
        assert_eq!(decode(&[0x01, 0xFF, 0x00, 0x00]), vec![0x01, 0xFF, 0x00]);
    }

    #[test]
    fn test_plain_content_untouched() {
        let plain = [0x00, 0x12, 0xFE, 0x00, 0xFF];
        assert_eq!(decode(&plain), plain.to_vec());
    }

    #[test]
    fn test_consecutive_markers() {
        assert_eq!(decode(&[0xFF, 0x00, 0xFF, 0x00]), vec![0xFF, 0xFF]);
    }
}
