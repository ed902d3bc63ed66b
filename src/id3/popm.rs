// Popularimeter (POPM) frames: per-user rating and optional play counter

use log::{debug, warn};
use serde::Serialize;

use crate::error::{Id3Error, Result};
use crate::id3::frame::Frame;
use crate::id3::header::Version;
use crate::id3::tag::{FrameKey, Tag};
use crate::utils::encoding::{decode_latin1, encode_latin1, split_terminated, TextEncoding};

/// Popularimeter frame id for the given version ("POP" in v2.2)
pub fn frame_id(version: Version) -> &'static str {
    match version {
        Version::V22 => "POP",
        Version::V23 | Version::V24 => "POPM",
    }
}

/// Decoded view of a POPM frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopularityFrame {
    /// Identifying email/user string, Latin-1
    pub email: String,
    /// Stored verbatim, no star mapping
    pub rating: u8,
    pub play_count: Option<u64>,
}

/// Decode a POPM payload: Latin-1 identifier, NUL, rating byte, optional
/// big-endian play counter.
pub fn decode_popm(payload: &[u8]) -> Result<PopularityFrame> {
    let (email, rest) = split_terminated(payload, TextEncoding::Iso8859_1).ok_or_else(|| {
        Id3Error::TruncatedFrame {
            id: "POPM".to_string(),
            declared: payload.len() + 2,
            available: payload.len(),
        }
    })?;

    let (&rating, counter) = rest.split_first().ok_or(Id3Error::TruncatedFrame {
        id: "POPM".to_string(),
        declared: email.len() + 2,
        available: payload.len(),
    })?;

    Ok(PopularityFrame {
        email: decode_latin1(email),
        rating,
        play_count: decode_counter(counter),
    })
}

fn decode_counter(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() {
        return None;
    }

    let significant = match bytes.iter().position(|&b| b != 0) {
        Some(start) => &bytes[start..],
        None => return Some(0),
    };
    if significant.len() > 8 {
        warn!("POPM play counter of {} bytes saturated", bytes.len());
        return Some(u64::MAX);
    }

    Some(significant.iter().fold(0u64, |acc, &b| acc << 8 | b as u64))
}

/// Encode a POPM payload. An absent play counter is omitted entirely;
/// a present one takes at least 4 bytes.
pub fn encode_popm(frame: &PopularityFrame) -> Vec<u8> {
    let mut payload = encode_latin1(&frame.email);
    payload.push(0);
    payload.push(frame.rating);

    if let Some(count) = frame.play_count {
        let bytes = count.to_be_bytes();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len()).min(4);
        payload.extend_from_slice(&bytes[start..]);
    }

    payload
}

/// Identifier bytes of a POPM frame, if its content can be read
pub(crate) fn identifier_bytes(frame: &Frame, version: Version) -> Option<Vec<u8>> {
    let content = frame.content(version)?;
    let (email, _) = split_terminated(&content, TextEncoding::Iso8859_1)?;
    Some(email.to_vec())
}

impl Tag {
    /// Popularity entry for `email`, exact match
    pub fn popularity(&self, email: &str) -> Option<PopularityFrame> {
        let key = popm_key(self.version(), stored_identifier(&encode_latin1(email)));
        let frame = &self.frames()[self.position(&key)?];
        decode_popm(&frame.content(self.version())?).ok()
    }

    /// Every decodable popularity entry in tag order
    pub fn popularities(&self) -> Vec<PopularityFrame> {
        let version = self.version();
        self.get_all(frame_id(version))
            .filter_map(|frame| match frame.content(version) {
                Some(content) => decode_popm(&content).ok(),
                None => {
                    warn!("Skipping compressed or encrypted {} frame", frame.id);
                    None
                }
            })
            .collect()
    }

    /// Set the rating for `email`.
    ///
    /// Characters outside Latin-1 are stored as `?`. See
    /// [`Tag::set_popularity_bytes`].
    pub fn set_popularity(&mut self, email: &str, rating: u8) {
        self.set_popularity_bytes(&encode_latin1(email), rating);
    }

    /// Set the rating for the identifier `email`, compared byte for byte.
    ///
    /// A matching frame keeps its position and play counter; otherwise a
    /// new frame without a play counter is appended. The identifier is
    /// NUL-terminated on disk, so anything from its first NUL on is dropped.
    pub fn set_popularity_bytes(&mut self, email: &[u8], rating: u8) {
        let version = self.version();
        let email = stored_identifier(email);
        let key = popm_key(version, email);

        let Some(pos) = self.position(&key) else {
            debug!("Appending {} for {:?}", key.id, String::from_utf8_lossy(email));
            let frame = PopularityFrame {
                email: decode_latin1(email),
                rating,
                play_count: None,
            };
            self.push(Frame::new(key.id, encode_popm(&frame)));
            return;
        };

        let mut frame = self.frames()[pos].clone();
        let rating_at = email.len() + 1;

        if frame.flags.status_only() == frame.flags {
            // plain payload: patch the rating byte, counter bytes untouched
            if rating_at < frame.data.len() {
                frame.data[rating_at] = rating;
            } else {
                frame.data.truncate(rating_at);
                frame.data.push(rating);
            }
        } else {
            // grouped or unsynchronised: re-encode the content plainly
            let play_count = frame
                .content(version)
                .and_then(|content| decode_popm(&content).ok())
                .and_then(|popm| popm.play_count);
            let popm = PopularityFrame {
                email: decode_latin1(email),
                rating,
                play_count,
            };
            frame.data = encode_popm(&popm);
            frame.flags = frame.flags.status_only();
        }

        debug!("Updating {} at position {} to rating {}", key.id, pos, rating);
        self.replace(pos, frame);
    }
}

/// The part of an identifier that survives its NUL terminator
fn stored_identifier(email: &[u8]) -> &[u8] {
    match email.iter().position(|&b| b == 0) {
        Some(end) => {
            warn!("Identifier {:?} cut at NUL", String::from_utf8_lossy(email));
            &email[..end]
        }
        None => email,
    }
}

fn popm_key(version: Version, email: &[u8]) -> FrameKey {
    FrameKey {
        id: frame_id(version).to_string(),
        identifier: Some(email.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id3::frame::FrameFlags;

    #[test]
    fn test_decode_without_counter() {
        let popm = decode_popm(b"a@b\x00\xC8").unwrap();
        assert_eq!(
            popm,
            PopularityFrame {
                email: "a@b".to_string(),
                rating: 200,
                play_count: None,
            }
        );
    }

    #[test]
    fn test_decode_with_counter() {
        let popm = decode_popm(b"x\x00\x01\x00\x00\x01\x02").unwrap();
        assert_eq!(popm.rating, 1);
        assert_eq!(popm.play_count, Some(258));

        let popm = decode_popm(b"x\x00\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x07").unwrap();
        assert_eq!(popm.play_count, Some(7));

        let popm = decode_popm(b"x\x00\x01\x01\x00\x00\x00\x00\x00\x00\x00\x00").unwrap();
        assert_eq!(popm.play_count, Some(u64::MAX));
    }

    #[test]
    fn test_decode_truncated() {
        assert!(matches!(decode_popm(b"a@b"), Err(Id3Error::TruncatedFrame { .. })));
        assert!(matches!(
            decode_popm(b"a@b\x00"),
            Err(Id3Error::TruncatedFrame { declared: 5, available: 4, .. })
        ));
    }

    #[test]
    fn test_encode() {
        let mut popm = PopularityFrame {
            email: "a@b".to_string(),
            rating: 255,
            play_count: None,
        };
        assert_eq!(encode_popm(&popm), b"a@b\x00\xFF");

        popm.play_count = Some(3);
        assert_eq!(encode_popm(&popm), b"a@b\x00\xFF\x00\x00\x00\x03");

        popm.play_count = Some(0x01_0000_0000);
        assert_eq!(encode_popm(&popm), b"a@b\x00\xFF\x01\x00\x00\x00\x00");
    }

    #[test]
    fn test_set_replaces_rating_keeping_counter() {
        let mut tag = Tag::new(Version::V24);
        tag.push(Frame::new("TIT2", b"\x03t".to_vec()));
        tag.push(Frame::new("POPM", b"a@b\x00\x10\x00\x00\x00\x00\x2A".to_vec()));

        tag.set_popularity("a@b", 99);

        assert_eq!(tag.len(), 2);
        assert_eq!(tag.frames()[1].data, b"a@b\x00\x63\x00\x00\x00\x00\x2A");
        assert_eq!(tag.popularity("a@b").unwrap().play_count, Some(42));
    }

    #[test]
    fn test_set_appends_new_identifier() {
        let mut tag = Tag::new(Version::V23);
        tag.push(Frame::new("POPM", b"a@b\x00\xC8".to_vec()));

        tag.set_popularity("new@user", 10);

        assert_eq!(tag.len(), 2);
        assert_eq!(tag.frames()[0].data, b"a@b\x00\xC8");
        assert_eq!(tag.frames()[1].data, b"new@user\x00\x0A");
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let mut tag = Tag::new(Version::V24);
        tag.set_popularity("A@B", 1);
        tag.set_popularity("a@b", 2);
        assert_eq!(tag.popularities().len(), 2);
    }

    #[test]
    fn test_v22_uses_pop() {
        let mut tag = Tag::new(Version::V22);
        tag.set_popularity("a@b", 5);
        assert_eq!(tag.frames()[0].id, "POP");
        assert_eq!(tag.popularity("a@b").unwrap().rating, 5);
    }

    #[test]
    fn test_set_on_unsynchronised_frame() {
        let mut tag = Tag::new(Version::V24);
        tag.push(Frame {
            id: "POPM".to_string(),
            flags: FrameFlags(0x4002),
            data: b"a@b\x00\xFF\x00\x00\x00\x00\x05".to_vec(),
        });

        tag.set_popularity("a@b", 1);

        let frame = &tag.frames()[0];
        assert_eq!(frame.flags, FrameFlags(0x4000));
        assert_eq!(frame.data, b"a@b\x00\x01\x00\x00\x00\x05");
    }

    #[test]
    fn test_identifier_with_nul_is_cut() {
        let mut tag = Tag::new(Version::V24);
        tag.set_popularity("a\0b", 5);
        tag.set_popularity("a\0b", 5);

        assert_eq!(tag.len(), 1);
        assert_eq!(tag.frames()[0].data, b"a\x00\x05");
        assert_eq!(
            tag.popularities(),
            vec![PopularityFrame {
                email: "a".to_string(),
                rating: 5,
                play_count: None,
            }]
        );
        assert_eq!(tag.popularity("a\0b").unwrap().rating, 5);

        tag.set_popularity_bytes(b"a\x00zzz", 9);
        assert_eq!(tag.len(), 1);
        assert_eq!(tag.popularity("a").unwrap().rating, 9);
    }

    #[test]
    fn test_set_restores_missing_rating_byte() {
        let mut tag = Tag::new(Version::V24);
        tag.push(Frame::new("POPM", b"a@b\x00".to_vec()));
        tag.set_popularity("a@b", 7);
        assert_eq!(tag.frames()[0].data, b"a@b\x00\x07");
    }
}
