// ID3 frame identifiers and text frame views

use crate::error::{Id3Error, Result};
use crate::id3::frame::{validate_id, Frame};
use crate::id3::header::Version;
use crate::id3::tag::Tag;
use crate::utils::encoding::{
    decode_terminated, decode_text, encode_terminated, encode_text, TextEncoding,
};

/// Common ID3v2.3/v2.4 frame identifiers
pub mod frame_ids {
    pub const TITLE: &str = "TIT2"; // Title/songname/content description
    pub const ARTIST: &str = "TPE1"; // Lead performer(s)/Soloist(s)
    pub const ALBUM: &str = "TALB"; // Album/Movie/Show title
    pub const GENRE: &str = "TCON"; // Content type
    pub const TRACK: &str = "TRCK"; // Track number/Position in set
    pub const COMMENT: &str = "COMM"; // Comments
    pub const USER_TEXT: &str = "TXXX"; // User defined text information
    pub const OBJECT: &str = "GEOB"; // General encapsulated object
    pub const PICTURE: &str = "APIC"; // Attached picture
    pub const POPULARIMETER: &str = "POPM"; // Rating and play counter
}

/// Language written into new comment frames
pub const DEFAULT_LANGUAGE: &[u8; 3] = b"eng";

/// Translate a v2.3/v2.4 id to the v2.2 three-character id where known
pub fn id_for(version: Version, id: &str) -> &str {
    if version != Version::V22 {
        return id;
    }
    match id {
        frame_ids::TITLE => "TT2",
        frame_ids::ARTIST => "TP1",
        frame_ids::ALBUM => "TAL",
        frame_ids::GENRE => "TCO",
        frame_ids::TRACK => "TRK",
        frame_ids::COMMENT => "COM",
        frame_ids::USER_TEXT => "TXX",
        frame_ids::OBJECT => "GEO",
        frame_ids::PICTURE => "PIC",
        frame_ids::POPULARIMETER => "POP",
        other => other,
    }
}

/// Decode text frame content.
///
/// Trailing terminators are dropped; v2.4 multi-value separators become `/`.
pub fn decode_text_frame(data: &[u8]) -> String {
    let Some((&encoding, text)) = data.split_first() else {
        return String::new();
    };

    decode_text(text, TextEncoding::from_byte(encoding))
        .trim_end_matches('\0')
        .replace('\0', "/")
}

/// Encode text frame content with a leading encoding byte
pub fn encode_text_frame(text: &str, encoding: TextEncoding) -> Vec<u8> {
    let mut result = vec![encoding as u8];
    result.extend(encode_text(text, encoding));
    result
}

/// Encoding the writer uses for new text in a tag of this version
pub fn preferred_encoding(version: Version, text: &str) -> TextEncoding {
    match version {
        Version::V24 => TextEncoding::Utf8,
        Version::V22 | Version::V23 if text.chars().all(|c| u32::from(c) <= 0xFF) => {
            TextEncoding::Iso8859_1
        }
        Version::V22 | Version::V23 => TextEncoding::Utf16,
    }
}

/// Split `<encoding> [skip bytes] <description>\0 <value>` content.
///
/// `skip` is 3 for the language code of a comment, 0 for TXXX.
fn described_text(data: &[u8], skip: usize) -> Option<(String, String)> {
    let (&encoding, rest) = data.split_first()?;
    let encoding = TextEncoding::from_byte(encoding);
    let (description, value) = decode_terminated(rest.get(skip..)?, encoding)?;
    Some((
        description,
        decode_text(value, encoding).trim_end_matches('\0').to_string(),
    ))
}

fn encode_described_text(version: Version, prefix: &[u8], description: &str, value: &str) -> Vec<u8> {
    let encoding = preferred_encoding(version, &format!("{}{}", description, value));
    let mut data = vec![encoding as u8];
    data.extend_from_slice(prefix);
    data.extend(encode_terminated(description, encoding));
    data.extend(encode_text(value, encoding));
    data
}

/// Index key of a TXXX (`skip` 0) or COMM (`skip` 3) frame: its description
pub(crate) fn description_key(frame: &Frame, version: Version, skip: usize) -> Option<Vec<u8>> {
    let content = frame.content(version)?;
    let (description, _) = described_text(&content, skip)?;
    Some(description.into_bytes())
}

/// Plain text frames: `T` followed by uppercase letters/digits, except the
/// user text frame whose content carries a description
fn check_text_id(version: Version, id: &str) -> Result<()> {
    validate_id(id.as_bytes(), version)?;
    if !id.starts_with('T') || id == id_for(version, frame_ids::USER_TEXT) {
        return Err(Id3Error::NotATextFrame(id.to_string()));
    }
    Ok(())
}

impl Tag {
    /// Text of the first frame with `id`
    pub fn text(&self, id: &str) -> Option<String> {
        let version = self.version();
        let frame = self.get(id_for(version, id))?;
        Some(decode_text_frame(&frame.content(version)?))
    }

    /// Replace or add a text frame.
    ///
    /// Fails with `NotATextFrame` for ids outside the plain text frames
    /// (TXXX, COMM, APIC, ...), which have their own setters.
    pub fn set_text(&mut self, id: &str, text: &str) -> Result<()> {
        let id = id_for(self.version(), id).to_string();
        check_text_id(self.version(), &id)?;
        self.put_text(id, text);
        Ok(())
    }

    fn put_text(&mut self, id: String, text: &str) {
        let data = encode_text_frame(text, preferred_encoding(self.version(), text));
        self.upsert(Frame::new(id, data));
    }

    fn put_known_text(&mut self, id: &str, text: &str) {
        let id = id_for(self.version(), id).to_string();
        self.put_text(id, text);
    }

    pub fn title(&self) -> Option<String> {
        self.text(frame_ids::TITLE)
    }

    pub fn set_title(&mut self, title: &str) {
        self.put_known_text(frame_ids::TITLE, title)
    }

    pub fn artist(&self) -> Option<String> {
        self.text(frame_ids::ARTIST)
    }

    pub fn set_artist(&mut self, artist: &str) {
        self.put_known_text(frame_ids::ARTIST, artist)
    }

    pub fn album(&self) -> Option<String> {
        self.text(frame_ids::ALBUM)
    }

    pub fn genre(&self) -> Option<String> {
        self.text(frame_ids::GENRE)
    }

    pub fn set_genre(&mut self, genre: &str) {
        self.put_known_text(frame_ids::GENRE, genre)
    }

    /// Track position as stored, e.g. `"3"` or `"3/12"`
    pub fn track(&self) -> Option<String> {
        self.text(frame_ids::TRACK)
    }

    pub fn set_track(&mut self, track: u32, total: Option<u32>) {
        let value = match total {
            Some(total) => format!("{}/{}", track, total),
            None => track.to_string(),
        };
        self.put_known_text(frame_ids::TRACK, &value)
    }

    /// Text of the first comment frame
    pub fn comment(&self) -> Option<String> {
        let version = self.version();
        let frame = self.get(id_for(version, frame_ids::COMMENT))?;
        described_text(&frame.content(version)?, 3).map(|(_, value)| value)
    }

    /// Text of the comment frame with this description
    pub fn comment_by_description(&self, description: &str) -> Option<String> {
        let version = self.version();
        self.get_all(id_for(version, frame_ids::COMMENT))
            .filter_map(|frame| described_text(&frame.content(version)?, 3))
            .find(|(found, _)| found == description)
            .map(|(_, value)| value)
    }

    /// Replace the comment with this description, or add one in English
    pub fn set_comment(&mut self, description: &str, value: &str) {
        let version = self.version();
        let data = encode_described_text(version, DEFAULT_LANGUAGE, description, value);
        self.upsert(Frame::new(id_for(version, frame_ids::COMMENT), data));
    }

    /// Value of the user text (TXXX) frame with this description
    pub fn extended_text(&self, description: &str) -> Option<String> {
        let version = self.version();
        self.get_all(id_for(version, frame_ids::USER_TEXT))
            .filter_map(|frame| described_text(&frame.content(version)?, 0))
            .find(|(found, _)| found == description)
            .map(|(_, value)| value)
    }

    /// Replace the user text frame with this description, or add one
    pub fn set_extended_text(&mut self, description: &str, value: &str) {
        let version = self.version();
        let data = encode_described_text(version, &[], description, value);
        self.upsert(Frame::new(id_for(version, frame_ids::USER_TEXT), data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_frame() {
        assert_eq!(decode_text_frame(b"\x00Regent\x00"), "Regent");
        assert_eq!(decode_text_frame(b"\x03a\x00b"), "a/b");
        assert_eq!(decode_text_frame(b"\x01\xFF\xFEh\x00i\x00\x00\x00"), "hi");
        assert_eq!(decode_text_frame(b""), "");
    }

    #[test]
    fn test_text_accessors() {
        let mut tag = Tag::new(Version::V23);
        tag.set_title("Tink");
        tag.set_artist("Apple");
        tag.set_title("Tonk");

        assert_eq!(tag.title().as_deref(), Some("Tonk"));
        assert_eq!(tag.artist().as_deref(), Some("Apple"));
        assert_eq!(tag.album(), None);
        assert_eq!(tag.len(), 2);
        assert_eq!(tag.frames()[0].data, b"\x00Tonk");
    }

    #[test]
    fn test_set_text_only_accepts_text_frames() {
        let mut tag = Tag::new(Version::V24);
        tag.set_text("TALB", "Dirt").unwrap();
        assert_eq!(tag.album().as_deref(), Some("Dirt"));

        for id in ["COMM", "TXXX", "APIC", "POPM"] {
            assert!(matches!(
                tag.set_text(id, "x"),
                Err(Id3Error::NotATextFrame(ref found)) if found == id
            ));
        }
        assert!(matches!(tag.set_text("tit2", "x"), Err(Id3Error::InvalidFrameId(_))));
        assert_eq!(tag.len(), 1);

        let mut tag = Tag::new(Version::V22);
        assert!(tag.set_text("TXXX", "x").is_err());
        assert!(tag.set_text("TT2", "x").is_ok());
    }

    #[test]
    fn test_non_latin_text_in_v23_uses_utf16() {
        let mut tag = Tag::new(Version::V23);
        tag.set_title("こんにちは");
        assert_eq!(tag.frames()[0].data[0], TextEncoding::Utf16 as u8);
        assert_eq!(tag.title().as_deref(), Some("こんにちは"));
    }

    #[test]
    fn test_v22_ids() {
        let mut tag = Tag::new(Version::V22);
        tag.set_title("short");
        tag.set_track(4, None);
        assert_eq!(tag.frames()[0].id, "TT2");
        assert_eq!(tag.frames()[1].id, "TRK");
        assert_eq!(tag.title().as_deref(), Some("short"));
        assert_eq!(tag.track().as_deref(), Some("4"));
    }

    #[test]
    fn test_genre_and_track() {
        let mut tag = Tag::new(Version::V23);
        tag.push(Frame::new("TCON", b"\x00sounds".to_vec()));
        assert_eq!(tag.genre().as_deref(), Some("sounds"));

        tag.set_genre("notech");
        tag.set_track(1, Some(1));
        assert_eq!(tag.genre().as_deref(), Some("notech"));
        assert_eq!(tag.track().as_deref(), Some("1/1"));
        assert_eq!(tag.len(), 2);
    }

    #[test]
    fn test_comment() {
        let mut tag = Tag::new(Version::V23);
        tag.push(Frame::new("COMM", b"\x00eng\x00From Big Sur".to_vec()));
        assert_eq!(tag.comment().as_deref(), Some("From Big Sur"));
    }

    #[test]
    fn test_set_comment_per_description() {
        let mut tag = Tag::new(Version::V23);
        tag.push(Frame::new("COMM", b"\x00eng\x00From Big Sur".to_vec()));

        tag.set_comment("", "New comment");
        tag.set_comment("Mood", "Calm");

        assert_eq!(tag.len(), 2);
        assert_eq!(tag.frames()[0].data, b"\x00eng\x00New comment");
        assert_eq!(tag.comment().as_deref(), Some("New comment"));
        assert_eq!(tag.comment_by_description("Mood").as_deref(), Some("Calm"));
    }

    #[test]
    fn test_extended_text() {
        let mut tag = Tag::new(Version::V24);
        tag.push(Frame::new("TXXX", b"\x00Hello\x00World".to_vec()));
        tag.push(Frame::new(
            "TXXX",
            b"\x01\xFF\xFEE\x00n\x00\x00\x00\xFF\xFE6\x00".to_vec(),
        ));

        assert_eq!(tag.extended_text("Hello").as_deref(), Some("World"));
        assert_eq!(tag.extended_text("En").as_deref(), Some("6"));
        assert_eq!(tag.extended_text("Missing"), None);
    }

    #[test]
    fn test_set_extended_text_per_description() {
        let mut tag = Tag::new(Version::V23);
        tag.set_extended_text("EnergyLevel", "7");
        tag.set_extended_text("OriginalTitle", "Bleek");
        tag.set_extended_text("EnergyLevel", "99");

        assert_eq!(tag.len(), 2);
        assert_eq!(tag.frames()[0].data, b"\x00EnergyLevel\x0099");
        assert_eq!(tag.extended_text("EnergyLevel").as_deref(), Some("99"));
        assert_eq!(tag.extended_text("OriginalTitle").as_deref(), Some("Bleek"));
    }
}
