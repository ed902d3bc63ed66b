// Binary attachments: encapsulated objects (GEOB) and pictures (APIC)

use std::fmt;

use crate::id3::frame::Frame;
use crate::id3::frames::{frame_ids, id_for, preferred_encoding};
use crate::id3::header::Version;
use crate::id3::tag::Tag;
use crate::utils::encoding::{
    decode_latin1, decode_terminated, encode_latin1, encode_terminated, TextEncoding,
};

/// Picture types of an attached picture frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PictureType {
    Other = 0,
    FileIcon = 1,
    OtherFileIcon = 2,
    CoverFront = 3,
    CoverBack = 4,
    LeafletPage = 5,
    Media = 6,
    LeadArtist = 7,
    Artist = 8,
    Conductor = 9,
    Band = 10,
    Composer = 11,
    Lyricist = 12,
    RecordingLocation = 13,
    DuringRecording = 14,
    DuringPerformance = 15,
    VideoScreenCapture = 16,
    BrightColouredFish = 17,
    Illustration = 18,
    BandLogo = 19,
    PublisherLogo = 20,
}

impl PictureType {
    pub fn from_byte(value: u8) -> Self {
        match value {
            1 => PictureType::FileIcon,
            2 => PictureType::OtherFileIcon,
            3 => PictureType::CoverFront,
            4 => PictureType::CoverBack,
            5 => PictureType::LeafletPage,
            6 => PictureType::Media,
            7 => PictureType::LeadArtist,
            8 => PictureType::Artist,
            9 => PictureType::Conductor,
            10 => PictureType::Band,
            11 => PictureType::Composer,
            12 => PictureType::Lyricist,
            13 => PictureType::RecordingLocation,
            14 => PictureType::DuringRecording,
            15 => PictureType::DuringPerformance,
            16 => PictureType::VideoScreenCapture,
            17 => PictureType::BrightColouredFish,
            18 => PictureType::Illustration,
            19 => PictureType::BandLogo,
            20 => PictureType::PublisherLogo,
            _ => PictureType::Other,
        }
    }
}

impl fmt::Display for PictureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PictureType::Other => "Other",
            PictureType::FileIcon => "File Icon",
            PictureType::OtherFileIcon => "Other File Icon",
            PictureType::CoverFront => "Cover (front)",
            PictureType::CoverBack => "Cover (back)",
            PictureType::LeafletPage => "Leaflet page",
            PictureType::Media => "Media",
            PictureType::LeadArtist => "Lead artist",
            PictureType::Artist => "Artist",
            PictureType::Conductor => "Conductor",
            PictureType::Band => "Band",
            PictureType::Composer => "Composer",
            PictureType::Lyricist => "Lyricist",
            PictureType::RecordingLocation => "Recording Location",
            PictureType::DuringRecording => "During recording",
            PictureType::DuringPerformance => "During performance",
            PictureType::VideoScreenCapture => "Video screen capture",
            PictureType::BrightColouredFish => "Bright coloured fish",
            PictureType::Illustration => "Illustration",
            PictureType::BandLogo => "Band logo",
            PictureType::PublisherLogo => "Publisher logo",
        };
        f.write_str(name)
    }
}

/// Decoded GEOB frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncapsulatedObject {
    pub mime_type: String,
    pub filename: String,
    pub description: String,
    pub data: Vec<u8>,
}

/// Decoded APIC (v2.2: PIC) frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedPicture {
    pub mime_type: String,
    pub picture_type: PictureType,
    pub description: String,
    pub data: Vec<u8>,
}

/// `<encoding> <mime>\0 <filename> <description> <data>`
pub fn decode_object(content: &[u8]) -> Option<EncapsulatedObject> {
    let (&encoding, rest) = content.split_first()?;
    let encoding = TextEncoding::from_byte(encoding);
    let (mime_type, rest) = decode_terminated(rest, TextEncoding::Iso8859_1)?;
    let (filename, rest) = decode_terminated(rest, encoding)?;
    let (description, data) = decode_terminated(rest, encoding)?;
    Some(EncapsulatedObject {
        mime_type,
        filename,
        description,
        data: data.to_vec(),
    })
}

pub fn encode_object(object: &EncapsulatedObject, encoding: TextEncoding) -> Vec<u8> {
    let mut out = vec![encoding as u8];
    out.extend(encode_terminated(&object.mime_type, TextEncoding::Iso8859_1));
    out.extend(encode_terminated(&object.filename, encoding));
    out.extend(encode_terminated(&object.description, encoding));
    out.extend_from_slice(&object.data);
    out
}

/// `<encoding> <mime>\0 <type> <description> <data>`; v2.2 has a 3-byte
/// image format in place of the MIME type
pub fn decode_picture(content: &[u8], version: Version) -> Option<AttachedPicture> {
    let (&encoding, rest) = content.split_first()?;
    let encoding = TextEncoding::from_byte(encoding);

    let (mime_type, rest) = match version {
        Version::V22 => {
            let (format, rest) = (rest.get(..3)?, rest.get(3..)?);
            (mime_for_format(format), rest)
        }
        Version::V23 | Version::V24 => decode_terminated(rest, TextEncoding::Iso8859_1)?,
    };

    let (&kind, rest) = rest.split_first()?;
    let (description, data) = decode_terminated(rest, encoding)?;
    Some(AttachedPicture {
        mime_type,
        picture_type: PictureType::from_byte(kind),
        description,
        data: data.to_vec(),
    })
}

pub fn encode_picture(picture: &AttachedPicture, version: Version, encoding: TextEncoding) -> Vec<u8> {
    let mut out = vec![encoding as u8];
    match version {
        Version::V22 => out.extend_from_slice(&format_for_mime(&picture.mime_type)),
        Version::V23 | Version::V24 => {
            out.extend(encode_terminated(&picture.mime_type, TextEncoding::Iso8859_1))
        }
    }
    out.push(picture.picture_type as u8);
    out.extend(encode_terminated(&picture.description, encoding));
    out.extend_from_slice(&picture.data);
    out
}

fn mime_for_format(format: &[u8]) -> String {
    match format {
        b"JPG" => "image/jpeg".to_string(),
        b"PNG" => "image/png".to_string(),
        other => format!("image/{}", decode_latin1(other).trim().to_lowercase()),
    }
}

fn format_for_mime(mime: &str) -> [u8; 3] {
    let subtype = mime.rsplit('/').next().unwrap_or(mime).to_ascii_uppercase();
    match subtype.as_str() {
        "JPEG" | "JPG" => *b"JPG",
        _ => {
            let mut format = [b' '; 3];
            for (slot, byte) in format.iter_mut().zip(encode_latin1(&subtype)) {
                *slot = byte;
            }
            format
        }
    }
}

/// Index key of a GEOB frame: its description
pub(crate) fn object_key(frame: &Frame, version: Version) -> Option<Vec<u8>> {
    let object = decode_object(&frame.content(version)?)?;
    Some(object.description.into_bytes())
}

/// Index key of an APIC frame: its picture type
pub(crate) fn picture_key(frame: &Frame, version: Version) -> Option<Vec<u8>> {
    let picture = decode_picture(&frame.content(version)?, version)?;
    Some(vec![picture.picture_type as u8])
}

impl Tag {
    /// Every decodable encapsulated object in tag order
    pub fn objects(&self) -> Vec<EncapsulatedObject> {
        let version = self.version();
        self.get_all(id_for(version, frame_ids::OBJECT))
            .filter_map(|frame| decode_object(&frame.content(version)?))
            .collect()
    }

    pub fn object_by_description(&self, description: &str) -> Option<EncapsulatedObject> {
        self.objects()
            .into_iter()
            .find(|object| object.description == description)
    }

    pub fn object_by_filename(&self, filename: &str) -> Option<EncapsulatedObject> {
        self.objects()
            .into_iter()
            .find(|object| object.filename == filename)
    }

    /// Replace the object with this description, or add one
    pub fn set_object(&mut self, filename: &str, mime_type: &str, description: &str, data: &[u8]) {
        let version = self.version();
        let object = EncapsulatedObject {
            mime_type: mime_type.to_string(),
            filename: filename.to_string(),
            description: description.to_string(),
            data: data.to_vec(),
        };
        let encoding = preferred_encoding(version, &format!("{}{}", filename, description));
        let frame = Frame::new(id_for(version, frame_ids::OBJECT), encode_object(&object, encoding));
        self.upsert(frame);
    }

    /// Every decodable attached picture in tag order
    pub fn pictures(&self) -> Vec<AttachedPicture> {
        let version = self.version();
        self.get_all(id_for(version, frame_ids::PICTURE))
            .filter_map(|frame| decode_picture(&frame.content(version)?, version))
            .collect()
    }

    /// First picture of this type
    pub fn attached_picture(&self, picture_type: PictureType) -> Option<AttachedPicture> {
        self.pictures()
            .into_iter()
            .find(|picture| picture.picture_type == picture_type)
    }

    /// Replace the picture of this type, or add one
    pub fn set_attached_picture(
        &mut self,
        picture_type: PictureType,
        mime_type: &str,
        description: &str,
        data: &[u8],
    ) {
        let version = self.version();
        let picture = AttachedPicture {
            mime_type: mime_type.to_string(),
            picture_type,
            description: description.to_string(),
            data: data.to_vec(),
        };
        let encoding = preferred_encoding(version, description);
        let frame = Frame::new(
            id_for(version, frame_ids::PICTURE),
            encode_picture(&picture, version, encoding),
        );
        self.upsert(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1A\n\x00\x00\x00\x0DIHDR";

    #[test]
    fn test_decode_object() {
        let content = b"\x00application/octet-stream\x00ANLZ0000.DAT\x00CuePoints\x00\x01\x02\x00\x03";
        let object = decode_object(content).unwrap();
        assert_eq!(object.mime_type, "application/octet-stream");
        assert_eq!(object.filename, "ANLZ0000.DAT");
        assert_eq!(object.description, "CuePoints");
        assert_eq!(object.data, b"\x01\x02\x00\x03");

        assert!(decode_object(b"\x00text/plain").is_none());
    }

    #[test]
    fn test_set_object_per_description() {
        let mut tag = Tag::new(Version::V23);
        tag.set_object("HELLO.TXT", "text/plain", "Hello", b"Hello, world");
        tag.set_object("CUE.DAT", "application/octet-stream", "CuePoints", &[1, 2]);
        tag.set_object("HELLO2.TXT", "text/plain", "Hello", b"Hi");

        assert_eq!(tag.len(), 2);
        assert_eq!(
            tag.frames()[0].data,
            b"\x00text/plain\x00HELLO2.TXT\x00Hello\x00Hi"
        );
        assert_eq!(tag.object_by_description("CuePoints").unwrap().data, [1u8, 2]);
        assert_eq!(tag.object_by_filename("HELLO2.TXT").unwrap().description, "Hello");
        assert!(tag.object_by_filename("HELLO.TXT").is_none());
        assert_eq!(tag.objects().len(), 2);
    }

    #[test]
    fn test_picture_round_trip() {
        let mut tag = Tag::new(Version::V24);
        tag.set_attached_picture(PictureType::CoverFront, "image/png", "cover", PNG);

        let frame = &tag.frames()[0];
        assert_eq!(frame.id, "APIC");
        assert_eq!(&frame.data[..18], b"\x03image/png\x00\x03cover\x00");

        let picture = tag.attached_picture(PictureType::CoverFront).unwrap();
        assert_eq!(picture.mime_type, "image/png");
        assert_eq!(picture.description, "cover");
        assert_eq!(picture.data, PNG);
        assert!(tag.attached_picture(PictureType::CoverBack).is_none());
    }

    #[test]
    fn test_set_picture_per_type() {
        let mut tag = Tag::new(Version::V23);
        tag.set_attached_picture(PictureType::CoverFront, "image/png", "old", PNG);
        tag.set_attached_picture(PictureType::CoverBack, "image/png", "back", PNG);
        tag.set_attached_picture(PictureType::CoverFront, "image/jpeg", "new", b"\xFF\xD8");

        assert_eq!(tag.len(), 2);
        let front = tag.attached_picture(PictureType::CoverFront).unwrap();
        assert_eq!(front.description, "new");
        assert_eq!(front.data, b"\xFF\xD8");
        assert_eq!(tag.pictures()[1].picture_type, PictureType::CoverBack);
    }

    #[test]
    fn test_v22_picture_format() {
        let mut tag = Tag::new(Version::V22);
        tag.set_attached_picture(PictureType::CoverFront, "image/jpeg", "", b"\xFF\xD8");

        let frame = &tag.frames()[0];
        assert_eq!(frame.id, "PIC");
        assert_eq!(frame.data, b"\x00JPG\x03\x00\xFF\xD8");
        assert_eq!(
            tag.attached_picture(PictureType::CoverFront).unwrap().mime_type,
            "image/jpeg"
        );
    }

    #[test]
    fn test_picture_type_names() {
        assert_eq!(PictureType::from_byte(3), PictureType::CoverFront);
        assert_eq!(PictureType::from_byte(200), PictureType::Other);
        assert_eq!(PictureType::CoverFront.to_string(), "Cover (front)");
    }
}
