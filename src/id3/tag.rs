// In-memory tag: ordered frames plus an (id, identifier) index

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::id3::frame::Frame;
use crate::id3::frames::{self, frame_ids, id_for};
use crate::id3::header::{TagHeader, Version};
use crate::id3::{attached, popm};

/// Lookup key for a frame.
///
/// Frames that may repeat under one id carry the bytes of what tells them
/// apart: the user of a POPM, the description of a TXXX, COMM or GEOB, the
/// picture type of an APIC. Every other frame is keyed by id alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameKey {
    pub id: String,
    pub identifier: Option<Vec<u8>>,
}

impl FrameKey {
    pub fn id(id: impl Into<String>) -> Self {
        FrameKey {
            id: id.into(),
            identifier: None,
        }
    }

    pub fn of(frame: &Frame, version: Version) -> Self {
        let identifier = match frame.id.as_str() {
            id if id == popm::frame_id(version) => popm::identifier_bytes(frame, version),
            id if id == id_for(version, frame_ids::USER_TEXT) => frames::description_key(frame, version, 0),
            id if id == id_for(version, frame_ids::COMMENT) => frames::description_key(frame, version, 3),
            id if id == id_for(version, frame_ids::OBJECT) => attached::object_key(frame, version),
            id if id == id_for(version, frame_ids::PICTURE) => attached::picture_key(frame, version),
            _ => None,
        };
        FrameKey {
            id: frame.id.clone(),
            identifier,
        }
    }
}

/// ID3v2 tag: the header it was read with and its frames in file order.
///
/// Owns every frame payload. Dropping the tag releases it.
#[derive(Debug, Clone)]
pub struct Tag {
    header: TagHeader,
    frames: Vec<Frame>,
    index: HashMap<FrameKey, Vec<usize>>,
    padding: usize,
    source: Option<PathBuf>,
}

impl Tag {
    /// Empty tag, for files that carry none yet
    pub fn new(version: Version) -> Self {
        let header = TagHeader {
            version,
            revision: 0,
            flags: 0,
            size: 0,
        };
        Self::from_parts(header, Vec::new(), 0)
    }

    pub(crate) fn from_parts(header: TagHeader, frames: Vec<Frame>, padding: usize) -> Self {
        let mut tag = Tag {
            header,
            frames,
            index: HashMap::new(),
            padding,
            source: None,
        };
        tag.reindex();
        tag
    }

    pub(crate) fn with_source(mut self, path: PathBuf) -> Self {
        self.source = Some(path);
        self
    }

    fn reindex(&mut self) {
        let version = self.header.version;
        self.index.clear();
        for (pos, frame) in self.frames.iter().enumerate() {
            self.index
                .entry(FrameKey::of(frame, version))
                .or_default()
                .push(pos);
        }
    }

    /// Header as read from the file (size reflects the source tag)
    pub fn header(&self) -> &TagHeader {
        &self.header
    }

    pub fn version(&self) -> Version {
        self.header.version
    }

    /// Padding bytes found after the last frame when the tag was read
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// File the tag was read from; its audio payload is what gets written
    /// behind the tag
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// First frame with this id
    pub fn get(&self, id: &str) -> Option<&Frame> {
        self.frames.iter().find(|frame| frame.id == id)
    }

    /// Every frame with this id, in tag order
    pub fn get_all<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Frame> + 'a {
        self.frames.iter().filter(move |frame| frame.id == id)
    }

    /// Position of the first frame matching `key`
    pub fn position(&self, key: &FrameKey) -> Option<usize> {
        self.index.get(key).and_then(|positions| positions.first().copied())
    }

    /// Append a frame after all others
    pub fn push(&mut self, frame: Frame) {
        let key = FrameKey::of(&frame, self.header.version);
        self.frames.push(frame);
        self.index.entry(key).or_default().push(self.frames.len() - 1);
    }

    /// Replace the frame at `pos` keeping its position.
    ///
    /// Panics if `pos` is out of bounds.
    pub fn replace(&mut self, pos: usize, frame: Frame) {
        let version = self.header.version;
        let rekey = FrameKey::of(&self.frames[pos], version) != FrameKey::of(&frame, version);
        self.frames[pos] = frame;
        if rekey {
            self.reindex();
        }
    }

    /// Replace the first frame with the same key, or append
    pub fn upsert(&mut self, frame: Frame) {
        match self.position(&FrameKey::of(&frame, self.header.version)) {
            Some(pos) => self.replace(pos, frame),
            None => self.push(frame),
        }
    }

    /// Remove every frame with this id; returns how many were removed
    pub fn remove(&mut self, id: &str) -> usize {
        let before = self.frames.len();
        self.frames.retain(|frame| frame.id != id);
        let removed = before - self.frames.len();
        if removed > 0 {
            self.reindex();
        }
        removed
    }
}
