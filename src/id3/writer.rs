// Tag writer: serialize the tag and splice it in front of the audio payload

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, info, warn};
use tempfile::NamedTempFile;

use crate::error::{Id3Error, Result};
use crate::id3::frame::encode_frame;
use crate::id3::header::{flags, TagHeader};
use crate::id3::synchsafe::SYNCHSAFE_MAX;
use crate::id3::tag::Tag;

/// Padding used when the new tag does not fit the file's existing tag region
pub const DEFAULT_PADDING: usize = 1024;

/// Writer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Zero bytes appended after the frames when the old region is too small
    pub padding: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            padding: DEFAULT_PADDING,
        }
    }
}

/// Where a file's tag ends and its audio payload begins.
///
/// `[0, tag_end)` is the tag region to replace, `[tag_end, file_len)` is
/// preserved byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSplice {
    pub tag_end: u64,
    pub file_len: u64,
}

impl FileSplice {
    /// Locate the tag region of a file; files without a tag splice at 0
    pub fn locate<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let tag_end = match TagHeader::read(reader) {
            Ok(header) => header.region_len() as u64,
            Err(Id3Error::NotAnId3File) => 0,
            Err(e) => return Err(e),
        };

        if tag_end > file_len {
            return Err(Id3Error::TruncatedTag {
                declared: tag_end as usize,
                available: file_len as usize,
            }
            .at(TagHeader::SIZE));
        }

        Ok(FileSplice { tag_end, file_len })
    }

    pub fn payload_len(&self) -> u64 {
        self.file_len - self.tag_end
    }
}

impl Tag {
    /// Serialize header, frames and default padding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.encode(None, WriteOptions::default())
    }

    /// Serialize the tag. If `region` (the length of the tag being replaced)
    /// can hold the frames, padding fills it exactly so the payload does not
    /// move.
    fn encode(&self, region: Option<usize>, options: WriteOptions) -> Result<Vec<u8>> {
        let version = self.version();
        let frames_len: usize = self.frames().iter().map(|f| f.encoded_len(version)).sum();
        check_frames_len(frames_len)?;
        let max = SYNCHSAFE_MAX as usize;

        let padding = match region {
            Some(region) if region >= TagHeader::SIZE + frames_len => region - TagHeader::SIZE - frames_len,
            _ => options.padding,
        }
        .min(max - frames_len);

        if self.header().flags & !flags::EXPERIMENTAL != 0 {
            warn!(
                "Dropping header flags {:#04x} (unsynchronisation/extended header/footer)",
                self.header().flags & !flags::EXPERIMENTAL
            );
        }
        let header = TagHeader {
            version,
            revision: self.header().revision,
            flags: self.header().flags & flags::EXPERIMENTAL,
            size: (frames_len + padding) as u32,
        };

        let mut out = Vec::with_capacity(TagHeader::SIZE + frames_len + padding);
        out.extend_from_slice(&header.to_bytes()?);
        for frame in self.frames() {
            encode_frame(frame, version, &mut out)?;
        }
        out.resize(out.len() + padding, 0);

        debug!("Encoded {} frames, {} bytes of padding", self.len(), padding);
        Ok(out)
    }

    /// Write the tag to `path`. See [`Tag::write_to_with`].
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_to_with(path, WriteOptions::default())
    }

    /// Write the tag followed by the audio payload of its source file to
    /// `path`.
    ///
    /// A tag read from a file carries that file's payload, so writing it to
    /// another path copies the audio there, creating the file if needed and
    /// replacing whatever `path` held before. A tag built in memory has no
    /// source and splices in front of the payload already at `path`.
    ///
    /// The new file is assembled in a temporary file next to `path` and
    /// renamed over it, so a failure leaves both files untouched.
    pub fn write_to_with<P: AsRef<Path>>(&self, path: P, options: WriteOptions) -> Result<()> {
        let target = path.as_ref();
        let payload_path = self.source().unwrap_or(target);
        let mut source = File::open(payload_path)?;
        let splice = FileSplice::locate(&mut source)?;
        debug!(
            "{}: tag region {} bytes, payload {} bytes",
            payload_path.display(),
            splice.tag_end,
            splice.payload_len()
        );

        // only an in-place write may reuse the old region's padding
        let in_place = same_file(payload_path, target);
        let tag = self.encode(in_place.then_some(splice.tag_end as usize), options)?;

        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(&tag)?;

        source.seek(SeekFrom::Start(splice.tag_end))?;
        let copied = io::copy(&mut source, temp.as_file_mut())?;
        if copied != splice.payload_len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{} changed while writing", payload_path.display()),
            )
            .into());
        }

        let permissions = match fs::metadata(target) {
            Ok(metadata) => metadata.permissions(),
            Err(_) => source.metadata()?.permissions(),
        };
        temp.as_file().set_permissions(permissions)?;
        temp.as_file().sync_all()?;
        drop(source);

        temp.persist(target).map_err(|e| Id3Error::Io(e.error))?;
        info!(
            "Wrote {} byte tag to {} ({} payload bytes from {})",
            tag.len(),
            target.display(),
            copied,
            payload_path.display()
        );

        Ok(())
    }
}

/// Frames must fit a synchsafe tag size
fn check_frames_len(frames_len: usize) -> Result<()> {
    if frames_len > SYNCHSAFE_MAX as usize {
        return Err(Id3Error::ValueTooLarge(frames_len as u64));
    }
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
