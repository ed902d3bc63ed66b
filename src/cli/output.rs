// Output formatting for CLI

use std::io::Write;

use anyhow::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use id3rs::id3::frames::decode_text_frame;
use id3rs::{PopularityFrame, Tag};

use crate::cli::config::OutputFormat;

/// Serializable listing of one tagged file
#[derive(Debug, Serialize)]
pub struct TagSummary {
    pub path: String,
    pub version: String,
    pub padding: usize,
    pub frames: Vec<FrameSummary>,
    pub popularity: Vec<PopularityFrame>,
}

#[derive(Debug, Serialize)]
pub struct FrameSummary {
    pub id: String,
    pub size: usize,
    pub flags: u16,
    /// Decoded text for text frames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Base64 payload for everything else
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl TagSummary {
    pub fn new(path: &str, tag: &Tag) -> Self {
        let version = tag.version();
        let frames = tag
            .frames()
            .iter()
            .map(|frame| {
                let text = if frame.id.starts_with('T') {
                    frame.content(version).map(|content| decode_text_frame(&content))
                } else {
                    None
                };
                FrameSummary {
                    id: frame.id.clone(),
                    size: frame.data.len(),
                    flags: frame.flags.0,
                    data: text.is_none().then(|| STANDARD.encode(&frame.data)),
                    text,
                }
            })
            .collect();

        TagSummary {
            path: path.to_string(),
            version: format!("{}.{}", version, tag.header().revision),
            padding: tag.padding(),
            frames,
            popularity: tag.popularities(),
        }
    }
}

/// Format and output data
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Output a serializable value in the configured format
    pub fn output<T: Serialize>(&self, value: &T, writer: &mut impl Write) -> Result<()> {
        let value = serde_json::to_value(value)?;
        match self.format {
            OutputFormat::Pretty => writeln!(writer, "{}", serde_json::to_string_pretty(&value)?)?,
            OutputFormat::Json => writeln!(writer, "{}", serde_json::to_string(&value)?)?,
            OutputFormat::KeyValue => {
                let mut items = Vec::new();
                flatten("", &value, &mut items);
                for (key, value) in items {
                    writeln!(writer, "{}: {}", key, value)?;
                }
            }
        }
        Ok(())
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            println!("✓ {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }
}

/// Flatten nested JSON into dotted keys
fn flatten(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
    let key = |name: &str| {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", prefix, name)
        }
    };

    match value {
        serde_json::Value::Object(obj) => {
            for (name, value) in obj {
                flatten(&key(name), value, out);
            }
        }
        serde_json::Value::Array(arr) => {
            for (i, value) in arr.iter().enumerate() {
                flatten(&format!("{}[{}]", prefix, i), value, out);
            }
        }
        serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        serde_json::Value::Null => out.push((prefix.to_string(), "(null)".to_string())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use id3rs::{Frame, Version};

    fn sample() -> TagSummary {
        let mut tag = Tag::new(Version::V24);
        tag.push(Frame::new("TIT2", b"\x03Nova".to_vec()));
        tag.push(Frame::new("PRIV", vec![1, 2, 3]));
        tag.set_popularity("a@b", 200);
        TagSummary::new("song.mp3", &tag)
    }

    #[test]
    fn test_summary() {
        let summary = sample();
        assert_eq!(summary.version, "2.4.0");
        assert_eq!(summary.frames[0].text.as_deref(), Some("Nova"));
        assert_eq!(summary.frames[1].data.as_deref(), Some("AQID"));
        assert_eq!(summary.popularity[0].rating, 200);
    }

    #[test]
    fn test_key_value_output() {
        let formatter = OutputFormatter::new(OutputFormat::KeyValue, true);
        let mut out = Vec::new();
        formatter.output(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("path: song.mp3\n"));
        assert!(text.contains("frames[0].text: Nova\n"));
        assert!(text.contains("popularity[0].email: a@b\n"));
        assert!(text.contains("popularity[0].play_count: (null)\n"));
    }
}
