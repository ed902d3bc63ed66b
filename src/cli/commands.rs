// CLI command implementations
use std::io;

use anyhow::{bail, Context, Result};
use glob::glob;
use log::debug;

use id3rs::{has_id3v2, Tag};

use crate::cli::output::{OutputFormatter, TagSummary};

/// Expand glob patterns; a pattern without matches is kept as a literal path
fn expand(patterns: &[String]) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let mut matched = false;
        for entry in glob(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
            let path = entry?;
            if path.is_file() {
                files.push(path.to_string_lossy().into_owned());
                matched = true;
            }
        }
        if !matched {
            files.push(pattern.clone());
        }
    }
    Ok(files)
}

/// Show tags of the given files. Returns the number of failures.
pub fn command_show(patterns: &[String], formatter: &OutputFormatter) -> Result<usize> {
    let files = expand(patterns)?;
    debug!("Showing {} files", files.len());

    let mut stdout = io::stdout().lock();
    let mut failures = 0;

    for file_path in files {
        match has_id3v2(&file_path) {
            Ok(true) => {}
            Ok(false) => {
                formatter.print_error(&format!("{}: no ID3v2 tag", file_path));
                failures += 1;
                continue;
            }
            Err(e) => {
                formatter.print_error(&format!("{}: {}", file_path, e));
                failures += 1;
                continue;
            }
        }

        match Tag::read(&file_path) {
            Ok(tag) => formatter.output(&TagSummary::new(&file_path, &tag), &mut stdout)?,
            Err(e) => {
                formatter.print_error(&format!("{}: {}", file_path, e));
                failures += 1;
            }
        }
    }

    Ok(failures)
}

/// Set a popularity rating and write the tag back, or to `output` together
/// with a copy of the audio
pub fn command_rate(
    file: &str,
    email: &str,
    rating: u8,
    output: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let mut tag = Tag::read(file).with_context(|| format!("Failed to read {}", file))?;
    tag.set_popularity(email, rating);

    let target = output.unwrap_or(file);
    tag.write_to(target)
        .with_context(|| format!("Failed to write {}", target))?;

    formatter.print_success(&format!("Rated {} for {} in {}", rating, email, target));
    Ok(())
}

/// Print a text frame or replace it
pub fn command_text(file: &str, id: &str, value: Option<&str>, formatter: &OutputFormatter) -> Result<()> {
    let mut tag = Tag::read(file).with_context(|| format!("Failed to read {}", file))?;

    match value {
        None => match tag.text(id) {
            Some(text) => println!("{}", text),
            None => bail!("{}: no {} frame", file, id),
        },
        Some(value) => {
            tag.set_text(id, value)
                .with_context(|| format!("Cannot set {} in {}", id, file))?;
            tag.write_to(file)
                .with_context(|| format!("Failed to write {}", file))?;
            formatter.print_success(&format!("Set {} in {}", id, file));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::config::OutputFormat;
    use std::fs;
    use tempfile::TempDir;

    const TAGGED: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x10POPM\x00\x00\x00\x06\x00\x00a@b\x00\xC8audio";

    fn quiet() -> OutputFormatter {
        OutputFormatter::new(OutputFormat::Pretty, true)
    }

    #[test]
    fn test_rate_with_output_copies_audio() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("song.mp3");
        fs::write(&file, TAGGED).unwrap();
        let output = dir.path().join("rated.mp3");

        command_rate(
            file.to_str().unwrap(),
            "a@b",
            9,
            Some(output.to_str().unwrap()),
            &quiet(),
        )
        .unwrap();

        assert_eq!(fs::read(&file).unwrap(), TAGGED);
        assert!(fs::read(&output).unwrap().ends_with(b"audio"));
        assert_eq!(Tag::read(&output).unwrap().popularity("a@b").unwrap().rating, 9);
    }

    #[test]
    fn test_text_rejects_non_text_frame() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("song.mp3");
        fs::write(&file, TAGGED).unwrap();

        assert!(command_text(file.to_str().unwrap(), "COMM", Some("x"), &quiet()).is_err());
        assert_eq!(fs::read(&file).unwrap(), TAGGED);

        command_text(file.to_str().unwrap(), "TIT2", Some("Title"), &quiet()).unwrap();
        assert_eq!(Tag::read(&file).unwrap().title().as_deref(), Some("Title"));
    }
}
