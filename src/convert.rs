// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! End-to-end conversion of transcript files.
//!
//! Ties the stages together: [`parse_transcript`], [`aggregate`] and
//! [`render_transcript`]. Batch conversion runs the single-file pipeline once
//! per input and keeps going when one file fails.

use crate::aggregator::aggregate;
use crate::parser::parse_transcript;
use crate::renderer::{RenderOptions, render_transcript};
use crate::sessions::{SessionCatalog, SessionMeta};
use snafu::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extension of transcript inputs.
pub const INPUT_EXTENSION: &str = "jsonl";

/// Error type for converting a transcript file.
#[derive(Debug, Snafu)]
pub enum ConvertError {
    /// Failed to read the input file.
    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        /// The input path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write the output file or create its directory.
    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        /// The output path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The input path has no file stem to derive a session from.
    #[snafu(display("invalid input filename: {}", path.display()))]
    InvalidFilename {
        /// The offending path.
        path: PathBuf,
    },

    /// Failed to list the input directory.
    #[snafu(display("failed to scan {}: {source}", path.display()))]
    ScanDir {
        /// The directory being scanned.
        path: PathBuf,
        /// The underlying traversal error.
        source: walkdir::Error,
    },
}

/// In-memory result of converting one transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// The rendered Markdown document.
    pub markdown: String,
    /// Number of conversation blocks rendered.
    pub blocks: usize,
    /// Number of malformed lines skipped.
    pub skipped_lines: usize,
}

/// Summary of one converted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The transcript that was read.
    pub input: PathBuf,
    /// The Markdown file that was written.
    pub output: PathBuf,
    /// Number of conversation blocks rendered.
    pub blocks: usize,
    /// Number of malformed lines skipped.
    pub skipped_lines: usize,
}

/// Outcome of a batch conversion.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files converted successfully, in processing order.
    pub converted: Vec<Report>,
    /// Files that failed, with the reason.
    pub failed: Vec<(PathBuf, ConvertError)>,
}

impl BatchReport {
    /// Total number of files attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.converted.len() + self.failed.len()
    }
}

/// Converts transcript text to Markdown.
///
/// # Example
///
/// ```
/// use transcript2md::convert::convert_str;
/// use transcript2md::renderer::RenderOptions;
/// use transcript2md::sessions::SessionMeta;
///
/// let jsonl = r#"{"type":"user","message":{"content":"hello"}}"#;
/// let meta = SessionMeta::new("Today", "Demo");
/// let conversion = convert_str(jsonl, &meta, &RenderOptions::default());
///
/// assert_eq!(conversion.blocks, 1);
/// assert!(conversion.markdown.contains("hello"));
/// ```
#[must_use]
pub fn convert_str(jsonl: &str, meta: &SessionMeta, opts: &RenderOptions) -> Conversion {
    let transcript = parse_transcript(jsonl);
    let blocks = aggregate(&transcript.records);
    tracing::debug!(
        records = transcript.records.len(),
        blocks = blocks.len(),
        skipped = transcript.skipped.len(),
        "aggregated transcript"
    );

    Conversion {
        markdown: render_transcript(&blocks, meta, opts),
        blocks: blocks.len(),
        skipped_lines: transcript.skipped.len(),
    }
}

/// Returns the input path with its extension replaced by `.md`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("md")
}

/// Converts one transcript file.
///
/// Session metadata is looked up in `catalog` by the input's file stem.
/// When `output` is `None` the Markdown is written next to the input (see
/// [`default_output_path`]). Missing parent directories of the output are
/// created.
///
/// # Errors
///
/// Returns an error if the input has no file stem, cannot be read as UTF-8
/// text, or the output cannot be written.
pub fn convert_file(
    input: &Path,
    output: Option<&Path>,
    catalog: &SessionCatalog,
    opts: &RenderOptions,
) -> Result<Report, ConvertError> {
    let stem = input
        .file_stem()
        .context(InvalidFilenameSnafu { path: input })?
        .to_string_lossy();
    let meta = catalog.resolve(&stem);
    let output = output.map_or_else(|| default_output_path(input), Path::to_path_buf);

    let jsonl = std::fs::read_to_string(input).context(ReadFileSnafu { path: input })?;
    let conversion = convert_str(&jsonl, &meta, opts);

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context(WriteFileSnafu { path: &output })?;
    }
    std::fs::write(&output, &conversion.markdown).context(WriteFileSnafu { path: &output })?;

    Ok(Report {
        input: input.to_path_buf(),
        output,
        blocks: conversion.blocks,
        skipped_lines: conversion.skipped_lines,
    })
}

/// Lists the transcript files directly inside `dir`, sorted by path.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.context(ScanDirSnafu { path: dir })?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext == INPUT_EXTENSION)
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Converts every transcript in `dir`, writing each output next to its input.
///
/// A failure on one file is recorded in the report and does not stop the
/// remaining files.
///
/// # Errors
///
/// Returns an error only if the directory itself cannot be scanned.
pub fn convert_dir(
    dir: &Path,
    catalog: &SessionCatalog,
    opts: &RenderOptions,
) -> Result<BatchReport, ConvertError> {
    let mut report = BatchReport::default();

    for input in discover_inputs(dir)? {
        match convert_file(&input, None, catalog, opts) {
            Ok(converted) => report.converted.push(converted),
            Err(err) => {
                tracing::error!(path = %input.display(), %err, "conversion failed");
                report.failed.push((input, err));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_replaces_extension() {
        assert_eq!(
            default_output_path(Path::new("logs/day1-01.jsonl")),
            PathBuf::from("logs/day1-01.md")
        );
        assert_eq!(
            default_output_path(Path::new("session")),
            PathBuf::from("session.md")
        );
    }

    #[test]
    fn convert_str_counts_blocks_and_skips() {
        let jsonl = concat!(
            r#"{"type":"user","message":{"content":"q"}}"#,
            "\n{broken\n",
            r#"{"type":"assistant","message":{"content":[{"type":"text","text":"a"}]}}"#,
            "\n",
        );
        let conversion = convert_str(jsonl, &SessionMeta::new("d", "t"), &RenderOptions::default());

        assert_eq!(conversion.blocks, 2);
        assert_eq!(conversion.skipped_lines, 1);
        assert!(conversion.markdown.contains("### **Human**"));
        assert!(conversion.markdown.contains("### **Claude**"));
    }

    #[test]
    fn empty_input_renders_header_only() {
        let conversion = convert_str("", &SessionMeta::new("d", "t"), &RenderOptions::default());
        assert_eq!(conversion.blocks, 0);
        assert!(conversion.markdown.ends_with("---\n"));
    }

    #[test]
    fn missing_input_is_read_error() {
        let result = convert_file(
            Path::new("/nonexistent/transcript.jsonl"),
            None,
            &SessionCatalog::empty(),
            &RenderOptions::default(),
        );
        assert!(matches!(result, Err(ConvertError::ReadFile { .. })));
    }
}
