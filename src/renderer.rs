// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Markdown rendering for aggregated transcript blocks.
//!
//! # Output Format
//!
//! The rendered Markdown includes:
//! - A top-level heading with the document title
//! - `**Date**` and `**Session**` lines from the [`SessionMeta`]
//! - A `### **Human**` or `### **Claude**` section per block, with the
//!   block's `HH:MM` time when known
//! - Tool calls as blockquoted one-liners
//! - Tool output in collapsible `<details>` sections
//!
//! Long code blocks and long tool output are truncated according to
//! [`RenderOptions`].
//!
//! # Example
//!
//! ```
//! use transcript2md::aggregator::{Block, Part, Role};
//! use transcript2md::renderer::{render_transcript, RenderOptions};
//! use transcript2md::sessions::SessionMeta;
//!
//! let blocks = vec![Block {
//!     role: Role::Human,
//!     timestamp: Some("2026-02-10T09:15:00Z".into()),
//!     parts: vec![Part::Text("Hello!".into())],
//! }];
//! let meta = SessionMeta::new("February 10, 2026", "Kickoff");
//!
//! let markdown = render_transcript(&blocks, &meta, &RenderOptions::default());
//!
//! assert!(markdown.contains("**Session**: Kickoff"));
//! assert!(markdown.contains("### **Human** [09:15]"));
//! assert!(markdown.contains("Hello!"));
//! ```

use crate::aggregator::{Block, Part, Role};
use crate::sessions::SessionMeta;
use crate::truncate::{
    DEFAULT_MAX_CODE_LINES, DEFAULT_MAX_OUTPUT_LINES, truncate_code_blocks, truncate_flat,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt::Write;

/// Default top-level heading of a rendered transcript.
pub const DEFAULT_TITLE: &str = "Development Transcript: VR Endless Forest";

const CLOCK_FORMAT: &str = "%H:%M";

/// Configuration options for Markdown rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Text of the top-level heading.
    pub document_title: String,

    /// Maximum lines shown inside a fenced code block in prose.
    pub max_code_lines: usize,

    /// Maximum lines shown for a single tool output.
    pub max_output_lines: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            document_title: DEFAULT_TITLE.to_owned(),
            max_code_lines: DEFAULT_MAX_CODE_LINES,
            max_output_lines: DEFAULT_MAX_OUTPUT_LINES,
        }
    }
}

/// Extracts the `HH:MM` wall-clock time from an ISO-8601 timestamp.
///
/// The time is taken in the timestamp's own offset. Timestamps without an
/// offset, with minute precision, or with only a date (read as midnight) are
/// also accepted. Returns `None` if the input cannot be parsed.
#[must_use]
pub fn format_clock(timestamp: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.format(CLOCK_FORMAT).to_string());
    }
    let offset_form = timestamp
        .strip_suffix('Z')
        .map_or_else(|| timestamp.to_owned(), |rest| format!("{rest}+00:00"));
    let with_offset = ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M%:z", "%Y-%m-%d %H:%M:%S%.f%:z"]
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&offset_form, fmt).ok())
        .map(|dt| dt.naive_local());
    with_offset
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(timestamp, fmt).ok())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|dt| dt.format(CLOCK_FORMAT).to_string())
}

/// Renders finished blocks as a Markdown document.
///
/// Output depends only on the arguments, so identical input always yields
/// identical bytes. The document ends with a single newline.
#[must_use]
pub fn render_transcript(blocks: &[Block], meta: &SessionMeta, opts: &RenderOptions) -> String {
    let mut out = String::new();
    writeln!(out, "# {}\n", opts.document_title).unwrap();
    writeln!(out, "**Date**: {}", meta.date).unwrap();
    writeln!(out, "**Session**: {}\n", meta.title).unwrap();
    writeln!(out, "---\n").unwrap();

    for block in blocks {
        render_block(&mut out, block, opts);
    }

    let len = out.trim_end_matches('\n').len();
    out.truncate(len);
    out.push('\n');
    out
}

fn render_block(out: &mut String, block: &Block, opts: &RenderOptions) {
    let speaker = match block.role {
        Role::Human => "Human",
        Role::Assistant => "Claude",
    };
    let time = block
        .timestamp
        .as_deref()
        .and_then(format_clock)
        .map(|t| format!(" [{t}]"))
        .unwrap_or_default();

    writeln!(out, "### **{speaker}**{time}\n").unwrap();

    for part in &block.parts {
        match part {
            Part::Text(text) => {
                writeln!(out, "{}\n", truncate_code_blocks(text, opts.max_code_lines)).unwrap();
            }
            Part::ToolUse(summary) => {
                writeln!(out, "> {summary}\n").unwrap();
            }
            Part::ToolResult(output) => {
                writeln!(out, "<details><summary>Tool Output</summary>\n").unwrap();
                writeln!(out, "```").unwrap();
                writeln!(out, "{}", truncate_flat(output, opts.max_output_lines)).unwrap();
                writeln!(out, "```\n").unwrap();
                writeln!(out, "</details>\n").unwrap();
            }
        }
    }

    writeln!(out, "---\n").unwrap();
}
