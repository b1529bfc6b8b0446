// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Convert line-delimited JSON conversation transcripts to Markdown.
//!
//! A transcript records an interactive session as one JSON object per line:
//! human messages, assistant messages, tool calls and tool output. This crate
//! turns such a file into a readable Markdown document.
//!
//! # Overview
//!
//! Conversion is a straight pipeline:
//!
//! 1. Parse each line into a typed record, skipping malformed lines
//! 2. Group consecutive same-role records into conversation blocks
//! 3. Render the blocks as Markdown, truncating long code and tool output
//!
//! # Example
//!
//! ```no_run
//! use transcript2md::{aggregator, parser, renderer, sessions::SessionCatalog};
//!
//! let jsonl = std::fs::read_to_string("day1-01-initial-appraisal.jsonl").unwrap();
//! let transcript = parser::parse_transcript(&jsonl);
//! let blocks = aggregator::aggregate(&transcript.records);
//!
//! let meta = SessionCatalog::builtin().resolve("day1-01-initial-appraisal");
//! let markdown = renderer::render_transcript(&blocks, &meta, &renderer::RenderOptions::default());
//! println!("{markdown}");
//! ```
//!
//! # Modules
//!
//! - [`parser`]: line parsing and record types
//! - [`aggregator`]: grouping records into blocks
//! - [`summary`]: one-line tool call summaries
//! - [`truncate`]: code block and tool output truncation
//! - [`renderer`]: Markdown generation
//! - [`sessions`]: display metadata for known sessions
//! - [`convert`]: file and directory conversion

#![deny(missing_docs)]

pub mod aggregator;
pub mod convert;
pub mod parser;
pub mod renderer;
pub mod sessions;
pub mod summary;
pub mod truncate;
