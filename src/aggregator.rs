// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Grouping of records into conversation blocks.
//!
//! Consecutive records from the same side of the conversation are merged
//! into a single [`Block`]: a run of assistant records (text, tool calls and
//! the tool results fed back to them) renders as one assistant turn.
//!
//! # Example
//!
//! ```
//! use transcript2md::aggregator::{aggregate, Part, Role};
//! use transcript2md::parser::parse_transcript;
//!
//! let jsonl = r#"{"type":"user","message":{"content":"hello"}}
//! {"type":"assistant","message":{"content":[{"type":"text","text":"hi"}]}}"#;
//!
//! let blocks = aggregate(&parse_transcript(jsonl).records);
//! assert_eq!(blocks.len(), 2);
//! assert_eq!(blocks[0].role, Role::Human);
//! assert_eq!(blocks[1].parts, vec![Part::Text("hi".into())]);
//! ```

use crate::parser::{Content, ContentItem, Record, RecordKind};
use crate::summary::summarize_tool_use;

/// Which side of the conversation a block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The person driving the session.
    Human,
    /// The assistant, including its tool calls and their results.
    Assistant,
}

/// One renderable fragment of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Free-form prose, possibly containing fenced code.
    Text(String),
    /// One-line summary of a tool invocation.
    ToolUse(String),
    /// Output text returned from a tool.
    ToolResult(String),
}

/// A contiguous run of same-role activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Whose turn this is.
    pub role: Role,
    /// Timestamp of the first record in the run.
    pub timestamp: Option<String>,
    /// Parts in emission order. Never empty.
    pub parts: Vec<Part>,
}

/// Builds blocks from a stream of records.
///
/// Holds at most one open block. Call [`Aggregator::observe`] for each
/// record in order and [`Aggregator::finish`] at the end.
#[derive(Debug, Default)]
pub struct Aggregator {
    open: Option<Block>,
    finished: Vec<Block>,
}

impl Aggregator {
    /// Creates an aggregator with no open block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one record into the aggregator.
    pub fn observe(&mut self, record: &Record) {
        match (&record.kind, &record.content) {
            (kind, _) if kind.is_metadata() => {}
            (RecordKind::User, Content::Text(text)) if !text.trim().is_empty() => {
                self.open_block(Role::Human, record);
                self.push(Part::Text(text.trim().to_owned()));
            }
            (RecordKind::User, Content::Items(items)) => {
                for item in items {
                    if let ContentItem::ToolResult { content } = item {
                        self.push_tool_result(content);
                    }
                }
            }
            (RecordKind::Assistant, Content::Items(items)) => {
                self.open_block(Role::Assistant, record);
                for item in items {
                    match item {
                        ContentItem::Text(text) if !text.trim().is_empty() => {
                            self.push(Part::Text(text.trim().to_owned()));
                        }
                        ContentItem::ToolUse { name, input } => {
                            self.push(Part::ToolUse(summarize_tool_use(name, input)));
                        }
                        _ => {}
                    }
                }
            }
            (kind, _) => tracing::debug!(?kind, "ignoring record"),
        }
    }

    /// Closes the open block.
    ///
    /// The block is kept only if it has at least one part. Safe to call when
    /// no block is open.
    pub fn flush(&mut self) {
        if let Some(block) = self.open.take()
            && !block.parts.is_empty()
        {
            self.finished.push(block);
        }
    }

    /// Flushes the open block and returns all finished blocks in order.
    #[must_use]
    pub fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.finished
    }

    /// Blocks finished so far, excluding the open one.
    #[must_use]
    pub fn finished(&self) -> &[Block] {
        &self.finished
    }

    /// Role of the currently open block, if any.
    #[must_use]
    pub fn open_role(&self) -> Option<Role> {
        self.open.as_ref().map(|block| block.role)
    }

    /// Starts a new block unless one with the same role is already open.
    fn open_block(&mut self, role: Role, record: &Record) {
        if self.open_role() == Some(role) {
            return;
        }
        self.flush();
        self.open = Some(Block {
            role,
            timestamp: record.timestamp.clone(),
            parts: Vec::new(),
        });
    }

    fn push(&mut self, part: Part) {
        if let Some(block) = self.open.as_mut() {
            block.parts.push(part);
        }
    }

    /// Attaches tool output to the open assistant block.
    ///
    /// Results arriving while no block or a human block is open are dropped.
    fn push_tool_result(&mut self, content: &str) {
        let content = content.trim();
        if content.is_empty() {
            return;
        }
        match self.open.as_mut() {
            Some(block) if block.role == Role::Assistant => {
                block.parts.push(Part::ToolResult(content.to_owned()));
            }
            _ => tracing::debug!("dropping tool result outside an assistant turn"),
        }
    }
}

/// Groups a full record sequence into blocks.
#[must_use]
pub fn aggregate(records: &[Record]) -> Vec<Block> {
    let mut aggregator = Aggregator::new();
    for record in records {
        aggregator.observe(record);
    }
    aggregator.finish()
}
