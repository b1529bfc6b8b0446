// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Line-delimited JSON parsing for conversation transcripts.
//!
//! A transcript is a sequence of JSON objects, one per line. Each object
//! describes a single event in a recorded session: a human turn, an assistant
//! turn, a batch of tool results, or bookkeeping that carries no conversation
//! at all.
//!
//! # Format Overview
//!
//! Every record has a top-level `type` field:
//! - `user` with `message.content` as a string is a human message
//! - `user` with `message.content` as a list carries `tool_result` items
//! - `assistant` with `message.content` as a list carries `text`,
//!   `tool_use` and `thinking` items
//! - `progress` and `file-history-snapshot` are metadata
//!
//! Lines that are not valid JSON objects are reported as [`SkipReason`]s
//! rather than aborting the whole document.
//!
//! # Example
//!
//! ```
//! use transcript2md::parser::{parse_transcript, RecordKind};
//!
//! let jsonl = r#"{"type":"user","message":{"role":"user","content":"hello"}}
//! not json
//! {"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"hi"}]}}"#;
//!
//! let transcript = parse_transcript(jsonl);
//! assert_eq!(transcript.records.len(), 2);
//! assert_eq!(transcript.records[0].kind, RecordKind::User);
//! assert_eq!(transcript.skipped.len(), 1);
//! ```

use serde_json::Value;
use snafu::prelude::*;

/// Why a line did not produce a [`Record`].
#[derive(Debug, Snafu)]
pub enum SkipReason {
    /// The line is empty or whitespace only.
    #[snafu(display("blank line"))]
    Blank,

    /// The line is not valid JSON.
    #[snafu(display("malformed JSON: {source}"))]
    Json {
        /// The underlying JSON parsing error.
        source: serde_json::Error,
    },

    /// The line is valid JSON but not an object.
    #[snafu(display("expected a JSON object"))]
    NotAnObject,
}

/// The `type` tag of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    /// A message sent on the human side (text or tool results).
    User,
    /// A message produced by the assistant.
    Assistant,
    /// Streaming progress notification.
    Progress,
    /// Snapshot of tracked files.
    FileHistorySnapshot,
    /// Any other or missing tag, kept verbatim.
    Other(String),
}

impl RecordKind {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "progress" => Self::Progress,
            "file-history-snapshot" => Self::FileHistorySnapshot,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns `true` for kinds that never carry conversation content.
    #[must_use]
    pub const fn is_metadata(&self) -> bool {
        matches!(self, Self::Progress | Self::FileHistorySnapshot)
    }
}

/// The `message.content` payload of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Plain string content.
    Text(String),
    /// An ordered list of typed content items.
    Items(Vec<ContentItem>),
    /// Missing, `null`, or any other shape.
    Missing,
}

/// A typed item inside a content list.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    /// Free-form prose.
    Text(String),

    /// A tool invocation issued by the assistant.
    ToolUse {
        /// Tool name, `unknown` when absent.
        name: String,
        /// Tool arguments. Usually an object; shape depends on the tool.
        input: Value,
    },

    /// Output returned from a tool.
    ///
    /// List-shaped content is flattened by joining its `text` sub-items
    /// with newlines.
    ToolResult {
        /// The flattened tool output.
        content: String,
    },

    /// Internal reasoning. Never rendered.
    Thinking,

    /// An unrecognised item type.
    Other,
}

impl ContentItem {
    fn from_value(value: &Value) -> Self {
        match get_str(value, &["type"]).unwrap_or_default() {
            "text" => Self::Text(get_string(value, &["text"]).unwrap_or_default()),
            "tool_use" => Self::ToolUse {
                name: get_string(value, &["name"]).unwrap_or_else(|| "unknown".to_owned()),
                input: value
                    .get("input")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(serde_json::Map::new())),
            },
            "tool_result" => Self::ToolResult {
                content: flatten_tool_content(value.get("content")),
            },
            "thinking" => Self::Thinking,
            _ => Self::Other,
        }
    }
}

/// One decoded transcript line.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// The record's `type` tag.
    pub kind: RecordKind,

    /// The `message.role` field, if present.
    pub role: Option<String>,

    /// The `message.content` payload.
    pub content: Content,

    /// ISO-8601 timestamp string, if present.
    pub timestamp: Option<String>,
}

impl Record {
    fn from_value(value: &Value) -> Self {
        let kind = RecordKind::from_tag(get_str(value, &["type"]).unwrap_or_default());
        let content = match value.get("message").and_then(|m| m.get("content")) {
            Some(Value::String(text)) => Content::Text(text.clone()),
            Some(Value::Array(items)) => {
                Content::Items(items.iter().map(ContentItem::from_value).collect())
            }
            _ => Content::Missing,
        };

        Self {
            kind,
            role: get_string(value, &["message", "role"]),
            content,
            timestamp: get_string(value, &["timestamp"]),
        }
    }
}

/// A line that was dropped during parsing.
#[derive(Debug)]
pub struct SkippedLine {
    /// One-based line number within the document.
    pub line: usize,
    /// Why the line was dropped.
    pub reason: SkipReason,
}

/// A parsed transcript document.
#[derive(Debug, Default)]
pub struct Transcript {
    /// Records in document order.
    pub records: Vec<Record>,
    /// Malformed lines, in document order. Blank lines are not listed.
    pub skipped: Vec<SkippedLine>,
}

/// Flattens tool-result content into a single string.
///
/// The JSON format allows either a plain string or a list such as
/// `[{"type": "text", "text": "..."}, {"type": "image", ...}]`; only the
/// text entries are kept.
fn flatten_tool_content(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| get_str(item, &["type"]) == Some("text"))
            .map(|item| get_str(item, &["text"]).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

/// Navigates a JSON path and returns the string value at the end.
fn get_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    current.as_str()
}

/// Like [`get_str`] but returns an owned `String`.
fn get_string(value: &Value, path: &[&str]) -> Option<String> {
    get_str(value, path).map(str::to_owned)
}

/// Parses a single transcript line.
///
/// # Errors
///
/// Returns a [`SkipReason`] if the line is blank, is not valid JSON, or is
/// not a JSON object.
pub fn parse_line(line: &str) -> Result<Record, SkipReason> {
    let line = line.trim();
    ensure!(!line.is_empty(), BlankSnafu);

    let value: Value = serde_json::from_str(line).context(JsonSnafu)?;
    ensure!(value.is_object(), NotAnObjectSnafu);

    Ok(Record::from_value(&value))
}

/// Parses a whole line-delimited JSON document.
///
/// Never fails: malformed lines are logged and collected in
/// [`Transcript::skipped`], blank lines are ignored.
#[must_use]
pub fn parse_transcript(input: &str) -> Transcript {
    let mut transcript = Transcript::default();

    for (index, line) in input.lines().enumerate() {
        match parse_line(line) {
            Ok(record) => transcript.records.push(record),
            Err(SkipReason::Blank) => {}
            Err(reason) => {
                tracing::warn!(line = index + 1, %reason, "skipping transcript line");
                transcript.skipped.push(SkippedLine {
                    line: index + 1,
                    reason,
                });
            }
        }
    }

    transcript
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_human_text_record() {
        let record = parse_line(
            r#"{"type":"user","timestamp":"2026-02-10T09:15:00Z","message":{"role":"user","content":"hello"}}"#,
        )
        .unwrap();

        assert_eq!(record.kind, RecordKind::User);
        assert_eq!(record.role.as_deref(), Some("user"));
        assert_eq!(record.content, Content::Text("hello".into()));
        assert_eq!(record.timestamp.as_deref(), Some("2026-02-10T09:15:00Z"));
    }

    #[test]
    fn parses_assistant_content_items() {
        let record = parse_line(
            r#"{"type":"assistant","message":{"role":"assistant","content":[
                {"type":"thinking","thinking":"hmm"},
                {"type":"text","text":"Let me look."},
                {"type":"tool_use","id":"t1","name":"Read","input":{"file_path":"/a.rs"}},
                {"type":"server_tool_use"}
            ]}}"#,
        )
        .unwrap();

        let Content::Items(items) = record.content else {
            panic!("Expected Items, got {:?}", record.content);
        };
        assert_eq!(
            items,
            vec![
                ContentItem::Thinking,
                ContentItem::Text("Let me look.".into()),
                ContentItem::ToolUse {
                    name: "Read".into(),
                    input: json!({"file_path": "/a.rs"}),
                },
                ContentItem::Other,
            ]
        );
    }

    #[test]
    fn tool_use_defaults_name_and_input() {
        let item = ContentItem::from_value(&json!({"type": "tool_use"}));
        assert_eq!(
            item,
            ContentItem::ToolUse {
                name: "unknown".into(),
                input: json!({}),
            }
        );
    }

    #[test]
    fn flattens_list_tool_result_content() {
        let item = ContentItem::from_value(&json!({
            "type": "tool_result",
            "content": [
                {"type": "text", "text": "line one"},
                {"type": "image", "source": {}},
                {"type": "text", "text": "line two"}
            ]
        }));
        assert_eq!(
            item,
            ContentItem::ToolResult {
                content: "line one\nline two".into()
            }
        );
    }

    #[test]
    fn tool_result_with_string_content() {
        let item = ContentItem::from_value(&json!({"type": "tool_result", "content": "ok"}));
        assert_eq!(item, ContentItem::ToolResult { content: "ok".into() });
    }

    #[test]
    fn tool_result_without_content_is_empty() {
        let item = ContentItem::from_value(&json!({"type": "tool_result"}));
        assert_eq!(item, ContentItem::ToolResult { content: String::new() });
    }

    #[test]
    fn classifies_metadata_kinds() {
        let progress = parse_line(r#"{"type":"progress","data":{}}"#).unwrap();
        let snapshot = parse_line(r#"{"type":"file-history-snapshot","snapshot":{}}"#).unwrap();
        let summary = parse_line(r#"{"type":"summary","summary":"x"}"#).unwrap();

        assert!(progress.kind.is_metadata());
        assert!(snapshot.kind.is_metadata());
        assert_eq!(summary.kind, RecordKind::Other("summary".into()));
        assert!(!summary.kind.is_metadata());
    }

    #[test]
    fn missing_message_yields_no_content() {
        let record = parse_line(r#"{"type":"user"}"#).unwrap();
        assert_eq!(record.content, Content::Missing);
        assert!(record.role.is_none());
        assert!(record.timestamp.is_none());
    }

    #[test]
    fn non_string_timestamp_is_ignored() {
        let record = parse_line(r#"{"type":"user","timestamp":12345}"#).unwrap();
        assert!(record.timestamp.is_none());
    }

    #[test]
    fn rejects_blank_line() {
        assert!(matches!(parse_line("   "), Err(SkipReason::Blank)));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            parse_line(r#"{"type": "user""#),
            Err(SkipReason::Json { .. })
        ));
    }

    #[test]
    fn rejects_non_object_json() {
        assert!(matches!(parse_line("[1, 2, 3]"), Err(SkipReason::NotAnObject)));
        assert!(matches!(parse_line("42"), Err(SkipReason::NotAnObject)));
    }

    #[test]
    fn transcript_collects_skipped_lines_with_numbers() {
        let input = concat!(
            r#"{"type":"user","message":{"content":"a"}}"#,
            "\n\n",
            "garbage\n",
            r#"{"type":"progress"}"#,
            "\n",
            "\"just a string\"\n",
        );
        let transcript = parse_transcript(input);

        assert_eq!(transcript.records.len(), 2);
        assert_eq!(transcript.skipped.len(), 2);
        assert_eq!(transcript.skipped[0].line, 3);
        assert!(matches!(transcript.skipped[0].reason, SkipReason::Json { .. }));
        assert_eq!(transcript.skipped[1].line, 5);
        assert!(matches!(
            transcript.skipped[1].reason,
            SkipReason::NotAnObject
        ));
    }

    #[test]
    fn handles_crlf_line_endings() {
        let input = "{\"type\":\"user\",\"message\":{\"content\":\"a\"}}\r\n{\"type\":\"progress\"}\r\n";
        let transcript = parse_transcript(input);

        assert_eq!(transcript.records.len(), 2);
        assert!(transcript.skipped.is_empty());
    }
}
