// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! One-line summaries of tool invocations.
//!
//! Tool inputs can be arbitrarily large (whole file contents for a write,
//! long shell pipelines), so the rendered transcript shows a single line per
//! call that names the tool and its most relevant argument.

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{Formatter, Serializer};
use std::io;

/// Maximum number of characters kept from a command or serialized input.
pub const MAX_SUMMARY_CHARS: usize = 120;

/// Summarizes a tool invocation as a single Markdown line.
///
/// | Tool                      | Shown                                        |
/// |---------------------------|----------------------------------------------|
/// | `Bash`                    | `description`, else `command` (truncated)    |
/// | `Read`, `Glob`, `Grep`    | `file_path`, else `pattern`, else `path`     |
/// | `Write`, `Edit`           | `file_path`                                  |
/// | anything else             | the input serialized as JSON (truncated)     |
///
/// Serialized JSON keeps the input's key order, separates items with `", "`
/// and keys from values with `": "`, and escapes non-ASCII characters.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use transcript2md::summary::summarize_tool_use;
///
/// let line = summarize_tool_use("Bash", &json!({"command": "ls -la", "description": ""}));
/// assert_eq!(line, "**Bash**: `ls -la`");
/// ```
#[must_use]
pub fn summarize_tool_use(name: &str, input: &Value) -> String {
    match name {
        "Bash" => {
            let label = match input.get("description").and_then(Value::as_str) {
                Some(desc) if !desc.is_empty() => desc.to_owned(),
                _ => {
                    let command = input
                        .get("command")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    truncate_chars(command, MAX_SUMMARY_CHARS, "...")
                }
            };
            format!("**{name}**: `{label}`")
        }
        "Read" | "Glob" | "Grep" => {
            let target = ["file_path", "pattern", "path"]
                .iter()
                .find_map(|key| input.get(*key))
                .map_or_else(|| to_display_json(input), display_value);
            format!("**{name}**: `{target}`")
        }
        "Write" | "Edit" => {
            let target = input.get("file_path").map(display_value).unwrap_or_default();
            format!("**{name}**: `{target}`")
        }
        _ => {
            let serialized = to_display_json(input);
            format!(
                "**{name}**: {}",
                truncate_chars(&serialized, MAX_SUMMARY_CHARS, "")
            )
        }
    }
}

/// Renders a JSON value for display: strings verbatim, anything else as JSON.
fn display_value(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| to_display_json(value), str::to_owned)
}

/// JSON formatter with spaced separators and ASCII-only strings.
struct SpacedAsciiFormatter;

impl Formatter for SpacedAsciiFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(c.encode_utf8(&mut [0; 4]).as_bytes())?;
            } else {
                for unit in c.encode_utf16(&mut [0; 2]) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

/// Serializes `value` with [`SpacedAsciiFormatter`].
fn to_display_json(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, SpacedAsciiFormatter);
    if value.serialize(&mut serializer).is_err() {
        return value.to_string();
    }
    // The formatter only emits ASCII.
    String::from_utf8(buf).unwrap_or_else(|_| value.to_string())
}

/// Keeps the first `max` characters of `s`, appending `marker` if anything was cut.
fn truncate_chars(s: &str, max: usize, marker: &str) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{marker}", &s[..cut]),
        None => s.to_owned(),
    }
}
