// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Line-based truncation of long text.
//!
//! Both transformations are applied at render time and keep the output
//! well-formed Markdown: a truncated code fence is always closed again.

/// Default maximum number of lines shown inside a fenced code block.
pub const DEFAULT_MAX_CODE_LINES: usize = 50;

/// Default maximum number of lines shown for tool output.
pub const DEFAULT_MAX_OUTPUT_LINES: usize = 30;

/// Truncates fenced code blocks longer than `max_lines`.
///
/// A fence opens on a line whose trimmed form starts with `` ``` `` or `~~~`
/// and closes on a line whose trimmed form is exactly that three-character
/// marker. Once a block exceeds `max_lines`, the remaining lines are replaced
/// by a blank line, a `[... truncated (N+ lines)]` marker and the closing
/// fence. An unclosed fence at the end of input is treated the same way: it
/// passes through while within `max_lines` and is truncated and closed once
/// it exceeds them. Text outside fences passes through unchanged.
///
/// # Example
///
/// ```
/// use transcript2md::truncate::truncate_code_blocks;
///
/// let text = "```\na\nb\nc\n```";
/// assert_eq!(truncate_code_blocks(text, 2), "```\na\nb\n\n[... truncated (3+ lines)]\n```");
/// ```
#[must_use]
pub fn truncate_code_blocks(text: &str, max_lines: usize) -> String {
    let mut result: Vec<String> = Vec::new();
    let mut fence: Option<&str> = None;
    let mut code_lines = 0usize;
    let mut truncated = false;

    for line in text.split('\n') {
        let trimmed = line.trim();

        match fence {
            None => {
                if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                    // Both markers are ASCII, so the first three bytes are the marker.
                    fence = Some(&trimmed[..3]);
                    code_lines = 0;
                    truncated = false;
                }
                result.push(line.to_owned());
            }
            Some(marker) if trimmed == marker => {
                fence = None;
                // A truncated block was already closed at the point of overflow.
                if !truncated {
                    result.push(line.to_owned());
                }
            }
            Some(marker) => {
                code_lines += 1;
                if code_lines <= max_lines {
                    result.push(line.to_owned());
                } else if !truncated {
                    result.push(String::new());
                    result.push(format!("[... truncated ({code_lines}+ lines)]"));
                    result.push(marker.to_owned());
                    truncated = true;
                }
            }
        }
    }

    result.join("\n")
}

/// Keeps at most `max_lines` lines of `text`.
///
/// Text with `max_lines` lines or fewer is returned unchanged. Longer text
/// is cut to its first `max_lines` lines followed by a
/// `[... truncated (N total lines)]` marker line.
///
/// # Example
///
/// ```
/// use transcript2md::truncate::truncate_flat;
///
/// assert_eq!(truncate_flat("a\nb\nc", 2), "a\nb\n[... truncated (3 total lines)]");
/// assert_eq!(truncate_flat("a\nb", 2), "a\nb");
/// ```
#[must_use]
pub fn truncate_flat(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() <= max_lines {
        return text.to_owned();
    }
    format!(
        "{}\n[... truncated ({} total lines)]",
        lines[..max_lines].join("\n"),
        lines.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fenced(marker: &str, lang: &str, body_lines: usize) -> String {
        let mut lines = vec![format!("{marker}{lang}")];
        lines.extend((1..=body_lines).map(|i| format!("line {i}")));
        lines.push(marker.to_owned());
        lines.join("\n")
    }

    #[test]
    fn short_code_block_unchanged() {
        let text = format!("Intro\n{}\nOutro", fenced("```", "rust", 10));
        assert_eq!(truncate_code_blocks(&text, 50), text);
    }

    #[test]
    fn code_block_at_threshold_unchanged() {
        let text = fenced("```", "", 50);
        assert_eq!(truncate_code_blocks(&text, 50), text);
    }

    #[test]
    fn long_code_block_truncated_and_closed() {
        let text = fenced("```", "rust", 60);
        let output = truncate_code_blocks(&text, 50);
        let lines: Vec<&str> = output.lines().collect();

        // opening fence + 50 lines + blank + marker + closing fence
        assert_eq!(lines.len(), 54);
        assert_eq!(lines[0], "```rust");
        assert_eq!(lines[50], "line 50");
        assert_eq!(lines[51], "");
        assert_eq!(lines[52], "[... truncated (51+ lines)]");
        assert_eq!(lines[53], "```");
        assert!(!output.contains("line 51"));
    }

    #[test]
    fn text_after_truncated_block_is_kept() {
        let text = format!("{}\nafter", fenced("```", "", 5));
        let output = truncate_code_blocks(&text, 2);
        assert_eq!(
            output,
            "```\nline 1\nline 2\n\n[... truncated (3+ lines)]\n```\nafter"
        );
    }

    #[test]
    fn tilde_fences_are_recognised() {
        let text = fenced("~~~", "", 4);
        assert_eq!(
            truncate_code_blocks(&text, 1),
            "~~~\nline 1\n\n[... truncated (2+ lines)]\n~~~"
        );
    }

    #[test]
    fn backticks_do_not_close_tilde_fence() {
        let text = "~~~\n```\ninside\n~~~";
        assert_eq!(truncate_code_blocks(text, 50), text);
    }

    #[test]
    fn indented_fences_are_recognised() {
        let text = "  ```\n  a\n  b\n  c\n  ```";
        assert_eq!(
            truncate_code_blocks(text, 2),
            "  ```\n  a\n  b\n\n[... truncated (3+ lines)]\n```"
        );
    }

    #[test]
    fn each_block_counted_separately() {
        let text = format!("{}\n{}", fenced("```", "", 3), fenced("```", "", 3));
        assert_eq!(truncate_code_blocks(&text, 3), text);
    }

    #[test]
    fn unclosed_fence_passes_through_up_to_threshold() {
        let text = "```\na\nb";
        assert_eq!(truncate_code_blocks(text, 5), text);
    }

    #[test]
    fn unclosed_fence_over_threshold_is_truncated_and_closed() {
        assert_eq!(
            truncate_code_blocks("```\n1\n2\n3\n4\n5", 2),
            "```\n1\n2\n\n[... truncated (3+ lines)]\n```"
        );
    }

    #[test]
    fn text_outside_fences_is_never_truncated() {
        let text = (0..200).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        assert_eq!(truncate_code_blocks(&text, 5), text);
    }

    #[test]
    fn code_truncation_is_idempotent() {
        let text = format!("before\n{}\nafter", fenced("```", "py", 80));
        let once = truncate_code_blocks(&text, 50);
        let twice = truncate_code_blocks(&once, 50);
        assert_eq!(once, twice);
    }

    #[test]
    fn flat_truncation_keeps_short_text() {
        let text = (1..=30).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        assert_eq!(truncate_flat(&text, 30), text);
    }

    #[test]
    fn flat_truncation_reports_total() {
        let text = (1..=45).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let output = truncate_flat(&text, 30);
        let lines: Vec<&str> = output.split('\n').collect();

        assert_eq!(lines.len(), 31);
        assert_eq!(lines[29], "30");
        assert_eq!(lines[30], "[... truncated (45 total lines)]");
    }

    #[test]
    fn flat_truncation_of_empty_text() {
        assert_eq!(truncate_flat("", 0), "\n[... truncated (1 total lines)]");
        assert_eq!(truncate_flat("", 30), "");
    }
}
