//! Task line lookup.
//!
//! Finds the line that holds a task, first by its embedded id marker and
//! then by exact text. Absence is a normal outcome and is returned as `None`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Identifies the task a navigation request is aimed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// Stable id carried inline on the task line, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Task content after the checkbox marker.
    pub text: String,
}

impl TaskDescriptor {
    /// Descriptor matched by text only.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
        }
    }

    /// Descriptor matched by id first, falling back to text.
    pub fn with_id(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            text: text.into(),
        }
    }

    /// Find this task in `lines`.
    pub fn locate<S: AsRef<str>>(&self, lines: &[S]) -> Option<usize> {
        locate(lines, self.id.as_deref(), &self.text)
    }
}

// `#id:abc`, `🆔 abc` and `[id:: abc]`.
static TASK_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#id:(?P<hash>[^\s\]]+)|🆔\s*(?P<emoji>[^\s\]]+)|\[id::\s*(?P<field>[^\s\]]+)\s*\]")
        .expect("task id pattern is valid")
});

/// Every task id marker on a line, in order of appearance.
///
/// A marker only counts when whitespace or a line edge sits on both sides of
/// it, so `foo#id:7` carries no id and `#id:12]` is not `12`.
fn task_ids(line: &str) -> impl Iterator<Item = &str> {
    TASK_ID.captures_iter(line).filter_map(|caps| {
        let whole = caps.get(0)?;
        let before_ok = line[..whole.start()]
            .chars()
            .next_back()
            .is_none_or(char::is_whitespace);
        let after_ok = line[whole.end()..]
            .chars()
            .next()
            .is_none_or(char::is_whitespace);
        if !(before_ok && after_ok) {
            return None;
        }
        caps.name("hash")
            .or_else(|| caps.name("emoji"))
            .or_else(|| caps.name("field"))
            .map(|m| m.as_str())
    })
}

/// The first task id marker on a line, if any.
pub fn task_id(line: &str) -> Option<&str> {
    task_ids(line).next()
}

/// Strip leading list/checkbox markers and surrounding whitespace.
///
/// `"  - [x] call mom "` becomes `"call mom"`. Lines without markers are
/// only trimmed.
pub fn strip_task_markers(line: &str) -> &str {
    let mut rest = line.trim();

    if let Some(after) = rest
        .strip_prefix(['-', '*', '+'])
        .filter(|after| after.is_empty() || after.starts_with(char::is_whitespace))
    {
        rest = after.trim_start();
    } else if let Some(after) = strip_ordered_marker(rest) {
        rest = after.trim_start();
    }

    if let Some(after) = strip_checkbox(rest) {
        rest = after.trim_start();
    }

    rest.trim_end()
}

// `1.` or `1)` followed by whitespace or end of line.
fn strip_ordered_marker(s: &str) -> Option<&str> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let after = s[digits..].strip_prefix(['.', ')'])?;
    (after.is_empty() || after.starts_with(char::is_whitespace)).then_some(after)
}

// `[ ]`, `[x]`, `[/]`, ... : one status character between brackets.
fn strip_checkbox(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('[')?;
    let mut chars = inner.chars();
    let status = chars.next()?;
    if status == ']' {
        return None;
    }
    let after = chars.as_str().strip_prefix(']')?;
    (after.is_empty() || after.starts_with(char::is_whitespace)).then_some(after)
}

/// Find the zero-based line holding a task.
///
/// An id marker match wins over a text match. Within each pass the first
/// line from the top wins, so duplicate tasks resolve to the earliest one.
pub fn locate<S: AsRef<str>>(lines: &[S], id: Option<&str>, text: &str) -> Option<usize> {
    if let Some(id) = id.filter(|id| !id.is_empty())
        && let Some(idx) = lines
            .iter()
            .position(|line| task_ids(line.as_ref()).any(|found| found == id))
    {
        return Some(idx);
    }

    let wanted = strip_task_markers(text);
    if wanted.is_empty() {
        return None;
    }
    lines
        .iter()
        .position(|line| strip_task_markers(line.as_ref()) == wanted)
}

/// Split document text into lines the way an editor numbers them.
pub fn document_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Vec<&'static str> {
        vec![
            "---",
            "tags: x",
            "---",
            "- [ ] buy milk",
            "- [x] call mom",
        ]
    }

    #[test]
    fn test_locate_by_text_after_frontmatter() {
        assert_eq!(locate(&doc(), None, "call mom"), Some(4));
    }

    #[test]
    fn test_id_match_takes_priority_over_text() {
        let lines = ["- [ ] task A #id:123", "- [ ] task B"];
        assert_eq!(locate(&lines, Some("123"), "unused"), Some(0));
        assert_eq!(locate(&lines, Some("123"), "task B"), Some(0));
    }

    #[test]
    fn test_missing_task_is_none() {
        assert_eq!(locate(&doc(), None, "missing task"), None);
    }

    #[test]
    fn test_unknown_id_falls_back_to_text() {
        let lines = ["- [ ] task A #id:123", "- [ ] task B"];
        assert_eq!(locate(&lines, Some("999"), "task B"), Some(1));
    }

    #[test]
    fn test_empty_inputs_are_none() {
        let empty: [&str; 0] = [];
        assert_eq!(locate(&empty, None, "anything"), None);
        assert_eq!(locate(&empty, Some("1"), "anything"), None);
        assert_eq!(locate(&doc(), None, ""), None);
        assert_eq!(locate(&doc(), None, "   "), None);
    }

    #[test]
    fn test_empty_id_is_ignored() {
        assert_eq!(locate(&doc(), Some(""), "buy milk"), Some(3));
    }

    #[test]
    fn test_duplicates_resolve_to_first_line() {
        let lines = ["- [ ] same", "text", "- [x] same"];
        assert_eq!(locate(&lines, None, "same"), Some(0));
    }

    #[test]
    fn test_id_prefix_does_not_match_longer_id() {
        let lines = ["- [ ] a #id:1234", "- [ ] b #id:123"];
        assert_eq!(locate(&lines, Some("123"), "zzz"), Some(1));
    }

    #[test]
    fn test_id_inside_word_is_not_a_marker() {
        let lines = ["- [ ] see foo#id:7 for details"];
        assert_eq!(task_id(lines[0]), None);
        assert_eq!(locate(&lines, Some("7"), "nope"), None);
    }

    #[test]
    fn test_task_id_formats() {
        assert_eq!(task_id("- [ ] a #id:abc"), Some("abc"));
        assert_eq!(task_id("- [ ] a 🆔 k3x9 📅 2024-01-01"), Some("k3x9"));
        assert_eq!(task_id("- [ ] a [id:: q1] more"), Some("q1"));
        assert_eq!(task_id("- [ ] plain"), None);
    }

    #[test]
    fn test_second_marker_on_line_matches() {
        let lines = ["- [ ] a #id:one [id:: two]"];
        assert_eq!(locate(&lines, Some("two"), ""), Some(0));
    }

    #[test]
    fn test_strip_task_markers() {
        assert_eq!(strip_task_markers("- [ ] buy milk"), "buy milk");
        assert_eq!(strip_task_markers("  * [x]   call mom  "), "call mom");
        assert_eq!(strip_task_markers("+ [/] in progress"), "in progress");
        assert_eq!(strip_task_markers("12. [ ] numbered"), "numbered");
        assert_eq!(strip_task_markers("3) plain item"), "plain item");
        assert_eq!(strip_task_markers("plain text"), "plain text");
        assert_eq!(strip_task_markers("- [ ]"), "");
    }

    #[test]
    fn test_strip_keeps_non_marker_prefixes() {
        assert_eq!(strip_task_markers("-dash word"), "-dash word");
        assert_eq!(strip_task_markers("[link] text"), "[link] text");
        assert_eq!(strip_task_markers("2024. a year"), "a year");
        assert_eq!(strip_task_markers("v1.2 release"), "v1.2 release");
    }

    #[test]
    fn test_text_is_stripped_before_comparing() {
        assert_eq!(locate(&doc(), None, "- [ ] call mom"), Some(4));
        assert_eq!(locate(&doc(), None, "  call mom  "), Some(4));
    }

    #[test]
    fn test_descriptor_locate_and_serde() {
        let task = TaskDescriptor::with_id("123", "unused");
        assert_eq!(task.locate(&["- [ ] x #id:123"]), Some(0));

        let json = serde_json::to_string(&TaskDescriptor::from_text("call mom")).unwrap();
        assert_eq!(json, r#"{"text":"call mom"}"#);
        let back: TaskDescriptor = serde_json::from_str(r#"{"id":"9","text":"t"}"#).unwrap();
        assert_eq!(back, TaskDescriptor::with_id("9", "t"));
    }

    #[test]
    fn test_document_lines_trims_carriage_returns() {
        assert_eq!(document_lines("a\r\nb\n"), vec!["a", "b", ""]);
        assert_eq!(document_lines(""), vec![""]);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn locate_finds_first_verbatim_occurrence(
                filler in proptest::collection::vec("[a-z ]{0,12}", 0..20),
                at in 0..20usize,
                text in "[a-z]{3,10}( [a-z]{1,8})?",
            ) {
                let mut lines: Vec<String> =
                    filler.iter().map(|f| format!("NOTE {f}")).collect();
                let at = at.min(lines.len());
                lines.insert(at, format!("- [ ] {text}"));
                lines.push(format!("- [x] {text}"));
                prop_assert_eq!(locate(&lines, None, &text), Some(at));
            }

            #[test]
            fn locate_never_panics(
                lines in proptest::collection::vec(".{0,40}", 0..30),
                id in proptest::option::of(".{0,8}"),
                text in ".{0,20}",
            ) {
                let found = locate(&lines, id.as_deref(), &text);
                if let Some(idx) = found {
                    prop_assert!(idx < lines.len());
                }
            }

            #[test]
            fn absent_text_is_not_found(
                filler in proptest::collection::vec("[a-z ]{0,12}", 0..20),
            ) {
                let lines: Vec<String> =
                    filler.iter().map(|f| format!("- [ ] {f}")).collect();
                prop_assert_eq!(locate(&lines, None, "MISSING TASK"), None);
            }
        }
    }
}
