//! Brief body sampling.

/// Lines kept from the start of a brief body.
pub const BRIEF_HEAD: usize = 5;
/// Lines kept from the end of a brief body.
pub const BRIEF_TAIL: usize = 3;

/// Pick the lines shown in brief mode.
///
/// The text is split on `\n`, dropping the empty segment after a final line
/// feed. Bodies of at most `BRIEF_HEAD + BRIEF_TAIL` lines are shown whole;
/// longer ones show the first `BRIEF_HEAD` and the last `BRIEF_TAIL`.
pub fn brief_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }

    if lines.len() <= BRIEF_HEAD + BRIEF_TAIL {
        return lines;
    }
    let tail = lines.len() - BRIEF_TAIL;
    lines.drain(BRIEF_HEAD..tail);
    lines
}
