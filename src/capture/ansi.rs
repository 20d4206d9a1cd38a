use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

static ANSI_ESCAPE: OnceLock<Regex> = OnceLock::new();

fn ansi_escape() -> &'static Regex {
    ANSI_ESCAPE.get_or_init(|| {
        // Two-byte escapes (ESC @ .. ESC _) and CSI sequences.
        Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])")
            .expect("ANSI escape pattern is valid")
    })
}

/// Remove terminal escape sequences, leaving plain text.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ansi_escape().replace_all(text, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_colour_and_cursor_sequences() {
        assert_eq!(strip_ansi("\x1b[1;31merror\x1b[0m: nope"), "error: nope");
        assert_eq!(strip_ansi("\x1b[2Jcleared\x1b[H"), "cleared");
        assert_eq!(strip_ansi("a\x1bMb"), "ab");
    }

    #[test]
    fn plain_text_is_borrowed_unchanged() {
        let text = "$ ls -la\ntotal 0";
        assert!(matches!(strip_ansi(text), Cow::Borrowed(t) if t == text));
    }
}
