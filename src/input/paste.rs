//! Splitting pasted text into tmux sends.

/// Longest literal send, in characters. Keeps each `send-keys` invocation
/// well under command-line length limits.
pub const PASTE_CHUNK_CHARS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteStep {
    /// Send verbatim with `send-keys -l`.
    Literal(String),
    /// Send a symbolic key.
    Key(&'static str),
}

/// Plan a multi-line paste as a sequence of sends.
///
/// Each line is sent literally, in chunks of at most [`PASTE_CHUNK_CHARS`]
/// characters, with `Enter` between lines but not after the last one.
pub fn paste_plan(text: &str) -> Vec<PasteStep> {
    let normalised = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut steps = Vec::new();
    for (index, line) in normalised.split('\n').enumerate() {
        if index > 0 {
            steps.push(PasteStep::Key("Enter"));
        }
        steps.extend(chunk_chars(line, PASTE_CHUNK_CHARS).map(PasteStep::Literal));
    }
    steps
}

fn chunk_chars(line: &str, size: usize) -> impl Iterator<Item = String> + '_ {
    let mut rest = line;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let split = rest
            .char_indices()
            .nth(size)
            .map_or(rest.len(), |(index, _)| index);
        let (chunk, tail) = rest.split_at(split);
        rest = tail;
        Some(chunk.to_string())
    })
}
