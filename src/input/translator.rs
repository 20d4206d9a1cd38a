//! Key event to tmux command translation.
//!
//! Modifier precedence: the raw modifier flags and character decide first;
//! a composite symbolic name (`ctrl+c`) is consulted only when the raw
//! fields do not resolve the key.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A key press, decoupled from any particular terminal backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInput {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    /// The character produced, if any. May be a raw control byte.
    pub character: Option<char>,
    /// Lowercase key name (`enter`, `pageup`, `a`) or a composite such as `ctrl+c`.
    pub name: String,
}

impl KeyInput {
    pub fn char(c: char) -> Self {
        Self {
            character: Some(c),
            name: c.to_lowercase().collect(),
            ..Self::default()
        }
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    fn is_composite(&self) -> bool {
        self.name.contains('+')
    }

    /// Parts of a composite name: (ctrl, meta, shift, base key name).
    fn composite_parts(&self) -> Option<(bool, bool, bool, &str)> {
        if !self.is_composite() {
            return None;
        }
        let mut parts: Vec<&str> = self.name.split('+').collect();
        let base = parts.pop().filter(|base| !base.is_empty())?;
        let (mut ctrl, mut meta, mut shift) = (false, false, false);
        for part in parts {
            match part {
                "ctrl" | "control" => ctrl = true,
                "alt" | "meta" | "option" => meta = true,
                "shift" => shift = true,
                _ => {}
            }
        }
        Some((ctrl, meta, shift, base))
    }

    /// The ASCII letter this key denotes, from the character or a one-letter name.
    fn letter(&self) -> Option<char> {
        self.character
            .filter(char::is_ascii_alphabetic)
            .or_else(|| single_letter(&self.name))
            .map(|c| c.to_ascii_lowercase())
    }
}

impl From<KeyEvent> for KeyInput {
    fn from(event: KeyEvent) -> Self {
        let mut input = match event.code {
            KeyCode::Char(c) => KeyInput::char(c),
            KeyCode::BackTab => KeyInput::named("btab").shift(),
            KeyCode::F(n) => KeyInput::named(&format!("f{n}")),
            code => KeyInput::named(special_name(code).unwrap_or_default()),
        };
        input.ctrl |= event.modifiers.contains(KeyModifiers::CONTROL);
        input.meta |= event
            .modifiers
            .intersects(KeyModifiers::ALT | KeyModifiers::META);
        input.shift |= event.modifiers.contains(KeyModifiers::SHIFT);
        input
    }
}

fn special_name(code: KeyCode) -> Option<&'static str> {
    Some(match code {
        KeyCode::Enter => "enter",
        KeyCode::Esc => "escape",
        KeyCode::Tab => "tab",
        KeyCode::Backspace => "backspace",
        KeyCode::Delete => "delete",
        KeyCode::Insert => "insert",
        KeyCode::Up => "up",
        KeyCode::Down => "down",
        KeyCode::Left => "left",
        KeyCode::Right => "right",
        KeyCode::Home => "home",
        KeyCode::End => "end",
        KeyCode::PageUp => "pageup",
        KeyCode::PageDown => "pagedown",
        _ => return None,
    })
}

/// tmux key name for a special key.
fn special_token(name: &str) -> Option<&'static str> {
    Some(match name {
        "enter" | "return" => "Enter",
        "escape" | "esc" => "Escape",
        "tab" => "Tab",
        "btab" | "backtab" => "BTab",
        "backspace" => "Backspace",
        "delete" => "Delete",
        "insert" => "IC",
        "up" => "Up",
        "down" => "Down",
        "left" => "Left",
        "right" => "Right",
        "home" => "Home",
        "end" => "End",
        "pageup" => "PageUp",
        "pagedown" => "PageDown",
        _ => return None,
    })
}

fn single_letter(name: &str) -> Option<char> {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c),
        _ => None,
    }
}

fn is_function_key(name: &str) -> bool {
    name.strip_prefix('f')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Recover the letter behind an ASCII control byte (`0x03` -> `c`).
pub fn decode_control_byte(byte: u8) -> Option<char> {
    if byte >= 32 {
        return None;
    }
    let c = char::from((byte + 64) & 0x7F);
    c.is_ascii_alphabetic().then(|| c.to_ascii_lowercase())
}

/// What the terminal should do with a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Signal the foreground process directly. With `key_fallback`, a
    /// `C-c` key send is the last resort.
    ForceInterrupt { key_fallback: bool },
    /// Not for the terminal; the caller may use it (e.g. focus change).
    Unhandled,
    /// A key tmux has no name for. Swallowed.
    Ignored,
    /// Capture scrollback. `manual` hands the text to a copy view instead
    /// of the clipboard.
    Copy { manual: bool },
    /// Paste from the clipboard.
    Paste,
    /// `C-c`, escalating to signals if the key send fails.
    Interrupt,
    /// Symbolic key tokens.
    Keys(Vec<String>),
    /// Literal text.
    Text(String),
}

/// Resolve a key press. Pure; dispatch happens elsewhere.
pub fn translate(input: &KeyInput) -> Disposition {
    let composite = input.composite_parts();
    let (name_ctrl, name_meta, name_shift, base) = composite.unwrap_or((false, false, false, ""));
    let ctrl = input.ctrl || name_ctrl;
    let meta = input.meta || name_meta;
    let shift = input.shift || name_shift;
    let letter = input.letter().or_else(|| single_letter(base));

    if ctrl && meta {
        match letter {
            Some('c') => return Disposition::ForceInterrupt { key_fallback: true },
            Some('k') => return Disposition::ForceInterrupt { key_fallback: false },
            _ => {}
        }
    }

    if input.name == "escape" || base == "escape" {
        return Disposition::Unhandled;
    }

    if meta && !ctrl && letter == Some('y') {
        return Disposition::Copy { manual: shift };
    }

    if let Some(letter) = control_letter(input) {
        return match (letter, meta) {
            ('v', _) => Disposition::Paste,
            ('c', false) => Disposition::Interrupt,
            (letter, false) => Disposition::Keys(vec![format!("C-{letter}")]),
            (letter, true) => Disposition::Keys(vec![format!("C-M-{letter}")]),
        };
    }

    if let Some(c) = input.character {
        if !input.ctrl && !input.meta && !input.is_composite() && !c.is_control() {
            return Disposition::Text(c.to_string());
        }
    }

    if !ctrl && !meta && !shift {
        if let Some(token) = special_token(&input.name) {
            return Disposition::Keys(vec![token.to_string()]);
        }
    }

    if meta && !ctrl && letter == Some('v') {
        return Disposition::Paste;
    }

    match chord_token(input, ctrl, meta, base) {
        Some(token) => Disposition::Keys(vec![token]),
        None => Disposition::Ignored,
    }
}

/// The letter of a control chord, if this press is one.
fn control_letter(input: &KeyInput) -> Option<char> {
    if let Some(letter) = input
        .character
        .and_then(|c| u8::try_from(c).ok())
        .and_then(decode_control_byte)
    {
        return Some(letter);
    }
    if input.ctrl {
        if let Some(letter) = input.letter() {
            return Some(letter);
        }
    }
    match input.composite_parts() {
        Some((true, _, _, base)) => single_letter(base).map(|c| c.to_ascii_lowercase()),
        _ => None,
    }
}

fn chord_token(input: &KeyInput, ctrl: bool, meta: bool, base: &str) -> Option<String> {
    let key = if let Some(c) = input.character.filter(|c| !c.is_control()) {
        if c.is_ascii_alphabetic() {
            c.to_ascii_lowercase().to_string()
        } else {
            c.to_string()
        }
    } else {
        let name = if base.is_empty() { input.name.as_str() } else { base };
        if name.is_empty() {
            return None;
        }
        match special_token(name) {
            Some(token) => token.to_string(),
            None if is_function_key(name) => name.to_ascii_uppercase(),
            None => name.to_string(),
        }
    };

    let mut token = String::new();
    if ctrl {
        token.push_str("C-");
    }
    if meta {
        token.push_str("M-");
    }
    token.push_str(&key);
    Some(token)
}
