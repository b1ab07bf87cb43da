//! Key decoding for raw terminal input.
//!
//! Raw stdin chunks are split into single key sequences with [`split_sequences`] and decoded
//! with [`parse_key_press`]. Only legacy xterm/VT forms are recognised; anything else decodes
//! to `None` and is ignored by the editor.

const ESC: char = '\x1b';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Escape,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyModifiers {
    pub const NONE: KeyModifiers = KeyModifiers {
        ctrl: false,
        alt: false,
        shift: false,
    };

    pub const CTRL: KeyModifiers = KeyModifiers {
        ctrl: true,
        alt: false,
        shift: false,
    };

    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift
    }
}

/// One decoded key: identity, modifiers, and the printable character it carries, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: KeyModifiers,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(ch: char) -> Self {
        Self {
            key: Key::Char(ch),
            modifiers: KeyModifiers::CTRL,
        }
    }

    pub fn alt(key: Key) -> Self {
        Self {
            key,
            modifiers: KeyModifiers {
                alt: true,
                ..KeyModifiers::NONE
            },
        }
    }

    /// The character to insert, for unmodified character keys.
    pub fn printable(&self) -> Option<char> {
        match self.key {
            Key::Char(ch) if !self.modifiers.ctrl && !self.modifiers.alt => Some(ch),
            _ => None,
        }
    }

    pub fn is_ctrl(&self, ch: char) -> bool {
        self.modifiers.ctrl && self.key == Key::Char(ch)
    }
}

/// Split a raw input chunk into individual key sequences.
///
/// An escape sequence that is cut off at the end of the chunk is returned as-is. Callers that
/// read in pieces use [`split_complete`] and keep the tail instead.
pub fn split_sequences(data: &str) -> Vec<&str> {
    let (mut out, tail) = split_complete(data);
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

/// Split `data` into complete key sequences and the unfinished escape sequence at its end.
///
/// The tail is empty unless `data` ends inside an ESC, CSI or SS3 sequence.
pub fn split_complete(data: &str) -> (Vec<&str>, &str) {
    let mut out = Vec::new();
    let mut rest = data;
    while let Some(len) = sequence_len(rest) {
        out.push(&rest[..len]);
        rest = &rest[len..];
    }
    (out, rest)
}

/// Byte length of the first sequence in `data`, or `None` when it needs more bytes.
fn sequence_len(data: &str) -> Option<usize> {
    let mut chars = data.char_indices();
    let (_, first) = chars.next()?;
    if first != ESC {
        return Some(first.len_utf8());
    }
    match chars.next() {
        None => None,
        Some((idx, '[')) => {
            // CSI: parameters and intermediates up to a final byte in 0x40..=0x7e.
            data[idx + 1..]
                .char_indices()
                .find(|&(pos, ch)| ('\x40'..='\x7e').contains(&ch) && !(pos == 0 && ch == '['))
                .map(|(pos, ch)| idx + 1 + pos + ch.len_utf8())
        }
        Some((idx, 'O')) => data[idx + 1..]
            .chars()
            .next()
            .map(|ch| idx + 1 + ch.len_utf8()),
        Some((idx, ch)) => Some(idx + ch.len_utf8()),
    }
}

/// Decode one key sequence.
pub fn parse_key_press(data: &str) -> Option<KeyPress> {
    if let Some(key) = legacy_sequence_key(data) {
        return Some(key);
    }

    let mut chars = data.chars();
    let first = chars.next()?;
    let second = chars.next();

    if first == ESC {
        return match second {
            None => Some(KeyPress::new(Key::Escape)),
            Some(ch) if chars.next().is_none() => {
                let inner = parse_key_press(&ch.to_string())?;
                let mut press = KeyPress::alt(inner.key);
                press.modifiers.ctrl = inner.modifiers.ctrl;
                Some(press)
            }
            Some(_) => None,
        };
    }

    if second.is_some() {
        return None;
    }

    match first {
        '\r' | '\n' => Some(KeyPress::new(Key::Enter)),
        '\t' => Some(KeyPress::new(Key::Tab)),
        '\x7f' | '\x08' => Some(KeyPress::new(Key::Backspace)),
        '\x01'..='\x1a' => Some(KeyPress::ctrl((first as u8 + b'a' - 1) as char)),
        ch if ch.is_control() => None,
        ch => Some(KeyPress::new(Key::Char(ch))),
    }
}

fn legacy_sequence_key(data: &str) -> Option<KeyPress> {
    let key = match data {
        "\x1b[A" | "\x1bOA" => Key::Up,
        "\x1b[B" | "\x1bOB" => Key::Down,
        "\x1b[C" | "\x1bOC" => Key::Right,
        "\x1b[D" | "\x1bOD" => Key::Left,
        "\x1b[H" | "\x1bOH" | "\x1b[1~" | "\x1b[7~" => Key::Home,
        "\x1b[F" | "\x1bOF" | "\x1b[4~" | "\x1b[8~" => Key::End,
        "\x1b[3~" => Key::Delete,
        "\x1bOM" => Key::Enter,
        "\x1b[Z" => {
            return Some(KeyPress {
                key: Key::Tab,
                modifiers: KeyModifiers {
                    shift: true,
                    ..KeyModifiers::NONE
                },
            })
        }
        "\x1b[1;5C" | "\x1bOc" => {
            return Some(KeyPress {
                key: Key::Right,
                modifiers: KeyModifiers::CTRL,
            })
        }
        "\x1b[1;5D" | "\x1bOd" => {
            return Some(KeyPress {
                key: Key::Left,
                modifiers: KeyModifiers::CTRL,
            })
        }
        _ => return None,
    };
    Some(KeyPress::new(key))
}
