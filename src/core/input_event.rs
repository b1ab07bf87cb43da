//! Events delivered by a console surface.

use std::time::{Duration, Instant};

use crate::core::input::{parse_key_press, split_complete, split_sequences, KeyPress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleEvent {
    Key(KeyPress),
    /// The surface changed size. Already-written text is not reflowed.
    Resize { columns: usize, rows: usize },
    /// Input stream closed.
    Eof,
}

/// Decode every recognised key in a raw input chunk, in order.
pub fn parse_console_events(data: &str) -> Vec<ConsoleEvent> {
    keys(split_sequences(data))
}

fn keys<'a>(sequences: impl IntoIterator<Item = &'a str>) -> Vec<ConsoleEvent> {
    sequences
        .into_iter()
        .filter_map(parse_key_press)
        .map(ConsoleEvent::Key)
        .collect()
}

/// Reassembles key sequences that arrive split across reads.
///
/// An unfinished ESC/CSI/SS3 tail or a partial UTF-8 character stays buffered until more
/// bytes arrive. If none arrive within the escape timeout, [`InputDecoder::flush_due`] emits
/// the tail as it stands, so a lone ESC becomes `Escape`.
#[derive(Debug)]
pub struct InputDecoder {
    pending: Vec<u8>,
    escape_timeout: Duration,
    flush_deadline: Option<Instant>,
}

impl InputDecoder {
    pub fn new(escape_timeout: Duration) -> Self {
        Self {
            pending: Vec::new(),
            escape_timeout,
            flush_deadline: None,
        }
    }

    /// Decode `bytes` after whatever was held back, returning every complete key.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<ConsoleEvent> {
        self.push_at(bytes, Instant::now())
    }

    fn push_at(&mut self, bytes: &[u8], now: Instant) -> Vec<ConsoleEvent> {
        self.pending.extend_from_slice(bytes);
        let (text, consumed) = take_text(&self.pending);
        let (sequences, tail) = split_complete(&text);
        let events = keys(sequences);

        let mut held = tail.as_bytes().to_vec();
        held.extend_from_slice(&self.pending[consumed..]);
        self.pending = held;
        self.flush_deadline = (!self.pending.is_empty()).then(|| now + self.escape_timeout);
        events
    }

    /// Emit the held tail once its deadline has passed.
    pub fn flush_due(&mut self, now: Instant) -> Vec<ConsoleEvent> {
        match self.flush_deadline {
            Some(deadline) if now >= deadline => self.flush(),
            _ => Vec::new(),
        }
    }

    /// Emit the held tail immediately.
    pub fn flush(&mut self) -> Vec<ConsoleEvent> {
        self.flush_deadline = None;
        let pending = std::mem::take(&mut self.pending);
        let text = String::from_utf8_lossy(&pending);
        keys(split_sequences(&text))
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.flush_deadline = None;
    }

    /// How long a poll may block: `default_ms`, shortened to the pending flush deadline.
    pub fn next_timeout_ms(&self, now: Instant, default_ms: i32) -> i32 {
        match self.flush_deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(now).as_millis();
                i32::try_from(remaining).unwrap_or(i32::MAX).min(default_ms)
            }
            None => default_ms,
        }
    }
}

/// Text decoded from the front of `bytes` and the number of bytes it covers. Invalid bytes
/// are dropped; an incomplete trailing character is left for the next read.
fn take_text(bytes: &[u8]) -> (String, usize) {
    let mut text = String::new();
    let mut pos = 0;
    while pos < bytes.len() {
        match std::str::from_utf8(&bytes[pos..]) {
            Ok(rest) => {
                text.push_str(rest);
                pos = bytes.len();
            }
            Err(err) => {
                let valid = err.valid_up_to();
                text.push_str(&String::from_utf8_lossy(&bytes[pos..pos + valid]));
                match err.error_len() {
                    Some(len) => pos += valid + len,
                    None => return (text, pos + valid),
                }
            }
        }
    }
    (text, pos)
}
