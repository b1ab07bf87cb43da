//! Command history and per-read navigation drafts.

use std::collections::HashMap;

/// Append-only log of submitted commands for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Vec<String>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a submitted line. Blank lines are not recorded.
    pub fn push(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        self.entries.push(line.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Entry `back` steps behind the newest one (`0` is the newest).
    pub fn recent(&self, back: usize) -> Option<&str> {
        let idx = self.entries.len().checked_sub(back + 1)?;
        self.entries.get(idx).map(String::as_str)
    }
}

/// Walks a [`HistoryLog`] during one read without losing unsaved edits.
///
/// Index `-1` is the line being typed; `0..len` walk backward from the newest entry. Leaving
/// an index stores the buffer as that index's draft, and returning to it restores the draft.
#[derive(Debug, Clone)]
pub struct HistoryNavigator {
    index: isize,
    drafts: HashMap<isize, String>,
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self {
            index: -1,
            drafts: HashMap::new(),
        }
    }

    pub fn index(&self) -> isize {
        self.index
    }

    /// Step to an older entry. Returns the text to show, or `None` at the oldest entry.
    pub fn older(&mut self, current: &str, log: &HistoryLog) -> Option<String> {
        let next = self.index + 1;
        if next as usize >= log.len() {
            return None;
        }
        Some(self.step(current, next, log))
    }

    /// Step to a newer entry. Returns the text to show, or `None` on the line being typed.
    pub fn newer(&mut self, current: &str, log: &HistoryLog) -> Option<String> {
        if self.index < 0 {
            return None;
        }
        Some(self.step(current, self.index - 1, log))
    }

    fn step(&mut self, current: &str, next: isize, log: &HistoryLog) -> String {
        self.drafts.insert(self.index, current.to_string());
        self.index = next;
        if let Some(draft) = self.drafts.get(&next) {
            return draft.clone();
        }
        if next < 0 {
            return String::new();
        }
        log.recent(next as usize).unwrap_or_default().to_string()
    }
}
