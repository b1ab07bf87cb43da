//! In-memory console surface.
//!
//! A deterministic character grid with a scripted event queue. Used by tests and headless
//! runs; it follows the same wrap and cursor model as [`ProcessTerminal`].
//!
//! [`ProcessTerminal`]: crate::platform::process_terminal::ProcessTerminal

use std::collections::VecDeque;
use std::io;

use crate::core::cursor::CursorPos;
use crate::core::input::KeyPress;
use crate::core::input_event::{parse_console_events, ConsoleEvent};
use crate::core::terminal::ConsoleSurface;
use crate::render::frame::Style;

#[derive(Debug)]
pub struct VirtualSurface {
    columns: usize,
    rows: usize,
    grid: Vec<Vec<char>>,
    cursor: CursorPos,
    cursor_visible: bool,
    interactive: bool,
    events: VecDeque<ConsoleEvent>,
    bells: usize,
    visible_writes: usize,
    transcript: String,
}

impl VirtualSurface {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns: columns.max(1),
            rows: rows.max(1),
            grid: Vec::new(),
            cursor: CursorPos { row: 0, col: 0 },
            cursor_visible: true,
            interactive: true,
            events: VecDeque::new(),
            bells: 0,
            visible_writes: 0,
            transcript: String::new(),
        }
    }

    /// A surface that reports itself as not attached to a terminal.
    pub fn non_interactive(columns: usize, rows: usize) -> Self {
        let mut surface = Self::new(columns, rows);
        surface.interactive = false;
        surface
    }

    /// Queue the keys encoded in a raw terminal byte string.
    pub fn push_input(&mut self, data: &str) {
        self.events.extend(parse_console_events(data));
    }

    pub fn push_key(&mut self, key: KeyPress) {
        self.events.push_back(ConsoleEvent::Key(key));
    }

    pub fn push_event(&mut self, event: ConsoleEvent) {
        self.events.push_back(event);
    }

    /// Change the width immediately and queue the matching resize event.
    ///
    /// Existing rows keep their cells; nothing is reflowed.
    pub fn resize(&mut self, columns: usize, rows: usize) {
        self.columns = columns.max(1);
        self.rows = rows.max(1);
        for row in &mut self.grid {
            row.resize(self.columns, ' ');
        }
        self.cursor.col = self.cursor.col.min(self.columns - 1);
        self.events.push_back(ConsoleEvent::Resize {
            columns: self.columns,
            rows: self.rows,
        });
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn bells(&self) -> usize {
        self.bells
    }

    /// Count of non-empty writes made while the cursor was visible.
    pub fn visible_writes(&self) -> usize {
        self.visible_writes
    }

    pub fn is_cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn cursor_pos(&self) -> CursorPos {
        self.cursor
    }

    /// Every character written so far, in write order, with styling dropped.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Row contents with trailing blanks removed.
    pub fn line(&self, row: usize) -> String {
        self.grid
            .get(row)
            .map(|cells| cells.iter().collect::<String>().trim_end().to_string())
            .unwrap_or_default()
    }

    pub fn lines(&self) -> Vec<String> {
        (0..self.grid.len()).map(|row| self.line(row)).collect()
    }

    /// Non-empty rows joined with newlines.
    pub fn screen_text(&self) -> String {
        let mut lines = self.lines();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }

    fn ensure_row(&mut self, row: usize) {
        while self.grid.len() <= row {
            self.grid.push(vec![' '; self.columns]);
        }
    }

    fn put_char(&mut self, ch: char) {
        match ch {
            '\n' => {
                self.cursor.row += 1;
                self.cursor.col = 0;
                self.ensure_row(self.cursor.row);
            }
            '\r' => self.cursor.col = 0,
            '\x07' => self.bells += 1,
            ch => {
                self.ensure_row(self.cursor.row);
                self.grid[self.cursor.row][self.cursor.col] = ch;
                self.cursor.col += 1;
                if self.cursor.col >= self.columns {
                    self.cursor.row += 1;
                    self.cursor.col = 0;
                    self.ensure_row(self.cursor.row);
                }
            }
        }
    }
}

impl ConsoleSurface for VirtualSurface {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn read_event(&mut self) -> io::Result<ConsoleEvent> {
        Ok(self.events.pop_front().unwrap_or(ConsoleEvent::Eof))
    }

    fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.cursor_visible {
            self.visible_writes += 1;
        }
        self.transcript.push_str(text);
        for ch in text.chars() {
            self.put_char(ch);
        }
    }

    fn write_styled(&mut self, text: &str, _style: Style) {
        self.write(text);
    }

    fn cursor(&self) -> usize {
        self.cursor.to_offset(self.columns)
    }

    fn set_cursor(&mut self, offset: usize) {
        self.cursor = CursorPos::from_offset(offset, self.columns);
        self.ensure_row(self.cursor.row);
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn bell(&mut self) {
        self.bells += 1;
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
