//! Raw-mode line editor.
//!
//! [`LineEditor::read_line`] runs one read against a [`ConsoleSurface`]. On an interactive
//! surface it keeps an [`EditBuffer`] anchored at the offset where the prompt ended and
//! redraws only the suffix an edit touched; every redraw goes through an [`OutputGate`] so the
//! cursor is hidden while it runs. On a non-interactive surface it degrades to plain echo.

use std::io;

use tracing::debug;

use crate::core::autocomplete::{longest_common_prefix, Completer, Completion};
use crate::core::cursor::offset_delta;
use crate::core::input::{Key, KeyPress};
use crate::core::input_event::ConsoleEvent;
use crate::core::output::{OutputGate, SurfaceCmd};
use crate::core::terminal::ConsoleSurface;
use crate::core::text::width::is_printable;
use crate::render::frame::{Color, Line, Span, Style};
use crate::widgets::edit_buffer::EditBuffer;
use crate::widgets::history::{HistoryLog, HistoryNavigator};

#[derive(Debug, Clone)]
pub struct EditorOptions {
    pub prompt: Line,
    /// Line returned for Ctrl-D.
    pub exit_command: String,
    /// Use the plain echo loop even on an interactive surface.
    pub force_plain: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            prompt: Line::new(vec![Span::new("> ", Style::fg(Color::Green).bold())]),
            exit_command: "exit".to_string(),
            force_plain: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct LineEditor {
    options: EditorOptions,
    history: HistoryLog,
}

/// State of one interactive read.
struct EditSession {
    buffer: EditBuffer,
    navigator: HistoryNavigator,
    tab_presses: usize,
    /// Where the surface cursor was left after the last redraw.
    last_cursor: usize,
    gate: OutputGate,
}

enum Step {
    Continue,
    Finish(Option<String>),
}

impl LineEditor {
    pub fn new(options: EditorOptions) -> Self {
        Self {
            options,
            history: HistoryLog::new(),
        }
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Read one command line.
    ///
    /// Returns `None` when the read was aborted with Ctrl-C, and the exit command for Ctrl-D
    /// or end of input on an empty line.
    pub fn read_line<S: ConsoleSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        completer: &dyn Completer,
    ) -> io::Result<Option<String>> {
        if self.options.force_plain || !surface.is_interactive() {
            return self.read_line_plain(surface);
        }

        let mut session = self.begin(surface)?;
        loop {
            let step = match surface.read_event()? {
                ConsoleEvent::Key(key) => self.handle_key(&mut session, key, completer, surface)?,
                ConsoleEvent::Resize { columns, .. } => {
                    Self::handle_resize(&mut session, surface, columns);
                    Step::Continue
                }
                ConsoleEvent::Eof => {
                    let line = if session.buffer.is_empty() {
                        self.options.exit_command.clone()
                    } else {
                        session.buffer.text()
                    };
                    self.finish(&mut session, surface)?;
                    self.history.push(&line);
                    Step::Finish(Some(line))
                }
            };
            if let Step::Finish(result) = step {
                return Ok(result);
            }
        }
    }

    fn begin<S: ConsoleSurface + ?Sized>(&self, surface: &mut S) -> io::Result<EditSession> {
        surface.ensure_line_start();
        let mut gate = OutputGate::new();
        gate.push_line(&self.options.prompt);
        gate.flush(surface)?;
        let command_start = surface.cursor();
        Ok(EditSession {
            buffer: EditBuffer::new(command_start),
            navigator: HistoryNavigator::new(),
            tab_presses: 0,
            last_cursor: command_start,
            gate,
        })
    }

    fn handle_key<S: ConsoleSurface + ?Sized>(
        &mut self,
        session: &mut EditSession,
        key: KeyPress,
        completer: &dyn Completer,
        surface: &mut S,
    ) -> io::Result<Step> {
        if key.key == Key::Tab && key.modifiers.is_empty() {
            session.tab_presses += 1;
            self.complete(session, completer, surface)?;
            return Ok(Step::Continue);
        }
        session.tab_presses = 0;

        if key.is_ctrl('c') {
            self.finish(session, surface)?;
            return Ok(Step::Finish(None));
        }
        if key.is_ctrl('d') {
            self.finish(session, surface)?;
            return Ok(Step::Finish(Some(self.options.exit_command.clone())));
        }
        if key.is_ctrl('a') {
            return Self::move_cursor(session, surface, EditBuffer::move_home);
        }
        if key.is_ctrl('e') {
            return Self::move_cursor(session, surface, EditBuffer::move_end);
        }

        if let Some(ch) = key.printable() {
            if is_printable(ch) {
                Self::insert(session, ch);
            } else {
                session.gate.push(SurfaceCmd::Bell);
            }
            Self::flush(session, surface)?;
            return Ok(Step::Continue);
        }

        match key.key {
            Key::Enter => {
                let line = session.buffer.text();
                self.finish(session, surface)?;
                self.history.push(&line);
                Ok(Step::Finish(Some(line)))
            }
            Key::Backspace => {
                let at = session.buffer.cursor().saturating_sub(1);
                if session.buffer.delete_before() {
                    Self::redraw_tail(session, at, 1);
                    Self::flush(session, surface)?;
                }
                Ok(Step::Continue)
            }
            Key::Delete => {
                let at = session.buffer.cursor();
                if session.buffer.delete_at() {
                    Self::redraw_tail(session, at, 1);
                    Self::flush(session, surface)?;
                }
                Ok(Step::Continue)
            }
            Key::Left => Self::move_cursor(session, surface, EditBuffer::move_left),
            Key::Right => Self::move_cursor(session, surface, EditBuffer::move_right),
            Key::Home => Self::move_cursor(session, surface, EditBuffer::move_home),
            Key::End => Self::move_cursor(session, surface, EditBuffer::move_end),
            Key::Up => {
                let current = session.buffer.text();
                if let Some(text) = session.navigator.older(&current, &self.history) {
                    Self::replace(session, &text);
                    Self::flush(session, surface)?;
                }
                Ok(Step::Continue)
            }
            Key::Down => {
                let current = session.buffer.text();
                if let Some(text) = session.navigator.newer(&current, &self.history) {
                    Self::replace(session, &text);
                    Self::flush(session, surface)?;
                }
                Ok(Step::Continue)
            }
            Key::Tab | Key::Escape | Key::Char(_) => Ok(Step::Continue),
        }
    }

    fn complete<S: ConsoleSurface + ?Sized>(
        &self,
        session: &mut EditSession,
        completer: &dyn Completer,
        surface: &mut S,
    ) -> io::Result<()> {
        let candidates = completer.complete(&session.buffer.text());
        match candidates.as_slice() {
            [] => {
                session.gate.push(SurfaceCmd::Bell);
            }
            [only] => {
                Self::replace(session, &only.replacement);
            }
            _ if session.tab_presses == 1 => {
                let prefix =
                    longest_common_prefix(candidates.iter().map(|c| c.replacement.as_str()));
                Self::replace(session, &prefix);
                session.gate.push(SurfaceCmd::Bell);
            }
            _ => {
                self.list_candidates(session, &candidates, surface)?;
                return Ok(());
            }
        }
        Self::flush(session, surface)
    }

    /// Print every candidate below the input, then a fresh prompt holding the same buffer.
    fn list_candidates<S: ConsoleSurface + ?Sized>(
        &self,
        session: &mut EditSession,
        candidates: &[Completion],
        surface: &mut S,
    ) -> io::Result<()> {
        let end = session.buffer.surface_offset(session.buffer.len());
        session.gate.push(SurfaceCmd::MoveTo(end));
        session.gate.push(SurfaceCmd::text("\n"));
        for candidate in candidates {
            session.gate.push_line(&candidate.display);
            session.gate.push(SurfaceCmd::text("\n"));
        }
        session.gate.push_line(&self.options.prompt);
        session.gate.flush(surface)?;

        session.buffer.set_command_start(surface.cursor());
        let cursor = session.buffer.cursor();
        session.gate.push(SurfaceCmd::Text(session.buffer.text()));
        session
            .gate
            .push(SurfaceCmd::MoveTo(session.buffer.surface_offset(cursor)));
        Self::flush(session, surface)
    }

    fn insert(session: &mut EditSession, ch: char) {
        let at = session.buffer.cursor();
        session.buffer.insert(ch);
        Self::redraw_tail(session, at, 0);
    }

    /// Redraw from buffer index `from` to the end, blanking `erased` cells past the new end.
    fn redraw_tail(session: &mut EditSession, from: usize, erased: usize) {
        let buffer = &session.buffer;
        let mut tail = buffer.tail(from);
        tail.push_str(&" ".repeat(erased));
        session
            .gate
            .push(SurfaceCmd::MoveTo(buffer.surface_offset(from)));
        session.gate.push(SurfaceCmd::Text(tail));
        session
            .gate
            .push(SurfaceCmd::MoveTo(buffer.surface_offset(buffer.cursor())));
    }

    fn replace(session: &mut EditSession, text: &str) {
        let old_len = session.buffer.len();
        let shared = session.buffer.replace(text);
        let erased = old_len.saturating_sub(session.buffer.len());
        Self::redraw_tail(session, shared, erased);
    }

    fn move_cursor<S: ConsoleSurface + ?Sized>(
        session: &mut EditSession,
        surface: &mut S,
        movement: fn(&mut EditBuffer) -> bool,
    ) -> io::Result<Step> {
        if movement(&mut session.buffer) {
            let target = session.buffer.surface_offset(session.buffer.cursor());
            session.gate.push(SurfaceCmd::MoveTo(target));
            Self::flush(session, surface)?;
        }
        Ok(Step::Continue)
    }

    /// Leave the cursor on a fresh row below the input.
    fn finish<S: ConsoleSurface + ?Sized>(
        &self,
        session: &mut EditSession,
        surface: &mut S,
    ) -> io::Result<()> {
        let end = session.buffer.surface_offset(session.buffer.len());
        session.gate.push(SurfaceCmd::MoveTo(end));
        session.gate.push(SurfaceCmd::text("\n"));
        Self::flush(session, surface)
    }

    fn flush<S: ConsoleSurface + ?Sized>(
        session: &mut EditSession,
        surface: &mut S,
    ) -> io::Result<()> {
        session.gate.flush(surface)?;
        session.last_cursor = surface.cursor();
        Ok(())
    }

    /// Re-anchor the buffer after the surface changed width.
    ///
    /// The surface re-linearises its cursor with the new width; the difference from where the
    /// editor left it is applied to `command_start` as a plain translation.
    fn handle_resize<S: ConsoleSurface + ?Sized>(
        session: &mut EditSession,
        surface: &mut S,
        columns: usize,
    ) {
        let actual = surface.cursor();
        let delta = offset_delta(session.last_cursor, actual);
        session.buffer.translate(delta);
        session.last_cursor = actual;
        debug!(columns, delta, "re-anchored command start after resize");
    }

    fn read_line_plain<S: ConsoleSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> io::Result<Option<String>> {
        surface.write(&self.options.prompt.text());
        surface.flush()?;
        let mut line = String::new();
        loop {
            match surface.read_event()? {
                ConsoleEvent::Key(key) if key.is_ctrl('c') => {
                    surface.write("\n");
                    surface.flush()?;
                    return Ok(None);
                }
                ConsoleEvent::Key(key) if key.is_ctrl('d') => {
                    surface.write("\n");
                    surface.flush()?;
                    return Ok(Some(self.options.exit_command.clone()));
                }
                ConsoleEvent::Key(key) if key.key == Key::Enter => {
                    surface.write("\n");
                    surface.flush()?;
                    self.history.push(&line);
                    return Ok(Some(line));
                }
                ConsoleEvent::Key(key) if key.key == Key::Backspace => {
                    line.pop();
                }
                ConsoleEvent::Key(key) => {
                    if let Some(ch) = key.printable().filter(|ch| !ch.is_control()) {
                        line.push(ch);
                        surface.write(ch.encode_utf8(&mut [0u8; 4]));
                        surface.flush()?;
                    }
                }
                ConsoleEvent::Resize { .. } => {}
                ConsoleEvent::Eof => {
                    if line.is_empty() {
                        return Ok(Some(self.options.exit_command.clone()));
                    }
                    self.history.push(&line);
                    return Ok(Some(line));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EditorOptions, LineEditor};
    use crate::core::autocomplete::{Completer, Completion};
    use crate::core::input::KeyPress;
    use crate::core::terminal::ConsoleSurface;
    use crate::platform::virtual_surface::VirtualSurface;

    struct NoCompletions;

    impl Completer for NoCompletions {
        fn complete(&self, _partial: &str) -> Vec<Completion> {
            Vec::new()
        }
    }

    fn run(editor: &mut LineEditor, surface: &mut VirtualSurface, input: &str) -> Option<String> {
        surface.push_input(input);
        editor
            .read_line(surface, &NoCompletions)
            .expect("read_line")
    }

    #[test]
    fn typed_text_is_returned_and_recorded() {
        let mut editor = LineEditor::default();
        let mut surface = VirtualSurface::new(40, 10);
        assert_eq!(run(&mut editor, &mut surface, "open a\r").as_deref(), Some("open a"));
        assert_eq!(editor.history().recent(0), Some("open a"));
        assert_eq!(surface.line(0), "> open a");
    }

    #[test]
    fn mid_line_insert_redraws_tail() {
        let mut editor = LineEditor::default();
        let mut surface = VirtualSurface::new(40, 10);
        let line = run(&mut editor, &mut surface, "opn\x1b[De\r");
        assert_eq!(line.as_deref(), Some("open"));
        assert_eq!(surface.line(0), "> open");
    }

    #[test]
    fn backspace_and_delete_blank_the_old_end() {
        let mut editor = LineEditor::default();
        let mut surface = VirtualSurface::new(40, 10);
        let line = run(&mut editor, &mut surface, "abcd\x7f\x1b[H\x1b[3~\r");
        assert_eq!(line.as_deref(), Some("bc"));
        assert_eq!(surface.line(0), "> bc");
    }

    #[test]
    fn ctrl_c_aborts_and_ctrl_d_exits() {
        let mut editor = LineEditor::default();
        let mut surface = VirtualSurface::new(40, 10);
        assert_eq!(run(&mut editor, &mut surface, "partial\x03"), None);
        assert!(editor.history().is_empty());
        surface.push_key(KeyPress::ctrl('d'));
        let line = editor
            .read_line(&mut surface, &NoCompletions)
            .expect("read_line");
        assert_eq!(line.as_deref(), Some("exit"));
    }

    #[test]
    fn redraws_happen_with_cursor_hidden() {
        let mut editor = LineEditor::default();
        let mut surface = VirtualSurface::new(40, 10);
        run(&mut editor, &mut surface, "ab\x1b[Dc\x7f\r");
        assert_eq!(surface.visible_writes(), 0);
        assert!(surface.is_cursor_visible());
    }

    #[test]
    fn wrapped_input_edits_as_flat_text() {
        let mut editor = LineEditor::default();
        let mut surface = VirtualSurface::new(8, 10);
        let line = run(&mut editor, &mut surface, "abcdefghij\x1b[H\x1b[Cx\r");
        assert_eq!(line.as_deref(), Some("axbcdefghij"));
        assert_eq!(surface.lines()[..2], ["> axbcde".to_string(), "fghij".to_string()]);
    }

    #[test]
    fn plain_mode_echoes_without_cursor_math() {
        let mut editor = LineEditor::new(EditorOptions::default());
        let mut surface = VirtualSurface::non_interactive(40, 10);
        surface.push_input("lsx\x7f\r");
        let line = editor
            .read_line(&mut surface, &NoCompletions)
            .expect("read_line");
        assert_eq!(line.as_deref(), Some("ls"));
        assert_eq!(surface.transcript(), "> lsx\n");
        assert_eq!(surface.cursor() % surface.columns(), 0);
    }

    #[test]
    fn wide_characters_are_refused_with_a_bell() {
        let mut editor = LineEditor::default();
        let mut surface = VirtualSurface::new(40, 10);
        let line = run(&mut editor, &mut surface, "a\u{4e2d}b\r");
        assert_eq!(line.as_deref(), Some("ab"));
        assert_eq!(surface.bells(), 1);
        assert_eq!(surface.line(0), "> ab");
    }

    #[test]
    fn plain_mode_still_honours_ctrl_c_and_ctrl_d() {
        let mut editor = LineEditor::default();
        let mut surface = VirtualSurface::non_interactive(40, 10);
        surface.push_input("half\x03");
        let aborted = editor
            .read_line(&mut surface, &NoCompletions)
            .expect("read_line");
        assert_eq!(aborted, None);
        assert!(editor.history().is_empty());

        surface.push_input("\x04");
        let exited = editor
            .read_line(&mut surface, &NoCompletions)
            .expect("read_line");
        assert_eq!(exited.as_deref(), Some("exit"));
    }

    #[test]
    fn end_of_input_on_empty_line_exits() {
        let mut editor = LineEditor::default();
        let mut surface = VirtualSurface::non_interactive(40, 10);
        let line = editor
            .read_line(&mut surface, &NoCompletions)
            .expect("read_line");
        assert_eq!(line.as_deref(), Some("exit"));
    }
}
