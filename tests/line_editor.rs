use std::io;

use pretty_assertions::assert_eq;
use tree_console::render::frame::Style;
use tree_console::{
    CommandContext, CommandError, CommandOutcome, CommandRegistry, CompletionProvider,
    ConsoleCommand, ConsoleEvent, ConsoleSurface, LineEditor, VirtualSurface,
};

struct Named(&'static str);

impl ConsoleCommand for Named {
    fn primary_name(&self) -> &str {
        self.0
    }

    fn execute(
        &mut self,
        _rest: &str,
        _ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        Ok(CommandOutcome::Continue)
    }
}

fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    for name in ["open", "options", "export"] {
        registry.register(Box::new(Named(name))).expect("register");
    }
    registry
}

fn read(editor: &mut LineEditor, surface: &mut VirtualSurface, input: &str) -> Option<String> {
    let registry = registry();
    surface.push_input(input);
    editor
        .read_line(surface, &CompletionProvider::new(&registry))
        .expect("read_line")
}

/// Applies queued resize events to the wrapped surface when the editor reads them, so the
/// width changes in the middle of a read.
struct ResizingSurface {
    inner: VirtualSurface,
}

impl ConsoleSurface for ResizingSurface {
    fn is_interactive(&self) -> bool {
        self.inner.is_interactive()
    }

    fn read_event(&mut self) -> io::Result<ConsoleEvent> {
        let event = self.inner.read_event()?;
        if let ConsoleEvent::Resize { columns, rows } = event {
            if columns != self.inner.columns() {
                self.inner.resize(columns, rows);
            }
        }
        Ok(event)
    }

    fn write(&mut self, text: &str) {
        self.inner.write(text);
    }

    fn write_styled(&mut self, text: &str, style: Style) {
        self.inner.write_styled(text, style);
    }

    fn cursor(&self) -> usize {
        self.inner.cursor()
    }

    fn set_cursor(&mut self, offset: usize) {
        self.inner.set_cursor(offset);
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.inner.set_cursor_visible(visible);
    }

    fn columns(&self) -> usize {
        self.inner.columns()
    }

    fn rows(&self) -> usize {
        self.inner.rows()
    }

    fn bell(&mut self) {
        self.inner.bell();
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, bound: u64) -> usize {
        (self.next() % bound) as usize
    }
}

#[test]
fn random_edits_match_string_model() {
    let mut rng = XorShift(0x9e37_79b9_7f4a_7c15);
    for round in 0..200 {
        let mut editor = LineEditor::default();
        let mut surface = VirtualSurface::new(12, 40);
        let mut model: Vec<char> = Vec::new();
        let mut cursor = 0usize;
        let mut input = String::new();

        for _ in 0..rng.below(40) {
            match rng.below(10) {
                0..=3 => {
                    let ch = (b'a' + rng.below(26) as u8) as char;
                    input.push(ch);
                    model.insert(cursor, ch);
                    cursor += 1;
                }
                4 => {
                    input.push('\x7f');
                    if cursor > 0 {
                        cursor -= 1;
                        model.remove(cursor);
                    }
                }
                5 => {
                    input.push_str("\x1b[3~");
                    if cursor < model.len() {
                        model.remove(cursor);
                    }
                }
                6 => {
                    input.push_str("\x1b[D");
                    cursor = cursor.saturating_sub(1);
                }
                7 => {
                    input.push_str("\x1b[C");
                    cursor = (cursor + 1).min(model.len());
                }
                8 => {
                    input.push_str(if rng.below(2) == 0 { "\x1b[H" } else { "\x01" });
                    cursor = 0;
                }
                _ => {
                    input.push_str(if rng.below(2) == 0 { "\x1b[F" } else { "\x05" });
                    cursor = model.len();
                }
            }
        }
        input.push('\r');

        let expected: String = model.iter().collect();
        let line = read(&mut editor, &mut surface, &input);
        assert_eq!(line.as_deref(), Some(expected.as_str()), "round {round}: {input:?}");
        assert_eq!(
            surface.screen_text().replace('\n', ""),
            format!("> {expected}").trim_end(),
            "round {round}: {input:?}"
        );
    }
}

#[test]
fn history_round_trip_restores_draft() {
    let mut editor = LineEditor::default();
    let mut surface = VirtualSurface::new(40, 20);
    for line in ["one\r", "two\r", "three\r"] {
        read(&mut editor, &mut surface, line);
    }

    let line = read(
        &mut editor,
        &mut surface,
        "draft\x1b[A\x1b[A\x1b[A\x1b[B\x1b[B\x1b[B\r",
    );
    assert_eq!(line.as_deref(), Some("draft"));
}

#[test]
fn history_keeps_unsaved_edits_per_entry() {
    let mut editor = LineEditor::default();
    let mut surface = VirtualSurface::new(40, 20);
    for line in ["one\r", "two\r"] {
        read(&mut editor, &mut surface, line);
    }

    let line = read(&mut editor, &mut surface, "new\x1b[A!\x1b[A\x1b[B\r");
    assert_eq!(line.as_deref(), Some("two!"));
    assert_eq!(editor.history().entries(), ["one", "two", "two!"]);

    let line = read(&mut editor, &mut surface, "x\x1b[A\x1b[Bz\r");
    assert_eq!(line.as_deref(), Some("xz"));
}

#[test]
fn up_past_oldest_entry_stays_put() {
    let mut editor = LineEditor::default();
    let mut surface = VirtualSurface::new(40, 20);
    read(&mut editor, &mut surface, "only\r");
    let line = read(&mut editor, &mut surface, "\x1b[A\x1b[A\x1b[A\r");
    assert_eq!(line.as_deref(), Some("only"));
}

#[test]
fn tab_without_candidates_rings_bell() {
    let mut editor = LineEditor::default();
    let mut surface = VirtualSurface::new(40, 10);
    let line = read(&mut editor, &mut surface, "zz\t\r");
    assert_eq!(line.as_deref(), Some("zz"));
    assert_eq!(surface.bells(), 1);
}

#[test]
fn tab_with_one_candidate_completes_name() {
    let mut editor = LineEditor::default();
    let mut surface = VirtualSurface::new(40, 10);
    let line = read(&mut editor, &mut surface, "EX\tnow\r");
    assert_eq!(line.as_deref(), Some("export now"));
    assert_eq!(surface.bells(), 0);
    assert_eq!(surface.line(0), "> export now");
}

#[test]
fn tab_with_many_candidates_takes_common_prefix() {
    let mut editor = LineEditor::default();
    let mut surface = VirtualSurface::new(40, 10);
    let line = read(&mut editor, &mut surface, "o\t\r");
    assert_eq!(line.as_deref(), Some("op"));
    assert_eq!(surface.bells(), 1);
    assert_eq!(surface.line(0), "> op");
}

#[test]
fn second_tab_lists_candidates_and_keeps_buffer() {
    let mut editor = LineEditor::default();
    let mut surface = VirtualSurface::new(40, 10);
    let line = read(&mut editor, &mut surface, "o\t\t\r");
    assert_eq!(line.as_deref(), Some("op"));
    assert_eq!(
        surface.lines()[..4],
        [
            "> op".to_string(),
            "open".to_string(),
            "options".to_string(),
            "> op".to_string(),
        ]
    );
}

#[test]
fn non_tab_key_resets_the_tab_counter() {
    let mut editor = LineEditor::default();
    let mut surface = VirtualSurface::new(40, 10);
    let line = read(&mut editor, &mut surface, "o\t\x1b[D\x1b[C\t\r");
    assert_eq!(line.as_deref(), Some("op"));
    assert_eq!(surface.bells(), 2);
    assert_eq!(surface.line(1), "");
}

#[test]
fn resize_translates_command_start() {
    let mut surface = ResizingSurface {
        inner: VirtualSurface::new(20, 10),
    };
    surface.write("hello\n");
    surface.inner.push_input("abc");
    surface.inner.push_event(ConsoleEvent::Resize {
        columns: 10,
        rows: 10,
    });
    surface.inner.push_input("d\r");

    let registry = registry();
    let mut editor = LineEditor::default();
    let line = editor
        .read_line(&mut surface, &CompletionProvider::new(&registry))
        .expect("read_line");
    assert_eq!(line.as_deref(), Some("abcd"));
    assert_eq!(
        surface.inner.lines()[..2],
        ["hello".to_string(), "> abcd".to_string()]
    );
}

#[test]
fn cursor_stays_hidden_during_every_redraw() {
    let mut editor = LineEditor::default();
    let mut surface = VirtualSurface::new(10, 20);
    read(&mut editor, &mut surface, "one\r");
    read(
        &mut editor,
        &mut surface,
        "abcdefghijk\x1b[H\x7f\x1b[3~\x1b[A\x1b[Bo\t\t\x03",
    );
    assert_eq!(surface.visible_writes(), 0);
    assert!(surface.is_cursor_visible());
}
