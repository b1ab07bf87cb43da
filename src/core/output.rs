//! Typed surface output commands and a single output gate.
//!
//! Invariant: editor redraws reach the surface only through `OutputGate::flush(..)`, so a
//! multi-step redraw is always bracketed by cursor hide/show.

use std::io;

use crate::core::terminal::ConsoleSurface;
use crate::render::frame::{Line, Style};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCmd {
    /// Unstyled text at the cursor.
    Text(String),
    /// Styled text at the cursor.
    Styled(String, Style),
    /// Absolute linear cursor offset.
    MoveTo(usize),
    Bell,
}

impl SurfaceCmd {
    pub fn text(data: impl Into<String>) -> Self {
        Self::Text(data.into())
    }
}

#[derive(Debug, Default)]
pub struct OutputGate {
    cmds: Vec<SurfaceCmd>,
}

impl OutputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: SurfaceCmd) {
        self.cmds.push(cmd);
    }

    /// Queue every span of `line`, plain spans as plain text.
    pub fn push_line(&mut self, line: &Line) {
        for span in line.spans() {
            let text = span.as_str().to_string();
            self.cmds.push(if span.style().is_plain() {
                SurfaceCmd::Text(text)
            } else {
                SurfaceCmd::Styled(text, span.style())
            });
        }
    }

    /// Flush buffered commands to the surface with the cursor hidden for the whole batch.
    pub fn flush<S: ConsoleSurface + ?Sized>(&mut self, surface: &mut S) -> io::Result<()> {
        if self.cmds.is_empty() {
            return Ok(());
        }
        surface.set_cursor_visible(false);
        for cmd in self.cmds.drain(..) {
            match cmd {
                SurfaceCmd::Text(data) => surface.write(&data),
                SurfaceCmd::Styled(data, style) => surface.write_styled(&data, style),
                SurfaceCmd::MoveTo(offset) => surface.set_cursor(offset),
                SurfaceCmd::Bell => surface.bell(),
            }
        }
        surface.set_cursor_visible(true);
        surface.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputGate, SurfaceCmd};
    use crate::platform::virtual_surface::VirtualSurface;
    use crate::core::terminal::ConsoleSurface;
    use crate::render::frame::{Color, Line, Span, Style};

    #[test]
    fn batch_is_written_with_cursor_hidden() {
        let mut surface = VirtualSurface::new(20, 4);
        let mut gate = OutputGate::new();
        gate.push_line(&Line::new(vec![
            Span::new("> ", Style::fg(Color::Green)),
            Span::plain("ls"),
        ]));
        gate.push(SurfaceCmd::MoveTo(2));
        gate.push(SurfaceCmd::text("L"));
        gate.push(SurfaceCmd::Bell);
        gate.flush(&mut surface).expect("flush");

        assert_eq!(surface.line(0), "> Ls");
        assert_eq!(surface.bells(), 1);
        assert_eq!(surface.visible_writes(), 0);
        assert!(surface.is_cursor_visible());
    }

    #[test]
    fn empty_gate_leaves_surface_untouched() {
        let mut surface = VirtualSurface::new(20, 4);
        surface.set_cursor_visible(false);
        OutputGate::new().flush(&mut surface).expect("flush");
        assert!(!surface.is_cursor_visible());
        assert_eq!(surface.transcript(), "");
    }
}
