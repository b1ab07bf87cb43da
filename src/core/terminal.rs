//! Console surface trait and lifecycle guard.

use std::io;

use crate::core::input_event::ConsoleEvent;
use crate::render::frame::{Line, Style};

/// Character-grid interface used by the line editor and the control renderer.
///
/// Cursor positions are linear offsets (`row * columns() + col`) in the surface's own
/// coordinate space. Text written past the last column wraps to the next row; the surface
/// keeps its cursor model consistent with that wrap. Implementations hold no editing policy.
pub trait ConsoleSurface {
    /// Whether input and output are both attached to an interactive terminal.
    fn is_interactive(&self) -> bool;

    /// Block until the next key, resize, or end-of-input.
    fn read_event(&mut self) -> io::Result<ConsoleEvent>;

    /// Write unstyled text at the cursor. `\n` moves to the start of the next row.
    fn write(&mut self, text: &str);

    fn write_styled(&mut self, text: &str, style: Style);

    fn cursor(&self) -> usize;
    fn set_cursor(&mut self, offset: usize);
    fn set_cursor_visible(&mut self, visible: bool);

    /// Surface dimensions.
    fn columns(&self) -> usize;
    fn rows(&self) -> usize;

    fn bell(&mut self);

    fn flush(&mut self) -> io::Result<()>;

    /// Prepare the surface for raw key reads.
    fn start(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Restore the surface to its original mode.
    fn stop(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Write a styled line followed by a newline.
    fn write_line(&mut self, line: &Line) {
        for span in line.spans() {
            if span.style().is_plain() {
                self.write(span.as_str());
            } else {
                self.write_styled(span.as_str(), span.style());
            }
        }
        self.write("\n");
    }

    /// Move to the start of a fresh row unless the cursor already sits in column zero.
    fn ensure_line_start(&mut self) {
        if self.cursor() % self.columns().max(1) != 0 {
            self.write("\n");
        }
    }
}

/// RAII guard that stops the surface on drop.
pub struct SurfaceGuard<T: ConsoleSurface> {
    surface: Option<T>,
}

impl<T: ConsoleSurface> SurfaceGuard<T> {
    /// Start `surface` and guard it.
    pub fn start(mut surface: T) -> io::Result<Self> {
        surface.start()?;
        Ok(Self {
            surface: Some(surface),
        })
    }

    /// Access the wrapped surface.
    pub fn surface_mut(&mut self) -> &mut T {
        self.surface
            .as_mut()
            .expect("surface already taken from guard")
    }

    /// Consume the guard without running cleanup.
    pub fn into_inner(mut self) -> T {
        self.surface
            .take()
            .expect("surface already taken from guard")
    }
}

impl<T: ConsoleSurface> Drop for SurfaceGuard<T> {
    fn drop(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            let _ = surface.flush();
            let _ = surface.stop();
        }
    }
}
