//! Process-backed console surface over stdin/stdout.
//!
//! Output is buffered until [`ConsoleSurface::flush`]. The terminal's real cursor is never
//! queried; a cursor tracker follows every byte written and moves the cursor with relative
//! sequences only, so the tracked offset and the screen agree as long as everything goes
//! through this type.

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use libc::{self, c_int};
use signal_hook::iterator::Signals;
use tracing::debug;
use unicode_width::UnicodeWidthChar;

use crate::config::EnvConfig;
use crate::core::cursor::CursorPos;
use crate::core::input_event::{ConsoleEvent, InputDecoder};
use crate::core::terminal::ConsoleSurface;
use crate::render::frame::{Style, SGR_RESET};

const POLL_INTERVAL_MS: i32 = 50;
/// How long an unfinished escape sequence waits for the rest of its bytes.
const ESCAPE_TIMEOUT: Duration = Duration::from_millis(POLL_INTERVAL_MS as u64);

/// Poll one fd for `events`. Returns the reported events, or 0 on timeout.
fn poll_fd(fd: c_int, events: libc::c_short, timeout_ms: c_int) -> io::Result<libc::c_short> {
    let mut fds = libc::pollfd {
        fd,
        events,
        revents: 0,
    };
    loop {
        match unsafe { libc::poll(&mut fds, 1, timeout_ms) } {
            n if n < 0 => {
                let err = io::Error::last_os_error();
                if err.kind() != io::ErrorKind::Interrupted {
                    return Err(err);
                }
            }
            0 => return Ok(0),
            _ => return Ok(fds.revents),
        }
    }
}

fn wait_writable(fd: c_int) -> io::Result<()> {
    loop {
        let revents = poll_fd(fd, libc::POLLOUT, -1)?;
        if revents & libc::POLLOUT != 0 {
            return Ok(());
        }
        if revents != 0 {
            return Err(io::Error::other(format!(
                "fd {fd} not writable (revents=0x{revents:x})"
            )));
        }
    }
}

/// Write every byte, retrying interrupted writes and waiting out `WouldBlock`.
fn write_all_fd_with<W, P>(
    fd: c_int,
    mut bytes: &[u8],
    mut write_once: W,
    mut wait: P,
) -> io::Result<()>
where
    W: FnMut(c_int, &[u8]) -> io::Result<usize>,
    P: FnMut(c_int) -> io::Result<()>,
{
    while !bytes.is_empty() {
        match write_once(fd, bytes) {
            Ok(0) => return Err(io::Error::new(io::ErrorKind::WriteZero, "write returned 0")),
            Ok(count) if count > bytes.len() => {
                return Err(io::Error::other("write reported more bytes than requested"));
            }
            Ok(count) => bytes = &bytes[count..],
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => wait(fd)?,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

fn write_fd(fd: c_int, data: &str) -> io::Result<()> {
    let write_once = |fd: c_int, buf: &[u8]| {
        let result = unsafe { libc::write(fd, buf.as_ptr().cast(), buf.len()) };
        usize::try_from(result).map_err(|_| io::Error::last_os_error())
    };
    write_all_fd_with(fd, data.as_bytes(), write_once, wait_writable)
}

fn read_winsize(fd: c_int) -> Option<(usize, usize)> {
    let mut size: libc::winsize = unsafe { std::mem::zeroed() };
    if unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) } != 0 {
        return None;
    }
    (size.ws_col > 0 && size.ws_row > 0).then(|| (size.ws_col as usize, size.ws_row as usize))
}

/// Saved terminal attributes of the input fd while raw mode is on.
#[derive(Default)]
struct RawMode {
    saved: Option<libc::termios>,
}

impl RawMode {
    fn enable(&mut self, fd: c_int) -> io::Result<()> {
        let original = match self.saved {
            Some(saved) => saved,
            None => {
                let mut termios: libc::termios = unsafe { std::mem::zeroed() };
                if unsafe { libc::tcgetattr(fd, &mut termios) } != 0 {
                    return Err(io::Error::last_os_error());
                }
                self.saved = Some(termios);
                termios
            }
        };
        let mut raw = original;
        unsafe { libc::cfmakeraw(&mut raw) };
        apply_termios(fd, &raw)
    }

    fn restore(&mut self, fd: c_int) -> io::Result<()> {
        match self.saved.take() {
            Some(saved) => apply_termios(fd, &saved),
            None => Ok(()),
        }
    }
}

fn apply_termios(fd: c_int, termios: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Follows the terminal cursor through written text.
///
/// Writing into the last column leaves a real terminal in a pending-wrap state while the
/// tracker already counts the cursor on the next row. The pending wrap is resolved with
/// `\r\n` before any control character, cursor move, or the end of a write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CursorTracker {
    pos: CursorPos,
    pending_wrap: bool,
}

impl CursorTracker {
    fn text(&mut self, text: &str, columns: usize, out: &mut String) {
        for ch in text.chars() {
            match ch {
                '\n' => {
                    self.settle(out);
                    out.push_str("\r\n");
                    self.pos.row += 1;
                    self.pos.col = 0;
                }
                '\r' => {
                    self.settle(out);
                    out.push('\r');
                    self.pos.col = 0;
                }
                ch if ch.is_control() => {
                    self.settle(out);
                    out.push(ch);
                }
                ch => {
                    self.pending_wrap = false;
                    out.push(ch);
                    self.pos.col += ch.width().unwrap_or(0);
                    if self.pos.col >= columns {
                        self.pos.row += 1;
                        self.pos.col = 0;
                        self.pending_wrap = true;
                    }
                }
            }
        }
        self.settle(out);
    }

    fn settle(&mut self, out: &mut String) {
        if self.pending_wrap {
            out.push_str("\r\n");
            self.pending_wrap = false;
        }
    }

    fn move_to(&mut self, target: CursorPos, out: &mut String) {
        self.settle(out);
        if target.row < self.pos.row {
            out.push_str(&format!("\x1b[{}A", self.pos.row - target.row));
        } else if target.row > self.pos.row {
            out.push_str(&format!("\x1b[{}B", target.row - self.pos.row));
        }
        if target.col != self.pos.col {
            out.push_str(&format!("\x1b[{}G", target.col + 1));
        }
        self.pos = target;
    }
}

pub struct ProcessTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    raw_mode: RawMode,
    columns: usize,
    rows: usize,
    tracker: CursorTracker,
    out: String,
    decoder: InputDecoder,
    events: VecDeque<ConsoleEvent>,
    resized: Arc<AtomicBool>,
    resize_signal_handle: Option<signal_hook::iterator::Handle>,
    resize_thread: Option<JoinHandle<()>>,
    color: bool,
    write_log_path: Option<PathBuf>,
    write_log_failed: bool,
}

impl ProcessTerminal {
    pub fn new(config: &EnvConfig) -> Self {
        Self::with_fds(libc::STDIN_FILENO, libc::STDOUT_FILENO, config)
    }

    fn with_fds(stdin_fd: c_int, stdout_fd: c_int, config: &EnvConfig) -> Self {
        let (columns, rows) = read_winsize(stdout_fd).unwrap_or((80, 24));
        Self {
            stdin_fd,
            stdout_fd,
            raw_mode: RawMode::default(),
            columns,
            rows,
            tracker: CursorTracker::default(),
            out: String::new(),
            decoder: InputDecoder::new(ESCAPE_TIMEOUT),
            events: VecDeque::new(),
            resized: Arc::new(AtomicBool::new(false)),
            resize_signal_handle: None,
            resize_thread: None,
            color: !config.no_color,
            write_log_path: config.write_log.clone().map(PathBuf::from),
            write_log_failed: false,
        }
    }

    fn start_resize_thread(&mut self) -> io::Result<()> {
        let mut signals = Signals::new([libc::SIGWINCH])?;
        let handle = signals.handle();
        let resized = Arc::clone(&self.resized);
        let thread = thread::spawn(move || {
            for _ in signals.forever() {
                resized.store(true, Ordering::SeqCst);
            }
        });
        self.resize_signal_handle = Some(handle);
        self.resize_thread = Some(thread);
        Ok(())
    }

    fn stop_resize_thread(&mut self) {
        if let Some(handle) = self.resize_signal_handle.take() {
            handle.close();
        }
        if let Some(thread) = self.resize_thread.take() {
            let _ = thread.join();
        }
    }

    fn apply_resize(&mut self) -> ConsoleEvent {
        if let Some((columns, rows)) = read_winsize(self.stdout_fd) {
            self.columns = columns;
            self.rows = rows;
        }
        self.tracker.pos.col = self.tracker.pos.col.min(self.columns.saturating_sub(1));
        self.tracker.pending_wrap = false;
        debug!(columns = self.columns, rows = self.rows, "terminal resized");
        ConsoleEvent::Resize {
            columns: self.columns,
            rows: self.rows,
        }
    }

    /// Wait up to one poll interval for input and queue whatever it decodes to.
    fn pump_input(&mut self) -> io::Result<()> {
        let timeout = self.decoder.next_timeout_ms(Instant::now(), POLL_INTERVAL_MS);
        let revents = poll_fd(self.stdin_fd, libc::POLLIN, timeout)?;
        if revents & (libc::POLLIN | libc::POLLHUP) == 0 {
            let due = self.decoder.flush_due(Instant::now());
            self.events.extend(due);
            return Ok(());
        }
        let mut buffer = [0u8; 4096];
        let read_len =
            unsafe { libc::read(self.stdin_fd, buffer.as_mut_ptr() as *mut _, buffer.len()) };
        if read_len < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(());
            }
            return Err(err);
        }
        if read_len == 0 {
            let rest = self.decoder.flush();
            self.events.extend(rest);
            self.events.push_back(ConsoleEvent::Eof);
            return Ok(());
        }
        let events = self.decoder.push(&buffer[..read_len as usize]);
        self.events.extend(events);
        Ok(())
    }

    fn append_write_log(&mut self, data: &str) {
        if self.write_log_failed {
            return;
        }
        if let Some(path) = self.write_log_path.as_ref() {
            let result = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| file.write_all(data.as_bytes()));
            if result.is_err() {
                self.write_log_failed = true;
            }
        }
    }
}

impl Drop for ProcessTerminal {
    fn drop(&mut self) {
        self.stop_resize_thread();
    }
}

impl ConsoleSurface for ProcessTerminal {
    fn is_interactive(&self) -> bool {
        unsafe { libc::isatty(self.stdin_fd) == 1 && libc::isatty(self.stdout_fd) == 1 }
    }

    fn start(&mut self) -> io::Result<()> {
        if !self.is_interactive() {
            return Ok(());
        }
        self.raw_mode.enable(self.stdin_fd)?;
        self.start_resize_thread().inspect_err(|_| {
            let _ = self.raw_mode.restore(self.stdin_fd);
        })
    }

    fn stop(&mut self) -> io::Result<()> {
        self.stop_resize_thread();
        // Drop unread input so it does not leak to the parent shell.
        let _ = unsafe { libc::tcflush(self.stdin_fd, libc::TCIFLUSH) };
        self.decoder.clear();
        self.raw_mode.restore(self.stdin_fd)
    }

    fn read_event(&mut self) -> io::Result<ConsoleEvent> {
        loop {
            if let Some(event) = self.events.pop_front() {
                return Ok(event);
            }
            if self.resized.swap(false, Ordering::SeqCst) {
                return Ok(self.apply_resize());
            }
            self.pump_input()?;
        }
    }

    fn write(&mut self, text: &str) {
        self.tracker.text(text, self.columns, &mut self.out);
    }

    fn write_styled(&mut self, text: &str, style: Style) {
        if !self.color || style.is_plain() {
            self.write(text);
            return;
        }
        self.out.push_str(&style.sgr_prefix());
        self.tracker.text(text, self.columns, &mut self.out);
        self.out.push_str(SGR_RESET);
    }

    fn cursor(&self) -> usize {
        self.tracker.pos.to_offset(self.columns)
    }

    fn set_cursor(&mut self, offset: usize) {
        let target = CursorPos::from_offset(offset, self.columns);
        self.tracker.move_to(target, &mut self.out);
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.out
            .push_str(if visible { "\x1b[?25h" } else { "\x1b[?25l" });
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn bell(&mut self) {
        self.out.push('\x07');
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.out.is_empty() {
            return Ok(());
        }
        let data = std::mem::take(&mut self.out);
        write_fd(self.stdout_fd, &data)?;
        self.append_write_log(&data);
        Ok(())
    }
}
