//! Styled text model.
//!
//! A [`Span`] is one display token: a run of text with a single [`Style`]. A [`Line`] is the
//! sequence of spans printed on one console row.

use crate::core::text::width::visible_width;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    Rgb(u8, u8, u8),
}

impl Color {
    fn sgr(self, background: bool) -> String {
        let base = if background { 40 } else { 30 };
        match self {
            Color::Black => (base).to_string(),
            Color::Red => (base + 1).to_string(),
            Color::Green => (base + 2).to_string(),
            Color::Yellow => (base + 3).to_string(),
            Color::Blue => (base + 4).to_string(),
            Color::Magenta => (base + 5).to_string(),
            Color::Cyan => (base + 6).to_string(),
            Color::White => (base + 7).to_string(),
            Color::Gray => (base + 60).to_string(),
            Color::Rgb(r, g, b) => format!("{};2;{r};{g};{b}", base + 8),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub dim: bool,
    pub underline: bool,
}

impl Style {
    pub const PLAIN: Style = Style {
        fg: None,
        bg: None,
        bold: false,
        dim: false,
        underline: false,
    };

    pub fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            ..Self::PLAIN
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::PLAIN
    }

    /// SGR prefix for this style, empty for the plain style.
    pub fn sgr_prefix(&self) -> String {
        if self.is_plain() {
            return String::new();
        }
        let mut params = Vec::new();
        if self.bold {
            params.push("1".to_string());
        }
        if self.dim {
            params.push("2".to_string());
        }
        if self.underline {
            params.push("4".to_string());
        }
        if let Some(fg) = self.fg {
            params.push(fg.sgr(false));
        }
        if let Some(bg) = self.bg {
            params.push(bg.sgr(true));
        }
        format!("\x1b[{}m", params.join(";"))
    }
}

pub const SGR_RESET: &str = "\x1b[0m";

/// A contiguous run of text sharing one style.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Span {
    text: String,
    style: Style,
}

impl Span {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Style::PLAIN)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn width(&self) -> usize {
        visible_width(&self.text)
    }

    pub fn restyled(&self, style: Style) -> Self {
        Self::new(self.text.clone(), style)
    }
}

impl From<&str> for Span {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

impl From<String> for Span {
    fn from(text: String) -> Self {
        Self::plain(text)
    }
}

/// A single printed row.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Line {
    spans: Vec<Span>,
}

impl Line {
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn push(&mut self, span: Span) {
        self.spans.push(span);
    }

    pub fn prepend(&mut self, span: Span) {
        self.spans.insert(0, span);
    }

    pub fn width(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }

    /// Same text with every span forced to `style`.
    pub fn restyled(&self, style: Style) -> Self {
        Self::new(self.spans.iter().map(|span| span.restyled(style)).collect())
    }

    /// Concatenated text without styling.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            out.push_str(span.as_str());
        }
        out
    }
}

impl From<String> for Line {
    fn from(text: String) -> Self {
        Self::new(vec![Span::plain(text)])
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        Self::new(vec![Span::plain(text)])
    }
}
