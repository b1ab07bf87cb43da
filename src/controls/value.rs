//! Typed control values.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, format_number(self.size, None))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})",
            format_number(self.x, None),
            format_number(self.y, None)
        )
    }
}

/// Dash pattern: painted length, gap length, and the offset the pattern starts at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashPattern {
    pub on: f64,
    pub off: f64,
    pub phase: f64,
}

impl DashPattern {
    pub const SOLID: DashPattern = DashPattern {
        on: 1.0,
        off: 0.0,
        phase: 0.0,
    };
}

impl fmt::Display for DashPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.off == 0.0 {
            return f.write_str("solid");
        }
        write!(
            f,
            "{} on, {} off",
            format_number(self.on, None),
            format_number(self.off, None)
        )?;
        if self.phase != 0.0 {
            write!(f, ", phase {}", format_number(self.phase, None))?;
        }
        Ok(())
    }
}

/// Current value of one control.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    Bool(bool),
    Text(String),
    Number(f64),
    /// Index into the control's item list.
    Choice(usize),
    Color(Rgba),
    Font(FontSpec),
    Point(Point),
    Dash(DashPattern),
    /// Button press. `Some(i)` while the press with index `i` is being propagated.
    Pressed(Option<usize>),
    /// Identifier or session object bound at compile time.
    Handle(String),
    /// Groups and labels carry no value.
    Empty,
}

impl ControlValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ControlValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ControlValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<usize> {
        match self {
            ControlValue::Choice(index) => Some(*index),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ControlValue::Text(text) | ControlValue::Handle(text) => Some(text),
            _ => None,
        }
    }

    pub fn pressed(&self) -> Option<usize> {
        match self {
            ControlValue::Pressed(index) => *index,
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ControlValue::Bool(_) => "a boolean",
            ControlValue::Text(_) => "text",
            ControlValue::Number(_) => "a number",
            ControlValue::Choice(_) => "a choice index",
            ControlValue::Color(_) => "a colour",
            ControlValue::Font(_) => "a font",
            ControlValue::Point(_) => "a point",
            ControlValue::Dash(_) => "a dash pattern",
            ControlValue::Pressed(_) => "a button press",
            ControlValue::Handle(_) => "an identifier",
            ControlValue::Empty => "no value",
        }
    }
}

/// Format a number with a fixed number of decimals, or as short as possible without.
pub fn format_number(value: f64, decimals: Option<usize>) -> String {
    match decimals {
        Some(decimals) => format!("{value:.decimals$}"),
        None if value.fract() == 0.0 && value.abs() < 1e15 => format!("{value:.0}"),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{format_number, DashPattern, FontSpec, Point, Rgba};

    #[test]
    fn numbers_drop_trailing_zero_fraction() {
        assert_eq!(format_number(5.0, None), "5");
        assert_eq!(format_number(-0.25, None), "-0.25");
        assert_eq!(format_number(1.5, Some(2)), "1.50");
    }

    #[test]
    fn compound_values_display() {
        assert_eq!(Rgba::new(255, 0, 0, 255).to_string(), "rgba(255, 0, 0, 255)");
        let font = FontSpec {
            family: "Helvetica".to_string(),
            size: 12.0,
        };
        assert_eq!(font.to_string(), "Helvetica 12");
        assert_eq!(Point { x: 1.0, y: 2.5 }.to_string(), "(1, 2.5)");
        assert_eq!(DashPattern::SOLID.to_string(), "solid");
        let dashed = DashPattern {
            on: 3.0,
            off: 2.0,
            phase: 1.0,
        };
        assert_eq!(dashed.to_string(), "3 on, 2 off, phase 1");
    }
}
