//! Styled output and control layout.

pub mod frame;
pub mod layout;

pub use frame::{Color, Line, Span, Style};
pub use layout::{Alignment, ControlLayoutRenderer, LayoutNode};
