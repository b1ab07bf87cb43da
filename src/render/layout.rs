//! Box-drawn layout of nested controls.
//!
//! Layout runs in two passes. Measuring walks the tree bottom-up: a leaf at depth `d` needs
//! its text width plus `4 * (d - 1)` columns of connectors, and a group needs the widest of its
//! children or its label plus `4 * d`. Printing walks top-down and sizes every border and
//! aligned label to the root width.

use crate::core::terminal::ConsoleSurface;
use crate::render::frame::{Color, Line, Span, Style};

const CONNECTOR: &str = "│   ";
const INDENT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

impl Alignment {
    pub fn from_name(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "left" => Some(Alignment::Left),
            "right" => Some(Alignment::Right),
            "center" | "centre" => Some(Alignment::Center),
            _ => None,
        }
    }
}

/// One printable entry of a control tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutNode {
    Group { label: Line, children: Vec<LayoutNode> },
    Leaf(Line),
    /// Text padded to the full layout width. Does not take part in measuring.
    Aligned { text: Line, alignment: Alignment },
}

#[derive(Debug, Clone, Copy)]
pub struct ControlLayoutRenderer {
    border: Style,
}

impl Default for ControlLayoutRenderer {
    fn default() -> Self {
        Self {
            border: Style::fg(Color::Gray),
        }
    }
}

impl ControlLayoutRenderer {
    /// Width of the widest line the nodes print.
    pub fn measure(nodes: &[LayoutNode]) -> usize {
        nodes
            .iter()
            .map(|node| measure_node(node, 1))
            .max()
            .unwrap_or(0)
    }

    pub fn layout(&self, nodes: &[LayoutNode]) -> Vec<Line> {
        let width = Self::measure(nodes);
        let mut out = Vec::new();
        for node in nodes {
            self.print_node(node, 1, width, &mut out);
        }
        out
    }

    pub fn render<S: ConsoleSurface + ?Sized>(&self, nodes: &[LayoutNode], surface: &mut S) {
        surface.ensure_line_start();
        for line in self.layout(nodes) {
            surface.write_line(&line);
        }
    }

    fn print_node(&self, node: &LayoutNode, depth: usize, width: usize, out: &mut Vec<Line>) {
        let indent = INDENT * (depth - 1);
        match node {
            LayoutNode::Leaf(text) => {
                let mut line = self.prefixed(depth);
                extend(&mut line, text);
                out.push(line);
            }
            LayoutNode::Aligned { text, alignment } => {
                let pad = width.saturating_sub(indent + text.width());
                let (before, after) = match alignment {
                    Alignment::Left => (0, pad),
                    Alignment::Right => (pad, 0),
                    Alignment::Center => (pad / 2, pad - pad / 2),
                };
                let mut line = self.prefixed(depth);
                line.push(Span::plain(" ".repeat(before)));
                extend(&mut line, text);
                line.push(Span::plain(" ".repeat(after)));
                out.push(line);
            }
            LayoutNode::Group { label, children } => {
                let fill = width.saturating_sub(indent + 1 + label.width() + 2);
                let left = fill / 2;
                let right = fill - left;
                let mut top = self.prefixed(depth);
                top.push(Span::new(format!("┌{} ", "─".repeat(left)), self.border));
                extend(&mut top, label);
                top.push(Span::new(format!(" {}", "─".repeat(right)), self.border));
                out.push(top);

                for child in children {
                    self.print_node(child, depth + 1, width, out);
                }

                let mut bottom = self.prefixed(depth);
                let run = width.saturating_sub(indent + 1);
                bottom.push(Span::new(format!("└{}", "─".repeat(run)), self.border));
                out.push(bottom);
            }
        }
    }

    fn prefixed(&self, depth: usize) -> Line {
        let mut line = Line::default();
        if depth > 1 {
            line.push(Span::new(CONNECTOR.repeat(depth - 1), self.border));
        }
        line
    }
}

fn measure_node(node: &LayoutNode, depth: usize) -> usize {
    match node {
        LayoutNode::Leaf(text) => text.width() + INDENT * (depth - 1),
        LayoutNode::Aligned { .. } => 0,
        LayoutNode::Group { label, children } => children
            .iter()
            .map(|child| measure_node(child, depth + 1))
            .max()
            .unwrap_or(0)
            .max(label.width() + INDENT * depth),
    }
}

fn extend(line: &mut Line, text: &Line) {
    for span in text.spans() {
        line.push(span.clone());
    }
}
