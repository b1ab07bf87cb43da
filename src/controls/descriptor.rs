//! Descriptor parsing.
//!
//! A descriptor is `"<Kind>:<params>"`. `<params>` is either a plain literal (`CheckBox:true`,
//! `Group:3`, `Button:Apply`) or a JSON literal, optionally preceded by a plain default
//! (`NumericUpDown:5[0,10,1,"0.00"]`, `ComboBox:1["Rectangular","Circular"]`). Each
//! descriptor is parsed once into a [`ControlKind`] carrying its typed payload.

use serde::de::DeserializeOwned;

use crate::controls::session::SessionContext;
use crate::controls::value::{ControlValue, DashPattern, FontSpec, Point, Rgba};
use crate::error::{DescriptorError, UpdateError};
use crate::render::layout::Alignment;

/// Bounds and display precision of a numeric control.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Decimals shown, from a `"0.00"`-style format literal.
    pub decimals: Option<usize>,
}

impl NumericRange {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// `current` moved by `steps` increments, kept in range.
    pub fn step_by(&self, current: f64, steps: f64) -> f64 {
        self.clamp(current + self.step * steps)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    CheckBox { default: bool },
    TextBox { default: String },
    NumericUpDown { default: f64, range: NumericRange },
    Slider { default: f64, range: NumericRange },
    ComboBox { default: usize, items: Vec<String> },
    Colour { default: Rgba },
    Font { default: FontSpec },
    Point { default: Point },
    Dash { default: DashPattern },
    SourceCode { default: String },
    Group { children: usize },
    Expander { children: usize },
    Label { text: String, alignment: Option<Alignment> },
    Button { text: String },
    Buttons { labels: Vec<String> },
    Id { value: String },
    TreeCollection,
    Window,
    InstanceStateData,
}

impl ControlKind {
    /// Parse one descriptor string for the parameter `name`.
    pub fn parse(name: &str, descriptor: &str) -> Result<Self, DescriptorError> {
        let Some((kind, params)) = descriptor.split_once(':') else {
            return Err(DescriptorError::MissingKind {
                name: name.to_string(),
                descriptor: descriptor.to_string(),
            });
        };
        let params = params.trim();
        let ctx = ParseCtx { name, kind };

        let parsed = match kind {
            "CheckBox" => ControlKind::CheckBox {
                default: ctx.parse_bool(params)?,
            },
            "TextBox" => ControlKind::TextBox {
                default: ctx.literal_text(params)?,
            },
            "SourceCode" => ControlKind::SourceCode {
                default: ctx.literal_text(params)?,
            },
            "NumericUpDown" => {
                let (default, range) = ctx.parse_numeric(params)?;
                ControlKind::NumericUpDown { default, range }
            }
            "Slider" => {
                let (default, range) = ctx.parse_numeric(params)?;
                ControlKind::Slider { default, range }
            }
            "ComboBox" => {
                let (default, items) = ctx.parse_combo(params)?;
                ControlKind::ComboBox { default, items }
            }
            "Colour" | "Color" => ControlKind::Colour {
                default: ctx.parse_colour(params)?,
            },
            "Font" => {
                let (family, size): (String, f64) = ctx.json(params)?;
                if size <= 0.0 {
                    return Err(ctx.invalid("font size must be positive"));
                }
                ControlKind::Font {
                    default: FontSpec { family, size },
                }
            }
            "Point" => {
                let [x, y]: [f64; 2] = ctx.json(params)?;
                ControlKind::Point {
                    default: Point { x, y },
                }
            }
            "Dash" => ControlKind::Dash {
                default: ctx.parse_dash(params)?,
            },
            "Group" => ControlKind::Group {
                children: ctx.parse_count(params)?,
            },
            "Expander" => ControlKind::Expander {
                children: ctx.parse_count(params)?,
            },
            "Label" => {
                if params.starts_with('[') {
                    let (text, alignment): (String, String) = ctx.json(params)?;
                    let alignment = Alignment::from_name(&alignment).ok_or_else(|| {
                        ctx.invalid(format!("unknown alignment `{alignment}`"))
                    })?;
                    ControlKind::Label {
                        text,
                        alignment: Some(alignment),
                    }
                } else {
                    ControlKind::Label {
                        text: ctx.literal_text(params)?,
                        alignment: None,
                    }
                }
            }
            "Button" => ControlKind::Button {
                text: ctx.literal_text(params)?,
            },
            "Buttons" => {
                let labels: Vec<String> = ctx.json(params)?;
                if labels.is_empty() {
                    return Err(ctx.invalid("at least one button is required"));
                }
                ControlKind::Buttons { labels }
            }
            "Id" => ControlKind::Id {
                value: ctx.literal_text(params)?,
            },
            "TreeCollection" => ControlKind::TreeCollection,
            "Window" => ControlKind::Window,
            "InstanceStateData" => ControlKind::InstanceStateData,
            other => {
                return Err(DescriptorError::UnknownKind {
                    name: name.to_string(),
                    kind: other.to_string(),
                })
            }
        };
        Ok(parsed)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ControlKind::CheckBox { .. } => "CheckBox",
            ControlKind::TextBox { .. } => "TextBox",
            ControlKind::NumericUpDown { .. } => "NumericUpDown",
            ControlKind::Slider { .. } => "Slider",
            ControlKind::ComboBox { .. } => "ComboBox",
            ControlKind::Colour { .. } => "Colour",
            ControlKind::Font { .. } => "Font",
            ControlKind::Point { .. } => "Point",
            ControlKind::Dash { .. } => "Dash",
            ControlKind::SourceCode { .. } => "SourceCode",
            ControlKind::Group { .. } => "Group",
            ControlKind::Expander { .. } => "Expander",
            ControlKind::Label { .. } => "Label",
            ControlKind::Button { .. } => "Button",
            ControlKind::Buttons { .. } => "Buttons",
            ControlKind::Id { .. } => "Id",
            ControlKind::TreeCollection => "TreeCollection",
            ControlKind::Window => "Window",
            ControlKind::InstanceStateData => "InstanceStateData",
        }
    }

    /// Declared child count for grouping kinds.
    pub fn group_children(&self) -> Option<usize> {
        match self {
            ControlKind::Group { children } | ControlKind::Expander { children } => {
                Some(*children)
            }
            _ => None,
        }
    }

    /// Whether the control holds a user-editable value and gets a badge.
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            ControlKind::CheckBox { .. }
                | ControlKind::TextBox { .. }
                | ControlKind::NumericUpDown { .. }
                | ControlKind::Slider { .. }
                | ControlKind::ComboBox { .. }
                | ControlKind::Colour { .. }
                | ControlKind::Font { .. }
                | ControlKind::Point { .. }
                | ControlKind::Dash { .. }
                | ControlKind::SourceCode { .. }
        )
    }

    pub fn is_button(&self) -> bool {
        matches!(self, ControlKind::Button { .. } | ControlKind::Buttons { .. })
    }

    /// Value the control starts with. Session-bound kinds resolve against `session`.
    pub fn initial_value(
        &self,
        name: &str,
        session: &SessionContext,
    ) -> Result<ControlValue, DescriptorError> {
        let bound = |handle: &Option<String>| {
            handle
                .clone()
                .map(ControlValue::Handle)
                .ok_or_else(|| DescriptorError::MissingBinding {
                    name: name.to_string(),
                    kind: self.kind_name().to_string(),
                })
        };
        let value = match self {
            ControlKind::CheckBox { default } => ControlValue::Bool(*default),
            ControlKind::TextBox { default } | ControlKind::SourceCode { default } => {
                ControlValue::Text(default.clone())
            }
            ControlKind::NumericUpDown { default, .. } | ControlKind::Slider { default, .. } => {
                ControlValue::Number(*default)
            }
            ControlKind::ComboBox { default, .. } => ControlValue::Choice(*default),
            ControlKind::Colour { default } => ControlValue::Color(*default),
            ControlKind::Font { default } => ControlValue::Font(default.clone()),
            ControlKind::Point { default } => ControlValue::Point(*default),
            ControlKind::Dash { default } => ControlValue::Dash(*default),
            ControlKind::Button { .. } | ControlKind::Buttons { .. } => {
                ControlValue::Pressed(None)
            }
            ControlKind::Id { value } => ControlValue::Handle(value.clone()),
            ControlKind::TreeCollection => bound(&session.tree_collection)?,
            ControlKind::Window => bound(&session.window)?,
            ControlKind::InstanceStateData => bound(&session.instance_state)?,
            ControlKind::Group { .. } | ControlKind::Expander { .. } | ControlKind::Label { .. } => {
                ControlValue::Empty
            }
        };
        Ok(value)
    }

    pub fn numeric_range(&self) -> Option<&NumericRange> {
        match self {
            ControlKind::NumericUpDown { range, .. } | ControlKind::Slider { range, .. } => {
                Some(range)
            }
            _ => None,
        }
    }

    /// Check that `value` fits this control and normalise it (numbers are clamped to range).
    pub fn accept(&self, name: &str, value: ControlValue) -> Result<ControlValue, UpdateError> {
        let mismatch = |expected: &str| UpdateError::TypeMismatch {
            name: name.to_string(),
            expected: expected.to_string(),
        };
        match (self, value) {
            (ControlKind::CheckBox { .. }, value @ ControlValue::Bool(_)) => Ok(value),
            (
                ControlKind::TextBox { .. } | ControlKind::SourceCode { .. },
                value @ ControlValue::Text(_),
            ) => Ok(value),
            (
                ControlKind::NumericUpDown { range, .. } | ControlKind::Slider { range, .. },
                ControlValue::Number(number),
            ) => {
                if number.is_nan() {
                    return Err(mismatch("a number"));
                }
                Ok(ControlValue::Number(range.clamp(number)))
            }
            (ControlKind::ComboBox { items, .. }, ControlValue::Choice(index)) => {
                if index < items.len() {
                    Ok(ControlValue::Choice(index))
                } else {
                    Err(UpdateError::InvalidInput {
                        name: name.to_string(),
                        expected: format!("a choice index below {}", items.len()),
                        input: index.to_string(),
                    })
                }
            }
            (ControlKind::Colour { .. }, value @ ControlValue::Color(_)) => Ok(value),
            (ControlKind::Font { .. }, value @ ControlValue::Font(_)) => Ok(value),
            (ControlKind::Point { .. }, value @ ControlValue::Point(_)) => Ok(value),
            (ControlKind::Dash { .. }, value @ ControlValue::Dash(_)) => Ok(value),
            (ControlKind::Button { .. }, ControlValue::Pressed(press)) => {
                Ok(ControlValue::Pressed(press.map(|_| 0)))
            }
            (ControlKind::Buttons { labels }, ControlValue::Pressed(press)) => match press {
                Some(index) if index >= labels.len() => Err(UpdateError::InvalidInput {
                    name: name.to_string(),
                    expected: format!("a button index below {}", labels.len()),
                    input: index.to_string(),
                }),
                press => Ok(ControlValue::Pressed(press)),
            },
            (kind, _) => Err(mismatch(expected_for(kind))),
        }
    }

    /// Convert user-typed text into a value for this control.
    pub fn parse_input(&self, name: &str, text: &str) -> Result<ControlValue, UpdateError> {
        let text = text.trim();
        let invalid = |expected: &str| UpdateError::InvalidInput {
            name: name.to_string(),
            expected: expected.to_string(),
            input: text.to_string(),
        };
        let value = match self {
            ControlKind::CheckBox { .. } => ControlValue::Bool(
                parse_bool_word(text).ok_or_else(|| invalid("true or false"))?,
            ),
            ControlKind::TextBox { .. } | ControlKind::SourceCode { .. } => {
                ControlValue::Text(text.to_string())
            }
            ControlKind::NumericUpDown { .. } | ControlKind::Slider { .. } => ControlValue::Number(
                text.parse::<f64>().map_err(|_| invalid("a number"))?,
            ),
            ControlKind::ComboBox { items, .. } => {
                let by_label = items
                    .iter()
                    .position(|item| item.eq_ignore_ascii_case(text));
                let index = match by_label {
                    Some(index) => index,
                    None => text
                        .parse::<usize>()
                        .map_err(|_| invalid(&format!("one of {}", items.join(", "))))?,
                };
                ControlValue::Choice(index)
            }
            ControlKind::Colour { .. } => {
                let parts = parse_list::<u8>(text).ok_or_else(|| invalid("r,g,b[,a] in 0-255"))?;
                match parts.as_slice() {
                    [r, g, b] => ControlValue::Color(Rgba::new(*r, *g, *b, 255)),
                    [r, g, b, a] => ControlValue::Color(Rgba::new(*r, *g, *b, *a)),
                    _ => return Err(invalid("r,g,b[,a] in 0-255")),
                }
            }
            ControlKind::Font { .. } => {
                let (family, size) = text
                    .rsplit_once(char::is_whitespace)
                    .ok_or_else(|| invalid("a family followed by a size"))?;
                let size = size
                    .parse::<f64>()
                    .ok()
                    .filter(|size| *size > 0.0)
                    .ok_or_else(|| invalid("a family followed by a size"))?;
                ControlValue::Font(FontSpec {
                    family: family.trim().to_string(),
                    size,
                })
            }
            ControlKind::Point { .. } => match parse_list::<f64>(text).as_deref() {
                Some([x, y]) => ControlValue::Point(Point { x: *x, y: *y }),
                _ => return Err(invalid("x,y")),
            },
            ControlKind::Dash { .. } => match parse_list::<f64>(text).as_deref() {
                Some([on, off]) => ControlValue::Dash(DashPattern {
                    on: *on,
                    off: *off,
                    phase: 0.0,
                }),
                Some([on, off, phase]) => ControlValue::Dash(DashPattern {
                    on: *on,
                    off: *off,
                    phase: *phase,
                }),
                _ => return Err(invalid("on,off[,phase]")),
            },
            ControlKind::Button { .. } => ControlValue::Pressed(Some(0)),
            ControlKind::Buttons { labels } => {
                let by_label = labels
                    .iter()
                    .position(|label| label.eq_ignore_ascii_case(text));
                let index = match by_label {
                    Some(index) => index,
                    None => text
                        .parse::<usize>()
                        .map_err(|_| invalid(&format!("one of {}", labels.join(", "))))?,
                };
                ControlValue::Pressed(Some(index))
            }
            kind => {
                return Err(UpdateError::TypeMismatch {
                    name: name.to_string(),
                    expected: expected_for(kind).to_string(),
                })
            }
        };
        Ok(value)
    }
}

fn expected_for(kind: &ControlKind) -> &'static str {
    match kind {
        ControlKind::CheckBox { .. } => "a boolean",
        ControlKind::TextBox { .. } | ControlKind::SourceCode { .. } => "text",
        ControlKind::NumericUpDown { .. } | ControlKind::Slider { .. } => "a number",
        ControlKind::ComboBox { .. } => "a choice index",
        ControlKind::Colour { .. } => "a colour",
        ControlKind::Font { .. } => "a font",
        ControlKind::Point { .. } => "a point",
        ControlKind::Dash { .. } => "a dash pattern",
        ControlKind::Button { .. } | ControlKind::Buttons { .. } => "a button press",
        ControlKind::Group { .. }
        | ControlKind::Expander { .. }
        | ControlKind::Label { .. }
        | ControlKind::Id { .. }
        | ControlKind::TreeCollection
        | ControlKind::Window
        | ControlKind::InstanceStateData => "nothing (read-only)",
    }
}

fn parse_bool_word(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_list<T: std::str::FromStr>(text: &str) -> Option<Vec<T>> {
    text.split(',')
        .map(|part| part.trim().parse::<T>().ok())
        .collect()
}

struct ParseCtx<'a> {
    name: &'a str,
    kind: &'a str,
}

impl ParseCtx<'_> {
    fn invalid(&self, reason: impl Into<String>) -> DescriptorError {
        DescriptorError::InvalidParameters {
            name: self.name.to_string(),
            kind: self.kind.to_string(),
            reason: reason.into(),
        }
    }

    fn json<T: DeserializeOwned>(&self, params: &str) -> Result<T, DescriptorError> {
        serde_json::from_str(params).map_err(|err| self.invalid(err.to_string()))
    }

    /// Plain text, or a JSON string literal when quoted.
    fn literal_text(&self, params: &str) -> Result<String, DescriptorError> {
        if params.starts_with('"') {
            self.json(params)
        } else {
            Ok(params.to_string())
        }
    }

    fn parse_bool(&self, params: &str) -> Result<bool, DescriptorError> {
        match params.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(self.invalid(format!("expected true or false, got `{params}`"))),
        }
    }

    fn parse_count(&self, params: &str) -> Result<usize, DescriptorError> {
        params
            .parse()
            .map_err(|_| self.invalid(format!("expected a child count, got `{params}`")))
    }

    /// Split `default[json...]` into its plain default and JSON list.
    fn split_default<'p>(&self, params: &'p str) -> Result<(&'p str, &'p str), DescriptorError> {
        let Some(open) = params.find('[') else {
            return Err(self.invalid("expected `<default>[...]`"));
        };
        Ok((params[..open].trim(), &params[open..]))
    }

    fn parse_numeric(&self, params: &str) -> Result<(f64, NumericRange), DescriptorError> {
        let (default, list) = self.split_default(params)?;
        let default: f64 = default
            .parse()
            .map_err(|_| self.invalid(format!("default `{default}` is not a number")))?;
        let items: Vec<serde_json::Value> = self.json(list)?;
        let number = |idx: usize| items.get(idx).and_then(serde_json::Value::as_f64);
        let (Some(min), Some(max)) = (number(0), number(1)) else {
            return Err(self.invalid("expected [min, max, step?, format?]"));
        };
        let step = number(2).unwrap_or(1.0);
        let decimals = items
            .get(3)
            .and_then(serde_json::Value::as_str)
            .map(|format| format.split_once('.').map_or(0, |(_, frac)| frac.len()));
        if min > max {
            return Err(self.invalid(format!("minimum {min} exceeds maximum {max}")));
        }
        if !(min..=max).contains(&default) {
            return Err(self.invalid(format!("default {default} is outside [{min}, {max}]")));
        }
        Ok((
            default,
            NumericRange {
                min,
                max,
                step,
                decimals,
            },
        ))
    }

    fn parse_combo(&self, params: &str) -> Result<(usize, Vec<String>), DescriptorError> {
        let (default, list) = self.split_default(params)?;
        let default: usize = default
            .parse()
            .map_err(|_| self.invalid(format!("default `{default}` is not an index")))?;
        let items: Vec<String> = self.json(list)?;
        if default >= items.len() {
            return Err(self.invalid(format!(
                "default index {default} is out of range for {} items",
                items.len()
            )));
        }
        Ok((default, items))
    }

    fn parse_colour(&self, params: &str) -> Result<Rgba, DescriptorError> {
        let parts: Vec<u8> = self.json(params)?;
        match parts.as_slice() {
            [r, g, b] => Ok(Rgba::new(*r, *g, *b, 255)),
            [r, g, b, a] => Ok(Rgba::new(*r, *g, *b, *a)),
            _ => Err(self.invalid("expected [r, g, b] or [r, g, b, a]")),
        }
    }

    fn parse_dash(&self, params: &str) -> Result<DashPattern, DescriptorError> {
        let parts: Vec<f64> = self.json(params)?;
        match parts.as_slice() {
            [on, off] => Ok(DashPattern {
                on: *on,
                off: *off,
                phase: 0.0,
            }),
            [on, off, phase] => Ok(DashPattern {
                on: *on,
                off: *off,
                phase: *phase,
            }),
            _ => Err(self.invalid("expected [on, off] or [on, off, phase]")),
        }
    }
}
