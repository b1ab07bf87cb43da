//! Compile descriptor lists into live control sets.
//!
//! [`ParameterDescriptorCompiler::compile`] parses each `(name, descriptor)` pair once, builds
//! the nesting tree while registering, then runs the change callback with identical old and
//! new snapshots to seed statuses and immediate overrides.
//!
//! Updates go through [`ControlState::update_parameter_action`]. Each applied value triggers
//! the change callback with the snapshot taken just before that value was written; the
//! overrides it returns are applied the same way, recursively, until nothing changes.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::{debug, warn};

use crate::controls::descriptor::ControlKind;
use crate::controls::session::SessionContext;
use crate::controls::tree::{ControlTree, TreeBuilder, TreeNode};
use crate::controls::value::{format_number, ControlValue};
use crate::core::terminal::ConsoleSurface;
use crate::error::{DescriptorError, UpdateError};
use crate::render::frame::{Color, Line, Span, Style};
use crate::render::layout::{ControlLayoutRenderer, LayoutNode};

/// Nested overrides allowed below one update before the cascade is treated as cyclic.
pub const MAX_CASCADE_DEPTH: usize = 64;

pub type ValueMap = BTreeMap<String, ControlValue>;

/// Change callback: `(old, new)` snapshots in, statuses and overrides out.
pub type OnChange = Box<dyn Fn(&ValueMap, &ValueMap) -> ChangeOutcome>;

/// Visibility of a control. Ordered so that the stronger restriction wins when nested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ControlStatus {
    #[default]
    Enabled,
    Disabled,
    Hidden,
}

/// What a change callback asks for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeOutcome {
    /// Status changes; controls not listed keep their current status.
    pub status: BTreeMap<String, ControlStatus>,
    /// Values to force, applied in order.
    pub overrides: Vec<(String, ControlValue)>,
}

impl ChangeOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, name: impl Into<String>, status: ControlStatus) -> Self {
        self.status.insert(name.into(), status);
        self
    }

    pub fn with_override(mut self, name: impl Into<String>, value: ControlValue) -> Self {
        self.overrides.push((name.into(), value));
        self
    }

    pub fn set_status(&mut self, name: impl Into<String>, status: ControlStatus) {
        self.status.insert(name.into(), status);
    }

    pub fn push_override(&mut self, name: impl Into<String>, value: ControlValue) {
        self.overrides.push((name.into(), value));
    }
}

/// Change callback for control sets without dependencies.
pub fn unchanged(_old: &ValueMap, _new: &ValueMap) -> ChangeOutcome {
    ChangeOutcome::default()
}

#[derive(Debug, Clone)]
struct Control {
    name: String,
    kind: ControlKind,
    /// 1-based index shown in front of editable controls.
    badge: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct ParameterDescriptorCompiler<'s> {
    session: &'s SessionContext,
}

impl<'s> ParameterDescriptorCompiler<'s> {
    pub fn new(session: &'s SessionContext) -> Self {
        Self { session }
    }

    pub fn compile<I, N, D, F>(
        &self,
        descriptors: I,
        on_change: F,
    ) -> Result<ControlState, DescriptorError>
    where
        I: IntoIterator<Item = (N, D)>,
        N: Into<String>,
        D: AsRef<str>,
        F: Fn(&ValueMap, &ValueMap) -> ChangeOutcome + 'static,
    {
        let mut controls: Vec<Control> = Vec::new();
        let mut index = HashMap::new();
        let mut values = ValueMap::new();
        let mut tree = TreeBuilder::new();
        let mut next_badge = 1;

        for (name, descriptor) in descriptors {
            let name: String = name.into();
            let kind = ControlKind::parse(&name, descriptor.as_ref())?;
            if index.contains_key(&name) {
                return Err(DescriptorError::DuplicateName { name });
            }
            let value = kind.initial_value(&name, self.session)?;
            let badge = kind.is_editable().then(|| {
                next_badge += 1;
                next_badge - 1
            });

            let slot = controls.len();
            tree.push(slot, &name, kind.group_children());
            index.insert(name.clone(), slot);
            values.insert(name.clone(), value);
            controls.push(Control { name, kind, badge });
        }

        let mut state = ControlState {
            controls,
            index,
            values,
            status: BTreeMap::new(),
            tree: tree.finish()?,
            on_change: Box::new(on_change),
            renderer: ControlLayoutRenderer::default(),
        };
        debug!(controls = state.controls.len(), "compiled control set");

        let seed = (state.on_change)(&state.values, &state.values);
        let seeded = state.cascade(seed, 0);
        state.release_buttons();
        seeded?;
        Ok(state)
    }
}

/// A compiled control set: current values, statuses, nesting, and the change callback.
pub struct ControlState {
    controls: Vec<Control>,
    index: HashMap<String, usize>,
    values: ValueMap,
    status: BTreeMap<String, ControlStatus>,
    tree: ControlTree,
    on_change: OnChange,
    renderer: ControlLayoutRenderer,
}

impl fmt::Debug for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlState")
            .field("values", &self.values)
            .field("status", &self.status)
            .field("tree", &self.tree)
            .finish_non_exhaustive()
    }
}

impl ControlState {
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&ControlValue> {
        self.values.get(name)
    }

    pub fn kind(&self, name: &str) -> Option<&ControlKind> {
        self.index.get(name).map(|&slot| &self.controls[slot].kind)
    }

    pub fn status(&self, name: &str) -> ControlStatus {
        self.status.get(name).copied().unwrap_or_default()
    }

    pub fn tree(&self) -> &ControlTree {
        &self.tree
    }

    /// Names of controls that accept user input, in registration order.
    pub fn settable_names(&self) -> impl Iterator<Item = &str> {
        self.controls
            .iter()
            .filter(|control| control.kind.is_editable() || control.kind.is_button())
            .map(|control| control.name.as_str())
    }

    /// Resolve a user reference to a control name: a badge number, an exact name, or a name
    /// differing only in case.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        let key = key.trim();
        if let Ok(badge) = key.parse::<usize>() {
            if let Some(control) = self.controls.iter().find(|c| c.badge == Some(badge)) {
                return Some(&control.name);
            }
        }
        if let Some(&slot) = self.index.get(key) {
            return Some(&self.controls[slot].name);
        }
        self.controls
            .iter()
            .find(|control| control.name.eq_ignore_ascii_case(key))
            .map(|control| control.name.as_str())
    }

    /// Convert user text into a value for the control `name`.
    pub fn parse_value(&self, name: &str, text: &str) -> Result<ControlValue, UpdateError> {
        let kind = self
            .kind(name)
            .ok_or_else(|| UpdateError::UnknownParameter(name.to_string()))?;
        // `+` and `-` nudge a numeric control by its increment.
        if let (Some(range), Some(ControlValue::Number(current))) =
            (kind.numeric_range(), self.values.get(name))
        {
            match text.trim() {
                "+" => return Ok(ControlValue::Number(range.step_by(*current, 1.0))),
                "-" => return Ok(ControlValue::Number(range.step_by(*current, -1.0))),
                _ => {}
            }
        }
        kind.parse_input(name, text)
    }

    /// Resolve `key`, parse `text` for it, and apply the update. Returns the control name.
    pub fn update_from_text(&mut self, key: &str, text: &str) -> Result<String, UpdateError> {
        let name = self
            .resolve(key)
            .ok_or_else(|| UpdateError::UnknownParameter(key.to_string()))?
            .to_string();
        let value = self.parse_value(&name, text)?;
        self.update_parameter_action([(name.as_str(), value)])?;
        Ok(name)
    }

    /// Apply a batch of updates in order, each with its full change cascade.
    ///
    /// Unknown names are skipped. A failing entry leaves the values and statuses as they were
    /// before that entry and stops the batch.
    pub fn update_parameter_action<I, N>(&mut self, batch: I) -> Result<(), UpdateError>
    where
        I: IntoIterator<Item = (N, ControlValue)>,
        N: AsRef<str>,
    {
        for (name, value) in batch {
            let name = name.as_ref();
            if !self.index.contains_key(name) {
                debug!(name, "ignoring update for unknown parameter");
                continue;
            }
            let saved_values = self.values.clone();
            let saved_status = self.status.clone();
            let result = self.apply(name, value, 0);
            self.release_buttons();
            if let Err(err) = result {
                warn!(name, error = %err, "parameter update rolled back");
                self.values = saved_values;
                self.status = saved_status;
                return Err(err);
            }
        }
        Ok(())
    }

    fn apply(&mut self, name: &str, value: ControlValue, depth: usize) -> Result<(), UpdateError> {
        if depth > MAX_CASCADE_DEPTH {
            return Err(UpdateError::CascadeTooDeep {
                name: name.to_string(),
                depth: MAX_CASCADE_DEPTH,
            });
        }
        let Some(&slot) = self.index.get(name) else {
            warn!(name, depth, "override names an unknown parameter");
            return Ok(());
        };
        let value = self.controls[slot].kind.accept(name, value)?;
        if depth > 0 && self.values.get(name) == Some(&value) {
            return Ok(());
        }
        if depth > 0 {
            debug!(name, depth, "applying override");
        }

        let before = self.values.clone();
        self.values.insert(name.to_string(), value);
        let outcome = (self.on_change)(&before, &self.values);
        self.cascade(outcome, depth)
    }

    fn cascade(&mut self, outcome: ChangeOutcome, depth: usize) -> Result<(), UpdateError> {
        self.status.extend(outcome.status);
        for (target, value) in outcome.overrides {
            self.apply(&target, value, depth + 1)?;
        }
        Ok(())
    }

    fn release_buttons(&mut self) {
        for control in self.controls.iter().filter(|c| c.kind.is_button()) {
            self.values
                .insert(control.name.clone(), ControlValue::Pressed(None));
        }
    }

    /// Printable entries for the current values and statuses.
    pub fn layout_nodes(&self) -> Vec<LayoutNode> {
        self.tree
            .roots
            .iter()
            .filter_map(|node| self.layout_node(node, ControlStatus::Enabled))
            .collect()
    }

    pub fn render_lines(&self) -> Vec<Line> {
        let nodes = self.layout_nodes();
        if nodes.is_empty() {
            return vec![no_options()];
        }
        self.renderer.layout(&nodes)
    }

    pub fn render<S: ConsoleSurface + ?Sized>(&self, surface: &mut S) {
        let nodes = self.layout_nodes();
        if nodes.is_empty() {
            surface.ensure_line_start();
            surface.write_line(&no_options());
            return;
        }
        self.renderer.render(&nodes, surface);
    }

    fn layout_node(&self, node: &TreeNode, inherited: ControlStatus) -> Option<LayoutNode> {
        let control = &self.controls[node.index];
        let status = self.status(&control.name).max(inherited);
        if status == ControlStatus::Hidden {
            return None;
        }
        let dim = |line: Line| {
            if status == ControlStatus::Disabled {
                line.restyled(Style::PLAIN.dim())
            } else {
                line
            }
        };

        match &control.kind {
            ControlKind::Group { .. } | ControlKind::Expander { .. } => {
                let label = Line::new(vec![Span::new(control.name.clone(), Style::PLAIN.bold())]);
                Some(LayoutNode::Group {
                    label: dim(label),
                    children: node
                        .children
                        .iter()
                        .filter_map(|child| self.layout_node(child, status))
                        .collect(),
                })
            }
            ControlKind::Label { text, alignment } => {
                let text = dim(Line::from(text.as_str()));
                Some(match alignment {
                    Some(alignment) => LayoutNode::Aligned {
                        text,
                        alignment: *alignment,
                    },
                    None => LayoutNode::Leaf(text),
                })
            }
            kind if kind.is_editable() => {
                let mut line = Line::default();
                if let Some(badge) = control.badge {
                    line.push(Span::new(format!("[{badge}] "), Style::fg(Color::Yellow)));
                }
                line.push(Span::plain(format!("{}: ", control.name)));
                for span in self.value_spans(control) {
                    line.push(span);
                }
                Some(LayoutNode::Leaf(dim(line)))
            }
            _ => None,
        }
    }

    fn value_spans(&self, control: &Control) -> Vec<Span> {
        let value_style = Style::fg(Color::Cyan);
        let Some(value) = self.values.get(&control.name) else {
            return Vec::new();
        };
        let text = match (&control.kind, value) {
            (_, ControlValue::Bool(on)) => (if *on { "[x]" } else { "[ ]" }).to_string(),
            (ControlKind::SourceCode { .. }, ControlValue::Text(code)) => {
                let mut lines = code.lines();
                let first = lines.next().unwrap_or_default().to_string();
                match lines.count() {
                    0 => first,
                    more => format!("{first} (+{more} lines)"),
                }
            }
            (_, ControlValue::Text(text)) => text.clone(),
            (
                ControlKind::NumericUpDown { range, .. } | ControlKind::Slider { range, .. },
                ControlValue::Number(number),
            ) => format_number(*number, range.decimals),
            (_, ControlValue::Number(number)) => format_number(*number, None),
            (ControlKind::ComboBox { items, .. }, ControlValue::Choice(index)) => {
                items.get(*index).cloned().unwrap_or_default()
            }
            (_, ControlValue::Color(rgba)) => {
                return vec![
                    Span::new("██", Style::fg(Color::Rgb(rgba.r, rgba.g, rgba.b))),
                    Span::new(format!(" {rgba}"), value_style),
                ];
            }
            (_, ControlValue::Font(font)) => font.to_string(),
            (_, ControlValue::Point(point)) => point.to_string(),
            (_, ControlValue::Dash(dash)) => dash.to_string(),
            (_, other) => format!("<{}>", other.type_name()),
        };
        vec![Span::new(text, value_style)]
    }
}

fn no_options() -> Line {
    Line::new(vec![Span::new("(no options)", Style::PLAIN.dim())])
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{
        unchanged, ChangeOutcome, ControlStatus, ParameterDescriptorCompiler, ValueMap,
        MAX_CASCADE_DEPTH,
    };
    use crate::controls::session::SessionContext;
    use crate::controls::value::ControlValue;
    use crate::error::{DescriptorError, UpdateError};

    fn compile(
        descriptors: &[(&str, &str)],
        on_change: impl Fn(&ValueMap, &ValueMap) -> ChangeOutcome + 'static,
    ) -> Result<super::ControlState, DescriptorError> {
        let session = SessionContext::new();
        ParameterDescriptorCompiler::new(&session).compile(descriptors.iter().copied(), on_change)
    }

    #[test]
    fn empty_set_renders_no_options() {
        let state = compile(&[], unchanged).expect("compile");
        let lines = state.render_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "(no options)");
        assert!(lines[0].spans()[0].style().dim);
    }

    #[test]
    fn unknown_update_is_a_noop() {
        let mut state = compile(&[("Width", "NumericUpDown:5[0,10,1]")], unchanged).expect("compile");
        let before = state.values().clone();
        state
            .update_parameter_action([("Height", ControlValue::Number(3.0))])
            .expect("update");
        assert_eq!(state.values(), &before);
    }

    #[test]
    fn plus_and_minus_step_by_the_increment() {
        let mut state = compile(&[("Width", "NumericUpDown:5[0,10,2]")], unchanged).expect("compile");
        for (input, expected) in [("+", 7.0), ("+", 9.0), ("+", 10.0), ("-", 8.0)] {
            state.update_from_text("width", input).expect("step");
            assert_eq!(state.value("Width"), Some(&ControlValue::Number(expected)));
        }
    }

    #[test]
    fn update_changes_only_its_entry() {
        let seen: Rc<RefCell<Vec<(ValueMap, ValueMap)>>> = Rc::default();
        let record = Rc::clone(&seen);
        let mut state = compile(
            &[
                ("Width", "NumericUpDown:5[0,10,1]"),
                ("Show labels", "CheckBox:true"),
            ],
            move |old, new| {
                record.borrow_mut().push((old.clone(), new.clone()));
                ChangeOutcome::default()
            },
        )
        .expect("compile");
        assert_eq!(state.value("Width"), Some(&ControlValue::Number(5.0)));

        state
            .update_parameter_action([("Width", ControlValue::Number(7.0))])
            .expect("update");
        let seen = seen.borrow();
        let (old, new) = seen.last().expect("change recorded");
        let changed: Vec<&String> = new
            .iter()
            .filter(|(name, value)| old.get(*name) != Some(*value))
            .map(|(name, _)| name)
            .collect();
        assert_eq!(changed, vec!["Width"]);
        assert_eq!(new.get("Width"), Some(&ControlValue::Number(7.0)));
    }

    #[test]
    fn override_cascade_updates_both_controls() {
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let mut state = compile(
            &[("Shape", "ComboBox:0[\"Rectangular\",\"Circular\"]"), ("Label", "TextBox:none")],
            move |old, new| {
                *counter.borrow_mut() += 1;
                let mut outcome = ChangeOutcome::new();
                if old.get("Shape") != new.get("Shape") {
                    outcome.push_override("Label", ControlValue::Text("X".to_string()));
                }
                outcome
            },
        )
        .expect("compile");
        *calls.borrow_mut() = 0;

        state
            .update_parameter_action([("Shape", ControlValue::Choice(1))])
            .expect("update");
        assert_eq!(state.value("Shape"), Some(&ControlValue::Choice(1)));
        assert_eq!(state.value("Label"), Some(&ControlValue::Text("X".to_string())));
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn seed_applies_statuses_and_overrides() {
        let state = compile(
            &[("Show", "CheckBox:false"), ("Size", "Slider:1[0,4]")],
            |_old, new| {
                let mut outcome = ChangeOutcome::new();
                if new.get("Show") == Some(&ControlValue::Bool(false)) {
                    outcome.set_status("Size", ControlStatus::Disabled);
                }
                outcome.push_override("Size", ControlValue::Number(2.0));
                outcome
            },
        )
        .expect("compile");
        assert_eq!(state.status("Size"), ControlStatus::Disabled);
        assert_eq!(state.value("Size"), Some(&ControlValue::Number(2.0)));
    }

    #[test]
    fn cyclic_rules_hit_the_depth_limit() {
        let mut state = compile(
            &[("A", "CheckBox:false"), ("B", "CheckBox:false")],
            |old, new| {
                let mut outcome = ChangeOutcome::new();
                if old.get("A") != new.get("A") {
                    let b = new.get("B").and_then(ControlValue::as_bool).unwrap_or(false);
                    outcome.push_override("B", ControlValue::Bool(!b));
                }
                if old.get("B") != new.get("B") {
                    let a = new.get("A").and_then(ControlValue::as_bool).unwrap_or(false);
                    outcome.push_override("A", ControlValue::Bool(!a));
                }
                outcome
            },
        )
        .expect("compile");
        let err = state
            .update_parameter_action([("A", ControlValue::Bool(true))])
            .expect_err("cycle");
        assert!(matches!(
            err,
            UpdateError::CascadeTooDeep { depth, .. } if depth == MAX_CASCADE_DEPTH
        ));
        assert_eq!(state.value("A"), Some(&ControlValue::Bool(false)));
        assert_eq!(state.value("B"), Some(&ControlValue::Bool(false)));
    }

    #[test]
    fn buttons_reset_after_press() {
        let presses = Rc::new(RefCell::new(Vec::new()));
        let record = Rc::clone(&presses);
        let mut state = compile(
            &[("Actions", "Buttons:[\"Reset\",\"Apply\"]")],
            move |_old, new| {
                if let Some(index) = new.get("Actions").and_then(ControlValue::pressed) {
                    record.borrow_mut().push(index);
                }
                ChangeOutcome::default()
            },
        )
        .expect("compile");
        state.update_from_text("Actions", "apply").expect("press");
        state.update_from_text("actions", "apply").expect("press again");
        assert_eq!(*presses.borrow(), vec![1, 1]);
        assert_eq!(state.value("Actions"), Some(&ControlValue::Pressed(None)));
    }

    #[test]
    fn resolve_by_badge_or_name() {
        let state = compile(
            &[
                ("Layout", "Group:2"),
                ("Width", "NumericUpDown:5[0,10]"),
                ("Go", "Button:Go"),
                ("Height", "NumericUpDown:3[0,10]"),
            ],
            unchanged,
        )
        .expect("compile");
        assert_eq!(state.resolve("1"), Some("Width"));
        assert_eq!(state.resolve("2"), Some("Height"));
        assert_eq!(state.resolve("height"), Some("Height"));
        assert_eq!(state.resolve("9"), None);
        assert_eq!(state.settable_names().collect::<Vec<_>>(), vec!["Width", "Go", "Height"]);
    }

    #[test]
    fn duplicate_names_fail() {
        let err = compile(&[("A", "CheckBox:true"), ("A", "CheckBox:false")], unchanged)
            .expect_err("duplicate");
        assert_eq!(err, DescriptorError::DuplicateName { name: "A".to_string() });
    }

    #[test]
    fn hidden_and_disabled_rendering() {
        let state = compile(
            &[("Width", "NumericUpDown:5[0,10]"), ("Height", "NumericUpDown:3[0,10]")],
            |_old, _new| {
                ChangeOutcome::new()
                    .with_status("Width", ControlStatus::Hidden)
                    .with_status("Height", ControlStatus::Disabled)
            },
        )
        .expect("compile");
        let lines = state.render_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "[2] Height: 3");
        assert!(lines[0].spans().iter().all(|span| span.style().dim));
    }
}
