//! `options` and `set` over a shared control set.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;
use tree_console::{
    CommandContext, CommandError, CommandOutcome, Completion, ConsoleCommand, ControlKind,
    ControlState,
};

pub type SharedControls = Rc<RefCell<ControlState>>;

/// Prints the current control set.
pub struct OptionsCommand {
    controls: SharedControls,
}

impl OptionsCommand {
    pub fn new(controls: SharedControls) -> Self {
        Self { controls }
    }
}

impl ConsoleCommand for OptionsCommand {
    fn primary_name(&self) -> &str {
        "options"
    }

    fn help_text(&self) -> &str {
        "Show the layout options"
    }

    fn execute(
        &mut self,
        rest: &str,
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        if !rest.is_empty() {
            return Err(CommandError::Usage("options".to_string()));
        }
        self.controls.borrow().render(&mut *ctx.console);
        Ok(CommandOutcome::Continue)
    }
}

/// `set <name|badge> <value>`: update one control and print the result.
pub struct SetCommand {
    controls: SharedControls,
}

impl SetCommand {
    pub fn new(controls: SharedControls) -> Self {
        Self { controls }
    }
}

impl ConsoleCommand for SetCommand {
    fn primary_name(&self) -> &str {
        "set"
    }

    fn help_text(&self) -> &str {
        "Change an option by name or number"
    }

    fn complete(&self, rest: &str) -> Result<Vec<Completion>, CommandError> {
        let controls = self.controls.borrow();
        let Some((key, value)) = rest.split_once(char::is_whitespace) else {
            let needle = rest.to_lowercase();
            return Ok(controls
                .settable_names()
                .filter(|name| name.to_lowercase().starts_with(&needle))
                .map(|name| Completion::plain(format!("{name} ")))
                .collect());
        };

        let name = controls
            .resolve(key)
            .ok_or_else(|| CommandError::failed(format!("no option `{key}`")))?;
        let labels: Vec<&str> = match controls.kind(name) {
            Some(ControlKind::ComboBox { items, .. }) => items.iter().map(String::as_str).collect(),
            Some(ControlKind::Buttons { labels }) => labels.iter().map(String::as_str).collect(),
            Some(ControlKind::CheckBox { .. }) => vec!["true", "false"],
            Some(kind) if kind.numeric_range().is_some() => vec!["+", "-"],
            _ => return Ok(Vec::new()),
        };
        let needle = value.trim_start().to_lowercase();
        Ok(labels
            .iter()
            .filter(|label| label.to_lowercase().starts_with(&needle))
            .map(|label| Completion::plain(format!("{key} {label}")))
            .collect())
    }

    fn execute(
        &mut self,
        rest: &str,
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        let Some((key, value)) = rest.split_once(char::is_whitespace) else {
            return Err(CommandError::Usage("set <option> <value>".to_string()));
        };
        let mut controls = self.controls.borrow_mut();
        let name = controls.update_from_text(key, value)?;
        debug!(name = %name, value = value.trim(), "option set");
        controls.render(&mut *ctx.console);
        Ok(CommandOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{OptionsCommand, SetCommand, SharedControls};
    use crate::layout_options::compile;
    use tree_console::{
        CommandContext, CommandOutcome, ConsoleCommand, ControlValue, SessionContext,
        VirtualSurface,
    };

    fn controls() -> SharedControls {
        let session = SessionContext::new()
            .with_tree_collection("demo-trees")
            .with_window("main")
            .with_instance_state("demo-state");
        Rc::new(RefCell::new(compile(&session).expect("compile")))
    }

    fn replacements(command: &SetCommand, rest: &str) -> Vec<String> {
        command
            .complete(rest)
            .expect("complete")
            .into_iter()
            .map(|candidate| candidate.replacement)
            .collect()
    }

    #[test]
    fn set_updates_by_badge_and_prints() {
        let controls = controls();
        let mut set = SetCommand::new(Rc::clone(&controls));
        let mut surface = VirtualSurface::new(80, 40);
        let mut ctx = CommandContext {
            console: &mut surface,
            commands: &[],
        };
        let outcome = set.execute("2 900", &mut ctx).expect("set");
        assert_eq!(outcome, CommandOutcome::Continue);
        assert_eq!(
            controls.borrow().value("Width"),
            Some(&ControlValue::Number(900.0))
        );
        assert!(surface.screen_text().contains("Width: 900"));
    }

    #[test]
    fn set_without_value_is_usage_error() {
        let mut set = SetCommand::new(controls());
        let mut surface = VirtualSurface::new(80, 10);
        let mut ctx = CommandContext {
            console: &mut surface,
            commands: &[],
        };
        let err = set.execute("Width", &mut ctx).expect_err("usage");
        assert_eq!(err.to_string(), "usage: set <option> <value>");
    }

    #[test]
    fn set_completes_names_then_choices() {
        let set = SetCommand::new(controls());
        assert_eq!(replacements(&set, "t"), vec!["Thickness ", "TipLabels "]);
        assert_eq!(replacements(&set, "shape r"), vec!["shape Rectangular", "shape Radial"]);
        assert!(replacements(&set, "Width 1").is_empty());
        assert_eq!(replacements(&set, "Width "), vec!["Width +", "Width -"]);
    }

    #[test]
    fn options_prints_the_tree() {
        let mut options = OptionsCommand::new(controls());
        let mut surface = VirtualSurface::new(80, 40);
        let mut ctx = CommandContext {
            console: &mut surface,
            commands: &[],
        };
        options.execute("", &mut ctx).expect("options");
        let screen = surface.screen_text();
        assert!(screen.contains("Dimensions"));
        assert!(screen.contains("Shape: Rectangular"));
        assert!(!screen.contains("Radius"));
    }
}
