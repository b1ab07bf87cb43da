//! Command registry consumed by the completion provider and the shell loop.

use crate::core::autocomplete::Completion;
use crate::core::terminal::ConsoleSurface;
use crate::error::{CommandError, RegistryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSummary {
    pub name: String,
    pub help: String,
}

/// What a running command may touch.
pub struct CommandContext<'a> {
    pub console: &'a mut dyn ConsoleSurface,
    pub commands: &'a [CommandSummary],
}

/// A console command.
pub trait ConsoleCommand {
    /// Name matched case-insensitively against the first token of a line.
    fn primary_name(&self) -> &str;

    /// One-line description for `help`.
    fn help_text(&self) -> &str {
        ""
    }

    /// Candidates for the text after the command name.
    ///
    /// Each candidate's `replacement` is the completed remainder; the provider re-attaches the
    /// command name.
    fn complete(&self, _rest: &str) -> Result<Vec<Completion>, CommandError> {
        Ok(Vec::new())
    }

    fn execute(
        &mut self,
        rest: &str,
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError>;
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Box<dyn ConsoleCommand>>,
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.commands.iter().map(|command| command.primary_name()))
            .finish()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command. Names must be unique ignoring case.
    pub fn register(&mut self, command: Box<dyn ConsoleCommand>) -> Result<(), RegistryError> {
        if self.position(command.primary_name()).is_some() {
            return Err(RegistryError::DuplicateCommand(
                command.primary_name().to_string(),
            ));
        }
        self.commands.push(command);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn ConsoleCommand> {
        self.commands.iter().map(|command| command.as_ref())
    }

    /// Case-insensitive exact lookup.
    pub fn resolve(&self, name: &str) -> Option<&dyn ConsoleCommand> {
        self.position(name).map(|idx| self.commands[idx].as_ref())
    }

    pub fn resolve_mut(&mut self, name: &str) -> Option<&mut Box<dyn ConsoleCommand>> {
        let idx = self.position(name)?;
        self.commands.get_mut(idx)
    }

    pub fn summaries(&self) -> Vec<CommandSummary> {
        self.commands
            .iter()
            .map(|command| CommandSummary {
                name: command.primary_name().to_string(),
                help: command.help_text().to_string(),
            })
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.commands
            .iter()
            .position(|command| command.primary_name().eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandContext, CommandOutcome, CommandRegistry, ConsoleCommand};
    use crate::error::{CommandError, RegistryError};

    struct Named(&'static str);

    impl ConsoleCommand for Named {
        fn primary_name(&self) -> &str {
            self.0
        }

        fn execute(
            &mut self,
            _rest: &str,
            _ctx: &mut CommandContext<'_>,
        ) -> Result<CommandOutcome, CommandError> {
            Ok(CommandOutcome::Continue)
        }
    }

    #[test]
    fn resolve_ignores_case() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(Named("Open"))).expect("register");
        assert!(registry.resolve("open").is_some());
        assert!(registry.resolve("OPEN").is_some());
        assert!(registry.resolve("ope").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(Named("open"))).expect("register");
        let err = registry
            .register(Box::new(Named("OPEN")))
            .expect_err("duplicate");
        assert_eq!(err, RegistryError::DuplicateCommand("OPEN".to_string()));
        assert_eq!(registry.len(), 1);
    }
}
