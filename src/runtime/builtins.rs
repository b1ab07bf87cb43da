//! Commands every shell carries.

use crate::core::commands::{CommandContext, CommandOutcome, ConsoleCommand};
use crate::error::CommandError;
use crate::render::frame::{Color, Line, Span, Style};

/// `help [command]`: list commands with their descriptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelpCommand;

impl ConsoleCommand for HelpCommand {
    fn primary_name(&self) -> &str {
        "help"
    }

    fn help_text(&self) -> &str {
        "List the available commands"
    }

    fn execute(
        &mut self,
        rest: &str,
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        let filter = rest.trim();
        let shown: Vec<_> = ctx
            .commands
            .iter()
            .filter(|summary| filter.is_empty() || summary.name.eq_ignore_ascii_case(filter))
            .collect();
        if shown.is_empty() {
            return Err(CommandError::failed(format!("no command named `{filter}`")));
        }

        let width = shown.iter().map(|summary| summary.name.len()).max().unwrap_or(0);
        ctx.console.ensure_line_start();
        for summary in shown {
            let mut line = Line::new(vec![Span::new(
                format!("{:<width$}", summary.name),
                Style::fg(Color::Cyan).bold(),
            )]);
            if !summary.help.is_empty() {
                line.push(Span::plain(format!("  {}", summary.help)));
            }
            ctx.console.write_line(&line);
        }
        Ok(CommandOutcome::Continue)
    }
}

/// Ends the shell loop.
#[derive(Debug, Clone)]
pub struct ExitCommand {
    name: String,
}

impl ExitCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for ExitCommand {
    fn default() -> Self {
        Self::new("exit")
    }
}

impl ConsoleCommand for ExitCommand {
    fn primary_name(&self) -> &str {
        &self.name
    }

    fn help_text(&self) -> &str {
        "Leave the console"
    }

    fn execute(
        &mut self,
        _rest: &str,
        _ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        Ok(CommandOutcome::Exit)
    }
}

#[cfg(test)]
mod tests {
    use super::{ExitCommand, HelpCommand};
    use crate::core::commands::{CommandContext, CommandOutcome, CommandSummary, ConsoleCommand};
    use crate::platform::virtual_surface::VirtualSurface;

    fn summaries() -> Vec<CommandSummary> {
        vec![
            CommandSummary {
                name: "help".to_string(),
                help: "List the available commands".to_string(),
            },
            CommandSummary {
                name: "options".to_string(),
                help: String::new(),
            },
        ]
    }

    #[test]
    fn help_lists_aligned_names() {
        let mut surface = VirtualSurface::new(60, 10);
        let commands = summaries();
        let mut ctx = CommandContext {
            console: &mut surface,
            commands: &commands,
        };
        let outcome = HelpCommand.execute("", &mut ctx).expect("help");
        assert_eq!(outcome, CommandOutcome::Continue);
        assert_eq!(
            surface.lines()[..2],
            [
                "help     List the available commands".to_string(),
                "options".to_string(),
            ]
        );
    }

    #[test]
    fn help_for_unknown_command_fails() {
        let mut surface = VirtualSurface::new(60, 10);
        let commands = summaries();
        let mut ctx = CommandContext {
            console: &mut surface,
            commands: &commands,
        };
        assert!(HelpCommand.execute("nope", &mut ctx).is_err());
    }

    #[test]
    fn exit_ends_the_loop() {
        let mut surface = VirtualSurface::new(60, 10);
        let mut ctx = CommandContext {
            console: &mut surface,
            commands: &[],
        };
        assert_eq!(
            ExitCommand::default().execute("", &mut ctx).expect("exit"),
            CommandOutcome::Exit
        );
    }
}
