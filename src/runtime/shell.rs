//! Read-execute loop.

use std::io;

use tracing::{debug, warn};

use crate::config::EnvConfig;
use crate::core::autocomplete::CompletionProvider;
use crate::core::commands::{CommandContext, CommandOutcome, CommandRegistry, ConsoleCommand};
use crate::core::recover::catch_quietly;
use crate::core::terminal::ConsoleSurface;
use crate::error::{CommandError, RegistryError};
use crate::render::frame::{Color, Line, Span, Style};
use crate::runtime::builtins::{ExitCommand, HelpCommand};
use crate::widgets::editor::{EditorOptions, LineEditor};

const ERROR_INDENT: &str = "    ";

#[derive(Debug, Clone)]
pub struct ShellOptions {
    pub prompt: Line,
    /// Literal that ends the loop; Ctrl-D and end of input produce it.
    pub exit_command: String,
    pub force_plain: bool,
}

impl Default for ShellOptions {
    fn default() -> Self {
        let editor = EditorOptions::default();
        Self {
            prompt: editor.prompt,
            exit_command: editor.exit_command,
            force_plain: editor.force_plain,
        }
    }
}

impl ShellOptions {
    pub fn from_config(config: &EnvConfig) -> Self {
        Self {
            force_plain: config.force_plain,
            ..Self::default()
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<Line>) -> Self {
        self.prompt = prompt.into();
        self
    }

    fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            prompt: self.prompt.clone(),
            exit_command: self.exit_command.clone(),
            force_plain: self.force_plain,
        }
    }
}

/// Ties a [`LineEditor`] and a [`CommandRegistry`] to a surface.
#[derive(Debug)]
pub struct Shell {
    editor: LineEditor,
    commands: CommandRegistry,
    exit_command: String,
}

impl Shell {
    pub fn new(options: ShellOptions) -> Self {
        Self {
            editor: LineEditor::new(options.editor_options()),
            commands: CommandRegistry::new(),
            exit_command: options.exit_command,
        }
    }

    /// A shell with the `help` and `exit` commands registered.
    pub fn with_builtins(options: ShellOptions) -> Result<Self, RegistryError> {
        let exit_name = options.exit_command.clone();
        let mut shell = Self::new(options);
        shell.register(Box::new(HelpCommand))?;
        shell.register(Box::new(ExitCommand::new(exit_name)))?;
        Ok(shell)
    }

    pub fn register(&mut self, command: Box<dyn ConsoleCommand>) -> Result<(), RegistryError> {
        self.commands.register(command)
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    /// Read and execute lines until a command asks to exit.
    pub fn run<S: ConsoleSurface>(&mut self, surface: &mut S) -> io::Result<()> {
        loop {
            if self.step(surface)? == CommandOutcome::Exit {
                return Ok(());
            }
        }
    }

    /// Read one line and execute it. An aborted read continues the loop.
    pub fn step<S: ConsoleSurface>(&mut self, surface: &mut S) -> io::Result<CommandOutcome> {
        let provider = CompletionProvider::new(&self.commands);
        let Some(line) = self.editor.read_line(surface, &provider)? else {
            debug!("read aborted");
            return Ok(CommandOutcome::Continue);
        };
        self.execute_line(&line, surface)
    }

    /// Execute one command line. Failures are reported on the surface and the loop goes on.
    pub fn execute_line<S: ConsoleSurface>(
        &mut self,
        line: &str,
        surface: &mut S,
    ) -> io::Result<CommandOutcome> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(CommandOutcome::Continue);
        }
        let (head, rest) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));

        let summaries = self.commands.summaries();
        let result = match self.commands.resolve_mut(head) {
            Some(command) => {
                let mut ctx = CommandContext {
                    console: &mut *surface,
                    commands: &summaries,
                };
                catch_quietly(|| command.execute(rest.trim_start(), &mut ctx)).unwrap_or_else(
                    |message| Err(CommandError::failed(format!("command panicked: {message}"))),
                )
            }
            None if head.eq_ignore_ascii_case(&self.exit_command) => Ok(CommandOutcome::Exit),
            None => Err(CommandError::failed(format!("unknown command `{head}`"))),
        };

        match result {
            Ok(outcome) => {
                surface.flush()?;
                Ok(outcome)
            }
            Err(err) => {
                warn!(line = trimmed, error = %err, "command failed");
                report_error(surface, trimmed, &err);
                surface.flush()?;
                Ok(CommandOutcome::Continue)
            }
        }
    }
}

/// Print the failing line, then every line of the message indented under it.
fn report_error<S: ConsoleSurface + ?Sized>(surface: &mut S, line: &str, err: &CommandError) {
    let error_style = Style::fg(Color::Red);
    surface.ensure_line_start();
    surface.write_line(&Line::new(vec![Span::new(
        format!("Error while executing `{line}`:"),
        error_style.bold(),
    )]));
    for message_line in err.to_string().lines() {
        surface.write_line(&Line::new(vec![Span::new(
            format!("{ERROR_INDENT}{message_line}"),
            error_style,
        )]));
    }
}
