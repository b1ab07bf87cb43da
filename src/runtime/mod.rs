//! Shell loop and built-in commands.

pub mod builtins;
pub mod shell;

pub use builtins::{ExitCommand, HelpCommand};
pub use shell::{Shell, ShellOptions};
