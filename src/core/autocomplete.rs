//! Command-line completion.

use tracing::{debug, warn};

use crate::core::commands::CommandRegistry;
use crate::core::recover::catch_quietly;
use crate::render::frame::{Color, Line, Span, Style};

/// One completion candidate: how it is listed, and the literal text that replaces the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub display: Line,
    pub replacement: String,
}

impl Completion {
    pub fn new(display: Line, replacement: impl Into<String>) -> Self {
        Self {
            display,
            replacement: replacement.into(),
        }
    }

    /// Candidate listed as its own replacement text.
    pub fn plain(replacement: impl Into<String>) -> Self {
        let replacement = replacement.into();
        Self {
            display: Line::from(replacement.trim_end()),
            replacement,
        }
    }
}

pub trait Completer {
    fn complete(&self, partial: &str) -> Vec<Completion>;
}

/// Completion over the registered command set.
#[derive(Debug, Clone, Copy)]
pub struct CompletionProvider<'a> {
    commands: &'a CommandRegistry,
}

impl<'a> CompletionProvider<'a> {
    pub fn new(commands: &'a CommandRegistry) -> Self {
        Self { commands }
    }

    fn complete_command_names(&self, partial: &str) -> Vec<Completion> {
        let needle = partial.to_lowercase();
        let mut matches: Vec<Completion> = self
            .commands
            .iter()
            .filter(|command| command.primary_name().to_lowercase().starts_with(&needle))
            .map(|command| {
                let name = command.primary_name();
                let mut display = Line::new(vec![Span::new(name, Style::fg(Color::Cyan).bold())]);
                if !command.help_text().is_empty() {
                    display.push(Span::plain("  "));
                    display.push(Span::new(command.help_text(), Style::PLAIN.dim()));
                }
                Completion::new(display, format!("{name} "))
            })
            .collect();
        matches.sort_by_key(|candidate| candidate.replacement.to_lowercase());
        matches
    }

    fn complete_arguments(&self, head: &str, rest: &str) -> Vec<Completion> {
        let Some(command) = self.commands.resolve(head) else {
            return Vec::new();
        };
        let name = command.primary_name();
        let result = catch_quietly(|| command.complete(rest));
        match result {
            Ok(Ok(candidates)) => candidates
                .into_iter()
                .map(|candidate| Completion {
                    display: candidate.display,
                    replacement: format!("{name} {}", candidate.replacement),
                })
                .collect(),
            Ok(Err(err)) => {
                debug!(command = name, error = %err, "completion failed");
                Vec::new()
            }
            Err(message) => {
                warn!(command = name, panic = %message, "completion panicked");
                Vec::new()
            }
        }
    }
}

impl Completer for CompletionProvider<'_> {
    fn complete(&self, partial: &str) -> Vec<Completion> {
        match partial.split_once(char::is_whitespace) {
            None => self.complete_command_names(partial),
            Some((head, rest)) => self.complete_arguments(head, rest.trim_start()),
        }
    }
}

/// Longest prefix shared by every string, compared case-insensitively.
///
/// The returned characters are taken from the first string.
pub fn longest_common_prefix<'s>(items: impl IntoIterator<Item = &'s str>) -> String {
    let mut items = items.into_iter();
    let Some(first) = items.next() else {
        return String::new();
    };
    let mut keep = first.chars().count();
    for other in items {
        keep = first
            .chars()
            .zip(other.chars())
            .take(keep)
            .take_while(|(a, b)| a.to_lowercase().eq(b.to_lowercase()))
            .count();
    }
    first.chars().take(keep).collect()
}
