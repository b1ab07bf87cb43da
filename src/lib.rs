//! Interactive console engine for tree-visualization shells.
//!
//! Invariant: line-editor redraws reach the surface only through
//! `core::output::OutputGate::flush(..)`, which hides the cursor for the whole batch.
//!
//! # Public API Overview
//! - Read command lines with [`LineEditor`] over any [`ConsoleSurface`] ([`ProcessTerminal`]
//!   for a real TTY, [`VirtualSurface`] for tests and headless runs).
//! - Register [`ConsoleCommand`]s in a [`CommandRegistry`]; [`CompletionProvider`] completes
//!   names and delegates argument completion to the command.
//! - Compile `(name, "Kind:params")` descriptor lists into a [`ControlState`] with
//!   [`ParameterDescriptorCompiler`], update it through
//!   [`ControlState::update_parameter_action`], and print it with the box-drawn
//!   [`ControlLayoutRenderer`].
//! - Run everything in a read-execute loop with [`Shell`].

pub mod config;
pub mod error;
pub mod logging;

pub mod controls;
pub mod core;
pub mod platform;
pub mod render;
pub mod runtime;
pub mod widgets;

/// Environment configuration.
pub use crate::config::EnvConfig;

/// Error types.
pub use crate::error::{CommandError, DescriptorError, RegistryError, UpdateError};

/// Completion primitives and the command-set provider.
pub use crate::core::autocomplete::{
    longest_common_prefix, Completer, Completion, CompletionProvider,
};

/// Command registry and command contract.
pub use crate::core::commands::{
    CommandContext, CommandOutcome, CommandRegistry, CommandSummary, ConsoleCommand,
};

/// Key decoding helpers.
pub use crate::core::input::{parse_key_press, split_sequences, Key, KeyModifiers, KeyPress};
pub use crate::core::input_event::{parse_console_events, ConsoleEvent, InputDecoder};

/// Surface interface, lifecycle guard, and implementations.
pub use crate::core::terminal::{ConsoleSurface, SurfaceGuard};
#[cfg(unix)]
pub use crate::platform::process_terminal::ProcessTerminal;
pub use crate::platform::virtual_surface::VirtualSurface;

/// Line editing.
pub use crate::widgets::{EditBuffer, EditorOptions, HistoryLog, HistoryNavigator, LineEditor};

/// Parameter controls.
pub use crate::controls::{
    ChangeOutcome, ControlKind, ControlState, ControlStatus, ControlValue,
    ParameterDescriptorCompiler, SessionContext, ValueMap,
};

/// Styled text and control layout.
pub use crate::render::{
    Alignment, Color, ControlLayoutRenderer, LayoutNode, Line, Span, Style,
};

/// Shell loop.
pub use crate::runtime::{Shell, ShellOptions};

/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
