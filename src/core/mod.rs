//! Core interfaces and types.

pub mod autocomplete;
pub mod commands;
pub mod cursor;
pub mod input;
pub mod input_event;
pub mod output;
pub mod recover;
pub mod terminal;
pub mod text;
