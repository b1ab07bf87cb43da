//! Diagnostic logging.
//!
//! The terminal belongs to the line editor, so diagnostics never go to stdout/stderr. When
//! `TREE_CONSOLE_LOG` names a file, a `tracing` subscriber appends to it; otherwise events are
//! dropped.

use std::fs::OpenOptions;
use std::sync::Mutex;

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;

static INSTALLED: OnceCell<bool> = OnceCell::new();

/// Install the file subscriber described by `config`.
///
/// Returns whether a subscriber is active. Repeated calls return the first outcome.
pub fn init(config: &EnvConfig) -> bool {
    *INSTALLED.get_or_init(|| install(config))
}

fn install(config: &EnvConfig) -> bool {
    let Some(path) = config.log_file.as_deref() else {
        return false;
    };
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(_) => return false,
    };
    let filter = EnvFilter::try_new(config.log_filter_or_default())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
