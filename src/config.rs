//! Environment configuration.

use std::env;

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub write_log: Option<String>,
    pub log_file: Option<String>,
    pub log_filter: Option<String>,
    pub force_plain: bool,
    pub no_color: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            write_log: env_string_opt("TREE_CONSOLE_WRITE_LOG"),
            log_file: env_string_opt("TREE_CONSOLE_LOG"),
            log_filter: env_string_opt("TREE_CONSOLE_LOG_FILTER"),
            force_plain: env_flag("TREE_CONSOLE_PLAIN"),
            no_color: env_string_opt("NO_COLOR").is_some(),
        }
    }

    /// Filter directive for the diagnostic log, `info` when unset.
    pub fn log_filter_or_default(&self) -> &str {
        self.log_filter.as_deref().unwrap_or("info")
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
