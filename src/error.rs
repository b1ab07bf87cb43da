//! Error types.

use std::io;

use thiserror::Error;

/// A descriptor that cannot be compiled into a control.
///
/// These indicate a schema mismatch between the descriptor producer and the compiler and are
/// never defaulted away.
#[derive(Debug, Error, PartialEq)]
pub enum DescriptorError {
    #[error("parameter `{name}`: descriptor `{descriptor}` has no `kind:` prefix")]
    MissingKind { name: String, descriptor: String },

    #[error("parameter `{name}`: unknown control kind `{kind}`")]
    UnknownKind { name: String, kind: String },

    #[error("parameter `{name}` ({kind}): {reason}")]
    InvalidParameters {
        name: String,
        kind: String,
        reason: String,
    },

    #[error("parameter `{name}` is declared more than once")]
    DuplicateName { name: String },

    #[error("group `{name}` declares {declared} children but only {found} descriptors follow")]
    UnclosedGroup {
        name: String,
        declared: usize,
        found: usize,
    },

    #[error("parameter `{name}` ({kind}) needs a session binding that is not available")]
    MissingBinding { name: String, kind: String },

    #[error("initial change notification failed: {0}")]
    Seed(#[from] UpdateError),
}

/// A failed `update_parameter_action` step.
#[derive(Debug, Error, PartialEq)]
pub enum UpdateError {
    #[error("parameter `{name}` expects {expected}")]
    TypeMismatch { name: String, expected: String },

    #[error("parameter `{name}` expects {expected}, got `{input}`")]
    InvalidInput {
        name: String,
        expected: String,
        input: String,
    },

    #[error("no parameter named `{0}`")]
    UnknownParameter(String),

    #[error("change cascade exceeded {depth} nested overrides at `{name}`")]
    CascadeTooDeep { name: String, depth: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a command named `{0}` is already registered")]
    DuplicateCommand(String),
}

/// Failure raised by a command's completion or execution.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Failed(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error(transparent)]
    Update(#[from] UpdateError),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CommandError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
