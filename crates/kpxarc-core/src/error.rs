// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for kpxarc.

use thiserror::Error;

use crate::types::ExitStatus;

/// The error type shared by every kpxarc crate.
#[derive(Debug, Error)]
pub enum KpxarcError {
    /// Caller supplied unusable input (empty archive path, no vault, empty argv).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// None of the candidate vault keys for an archive held a secret.
    #[error("password not found for archive '{archive}' (tried: {})", .tried.join(", "))]
    SecretNotFound {
        /// Base name of the archive as given by the caller.
        archive: String,
        /// Every vault key queried, in query order.
        tried: Vec<String>,
    },

    /// A single vault key holds no entry.
    #[error("vault entry '{key}' not found")]
    EntryNotFound { key: String },

    /// The vault refused to overwrite an existing entry.
    #[error("entry '{key}' already exists")]
    AlreadyExists { key: String },

    /// The pseudo-terminal pair could not be allocated.
    #[error("failed to allocate pseudo-terminal: {source}")]
    PtyAllocation {
        #[source]
        source: std::io::Error,
    },

    /// The child process could not be started.
    #[error("failed to start '{program}': {source}")]
    ChildStart {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The child process ran to completion but did not succeed.
    #[error("child process failed with {status}")]
    ChildExit { status: ExitStatus },

    /// The vault tool failed for a reason other than a missing entry.
    #[error("vault error: {message}")]
    Vault {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid TOML, out-of-range values, unset paths).
    #[error("configuration error: {0}")]
    Config(String),

    /// Required external tools are not installed.
    #[error("missing required dependencies: {}", .0.join(", "))]
    MissingDependency(Vec<String>),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl KpxarcError {
    /// Shorthand for a [`KpxarcError::Vault`] without an underlying cause.
    pub fn vault(message: impl Into<String>) -> Self {
        Self::Vault {
            message: message.into(),
            source: None,
        }
    }

    /// Returns `true` for the aggregated lookup miss.
    pub fn is_secret_not_found(&self) -> bool {
        matches!(self, Self::SecretNotFound { .. })
    }
}
