// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across kpxarc crates.

use std::fmt;

use crate::error::KpxarcError;

/// How a child process finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Process exited normally with the given code.
    Exited(i32),
    /// Process was terminated by the given signal number.
    Signaled(i32),
}

impl ExitStatus {
    /// Returns `true` if the process exited with code 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }

    /// Returns the exit code if the process exited normally.
    #[must_use]
    pub const fn code(&self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(*code),
            Self::Signaled(_) => None,
        }
    }

    /// Converts a non-successful status into [`KpxarcError::ChildExit`].
    pub fn check(self) -> Result<(), KpxarcError> {
        if self.success() {
            Ok(())
        } else {
            Err(KpxarcError::ChildExit { status: self })
        }
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signaled(signal);
            }
        }
        Self::Exited(status.code().unwrap_or(-1))
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit code {code}"),
            Self::Signaled(signal) => write!(f, "signal {signal}"),
        }
    }
}

/// Non-secret attributes stored alongside a vault entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryAttributes {
    /// Username field of the entry.
    pub username: Option<String>,
    /// URL field of the entry (the absolute archive path).
    pub url: Option<String>,
}
