// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! `kdbx_path` is not required here: `kpxarc version` runs without a vault,
//! so commands that open the database check it themselves.

use crate::diagnostic::ConfigError;
use crate::model::{KpxarcConfig, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns every problem found, not just the first.
pub fn validate_config(config: &KpxarcConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let length = config.general.password_length;
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        fail(format!(
            "general.password_length must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH}, got {length}"
        ));
    }

    if config.general.default_group.trim().is_empty() {
        fail("general.default_group must not be empty".to_string());
    }

    let level = config.general.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "general.log_level `{}` is not one of {}",
            config.general.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.sevenzip.binary_path.trim().is_empty() {
        fail("sevenzip.binary_path must not be empty".to_string());
    }

    if config.keepass.binary_path.trim().is_empty() {
        fail("keepass.binary_path must not be empty".to_string());
    }

    if config.keepass.entry_username.trim().is_empty() {
        fail("keepass.entry_username must not be empty".to_string());
    }

    if config.pty.prompt_markers.iter().all(|m| m.is_empty()) {
        fail("pty.prompt_markers must contain at least one non-empty marker".to_string());
    }

    if config.pty.read_buffer_size == 0 {
        fail("pty.read_buffer_size must be at least 1".to_string());
    }

    if config.pty.injection_delay_ms > 10_000 {
        fail(format!(
            "pty.injection_delay_ms must be at most 10000, got {}",
            config.pty.injection_delay_ms
        ));
    }

    if config.pty.locale.trim().is_empty() {
        fail("pty.locale must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
