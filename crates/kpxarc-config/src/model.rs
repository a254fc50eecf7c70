// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for kpxarc.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Smallest accepted generated password length.
pub const MIN_PASSWORD_LENGTH: usize = 16;

/// Largest accepted generated password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Top-level kpxarc configuration.
///
/// All sections are optional and default to sensible values. Only
/// `general.kdbx_path` has no usable default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KpxarcConfig {
    /// Vault location, entry placement and logging.
    #[serde(default)]
    pub general: GeneralConfig,

    /// The 7-Zip executable and its default arguments.
    #[serde(default)]
    pub sevenzip: SevenZipConfig,

    /// The KeePassXC command-line tool.
    #[serde(default)]
    pub keepass: KeepassConfig,

    /// Prompt detection and injection tuning.
    #[serde(default)]
    pub pty: PtyConfig,
}

/// General settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Path to the KeePassXC database. A leading `~/` is expanded.
    #[serde(default)]
    pub kdbx_path: Option<String>,

    /// Group that new archive entries are created in and looked up from.
    #[serde(default = "default_group")]
    pub default_group: String,

    /// Length of generated archive passwords.
    #[serde(default = "default_password_length")]
    pub password_length: usize,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            kdbx_path: None,
            default_group: default_group(),
            password_length: default_password_length(),
            log_level: default_log_level(),
        }
    }
}

impl GeneralConfig {
    /// The database path with `~` expanded, or `None` when unset.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.kdbx_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(expand_home)
    }
}

fn default_group() -> String {
    "Archives/AutoGenerated".to_string()
}

fn default_password_length() -> usize {
    64
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// 7-Zip settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SevenZipConfig {
    /// Executable name or path.
    #[serde(default = "default_sevenzip_binary")]
    pub binary_path: String,

    /// Arguments placed right after `a` when creating archives.
    #[serde(default = "default_sevenzip_args")]
    pub default_args: Vec<String>,
}

impl Default for SevenZipConfig {
    fn default() -> Self {
        Self {
            binary_path: default_sevenzip_binary(),
            default_args: default_sevenzip_args(),
        }
    }
}

fn default_sevenzip_binary() -> String {
    "7z".to_string()
}

fn default_sevenzip_args() -> Vec<String> {
    vec!["-mhe=on".to_string(), "-mx=9".to_string()]
}

/// KeePassXC settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeepassConfig {
    /// `keepassxc-cli` executable name or path.
    #[serde(default = "default_keepass_binary")]
    pub binary_path: String,

    /// Optional key file used together with the master password.
    #[serde(default)]
    pub key_file: Option<String>,

    /// Username stored on entries created by `kpxarc a`.
    #[serde(default = "default_entry_username")]
    pub entry_username: String,
}

impl Default for KeepassConfig {
    fn default() -> Self {
        Self {
            binary_path: default_keepass_binary(),
            key_file: None,
            entry_username: default_entry_username(),
        }
    }
}

impl KeepassConfig {
    pub fn key_file_path(&self) -> Option<PathBuf> {
        self.key_file
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(expand_home)
    }
}

fn default_keepass_binary() -> String {
    "keepassxc-cli".to_string()
}

fn default_entry_username() -> String {
    "kpxarc".to_string()
}

/// Prompt detection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PtyConfig {
    /// Case-insensitive text that marks a password prompt.
    #[serde(default = "default_prompt_markers")]
    pub prompt_markers: Vec<String>,

    /// Milliseconds to wait after a prompt before typing the password.
    #[serde(default = "default_injection_delay_ms")]
    pub injection_delay_ms: u64,

    /// Bytes per read from the terminal.
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,

    /// `LC_ALL` value forced on the child so prompts are in English.
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            prompt_markers: default_prompt_markers(),
            injection_delay_ms: default_injection_delay_ms(),
            read_buffer_size: default_read_buffer_size(),
            locale: default_locale(),
        }
    }
}

impl PtyConfig {
    pub fn injection_delay(&self) -> Duration {
        Duration::from_millis(self.injection_delay_ms)
    }
}

fn default_prompt_markers() -> Vec<String> {
    vec!["enter password".to_string(), "password:".to_string()]
}

fn default_injection_delay_ms() -> u64 {
    10
}

fn default_read_buffer_size() -> usize {
    1024
}

fn default_locale() -> String {
    "C".to_string()
}

/// Expand a leading `~` or `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
