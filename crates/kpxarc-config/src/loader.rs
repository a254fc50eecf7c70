// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./kpxarc.toml` > `~/.config/kpxarc/kpxarc.toml` >
//! `/etc/kpxarc/kpxarc.toml` with environment variable overrides via `KPXARC_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::KpxarcConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG: &str = "/etc/kpxarc/kpxarc.toml";

/// Config file in the working directory.
pub const LOCAL_CONFIG: &str = "kpxarc.toml";

/// Prefix for environment overrides (`KPXARC_GENERAL_KDBX_PATH`, ...).
pub const ENV_PREFIX: &str = "KPXARC_";

/// `<config dir>/kpxarc/kpxarc.toml`, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("kpxarc").join("kpxarc.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/kpxarc/kpxarc.toml`
/// 3. `~/.config/kpxarc/kpxarc.toml`
/// 4. `./kpxarc.toml`
/// 5. `KPXARC_*` environment variables
pub fn load_config() -> Result<KpxarcConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<KpxarcConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KpxarcConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KpxarcConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KpxarcConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(KpxarcConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Config sections that `KPXARC_<SECTION>_<KEY>` variables may address.
const SECTIONS: [&str; 4] = ["general", "sevenzip", "keepass", "pty"];

/// Environment provider with explicit section mapping.
///
/// Only the first `_` after the prefix separates section from key, so
/// `KPXARC_GENERAL_KDBX_PATH` becomes `general.kdbx_path`. Figment hands over
/// the variable name in its original case.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| {
        let key = key.as_str().to_lowercase();
        match key.split_once('_') {
            Some((section, field)) if SECTIONS.contains(&section) => {
                format!("{section}.{field}").into()
            }
            _ => key.into(),
        }
    })
}
