// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Building the vault and injector from configuration.

use kpxarc_config::KpxarcConfig;
use kpxarc_core::KpxarcError;
use kpxarc_keepass::KeepassCli;
use kpxarc_pty::{PtyConfig, PtyInjector};

/// A locked [`KeepassCli`] for the configured database.
pub fn open_keepass(config: &KpxarcConfig) -> Result<KeepassCli, KpxarcError> {
    let database = config.general.database_path().ok_or_else(|| {
        KpxarcError::Config(
            "general.kdbx_path is not set; point it at your KeePassXC database".into(),
        )
    })?;

    Ok(KeepassCli::new(database)
        .with_key_file(config.keepass.key_file_path())
        .with_binary(&config.keepass.binary_path)
        .with_entry_username(&config.keepass.entry_username))
}

pub fn pty_injector(config: &KpxarcConfig) -> PtyInjector {
    PtyInjector::new(PtyConfig {
        prompt_markers: config.pty.prompt_markers.clone(),
        injection_delay: config.pty.injection_delay(),
        read_buffer_size: config.pty.read_buffer_size,
        locale: config.pty.locale.clone(),
    })
}
