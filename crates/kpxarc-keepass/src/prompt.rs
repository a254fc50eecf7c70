// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password acquisition via TTY prompt.

use std::io::IsTerminal;
use std::path::Path;

use kpxarc_core::KpxarcError;
use secrecy::SecretString;

/// Ask for the master password of `database` on the controlling terminal.
///
/// The password is never taken from the environment. Fails when stdin is not
/// a terminal.
pub fn read_master_password(database: &Path) -> Result<SecretString, KpxarcError> {
    if !std::io::stdin().is_terminal() {
        return Err(KpxarcError::vault(format!(
            "cannot prompt for the master password of {}: stdin is not a terminal",
            database.display()
        )));
    }

    eprint!("Enter password for {}: ", database.display());
    let password = rpassword::read_password().map_err(|e| KpxarcError::Vault {
        message: format!("failed to read master password: {e}"),
        source: Some(Box::new(e)),
    })?;
    if password.is_empty() {
        return Err(KpxarcError::vault("empty master password not allowed"));
    }
    Ok(SecretString::from(password))
}
