// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kpxarc d`: remove the vault entry of an archive. The archive file stays.

use std::io::{BufRead, Write};

use async_trait::async_trait;
use clap::Args;
use kpxarc_archive::resolve_entry;
use kpxarc_config::KpxarcConfig;
use kpxarc_core::{KeyedSecretStore, KpxarcError};
use kpxarc_keepass::KeepassCli;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Archive whose entry should be removed.
    pub archive: String,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub force: bool,
}

/// A store whose entries can be removed.
#[async_trait]
pub trait EntryRemover: KeyedSecretStore {
    async fn remove(&self, key: &str) -> Result<(), KpxarcError>;
}

#[async_trait]
impl EntryRemover for KeepassCli {
    async fn remove(&self, key: &str) -> Result<(), KpxarcError> {
        self.delete(key).await
    }
}

/// Ask on `output` and read one answer from `input`. Only `y` or `Y` agree.
pub fn confirm<R: BufRead, W: Write>(
    key: &str,
    mut input: R,
    mut output: W,
) -> Result<bool, KpxarcError> {
    let io_err = |e: std::io::Error| KpxarcError::Internal(format!("confirmation failed: {e}"));

    writeln!(output, "This will delete the KeePassXC entry: {key}").map_err(io_err)?;
    write!(output, "Are you sure? [y/N]: ").map_err(io_err)?;
    output.flush().map_err(io_err)?;

    let mut answer = String::new();
    input.read_line(&mut answer).map_err(io_err)?;
    Ok(matches!(answer.trim(), "y" | "Y"))
}

pub async fn run<V, R, W>(
    config: &KpxarcConfig,
    vault: &V,
    args: &DeleteArgs,
    input: R,
    mut output: W,
) -> Result<(), KpxarcError>
where
    V: EntryRemover,
    R: BufRead,
    W: Write,
{
    let vault_ref: &dyn KeyedSecretStore = vault;
    let entry = resolve_entry(Some(vault_ref), &config.general.default_group, &args.archive).await?;
    let key = entry.key;
    drop(entry.secret);

    if !args.force && !confirm(&key, input, &mut output)? {
        writeln!(output, "Aborted.")
            .map_err(|e| KpxarcError::Internal(format!("cannot write to stdout: {e}")))?;
        return Ok(());
    }

    vault.remove(&key).await?;
    crate::print_success(&format!("Entry '{key}' deleted from KeePassXC."));
    Ok(())
}
