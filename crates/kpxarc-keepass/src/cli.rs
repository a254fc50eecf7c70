// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `keepassxc-cli` driver.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use kpxarc_core::{EntryAttributes, KeyedSecretStore, KpxarcError, Secret, SecretGenerator};
use secrecy::{ExposeSecret, SecretString};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::prompt::read_master_password;

/// Default name of the KeePassXC command-line tool.
pub const DEFAULT_BINARY: &str = "keepassxc-cli";

/// Default username recorded on entries created by kpxarc.
pub const DEFAULT_ENTRY_USERNAME: &str = "kpxarc";

/// A KeePassXC database accessed through `keepassxc-cli`.
///
/// The store starts locked. Call [`KeepassCli::ensure_unlocked`] (interactive)
/// or [`KeepassCli::with_master_password`] before using any operation that
/// opens the database; [`SecretGenerator::generate`] does not need it.
#[derive(Debug)]
pub struct KeepassCli {
    database: PathBuf,
    key_file: Option<PathBuf>,
    binary: PathBuf,
    entry_username: String,
    master_password: Option<SecretString>,
}

/// Captured result of one `keepassxc-cli` run.
struct CliOutput {
    success: bool,
    stdout: Zeroizing<Vec<u8>>,
    stderr: String,
}

impl KeepassCli {
    pub fn new(database: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            key_file: None,
            binary: PathBuf::from(DEFAULT_BINARY),
            entry_username: DEFAULT_ENTRY_USERNAME.to_string(),
            master_password: None,
        }
    }

    /// Use a key file in addition to the master password (`-k`).
    pub fn with_key_file(mut self, key_file: Option<PathBuf>) -> Self {
        self.key_file = key_file;
        self
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_entry_username(mut self, username: impl Into<String>) -> Self {
        self.entry_username = username.into();
        self
    }

    /// Unlock with a known master password instead of prompting.
    pub fn with_master_password(mut self, password: SecretString) -> Self {
        self.master_password = Some(password);
        self
    }

    pub fn database(&self) -> &Path {
        &self.database
    }

    pub fn is_unlocked(&self) -> bool {
        self.master_password.is_some()
    }

    /// Prompt for the master password on the terminal unless already known.
    pub fn ensure_unlocked(&mut self) -> Result<(), KpxarcError> {
        if self.master_password.is_none() {
            self.master_password = Some(read_master_password(&self.database)?);
        }
        Ok(())
    }

    /// Drop the cached master password.
    pub fn lock(&mut self) {
        self.master_password = None;
    }

    /// Whether an entry exists at `key`.
    pub async fn exists(&self, key: &str) -> Result<bool, KpxarcError> {
        let key = clean_path(key);
        let output = self.run_on_database("show", &["-q"], &[key.as_str()], &[]).await?;
        if output.success {
            Ok(true)
        } else if reports_missing_entry(&output.stderr) {
            Ok(false)
        } else {
            Err(cli_failure("show", &output))
        }
    }

    /// Create `group` and every parent group. Existing groups are fine.
    pub async fn mkdir(&self, group: &str) -> Result<(), KpxarcError> {
        let mut current = String::new();
        for part in group.split('/').filter(|p| !p.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(part);

            let output = self
                .run_on_database("mkdir", &[], &[current.as_str()], &[])
                .await?;
            if output.success {
                debug!(group = %current, "created vault group");
            } else if !output.stderr.to_lowercase().contains("already exists") {
                return Err(cli_failure("mkdir", &output));
            }
        }
        Ok(())
    }

    /// Remove the entry at `key`. KeePassXC moves it to its recycle bin.
    pub async fn delete(&self, key: &str) -> Result<(), KpxarcError> {
        let key = clean_path(key);
        let output = self.run_on_database("rm", &[], &[key.as_str()], &[]).await?;
        if output.success {
            info!(key = %key, "deleted vault entry");
            Ok(())
        } else if reports_missing_entry(&output.stderr) {
            Err(KpxarcError::EntryNotFound { key })
        } else {
            Err(cli_failure("rm", &output))
        }
    }

    /// Run `<binary> <subcommand> [flags] [-k keyfile] <db> [positional]` with
    /// the master password and then each of `stdin_lines` fed on stdin.
    async fn run_on_database(
        &self,
        subcommand: &str,
        flags: &[&str],
        positional: &[&str],
        stdin_lines: &[&[u8]],
    ) -> Result<CliOutput, KpxarcError> {
        let master = self.master_password.as_ref().ok_or_else(|| {
            KpxarcError::vault(format!(
                "database {} is locked; master password not provided",
                self.database.display()
            ))
        })?;

        let mut input = Zeroizing::new(Vec::new());
        input.extend_from_slice(master.expose_secret().as_bytes());
        input.push(b'\n');
        for line in stdin_lines {
            input.extend_from_slice(line);
            input.push(b'\n');
        }

        let mut command = Command::new(&self.binary);
        command.arg(subcommand).args(flags);
        if let Some(key_file) = &self.key_file {
            command.arg("-k").arg(key_file);
        }
        command.arg(&self.database).args(positional);

        self.execute(subcommand, command, Some(input.as_slice())).await
    }

    async fn execute(
        &self,
        subcommand: &str,
        mut command: Command,
        input: Option<&[u8]>,
    ) -> Result<CliOutput, KpxarcError> {
        command
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(binary = %self.binary.display(), subcommand, "running keepassxc-cli");
        let mut child = command.spawn().map_err(|e| KpxarcError::Vault {
            message: format!("failed to run {}: {e}", self.binary.display()),
            source: Some(Box::new(e)),
        })?;

        if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
            // A tool that exits early closes the pipe; its exit status says why.
            if let Err(e) = stdin.write_all(input).await {
                debug!(error = %e, "keepassxc-cli closed stdin early");
            }
        }

        let output = child.wait_with_output().await.map_err(|e| KpxarcError::Vault {
            message: format!("failed to wait for {}: {e}", self.binary.display()),
            source: Some(Box::new(e)),
        })?;

        Ok(CliOutput {
            success: output.status.success(),
            stdout: Zeroizing::new(output.stdout),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[async_trait]
impl KeyedSecretStore for KeepassCli {
    async fn get(&self, key: &str) -> Result<Secret, KpxarcError> {
        let key = clean_path(key);
        let mut output = self
            .run_on_database("show", &["-s", "-a", "password", "-q"], &[key.as_str()], &[])
            .await?;
        if output.success {
            return Ok(Secret::from_output(std::mem::take(&mut *output.stdout)));
        }
        if reports_missing_entry(&output.stderr) {
            return Err(KpxarcError::EntryNotFound { key });
        }
        Err(cli_failure("show", &output))
    }

    async fn put(
        &self,
        key: &str,
        secret: &Secret,
        attributes: &EntryAttributes,
    ) -> Result<(), KpxarcError> {
        let key = clean_path(key);
        if let Some((group, _)) = key.rsplit_once('/') {
            self.mkdir(group).await?;
        }
        if self.exists(&key).await? {
            return Err(KpxarcError::AlreadyExists { key });
        }

        let username = attributes
            .username
            .as_deref()
            .unwrap_or(&self.entry_username);
        let mut flags = vec!["--username", username];
        if let Some(url) = attributes.url.as_deref() {
            flags.extend(["--url", url]);
        }
        flags.push("-p");

        // Password and its confirmation follow the master password on stdin.
        let output = self
            .run_on_database(
                "add",
                &flags,
                &[key.as_str()],
                &[secret.expose(), secret.expose()],
            )
            .await?;
        if !output.success {
            return Err(cli_failure("add", &output));
        }
        info!(key = %key, "stored vault entry");
        Ok(())
    }
}

#[async_trait]
impl SecretGenerator for KeepassCli {
    async fn generate(&self, length: usize) -> Result<Secret, KpxarcError> {
        if length == 0 {
            return Err(KpxarcError::InvalidInput(
                "password length must be positive".into(),
            ));
        }

        let length = length.to_string();
        let mut command = Command::new(&self.binary);
        command.args(["generate", "-L", &length, "-l", "-U", "-n", "-s"]);

        let mut output = self.execute("generate", command, None).await?;
        if !output.success {
            return Err(cli_failure("generate", &output));
        }
        let secret = Secret::from_output(std::mem::take(&mut *output.stdout));
        if secret.is_empty() {
            return Err(KpxarcError::vault("keepassxc-cli generate returned an empty password"));
        }
        debug!(length = secret.len(), "generated password");
        Ok(secret)
    }
}

/// Forward-slash vault path with empty and `.` segments removed.
fn clean_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// `show` prints "Could not find entry with path X.", `rm` prints
/// "Entry X not found.".
fn reports_missing_entry(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("could not find entry")
        || (lower.starts_with("entry ") && lower.contains(" not found"))
}

fn cli_failure(subcommand: &str, output: &CliOutput) -> KpxarcError {
    let detail = if output.stderr.is_empty() {
        "no error output"
    } else {
        output.stderr.as_str()
    };
    KpxarcError::vault(format!("keepassxc-cli {subcommand} failed: {detail}"))
}
