// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for command tests: an in-memory vault and a shell script
//! that behaves like 7z's password prompts.

use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use kpxarc_config::KpxarcConfig;
use kpxarc_core::{EntryAttributes, KeyedSecretStore, KpxarcError, Secret, SecretGenerator};
use tempfile::TempDir;

/// In-memory vault that records attributes and hands out predictable
/// passwords.
#[derive(Default)]
pub struct MockVault {
    entries: Mutex<HashMap<String, (Vec<u8>, EntryAttributes)>>,
}

impl MockVault {
    pub fn seed(&self, key: &str, password: &str) {
        self.entries.lock().unwrap().insert(
            key.to_string(),
            (password.as_bytes().to_vec(), EntryAttributes::default()),
        );
    }

    pub fn entry(&self, key: &str) -> Option<(String, EntryAttributes)> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .map(|(pw, attrs)| (String::from_utf8_lossy(pw).into_owned(), attrs.clone()))
    }

    pub fn generated_password(length: usize) -> String {
        "Gx7".chars().cycle().take(length).collect()
    }
}

#[async_trait]
impl KeyedSecretStore for MockVault {
    async fn get(&self, key: &str) -> Result<Secret, KpxarcError> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .map(|(pw, _)| Secret::from_slice(pw))
            .ok_or_else(|| KpxarcError::EntryNotFound { key: key.into() })
    }

    async fn put(
        &self,
        key: &str,
        secret: &Secret,
        attributes: &EntryAttributes,
    ) -> Result<(), KpxarcError> {
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(key) {
            return Err(KpxarcError::AlreadyExists { key: key.into() });
        }
        entries.insert(key.to_string(), (secret.expose().to_vec(), attributes.clone()));
        Ok(())
    }
}

#[async_trait]
impl SecretGenerator for MockVault {
    async fn generate(&self, length: usize) -> Result<Secret, KpxarcError> {
        Ok(Secret::from_slice(Self::generated_password(length).as_bytes()))
    }
}

const FAKE_7Z: &str = r#"#!/bin/sh
dir='@DIR@'
printf '%s\n' "$@" > "$dir/args.log"
if [ "$1" = a ]; then
    printf 'Enter password (will not be echoed):'
    IFS= read -r first
    printf '%s\n' "$first" >> "$dir/passwords.log"
    printf 'Reenter password (will not be echoed):'
    IFS= read -r second
    printf '%s\n' "$second" >> "$dir/passwords.log"
else
    printf 'Enter password (will not be echoed):'
    IFS= read -r pw
    printf '%s\n' "$pw" >> "$dir/passwords.log"
fi
echo "Everything is Ok"
exit @EXIT@
"#;

/// A fake 7z in a temporary directory, plus a config pointing at it.
pub struct Fake7z {
    pub dir: TempDir,
    pub config: KpxarcConfig,
}

impl Fake7z {
    pub fn new() -> Self {
        Self::exiting_with(0)
    }

    pub fn exiting_with(code: i32) -> Self {
        let dir = TempDir::new().unwrap();
        let script = FAKE_7Z
            .replace("@DIR@", &dir.path().display().to_string())
            .replace("@EXIT@", &code.to_string());
        let binary = dir.path().join("7z");
        fs::write(&binary, script).unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();

        let mut config = KpxarcConfig::default();
        config.sevenzip.binary_path = binary.display().to_string();
        config.pty.injection_delay_ms = 0;
        Self { dir, config }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Arguments of the last run, one per line, without the program name.
    pub fn args(&self) -> Vec<String> {
        read_lines(&self.path("args.log"))
    }

    /// Every password the fake was given, in order.
    pub fn passwords(&self) -> Vec<String> {
        read_lines(&self.path("passwords.log"))
    }

    pub fn ran(&self) -> bool {
        self.path("args.log").exists()
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
