// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered vault lookup for an archive's password.
//!
//! Candidates are queried in this order, skipping duplicates:
//!
//! 1. `<group>/<normalized name>` (`backup.7z.001` -> `backup.7z`)
//! 2. `<group>/<original name>` when normalization changed it
//! 3. `<group>/<normalized stem>` for split volumes (`backup`)
//!
//! The first hit wins. A total miss reports every key that was tried so the
//! operator can see which vault path to create.

use kpxarc_core::{KeyedSecretStore, KpxarcError, Secret};
use tracing::debug;

use crate::identity::{classify, ArchiveIdentity};

/// A vault hit: the key that matched and the secret stored there.
#[derive(Debug)]
pub struct ResolvedEntry {
    pub key: String,
    pub secret: Secret,
}

/// Join a group prefix and an entry name into a vault path.
///
/// Always uses `/`, converts `\` to `/`, and drops empty and `.` segments.
/// A leading `/` on the prefix is kept. An empty prefix returns `name` as is.
pub fn join_entry(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        return name.to_string();
    }

    let joined = format!("{prefix}/{name}").replace('\\', "/");
    let cleaned = joined
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");

    if joined.starts_with('/') {
        format!("/{cleaned}")
    } else {
        cleaned
    }
}

/// Every vault key worth trying for `identity`, in query order.
pub fn candidate_keys(prefix: &str, identity: &ArchiveIdentity) -> Vec<String> {
    let normalized = identity.normalized_name();
    let original = identity.original_name();

    let mut keys = Vec::with_capacity(3);
    keys.push(join_entry(prefix, normalized));

    if normalized != original {
        keys.push(join_entry(prefix, original));
    }

    if identity.is_split() {
        if let Some(stem) = identity.normalized_stem() {
            if stem != normalized && stem != original {
                keys.push(join_entry(prefix, stem));
            }
        }
    }

    keys
}

/// Find the vault entry holding the password for `archive_path`.
///
/// `vault` is optional so that a caller which failed to open its vault gets
/// [`KpxarcError::InvalidInput`] rather than a panic. Only
/// [`KpxarcError::EntryNotFound`] counts as a miss; any other vault error is
/// returned immediately.
pub async fn resolve_entry(
    vault: Option<&dyn KeyedSecretStore>,
    group_prefix: &str,
    archive_path: &str,
) -> Result<ResolvedEntry, KpxarcError> {
    let vault =
        vault.ok_or_else(|| KpxarcError::InvalidInput("password provider is missing".into()))?;
    if archive_path.is_empty() {
        return Err(KpxarcError::InvalidInput("archive path is empty".into()));
    }

    let identity = classify(archive_path);
    debug!(
        archive = %identity.original_name(),
        normalized = %identity.normalized_name(),
        split = %identity.split_kind(),
        "resolving vault entry"
    );

    let mut tried = Vec::with_capacity(3);
    for key in candidate_keys(group_prefix, &identity) {
        tried.push(key.clone());
        match vault.get(&key).await {
            Ok(secret) => {
                debug!(key = %key, "vault entry found");
                return Ok(ResolvedEntry { key, secret });
            }
            Err(KpxarcError::EntryNotFound { .. }) => {
                debug!(key = %key, "vault entry missing");
            }
            Err(e) => return Err(e),
        }
    }

    Err(KpxarcError::SecretNotFound {
        archive: identity.original_name().to_string(),
        tried,
    })
}

/// Fetch the password for `archive_path`; see [`resolve_entry`].
pub async fn resolve_secret(
    vault: Option<&dyn KeyedSecretStore>,
    group_prefix: &str,
    archive_path: &str,
) -> Result<Secret, KpxarcError> {
    resolve_entry(vault, group_prefix, archive_path)
        .await
        .map(|entry| entry.secret)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use kpxarc_core::EntryAttributes;

    use super::*;

    /// In-memory store that records every `get` in call order.
    #[derive(Default)]
    struct RecordingStore {
        secrets: Mutex<HashMap<String, Vec<u8>>>,
        broken: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingStore {
        fn with(entries: &[(&str, &str)]) -> Self {
            let store = Self::default();
            for (key, value) in entries {
                store
                    .secrets
                    .lock()
                    .unwrap()
                    .insert((*key).to_string(), value.as_bytes().to_vec());
            }
            store
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl KeyedSecretStore for RecordingStore {
        async fn get(&self, key: &str) -> Result<Secret, KpxarcError> {
            self.calls.lock().unwrap().push(key.to_string());
            if self.broken.as_deref() == Some(key) {
                return Err(KpxarcError::vault("database is locked"));
            }
            self.secrets
                .lock()
                .unwrap()
                .get(key)
                .map(|v| Secret::from_slice(v))
                .ok_or_else(|| KpxarcError::EntryNotFound {
                    key: key.to_string(),
                })
        }

        async fn put(
            &self,
            key: &str,
            secret: &Secret,
            _attributes: &EntryAttributes,
        ) -> Result<(), KpxarcError> {
            let mut secrets = self.secrets.lock().unwrap();
            if secrets.contains_key(key) {
                return Err(KpxarcError::AlreadyExists {
                    key: key.to_string(),
                });
            }
            secrets.insert(key.to_string(), secret.expose().to_vec());
            Ok(())
        }
    }

    async fn lookup(
        store: &RecordingStore,
        prefix: &str,
        path: &str,
    ) -> Result<Secret, KpxarcError> {
        resolve_secret(Some(store as &dyn KeyedSecretStore), prefix, path).await
    }

    #[test]
    fn join_entry_cases() {
        assert_eq!(join_entry("", "file.7z"), "file.7z");
        assert_eq!(join_entry("archives", "file.7z"), "archives/file.7z");
        assert_eq!(join_entry("backup/2024", "file.zip"), "backup/2024/file.zip");
        assert_eq!(join_entry("backup\\2024", "file.zip"), "backup/2024/file.zip");
        assert_eq!(join_entry("Group//", "/archive.7z"), "Group/archive.7z");
        assert_eq!(join_entry("/Root/./Sub", "a.7z"), "/Root/Sub/a.7z");
    }

    #[test]
    fn candidate_keys_for_split_volume() {
        let keys = candidate_keys("backups", &classify("archive.7z.001"));
        assert_eq!(
            keys,
            vec!["backups/archive.7z", "backups/archive.7z.001", "backups/archive"]
        );
    }

    #[test]
    fn candidate_keys_for_plain_archive() {
        let keys = candidate_keys("backups", &classify("/tmp/archive.7z"));
        assert_eq!(keys, vec!["backups/archive.7z"]);
    }

    #[tokio::test]
    async fn plain_archive_found() {
        let store = RecordingStore::with(&[("backups/archive.7z", "secret123")]);
        let secret = lookup(&store, "backups", "archive.7z").await.unwrap();
        assert_eq!(secret.expose(), b"secret123");
        assert_eq!(store.calls(), vec!["backups/archive.7z"]);
    }

    #[tokio::test]
    async fn split_volume_found_under_normalized_name() {
        let store = RecordingStore::with(&[("backups/archive.7z", "split_pass")]);
        let secret = lookup(&store, "backups", "archive.7z.001").await.unwrap();
        assert_eq!(secret.expose(), b"split_pass");
        assert_eq!(store.calls(), vec!["backups/archive.7z"]);
    }

    #[tokio::test]
    async fn split_volume_falls_back_to_original_name() {
        let store = RecordingStore::with(&[("backups/archive.7z.001", "original_pass")]);
        let secret = lookup(&store, "backups", "archive.7z.001").await.unwrap();
        assert_eq!(secret.expose(), b"original_pass");
        assert_eq!(
            store.calls(),
            vec!["backups/archive.7z", "backups/archive.7z.001"]
        );
    }

    #[tokio::test]
    async fn split_volume_falls_back_to_stem() {
        let store = RecordingStore::with(&[("backups/archive", "base_pass")]);
        let secret = lookup(&store, "backups", "archive.7z.001").await.unwrap();
        assert_eq!(secret.expose(), b"base_pass");
        assert_eq!(
            store.calls(),
            vec!["backups/archive.7z", "backups/archive.7z.001", "backups/archive"]
        );
    }

    #[tokio::test]
    async fn rar_volumes_resolve_to_rar_entry() {
        let store = RecordingStore::with(&[
            ("archives/backup.rar", "rar_pass"),
            ("archives/data.rar", "old_rar_pass"),
        ]);
        let part = lookup(&store, "archives", "backup.part001.rar").await.unwrap();
        assert_eq!(part.expose(), b"rar_pass");
        let legacy = lookup(&store, "archives", "data.r00").await.unwrap();
        assert_eq!(legacy.expose(), b"old_rar_pass");
        assert_eq!(store.calls(), vec!["archives/backup.rar", "archives/data.rar"]);
    }

    #[tokio::test]
    async fn year_suffix_is_looked_up_verbatim() {
        let store = RecordingStore::with(&[("yearly/backup.2024", "year_pass")]);
        let secret = lookup(&store, "yearly", "backup.2024").await.unwrap();
        assert_eq!(secret.expose(), b"year_pass");
        assert_eq!(store.calls(), vec!["yearly/backup.2024"]);
    }

    #[tokio::test]
    async fn empty_prefix_uses_bare_name() {
        let store = RecordingStore::with(&[("file.zip", "no_prefix")]);
        let secret = lookup(&store, "", "file.zip").await.unwrap();
        assert_eq!(secret.expose(), b"no_prefix");
        assert_eq!(store.calls(), vec!["file.zip"]);
    }

    #[tokio::test]
    async fn uppercase_split_volume() {
        let store = RecordingStore::with(&[("backups/ARCHIVE.7Z", "upper_pass")]);
        let secret = lookup(&store, "backups", "ARCHIVE.7Z.001").await.unwrap();
        assert_eq!(secret.expose(), b"upper_pass");
        assert_eq!(store.calls(), vec!["backups/ARCHIVE.7Z"]);
    }

    #[tokio::test]
    async fn total_miss_reports_every_key_tried() {
        let store = RecordingStore::default();
        let err = lookup(&store, "backups", "archive.7z.001").await.unwrap_err();
        match err {
            KpxarcError::SecretNotFound { archive, tried } => {
                assert_eq!(archive, "archive.7z.001");
                assert_eq!(tried, store.calls());
                assert_eq!(
                    tried,
                    candidate_keys("backups", &classify("archive.7z.001"))
                );
            }
            other => panic!("expected SecretNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn plain_miss_tries_one_key() {
        let store = RecordingStore::default();
        let err = lookup(&store, "backups", "missing.7z").await.unwrap_err();
        assert!(err.is_secret_not_found());
        assert_eq!(store.calls(), vec!["backups/missing.7z"]);
    }

    #[tokio::test]
    async fn vault_failure_is_not_treated_as_miss() {
        let store = RecordingStore {
            broken: Some("backups/archive.7z".into()),
            ..RecordingStore::with(&[("backups/archive", "base_pass")])
        };
        let err = lookup(&store, "backups", "archive.7z.001").await.unwrap_err();
        assert!(matches!(err, KpxarcError::Vault { .. }));
        assert_eq!(store.calls(), vec!["backups/archive.7z"]);
    }

    #[tokio::test]
    async fn resolve_entry_reports_matching_key() {
        let store = RecordingStore::with(&[("g/archive.7z.001", "pw")]);
        let vault: &dyn KeyedSecretStore = &store;
        let entry = resolve_entry(Some(vault), "g", "archive.7z.001")
            .await
            .unwrap();
        assert_eq!(entry.key, "g/archive.7z.001");
        assert_eq!(entry.secret.expose(), b"pw");
    }

    #[tokio::test]
    async fn missing_vault_is_invalid_input() {
        let err = resolve_secret(None, "prefix", "file.7z").await.unwrap_err();
        assert!(matches!(err, KpxarcError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn empty_path_is_invalid_input() {
        let store = RecordingStore::default();
        let err = lookup(&store, "prefix", "").await.unwrap_err();
        assert!(matches!(err, KpxarcError::InvalidInput(_)));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn stored_secret_round_trips_through_put() {
        let store = RecordingStore::default();
        let secret = Secret::from_slice(b"generated");
        store
            .put("g/new.7z", &secret, &EntryAttributes::default())
            .await
            .unwrap();
        let again = store
            .put("g/new.7z", &secret, &EntryAttributes::default())
            .await;
        assert!(matches!(again, Err(KpxarcError::AlreadyExists { .. })));

        let found = lookup(&store, "g", "new.7z.001").await.unwrap();
        assert_eq!(found.expose(), b"generated");
    }
}
