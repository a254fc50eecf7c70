// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyed secret store trait (fetch and store a password by entry path).

use async_trait::async_trait;

use crate::error::KpxarcError;
use crate::secret::Secret;
use crate::types::EntryAttributes;

/// A vault addressed by forward-slash entry paths such as `Archives/backup.7z`.
///
/// Implementations must move secrets through a controlled input channel
/// (a child's stdin, an in-memory map), never through command arguments.
#[async_trait]
pub trait KeyedSecretStore: Send + Sync {
    /// Fetch the secret stored under `key`.
    ///
    /// A missing entry is reported as [`KpxarcError::EntryNotFound`]; every
    /// other error means the vault itself failed.
    async fn get(&self, key: &str) -> Result<Secret, KpxarcError>;

    /// Store `secret` under `key`.
    ///
    /// Fails with [`KpxarcError::AlreadyExists`] instead of overwriting.
    async fn put(
        &self,
        key: &str,
        secret: &Secret,
        attributes: &EntryAttributes,
    ) -> Result<(), KpxarcError>;
}
