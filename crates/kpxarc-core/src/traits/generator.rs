// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password generator trait.

use async_trait::async_trait;

use crate::error::KpxarcError;
use crate::secret::Secret;

/// Produces fresh passwords. All entropy decisions belong to the implementor.
#[async_trait]
pub trait SecretGenerator: Send + Sync {
    /// Generate a password of `length` characters.
    async fn generate(&self, length: usize) -> Result<Secret, KpxarcError>;
}
