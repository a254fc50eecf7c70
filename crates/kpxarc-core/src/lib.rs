// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for kpxarc.
//!
//! This crate provides the pieces every other kpxarc crate agrees on: the
//! [`Secret`] buffer that owns a password until it is erased, the single
//! [`KpxarcError`] type, the child [`ExitStatus`], and the vault capability
//! traits implemented by the KeePassXC backend and by test doubles.

pub mod error;
pub mod secret;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::KpxarcError;
pub use secret::Secret;
pub use traits::{KeyedSecretStore, SecretGenerator};
pub use types::{EntryAttributes, ExitStatus};
