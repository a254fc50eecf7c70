// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault capability traits.
//!
//! kpxarc never talks to a password manager directly; it consumes these two
//! capabilities. Both use `#[async_trait]` for dynamic dispatch compatibility.

pub mod generator;
pub mod store;

pub use generator::SecretGenerator;
pub use store::KeyedSecretStore;
