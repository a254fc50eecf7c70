// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive identity and vault lookup for kpxarc.
//!
//! [`classify`] maps a file path (including split volumes such as
//! `backup.7z.001` or `backup.part002.rar`) to the logical archive it belongs
//! to. [`resolve_secret`] turns that identity into an ordered list of vault
//! keys and returns the first secret found.

pub mod identity;
pub mod lookup;

pub use identity::{classify, ArchiveIdentity, SplitKind};
pub use lookup::{candidate_keys, join_entry, resolve_entry, resolve_secret, ResolvedEntry};
