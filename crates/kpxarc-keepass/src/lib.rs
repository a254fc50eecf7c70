// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! KeePassXC integration for kpxarc.
//!
//! All access goes through the `keepassxc-cli` binary. The database master
//! password and any entry password are written to the tool's stdin; nothing
//! secret is ever placed on its command line.

pub mod cli;
pub mod prompt;

pub use cli::KeepassCli;
pub use prompt::read_master_password;
