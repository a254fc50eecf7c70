// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drive an interactive program through a pseudo-terminal and answer its
//! password prompts.
//!
//! The child sees a real terminal, so tools that refuse to read passwords
//! from a pipe (7-Zip among them) behave as if a person were typing. The
//! password travels only through the terminal; it never appears in argv or
//! the environment, and its echo is suppressed from the forwarded output.

pub mod scanner;
pub mod session;

pub use scanner::{PromptScanner, Scan, ScanState};
pub use session::{run, InjectionOutcome, PtyConfig, PtyInjector};
