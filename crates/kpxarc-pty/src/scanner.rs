// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt detection over raw terminal output.
//!
//! The scanner is a two-state machine fed one read chunk at a time:
//!
//! - `Normal`: a chunk containing a prompt marker (case-insensitive) is
//!   forwarded whole and reported as a prompt. The caller then answers it and
//!   the scanner moves to `Suppressing`.
//! - `Suppressing`: bytes up to and including the first `\n` are dropped,
//!   since the terminal echoes whatever was typed at the prompt. The rest of
//!   the chunk is handled as `Normal` input. A chunk without `\n` is dropped
//!   entirely.
//!
//! Matching is per chunk. A marker split across two reads is not detected.

use kpxarc_core::KpxarcError;
use regex::bytes::{Regex, RegexBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Normal,
    Suppressing,
}

/// What to do with one chunk of output.
#[derive(Debug, PartialEq, Eq)]
pub struct Scan<'a> {
    /// Bytes to pass through to the user's terminal.
    pub forward: &'a [u8],
    /// A prompt was seen; the password must be written before the next read.
    pub prompt: bool,
}

#[derive(Debug, Clone)]
pub struct PromptScanner {
    pattern: Regex,
    state: ScanState,
}

impl PromptScanner {
    /// Build a scanner for the given markers. Markers are literal text.
    pub fn new<S: AsRef<str>>(markers: &[S]) -> Result<Self, KpxarcError> {
        let alternatives: Vec<String> = markers
            .iter()
            .map(AsRef::as_ref)
            .filter(|m| !m.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Err(KpxarcError::InvalidInput(
                "at least one prompt marker is required".into(),
            ));
        }

        let pattern = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()
            .map_err(|e| KpxarcError::InvalidInput(format!("bad prompt marker: {e}")))?;

        Ok(Self {
            pattern,
            state: ScanState::Normal,
        })
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Advance the state machine over `chunk`.
    pub fn feed<'a>(&mut self, chunk: &'a [u8]) -> Scan<'a> {
        let rest = match self.state {
            ScanState::Normal => chunk,
            ScanState::Suppressing => match chunk.iter().position(|b| *b == b'\n') {
                Some(nl) => {
                    self.state = ScanState::Normal;
                    &chunk[nl + 1..]
                }
                None => {
                    return Scan {
                        forward: &[],
                        prompt: false,
                    };
                }
            },
        };

        let prompt = self.pattern.is_match(rest);
        if prompt {
            self.state = ScanState::Suppressing;
        }
        Scan {
            forward: rest,
            prompt,
        }
    }
}
