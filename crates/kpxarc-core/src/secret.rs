// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Zeroizing byte buffer for archive passwords.
//!
//! A [`Secret`] is the only place a password lives in kpxarc. It is never
//! converted into a `String`, never cloned, and its allocation is zeroed when
//! it is dropped. [`Secret::erase`] zeroes the bytes early while keeping the
//! length, so callers (and tests) can observe that erasure happened.

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// An owned, erasable password.
///
/// Debug output intentionally omits the bytes.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Secret {
    bytes: Vec<u8>,
}

impl Secret {
    /// Take ownership of `bytes` as a secret.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Copy a slice into a new secret.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Build a secret from a tool's captured stdout.
    ///
    /// Surrounding ASCII whitespace (the trailing newline in practice) is
    /// trimmed and the raw capture buffer is zeroed before it is released.
    pub fn from_output(raw: Vec<u8>) -> Self {
        let raw = Zeroizing::new(raw);
        Self::from_slice(raw.trim_ascii())
    }

    /// Borrow the secret bytes.
    pub fn expose(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Overwrite every byte with zero in place. The length is preserved.
    pub fn erase(&mut self) {
        self.bytes.as_mut_slice().zeroize();
    }

    /// Returns `true` when every byte is zero.
    pub fn is_erased(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }

    /// The secret followed by a newline, as typed at a prompt.
    pub fn to_line(&self) -> Zeroizing<Vec<u8>> {
        let mut line = Zeroizing::new(Vec::with_capacity(self.bytes.len() + 1));
        line.extend_from_slice(&self.bytes);
        line.push(b'\n');
        line
    }
}

impl From<Vec<u8>> for Secret {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("bytes", &"[REDACTED]")
            .field("len", &self.bytes.len())
            .finish()
    }
}
