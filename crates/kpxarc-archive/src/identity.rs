// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Split-volume detection and archive name normalization.
//!
//! Three naming schemes are recognized, checked in this order:
//!
//! | Scheme           | Volume name             | Logical name   |
//! |------------------|-------------------------|----------------|
//! | standard split   | `archive.7z.001`        | `archive.7z`   |
//! | RAR multi-part   | `archive.part001.rar`   | `archive.rar`  |
//! | RAR legacy       | `archive.r00`           | `archive.rar`  |
//!
//! Anything else is returned unchanged. Numeric suffixes that are not preceded
//! by a known archive extension (`backup.2024`, `video.1080`) and two-digit
//! volume numbers (`file.7z.01`) deliberately do not match.

use std::sync::LazyLock;

use regex::Regex;
use strum::Display;

/// `<name>.<ext>.<NNN>` with at least three digits.
static SPLIT_STANDARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:7z|zip|tar|gz|xz|bz2|rar)\.[0-9]{3,}$").unwrap()
});

/// `<name>.part<NNN>.rar`; group 1 keeps the `.rar` token in its original case.
static SPLIT_RAR_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.part[0-9]{3,}(\.rar)$").unwrap());

/// `<name>.r<NN>`; group 1 is the `r`/`R` that decides the rewritten case.
static SPLIT_RAR_LEGACY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(r)[0-9]{2,}$").unwrap());

/// Which split-volume naming scheme a file name follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SplitKind {
    /// Not a split volume.
    None,
    /// `archive.7z.001`
    StandardNumbered,
    /// `archive.part001.rar`
    RarPart,
    /// `archive.r00`
    RarLegacy,
}

/// The logical archive a file name belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveIdentity {
    original_name: String,
    normalized_name: String,
    split_kind: SplitKind,
}

impl ArchiveIdentity {
    /// Base name exactly as given.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Logical archive name with any volume suffix removed.
    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    pub fn split_kind(&self) -> SplitKind {
        self.split_kind
    }

    /// `true` iff normalization changed the name.
    pub fn is_split(&self) -> bool {
        self.normalized_name != self.original_name
    }

    /// The normalized name with its last extension removed
    /// (`archive.7z` -> `archive`). `None` when there is no extension or
    /// nothing would remain.
    pub fn normalized_stem(&self) -> Option<&str> {
        let dot = self.normalized_name.rfind('.')?;
        let stem = &self.normalized_name[..dot];
        (!stem.is_empty()).then_some(stem)
    }
}

/// Classify `path` by its base name. Pure: the filesystem is never touched.
///
/// Both `/` and `\` are treated as directory separators so that paths copied
/// from another platform resolve to the same archive.
pub fn classify(path: &str) -> ArchiveIdentity {
    let base = base_name(path);
    let (normalized_name, split_kind) = normalize(base);
    ArchiveIdentity {
        original_name: base.to_string(),
        normalized_name,
        split_kind,
    }
}

fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed)
}

fn normalize(base: &str) -> (String, SplitKind) {
    if SPLIT_STANDARD.is_match(base) {
        // The match ends in `.<digits>`, so the last dot starts the volume number.
        let cut = base.rfind('.').unwrap_or(base.len());
        return (base[..cut].to_string(), SplitKind::StandardNumbered);
    }

    if let Some(caps) = SPLIT_RAR_PART.captures(base) {
        let start = caps.get(0).map_or(base.len(), |m| m.start());
        let rar = caps.get(1).map_or(".rar", |m| m.as_str());
        return (format!("{}{rar}", &base[..start]), SplitKind::RarPart);
    }

    if let Some(caps) = SPLIT_RAR_LEGACY.captures(base) {
        let start = caps.get(0).map_or(base.len(), |m| m.start());
        let upper = caps.get(1).is_some_and(|m| m.as_str() == "R");
        let ext = if upper { ".RAR" } else { ".rar" };
        return (format!("{}{ext}", &base[..start]), SplitKind::RarLegacy);
    }

    (base.to_string(), SplitKind::None)
}
