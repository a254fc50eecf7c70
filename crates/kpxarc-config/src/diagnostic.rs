// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning figment errors into miette reports that point at the bad line of
//! `kpxarc.toml` and name the setting that was probably meant.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::{Error as FigmentError, Kind};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a "did you mean" hint.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A problem in the loaded configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {}", section_label(section))]
    #[diagnostic(code(kpxarc::config::unknown_key), help("{hint}"))]
    UnknownKey {
        /// Section the key was found in; empty for the top level.
        section: String,
        key: String,
        suggestion: Option<String>,
        hint: String,
        #[label("not a kpxarc setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(kpxarc::config::invalid_type))]
    InvalidType { key: String, detail: String },

    #[error("validation error: {message}")]
    #[diagnostic(code(kpxarc::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(kpxarc::config::other))]
    Other(String),
}

fn section_label(section: &str) -> String {
    if section.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{section}]")
    }
}

/// A named TOML document that may have produced an error.
pub type TomlSource = (String, String);

/// Convert a figment error (possibly several) into one diagnostic each.
pub fn figment_to_config_errors(err: FigmentError, sources: &[TomlSource]) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let section = error.path.join(".");
            match &error.kind {
                Kind::UnknownField(key, expected) => {
                    unknown_key(&error, section, key, expected, sources)
                }
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key: section,
                    detail: format!("found {actual}, expected {expected}"),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn unknown_key(
    error: &FigmentError,
    section: String,
    key: &str,
    expected: &[&str],
    sources: &[TomlSource],
) -> ConfigError {
    let suggestion = suggest_key(key, expected);
    let mut hint = match &suggestion {
        Some(s) => format!("did you mean `{s}`? "),
        None => String::new(),
    };
    hint.push_str(&format!("{} accepts: {}", section_label(&section), expected.join(", ")));
    if from_environment(error) {
        hint.push_str("; the value came from a KPXARC_* environment variable");
    }

    let located = source_for(error, sources).and_then(|(name, content)| {
        find_key_offset(content, &section, key)
            .map(|offset| (SourceSpan::new(offset.into(), key.len()), NamedSource::new(name, content.clone())))
    });
    let (span, src) = match located {
        Some((span, src)) => (Some(span), Some(src)),
        None => (None, None),
    };

    ConfigError::UnknownKey {
        section,
        key: key.to_string(),
        suggestion,
        hint,
        span,
        src,
    }
}

fn from_environment(error: &FigmentError) -> bool {
    error
        .metadata
        .as_ref()
        .is_some_and(|m| m.name.contains("environment"))
}

/// The TOML document an error came from. A single inline document is
/// assumed to be the source when figment recorded no file.
fn source_for<'a>(error: &FigmentError, sources: &'a [TomlSource]) -> Option<&'a TomlSource> {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| s.file_path())
        .map(|p| p.display().to_string());
    match file {
        Some(file) => sources.iter().find(|(name, _)| *name == file),
        None if sources.len() == 1 => sources.first(),
        None => None,
    }
}

/// Byte offset of `key = ...` inside `[section]` (or before the first header
/// when `section` is empty).
pub fn find_key_offset(content: &str, section: &str, key: &str) -> Option<usize> {
    let mut in_section = section.is_empty();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            if in_section && section.is_empty() {
                return None;
            }
            in_section = header.trim() == section;
            continue;
        }
        if !in_section {
            continue;
        }
        let indent = line.len() - line.trim_start().len();
        if let Some(rest) = line[indent..].strip_prefix(key)
            && rest.trim_start().starts_with('=')
        {
            return Some(start + indent);
        }
    }
    None
}

/// The closest accepted key, if it is close enough to be a typo.
pub fn suggest_key(unknown: &str, accepted: &[&str]) -> Option<String> {
    accepted
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print every error to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut report = String::new();
        match handler.render_report(&mut report, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{report}"),
            Err(_) => eprintln!("kpxarc: {error}"),
        }
    }
}
