// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External tool checks run before every action command.

use std::ffi::OsStr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use kpxarc_config::KpxarcConfig;
use kpxarc_core::KpxarcError;
use tracing::debug;

/// Fail with [`KpxarcError::MissingDependency`] unless both the 7z and the
/// keepassxc-cli binaries can be run.
pub fn check_dependencies(config: &KpxarcConfig) -> Result<(), KpxarcError> {
    let path_var = std::env::var_os("PATH");
    let missing: Vec<String> = [&config.sevenzip.binary_path, &config.keepass.binary_path]
        .into_iter()
        .filter(|binary| find_executable(binary, path_var.as_deref()).is_none())
        .cloned()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(KpxarcError::MissingDependency(missing))
    }
}

/// Resolve `binary` the way a shell would. Names containing a `/` are taken
/// as paths; bare names are searched in `path_var`.
pub fn find_executable(binary: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    if binary.is_empty() {
        return None;
    }
    if binary.contains('/') {
        let path = PathBuf::from(binary);
        return is_executable(&path).then_some(path);
    }

    let found = std::env::split_paths(path_var?)
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate));
    debug!(binary, found = ?found, "looked up executable");
    found
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// "a", "a and b", "a, b and c".
pub fn join_words(words: &[String]) -> String {
    match words {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

/// Install instructions for each missing tool, one block per tool.
pub fn install_hints(missing: &[String]) -> String {
    let mut out = format!("\nInstall {} first:\n", join_words(missing));
    for binary in missing {
        let name = Path::new(binary)
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or(binary);
        let hint = match name {
            "7z" | "7zz" | "7za" => {
                "https://7-zip.org\n    Arch: pacman -S 7zip\n    Debian/Ubuntu: apt install p7zip-full"
            }
            "keepassxc-cli" => {
                "https://keepassxc.org\n    Arch: pacman -S keepassxc\n    Debian/Ubuntu: apt install keepassxc"
            }
            _ => "check the binary_path setting in kpxarc.toml",
        };
        out.push_str(&format!("  {binary}: {hint}\n"));
    }
    out
}
