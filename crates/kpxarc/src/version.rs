// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kpxarc version`. Commit and build date come from the build environment.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn commit() -> &'static str {
    option_env!("KPXARC_COMMIT").unwrap_or("none")
}

pub fn build_date() -> &'static str {
    option_env!("KPXARC_BUILD_DATE").unwrap_or("unknown")
}

pub fn render() -> String {
    format!(
        "kpxarc {VERSION}\n  commit: {}\n  built:  {}\n",
        commit(),
        build_date()
    )
}

pub fn print() {
    print!("{}", render());
}
