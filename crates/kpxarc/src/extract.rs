// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kpxarc x` and `kpxarc l`: run 7z on an existing archive with its stored
//! password.

use std::path::{Path, PathBuf};

use clap::Args;
use kpxarc_archive::resolve_secret;
use kpxarc_config::KpxarcConfig;
use kpxarc_core::{KeyedSecretStore, KpxarcError};
use kpxarc_pty::PtyInjector;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Archive to extract. For split archives any volume works.
    pub archive: String,

    /// Output directory for extracted files.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Archive to list.
    pub archive: String,
}

pub fn build_extract_argv(config: &KpxarcConfig, archive: &str, output: Option<&Path>) -> Vec<String> {
    let mut argv = vec![
        config.sevenzip.binary_path.clone(),
        "x".to_string(),
        archive.to_string(),
    ];
    if let Some(dir) = output {
        argv.push(format!("-o{}", dir.display()));
    }
    argv
}

pub fn build_list_argv(config: &KpxarcConfig, archive: &str) -> Vec<String> {
    vec![
        config.sevenzip.binary_path.clone(),
        "l".to_string(),
        archive.to_string(),
    ]
}

pub async fn run_extract(
    config: &KpxarcConfig,
    vault: &dyn KeyedSecretStore,
    injector: &PtyInjector,
    args: &ExtractArgs,
) -> Result<(), KpxarcError> {
    let argv = build_extract_argv(config, &args.archive, args.output.as_deref());
    run_with_stored_password(config, vault, injector, &args.archive, &argv).await?;
    crate::print_success("Archive extracted.");
    Ok(())
}

pub async fn run_list(
    config: &KpxarcConfig,
    vault: &dyn KeyedSecretStore,
    injector: &PtyInjector,
    args: &ListArgs,
) -> Result<(), KpxarcError> {
    let argv = build_list_argv(config, &args.archive);
    run_with_stored_password(config, vault, injector, &args.archive, &argv).await
}

async fn run_with_stored_password(
    config: &KpxarcConfig,
    vault: &dyn KeyedSecretStore,
    injector: &PtyInjector,
    archive: &str,
    argv: &[String],
) -> Result<(), KpxarcError> {
    println!("Fetching password for '{archive}'...");
    let mut secret = resolve_secret(Some(vault), &config.general.default_group, archive).await?;

    let result = injector.run(&secret, argv).await;
    secret.erase();
    result?.check()
}
