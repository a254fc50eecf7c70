// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kpxarc a`: create an archive with a freshly generated password.

use std::path::Path;

use clap::Args;
use kpxarc_archive::join_entry;
use kpxarc_config::KpxarcConfig;
use kpxarc_core::{EntryAttributes, KeyedSecretStore, KpxarcError, SecretGenerator};
use kpxarc_pty::PtyInjector;
use tracing::{debug, info};

/// Arguments for `kpxarc a`.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Archive to create. `.7z` is appended when it has no extension.
    pub archive: String,

    /// Fastest compression (-mx=1).
    #[arg(long)]
    pub fast: bool,

    /// Best compression (-mx=9).
    #[arg(long)]
    pub best: bool,

    /// Split into volumes of this size (e.g. 100m, 1g).
    #[arg(long, value_name = "SIZE")]
    pub volume: Option<String>,

    /// Files to add. Arguments starting with `-` are passed to 7z as flags.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub items: Vec<String>,
}

/// Files and 7z flags sorted out of the trailing arguments.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ItemPlan {
    pub fast: bool,
    pub best: bool,
    pub volume: Option<String>,
    pub passthrough: Vec<String>,
    pub files: Vec<String>,
}

/// Append `.7z` when `archive` has no extension.
pub fn with_default_extension(archive: &str) -> String {
    if Path::new(archive).extension().is_some() {
        archive.to_string()
    } else {
        format!("{archive}.7z")
    }
}

/// Split the trailing arguments into files and 7z flags.
///
/// Our own `--fast`, `--best` and `--volume` are still recognized when they
/// come after the first file. An argument that starts with `-` and names an
/// existing file is refused, since 7z would read it as a switch.
pub fn plan_items(
    args: &AddArgs,
    exists: impl Fn(&Path) -> bool,
) -> Result<ItemPlan, KpxarcError> {
    let mut plan = ItemPlan {
        fast: args.fast,
        best: args.best,
        volume: args.volume.clone(),
        ..ItemPlan::default()
    };

    let mut items = args.items.iter();
    while let Some(item) = items.next() {
        match item.as_str() {
            "--fast" => plan.fast = true,
            "--best" => plan.best = true,
            "--volume" => {
                let size = items.next().ok_or_else(|| {
                    KpxarcError::InvalidInput("--volume needs a size such as 100m".into())
                })?;
                plan.volume = Some(size.clone());
            }
            _ if item.starts_with("--volume=") => {
                plan.volume = Some(item["--volume=".len()..].to_string());
            }
            _ if item.starts_with('-') => {
                if exists(Path::new(item)) {
                    return Err(KpxarcError::InvalidInput(format!(
                        "refusing to archive '{item}': names starting with '-' would be read \
                         as 7z switches; pass it as ./{item}"
                    )));
                }
                plan.passthrough.push(item.clone());
            }
            _ => plan.files.push(item.clone()),
        }
    }

    if plan.files.is_empty() {
        return Err(KpxarcError::InvalidInput("no files to add".into()));
    }
    if plan.volume.as_deref().is_some_and(str::is_empty) {
        return Err(KpxarcError::InvalidInput("--volume size is empty".into()));
    }
    Ok(plan)
}

/// `7z a <defaults> [-mx] [-v] [passthrough] -p <archive> <files>`.
pub fn build_add_argv(config: &KpxarcConfig, archive: &str, plan: &ItemPlan) -> Vec<String> {
    let mut argv = vec![config.sevenzip.binary_path.clone(), "a".to_string()];
    argv.extend(config.sevenzip.default_args.iter().cloned());
    if plan.fast {
        argv.push("-mx=1".to_string());
    } else if plan.best {
        argv.push("-mx=9".to_string());
    }
    if let Some(volume) = &plan.volume {
        argv.push(format!("-v{volume}"));
    }
    argv.extend(plan.passthrough.iter().cloned());
    // Bare -p makes 7z prompt for the password on the terminal.
    argv.push("-p".to_string());
    argv.push(archive.to_string());
    argv.extend(plan.files.iter().cloned());
    argv
}

pub async fn run<V>(
    config: &KpxarcConfig,
    vault: &V,
    injector: &PtyInjector,
    args: &AddArgs,
) -> Result<(), KpxarcError>
where
    V: KeyedSecretStore + SecretGenerator,
{
    let archive = with_default_extension(&args.archive);
    let plan = plan_items(args, |p| p.exists())?;

    let name = Path::new(&archive)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| KpxarcError::InvalidInput(format!("'{archive}' is not a file name")))?;
    let absolute = std::path::absolute(&archive).map_err(|e| {
        KpxarcError::InvalidInput(format!("cannot resolve archive path '{archive}': {e}"))
    })?;
    let key = join_entry(&config.general.default_group, &name);

    println!(
        "Generating {}-character password...",
        config.general.password_length
    );
    let mut secret = vault.generate(config.general.password_length).await?;

    println!("Saving entry '{key}' to KeePassXC...");
    let attributes = EntryAttributes {
        username: Some(config.keepass.entry_username.clone()),
        url: Some(absolute.to_string_lossy().into_owned()),
    };
    vault.put(&key, &secret, &attributes).await?;
    info!(key = %key, archive = %archive, "archive password stored");

    println!("Creating archive '{archive}'...");
    let argv = build_add_argv(config, &archive, &plan);
    debug!(?argv, "running 7z");
    let result = injector.run(&secret, &argv).await;
    secret.erase();

    result?.check()?;
    crate::print_success(&format!("Archive '{archive}' created."));
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tracing_test::traced_test;

    use super::*;
    use crate::testutil::{Fake7z, MockVault};

    fn args(items: &[&str]) -> AddArgs {
        AddArgs {
            archive: "backup".into(),
            fast: false,
            best: false,
            volume: None,
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn nothing_exists(_: &Path) -> bool {
        false
    }

    #[test]
    fn default_extension() {
        assert_eq!(with_default_extension("backup"), "backup.7z");
        assert_eq!(with_default_extension("backup.zip"), "backup.zip");
        assert_eq!(with_default_extension("dir/backup"), "dir/backup.7z");
    }

    #[test]
    fn splits_files_and_switches() {
        let plan = plan_items(&args(&["docs", "-sfx", "notes.txt", "-m0=lzma2"]), nothing_exists)
            .unwrap();
        assert_eq!(plan.files, vec!["docs", "notes.txt"]);
        assert_eq!(plan.passthrough, vec!["-sfx", "-m0=lzma2"]);
    }

    #[test]
    fn late_own_flags_are_recognized() {
        let plan = plan_items(
            &args(&["docs", "--best", "--volume", "1g"]),
            nothing_exists,
        )
        .unwrap();
        assert!(plan.best);
        assert_eq!(plan.volume.as_deref(), Some("1g"));
        assert!(plan.passthrough.is_empty());

        let plan = plan_items(&args(&["docs", "--volume=100m"]), nothing_exists).unwrap();
        assert_eq!(plan.volume.as_deref(), Some("100m"));
    }

    #[test]
    fn dash_named_existing_file_is_refused() {
        let err = plan_items(&args(&["docs", "-rf"]), |p| p == Path::new("-rf")).unwrap_err();
        assert!(matches!(err, KpxarcError::InvalidInput(_)));
        assert!(err.to_string().contains("-rf"));
    }

    #[test]
    fn flags_alone_are_not_enough() {
        let err = plan_items(&args(&["-sfx"]), nothing_exists).unwrap_err();
        assert!(err.to_string().contains("no files"));
    }

    #[test]
    fn volume_without_size() {
        assert!(plan_items(&args(&["docs", "--volume"]), nothing_exists).is_err());
    }

    #[test]
    fn argv_layout() {
        let config = KpxarcConfig::default();
        let plan = ItemPlan {
            fast: true,
            best: true,
            volume: Some("100m".into()),
            passthrough: vec!["-sfx".into()],
            files: vec!["docs".into(), "a.txt".into()],
        };
        assert_eq!(
            build_add_argv(&config, "backup.7z", &plan),
            vec![
                "7z", "a", "-mhe=on", "-mx=9", "-mx=1", "-v100m", "-sfx", "-p", "backup.7z",
                "docs", "a.txt",
            ]
        );
    }

    #[test]
    fn argv_without_options() {
        let mut config = KpxarcConfig::default();
        config.sevenzip.default_args.clear();
        let plan = ItemPlan {
            files: vec!["docs".into()],
            ..ItemPlan::default()
        };
        assert_eq!(
            build_add_argv(&config, "b.7z", &plan),
            vec!["7z", "a", "-p", "b.7z", "docs"]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    #[serial]
    #[traced_test]
    async fn add_stores_password_then_feeds_it_to_both_prompts() {
        let fake = Fake7z::new();
        let docs = fake.path("docs.txt");
        std::fs::write(&docs, "hello").unwrap();
        let archive = fake.path("backup");

        let vault = MockVault::default();
        let injector = crate::setup::pty_injector(&fake.config);
        let add = AddArgs {
            archive: archive.display().to_string(),
            fast: true,
            best: false,
            volume: None,
            items: vec![docs.display().to_string(), "-sfx".into()],
        };

        run(&fake.config, &vault, &injector, &add).await.unwrap();

        let expected = MockVault::generated_password(fake.config.general.password_length);
        let (stored, attributes) = vault
            .entry("Archives/AutoGenerated/backup.7z")
            .expect("entry stored under the default group");
        assert_eq!(stored, expected);
        assert_eq!(attributes.username.as_deref(), Some("kpxarc"));
        let archive_path = format!("{}.7z", archive.display());
        assert_eq!(attributes.url.as_deref(), Some(archive_path.as_str()));

        assert_eq!(fake.passwords(), vec![expected.clone(), expected.clone()]);
        assert_eq!(
            fake.args(),
            vec![
                "a".to_string(),
                "-mhe=on".into(),
                "-mx=9".into(),
                "-mx=1".into(),
                "-sfx".into(),
                "-p".into(),
                archive_path.clone(),
                docs.display().to_string(),
            ]
        );

        assert!(logs_contain("archive password stored"));
        assert!(!logs_contain(&expected));
    }

    #[tokio::test(flavor = "multi_thread")]
    #[serial]
    async fn add_refuses_existing_entry_without_running_7z() {
        let fake = Fake7z::new();
        let docs = fake.path("docs.txt");
        std::fs::write(&docs, "hello").unwrap();

        let vault = MockVault::default();
        vault.seed("Archives/AutoGenerated/backup.7z", "old");
        let add = AddArgs {
            archive: fake.path("backup.7z").display().to_string(),
            fast: false,
            best: false,
            volume: None,
            items: vec![docs.display().to_string()],
        };

        let err = run(&fake.config, &vault, &crate::setup::pty_injector(&fake.config), &add)
            .await
            .unwrap_err();
        assert!(matches!(err, KpxarcError::AlreadyExists { .. }));
        assert!(!fake.ran());
        assert_eq!(vault.entry("Archives/AutoGenerated/backup.7z").unwrap().0, "old");
    }

    #[tokio::test(flavor = "multi_thread")]
    #[serial]
    async fn failing_7z_is_reported_with_its_status() {
        let fake = Fake7z::exiting_with(2);
        let docs = fake.path("docs.txt");
        std::fs::write(&docs, "hello").unwrap();
        let add = AddArgs {
            archive: fake.path("broken.7z").display().to_string(),
            fast: false,
            best: false,
            volume: None,
            items: vec![docs.display().to_string()],
        };

        let err = run(
            &fake.config,
            &MockVault::default(),
            &crate::setup::pty_injector(&fake.config),
            &add,
        )
        .await
        .unwrap_err();
        match err {
            KpxarcError::ChildExit { status } => assert_eq!(status.code(), Some(2)),
            other => panic!("expected ChildExit, got {other:?}"),
        }
    }
}
