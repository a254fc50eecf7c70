// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One child process attached to a fresh pseudo-terminal.
//!
//! The child runs in its own session with the pty slave as controlling
//! terminal and as stdin, stdout and stderr. A blocking reader task drains the
//! master, feeds the [`PromptScanner`] and writes the password back whenever
//! a prompt shows up. The caller awaits the child, then the reader's report.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, OwnedFd};
use std::process::Stdio;
use std::time::Duration;

use kpxarc_core::{ExitStatus, KpxarcError, Secret};
use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use nix::pty::{openpty, OpenptyResult};
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::scanner::PromptScanner;

/// Default prompt markers understood by 7-Zip and most password prompts.
pub const DEFAULT_PROMPT_MARKERS: [&str; 2] = ["enter password", "password:"];

/// Tuning for an injection session.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    /// Case-insensitive literal markers that identify a password prompt.
    pub prompt_markers: Vec<String>,
    /// Pause between seeing a prompt and typing the password.
    pub injection_delay: Duration,
    /// Size of each read from the pty master.
    pub read_buffer_size: usize,
    /// Value forced into `LC_ALL` so prompts come out in English.
    pub locale: String,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            prompt_markers: DEFAULT_PROMPT_MARKERS.iter().map(|m| m.to_string()).collect(),
            injection_delay: Duration::from_millis(10),
            read_buffer_size: 1024,
            locale: "C".to_string(),
        }
    }
}

/// Result of a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionOutcome {
    pub status: ExitStatus,
    /// How many times the password was typed.
    pub prompts_answered: usize,
    /// Bytes passed through to the output sink.
    pub bytes_forwarded: usize,
}

#[derive(Debug, Default)]
struct ScanReport {
    prompts_answered: usize,
    bytes_forwarded: usize,
}

/// Runs interactive programs under a pty and answers their password prompts.
#[derive(Debug, Clone, Default)]
pub struct PtyInjector {
    config: PtyConfig,
}

impl PtyInjector {
    pub fn new(config: PtyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PtyConfig {
        &self.config
    }

    /// Run `argv` with filtered output going to this process's stdout.
    ///
    /// A non-zero exit is returned as the status, not as an error.
    pub async fn run<S: AsRef<OsStr>>(
        &self,
        secret: &Secret,
        argv: &[S],
    ) -> Result<ExitStatus, KpxarcError> {
        self.run_with_output(secret, argv, io::stdout())
            .await
            .map(|outcome| outcome.status)
    }

    /// Run `argv` and write filtered output to `sink`.
    pub async fn run_with_output<S, W>(
        &self,
        secret: &Secret,
        argv: &[S],
        sink: W,
    ) -> Result<InjectionOutcome, KpxarcError>
    where
        S: AsRef<OsStr>,
        W: Write + Send + 'static,
    {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| KpxarcError::InvalidInput("command line is empty".into()))?;
        let program_name = program.as_ref().to_string_lossy().into_owned();
        let scanner = PromptScanner::new(&self.config.prompt_markers)?;

        let OpenptyResult { master, slave } =
            openpty(None, None).map_err(|e| KpxarcError::PtyAllocation { source: e.into() })?;
        // Only the dup'ed stdio copies of the slave may reach the child.
        set_cloexec(&master)?;
        set_cloexec(&slave)?;

        let mut command = Command::new(program);
        command
            .args(args)
            .env("LC_ALL", &self.config.locale)
            .stdin(slave_stdio(&slave)?)
            .stdout(slave_stdio(&slave)?)
            .stderr(slave_stdio(&slave)?)
            .kill_on_drop(true);

        let become_session_leader = || -> io::Result<()> {
            nix::unistd::setsid()?;
            // SAFETY: fd 0 is the pty slave at this point; TIOCSCTTY takes no
            // pointer argument.
            if unsafe { libc::ioctl(0, libc::TIOCSCTTY as _, 0) } < 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        };
        // SAFETY: the hook runs between fork and exec and only calls setsid
        // and ioctl, both async-signal-safe.
        unsafe {
            command.pre_exec(become_session_leader);
        }

        let spawned = command.spawn();
        // The parent's slave handles must go, or the master never sees EOF.
        drop(command);
        drop(slave);
        let mut child = spawned.map_err(|source| KpxarcError::ChildStart {
            program: program_name.clone(),
            source,
        })?;
        info!(program = %program_name, pid = ?child.id(), "spawned child on pty");

        let reader = PtyReader {
            master: File::from(master),
            scanner,
            answer: secret.to_line(),
            injection_delay: self.config.injection_delay,
            read_buffer_size: self.config.read_buffer_size.max(1),
            sink,
        };
        let (done_tx, done_rx) = oneshot::channel();
        tokio::task::spawn_blocking(move || {
            let _ = done_tx.send(reader.drain());
        });

        let status = child
            .wait()
            .await
            .map_err(|e| KpxarcError::Internal(format!("failed to wait for '{program_name}': {e}")))?;
        let status = ExitStatus::from(status);

        let report = done_rx
            .await
            .map_err(|_| KpxarcError::Internal("pty reader stopped without reporting".into()))?;

        info!(
            program = %program_name,
            %status,
            prompts = report.prompts_answered,
            "child exited"
        );
        Ok(InjectionOutcome {
            status,
            prompts_answered: report.prompts_answered,
            bytes_forwarded: report.bytes_forwarded,
        })
    }
}

/// Run `argv` under a pty with the default settings, answering every password
/// prompt with `secret`.
pub async fn run<S: AsRef<OsStr>>(secret: &Secret, argv: &[S]) -> Result<ExitStatus, KpxarcError> {
    PtyInjector::default().run(secret, argv).await
}

fn set_cloexec(fd: &OwnedFd) -> Result<(), KpxarcError> {
    fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))
        .map(drop)
        .map_err(|e| KpxarcError::PtyAllocation { source: e.into() })
}

fn slave_stdio(slave: &OwnedFd) -> Result<Stdio, KpxarcError> {
    slave
        .try_clone()
        .map(Stdio::from)
        .map_err(|source| KpxarcError::PtyAllocation { source })
}

struct PtyReader<W> {
    master: File,
    scanner: PromptScanner,
    answer: Zeroizing<Vec<u8>>,
    injection_delay: Duration,
    read_buffer_size: usize,
    sink: W,
}

impl<W: Write> PtyReader<W> {
    /// Read until the slave side is gone. Blocking.
    fn drain(mut self) -> ScanReport {
        let mut report = ScanReport::default();
        let mut buf = vec![0u8; self.read_buffer_size];

        loop {
            let n = match self.master.read(&mut buf) {
                Ok(0) => {
                    debug!("pty EOF");
                    break;
                }
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                // Linux reports a hung-up pty master as EIO.
                Err(e) if e.raw_os_error() == Some(libc::EIO) => {
                    debug!("pty closed by child");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "pty read failed");
                    break;
                }
            };

            let scan = self.scanner.feed(&buf[..n]);
            if !scan.forward.is_empty() {
                report.bytes_forwarded += scan.forward.len();
                if let Err(e) = self
                    .sink
                    .write_all(scan.forward)
                    .and_then(|()| self.sink.flush())
                {
                    warn!(error = %e, "failed to forward child output");
                }
            }

            if scan.prompt {
                std::thread::sleep(self.injection_delay);
                match (&self.master).write_all(&self.answer) {
                    Ok(()) => {
                        report.prompts_answered += 1;
                        debug!(count = report.prompts_answered, "answered password prompt");
                    }
                    Err(e) => warn!(error = %e, "failed to write password to pty"),
                }
            }
        }

        report
    }
}
