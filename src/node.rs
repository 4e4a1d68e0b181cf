//! The daemon seam.
//!
//! [`NodeCli`] is everything the bootstrapper asks of the gateway daemon.
//! [`OrbCli`] drives the real `orb` executable as a subprocess; tests swap in
//! a recorder.

use std::{
    convert::Infallible,
    path::PathBuf,
    process::Command,
};

use tracing::{debug, info};

use crate::{error::AppError, launch::SERVE_SUBCOMMAND};

/// Operations the bootstrapper performs against the daemon.
///
/// The three setup steps are one-shot and must run to completion before the
/// next begins. [`launch`](NodeCli::launch) hands control to the daemon and
/// only ever returns an error.
pub trait NodeCli {
    /// Generate and store a named key. The daemon returns the stored key
    /// when one with this name already exists.
    fn create_key(&mut self, name: &str) -> Result<(), AppError>;

    /// Initialise a sphere in the working root, owned by `owner_key`.
    fn create_sphere(&mut self, owner_key: &str) -> Result<(), AppError>;

    /// Overwrite the sphere's configured counterpart.
    fn set_counterpart(&mut self, counterpart: &str) -> Result<(), AppError>;

    /// Replace the current process with `orb serve <args>`.
    fn launch(&mut self, args: &[String]) -> Result<Infallible, AppError>;
}

/// Subprocess-backed [`NodeCli`] for the `orb` executable.
#[derive(Debug, Clone)]
pub struct OrbCli {
    bin: PathBuf,
    root: PathBuf,
}

impl OrbCli {
    pub fn new(bin: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into(), root: root.into() }
    }

    /// Full `orb serve` command line, as it would be exec'd.
    pub fn command_line(&self, args: &[String]) -> Vec<String> {
        let mut line = vec![self.bin.display().to_string(), SERVE_SUBCOMMAND.to_string()];
        line.extend(args.iter().cloned());
        line
    }

    /// [`command_line`](Self::command_line) with every token quoted, so empty
    /// values stay visible.
    pub fn quoted_command_line(&self, args: &[String]) -> String {
        self.command_line(args)
            .iter()
            .map(|token| format!("{token:?}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(&self.root);
        cmd
    }

    fn run_step(&self, step: &str, args: &[&str]) -> Result<(), AppError> {
        debug!(bin = %self.bin.display(), ?args, "running orb {step}");
        let status = self
            .command()
            .args(args)
            .status()
            .map_err(|e| AppError::step(step, format!("cannot run {}: {e}", self.bin.display())))?;

        if !status.success() {
            return Err(AppError::step(step, status.to_string()));
        }
        Ok(())
    }
}

impl NodeCli for OrbCli {
    fn create_key(&mut self, name: &str) -> Result<(), AppError> {
        self.run_step("key create", &["key", "create", name])
    }

    fn create_sphere(&mut self, owner_key: &str) -> Result<(), AppError> {
        self.run_step("sphere create", &["sphere", "create", "--owner-key", owner_key])
    }

    fn set_counterpart(&mut self, counterpart: &str) -> Result<(), AppError> {
        self.run_step(
            "sphere config set counterpart",
            &["sphere", "config", "set", "counterpart", counterpart],
        )
    }

    fn launch(&mut self, args: &[String]) -> Result<Infallible, AppError> {
        let mut cmd = self.command();
        cmd.arg(SERVE_SUBCOMMAND).args(args);
        info!(command = %self.command_line(args).join(" "), "handing off to daemon");
        hand_off(cmd)
    }
}

#[cfg(unix)]
fn hand_off(mut cmd: Command) -> Result<Infallible, AppError> {
    use std::os::unix::process::CommandExt;
    // `exec` only returns on failure.
    let err = cmd.exec();
    Err(AppError::Launch(err.to_string()))
}

#[cfg(not(unix))]
fn hand_off(mut cmd: Command) -> Result<Infallible, AppError> {
    let status = cmd.status().map_err(|e| AppError::Launch(e.to_string()))?;
    std::process::exit(status.code().unwrap_or(1))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::{fs, os::unix::fs::PermissionsExt, path::Path};
    use tempfile::TempDir;

    /// Write an `orb` stand-in that appends `cwd|args` to a log and exits
    /// with `code` when its first argument is `fail_on`.
    fn fake_orb(dir: &Path, fail_on: &str, code: i32) -> (PathBuf, PathBuf) {
        let bin = dir.join("orb");
        let log = dir.join("calls.log");
        let script = format!(
            r#"#!/bin/sh
echo "$(pwd -P)|$*" >> '{log}'
if [ "$1" = '{fail_on}' ]; then exit {code}; fi
exit 0
"#,
            log = log.display()
        );
        fs::write(&bin, script).unwrap();
        fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();
        (bin, log)
    }

    fn calls(log: &Path) -> Vec<String> {
        fs::read_to_string(log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn steps_run_in_root_with_expected_args() {
        let tools = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let root_path = root.path().canonicalize().unwrap();
        let (bin, log) = fake_orb(tools.path(), "none", 0);
        let mut orb = OrbCli::new(&bin, &root_path);

        orb.create_key("alice").unwrap();
        orb.create_sphere("alice").unwrap();
        orb.set_counterpart("did:key:bob").unwrap();

        let cwd = root_path.display().to_string();
        assert_eq!(
            calls(&log),
            vec![
                format!("{cwd}|key create alice"),
                format!("{cwd}|sphere create --owner-key alice"),
                format!("{cwd}|sphere config set counterpart did:key:bob"),
            ]
        );
    }

    #[test]
    fn non_zero_exit_is_a_step_error() {
        let tools = TempDir::new().unwrap();
        let (bin, _) = fake_orb(tools.path(), "sphere", 3);
        let mut orb = OrbCli::new(&bin, tools.path());

        orb.create_key("alice").unwrap();
        let err = orb.create_sphere("alice").unwrap_err();
        match err {
            AppError::Step { step, detail } => {
                assert_eq!(step, "sphere create");
                assert!(detail.contains('3'), "detail was {detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_binary_is_a_step_error() {
        let tools = TempDir::new().unwrap();
        let mut orb = OrbCli::new(tools.path().join("no-such-orb"), tools.path());
        let err = orb.create_key("alice").unwrap_err();
        assert!(err.to_string().contains("orb key create"));
        assert!(err.to_string().contains("cannot run"));
    }

    #[test]
    fn command_line_prefixes_serve() {
        let orb = OrbCli::new("/usr/bin/orb", "/srv/sphere");
        let line = orb.command_line(&["--interface".into(), "0.0.0.0".into()]);
        assert_eq!(line, vec!["/usr/bin/orb", "serve", "--interface", "0.0.0.0"]);
    }

    #[test]
    fn quoted_command_line_keeps_empty_values() {
        let orb = OrbCli::new("orb", "/srv/sphere");
        let line = orb.quoted_command_line(&["--ipfs-api".into(), String::new()]);
        assert_eq!(line, r#""orb" "serve" "--ipfs-api" """#);
    }
}
