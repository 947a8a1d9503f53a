//! Real Terraform backend using the `terraform` CLI.
//!
//! Every operation runs the binary inside the working directory with
//! `TF_IN_AUTOMATION` set and interactive input disabled.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{Backend, Handle, InitOptions, Streams};
use crate::error::{Error, Result};
use crate::process::{self, StderrTarget};
use crate::sink::CaptureSink;

/// Backend that executes the real `terraform` binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliBackend;

impl Backend for CliBackend {
    fn open(&self, working_dir: &Path, exec_path: &str) -> Result<Box<dyn Handle>> {
        let handle = CliHandle::new(working_dir, exec_path)?;
        Ok(Box::new(handle))
    }
}

/// A `terraform` binary bound to a working directory.
#[derive(Debug)]
pub struct CliHandle {
    working_dir: PathBuf,
    exec_path: PathBuf,
}

impl CliHandle {
    /// Bind to `working_dir`, resolving `exec_path` on PATH if needed.
    pub fn new(working_dir: &Path, exec_path: &str) -> Result<Self> {
        if !working_dir.is_dir() {
            return Err(Error::WorkingDirNotFound(working_dir.to_path_buf()));
        }
        let exec_path = find_executable(exec_path)
            .ok_or_else(|| Error::ExecutableNotFound(exec_path.to_string()))?;

        log::debug!(
            "Using {} in {}",
            exec_path.display(),
            working_dir.display()
        );
        Ok(Self {
            working_dir: working_dir.to_path_buf(),
            exec_path,
        })
    }

    /// Build a terraform command for this working directory.
    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.exec_path);
        cmd.args(args)
            .current_dir(&self.working_dir)
            .env("TF_IN_AUTOMATION", "1")
            .env("TF_INPUT", "0")
            .env("CHECKPOINT_DISABLE", "1");
        cmd
    }

    fn run(&self, streams: &mut Streams<'_>, args: &[&str]) -> Result<()> {
        let mut cmd = self.command(args);
        let Streams { stdout, stderr } = streams;
        process::run_checked(&mut cmd, &mut **stdout, stderr_target(stderr))
    }
}

impl Handle for CliHandle {
    fn init(&mut self, streams: &mut Streams<'_>, options: InitOptions) -> Result<()> {
        self.run(streams, &init_args(options))
    }

    fn workspace_show(&mut self, streams: &mut Streams<'_>) -> Result<String> {
        let mut out = CaptureSink::new();
        let mut cmd = self.command(&["workspace", "show"]);
        process::run_checked(&mut cmd, &mut out, stderr_target(&mut streams.stderr))?;

        streams.stdout.write_all(out.as_bytes())?;
        Ok(out.contents().trim().to_string())
    }

    fn workspace_new(&mut self, streams: &mut Streams<'_>, name: &str) -> Result<()> {
        self.run(streams, &["workspace", "new", "-no-color", name])
    }

    fn plan(&mut self, streams: &mut Streams<'_>) -> Result<bool> {
        let mut cmd = self.command(&PLAN_ARGS);
        let Streams { stdout, stderr } = streams;
        let status = process::run_streamed(&mut cmd, &mut **stdout, stderr_target(stderr))?;

        plan_has_changes(status.code()).ok_or_else(|| Error::ExitStatus {
            program: self.exec_path.display().to_string(),
            status,
        })
    }

    fn apply(&mut self, streams: &mut Streams<'_>) -> Result<()> {
        self.run(streams, &APPLY_ARGS)
    }
}

const PLAN_ARGS: [&str; 4] = ["plan", "-no-color", "-input=false", "-detailed-exitcode"];

const APPLY_ARGS: [&str; 4] = ["apply", "-no-color", "-input=false", "-auto-approve"];

fn init_args(options: InitOptions) -> [&'static str; 4] {
    let upgrade = if options.upgrade {
        "-upgrade=true"
    } else {
        "-upgrade=false"
    };
    ["init", "-no-color", "-input=false", upgrade]
}

/// Interpret `terraform plan -detailed-exitcode`.
///
/// 0 means an empty plan, 2 means changes are pending; anything else is an error.
fn plan_has_changes(code: Option<i32>) -> Option<bool> {
    match code {
        Some(0) => Some(false),
        Some(2) => Some(true),
        _ => None,
    }
}

fn stderr_target<'s>(stderr: &'s mut Option<&mut (dyn Write + Send)>) -> StderrTarget<'s> {
    match stderr {
        Some(writer) => StderrTarget::Capture(&mut **writer),
        None => StderrTarget::Inherit,
    }
}

/// Resolve an executable name against PATH.
///
/// Names containing a path separator are checked in place. Either way the
/// result must be an executable file.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
