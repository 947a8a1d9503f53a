//! Backend abstraction for the Terraform automation library.
//!
//! The [`Backend`] trait opens a [`Handle`] bound to one working directory;
//! the handle exposes the handful of Terraform operations the embedded
//! executor sequences (init, workspace show/new, plan, apply). This allows:
//! - Real execution of the `terraform` binary ([`cli::CliBackend`])
//! - Recording mocks in tests

pub mod cli;

use std::io::Write;
use std::path::Path;

use crate::error::Result;

/// Output streams a handle writes a single operation's output to.
pub struct Streams<'a> {
    /// Receives the tool's standard output
    pub stdout: &'a mut (dyn Write + Send),
    /// Receives the tool's standard error; `None` passes it through to the
    /// process's own stderr
    pub stderr: Option<&'a mut (dyn Write + Send)>,
}

impl<'a> Streams<'a> {
    /// Capture stdout, pass stderr through.
    pub fn stdout_only(stdout: &'a mut (dyn Write + Send)) -> Self {
        Self {
            stdout,
            stderr: None,
        }
    }

    /// Capture both streams.
    pub fn both(stdout: &'a mut (dyn Write + Send), stderr: &'a mut (dyn Write + Send)) -> Self {
        Self {
            stdout,
            stderr: Some(stderr),
        }
    }
}

/// Options for `terraform init`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitOptions {
    /// Upgrade modules and providers to the newest allowed versions
    pub upgrade: bool,
}

impl InitOptions {
    /// Init with `-upgrade` set to `upgrade`.
    pub fn upgrade(upgrade: bool) -> Self {
        Self { upgrade }
    }
}

/// Opens Terraform handles.
pub trait Backend: Send + Sync {
    /// Bind a handle to `working_dir`, running `exec_path` as Terraform.
    ///
    /// Fails if the directory does not exist or the executable cannot be found.
    fn open(&self, working_dir: &Path, exec_path: &str) -> Result<Box<dyn Handle>>;
}

/// Terraform operations against one working directory.
pub trait Handle {
    /// Run `terraform init`.
    fn init(&mut self, streams: &mut Streams<'_>, options: InitOptions) -> Result<()>;

    /// Name of the currently selected workspace.
    fn workspace_show(&mut self, streams: &mut Streams<'_>) -> Result<String>;

    /// Create a workspace and switch to it.
    fn workspace_new(&mut self, streams: &mut Streams<'_>, name: &str) -> Result<()>;

    /// Run `terraform plan`; returns whether the plan contains changes.
    fn plan(&mut self, streams: &mut Streams<'_>) -> Result<bool>;

    /// Run `terraform apply` without prompting.
    fn apply(&mut self, streams: &mut Streams<'_>) -> Result<()>;
}

/// Get the default backend (real terraform CLI).
pub fn default_backend() -> cli::CliBackend {
    cli::CliBackend
}
