//! Common types shared by the executors.

use std::path::PathBuf;

use crate::sink::Echo;

/// Default name of the Terraform executable.
pub const TERRAFORM_BIN: &str = "terraform";

/// Default name of the Terragrunt executable.
pub const TERRAGRUNT_BIN: &str = "terragrunt";

/// Name of the workspace Terraform starts in.
pub const DEFAULT_WORKSPACE: &str = "default";

/// Text captured from a run's standard output and standard error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error (empty when stderr was passed through)
    pub stderr: String,
}

impl Captured {
    /// Build from anything string-like.
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Captured stdout only; stderr left empty.
    pub fn stdout_only(stdout: impl Into<String>) -> Self {
        Self::new(stdout, String::new())
    }
}

/// Result of a successful plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanReport {
    /// Whether the plan contains changes
    pub has_changes: bool,
    /// Output produced while planning
    pub captured: Captured,
}

/// Settings for the embedded Terraform executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformConfig {
    /// Directory holding the Terraform configuration
    pub working_dir: PathBuf,
    /// Workspace to plan/apply against
    pub workspace: String,
    /// Terraform executable (name on PATH or explicit path)
    pub exec_path: String,
    /// Console stream the tool's stdout is mirrored to while captured
    pub echo: Option<Echo>,
}

impl TerraformConfig {
    /// Config for `working_dir`/`workspace` using the default `terraform` binary.
    pub fn new(working_dir: impl Into<PathBuf>, workspace: impl Into<String>) -> Self {
        Self {
            working_dir: working_dir.into(),
            workspace: workspace.into(),
            exec_path: TERRAFORM_BIN.to_string(),
            echo: Some(Echo::Stdout),
        }
    }

    /// Use a different Terraform executable.
    pub fn with_exec_path(mut self, exec_path: impl Into<String>) -> Self {
        self.exec_path = exec_path.into();
        self
    }

    /// Mirror the tool's stdout to `echo` instead (`None` keeps it quiet).
    pub fn with_echo(mut self, echo: Option<Echo>) -> Self {
        self.echo = echo;
        self
    }
}

/// Settings for the Terragrunt wrapper executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerragruntConfig {
    /// Directory Terragrunt runs in
    pub working_dir: PathBuf,
    /// Terragrunt executable (name on PATH or explicit path)
    pub program: String,
    /// Console stream the tool's stdout is mirrored to while captured
    pub echo: Option<Echo>,
}

impl TerragruntConfig {
    /// Config for `working_dir` using the default `terragrunt` binary.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            program: TERRAGRUNT_BIN.to_string(),
            echo: Some(Echo::Stdout),
        }
    }

    /// Use a different Terragrunt executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Mirror the tool's stdout to `echo` instead (`None` keeps it quiet).
    pub fn with_echo(mut self, echo: Option<Echo>) -> Self {
        self.echo = echo;
        self
    }
}
