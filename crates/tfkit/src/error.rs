//! Error types for Terraform and Terragrunt operations.
//!
//! Low-level failures (a binary that cannot be started, a non-zero exit)
//! are wrapped in [`Error::Stage`] by the executors so the message names
//! the step that failed. Executors hand errors back inside a [`Failure`],
//! which also carries whatever output was captured before things went wrong.

use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

use crate::types::Captured;

/// A step in the Terraform workflow driven by the embedded executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// `terraform init`
    Init,
    /// `terraform workspace show`
    WorkspaceShow,
    /// `terraform workspace new`
    WorkspaceNew,
    /// `terraform plan`
    Plan,
    /// `terraform apply`
    Apply,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Init => "terraform init",
            Self::WorkspaceShow => "terraform show",
            Self::WorkspaceNew => "terraform select",
            Self::Plan => "terraform plan",
            Self::Apply => "terraform apply",
        };
        f.write_str(label)
    }
}

/// Errors that can occur while driving Terraform or Terragrunt.
#[derive(Debug, Error)]
pub enum Error {
    /// The executable could not be started at all
    #[error("failed to execute {program}: {source}")]
    Launch {
        /// Program that was being started
        program: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// The executable ran but exited unsuccessfully
    #[error("{program} exited with {}", describe_status(.status))]
    ExitStatus {
        /// Program that failed
        program: String,
        /// Exit status reported by the OS
        status: ExitStatus,
    },

    /// The working directory handed to the automation library does not exist
    #[error("error while initializing terraform: working directory not found: {0}")]
    WorkingDirNotFound(PathBuf),

    /// The Terraform executable could not be located
    #[error("error while initializing terraform: executable not found: {0}")]
    ExecutableNotFound(String),

    /// A workflow step failed
    #[error("{stage} failed. {source}")]
    Stage {
        /// Step that failed
        stage: Stage,
        /// What went wrong inside that step
        #[source]
        source: Box<Error>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap this error as the failure of a workflow step.
    pub fn at(self, stage: Stage) -> Self {
        Error::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The workflow step that failed, if this error came from one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Whether the library handle could not be constructed.
    pub fn is_handle_error(&self) -> bool {
        matches!(
            self,
            Error::WorkingDirNotFound(_) | Error::ExecutableNotFound(_)
        )
    }
}

fn describe_status(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Result type for tfkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A failed plan or apply, together with the output captured before it failed.
///
/// Callers should show both: the error says which step broke, the captured
/// streams say why. Display and `source` pass through to the inner error.
#[derive(Debug)]
pub struct Failure {
    /// What went wrong
    pub error: Error,
    /// Output captured up to the failure
    pub captured: Captured,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.error)
    }
}

impl Failure {
    /// Pair an error with partial output.
    pub fn new(error: Error, captured: Captured) -> Self {
        Self { error, captured }
    }

    /// A failure that produced no output.
    pub fn bare(error: Error) -> Self {
        Self::new(error, Captured::default())
    }
}

impl From<Error> for Failure {
    fn from(error: Error) -> Self {
        Self::bare(error)
    }
}
