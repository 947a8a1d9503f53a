//! Executor that delegates to the `terragrunt` wrapper binary.

use std::process::Command;

use super::Executor;
use crate::error::{Error, Failure};
use crate::process::{self, StderrTarget};
use crate::sink::{CaptureSink, Echo};
use crate::types::{Captured, PlanReport, TerragruntConfig};

/// Environment added to every terragrunt run, on top of the inherited one.
pub const AUTOMATION_ENV: [(&str, &str); 2] =
    [("TF_CLI_ARGS", "-no-color"), ("TF_IN_AUTOMATION", "true")];

/// Runs `terragrunt <plan|apply> --working-dir <dir>`.
///
/// Output is echoed live (stdout to [`TerragruntConfig::echo`], stderr to
/// stderr) and captured. `plan` always reports changes: the
/// wrapper's output is not inspected, so an empty plan looks the same as a
/// non-empty one.
#[derive(Debug, Clone)]
pub struct Terragrunt {
    config: TerragruntConfig,
}

impl Terragrunt {
    /// Create an executor from its configuration.
    pub fn new(config: TerragruntConfig) -> Self {
        Self { config }
    }

    /// Build the command for `operation`, with automation env scoped to the child.
    fn command(&self, operation: &str) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.arg(operation)
            .arg("--working-dir")
            .arg(&self.config.working_dir)
            .envs(AUTOMATION_ENV);
        cmd
    }

    fn run(&self, operation: &str) -> Result<Captured, Failure> {
        log::info!(
            "terragrunt {} in {}",
            operation,
            self.config.working_dir.display()
        );

        self.capture(operation, &mut self.command(operation))
    }

    /// Run `cmd`, echoing and capturing both streams.
    fn capture(&self, operation: &str, cmd: &mut Command) -> Result<Captured, Failure> {
        let mut stdout = CaptureSink::with_echo(self.config.echo);
        let mut stderr = CaptureSink::echoing(Echo::Stderr);

        let result = process::run_checked(cmd, &mut stdout, StderrTarget::Capture(&mut stderr));
        let captured = Captured::new(stdout.into_string(), stderr.into_string());

        match result {
            Ok(()) => Ok(captured),
            Err(e) => {
                log::debug!("terragrunt {operation} failed: {e}");
                Err(Failure::new(e, captured))
            }
        }
    }
}

impl Executor for Terragrunt {
    fn apply(&self) -> Result<Captured, Failure> {
        self.run("apply")
    }

    fn plan(&self) -> Result<PlanReport, Failure> {
        let captured = self.run("plan")?;
        Ok(PlanReport {
            has_changes: true,
            captured,
        })
    }
}

impl From<TerragruntConfig> for Terragrunt {
    fn from(config: TerragruntConfig) -> Self {
        Self::new(config)
    }
}

/// Whether a failure came from terragrunt not being runnable at all.
pub fn is_launch_failure(failure: &Failure) -> bool {
    matches!(failure.error, Error::Launch { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use std::path::Path;

    fn executor(program: &str) -> Terragrunt {
        Terragrunt::new(TerragruntConfig::new("./infra").with_program(program))
    }

    #[test]
    fn test_command_shape() {
        let cmd = executor("terragrunt").command("plan");

        assert_eq!(cmd.get_program(), OsStr::new("terragrunt"));
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(
            args,
            vec![
                OsStr::new("plan"),
                OsStr::new("--working-dir"),
                Path::new("./infra").as_os_str()
            ]
        );
    }

    #[test]
    fn test_command_injects_automation_env() {
        let cmd = executor("terragrunt").command("apply");
        let envs: Vec<_> = cmd.get_envs().collect();

        assert!(envs.contains(&(OsStr::new("TF_CLI_ARGS"), Some(OsStr::new("-no-color")))));
        assert!(envs.contains(&(OsStr::new("TF_IN_AUTOMATION"), Some(OsStr::new("true")))));
        assert_eq!(envs.len(), 2);
    }

    #[test]
    fn test_parent_environment_untouched() {
        let before = std::env::var_os("TF_CLI_ARGS");
        let _ = executor("tfkit-no-such-terragrunt").apply();
        assert_eq!(std::env::var_os("TF_CLI_ARGS"), before);
    }

    #[test]
    fn test_missing_binary_is_reported() {
        let failure = executor("tfkit-no-such-terragrunt").plan().unwrap_err();

        assert!(is_launch_failure(&failure));
        assert!(failure.captured.stdout.is_empty());
        assert!(failure.captured.stderr.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_plan_always_reports_changes() {
        // `true` ignores its arguments and prints nothing: an empty plan
        let report = executor("true").plan().unwrap();
        assert!(report.has_changes);
        assert_eq!(report.captured, Captured::default());
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_keeps_both_streams() {
        let tg = Terragrunt::new(TerragruntConfig::new("./infra").with_echo(None));
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo 'Plan: 1 to add'; echo 'Error: lock held' >&2; exit 3"]);

        let failure = tg.capture("apply", &mut cmd).unwrap_err();

        assert!(matches!(failure.error, Error::ExitStatus { .. }));
        assert_eq!(failure.captured.stdout, "Plan: 1 to add\n");
        assert_eq!(failure.captured.stderr, "Error: lock held\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_failure() {
        let failure = executor("false").apply().unwrap_err();
        assert!(matches!(failure.error, Error::ExitStatus { .. }));
        assert!(!is_launch_failure(&failure));
    }
}
