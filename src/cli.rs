use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::BackendKind;

#[derive(Parser)]
#[command(name = "tfrun")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Run terraform or terragrunt plan/apply the same way", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to $TFRUN_CONFIG, ./tfrun.toml, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the change set without applying it
    Plan(PlanArgs),

    /// Apply changes to real infrastructure
    Apply(ApplyArgs),

    /// Check that terraform/terragrunt and the working directory are usable
    Doctor(TargetArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Plan / Apply
// ============================================================================

/// Flags that override the config file for one run.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Backend to run with
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Directory holding the infrastructure code
    #[arg(short = 'd', long, value_name = "DIR")]
    pub working_dir: Option<String>,

    /// Terraform workspace to use (terraform backend only)
    #[arg(short, long)]
    pub workspace: Option<String>,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Print a one-line JSON summary when done
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Terraform,
    Terragrunt,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Terraform => BackendKind::Terraform,
            BackendArg::Terragrunt => BackendKind::Terragrunt,
        }
    }
}

// ============================================================================
// Config Commands
// ============================================================================

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the config file in use and the effective settings
    Show(TargetArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_plan_overrides() {
        let cli = Cli::parse_from([
            "tfrun", "-vv", "plan", "-b", "terragrunt", "-d", "live/prod", "--json",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Plan(args) => {
                assert_eq!(args.target.backend, Some(BackendArg::Terragrunt));
                assert_eq!(args.target.working_dir.as_deref(), Some("live/prod"));
                assert!(args.target.workspace.is_none());
                assert!(args.json);
            }
            _ => panic!("expected plan"),
        }
    }

    #[test]
    fn test_parse_apply_with_workspace() {
        let cli = Cli::parse_from(["tfrun", "apply", "-w", "staging", "--yes"]);
        match cli.command {
            Command::Apply(args) => {
                assert_eq!(args.target.workspace.as_deref(), Some("staging"));
                assert!(args.yes);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_backend_arg_maps_to_kind() {
        assert_eq!(BackendKind::from(BackendArg::Terraform), BackendKind::Terraform);
        assert_eq!(BackendKind::from(BackendArg::Terragrunt), BackendKind::Terragrunt);
    }
}
