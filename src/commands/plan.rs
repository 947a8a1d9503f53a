//! `tfrun plan`

use anyhow::Result;
use serde::Serialize;
use std::time::Instant;
use tfkit::Echo;

use crate::Context;
use crate::cli::PlanArgs;
use crate::commands::{effective_config, print_target, report_failure};
use crate::config::{BackendKind, TfrunConfig};
use crate::ui;

/// Machine-readable summary printed with `--json`.
#[derive(Debug, Serialize)]
struct PlanSummary<'a> {
    backend: BackendKind,
    working_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    workspace: Option<&'a str>,
    has_changes: bool,
    duration_ms: u64,
}

impl<'a> PlanSummary<'a> {
    fn new(config: &'a TfrunConfig, has_changes: bool, duration_ms: u64) -> Self {
        let workspace = match config.backend {
            BackendKind::Terraform => Some(config.workspace.as_str()),
            BackendKind::Terragrunt => None,
        };
        Self {
            backend: config.backend,
            working_dir: config.working_dir_path().display().to_string(),
            workspace,
            has_changes,
            duration_ms,
        }
    }
}

/// Where the tool's stdout goes. `--json` keeps stdout for the summary line.
fn tool_echo(json: bool) -> Option<Echo> {
    if json {
        Some(Echo::Stderr)
    } else {
        Some(Echo::Stdout)
    }
}

pub fn run(ctx: &Context, args: PlanArgs) -> Result<()> {
    let loaded = effective_config(ctx, &args.target)?;
    let config = &loaded.config;

    if !ctx.quiet && !args.json {
        ui::header("Plan");
        print_target(config);
    }

    let executor = config.executor(tool_echo(args.json));
    let started = Instant::now();
    let report = match executor.plan() {
        Ok(report) => report,
        Err(failure) => {
            report_failure(&failure);
            return Err(anyhow::Error::new(failure).context("Plan failed"));
        }
    };
    let elapsed = started.elapsed();

    if args.json {
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let summary = PlanSummary::new(config, report.has_changes, duration_ms);
        println!("{}", serde_json::to_string(&summary)?);
        return Ok(());
    }

    println!();
    if report.has_changes {
        ui::warn(&format!(
            "Changes detected ({})",
            ui::format_duration(elapsed)
        ));
        if config.backend == BackendKind::Terragrunt {
            ui::dim("terragrunt plans always report changes; review the output above");
        }
        ui::dim("Run 'tfrun apply' to apply them");
    } else {
        ui::success(&format!(
            "No changes. Infrastructure matches the configuration ({})",
            ui::format_duration(elapsed)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_for_terraform() {
        let mut config = TfrunConfig::default();
        config.workspace = "staging".to_string();

        let json = serde_json::to_value(PlanSummary::new(&config, true, 42)).unwrap();
        assert_eq!(json["backend"], "terraform");
        assert_eq!(json["workspace"], "staging");
        assert_eq!(json["has_changes"], true);
        assert_eq!(json["duration_ms"], 42);
    }

    #[test]
    fn test_json_mode_keeps_tool_output_off_stdout() {
        assert_eq!(tool_echo(true), Some(Echo::Stderr));
        assert_eq!(tool_echo(false), Some(Echo::Stdout));
    }

    #[test]
    fn test_summary_for_terragrunt_omits_workspace() {
        let mut config = TfrunConfig::default();
        config.backend = BackendKind::Terragrunt;

        let json = serde_json::to_value(PlanSummary::new(&config, true, 0)).unwrap();
        assert_eq!(json["backend"], "terragrunt");
        assert!(json.get("workspace").is_none());
    }
}
