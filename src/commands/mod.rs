//! Command implementations for the tfrun CLI.

pub mod apply;
pub mod config;
pub mod doctor;
pub mod plan;

use anyhow::Result;
use tfkit::Failure;

use crate::Context;
use crate::cli::TargetArgs;
use crate::config::{BackendKind, LoadedConfig, TfrunConfig};
use crate::ui;

/// Lines of captured stderr shown when a run fails.
const STDERR_TAIL_LINES: usize = 20;

/// Load the config file, apply flag overrides and validate the result.
pub(crate) fn effective_config(ctx: &Context, target: &TargetArgs) -> Result<LoadedConfig> {
    let mut loaded = TfrunConfig::load(ctx.config.as_deref())?;
    loaded.config.apply_overrides(target);
    loaded.config.validate()?;
    Ok(loaded)
}

/// Print what is about to run.
pub(crate) fn print_target(config: &TfrunConfig) {
    ui::kv("Backend", &format!("{} ({})", config.backend, config.backend_bin()));
    ui::kv("Directory", &config.working_dir_path().display().to_string());
    if config.backend == BackendKind::Terraform {
        ui::kv("Workspace", &config.workspace);
    }
    println!();
}

/// Print the diagnostic tail of a failed run.
///
/// The error itself is left to the caller, which returns it from `main`.
pub(crate) fn report_failure(failure: &Failure) {
    let stderr = failure.captured.stderr.trim();
    if stderr.is_empty() {
        return;
    }
    println!();
    ui::dim("stderr (last lines):");
    for line in ui::tail(stderr, STDERR_TAIL_LINES).lines() {
        ui::dim(line);
    }
    println!();
}
