//! `tfrun apply`

use anyhow::{Context as _, Result};
use std::io::IsTerminal;
use std::time::Instant;
use tfkit::Echo;

use crate::Context;
use crate::cli::ApplyArgs;
use crate::commands::{effective_config, print_target, report_failure};
use crate::config::TfrunConfig;
use crate::ui;

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let loaded = effective_config(ctx, &args.target)?;
    let config = &loaded.config;

    if !ctx.quiet {
        ui::header("Apply");
        print_target(config);
    }

    if needs_confirmation(args.yes, std::io::stdin().is_terminal()) && !confirm_apply(config)? {
        ui::info("Apply cancelled");
        return Ok(());
    }

    let executor = config.executor(Some(Echo::Stdout));
    let started = Instant::now();
    if let Err(failure) = executor.apply() {
        report_failure(&failure);
        return Err(anyhow::Error::new(failure).context("Apply failed"));
    }

    println!();
    ui::success(&format!(
        "Apply complete ({})",
        ui::format_duration(started.elapsed())
    ));
    Ok(())
}

/// Prompt only when someone is there to answer.
fn needs_confirmation(yes: bool, interactive: bool) -> bool {
    !yes && interactive
}

/// Confirm with user
fn confirm_apply(config: &TfrunConfig) -> Result<bool> {
    let prompt = format!(
        "Apply changes in {} with {}?",
        config.working_dir_path().display(),
        config.backend
    );

    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_confirmation() {
        assert!(needs_confirmation(false, true));
        assert!(!needs_confirmation(true, true));
        assert!(!needs_confirmation(false, false));
        assert!(!needs_confirmation(true, false));
    }
}
