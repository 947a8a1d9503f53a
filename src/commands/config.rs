//! `tfrun config`

use anyhow::Result;

use crate::Context;
use crate::cli::{ConfigCommand, TargetArgs};
use crate::commands::effective_config;
use crate::paths;
use crate::ui;

pub fn run(ctx: &Context, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show(target) => show(ctx, &target),
    }
}

fn show(ctx: &Context, target: &TargetArgs) -> Result<()> {
    let loaded = effective_config(ctx, target)?;
    let config = &loaded.config;

    ui::header("Configuration");
    match &loaded.source {
        Some(path) => ui::kv("File", &path.display().to_string()),
        None => ui::kv("File", "(none, using defaults)"),
    }
    println!();

    ui::kv("backend", &config.backend.to_string());
    ui::kv("working_dir", &config.working_dir);
    ui::kv("workspace", &config.workspace);
    ui::kv("terraform.bin", &config.terraform.bin);
    ui::kv("terragrunt.bin", &config.terragrunt.bin);

    println!();
    ui::dim("As TOML:");
    for line in toml::to_string_pretty(config)?.lines() {
        ui::dim(line);
    }

    println!();
    ui::dim(&format!(
        "Lookup order: --config, ${}, ./{}, {}",
        paths::ENV_CONFIG,
        paths::LOCAL_CONFIG_FILE,
        paths::user_config_dir()
            .map(|d| d.join("config.toml").display().to_string())
            .unwrap_or_else(|| "<config dir>/tfrun/config.toml".to_string())
    ));

    Ok(())
}
