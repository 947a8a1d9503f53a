//! `tfrun doctor`: check that plan/apply can run.

use anyhow::Result;
use colored::Colorize;

use tfkit::backend::cli::find_executable;

use crate::Context;
use crate::cli::TargetArgs;
use crate::config::{BackendKind, TfrunConfig};
use crate::paths;
use crate::ui;

struct Issue {
    category: &'static str,
    summary: String,
    fix: Option<String>,
}

pub fn run(ctx: &Context, target: TargetArgs) -> Result<()> {
    ui::header("tfrun Health Check");

    let mut issues: Vec<Issue> = Vec::new();

    // Config must load before anything else can be checked
    let config = match TfrunConfig::load(ctx.config.as_deref()) {
        Ok(mut loaded) => {
            match &loaded.source {
                Some(path) => ui::success(&format!("Config: {}", path.display())),
                None => ui::info("Config: none found, using defaults"),
            }
            loaded.config.apply_overrides(&target);
            if let Err(e) = loaded.config.validate() {
                issues.push(Issue {
                    category: "config",
                    summary: format!("Invalid configuration: {e}"),
                    fix: Some("Fix the value in tfrun.toml or pass a flag override".to_string()),
                });
            }
            loaded.config
        }
        Err(e) => {
            issues.push(Issue {
                category: "config",
                summary: format!("Could not load config: {e:#}"),
                fix: Some(format!(
                    "Check --config / ${} or the TOML syntax",
                    paths::ENV_CONFIG
                )),
            });
            TfrunConfig::default()
        }
    };

    check_tools(&config, &mut issues);
    check_working_dir(&config, &mut issues);

    println!();
    if issues.is_empty() {
        ui::success("Ready to plan and apply");
    } else {
        print_issue_summary(&issues);
    }

    Ok(())
}

fn check_tools(config: &TfrunConfig, issues: &mut Vec<Issue>) {
    let tools = [
        (BackendKind::Terraform, config.terraform.bin.as_str()),
        (BackendKind::Terragrunt, config.terragrunt.bin.as_str()),
    ];

    for (kind, bin) in tools {
        match find_executable(bin) {
            Some(path) => ui::success(&format!("{kind}: {}", path.display())),
            None if kind == config.backend => issues.push(Issue {
                category: "tools",
                summary: format!("{kind} not found ({bin}), but it is the selected backend"),
                fix: Some(format!("Install {kind} or set {kind}.bin in tfrun.toml")),
            }),
            // Terragrunt also needs terraform underneath
            None if kind == BackendKind::Terraform => issues.push(Issue {
                category: "tools",
                summary: format!("terraform not found ({bin}); terragrunt runs it underneath"),
                fix: Some("Install terraform".to_string()),
            }),
            None => ui::dim(&format!("{kind} not found (not selected)")),
        }
    }
}

fn check_working_dir(config: &TfrunConfig, issues: &mut Vec<Issue>) {
    let dir = config.working_dir_path();
    if dir.is_dir() {
        ui::success(&format!("Working directory: {}", dir.display()));
    } else {
        issues.push(Issue {
            category: "workdir",
            summary: format!("Working directory not found: {}", dir.display()),
            fix: Some("Pass -d <DIR> or set working_dir in tfrun.toml".to_string()),
        });
    }
}

fn print_issue_summary(issues: &[Issue]) {
    let count = issues.len();
    let label = if count == 1 { "Issue" } else { "Issues" };
    ui::header(&format!("{count} {label} Found"));

    for (i, issue) in issues.iter().enumerate() {
        let num = i + 1;
        println!(
            "  {}  {} {}",
            format!("{num}.").bold(),
            issue.summary,
            format!("[{}]", issue.category).dimmed()
        );
        if let Some(fix) = &issue.fix {
            println!("      {} {}", "Fix:".cyan(), fix);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_working_dir_is_an_issue() {
        let mut config = TfrunConfig::default();
        config.working_dir = "/definitely/not/here".to_string();

        let mut issues = Vec::new();
        check_working_dir(&config, &mut issues);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, "workdir");
    }

    #[test]
    fn test_existing_working_dir_passes() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = TfrunConfig::default();
        config.working_dir = tmp.path().display().to_string();

        let mut issues = Vec::new();
        check_working_dir(&config, &mut issues);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_missing_selected_tool_is_an_issue() {
        let mut config = TfrunConfig::default();
        config.backend = BackendKind::Terragrunt;
        config.terragrunt.bin = "tfrun-no-such-terragrunt".to_string();
        config.terraform.bin = "tfrun-no-such-terraform".to_string();

        let mut issues = Vec::new();
        check_tools(&config, &mut issues);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.category == "tools"));
    }

    #[test]
    fn test_unselected_terragrunt_is_not_an_issue() {
        let mut config = TfrunConfig::default();
        config.terraform.bin = "sh".to_string();
        config.terragrunt.bin = "tfrun-no-such-terragrunt".to_string();

        let mut issues = Vec::new();
        check_tools(&config, &mut issues);
        assert!(issues.is_empty());
    }
}
