//! tfrun configuration (`tfrun.toml`)
//!
//! ```toml
//! backend = "terraform"      # or "terragrunt"
//! working_dir = "./infra"
//! workspace = "staging"
//!
//! [terraform]
//! bin = "terraform"
//!
//! [terragrunt]
//! bin = "terragrunt"
//! ```
//!
//! Every key is optional; flags on the command line override the file.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use tfkit::{
    DEFAULT_WORKSPACE, Echo, Executor, TERRAFORM_BIN, TERRAGRUNT_BIN, Terraform,
    TerraformConfig, Terragrunt, TerragruntConfig,
};

use crate::cli::TargetArgs;
use crate::paths;

// ============================================================================
// Schema
// ============================================================================

/// Which tool runs plan/apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Drive terraform directly, managing init and workspaces
    #[default]
    Terraform,
    /// Delegate to the terragrunt wrapper
    Terragrunt,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terraform => f.write_str("terraform"),
            Self::Terragrunt => f.write_str("terragrunt"),
        }
    }
}

/// The tfrun configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TfrunConfig {
    /// Backend used for plan/apply
    #[serde(default)]
    pub backend: BackendKind,

    /// Directory holding the infrastructure code
    #[serde(default = "default_working_dir")]
    pub working_dir: String,

    /// Terraform workspace (ignored by terragrunt)
    #[serde(default = "default_workspace")]
    pub workspace: String,

    /// Terraform settings
    #[serde(default)]
    pub terraform: TerraformSection,

    /// Terragrunt settings
    #[serde(default)]
    pub terragrunt: TerragruntSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraformSection {
    /// Terraform executable
    #[serde(default = "default_terraform_bin")]
    pub bin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerragruntSection {
    /// Terragrunt executable
    #[serde(default = "default_terragrunt_bin")]
    pub bin: String,
}

fn default_working_dir() -> String {
    ".".to_string()
}

fn default_workspace() -> String {
    DEFAULT_WORKSPACE.to_string()
}

fn default_terraform_bin() -> String {
    TERRAFORM_BIN.to_string()
}

fn default_terragrunt_bin() -> String {
    TERRAGRUNT_BIN.to_string()
}

impl Default for TfrunConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            working_dir: default_working_dir(),
            workspace: default_workspace(),
            terraform: TerraformSection::default(),
            terragrunt: TerragruntSection::default(),
        }
    }
}

impl Default for TerraformSection {
    fn default() -> Self {
        Self {
            bin: default_terraform_bin(),
        }
    }
}

impl Default for TerragruntSection {
    fn default() -> Self {
        Self {
            bin: default_terragrunt_bin(),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// A config together with the file it came from.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: TfrunConfig,
    /// `None` when built-in defaults are in use
    pub source: Option<PathBuf>,
}

impl TfrunConfig {
    /// Load the config, following the resolution order in [`paths`].
    pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
        match paths::config_file(explicit)? {
            Some(path) => Ok(LoadedConfig {
                config: Self::load_from(&path)?,
                source: Some(path),
            }),
            None => Ok(LoadedConfig {
                config: Self::default(),
                source: None,
            }),
        }
    }

    /// Load and parse a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))
    }

    /// Parse config from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply command-line overrides.
    pub fn apply_overrides(&mut self, args: &TargetArgs) {
        if let Some(backend) = args.backend {
            self.backend = backend.into();
        }
        if let Some(dir) = &args.working_dir {
            self.working_dir.clone_from(dir);
        }
        if let Some(workspace) = &args.workspace {
            self.workspace.clone_from(workspace);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.working_dir.trim().is_empty() {
            bail!("working_dir must not be empty");
        }

        validate_workspace_name(&self.workspace)?;

        if self.terraform.bin.trim().is_empty() {
            bail!("terraform.bin must not be empty");
        }
        if self.terragrunt.bin.trim().is_empty() {
            bail!("terragrunt.bin must not be empty");
        }

        Ok(())
    }

    /// Working directory with `~` and variables expanded.
    pub fn working_dir_path(&self) -> PathBuf {
        paths::expand_path(&self.working_dir)
    }

    /// Executable for the selected backend.
    pub fn backend_bin(&self) -> &str {
        match self.backend {
            BackendKind::Terraform => &self.terraform.bin,
            BackendKind::Terragrunt => &self.terragrunt.bin,
        }
    }

    /// Build the executor for the selected backend, mirroring the tool's
    /// stdout to `echo`.
    pub fn executor(&self, echo: Option<Echo>) -> Box<dyn Executor> {
        match self.backend {
            BackendKind::Terraform => Box::new(Terraform::new(self.terraform_config(echo))),
            BackendKind::Terragrunt => Box::new(Terragrunt::new(self.terragrunt_config(echo))),
        }
    }

    fn terraform_config(&self, echo: Option<Echo>) -> TerraformConfig {
        TerraformConfig::new(self.working_dir_path(), &self.workspace)
            .with_exec_path(&self.terraform.bin)
            .with_echo(echo)
    }

    fn terragrunt_config(&self, echo: Option<Echo>) -> TerragruntConfig {
        TerragruntConfig::new(self.working_dir_path())
            .with_program(&self.terragrunt.bin)
            .with_echo(echo)
    }
}

/// Workspace names end up in state paths, so keep them to a single segment.
pub fn validate_workspace_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("workspace must not be empty");
    }
    if name.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\') {
        bail!("Invalid workspace name '{name}': no whitespace or path separators allowed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::BackendArg;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = TfrunConfig::parse("").unwrap();
        assert_eq!(config, TfrunConfig::default());
        assert_eq!(config.backend, BackendKind::Terraform);
        assert_eq!(config.working_dir, ".");
        assert_eq!(config.workspace, "default");
        assert_eq!(config.terraform.bin, "terraform");
        assert_eq!(config.terragrunt.bin, "terragrunt");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
backend = "terragrunt"
working_dir = "live/prod"
workspace = "prod"

[terraform]
bin = "/opt/terraform/1.9/terraform"

[terragrunt]
bin = "tg"
"#;
        let config = TfrunConfig::parse(toml).unwrap();
        assert_eq!(config.backend, BackendKind::Terragrunt);
        assert_eq!(config.working_dir, "live/prod");
        assert_eq!(config.workspace, "prod");
        assert_eq!(config.terraform.bin, "/opt/terraform/1.9/terraform");
        assert_eq!(config.backend_bin(), "tg");
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config = TfrunConfig::parse("[terragrunt]\n").unwrap();
        assert_eq!(config.terragrunt.bin, "terragrunt");
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(TfrunConfig::parse("backend = \"pulumi\"").is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = TfrunConfig::default();
        config.apply_overrides(&TargetArgs {
            backend: Some(BackendArg::Terragrunt),
            working_dir: Some("./infra".to_string()),
            workspace: None,
        });

        assert_eq!(config.backend, BackendKind::Terragrunt);
        assert_eq!(config.working_dir, "./infra");
        assert_eq!(config.workspace, "default");
    }

    #[test]
    fn test_validate() {
        assert!(TfrunConfig::default().validate().is_ok());

        let mut config = TfrunConfig::default();
        config.workspace = "my workspace".to_string();
        assert!(config.validate().is_err());

        let mut config = TfrunConfig::default();
        config.working_dir = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = TfrunConfig::default();
        config.terraform.bin = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_workspace_names() {
        assert!(validate_workspace_name("staging").is_ok());
        assert!(validate_workspace_name("feature-123_x").is_ok());
        assert!(validate_workspace_name("").is_err());
        assert!(validate_workspace_name("a/b").is_err());
        assert!(validate_workspace_name("a\\b").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tfrun.toml");
        std::fs::write(&path, "workspace = \"staging\"\n").unwrap();

        let loaded = TfrunConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
        assert_eq!(loaded.config.workspace, "staging");
    }

    #[test]
    fn test_load_from_invalid_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tfrun.toml");
        std::fs::write(&path, "backend = [").unwrap();

        let err = TfrunConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_executor_configs_carry_settings() {
        let mut config = TfrunConfig::default();
        config.working_dir = "/srv/infra".to_string();
        config.workspace = "prod".to_string();
        config.terraform.bin = "/opt/tf".to_string();

        let tf = config.terraform_config(Some(Echo::Stderr));
        assert_eq!(tf.working_dir, PathBuf::from("/srv/infra"));
        assert_eq!(tf.workspace, "prod");
        assert_eq!(tf.exec_path, "/opt/tf");
        assert_eq!(tf.echo, Some(Echo::Stderr));

        let tg = config.terragrunt_config(None);
        assert_eq!(tg.program, "terragrunt");
        assert_eq!(tg.echo, None);
    }

    #[test]
    fn test_backend_display_matches_serde() {
        assert_eq!(BackendKind::Terraform.to_string(), "terraform");
        assert_eq!(BackendKind::Terragrunt.to_string(), "terragrunt");
    }
}
