//! Executor that drives Terraform directly through a [`Backend`].
//!
//! Unlike [`Terragrunt`](super::Terragrunt) this executor manages the
//! workspace lifecycle itself: every call initializes the working directory,
//! checks which workspace is selected and creates the configured one when it
//! is not, then plans or applies.
//!
//! The two operations treat stderr differently. `apply` captures stdout only
//! and lets Terraform's stderr go straight to the console, so its result
//! always has an empty `stderr`. `plan` captures both.

use std::io;

use super::Executor;
use crate::backend::{self, Backend, Handle, InitOptions, Streams};
use crate::error::{Failure, Result, Stage};
use crate::sink::{CaptureSink, Echo};
use crate::types::{Captured, PlanReport, TerraformConfig};

/// Plans and applies with Terraform against a named workspace.
pub struct Terraform {
    config: TerraformConfig,
    backend: Box<dyn Backend>,
}

impl Terraform {
    /// Create an executor using the real `terraform` CLI backend.
    pub fn new(config: TerraformConfig) -> Self {
        Self::with_backend(config, Box::new(backend::default_backend()))
    }

    /// Create an executor with a custom backend (useful for testing).
    pub fn with_backend(config: TerraformConfig, backend: Box<dyn Backend>) -> Self {
        Self { config, backend }
    }

    fn open(&self) -> Result<Box<dyn Handle>> {
        self.backend.open(&self.config.working_dir, &self.config.exec_path)
    }

    /// Init, then make sure the configured workspace is the selected one.
    fn prepare(
        &self,
        tf: &mut dyn Handle,
        streams: &mut Streams<'_>,
        init: InitOptions,
    ) -> Result<()> {
        tf.init(streams, init).map_err(|e| {
            log::debug!("terraform init failed in {}", self.config.working_dir.display());
            e.at(Stage::Init)
        })?;

        let current = tf.workspace_show(streams).map_err(|e| {
            log::warn!(
                "terraform workspace show failed. workspace: {} . dir: {}",
                self.config.workspace,
                self.config.working_dir.display()
            );
            e.at(Stage::WorkspaceShow)
        })?;

        if current != self.config.workspace {
            log::info!(
                "Switching workspace from '{}' to '{}'",
                current,
                self.config.workspace
            );
            tf.workspace_new(streams, &self.config.workspace).map_err(|e| {
                log::warn!(
                    "terraform workspace new failed. workspace: {} . dir: {}",
                    self.config.workspace,
                    self.config.working_dir.display()
                );
                e.at(Stage::WorkspaceNew)
            })?;
        }

        Ok(())
    }
}

impl Executor for Terraform {
    fn apply(&self) -> std::result::Result<Captured, Failure> {
        log::info!(
            "terraform apply in {} (workspace {})",
            self.config.working_dir.display(),
            self.config.workspace
        );

        let mut handle = self.open().map_err(Failure::bare)?;
        let tf: &mut dyn Handle = &mut *handle;

        let mut stdout = CaptureSink::with_echo(self.config.echo);
        let result = {
            let mut streams = Streams::stdout_only(&mut stdout);
            self.prepare(tf, &mut streams, InitOptions::upgrade(false))
                .and_then(|()| tf.apply(&mut streams).map_err(|e| e.at(Stage::Apply)))
        };
        flush_console();

        let captured = Captured::stdout_only(stdout.into_string());
        match result {
            Ok(()) => Ok(captured),
            Err(e) => Err(Failure::new(e, captured)),
        }
    }

    fn plan(&self) -> std::result::Result<PlanReport, Failure> {
        log::info!(
            "terraform plan in {} (workspace {})",
            self.config.working_dir.display(),
            self.config.workspace
        );

        let mut handle = self.open().map_err(Failure::bare)?;
        let tf: &mut dyn Handle = &mut *handle;

        let mut stdout = CaptureSink::with_echo(self.config.echo);
        let mut stderr = CaptureSink::echoing(Echo::Stderr);
        let result = {
            let mut streams = Streams::both(&mut stdout, &mut stderr);
            self.prepare(tf, &mut streams, InitOptions::upgrade(true))
                .and_then(|()| tf.plan(&mut streams).map_err(|e| e.at(Stage::Plan)))
        };
        flush_console();

        let captured = Captured::new(stdout.into_string(), stderr.into_string());
        match result {
            Ok(has_changes) => Ok(PlanReport {
                has_changes,
                captured,
            }),
            Err(e) => {
                if e.stage() == Some(Stage::Plan) {
                    log::debug!(
                        "terraform plan failed. dir: {}",
                        self.config.working_dir.display()
                    );
                }
                Err(Failure::new(e, captured))
            }
        }
    }
}

fn flush_console() {
    use std::io::Write;

    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
}

impl std::fmt::Debug for Terraform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terraform")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Whether a failure happened before Terraform could even be started.
pub fn is_handle_failure(failure: &Failure) -> bool {
    failure.error.is_handle_error()
}
