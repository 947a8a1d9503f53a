//! The plan/apply contract and its two implementations.
//!
//! - [`Terragrunt`] shells out to the `terragrunt` wrapper binary.
//! - [`Terraform`] drives Terraform through a [`Backend`](crate::backend::Backend),
//!   handling init and workspace selection itself.
//!
//! Callers pick one from configuration and only ever talk to [`Executor`].

pub mod terraform;
pub mod terragrunt;

pub use terraform::Terraform;
pub use terragrunt::Terragrunt;

use crate::error::Failure;
use crate::types::{Captured, PlanReport};

/// Runs `plan` and `apply` against some infrastructure code.
///
/// Both operations block until the underlying tool finishes. On failure the
/// returned [`Failure`] still carries whatever output was captured.
pub trait Executor {
    /// Apply changes to real infrastructure.
    fn apply(&self) -> Result<Captured, Failure>;

    /// Compute the change set without applying it.
    fn plan(&self) -> Result<PlanReport, Failure>;
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn apply(&self) -> Result<Captured, Failure> {
        (**self).apply()
    }

    fn plan(&self) -> Result<PlanReport, Failure> {
        (**self).plan()
    }
}
