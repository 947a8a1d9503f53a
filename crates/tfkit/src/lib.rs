//! # tfkit
//!
//! Run Terraform and Terragrunt `plan`/`apply` behind one interface.
//!
//! Two executors implement [`Executor`]:
//! - [`Terragrunt`] shells out to `terragrunt <plan|apply> --working-dir <dir>`
//!   with color and interactive prompts disabled.
//! - [`Terraform`] drives the `terraform` binary step by step: init, make
//!   sure the configured workspace is selected (creating it if needed), then
//!   plan or apply.
//!
//! Output is echoed to the console while it is captured, so operators see a
//! run live and callers still get the text afterwards. When a run fails, the
//! [`Failure`] carries the partial output next to the error.
//!
//! Everything that actually provisions infrastructure (state, locking,
//! diffing) is left to the external tools.
//!
//! ## Example
//!
//! ```no_run
//! use tfkit::{Executor, Terraform, TerraformConfig};
//!
//! let tf = Terraform::new(TerraformConfig::new("./infra", "staging"));
//!
//! match tf.plan() {
//!     Ok(report) if report.has_changes => println!("changes pending"),
//!     Ok(_) => println!("nothing to do"),
//!     Err(failure) => {
//!         eprintln!("{}", failure.captured.stderr);
//!         eprintln!("plan failed: {failure}");
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod executor;
pub mod process;
pub mod sink;
pub mod types;

pub use error::{Error, Failure, Result, Stage};
pub use executor::{Executor, Terraform, Terragrunt};
pub use sink::{CaptureSink, Echo};
pub use types::{
    Captured, DEFAULT_WORKSPACE, PlanReport, TERRAFORM_BIN, TERRAGRUNT_BIN, TerraformConfig,
    TerragruntConfig,
};
