pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{cli::LocalStorage, toml_config::SplitConfig};

pub use crate::core::aggregate::aggregate;
pub use crate::core::allocation::allocate;
pub use crate::core::dedupe::dedupe;
pub use crate::core::receipt;
pub use crate::core::{etl::SplitEngine, pipeline::SplitPipeline};
pub use crate::domain::diagnostics::Diagnostics;
pub use crate::domain::model::{Allocation, CanonicalItem, SplitResult, SplitSummary, Store};
pub use crate::utils::error::{Result, SplitError};
