pub mod aggregate;
pub mod allocation;
pub mod assign;
pub mod dedupe;
pub mod etl;
pub mod fields;
pub mod pipeline;
pub mod receipt;
pub mod report;

pub use crate::domain::diagnostics::Diagnostics;
pub use crate::domain::model::{Allocation, CanonicalItem, SplitReport, Store};
pub use crate::domain::ports::{ConfigProvider, Pipeline, ReceiptParser, Storage};
pub use crate::utils::error::Result;
