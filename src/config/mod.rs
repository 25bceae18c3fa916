pub mod cli;
pub mod toml_config;

use crate::core::{ConfigProvider, Store};
use crate::utils::error::{Result, SplitError};
use crate::utils::validation::{
    validate_file_extension, validate_output_formats, validate_path, validate_people,
    validate_url, RECEIPT_EXTENSIONS,
};
#[cfg(feature = "cli")]
use crate::{domain::assignment::AssignmentSpec, utils::validation::Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_ARCHIVE_NAME: &str = "receipt_split.zip";

/// `--people "Alice, Bob"` 的逗號後空白不算名字
#[cfg(feature = "cli")]
fn parse_person(value: &str) -> std::result::Result<String, String> {
    Ok(value.trim().to_string())
}

/// 兩種設定來源共用的檢查：商店、路徑、格式、人名、預設圖片
pub(crate) fn validate_provider(config: &impl ConfigProvider) -> Result<()> {
    if Store::from_id(config.store()).is_none() {
        return Err(SplitError::UnknownStore {
            store: config.store().to_string(),
        });
    }

    validate_path("receipt", config.receipt_path())?;
    validate_file_extension("receipt", config.receipt_path(), &RECEIPT_EXTENSIONS)?;
    validate_path("output_path", config.output_path())?;
    validate_output_formats("output_formats", config.output_formats())?;
    validate_people("people", config.people())?;
    validate_url("placeholder_image", config.placeholder_image())?;

    if let Some(name) = config.archive_name() {
        validate_file_extension("archive_name", name, &["zip"])?;
    }
    Ok(())
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "receipt-split")]
#[command(about = "Split a saved supermarket order page between buyers")]
pub struct CliConfig {
    #[arg(long, help = "Store the receipt came from (asda, tesco)")]
    pub store: String,

    #[arg(long, help = "Saved order page (.html)")]
    pub receipt: String,

    #[arg(
        long,
        value_delimiter = ',',
        value_parser = parse_person,
        help = "People sharing the order"
    )]
    pub people: Vec<String>,

    #[arg(
        long = "assign",
        help = "Item assignment, e.g. \"2=Alice:1,Bob:1\" or \"Milk=*\" (repeatable)"
    )]
    pub assignments: Vec<AssignmentSpec>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(
        long = "format",
        value_delimiter = ',',
        default_values_t = ["csv".to_string(), "json".to_string()]
    )]
    pub output_formats: Vec<String>,

    #[arg(long, help = "Bundle the reports into one zip file")]
    pub compress: bool,

    #[arg(long, default_value = crate::domain::model::DEFAULT_IMAGE)]
    pub placeholder_image: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit log events as JSON lines")]
    pub json_log: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn store(&self) -> &str {
        &self.store
    }

    fn receipt_path(&self) -> &str {
        &self.receipt
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn people(&self) -> &[String] {
        &self.people
    }

    fn assignments(&self) -> &[AssignmentSpec] {
        &self.assignments
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn archive_name(&self) -> Option<&str> {
        self.compress.then_some(DEFAULT_ARCHIVE_NAME)
    }

    fn placeholder_image(&self) -> &str {
        &self.placeholder_image
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
