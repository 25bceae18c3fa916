use crate::config::{validate_provider, DEFAULT_ARCHIVE_NAME};
use crate::core::ConfigProvider;
use crate::domain::assignment::AssignmentSpec;
use crate::domain::model::DEFAULT_IMAGE;
use crate::utils::error::{Result, SplitError};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var regex"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    pub order: OrderConfig,
    #[serde(default)]
    pub people: PeopleConfig,
    #[serde(default)]
    pub assign: Vec<AssignmentSpec>,
    #[serde(default)]
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    pub store: String,
    pub receipt: String,
    pub placeholder_image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeopleConfig {
    #[serde(default, deserialize_with = "trimmed_names")]
    pub names: Vec<String>,
}

fn trimmed_names<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = Vec::<String>::deserialize(deserializer)?;
    Ok(names.into_iter().map(|name| name.trim().to_string()).collect())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

fn default_output_path() -> String {
    "./output".to_string()
}

fn default_output_formats() -> Vec<String> {
    vec!["csv".to_string(), "json".to_string()]
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            output_formats: default_output_formats(),
            compression: None,
        }
    }
}

impl SplitConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SplitError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SplitError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RECEIPT_DIR})；找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 命令列 --store 覆蓋設定檔
    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.order.store = store.into();
        self
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_provider(self)
    }
}

impl ConfigProvider for SplitConfig {
    fn store(&self) -> &str {
        &self.order.store
    }

    fn receipt_path(&self) -> &str {
        &self.order.receipt
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn people(&self) -> &[String] {
        &self.people.names
    }

    fn assignments(&self) -> &[AssignmentSpec] {
        &self.assign
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn archive_name(&self) -> Option<&str> {
        match &self.load.compression {
            Some(compression) if compression.enabled => Some(
                compression
                    .filename
                    .as_deref()
                    .unwrap_or(DEFAULT_ARCHIVE_NAME),
            ),
            _ => None,
        }
    }

    fn placeholder_image(&self) -> &str {
        self.order.placeholder_image.as_deref().unwrap_or(DEFAULT_IMAGE)
    }
}

impl Validate for SplitConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
