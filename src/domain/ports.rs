use crate::domain::assignment::AssignmentSpec;
use crate::domain::diagnostics::Diagnostics;
use crate::domain::model::{CanonicalItem, SplitReport};
use crate::utils::error::Result;
use scraper::Html;

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn store(&self) -> &str;
    fn receipt_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn people(&self) -> &[String];
    fn assignments(&self) -> &[AssignmentSpec];
    fn output_formats(&self) -> &[String];
    /// 壓縮輸出時的 zip 檔名；None 代表分別寫出各檔案
    fn archive_name(&self) -> Option<&str>;
    fn placeholder_image(&self) -> &str;
}

/// 單一收據版面的解析器。不可失敗：無法處理的項目記錄到 diagnostics 後略過。
pub trait ReceiptParser {
    fn parse(&self, document: &Html, diagnostics: &mut Diagnostics) -> Vec<CanonicalItem>;
}

pub trait Pipeline {
    fn extract(&self) -> Result<(Vec<CanonicalItem>, Diagnostics)>;
    fn transform(&self, items: Vec<CanonicalItem>, diagnostics: Diagnostics) -> Result<SplitReport>;
    fn load(&self, report: SplitReport) -> Result<String>;
}
