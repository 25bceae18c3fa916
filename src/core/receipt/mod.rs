//! 收據解析入口：依商店選擇對應的版面解析器。

pub mod asda;
pub mod tesco;

use crate::core::dedupe::dedupe;
use crate::domain::diagnostics::Diagnostics;
use crate::domain::model::{CanonicalItem, Store, DEFAULT_IMAGE};
use crate::domain::ports::ReceiptParser;
use scraper::Html;

pub use asda::AsdaParser;
pub use tesco::TescoParser;

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub placeholder_image: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            placeholder_image: DEFAULT_IMAGE.to_string(),
        }
    }
}

/// 依商店解析，不去重
pub fn parse_store(
    store: Store,
    document: &Html,
    options: &ParseOptions,
    diagnostics: &mut Diagnostics,
) -> Vec<CanonicalItem> {
    let items = match store {
        Store::Asda => AsdaParser::new(&options.placeholder_image).parse(document, diagnostics),
        Store::Tesco => TescoParser::new(&options.placeholder_image).parse(document, diagnostics),
    };

    tracing::info!(
        "Successfully processed {} items for {} ({} skipped)",
        items.len(),
        store.display_name(),
        diagnostics.skipped().len()
    );
    items
}

/// 以商店代號解析。未知代號回傳空清單並記錄錯誤，不會失敗。
pub fn parse(store_id: &str, document: &Html, diagnostics: &mut Diagnostics) -> Vec<CanonicalItem> {
    match Store::from_id(store_id) {
        Some(store) => parse_store(store, document, &ParseOptions::default(), diagnostics),
        None => {
            diagnostics.error(format!("Unknown store choice: {}", store_id));
            Vec::new()
        }
    }
}

/// 解析並去重，得到標準商品清單
pub fn extract_items(
    store: Store,
    document: &Html,
    options: &ParseOptions,
    diagnostics: &mut Diagnostics,
) -> Vec<CanonicalItem> {
    let raw = parse_store(store, document, options, diagnostics);
    let raw_count = raw.len();
    let items = dedupe(raw);

    if items.len() < raw_count {
        diagnostics.info(format!(
            "Dropped {} duplicate items",
            raw_count - items.len()
        ));
    }
    items
}

pub fn extract_items_from_html(
    store: Store,
    html: &str,
    options: &ParseOptions,
    diagnostics: &mut Diagnostics,
) -> Vec<CanonicalItem> {
    let document = Html::parse_document(html);
    extract_items(store, &document, options, diagnostics)
}
