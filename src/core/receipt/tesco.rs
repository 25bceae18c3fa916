//! Tesco 收據：商品在「Rest of your items」標題所屬的 `<article>` 區塊內。

use crate::core::fields::{element_text, parse_price, safe_attr};
use crate::domain::diagnostics::Diagnostics;
use crate::domain::model::{CanonicalItem, RowOutcome, SkipReason};
use crate::domain::ports::ReceiptParser;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

const LAYOUT: &str = "tesco";
const SECTION_HEADING: &str = "Rest of your items";

static H3_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3").expect("valid h3 selector"));
static BLOCK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.styled__ProductContentWrapper-mfe-orders__sc-1hj3has-7")
        .expect("valid product block selector")
});
static NAME_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[data-testid="product-title"] a"#).expect("valid name selector")
});
static QUANTITY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.styled__SmallOnlyText-mfe-orders__sc-1hj3has-9")
        .expect("valid quantity selector")
});
static IMAGE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"img[data-testid="product-image"]"#).expect("valid image selector")
});
static PRICE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"h4[data-testid="receipt-total-price"]"#).expect("valid price selector")
});

pub struct TescoParser<'a> {
    placeholder_image: &'a str,
}

impl<'a> TescoParser<'a> {
    pub fn new(placeholder_image: &'a str) -> Self {
        Self { placeholder_image }
    }

    /// 找到標題後往上找最近的 `<article>`
    fn find_section<'d>(&self, document: &'d Html) -> Option<ElementRef<'d>> {
        let heading = document
            .select(&H3_SELECTOR)
            .find(|h3| element_text(*h3) == SECTION_HEADING)?;

        heading
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "article")
    }

    fn parse_block(&self, block: ElementRef<'_>, diagnostics: &mut Diagnostics) -> RowOutcome {
        let name = block
            .select(&NAME_SELECTOR)
            .next()
            .map(element_text)
            .unwrap_or_default();
        if name.is_empty() {
            return Err(SkipReason::MissingField("name"));
        }

        let label = block
            .select(&QUANTITY_SELECTOR)
            .next()
            .map(|tag| tag.text().collect::<String>())
            .filter(|text| text.contains("Quantity"));
        let quantity = match label {
            Some(text) => parse_quantity_label(&text).unwrap_or_else(|| {
                diagnostics.warn(format!(
                    "'{}': unreadable quantity label '{}', using 1",
                    name,
                    text.trim()
                ));
                1
            }),
            None => 1,
        };
        if quantity == 0 {
            return Err(SkipReason::ZeroQuantity);
        }

        let image_tag = block.select(&IMAGE_SELECTOR).next();
        let weight = image_tag
            .and_then(|img| img.value().attr("alt"))
            .and_then(weight_from_alt)
            .unwrap_or_default();

        let price_text = block
            .select(&PRICE_SELECTOR)
            .next()
            .map(element_text)
            .ok_or(SkipReason::MissingField("price"))?;
        let price = parse_price(&price_text).ok_or(SkipReason::UnparsablePrice(price_text))?;

        let image = safe_attr(image_tag, "src", self.placeholder_image);

        Ok(CanonicalItem {
            name,
            quantity,
            weight,
            price,
            image,
        })
    }
}

/// "Quantity: 3" → 3；格式不對時回傳 None
fn parse_quantity_label(text: &str) -> Option<u32> {
    text.split(':').nth(1)?.trim().parse::<u32>().ok()
}

/// 圖片 alt 文字的最後一個字若含數字 (例如 "500g") 才當作重量
fn weight_from_alt(alt: &str) -> Option<String> {
    alt.split_whitespace()
        .last()
        .filter(|token| token.chars().any(|c| c.is_ascii_digit()))
        .map(str::to_string)
}

impl ReceiptParser for TescoParser<'_> {
    fn parse(&self, document: &Html, diagnostics: &mut Diagnostics) -> Vec<CanonicalItem> {
        let Some(section) = self.find_section(document) else {
            diagnostics.warn(format!(
                "No items found in the '{}' section",
                SECTION_HEADING
            ));
            return Vec::new();
        };

        let mut items = Vec::new();
        for (index, block) in section.select(&BLOCK_SELECTOR).enumerate() {
            match self.parse_block(block, diagnostics) {
                Ok(item) => items.push(item),
                Err(reason) => diagnostics.skip(LAYOUT, index, reason),
            }
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diagnostics::Severity;
    use crate::domain::model::DEFAULT_IMAGE;
    use rust_decimal_macros::dec;

    fn block(name: &str, quantity: &str, alt: &str, price: &str) -> String {
        format!(
            r#"<div class="styled__ProductContentWrapper-mfe-orders__sc-1hj3has-7">
                <img data-testid="product-image" src="https://img.example/{name}.jpg" alt="{alt}">
                <div data-testid="product-title"><a href="/p/1">{name}</a></div>
                <div class="styled__SmallOnlyText-mfe-orders__sc-1hj3has-9">{quantity}</div>
                <h4 data-testid="receipt-total-price">{price}</h4>
            </div>"#
        )
    }

    fn document(blocks: &str) -> Html {
        Html::parse_document(&format!(
            r#"<main><article><section><h3>Substitutions</h3></section></article>
            <article><div><h3>Rest of your items</h3></div>{blocks}</article></main>"#
        ))
    }

    fn parse(document: &Html) -> (Vec<CanonicalItem>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let items = TescoParser::new(DEFAULT_IMAGE).parse(document, &mut diagnostics);
        (items, diagnostics)
    }

    #[test]
    fn test_parses_blocks_in_section() {
        let blocks = [
            block("Tesco Greek Yogurt", "Quantity: 2", "Tesco Greek Style Yogurt 500g", "£2.50"),
            block("Tesco Lemons", "", "Tesco Unwaxed Lemons", "£0.95"),
        ]
        .concat();
        let (items, diagnostics) = parse(&document(&blocks));

        assert!(diagnostics.is_empty());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].weight, "500g");
        assert_eq!(items[0].price, dec!(2.50));
        assert_eq!(items[0].image, "https://img.example/Tesco Greek Yogurt.jpg");
        assert_eq!(items[1].quantity, 1);
        assert_eq!(items[1].weight, "");
    }

    #[test]
    fn test_unreadable_quantity_defaults_to_one() {
        let blocks = block("Tesco Carrots", "Quantity: lots", "Tesco Carrots 1Kg", "£0.60");
        let (items, diagnostics) = parse(&document(&blocks));
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[0].weight, "1Kg");

        let warnings: Vec<_> = diagnostics.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("Quantity: lots"));
    }

    #[test]
    fn test_skips_blocks_without_name_or_price() {
        let blocks = [
            block("", "Quantity: 1", "", "£1.00"),
            block("Tesco Basil", "Quantity: 1", "", ""),
            block("Tesco Rocket", "Quantity: 0", "", "£1.00"),
            block("Tesco Mint", "Quantity: 1", "", "£0.80"),
        ]
        .concat();
        let (items, diagnostics) = parse(&document(&blocks));

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Tesco Mint");
        assert_eq!(items[0].image, "https://img.example/Tesco Mint.jpg");
        let reasons: Vec<&SkipReason> = diagnostics.skipped().iter().map(|s| &s.reason).collect();
        assert_eq!(
            reasons,
            vec![
                &SkipReason::MissingField("name"),
                &SkipReason::UnparsablePrice(String::new()),
                &SkipReason::ZeroQuantity,
            ]
        );
    }

    #[test]
    fn test_missing_section_returns_empty_with_warning() {
        let html = Html::parse_document(&block("Tesco Mint", "Quantity: 1", "", "£0.80"));
        let (items, diagnostics) = parse(&html);

        assert!(items.is_empty());
        assert_eq!(diagnostics.entries()[0].severity, Severity::Warning);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn test_weight_from_alt() {
        assert_eq!(weight_from_alt("Tesco Baked Beans 4X420g"), Some("4X420g".to_string()));
        assert_eq!(weight_from_alt("Tesco Bananas Loose"), None);
        assert_eq!(weight_from_alt("   "), None);
    }
}
