//! Asda 收據：主要版面是表格列 (`tr.item-row__content`)，
//! 舊版/新版網頁則改用 `data-testid="container-*"` 的 div 容器。

use crate::core::fields::{
    element_text, has_class, parse_price, parse_title_and_quantity, safe_attr, safe_text,
};
use crate::domain::diagnostics::Diagnostics;
use crate::domain::model::{CanonicalItem, RowOutcome, SkipReason};
use crate::domain::ports::ReceiptParser;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

const TABLE_LAYOUT: &str = "asda/table";
const CONTAINER_LAYOUT: &str = "asda/containers";

const UNAVAILABLE_CLASS: &str = "item-row__content--unavailable";
const SUBS_ORIGINAL_CLASS: &str = "item-row__content--subs-original";

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr.item-row__content").expect("valid row selector"));
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h4.item-title__label").expect("valid title selector"));
static WEIGHT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.item-title__weight").expect("valid weight selector"));
static EXTRA_QUANTITY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("span.item-title__quantity").expect("valid extra quantity selector")
});
static PRICE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p.item-price__label").expect("valid price selector"));
static IMAGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img.item-image__image").expect("valid image selector"));

static CONTAINER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[data-testid^="container-"]"#).expect("valid container selector")
});
static P_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("valid p selector"));
static DETAIL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"p[class="chakra-text css-0"]"#).expect("valid detail selector")
});
static TOTAL_COST_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"p[data-testid^="totalCost-"]"#).expect("valid total cost selector")
});
static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid img selector"));

static CONTAINER_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*x\s+").expect("valid container title regex"));

pub struct AsdaParser<'a> {
    placeholder_image: &'a str,
}

impl<'a> AsdaParser<'a> {
    pub fn new(placeholder_image: &'a str) -> Self {
        Self { placeholder_image }
    }

    fn parse_table_row(&self, row: ElementRef<'_>) -> RowOutcome {
        if has_class(row, UNAVAILABLE_CLASS) {
            return Err(SkipReason::Unavailable);
        }
        if has_class(row, SUBS_ORIGINAL_CLASS) {
            return Err(SkipReason::SubstitutedOriginal);
        }

        let title = row
            .select(&TITLE_SELECTOR)
            .next()
            .map(element_text)
            .ok_or(SkipReason::MissingField("title"))?;

        let (name, quantity) = parse_title_and_quantity(&title)?;
        if quantity == 0 {
            return Err(SkipReason::ZeroQuantity);
        }
        if name.is_empty() {
            return Err(SkipReason::MissingField("name"));
        }

        // 秤重商品可能有多個重量，例如 0.35kg + 0.37kg
        let weight = match row.select(&WEIGHT_SELECTOR).next() {
            Some(tag) => element_text(tag),
            None => row
                .select(&EXTRA_QUANTITY_SELECTOR)
                .map(element_text)
                .filter(|w| !w.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        };

        let price_text = row
            .select(&PRICE_SELECTOR)
            .next()
            .map(element_text)
            .ok_or(SkipReason::MissingField("price"))?;
        let price = parse_price(&price_text).ok_or(SkipReason::UnparsablePrice(price_text))?;

        let image = safe_attr(
            row.select(&IMAGE_SELECTOR).next(),
            "src",
            self.placeholder_image,
        );

        Ok(CanonicalItem {
            name,
            quantity,
            weight,
            price,
            image,
        })
    }

    fn parse_container(&self, container: ElementRef<'_>) -> RowOutcome {
        let title = container
            .select(&P_SELECTOR)
            .map(element_text)
            .find(|text| CONTAINER_TITLE_RE.is_match(text))
            .ok_or(SkipReason::MissingField("title"))?;

        let (name, quantity) = parse_title_and_quantity(&title)?;
        if quantity == 0 {
            return Err(SkipReason::ZeroQuantity);
        }
        if name.is_empty() {
            return Err(SkipReason::MissingField("name"));
        }

        // 第二個 detail 段落是重量/規格
        let weight = container
            .select(&DETAIL_SELECTOR)
            .nth(1)
            .map(element_text)
            .unwrap_or_default();

        let price_tag = container
            .select(&TOTAL_COST_SELECTOR)
            .next()
            .ok_or(SkipReason::MissingField("price"))?;
        let price_text = safe_text(Some(price_tag), "£0.00");
        let price = parse_price(&price_text).ok_or(SkipReason::UnparsablePrice(price_text))?;
        if price.is_zero() {
            return Err(SkipReason::ZeroPrice);
        }

        let image = safe_attr(
            container.select(&IMG_SELECTOR).next(),
            "src",
            self.placeholder_image,
        );

        Ok(CanonicalItem {
            name,
            quantity,
            weight,
            price,
            image,
        })
    }
}

impl ReceiptParser for AsdaParser<'_> {
    fn parse(&self, document: &Html, diagnostics: &mut Diagnostics) -> Vec<CanonicalItem> {
        let rows: Vec<ElementRef<'_>> = document.select(&ROW_SELECTOR).collect();

        let (layout, outcomes): (&'static str, Vec<RowOutcome>) = if !rows.is_empty() {
            tracing::debug!("Found {} table rows", rows.len());
            (
                TABLE_LAYOUT,
                rows.into_iter().map(|row| self.parse_table_row(row)).collect(),
            )
        } else {
            let containers: Vec<ElementRef<'_>> = document.select(&CONTAINER_SELECTOR).collect();
            tracing::debug!(
                "No table rows, falling back to {} item containers",
                containers.len()
            );
            (
                CONTAINER_LAYOUT,
                containers
                    .into_iter()
                    .map(|container| self.parse_container(container))
                    .collect(),
            )
        };

        let mut items = Vec::new();
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(item) => items.push(item),
                Err(reason) => diagnostics.skip(layout, index, reason),
            }
        }
        items
    }
}
