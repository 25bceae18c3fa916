//! 與版面無關的欄位擷取工具：安全取文字/屬性、價格轉換、「數量 x 名稱」標題解析。

use crate::domain::model::SkipReason;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::ElementRef;
use std::str::FromStr;
use std::sync::LazyLock;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(\d+)\s*x\s*(.+)").expect("valid title regex"));

/// 解析 "2 x Semi Skimmed Milk" 這類標題。
/// 沒有數量前綴時數量為 1、名稱為整段標題；數字超出範圍視為無法解析。
pub fn parse_title_and_quantity(title: &str) -> Result<(String, u32), SkipReason> {
    match TITLE_RE.captures(title) {
        Some(caps) => {
            let quantity = caps[1]
                .parse::<u32>()
                .map_err(|_| SkipReason::UnparsableQuantity(caps[1].to_string()))?;
            Ok((caps[2].trim().to_string(), quantity))
        }
        None => Ok((title.trim().to_string(), 1)),
    }
}

/// 去掉數字和小數點以外的字元後轉成金額。
/// 空字串或無法解析時回傳 None (不是 0)，讓呼叫端區分「沒有價格」和「價格為零」。
pub fn parse_price(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    match Decimal::from_str(&cleaned) {
        Ok(price) => Some(price),
        Err(e) => {
            tracing::warn!("Could not parse price '{}': {}", text, e);
            None
        }
    }
}

/// 節點內所有文字片段各自 trim 後串接
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

pub fn safe_text(element: Option<ElementRef<'_>>, default: &str) -> String {
    element
        .map(element_text)
        .unwrap_or_else(|| default.to_string())
}

/// 節點不存在、沒有該屬性或屬性為空時回傳預設值
pub fn safe_attr(element: Option<ElementRef<'_>>, attr: &str, default: &str) -> String {
    element
        .and_then(|el| el.value().attr(attr))
        .filter(|value| !value.is_empty())
        .unwrap_or(default)
        .to_string()
}

pub fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use scraper::{Html, Selector};

    #[test]
    fn test_title_with_quantity() {
        assert_eq!(
            parse_title_and_quantity("2 x Semi Skimmed Milk"),
            Ok(("Semi Skimmed Milk".to_string(), 2))
        );
        assert_eq!(
            parse_title_and_quantity("3x  Bananas "),
            Ok(("Bananas".to_string(), 3))
        );
        assert_eq!(
            parse_title_and_quantity("0 x Eggs"),
            Ok(("Eggs".to_string(), 0))
        );
    }

    #[test]
    fn test_title_without_quantity() {
        assert_eq!(
            parse_title_and_quantity("  Sourdough Loaf "),
            Ok(("Sourdough Loaf".to_string(), 1))
        );
        // 數字後面沒有 x 分隔
        assert_eq!(
            parse_title_and_quantity("7UP Free"),
            Ok(("7UP Free".to_string(), 1))
        );
    }

    #[test]
    fn test_title_quantity_overflow_is_unparsable() {
        assert!(matches!(
            parse_title_and_quantity("99999999999 x Rice"),
            Err(SkipReason::UnparsableQuantity(_))
        ));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("£1.20"), Some(dec!(1.20)));
        assert_eq!(parse_price(" £ 12.05 "), Some(dec!(12.05)));
        assert_eq!(parse_price("£0.00"), Some(dec!(0)));
        assert_eq!(parse_price("Free"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("£1.2.3"), None);
    }

    #[test]
    fn test_safe_text_and_attr() {
        let html = Html::parse_fragment(
            r#"<div><p class="t"> Milk <span>2L</span></p><img class="a" src=""><img class="b" src="x.png"></div>"#,
        );
        let p = Selector::parse("p.t").unwrap();
        let missing = Selector::parse("h4").unwrap();
        let img_a = Selector::parse("img.a").unwrap();
        let img_b = Selector::parse("img.b").unwrap();

        assert_eq!(safe_text(html.select(&p).next(), ""), "Milk2L");
        assert_eq!(safe_text(html.select(&missing).next(), "£0.00"), "£0.00");
        assert_eq!(safe_attr(html.select(&img_a).next(), "src", "default"), "default");
        assert_eq!(safe_attr(html.select(&img_b).next(), "src", "default"), "x.png");
        assert_eq!(safe_attr(html.select(&img_b).next(), "alt", "none"), "none");
        assert_eq!(safe_attr(None, "src", "none"), "none");
    }
}
