//! 分帳結果輸出：items.csv、split.csv、summary.json

use crate::core::allocation::round_money;
use crate::domain::diagnostics::Diagnostics;
use crate::domain::model::{Allocation, SplitReport};
use crate::utils::error::{Result, SplitError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

pub const ITEMS_CSV: &str = "items.csv";
pub const SPLIT_CSV: &str = "split.csv";
pub const SUMMARY_JSON: &str = "summary.json";

/// 先四捨五入再補足兩位小數
pub fn format_money(amount: Decimal) -> String {
    format!("{:.2}", round_money(amount))
}

fn format_percent(share: Decimal) -> String {
    format!("{:.2}", round_money(share * Decimal::ONE_HUNDRED))
}

fn describe_allocation(allocation: &Allocation) -> String {
    allocation
        .iter()
        .map(|(buyer, units)| format!("{}:{}", buyer, units.normalize()))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Serialize)]
struct ItemRow<'a> {
    index: usize,
    name: &'a str,
    quantity: u32,
    weight: &'a str,
    price: String,
    image: &'a str,
    assigned_to: String,
}

#[derive(Debug, Serialize)]
struct BuyerRow<'a> {
    buyer: &'a str,
    amount: String,
    share: String,
}

#[derive(Debug, Serialize)]
struct Totals {
    order: String,
    assigned: String,
    remaining: String,
}

#[derive(Debug, Serialize)]
struct SummaryDocument<'a> {
    store: &'a str,
    generated_at: DateTime<Utc>,
    items: Vec<ItemRow<'a>>,
    split: Vec<BuyerRow<'a>>,
    totals: Totals,
    diagnostics: &'a Diagnostics,
}

fn item_rows(report: &SplitReport) -> Vec<ItemRow<'_>> {
    report
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| ItemRow {
            index: i + 1,
            name: &item.name,
            quantity: item.quantity,
            weight: &item.weight,
            price: format_money(item.price),
            image: &item.image,
            assigned_to: report
                .allocations
                .get(i)
                .map(describe_allocation)
                .unwrap_or_default(),
        })
        .collect()
}

fn buyer_rows(report: &SplitReport) -> Vec<BuyerRow<'_>> {
    report
        .summary
        .split
        .iter()
        .map(|(buyer, amount)| BuyerRow {
            buyer,
            amount: format_money(amount),
            share: format_percent(report.summary.share(buyer)),
        })
        .collect()
}

fn to_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.into_inner().map_err(|e| SplitError::ProcessingError {
        message: format!("Failed to flush CSV output: {}", e),
    })
}

pub fn items_csv(report: &SplitReport) -> Result<Vec<u8>> {
    to_csv(&item_rows(report))
}

pub fn split_csv(report: &SplitReport) -> Result<Vec<u8>> {
    to_csv(&buyer_rows(report))
}

pub fn summary_json(report: &SplitReport) -> Result<Vec<u8>> {
    let document = SummaryDocument {
        store: report.store.id(),
        generated_at: Utc::now(),
        items: item_rows(report),
        split: buyer_rows(report),
        totals: Totals {
            order: format_money(report.summary.total_order_value),
            assigned: format_money(report.summary.total_assigned),
            remaining: format_money(report.summary.total_remaining),
        },
        diagnostics: &report.diagnostics,
    };
    Ok(serde_json::to_vec_pretty(&document)?)
}

/// 依輸出格式產生 (檔名, 內容) 清單
pub fn render(report: &SplitReport, formats: &[String]) -> Result<Vec<(&'static str, Vec<u8>)>> {
    let mut files = Vec::new();
    for format in formats {
        match format.as_str() {
            "csv" => {
                files.push((ITEMS_CSV, items_csv(report)?));
                files.push((SPLIT_CSV, split_csv(report)?));
            }
            "json" => files.push((SUMMARY_JSON, summary_json(report)?)),
            other => {
                return Err(SplitError::InvalidConfigValueError {
                    field: "output_formats".to_string(),
                    value: other.to_string(),
                    reason: "Unsupported format".to_string(),
                })
            }
        }
    }
    Ok(files)
}
