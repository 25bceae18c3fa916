use crate::utils::error::{Result, SplitError};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 收據沒有商品圖片時使用的預設圖示
pub const DEFAULT_IMAGE: &str =
    "https://cdn-icons-png.freepik.com/256/13701/13701566.png?semt=ais_hybrid";

/// 支援的商店。每個商店對應一種收據版面。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Store {
    Asda,
    Tesco,
}

impl Store {
    pub const ALL: [Store; 2] = [Store::Asda, Store::Tesco];

    pub fn id(self) -> &'static str {
        match self {
            Store::Asda => "asda",
            Store::Tesco => "tesco",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Store::Asda => "Asda",
            Store::Tesco => "Tesco",
        }
    }

    pub fn from_id(id: &str) -> Option<Store> {
        let id = id.trim();
        Store::ALL
            .into_iter()
            .find(|store| store.id().eq_ignore_ascii_case(id))
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Store {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self> {
        Store::from_id(s).ok_or_else(|| SplitError::UnknownStore {
            store: s.to_string(),
        })
    }
}

/// 與收據版面無關的標準化商品紀錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalItem {
    pub name: String,
    pub quantity: u32,
    pub weight: String,
    pub price: Decimal,
    pub image: String,
}

impl CanonicalItem {
    /// 去重用的識別鍵 (name, weight)
    pub fn identity(&self) -> (&str, &str) {
        (&self.name, &self.weight)
    }
}

/// 單一收據列被略過的原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("item is marked unavailable")]
    Unavailable,

    #[error("item is the original of a substitution")]
    SubstitutedOriginal,

    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("quantity is zero")]
    ZeroQuantity,

    #[error("could not parse quantity from '{0}'")]
    UnparsableQuantity(String),

    #[error("could not parse price from '{0}'")]
    UnparsablePrice(String),

    #[error("price is zero")]
    ZeroPrice,
}

pub type RowOutcome = std::result::Result<CanonicalItem, SkipReason>;

/// 一個商品的購買者 → 分配數量。保留插入順序，最後一位購買者負責吸收四捨五入的差額。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, Decimal>",
    into = "IndexMap<String, Decimal>"
)]
pub struct Allocation {
    units: IndexMap<String, Decimal>,
}

/// 反序列化也走 `insert` 的檢查：0 移除、負數拒絕
impl TryFrom<IndexMap<String, Decimal>> for Allocation {
    type Error = SplitError;

    fn try_from(units: IndexMap<String, Decimal>) -> Result<Self> {
        Self::from_pairs(units)
    }
}

impl From<Allocation> for IndexMap<String, Decimal> {
    fn from(allocation: Allocation) -> Self {
        allocation.units
    }
}

impl Allocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// 設定購買者的數量。0 代表移除該購買者，負數為錯誤。
    pub fn insert(&mut self, buyer: impl Into<String>, units: Decimal) -> Result<()> {
        let buyer = buyer.into();
        if units < Decimal::ZERO {
            return Err(SplitError::AllocationError {
                buyer,
                reason: format!("units must not be negative (got {})", units),
            });
        }

        if units.is_zero() {
            self.units.shift_remove(&buyer);
        } else {
            self.units.insert(buyer, units);
        }
        Ok(())
    }

    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        let mut allocation = Self::new();
        for (buyer, units) in pairs {
            allocation.insert(buyer, units)?;
        }
        Ok(allocation)
    }

    /// 只指定購買者、未指定數量時的預設分配：
    /// 一人獨得全部；數量 ≤ 1 時平分單位；否則平均分配，餘數依序給前面的人。
    pub fn default_for(quantity: u32, buyers: &[String]) -> Self {
        let mut unique: Vec<&String> = Vec::with_capacity(buyers.len());
        for buyer in buyers {
            if !unique.contains(&buyer) {
                unique.push(buyer);
            }
        }

        let mut allocation = Self::new();
        let n = unique.len() as u32;
        match n {
            0 => {}
            1 => {
                allocation
                    .units
                    .insert(unique[0].clone(), Decimal::from(quantity.max(1)));
            }
            _ if quantity <= 1 => {
                let share = Decimal::ONE / Decimal::from(n);
                for buyer in unique {
                    allocation.units.insert(buyer.clone(), share);
                }
            }
            _ => {
                for (i, buyer) in unique.into_iter().enumerate() {
                    let mut units = quantity / n;
                    if (i as u32) < quantity % n {
                        units += 1;
                    }
                    if units > 0 {
                        allocation.units.insert(buyer.clone(), Decimal::from(units));
                    }
                }
            }
        }
        allocation
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn get(&self, buyer: &str) -> Option<Decimal> {
        self.units.get(buyer).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> + '_ {
        self.units.iter().map(|(buyer, units)| (buyer.as_str(), *units))
    }

    pub fn buyers(&self) -> impl Iterator<Item = &str> + '_ {
        self.units.keys().map(String::as_str)
    }

    pub fn total_units(&self) -> Decimal {
        self.units.values().copied().sum()
    }
}

/// 購買者 → 金額，依第一次出現的順序保存
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SplitResult {
    amounts: IndexMap<String, Decimal>,
}

impl SplitResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, buyer: &str, amount: Decimal) {
        match self.amounts.get_mut(buyer) {
            Some(total) => *total += amount,
            None => {
                self.amounts.insert(buyer.to_string(), amount);
            }
        }
    }

    pub fn merge(&mut self, other: &SplitResult) {
        for (buyer, amount) in other.iter() {
            self.add(buyer, amount);
        }
    }

    pub fn get(&self, buyer: &str) -> Option<Decimal> {
        self.amounts.get(buyer).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> + '_ {
        self.amounts.iter().map(|(buyer, amount)| (buyer.as_str(), *amount))
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn total(&self) -> Decimal {
        self.amounts.values().copied().sum()
    }
}

/// 分帳結果與三個總計
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitSummary {
    pub split: SplitResult,
    pub total_order_value: Decimal,
    pub total_assigned: Decimal,
    pub total_remaining: Decimal,
}

impl SplitSummary {
    /// 某人佔已分配總額的比例 (0..=1)；總額為 0 時回傳 0
    pub fn share(&self, buyer: &str) -> Decimal {
        if self.total_assigned.is_zero() {
            return Decimal::ZERO;
        }
        self.split
            .get(buyer)
            .map(|amount| amount / self.total_assigned)
            .unwrap_or(Decimal::ZERO)
    }
}

/// 整個流程 transform 階段的輸出
#[derive(Debug, Clone)]
pub struct SplitReport {
    pub store: Store,
    pub items: Vec<CanonicalItem>,
    pub allocations: Vec<Allocation>,
    pub summary: SplitSummary,
    pub diagnostics: crate::domain::diagnostics::Diagnostics,
}
