use crate::utils::error::{Result, SplitError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 代表「所有人」的購買者名稱
pub const EVERYONE: &str = "*";

/// 指向商品清單中的一項：從 1 開始的序號，或完整商品名稱
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemRef {
    Index(usize),
    Name(String),
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Index(index) => write!(f, "#{}", index),
            ItemRef::Name(name) => f.write_str(name),
        }
    }
}

impl FromStr for ItemRef {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SplitError::AssignmentError {
                item: s.to_string(),
                reason: "item reference is empty".to_string(),
            });
        }
        Ok(match s.parse::<usize>() {
            Ok(index) => ItemRef::Index(index),
            Err(_) => ItemRef::Name(s.to_string()),
        })
    }
}

/// "Alice" 或 "Alice:2"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BuyerSpec {
    pub name: String,
    pub units: Option<Decimal>,
}

impl BuyerSpec {
    pub fn is_everyone(&self) -> bool {
        self.name == EVERYONE
    }
}

impl FromStr for BuyerSpec {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, units) = match s.rsplit_once(':') {
            Some((name, units)) => {
                let units = units.trim();
                let parsed = Decimal::from_str(units).map_err(|_| SplitError::AllocationError {
                    buyer: name.trim().to_string(),
                    reason: format!("'{}' is not a number", units),
                })?;
                (name.trim(), Some(parsed))
            }
            None => (s.trim(), None),
        };

        if name.is_empty() {
            return Err(SplitError::AllocationError {
                buyer: s.to_string(),
                reason: "buyer name is empty".to_string(),
            });
        }
        if name == EVERYONE && units.is_some() {
            return Err(SplitError::AllocationError {
                buyer: s.to_string(),
                reason: "'*' cannot carry units".to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            units,
        })
    }
}

impl TryFrom<String> for BuyerSpec {
    type Error = SplitError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<BuyerSpec> for String {
    fn from(spec: BuyerSpec) -> String {
        match spec.units {
            Some(units) => format!("{}:{}", spec.name, units),
            None => spec.name,
        }
    }
}

/// 一筆分配指令：哪個商品、由誰購買 (可選數量)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSpec {
    pub item: ItemRef,
    pub buyers: Vec<BuyerSpec>,
}

/// 命令列格式：`<item>=<buyer>[:units],<buyer>[:units]...`
impl FromStr for AssignmentSpec {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self> {
        let (item, buyers) = s.rsplit_once('=').ok_or_else(|| SplitError::AssignmentError {
            item: s.to_string(),
            reason: "expected '<item>=<buyer>[:units],...'".to_string(),
        })?;

        let item: ItemRef = item.parse()?;
        let buyers = buyers
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(BuyerSpec::from_str)
            .collect::<Result<Vec<_>>>()?;

        if buyers.is_empty() {
            return Err(SplitError::AssignmentError {
                item: item.to_string(),
                reason: "no buyers given".to_string(),
            });
        }

        Ok(Self { item, buyers })
    }
}
