use crate::domain::model::CanonicalItem;
use std::collections::HashSet;

/// 依 (name, weight) 去除重複商品，保留第一次出現的順序
pub fn dedupe(items: Vec<CanonicalItem>) -> Vec<CanonicalItem> {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert((item.name.clone(), item.weight.clone())))
        .collect()
}
