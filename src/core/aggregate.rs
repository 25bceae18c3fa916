use crate::core::allocation::allocate;
use crate::domain::model::{Allocation, CanonicalItem, SplitResult, SplitSummary};
use rust_decimal::Decimal;

/// 把每個商品的分配結果累加成每人應付總額。
/// `allocations[i]` 對應 `items[i]`；缺少或空的分配代表尚未指定購買者。
pub fn aggregate(items: &[CanonicalItem], allocations: &[Allocation]) -> SplitSummary {
    let mut split = SplitResult::new();

    for (item, allocation) in items.iter().zip(allocations) {
        if allocation.is_empty() {
            continue;
        }
        split.merge(&allocate(item, allocation));
    }

    if allocations.len() > items.len() {
        tracing::debug!(
            "Ignoring {} allocations without a matching item",
            allocations.len() - items.len()
        );
    }

    let total_order_value: Decimal = items.iter().map(|item| item.price).sum();
    let total_assigned = split.total();

    SplitSummary {
        split,
        total_order_value,
        total_assigned,
        total_remaining: total_order_value - total_assigned,
    }
}
