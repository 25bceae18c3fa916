//! 依分配數量把單一商品的價格拆給多位購買者，總和永遠等於商品價格。

use crate::domain::model::{Allocation, CanonicalItem, SplitResult};
use rust_decimal::{Decimal, RoundingStrategy};

/// 金額四捨五入到小數兩位 (0.5 進位)
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// 計算每位購買者對此商品應付的金額。
///
/// - 沒有購買者：不分配
/// - 只有一位：付全額，數量不列入計算
/// - 多位：單價 = 價格 / 總數量；除最後一位外各付 round(單價 × 數量)，
///   最後一位付「價格 − 已分配」，吸收所有四捨五入誤差
pub fn allocate(item: &CanonicalItem, allocation: &Allocation) -> SplitResult {
    let mut contribution = SplitResult::new();

    let n = allocation.len();
    if n == 0 {
        return contribution;
    }
    if n == 1 {
        if let Some((buyer, _)) = allocation.iter().next() {
            contribution.add(buyer, item.price);
        }
        return contribution;
    }

    let total_units = allocation.total_units();
    if total_units.is_zero() {
        return contribution;
    }

    let unit_price = item.price.checked_div(total_units);

    let mut assigned = Decimal::ZERO;
    for (i, (buyer, units)) in allocation.iter().enumerate() {
        if i == n - 1 {
            contribution.add(buyer, item.price - assigned);
        } else {
            let share = round_money(share_of(item, unit_price, units, total_units));
            contribution.add(buyer, share);
            assigned += share;
        }
    }

    tracing::debug!(
        "Split '{}' ({}) across {} buyers",
        item.name,
        item.price,
        n
    );
    contribution
}

/// 單價 × 數量；溢位時改用 價格 × (數量 / 總數量)，仍失敗則為 0，差額由最後一位吸收
fn share_of(item: &CanonicalItem, unit_price: Option<Decimal>, units: Decimal, total_units: Decimal) -> Decimal {
    if let Some(share) = unit_price.and_then(|price| price.checked_mul(units)) {
        return share;
    }

    tracing::warn!(
        "Unit price of '{}' overflows ({} / {}); splitting by proportion instead",
        item.name,
        item.price,
        total_units
    );
    units
        .checked_div(total_units)
        .and_then(|ratio| item.price.checked_mul(ratio))
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(quantity: u32, price: Decimal) -> CanonicalItem {
        CanonicalItem {
            name: "Milk".to_string(),
            quantity,
            weight: String::new(),
            price,
            image: String::new(),
        }
    }

    fn alloc(pairs: &[(&str, Decimal)]) -> Allocation {
        Allocation::from_pairs(pairs.iter().map(|(b, u)| (*b, *u))).unwrap()
    }

    #[test]
    fn test_unassigned_item_contributes_nothing() {
        let split = allocate(&item(1, dec!(1.20)), &Allocation::new());
        assert!(split.is_empty());
    }

    #[test]
    fn test_single_buyer_pays_full_price() {
        let split = allocate(&item(3, dec!(4.99)), &alloc(&[("Alice", dec!(1))]));
        assert_eq!(split.get("Alice"), Some(dec!(4.99)));
        assert_eq!(split.len(), 1);
    }

    #[test]
    fn test_equal_units() {
        let split = allocate(
            &item(2, dec!(1.20)),
            &alloc(&[("Alice", dec!(1)), ("Bob", dec!(1))]),
        );
        assert_eq!(split.get("Alice"), Some(dec!(0.60)));
        assert_eq!(split.get("Bob"), Some(dec!(0.60)));
    }

    #[test]
    fn test_weighted_units() {
        let split = allocate(
            &item(3, dec!(1.20)),
            &alloc(&[("Alice", dec!(2)), ("Bob", dec!(1))]),
        );
        assert_eq!(split.get("Alice"), Some(dec!(0.80)));
        assert_eq!(split.get("Bob"), Some(dec!(0.40)));
    }

    #[test]
    fn test_last_buyer_absorbs_rounding() {
        let split = allocate(
            &item(1, dec!(1.00)),
            &alloc(&[("Alice", dec!(1)), ("Bob", dec!(1)), ("Carol", dec!(1))]),
        );
        assert_eq!(split.get("Alice"), Some(dec!(0.33)));
        assert_eq!(split.get("Bob"), Some(dec!(0.33)));
        assert_eq!(split.get("Carol"), Some(dec!(0.34)));

        // 換順序，吸收差額的人也跟著換
        let split = allocate(
            &item(1, dec!(1.00)),
            &alloc(&[("Carol", dec!(1)), ("Bob", dec!(1)), ("Alice", dec!(1))]),
        );
        assert_eq!(split.get("Alice"), Some(dec!(0.34)));
        assert_eq!(split.get("Carol"), Some(dec!(0.33)));
    }

    #[test]
    fn test_fractional_units_for_single_unit_item() {
        let buyers = vec!["Alice".to_string(), "Bob".to_string(), "Carol".to_string()];
        let allocation = Allocation::default_for(1, &buyers);
        let split = allocate(&item(1, dec!(2.00)), &allocation);

        assert_eq!(split.get("Alice"), Some(dec!(0.67)));
        assert_eq!(split.get("Bob"), Some(dec!(0.67)));
        assert_eq!(split.get("Carol"), Some(dec!(0.66)));
        assert_eq!(split.total(), dec!(2.00));
    }

    #[test]
    fn test_sum_always_equals_price() {
        let prices = [dec!(0.01), dec!(0.99), dec!(1.00), dec!(3.33), dec!(10.07), dec!(123.45)];
        let allocations = [
            alloc(&[("A", dec!(1)), ("B", dec!(1))]),
            alloc(&[("A", dec!(1)), ("B", dec!(2)), ("C", dec!(4))]),
            alloc(&[("A", dec!(0.5)), ("B", dec!(0.25)), ("C", dec!(0.25))]),
            alloc(&[("A", dec!(3)), ("B", dec!(3)), ("C", dec!(3)), ("D", dec!(3)), ("E", dec!(1))]),
        ];

        for price in prices {
            for allocation in &allocations {
                let split = allocate(&item(7, price), allocation);
                assert_eq!(split.total(), price, "price {} with {:?}", price, allocation);
            }
        }
    }

    #[test]
    fn test_tiny_units_fall_back_to_proportion() {
        let tiny = Decimal::new(1, 28);
        let allocation = Allocation::from_pairs([("Alice", tiny), ("Bob", tiny)]).unwrap();

        let result = allocate(&item(1, dec!(100.00)), &allocation);

        assert_eq!(result.get("Alice"), Some(dec!(50.00)));
        assert_eq!(result.get("Bob"), Some(dec!(50.00)));
        assert_eq!(result.total(), dec!(100.00));
    }
}
