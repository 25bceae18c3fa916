//! 把使用者的分配指令對應到解析出的商品清單上。

use crate::domain::assignment::{AssignmentSpec, BuyerSpec, ItemRef};
use crate::domain::diagnostics::Diagnostics;
use crate::domain::model::{Allocation, CanonicalItem};
use crate::utils::error::{Result, SplitError};
use rust_decimal::Decimal;
use std::collections::HashSet;

/// 產生與 `items` 等長的分配清單；未被指定的商品為空分配。
/// `people` 為空時接受任何購買者名稱，但不能使用 "*"。
pub fn resolve_allocations(
    items: &[CanonicalItem],
    people: &[String],
    specs: &[AssignmentSpec],
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Allocation>> {
    let people: Vec<String> = people.iter().map(|p| p.trim().to_string()).collect();
    let mut allocations = vec![Allocation::new(); items.len()];
    let mut assigned = vec![false; items.len()];

    for spec in specs {
        let index = find_item(items, &spec.item)?;
        let item = &items[index];
        let buyers = expand_buyers(&spec.item, &spec.buyers, &people)?;
        let allocation = build_allocation(item, &spec.item, &buyers, diagnostics)?;

        if assigned[index] {
            diagnostics.warn(format!(
                "Item {} ('{}') was assigned more than once; keeping the last assignment",
                index + 1,
                item.name
            ));
        }

        allocations[index] = allocation;
        assigned[index] = true;
    }

    tracing::debug!(
        "Resolved {} of {} items to buyers",
        assigned.iter().filter(|a| **a).count(),
        items.len()
    );
    Ok(allocations)
}

fn find_item(items: &[CanonicalItem], item_ref: &ItemRef) -> Result<usize> {
    match item_ref {
        ItemRef::Index(index) if (1..=items.len()).contains(index) => Ok(index - 1),
        ItemRef::Index(index) => Err(SplitError::AssignmentError {
            item: item_ref.to_string(),
            reason: format!("there are {} items, numbered from 1 (got {})", items.len(), index),
        }),
        ItemRef::Name(name) => {
            let matches: Vec<usize> = items
                .iter()
                .enumerate()
                .filter(|(_, item)| &item.name == name)
                .map(|(i, _)| i)
                .collect();
            match matches.as_slice() {
                [index] => Ok(*index),
                [] => Err(SplitError::AssignmentError {
                    item: name.clone(),
                    reason: "no item with this name was found on the receipt".to_string(),
                }),
                _ => Err(SplitError::AssignmentError {
                    item: name.clone(),
                    reason: format!(
                        "the name matches {} items ({}); use the item number instead",
                        matches.len(),
                        matches
                            .iter()
                            .map(|i| (i + 1).to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                }),
            }
        }
    }
}

fn expand_buyers(item_ref: &ItemRef, buyers: &[BuyerSpec], people: &[String]) -> Result<Vec<BuyerSpec>> {
    let mut expanded = Vec::with_capacity(buyers.len());

    for buyer in buyers {
        if buyer.is_everyone() {
            if people.is_empty() {
                return Err(SplitError::AssignmentError {
                    item: item_ref.to_string(),
                    reason: "'*' needs a list of people".to_string(),
                });
            }
            expanded.extend(people.iter().map(|person| BuyerSpec {
                name: person.clone(),
                units: None,
            }));
            continue;
        }

        if !people.is_empty() && !people.contains(&buyer.name) {
            return Err(SplitError::AssignmentError {
                item: item_ref.to_string(),
                reason: format!("'{}' is not one of: {}", buyer.name, people.join(", ")),
            });
        }
        expanded.push(buyer.clone());
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = expanded.iter().find(|b| !seen.insert(b.name.as_str())) {
        return Err(SplitError::AssignmentError {
            item: item_ref.to_string(),
            reason: format!("'{}' is listed more than once", duplicate.name),
        });
    }

    Ok(expanded)
}

fn build_allocation(
    item: &CanonicalItem,
    item_ref: &ItemRef,
    buyers: &[BuyerSpec],
    diagnostics: &mut Diagnostics,
) -> Result<Allocation> {
    let explicit = buyers.iter().filter(|b| b.units.is_some()).count();

    if explicit == 0 {
        let names: Vec<String> = buyers.iter().map(|b| b.name.clone()).collect();
        return Ok(Allocation::default_for(item.quantity, &names));
    }

    if explicit != buyers.len() {
        return Err(SplitError::AssignmentError {
            item: item_ref.to_string(),
            reason: "either give units for every buyer or for none".to_string(),
        });
    }

    let allocation = Allocation::from_pairs(
        buyers
            .iter()
            .map(|b| (b.name.clone(), b.units.unwrap_or(Decimal::ZERO))),
    )?;

    let total = allocation.total_units();
    if allocation.len() > 1 && total != Decimal::from(item.quantity) {
        diagnostics.warn(format!(
            "'{}': allocated {} of {} units; the price is split by the allocated units",
            item.name, total, item.quantity
        ));
    }
    Ok(allocation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(name: &str, quantity: u32) -> CanonicalItem {
        CanonicalItem {
            name: name.to_string(),
            quantity,
            weight: String::new(),
            price: dec!(1.00),
            image: String::new(),
        }
    }

    fn people() -> Vec<String> {
        vec!["Alice".to_string(), "Bob".to_string(), "Carol".to_string()]
    }

    fn spec(s: &str) -> AssignmentSpec {
        s.parse().unwrap()
    }

    #[test]
    fn test_resolves_by_index_and_name() {
        let items = vec![item("Milk", 2), item("Bread", 1), item("Eggs", 6)];
        let mut diagnostics = Diagnostics::new();

        let allocations = resolve_allocations(
            &items,
            &people(),
            &[spec("1=Alice:1,Bob:1"), spec("Eggs=Carol")],
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(allocations.len(), 3);
        assert_eq!(allocations[0].get("Bob"), Some(dec!(1)));
        assert!(allocations[1].is_empty());
        assert_eq!(allocations[2].get("Carol"), Some(dec!(6)));
    }

    #[test]
    fn test_everyone_expands_to_people() {
        let items = vec![item("Milk", 4)];
        let mut diagnostics = Diagnostics::new();

        let allocations =
            resolve_allocations(&items, &people(), &[spec("1=*")], &mut diagnostics).unwrap();

        let order: Vec<&str> = allocations[0].buyers().collect();
        assert_eq!(order, vec!["Alice", "Bob", "Carol"]);
        assert_eq!(allocations[0].get("Alice"), Some(dec!(2)));
        assert_eq!(allocations[0].get("Carol"), Some(dec!(1)));
    }

    #[test]
    fn test_rejects_unknown_item_or_buyer() {
        let items = vec![item("Milk", 1)];
        let mut diagnostics = Diagnostics::new();

        assert!(resolve_allocations(&items, &people(), &[spec("2=Alice")], &mut diagnostics).is_err());
        assert!(resolve_allocations(&items, &people(), &[spec("0=Alice")], &mut diagnostics).is_err());
        assert!(resolve_allocations(&items, &people(), &[spec("Cheese=Alice")], &mut diagnostics).is_err());
        assert!(resolve_allocations(&items, &people(), &[spec("1=Dave")], &mut diagnostics).is_err());
        assert!(resolve_allocations(&items, &[], &[spec("1=*")], &mut diagnostics).is_err());
    }

    #[test]
    fn test_rejects_mixed_units() {
        let items = vec![item("Milk", 3)];
        let mut diagnostics = Diagnostics::new();
        let result = resolve_allocations(&items, &people(), &[spec("1=Alice:2,Bob")], &mut diagnostics);
        assert!(matches!(result, Err(SplitError::AssignmentError { .. })));
    }

    #[test]
    fn test_any_buyer_without_people_list() {
        let items = vec![item("Milk", 1)];
        let mut diagnostics = Diagnostics::new();
        let allocations =
            resolve_allocations(&items, &[], &[spec("1=Zed")], &mut diagnostics).unwrap();
        assert_eq!(allocations[0].get("Zed"), Some(dec!(1)));
    }

    #[test]
    fn test_untrimmed_people_still_match() {
        let items = vec![item("Milk", 2)];
        let people = vec!["Alice".to_string(), " Bob".to_string()];
        let mut diagnostics = Diagnostics::new();

        let allocations =
            resolve_allocations(&items, &people, &[spec("1=Bob")], &mut diagnostics).unwrap();
        assert_eq!(allocations[0].get("Bob"), Some(dec!(2)));

        let allocations =
            resolve_allocations(&items, &people, &[spec("1=*")], &mut diagnostics).unwrap();
        let order: Vec<&str> = allocations[0].buyers().collect();
        assert_eq!(order, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_ambiguous_name_needs_item_number() {
        let items = vec![item("Milk", 1), item("Bread", 1), item("Milk", 2)];
        let mut diagnostics = Diagnostics::new();

        let result = resolve_allocations(&items, &people(), &[spec("Milk=Alice")], &mut diagnostics);
        match result {
            Err(SplitError::AssignmentError { reason, .. }) => {
                assert!(reason.contains("matches 2 items (1, 3)"));
            }
            other => panic!("expected an assignment error, got {:?}", other),
        }

        let allocations =
            resolve_allocations(&items, &people(), &[spec("3=Alice")], &mut diagnostics).unwrap();
        assert_eq!(allocations[2].get("Alice"), Some(dec!(2)));
    }

    #[test]
    fn test_rejects_repeated_buyer() {
        let items = vec![item("Milk", 3)];
        let mut diagnostics = Diagnostics::new();

        let result =
            resolve_allocations(&items, &people(), &[spec("1=Alice:1,Alice:2")], &mut diagnostics);
        assert!(matches!(result, Err(SplitError::AssignmentError { .. })));

        let result = resolve_allocations(&items, &people(), &[spec("1=*,Bob")], &mut diagnostics);
        assert!(matches!(result, Err(SplitError::AssignmentError { .. })));
    }

    #[test]
    fn test_later_assignment_replaces_earlier() {
        let items = vec![item("Milk", 1)];
        let mut diagnostics = Diagnostics::new();

        let allocations = resolve_allocations(
            &items,
            &people(),
            &[spec("1=Alice"), spec("Milk=Bob")],
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(allocations[0].get("Alice"), None);
        assert_eq!(allocations[0].get("Bob"), Some(dec!(1)));
        assert_eq!(diagnostics.warnings().count(), 1);
    }
}
