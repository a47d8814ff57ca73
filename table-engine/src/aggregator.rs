//! Session Aggregator
//!
//! Pure functions from a set of orders to a [`SessionAggregate`]. Nothing is
//! carried between calls, so recomputing on every tick converges no matter
//! how many ticks were missed.

use shared::{Order, SessionAggregate, TableId};
use std::collections::{HashMap, HashSet};

/// Compute the session aggregate of `table_id` from its orders
///
/// - Orders of other tables are ignored.
/// - An order id given twice counts once (first occurrence).
/// - `last_order_time` comes from the greatest order id, not from the
///   timestamp: ids are monotonic, timestamp strings may collide.
pub fn aggregate(table_id: &TableId, orders: &[Order]) -> SessionAggregate {
    let mut result = SessionAggregate::empty();
    let mut seen = HashSet::new();
    let mut latest: Option<&Order> = None;

    for order in orders.iter().filter(|o| &o.table_id == table_id) {
        if !seen.insert(order.id) {
            continue;
        }

        result.order_count += 1;
        // saturates at Decimal::MAX
        result.total = result.total.saturating_add(order.effective_total());
        for item in &order.items {
            *result.merged_items.entry(item.name.clone()).or_insert(0) += u64::from(item.quantity);
        }

        if latest.is_none_or(|l| order.id > l.id) {
            latest = Some(order);
        }
    }

    if let Some(order) = latest {
        result.last_order_id = Some(order.id);
        result.last_order_time = order.created_at.clone();
    }
    result
}

/// Group a snapshot's orders by table, dropping repeated ids
pub fn partition_by_table(orders: &[Order]) -> HashMap<TableId, Vec<Order>> {
    let mut seen = HashSet::new();
    let mut by_table: HashMap<TableId, Vec<Order>> = HashMap::new();
    for order in orders {
        if seen.insert(order.id) {
            by_table
                .entry(order.table_id.clone())
                .or_default()
                .push(order.clone());
        }
    }
    by_table
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::OrderItem;

    fn table(id: &str) -> TableId {
        TableId::new(id).unwrap()
    }

    fn item(name: &str, qty: u32, price: Option<i64>) -> OrderItem {
        OrderItem::new(name, qty, price.map(Decimal::from))
    }

    #[test]
    fn test_empty_input() {
        let result = aggregate(&table("T1"), &[]);
        assert_eq!(result.order_count, 0);
        assert!(result.merged_items.is_empty());
        assert_eq!(result.total, Decimal::ZERO);
        assert_eq!(result.last_order_time, None);
        assert_eq!(result, SessionAggregate::empty());
    }

    #[test]
    fn test_single_order() {
        let orders = vec![
            Order::new(1, table("T3"), vec![item("Coke", 2, Some(3))])
                .with_total(Decimal::from(6))
                .with_created_at("12:00"),
        ];
        let result = aggregate(&table("T3"), &orders);
        assert_eq!(result.order_count, 1);
        assert_eq!(result.quantity_of("Coke"), 2);
        assert_eq!(result.total, Decimal::from(6));
        assert_eq!(result.last_order_time.as_deref(), Some("12:00"));
        assert_eq!(result.total_display(), "6.00");
    }

    #[test]
    fn test_items_merge_by_exact_name() {
        let orders = vec![
            Order::new(1, table("T1"), vec![item("Coke", 2, Some(3)), item("Fries", 1, Some(4))]),
            Order::new(2, table("T1"), vec![item("Coke", 1, Some(3)), item("coke", 1, Some(3))]),
        ];
        let result = aggregate(&table("T1"), &orders);
        assert_eq!(result.order_count, 2);
        assert_eq!(result.quantity_of("Coke"), 3);
        assert_eq!(result.quantity_of("coke"), 1);
        assert_eq!(result.quantity_of("Fries"), 1);
        // 6 + 4 + 3 + 3, derived from items
        assert_eq!(result.total, Decimal::from(16));
    }

    #[test]
    fn test_total_mixes_server_and_derived_totals() {
        let orders = vec![
            Order::new(1, table("T1"), vec![item("Coke", 2, Some(3))]).with_total(Decimal::new(550, 2)),
            Order::new(2, table("T1"), vec![item("Water", 2, None), item("Tea", 1, Some(2))]),
        ];
        let result = aggregate(&table("T1"), &orders);
        assert_eq!(result.total, Decimal::new(750, 2));
    }

    #[test]
    fn test_full_precision_is_kept() {
        let third = Decimal::ONE / Decimal::from(3);
        let orders: Vec<Order> = (1..=3)
            .map(|id| Order::new(id, table("T1"), vec![]).with_total(third))
            .collect();
        let result = aggregate(&table("T1"), &orders);
        assert_eq!(result.total, third * Decimal::from(3));
        assert_eq!(result.total_display(), "1.00");
    }

    #[test]
    fn test_total_saturates_instead_of_overflowing() {
        let huge: Decimal = "50000000000000000000000000000".parse().unwrap();
        let orders = vec![
            Order::new(1, table("T1"), vec![item("Caviar", 1, None)]).with_total(huge),
            Order::new(2, table("T1"), vec![item("Caviar", 1, None)]).with_total(huge),
            Order::new(3, table("T1"), vec![OrderItem::new("Caviar", 2, Some(huge))]),
        ];
        let result = aggregate(&table("T1"), &orders);
        assert_eq!(result.order_count, 3);
        assert_eq!(result.total, Decimal::MAX);
        assert_eq!(result.quantity_of("Caviar"), 4);
    }

    #[test]
    fn test_last_order_time_uses_greatest_id() {
        let orders = vec![
            Order::new(9, table("T1"), vec![]).with_created_at("12:00"),
            Order::new(12, table("T1"), vec![]).with_created_at("12:00"),
            Order::new(10, table("T1"), vec![]).with_created_at("12:30"),
        ];
        let result = aggregate(&table("T1"), &orders);
        assert_eq!(result.last_order_id, Some(12));
        assert_eq!(result.last_order_time.as_deref(), Some("12:00"));
    }

    #[test]
    fn test_repeated_id_not_double_counted() {
        let order = Order::new(4, table("T1"), vec![item("Coke", 2, Some(3))]);
        let orders = vec![order.clone(), order];
        let result = aggregate(&table("T1"), &orders);
        assert_eq!(result.order_count, 1);
        assert_eq!(result.quantity_of("Coke"), 2);
        assert_eq!(result.total, Decimal::from(6));
    }

    #[test]
    fn test_other_tables_ignored() {
        let orders = vec![
            Order::new(1, table("T1"), vec![item("Coke", 1, Some(3))]),
            Order::new(2, table("T2"), vec![item("Coke", 5, Some(3))]),
        ];
        let result = aggregate(&table("T1"), &orders);
        assert_eq!(result.order_count, 1);
        assert_eq!(result.quantity_of("Coke"), 1);
    }

    #[test]
    fn test_idempotent() {
        let orders = vec![
            Order::new(1, table("T1"), vec![item("Coke", 2, Some(3))]),
            Order::new(2, table("T1"), vec![item("Tea", 1, None)]).with_created_at("13:00"),
        ];
        let first = aggregate(&table("T1"), &orders);
        let second = aggregate(&table("T1"), &orders);
        assert_eq!(first, second);
    }

    #[test]
    fn test_partition_by_table() {
        let orders = vec![
            Order::new(1, table("T1"), vec![]),
            Order::new(2, table("T2"), vec![]),
            Order::new(3, table("T1"), vec![]),
            Order::new(1, table("T2"), vec![]),
        ];
        let by_table = partition_by_table(&orders);
        let t1: Vec<u64> = by_table[&table("T1")].iter().map(|o| o.id).collect();
        let t2: Vec<u64> = by_table[&table("T2")].iter().map(|o| o.id).collect();
        assert_eq!(t1, vec![1, 3]);
        assert_eq!(t2, vec![2]);
    }
}
