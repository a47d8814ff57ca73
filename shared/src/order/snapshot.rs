//! Snapshot - the full set of orders returned by one fetch
//!
//! The order service is not strict about its payload. A snapshot body is
//! either a bare array of orders or an object carrying that array under
//! `orders` or `data`. Each element is decoded on its own: a malformed
//! element is set aside and the rest of the snapshot is kept.

use super::types::{Order, OrderItem};
use crate::table::TableId;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Why a single order was excluded from a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedOrder {
    /// Element did not decode as an order at all
    #[error("Undecodable order at index {index}: {reason}")]
    Shape { index: usize, reason: String },

    #[error("Order {order_id} has no table")]
    MissingTable { order_id: u64 },

    #[error("Order {order_id} has an item without a name")]
    EmptyItemName { order_id: u64 },

    #[error("Order {order_id} has a negative amount")]
    NegativeAmount { order_id: u64 },

    /// A line or the derived total does not fit in a `Decimal`
    #[error("Order {order_id} amount overflows")]
    AmountOverflow { order_id: u64 },
}

/// Snapshot body was neither an array nor an object wrapping one
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unexpected snapshot shape: {0}")]
pub struct SnapshotShapeError(pub String);

/// Result of one fetch from the order service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Well-formed orders, in service order
    pub orders: Vec<Order>,
    /// Orders excluded from this snapshot
    pub skipped: Vec<MalformedOrder>,
}

impl Snapshot {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders,
            skipped: Vec::new(),
        }
    }

    /// No orders (also what a "not implemented" feed means)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Decode a snapshot body, skipping malformed orders
    pub fn from_json(body: Value) -> Result<Self, SnapshotShapeError> {
        let elements = match body {
            Value::Array(elements) => elements,
            Value::Object(mut map) => match map.remove("orders").or_else(|| map.remove("data")) {
                Some(Value::Array(elements)) => elements,
                // {"data": null} 视为空
                Some(Value::Null) => Vec::new(),
                Some(other) => {
                    return Err(SnapshotShapeError(format!(
                        "orders field is {}",
                        json_kind(&other)
                    )));
                }
                None => {
                    return Err(SnapshotShapeError(
                        "object without orders or data field".to_string(),
                    ));
                }
            },
            Value::Null => Vec::new(),
            other => return Err(SnapshotShapeError(json_kind(&other).to_string())),
        };

        let mut snapshot = Snapshot::default();
        for (index, element) in elements.into_iter().enumerate() {
            match decode_order(index, element) {
                Ok(order) => snapshot.orders.push(order),
                Err(reason) => snapshot.skipped.push(reason),
            }
        }
        Ok(snapshot)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// Wire format
// ============================================================================

/// Table reference as sent by the service: `"T1"` or `1`
#[derive(Deserialize)]
#[serde(untagged)]
enum WireTable {
    Text(String),
    Number(u64),
}

#[derive(Deserialize)]
struct WireItem {
    #[serde(alias = "item")]
    name: String,
    #[serde(alias = "quantity", default = "default_quantity")]
    qty: u32,
    #[serde(default, alias = "unit_price", alias = "unitPrice")]
    price: Option<Decimal>,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Deserialize)]
struct WireOrder {
    #[serde(alias = "order_id", alias = "orderId")]
    id: u64,
    #[serde(default, alias = "table_id", alias = "tableId")]
    table: Option<WireTable>,
    #[serde(default, alias = "lines")]
    items: Vec<WireItem>,
    #[serde(default, alias = "amount")]
    total: Option<Decimal>,
    #[serde(default, alias = "createdAt", alias = "timestamp")]
    created_at: Option<String>,
}

fn decode_order(index: usize, element: Value) -> Result<Order, MalformedOrder> {
    let wire: WireOrder = serde_json::from_value(element).map_err(|e| MalformedOrder::Shape {
        index,
        reason: e.to_string(),
    })?;
    let order_id = wire.id;

    let raw_table = match wire.table {
        Some(WireTable::Text(s)) => s,
        Some(WireTable::Number(n)) => n.to_string(),
        None => return Err(MalformedOrder::MissingTable { order_id }),
    };
    let table_id =
        TableId::new(raw_table).map_err(|_| MalformedOrder::MissingTable { order_id })?;

    if wire.total.is_some_and(|t| t.is_sign_negative() && !t.is_zero()) {
        return Err(MalformedOrder::NegativeAmount { order_id });
    }

    let mut items = Vec::with_capacity(wire.items.len());
    for item in wire.items {
        if item.name.trim().is_empty() {
            return Err(MalformedOrder::EmptyItemName { order_id });
        }
        if item.price.is_some_and(|p| p.is_sign_negative() && !p.is_zero()) {
            return Err(MalformedOrder::NegativeAmount { order_id });
        }
        let item = OrderItem::new(item.name, item.qty, item.price);
        if item.checked_line_total().is_none() {
            return Err(MalformedOrder::AmountOverflow { order_id });
        }
        items.push(item);
    }

    let order = Order {
        id: order_id,
        table_id,
        items,
        total: wire.total,
        created_at: wire.created_at,
    };
    if order.checked_total().is_none() {
        return Err(MalformedOrder::AmountOverflow { order_id });
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array() {
        let snapshot = Snapshot::from_json(json!([
            {"id": 1, "table": "t3", "items": [{"name": "Coke", "qty": 2, "price": 3}], "total": 6,
             "created_at": "2024-05-01 12:00:00"}
        ]))
        .unwrap();

        assert_eq!(snapshot.orders.len(), 1);
        assert!(snapshot.skipped.is_empty());
        let order = &snapshot.orders[0];
        assert_eq!(order.table_id.as_str(), "T3");
        assert_eq!(order.items[0], OrderItem::new("Coke", 2, Some(Decimal::from(3))));
        assert_eq!(order.total, Some(Decimal::from(6)));
        assert_eq!(order.created_at.as_deref(), Some("2024-05-01 12:00:00"));
    }

    #[test]
    fn test_wrapped_and_aliased_fields() {
        let snapshot = Snapshot::from_json(json!({
            "orders": [
                {"order_id": 7, "table_id": 4, "lines": [{"item": "Tea", "quantity": 1, "unit_price": 2.5}],
                 "amount": 2.5, "createdAt": "12:01"}
            ]
        }))
        .unwrap();

        let order = &snapshot.orders[0];
        assert_eq!(order.id, 7);
        assert_eq!(order.table_id.as_str(), "4");
        assert_eq!(order.items[0].unit_price, Some(Decimal::new(25, 1)));
        assert_eq!(order.total, Some(Decimal::new(25, 1)));
    }

    #[test]
    fn test_data_envelope_and_null() {
        let snapshot = Snapshot::from_json(json!({"success": true, "data": null})).unwrap();
        assert!(snapshot.is_empty());
        assert!(Snapshot::from_json(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_unexpected_shape_is_an_error() {
        assert!(Snapshot::from_json(json!("nope")).is_err());
        assert!(Snapshot::from_json(json!({"orders": 3})).is_err());
        assert!(Snapshot::from_json(json!({"message": "ok"})).is_err());
    }

    #[test]
    fn test_malformed_orders_are_skipped_not_fatal() {
        let snapshot = Snapshot::from_json(json!([
            {"id": 1, "table": "T1", "items": []},
            {"table": "T1"},
            {"id": 3, "items": []},
            {"id": 4, "table": "  ", "items": []},
            {"id": 5, "table": "T1", "items": [{"name": "", "qty": 1}]},
            {"id": 6, "table": "T1", "items": [], "total": -1},
            {"id": 7, "table": "T1", "items": [{"name": "Coke", "qty": -2}]},
            {"id": 8, "table": "T1", "items": [{"name": "Coke"}]}
        ]))
        .unwrap();

        let ids: Vec<u64> = snapshot.orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 8]);
        assert_eq!(snapshot.skipped.len(), 6);
        assert!(matches!(snapshot.skipped[0], MalformedOrder::Shape { index: 1, .. }));
        assert_eq!(snapshot.skipped[1], MalformedOrder::MissingTable { order_id: 3 });
        assert_eq!(snapshot.skipped[2], MalformedOrder::MissingTable { order_id: 4 });
        assert_eq!(snapshot.skipped[3], MalformedOrder::EmptyItemName { order_id: 5 });
        assert_eq!(snapshot.skipped[4], MalformedOrder::NegativeAmount { order_id: 6 });
        // missing qty counts as one
        assert_eq!(snapshot.orders[1].items[0].quantity, 1);
    }

    #[test]
    fn test_overflowing_amounts_are_skipped() {
        let snapshot = Snapshot::from_json(json!([
            {"id": 1, "table": "T1", "items": [{"name": "Caviar", "qty": 2, "price": "50000000000000000000000000000"}]},
            {"id": 2, "table": "T1", "items": [
                {"name": "Caviar", "qty": 1, "price": "50000000000000000000000000000"},
                {"name": "Caviar", "qty": 1, "price": "50000000000000000000000000000"}
            ]},
            {"id": 3, "table": "T1", "items": [{"name": "Coke", "qty": 2, "price": 3}]},
            {"id": 4, "table": "T1", "items": [], "total": "50000000000000000000000000000"}
        ]))
        .unwrap();

        let ids: Vec<u64> = snapshot.orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![3, 4]);
        assert_eq!(
            snapshot.skipped,
            vec![
                MalformedOrder::AmountOverflow { order_id: 1 },
                MalformedOrder::AmountOverflow { order_id: 2 },
            ]
        );
    }
}
