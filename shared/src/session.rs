//! Session aggregate - what a table has ordered since it was last empty

use crate::money::format_money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-table aggregate derived from the orders currently attributed to it
///
/// Never persisted and never mutated incrementally: it is rebuilt from the
/// latest snapshot on every reconciliation tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAggregate {
    pub order_count: usize,
    /// Item name → cumulative quantity
    pub merged_items: BTreeMap<String, u64>,
    /// Full precision; format only for display
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Timestamp of the order with the greatest id
    pub last_order_time: Option<String>,
    /// Greatest order id seen
    pub last_order_id: Option<u64>,
}

impl SessionAggregate {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    pub fn quantity_of(&self, name: &str) -> u64 {
        self.merged_items.get(name).copied().unwrap_or(0)
    }

    /// Total formatted with two decimals
    pub fn total_display(&self) -> String {
        format_money(self.total)
    }
}
