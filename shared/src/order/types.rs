//! Order and line item types

use crate::money::{checked_line_total, line_total};
use crate::table::TableId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One ordered line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Item name (merge key, case-sensitive)
    pub name: String,
    pub quantity: u32,
    /// Unit price, if the service sent one
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub unit_price: Option<Decimal>,
}

impl OrderItem {
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: Option<Decimal>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    pub fn line_total(&self) -> Decimal {
        line_total(self.quantity, self.unit_price)
    }

    pub fn checked_line_total(&self) -> Option<Decimal> {
        checked_line_total(self.quantity, self.unit_price)
    }
}

/// Order as emitted by the order service
///
/// Immutable once observed. The same `id` seen in a later snapshot is the
/// same logical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Monotonically increasing, assigned by the order service
    pub id: u64,
    pub table_id: TableId,
    pub items: Vec<OrderItem>,
    /// Server-supplied total; `None` when the service omitted it
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total: Option<Decimal>,
    /// Creation timestamp exactly as the service formatted it
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Order {
    pub fn new(id: u64, table_id: TableId, items: Vec<OrderItem>) -> Self {
        Self {
            id,
            table_id,
            items,
            total: None,
            created_at: None,
        }
    }

    pub fn with_total(mut self, total: Decimal) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    /// Server total if present, otherwise Σ quantity × unit_price
    ///
    /// Saturates at `Decimal::MAX`. Orders decoded from a snapshot never
    /// saturate, [`Order::checked_total`] is checked while decoding.
    pub fn effective_total(&self) -> Decimal {
        self.checked_total().unwrap_or(Decimal::MAX)
    }

    /// Same as [`Order::effective_total`], `None` on overflow
    pub fn checked_total(&self) -> Option<Decimal> {
        match self.total {
            Some(total) => Some(total),
            None => self
                .items
                .iter()
                .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.checked_line_total()?)),
        }
    }
}
