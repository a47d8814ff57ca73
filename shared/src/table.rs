//! Table identity and status (桌台状态)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableIdError {
    #[error("Table id must not be empty")]
    Empty,
}

/// Normalized table identifier, e.g. `"T1"`
///
/// Always trimmed and uppercased, so `" t1 "` and `"T1"` name the same table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableId(String);

impl TableId {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TableIdError> {
        let normalized = raw.as_ref().trim().to_uppercase();
        if normalized.is_empty() {
            return Err(TableIdError::Empty);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TableId {
    type Err = TableIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TableId {
    type Error = TableIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TableId> for String {
    fn from(id: TableId) -> Self {
        id.0
    }
}

impl AsRef<str> for TableId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Table Status
// ============================================================================

/// 桌台状态
///
/// Cycle: `Empty → Ordered → Preparing → ToPay → Paid → Empty`.
/// `Preparing`, `ToPay` and `Paid` are staff-asserted: the order feed has no
/// vocabulary for them and can never move a table out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TableStatus {
    /// 空闲
    #[default]
    Empty,
    /// 已下单
    Ordered,
    /// 已打印，准备中
    Preparing,
    /// 待付款
    ToPay,
    /// 已付款
    Paid,
}

impl TableStatus {
    /// Whether this status can only be reached through staff action or timer
    pub fn is_staff_asserted(self) -> bool {
        matches!(self, Self::Preparing | Self::ToPay | Self::Paid)
    }

    /// Staff-facing label
    pub fn label(self) -> &'static str {
        match self {
            Self::Empty => "Libre",
            Self::Ordered => "Commandé",
            Self::Preparing => "En préparation",
            Self::ToPay => "Doit payer",
            Self::Paid => "Payé",
        }
    }

    pub fn badge(self) -> BadgeColor {
        match self {
            Self::Empty => BadgeColor::Grey,
            Self::Ordered => BadgeColor::Blue,
            Self::Preparing => BadgeColor::Orange,
            Self::ToPay => BadgeColor::Red,
            Self::Paid => BadgeColor::Green,
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Empty => "empty",
            Self::Ordered => "ordered",
            Self::Preparing => "preparing",
            Self::ToPay => "toPay",
            Self::Paid => "paid",
        };
        f.write_str(s)
    }
}

/// Badge color shown next to a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Grey,
    Blue,
    Orange,
    Red,
    Green,
}
