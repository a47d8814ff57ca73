//! Read model published to the dashboard
//!
//! 只读视图：每次状态变化后由 reconciler 整体重建并通过 watch 通道发布，
//! 读取方永远拿到一致的快照，不会看到半更新的桌台。

use serde::Serialize;
use shared::{BadgeColor, SessionAggregate, TableId, TableStatus};

use crate::registry::ActionFailure;
use crate::timers::TimerKind;

/// One table as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub table_id: TableId,
    pub status: TableStatus,
    pub label: &'static str,
    pub badge: BadgeColor,
    pub aggregate: SessionAggregate,
    /// `aggregate.total` with two decimals
    pub total_display: String,
    pub pending_timer: Option<TimerKind>,
    /// Last failed staff action, shown until it expires
    pub last_error: Option<ActionFailure>,
    /// Unix millis of the last status change
    pub status_since: i64,
}

/// 订单源健康状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedHealth {
    /// Whether the last fetch succeeded
    pub online: bool,
    pub last_success_at: Option<i64>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    /// Malformed orders dropped from the last snapshot
    pub skipped_orders: usize,
}

impl FeedHealth {
    pub fn record_success(&mut self, at: i64, skipped_orders: usize) {
        self.online = true;
        self.last_success_at = Some(at);
        self.last_error = None;
        self.consecutive_failures = 0;
        self.skipped_orders = skipped_orders;
    }

    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.online = false;
        self.last_error = Some(error.into());
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }
}

/// Whole dashboard at one revision
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    /// Bumped on every publish
    pub revision: u64,
    /// In configured table order
    pub tables: Vec<TableView>,
    pub feed: FeedHealth,
}

impl BoardView {
    /// Look up a table by raw id (`"t3"` finds `T3`)
    pub fn table(&self, raw: &str) -> Option<&TableView> {
        let id = TableId::new(raw).ok()?;
        self.tables.iter().find(|t| t.table_id == id)
    }
}
