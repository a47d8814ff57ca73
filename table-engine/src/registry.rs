//! Table Registry
//!
//! 桌台注册表：唯一持有可写桌台状态的地方。它只由 reconciler 任务访问，
//! 所以服务器快照、员工操作和定时器事件天然串行，不需要锁。
//!
//! Every status change goes through [`next_status`], so the precedence rule
//! (server events never leave a staff-asserted status) lives in one place.

use serde::Serialize;
use shared::util::now_millis;
use shared::{SessionAggregate, Snapshot, TableId, TableStatus};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::aggregator::{aggregate, partition_by_table};
use crate::status::{StatusEvent, next_status};
use crate::timers::{ArmedTimer, EscalationTimers, TimerFired, TimerKind};
use crate::view::TableView;
use crate::{EngineConfig, EngineError, EngineResult};

/// 员工操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StaffAction {
    Print,
    ConfirmPayment,
}

impl fmt::Display for StaffAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaffAction::Print => write!(f, "print"),
            StaffAction::ConfirmPayment => write!(f, "confirmPayment"),
        }
    }
}

/// A staff action the order service did not acknowledge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionFailure {
    pub action: StaffAction,
    pub message: String,
    /// Unix millis
    pub at: i64,
}

#[derive(Debug, Clone)]
struct TableEntry {
    status: TableStatus,
    aggregate: SessionAggregate,
    last_error: Option<ActionFailure>,
    status_since: i64,
}

impl TableEntry {
    fn new(now: i64) -> Self {
        Self {
            status: TableStatus::Empty,
            aggregate: SessionAggregate::empty(),
            last_error: None,
            status_since: now,
        }
    }
}

pub struct TableRegistry {
    /// Configured tables, in display order
    order: Vec<TableId>,
    entries: HashMap<TableId, TableEntry>,
    timers: EscalationTimers,
    escalation_delay: Duration,
    settle_delay: Duration,
}

impl TableRegistry {
    /// Every table starts `empty` with an empty aggregate
    pub fn new(
        tables: impl IntoIterator<Item = TableId>,
        config: &EngineConfig,
        timer_tx: mpsc::UnboundedSender<TimerFired>,
    ) -> Self {
        let now = now_millis();
        let mut order = Vec::new();
        let mut entries = HashMap::new();
        for table in tables {
            if entries.contains_key(&table) {
                continue;
            }
            entries.insert(table.clone(), TableEntry::new(now));
            order.push(table);
        }

        Self {
            order,
            entries,
            timers: EscalationTimers::new(timer_tx),
            escalation_delay: config.escalation_delay,
            settle_delay: config.settle_delay,
        }
    }

    pub fn contains(&self, table: &TableId) -> bool {
        self.entries.contains_key(table)
    }

    pub fn tables(&self) -> &[TableId] {
        &self.order
    }

    pub fn status(&self, table: &TableId) -> Option<TableStatus> {
        self.entries.get(table).map(|e| e.status)
    }

    pub fn aggregate(&self, table: &TableId) -> Option<&SessionAggregate> {
        self.entries.get(table).map(|e| &e.aggregate)
    }

    pub fn last_error(&self, table: &TableId) -> Option<&ActionFailure> {
        self.entries.get(table).and_then(|e| e.last_error.as_ref())
    }

    pub fn pending_timer(&self, table: &TableId) -> Option<ArmedTimer> {
        self.timers.pending(table)
    }

    /// Apply `event`; returns the accepted destination, `None` if rejected
    fn transition(&mut self, table: &TableId, event: StatusEvent) -> Option<TableStatus> {
        let entry = self.entries.get_mut(table)?;
        let from = entry.status;
        let to = next_status(from, event)?;
        if to != from {
            entry.status = to;
            entry.status_since = now_millis();
            tracing::info!(
                table = %table,
                from = %from,
                to = %to,
                source = %event.source(),
                "Table status changed"
            );
        }
        Some(to)
    }

    /// Fold a fresh snapshot into every configured table
    ///
    /// Tables absent from the snapshot are treated as having zero orders.
    /// Returns how many tables changed (status or aggregate).
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> usize {
        let by_table = partition_by_table(&snapshot.orders);

        let unknown: HashSet<&TableId> = by_table.keys().filter(|t| !self.contains(t)).collect();
        if !unknown.is_empty() {
            tracing::debug!(tables = ?unknown, "Ignoring orders for unconfigured tables");
        }

        let mut changed = 0;
        for table in self.order.clone() {
            let orders = by_table.get(&table).map(Vec::as_slice).unwrap_or(&[]);
            let fresh = aggregate(&table, orders);
            let before = self.status(&table);

            let event = StatusEvent::OrdersObserved {
                order_count: fresh.order_count,
            };
            self.transition(&table, event);

            let Some(entry) = self.entries.get_mut(&table) else {
                continue;
            };
            let aggregate_changed = entry.aggregate != fresh;
            if aggregate_changed {
                entry.aggregate = fresh;
            }
            if aggregate_changed || before != Some(entry.status) {
                changed += 1;
            }
        }
        changed
    }

    /// Staff printed the ticket: `preparing` and arm escalation
    pub fn begin_print(&mut self, table: &TableId) -> EngineResult<()> {
        let status = self
            .transition(table, StatusEvent::PrintRequested)
            .ok_or_else(|| EngineError::UnknownTable(table.to_string()))?;
        self.clear_failure(table);
        self.timers
            .schedule(table, TimerKind::Escalation, status, self.escalation_delay);
        Ok(())
    }

    /// Payment acknowledged: `paid` and arm settle (replaces escalation)
    pub fn confirm_payment(&mut self, table: &TableId) -> EngineResult<()> {
        let status = self
            .transition(table, StatusEvent::PaymentConfirmed)
            .ok_or_else(|| EngineError::UnknownTable(table.to_string()))?;
        self.clear_failure(table);
        self.timers
            .schedule(table, TimerKind::Settle, status, self.settle_delay);
        Ok(())
    }

    pub fn record_failure(&mut self, table: &TableId, action: StaffAction, message: impl Into<String>) {
        if let Some(entry) = self.entries.get_mut(table) {
            entry.last_error = Some(ActionFailure {
                action,
                message: message.into(),
                at: now_millis(),
            });
        }
    }

    fn clear_failure(&mut self, table: &TableId) {
        if let Some(entry) = self.entries.get_mut(table) {
            entry.last_error = None;
        }
    }

    /// Handle a delivered timer; returns whether the status changed
    ///
    /// Stale deliveries and timers whose table left the armed status are
    /// no-ops.
    pub fn on_timer(&mut self, fired: &TimerFired) -> bool {
        if !self.timers.complete(fired) {
            tracing::debug!(
                table = %fired.table,
                kind = fired.kind.as_str(),
                generation = fired.generation,
                "Discarding stale timer"
            );
            return false;
        }
        if self.status(&fired.table) != Some(fired.armed_for) {
            tracing::debug!(
                table = %fired.table,
                kind = fired.kind.as_str(),
                armed_for = %fired.armed_for,
                "Timer no longer applies"
            );
            return false;
        }

        let event = match fired.kind {
            TimerKind::Escalation => StatusEvent::EscalationDue,
            TimerKind::Settle => StatusEvent::SettleElapsed,
        };
        self.transition(&fired.table, event)
            .is_some_and(|to| to != fired.armed_for)
    }

    /// Drop action failures older than `ttl`; returns how many were cleared
    pub fn expire_failures(&mut self, now: i64, ttl: Duration) -> usize {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let mut cleared = 0;
        for entry in self.entries.values_mut() {
            if entry
                .last_error
                .as_ref()
                .is_some_and(|e| now.saturating_sub(e.at) >= ttl_ms)
            {
                entry.last_error = None;
                cleared += 1;
            }
        }
        cleared
    }

    pub fn table_view(&self, table: &TableId) -> Option<TableView> {
        let entry = self.entries.get(table)?;
        Some(TableView {
            table_id: table.clone(),
            status: entry.status,
            label: entry.status.label(),
            badge: entry.status.badge(),
            total_display: entry.aggregate.total_display(),
            aggregate: entry.aggregate.clone(),
            pending_timer: self.timers.pending(table).map(|t| t.kind),
            last_error: entry.last_error.clone(),
            status_since: entry.status_since,
        })
    }

    /// All tables in configured order
    pub fn views(&self) -> Vec<TableView> {
        self.order
            .iter()
            .filter_map(|table| self.table_view(table))
            .collect()
    }

    /// Cancel every pending timer
    pub fn shutdown(&mut self) {
        self.timers.cancel_all();
    }
}
