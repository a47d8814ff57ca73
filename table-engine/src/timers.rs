//! 桌台定时器
//!
//! Each table owns at most one pending timer. Arming a new one replaces the
//! old one, and every arm bumps a generation counter so a timer that fired
//! just before being replaced is recognised as stale when it is delivered.
//!
//! Timers never touch the registry themselves: they only send [`TimerFired`]
//! back into the reconciler's event channel.

use serde::Serialize;
use shared::util::duration_millis;
use shared::{TableId, TableStatus};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// 定时器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerKind {
    /// preparing → toPay
    Escalation,
    /// paid → empty
    Settle,
}

impl TimerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerKind::Escalation => "escalation",
            TimerKind::Settle => "settle",
        }
    }
}

/// Delivered on the event channel when a timer elapses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerFired {
    pub table: TableId,
    pub kind: TimerKind,
    /// Status the table had when the timer was armed
    pub armed_for: TableStatus,
    pub generation: u64,
}

/// Bookkeeping for the timer currently armed on a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    pub kind: TimerKind,
    pub armed_for: TableStatus,
    pub generation: u64,
}

impl ArmedTimer {
    pub fn fired(&self, table: TableId) -> TimerFired {
        TimerFired {
            table,
            kind: self.kind,
            armed_for: self.armed_for,
            generation: self.generation,
        }
    }
}

/// 每桌单槽定时器集合
pub struct EscalationTimers {
    tx: mpsc::UnboundedSender<TimerFired>,
    pending: HashMap<TableId, (ArmedTimer, JoinHandle<()>)>,
    next_generation: u64,
}

impl EscalationTimers {
    pub fn new(tx: mpsc::UnboundedSender<TimerFired>) -> Self {
        Self {
            tx,
            pending: HashMap::new(),
            next_generation: 1,
        }
    }

    /// Arm `kind` on `table`, replacing whatever was pending there
    ///
    /// Returns the generation of the new timer.
    pub fn schedule(
        &mut self,
        table: &TableId,
        kind: TimerKind,
        armed_for: TableStatus,
        after: Duration,
    ) -> u64 {
        self.cancel(table);

        let generation = self.next_generation;
        self.next_generation += 1;

        let armed = ArmedTimer {
            kind,
            armed_for,
            generation,
        };
        let event = armed.fired(table.clone());
        let tx = self.tx.clone();
        let deadline = tokio::time::Instant::now() + after;
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // Receiver gone means the reconciler stopped
            let _ = tx.send(event);
        });

        tracing::debug!(
            table = %table,
            kind = kind.as_str(),
            generation,
            after_ms = duration_millis(after),
            "Timer armed"
        );
        self.pending.insert(table.clone(), (armed, handle));
        generation
    }

    /// Cancel the pending timer of `table`, if any
    pub fn cancel(&mut self, table: &TableId) -> bool {
        match self.pending.remove(table) {
            Some((armed, handle)) => {
                handle.abort();
                tracing::debug!(
                    table = %table,
                    kind = armed.kind.as_str(),
                    generation = armed.generation,
                    "Timer cancelled"
                );
                true
            }
            None => false,
        }
    }

    pub fn pending(&self, table: &TableId) -> Option<ArmedTimer> {
        self.pending.get(table).map(|(armed, _)| *armed)
    }

    /// Accept a delivered timer
    ///
    /// Returns `false` for a stale delivery (the slot was re-armed or
    /// cancelled after the timer fired); the slot is left untouched then.
    pub fn complete(&mut self, fired: &TimerFired) -> bool {
        let current = self
            .pending
            .get(&fired.table)
            .is_some_and(|(armed, _)| armed.generation == fired.generation);
        if current {
            self.pending.remove(&fired.table);
        }
        current
    }

    pub fn cancel_all(&mut self) {
        for (_, (_, handle)) in self.pending.drain() {
            handle.abort();
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Drop for EscalationTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
