//! Table Engine - 桌台会话与状态协调引擎
//!
//! Keeps a per-table status and session aggregate consistent with a polled,
//! eventually-consistent order feed while honoring staff actions the feed
//! does not know about yet.
//!
//! # 模块结构
//!
//! ```text
//! table-engine/src/
//! ├── aggregator.rs  # Snapshot → SessionAggregate (pure)
//! ├── status.rs      # 状态机转换表
//! ├── timers.rs      # 升级/结算定时器 (每桌最多一个)
//! ├── registry.rs    # TableRegistry: 唯一可写的桌台状态
//! ├── view.rs        # 只读视图 (TableView / BoardView)
//! └── reconciler.rs  # 协调循环 + DashboardHandle
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod reconciler;
pub mod registry;
pub mod status;
pub mod timers;
pub mod view;

pub use aggregator::{aggregate, partition_by_table};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use reconciler::{DashboardHandle, Reconciler};
pub use registry::{ActionFailure, StaffAction, TableRegistry};
pub use status::{EventSource, StatusEvent, next_status};
pub use timers::{ArmedTimer, EscalationTimers, TimerFired, TimerKind};
pub use view::{BoardView, FeedHealth, TableView};

/// Audit log helper - records staff actions on the `audit` target
///
/// # Examples
/// ```ignore
/// audit_log!(table, "print", "ok");
/// ```
#[macro_export]
macro_rules! audit_log {
    ($table:expr, $action:expr, $outcome:expr) => {
        tracing::info!(
            target: "audit",
            table = %$table,
            action = $action,
            outcome = $outcome,
            "AUDIT"
        );
    };
    ($table:expr, $action:expr, $outcome:expr, $details:expr) => {
        tracing::info!(
            target: "audit",
            table = %$table,
            action = $action,
            outcome = $outcome,
            details = %$details,
            "AUDIT"
        );
    };
}
