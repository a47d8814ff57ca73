//! 应用状态 - HTTP 处理器共享

use std::time::Instant;
use table_engine::DashboardHandle;

/// Shared by every handler; cheap to clone
#[derive(Clone)]
pub struct AppState {
    /// Entry point into the reconciler
    pub dashboard: DashboardHandle,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(dashboard: DashboardHandle) -> Self {
        Self {
            dashboard,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
