//! Reconciliation Loop
//!
//! 协调循环：一个任务独占 [`TableRegistry`]，串行处理四类输入：
//!
//! 1. shutdown 信号
//! 2. 定时器事件 (escalation / settle)
//! 3. 员工操作 (print / confirm / refresh)，来自 [`DashboardHandle`]
//! 4. 轮询 tick
//!
//! All table-state writes happen on this one task, so a staff action and a
//! tick can never interleave their writes. Readers only ever see the
//! [`BoardView`] published on the watch channel.

use order_client::{ClientError, OrderScope, OrderService};
use shared::util::{duration_millis, now_millis};
use shared::{Snapshot, TableId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::audit_log;
use crate::registry::{StaffAction, TableRegistry};
use crate::timers::TimerFired;
use crate::view::{BoardView, FeedHealth, TableView};
use crate::{EngineConfig, EngineError, EngineResult};

enum Command {
    Print {
        table: TableId,
        reply: oneshot::Sender<EngineResult<TableView>>,
    },
    Confirm {
        table: TableId,
        reply: oneshot::Sender<EngineResult<TableView>>,
    },
    Refresh {
        reply: oneshot::Sender<BoardView>,
    },
}

/// UI 入口：发送员工操作并读取最新视图
///
/// Cheap to clone; every clone talks to the same reconciler.
#[derive(Clone)]
pub struct DashboardHandle {
    commands: mpsc::Sender<Command>,
    board: watch::Receiver<BoardView>,
}

impl DashboardHandle {
    /// Staff clicked "print" on `table`
    ///
    /// The table moves to `preparing` even when the ticket could not be
    /// printed; the failure is returned and shown on the table.
    pub async fn on_print_clicked(&self, table: &str) -> EngineResult<TableView> {
        let table = parse_table(table)?;
        self.request(|reply| Command::Print { table, reply }).await?
    }

    /// Staff clicked "payment confirmed" on `table`
    ///
    /// The table only moves to `paid` once the order service acknowledged.
    pub async fn on_confirm_clicked(&self, table: &str) -> EngineResult<TableView> {
        let table = parse_table(table)?;
        self.request(|reply| Command::Confirm { table, reply }).await?
    }

    /// Run a reconciliation tick now and return the resulting board
    pub async fn refresh(&self) -> EngineResult<BoardView> {
        self.request(|reply| Command::Refresh { reply }).await
    }

    /// Latest published board
    pub fn board(&self) -> BoardView {
        self.board.borrow().clone()
    }

    pub fn table(&self, table: &str) -> Option<TableView> {
        self.board.borrow().table(table).cloned()
    }

    /// Receiver notified on every publish
    pub fn subscribe(&self) -> watch::Receiver<BoardView> {
        self.board.clone()
    }

    /// `false` once the reconciler has stopped, whether by shutdown or panic
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> EngineResult<T> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .await
            .map_err(|_| EngineError::Stopped)?;
        rx.await.map_err(|_| EngineError::Stopped)
    }
}

fn parse_table(raw: &str) -> EngineResult<TableId> {
    TableId::new(raw).map_err(|_| EngineError::UnknownTable(raw.to_string()))
}

/// 桌台协调器
pub struct Reconciler {
    service: Arc<dyn OrderService>,
    registry: TableRegistry,
    config: EngineConfig,
    commands: mpsc::Receiver<Command>,
    timer_rx: mpsc::UnboundedReceiver<TimerFired>,
    board: watch::Sender<BoardView>,
    feed: FeedHealth,
    revision: u64,
    shutdown: CancellationToken,
}

impl Reconciler {
    pub fn new(
        service: Arc<dyn OrderService>,
        tables: Vec<TableId>,
        config: EngineConfig,
        shutdown: CancellationToken,
    ) -> EngineResult<(Self, DashboardHandle)> {
        config.validate()?;
        if tables.is_empty() {
            return Err(EngineError::InvalidConfig(
                "at least one table must be configured".into(),
            ));
        }

        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
        let registry = TableRegistry::new(tables, &config, timer_tx);

        let initial = BoardView {
            revision: 0,
            tables: registry.views(),
            feed: FeedHealth::default(),
        };
        let (board_tx, board_rx) = watch::channel(initial);

        let reconciler = Self {
            service,
            registry,
            config,
            commands: command_rx,
            timer_rx,
            board: board_tx,
            feed: FeedHealth::default(),
            revision: 0,
            shutdown,
        };
        let handle = DashboardHandle {
            commands: command_tx,
            board: board_rx,
        };
        Ok((reconciler, handle))
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    /// 主循环，直到 shutdown 或所有 handle 被释放
    ///
    /// The first tick runs immediately.
    pub async fn run(mut self) {
        tracing::info!(
            tables = self.registry.tables().len(),
            poll_ms = duration_millis(self.config.poll_interval),
            "Reconciler started"
        );

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    tracing::info!("Reconciler shutting down");
                    break;
                }

                Some(fired) = self.timer_rx.recv() => {
                    self.apply_timer(&fired);
                }

                command = self.commands.recv() => {
                    match command {
                        Some(command) => self.handle(command).await,
                        None => {
                            tracing::info!("All dashboard handles dropped, reconciler stopping");
                            break;
                        }
                    }
                }

                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }

        self.registry.shutdown();
        tracing::info!("Reconciler stopped");
    }

    async fn handle(&mut self, command: Command) {
        // 调用方已放弃等待时忽略发送失败
        match command {
            Command::Print { table, reply } => {
                let _ = reply.send(self.print(&table).await);
            }
            Command::Confirm { table, reply } => {
                let _ = reply.send(self.confirm(&table).await);
            }
            Command::Refresh { reply } => {
                let _ = reply.send(self.tick().await);
            }
        }
    }

    /// One reconciliation cycle
    ///
    /// A failed fetch leaves every table untouched and only updates feed
    /// health. A missing feed endpoint counts as an empty snapshot.
    pub async fn tick(&mut self) -> BoardView {
        match self.service.list_orders(&OrderScope::All).await {
            Ok(snapshot) => self.absorb(&snapshot),
            Err(e) if e.is_not_implemented() => {
                tracing::debug!(error = %e, "Order feed not implemented, treating as empty");
                self.absorb(&Snapshot::empty());
            }
            Err(e) => self.fetch_failed(&e),
        }

        let cleared = self
            .registry
            .expire_failures(now_millis(), self.config.action_error_ttl);
        if cleared > 0 {
            tracing::debug!(cleared, "Expired action errors");
        }
        self.publish()
    }

    fn absorb(&mut self, snapshot: &Snapshot) {
        let changed = self.registry.apply_snapshot(snapshot);
        self.feed.record_success(now_millis(), snapshot.skipped.len());
        tracing::debug!(
            orders = snapshot.orders.len(),
            skipped = snapshot.skipped.len(),
            changed,
            "Snapshot applied"
        );
    }

    fn fetch_failed(&mut self, error: &ClientError) {
        self.feed.record_failure(error.to_string());
        tracing::warn!(
            error = %error,
            consecutive_failures = self.feed.consecutive_failures,
            "Order feed fetch failed, keeping last known state"
        );
    }

    /// Staff print: optimistic `preparing`, then the ticket
    pub async fn print(&mut self, table: &TableId) -> EngineResult<TableView> {
        self.registry.begin_print(table)?;
        self.publish();

        match self.service.print_ticket(table).await {
            Ok(()) => {
                audit_log!(table, "print", "ok");
                self.current_view(table)
            }
            Err(e) => {
                audit_log!(table, "print", "failed", e);
                self.registry
                    .record_failure(table, StaffAction::Print, e.to_string());
                self.publish();
                Err(EngineError::PrintFailed {
                    table: table.clone(),
                    source: e,
                })
            }
        }
    }

    /// Staff confirm: `paid` only after the order service acknowledged
    pub async fn confirm(&mut self, table: &TableId) -> EngineResult<TableView> {
        if !self.registry.contains(table) {
            return Err(EngineError::UnknownTable(table.to_string()));
        }

        match self.service.confirm_payment(table).await {
            Ok(()) => {
                self.registry.confirm_payment(table)?;
                audit_log!(table, "confirm_payment", "ok");
                self.publish();
                self.current_view(table)
            }
            Err(e) => {
                audit_log!(table, "confirm_payment", "failed", e);
                self.registry
                    .record_failure(table, StaffAction::ConfirmPayment, e.to_string());
                self.publish();
                Err(EngineError::ConfirmFailed {
                    table: table.clone(),
                    source: e,
                })
            }
        }
    }

    pub fn apply_timer(&mut self, fired: &TimerFired) {
        if self.registry.on_timer(fired) {
            self.publish();
        }
    }

    fn current_view(&self, table: &TableId) -> EngineResult<TableView> {
        self.registry
            .table_view(table)
            .ok_or_else(|| EngineError::UnknownTable(table.to_string()))
    }

    fn publish(&mut self) -> BoardView {
        self.revision += 1;
        let board = BoardView {
            revision: self.revision,
            tables: self.registry.views(),
            feed: self.feed.clone(),
        };
        self.board.send_replace(board.clone());
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_client::MemoryOrderService;
    use shared::TableStatus;

    fn tables(ids: &[&str]) -> Vec<TableId> {
        ids.iter().map(|t| TableId::new(t).unwrap()).collect()
    }

    #[tokio::test]
    async fn test_new_rejects_empty_tables() {
        let service = Arc::new(MemoryOrderService::new());
        let result = Reconciler::new(
            service,
            Vec::new(),
            EngineConfig::default(),
            CancellationToken::new(),
        );
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_initial_board_is_empty() {
        let service = Arc::new(MemoryOrderService::new());
        let (_reconciler, handle) = Reconciler::new(
            service,
            tables(&["T1", "T2"]),
            EngineConfig::default(),
            CancellationToken::new(),
        )
        .unwrap();

        let board = handle.board();
        assert_eq!(board.revision, 0);
        assert_eq!(board.tables.len(), 2);
        assert!(board.tables.iter().all(|t| t.status == TableStatus::Empty));
        assert!(!board.feed.online);
    }

    #[tokio::test]
    async fn test_handle_reports_stopped_reconciler() {
        let service = Arc::new(MemoryOrderService::new());
        let (reconciler, handle) = Reconciler::new(
            service,
            tables(&["T1"]),
            EngineConfig::default(),
            CancellationToken::new(),
        )
        .unwrap();
        drop(reconciler);

        assert!(matches!(handle.refresh().await, Err(EngineError::Stopped)));
        assert!(matches!(
            handle.on_print_clicked("T1").await,
            Err(EngineError::Stopped)
        ));
    }

    #[tokio::test]
    async fn test_blank_table_id_is_unknown() {
        let service = Arc::new(MemoryOrderService::new());
        let (_reconciler, handle) = Reconciler::new(
            service,
            tables(&["T1"]),
            EngineConfig::default(),
            CancellationToken::new(),
        )
        .unwrap();
        assert!(matches!(
            handle.on_confirm_clicked("  ").await,
            Err(EngineError::UnknownTable(_))
        ));
    }
}
