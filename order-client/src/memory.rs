//! In-process order service
//!
//! 内存订单服务，用于离线演示和测试。Orders are keyed by id, so pushing the
//! same id twice replaces the order instead of duplicating it.

use async_trait::async_trait;
use shared::{Order, Snapshot, TableId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{ClientError, ClientResult, OrderScope, OrderService};

#[derive(Debug, Default)]
struct MemoryState {
    orders: BTreeMap<u64, Order>,
    /// Order ids the service still considers pending
    pending: Vec<u64>,
    printed: Vec<TableId>,
    confirmed: Vec<TableId>,
    /// Remaining fetches that fail with a transport error
    failing_fetches: u32,
    feed_not_implemented: bool,
    fail_print: bool,
    fail_confirm: bool,
}

/// 内存订单服务
#[derive(Debug, Clone, Default)]
pub struct MemoryOrderService {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryOrderService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an order (pending until the table pays)
    pub async fn push_order(&self, order: Order) {
        let mut state = self.state.lock().await;
        if !state.pending.contains(&order.id) {
            state.pending.push(order.id);
        }
        state.orders.insert(order.id, order);
    }

    /// Replace every order with `orders`
    pub async fn set_orders(&self, orders: Vec<Order>) {
        let mut state = self.state.lock().await;
        state.pending = orders.iter().map(|o| o.id).collect();
        state.orders = orders.into_iter().map(|o| (o.id, o)).collect();
    }

    /// Mark an order as no longer pending (served), keeping it on the table
    pub async fn mark_served(&self, order_id: u64) {
        self.state.lock().await.pending.retain(|id| *id != order_id);
    }

    /// Make the next `count` fetches fail with a transport error
    pub async fn fail_next_fetches(&self, count: u32) {
        self.state.lock().await.failing_fetches = count;
    }

    /// Answer fetches as if the listing endpoint did not exist
    pub async fn set_feed_not_implemented(&self, not_implemented: bool) {
        self.state.lock().await.feed_not_implemented = not_implemented;
    }

    pub async fn set_fail_print(&self, fail: bool) {
        self.state.lock().await.fail_print = fail;
    }

    pub async fn set_fail_confirm(&self, fail: bool) {
        self.state.lock().await.fail_confirm = fail;
    }

    /// Tables whose ticket was printed, in call order
    pub async fn printed(&self) -> Vec<TableId> {
        self.state.lock().await.printed.clone()
    }

    /// Tables whose payment was confirmed, in call order
    pub async fn confirmed(&self) -> Vec<TableId> {
        self.state.lock().await.confirmed.clone()
    }
}

#[async_trait]
impl OrderService for MemoryOrderService {
    async fn list_orders(&self, scope: &OrderScope) -> ClientResult<Snapshot> {
        let mut state = self.state.lock().await;
        if state.failing_fetches > 0 {
            state.failing_fetches -= 1;
            return Err(ClientError::Unavailable("order feed unreachable".to_string()));
        }
        if state.feed_not_implemented {
            return Err(ClientError::NotImplemented("/orders".to_string()));
        }

        let orders = state
            .orders
            .values()
            .filter(|order| match scope {
                OrderScope::All => true,
                OrderScope::Table(table) => &order.table_id == table,
                OrderScope::Pending => state.pending.contains(&order.id),
            })
            .cloned()
            .collect();
        Ok(Snapshot::new(orders))
    }

    async fn confirm_payment(&self, table: &TableId) -> ClientResult<()> {
        let mut state = self.state.lock().await;
        if state.fail_confirm {
            return Err(ClientError::Unavailable(format!(
                "payment confirmation rejected for {}",
                table
            )));
        }

        // 付款后关闭会话：移除该桌所有订单
        let MemoryState {
            orders, pending, ..
        } = &mut *state;
        orders.retain(|_, order| &order.table_id != table);
        pending.retain(|id| orders.contains_key(id));
        state.confirmed.push(table.clone());
        Ok(())
    }

    async fn print_ticket(&self, table: &TableId) -> ClientResult<()> {
        let mut state = self.state.lock().await;
        if state.fail_print {
            return Err(ClientError::Unavailable(format!("printer offline for {}", table)));
        }
        state.printed.push(table.clone());
        Ok(())
    }
}
