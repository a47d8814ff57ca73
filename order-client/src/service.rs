//! Order service contract

use async_trait::async_trait;
use shared::{Snapshot, TableId};

use crate::ClientResult;

/// Which orders a fetch should return
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OrderScope {
    /// Every open order
    #[default]
    All,
    /// Orders of one table
    Table(TableId),
    /// Orders the service still considers pending
    Pending,
}

/// External order service
///
/// A feed that does not implement listing answers with
/// [`ClientError::NotImplemented`](crate::ClientError::NotImplemented);
/// callers treat that as an empty snapshot.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Fetch the current orders within `scope`
    async fn list_orders(&self, scope: &OrderScope) -> ClientResult<Snapshot>;

    /// Tell the service the table has paid so it can close the session
    async fn confirm_payment(&self, table: &TableId) -> ClientResult<()>;

    /// Ask the service to print the table's ticket (best effort)
    async fn print_ticket(&self, table: &TableId) -> ClientResult<()>;
}
