//! Engine error types

use order_client::ClientError;
use shared::TableId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Table is not configured on this dashboard
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Ticket print failed; the table still moved to preparing
    #[error("Print failed for table {table}: {source}")]
    PrintFailed {
        table: TableId,
        #[source]
        source: ClientError,
    },

    /// Payment confirmation was not acknowledged; the table did not move to paid
    #[error("Payment confirmation failed for table {table}: {source}")]
    ConfirmFailed {
        table: TableId,
        #[source]
        source: ClientError,
    },

    /// Reconciler is no longer running
    #[error("Reconciler stopped")]
    Stopped,
}

pub type EngineResult<T> = Result<T, EngineError>;
