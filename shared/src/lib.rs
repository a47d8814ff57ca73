//! Shared types for the table board
//!
//! Common types used across the order client, the reconciliation engine and
//! the dashboard binary: table identifiers and statuses, orders as observed
//! from the order service, session aggregates and API response structures.

pub mod money;
pub mod order;
pub mod response;
pub mod session;
pub mod table;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use order::{MalformedOrder, Order, OrderItem, Snapshot};
pub use response::ApiResponse;
pub use session::SessionAggregate;
pub use table::{BadgeColor, TableId, TableIdError, TableStatus};
