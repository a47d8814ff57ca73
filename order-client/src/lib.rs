//! Order Client - access to the external order service
//!
//! The [`OrderService`] trait is the boundary the reconciliation engine
//! talks to: fetch a snapshot of orders, confirm a payment, print a ticket.
//!
//! - [`HttpOrderService`]: network implementation over reqwest
//! - [`MemoryOrderService`]: in-process implementation (offline mode, tests)

pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod service;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpOrderService;
pub use memory::MemoryOrderService;
pub use service::{OrderScope, OrderService};

// Re-export shared types for convenience
pub use shared::{Order, OrderItem, Snapshot, TableId};
