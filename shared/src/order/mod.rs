//! Orders as observed from the order service
//!
//! - [`Order`] / [`OrderItem`]: immutable facts, keyed by the service-assigned id
//! - [`Snapshot`]: the full result of one fetch, with malformed entries set aside

pub mod snapshot;
pub mod types;

// Re-exports
pub use snapshot::{MalformedOrder, Snapshot, SnapshotShapeError};
pub use types::{Order, OrderItem};
