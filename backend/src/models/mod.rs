//! Domain models for the barista dispatcher

pub mod catalog;
pub mod event;
pub mod order;
pub mod worker;

// Re-exports
pub use catalog::{CatalogError, DrinkType, LoyaltyTier};
pub use event::{Event, EventLog};
pub use order::{Order, OrderError, OrderId, OrderSnapshot, OrderStatus};
pub use worker::{Worker, WorkerId, WorkerSnapshot};
