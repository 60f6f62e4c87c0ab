//! RepairDesk Core — domain records, identifiers, order status rules and
//! repository traits shared by every RepairDesk crate.
//!
//! This crate has no storage dependency; `repairdesk-db` implements the
//! traits in [`repository`] against SurrealDB.

pub mod error;
pub mod ids;
pub mod models;
pub mod repository;
pub mod validate;

pub use error::{ShopError, ShopResult};
pub use ids::{EntityKind, IdAllocator, SharedAllocator};
