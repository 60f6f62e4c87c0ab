//! RepairDesk Lifecycle — opening service orders and moving them through
//! their statuses until they are closed with a solution.

pub mod config;
pub mod error;
pub mod service;

pub use config::LifecycleConfig;
pub use error::LifecycleError;
pub use service::OrderLifecycle;
