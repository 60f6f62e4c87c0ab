//! Domain records for the repair shop.
//!
//! Each entity has a stored record type and a `Create*` input type whose
//! `normalize` method applies the required-field rules before anything
//! reaches the store.

pub mod customer;
pub mod equipment;
pub mod product;
pub mod service_order;
pub mod technician;
