//! SurrealDB repository implementations.

mod customer;
mod equipment;
mod product;
mod service_order;
mod technician;

pub use customer::SurrealCustomerRepository;
pub use equipment::SurrealEquipmentRepository;
pub use product::SurrealProductRepository;
pub use service_order::SurrealServiceOrderRepository;
pub use technician::SurrealTechnicianRepository;

use repairdesk_core::error::ShopError;
use repairdesk_core::ids::{EntityKind, SharedAllocator};
use repairdesk_core::models::customer::PhoneRules;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

/// Every repository bound to one store handle and one allocator.
#[derive(Clone)]
pub struct Repositories<C: Connection> {
    pub customers: SurrealCustomerRepository<C>,
    pub equipment: SurrealEquipmentRepository<C>,
    pub products: SurrealProductRepository<C>,
    pub technicians: SurrealTechnicianRepository<C>,
    pub orders: SurrealServiceOrderRepository<C>,
}

impl<C: Connection> Repositories<C> {
    pub fn new(db: Surreal<C>, allocator: SharedAllocator) -> Self {
        Self::with_phone_rules(db, allocator, PhoneRules::default())
    }

    /// Like [`Repositories::new`], with the phone rules applied to new
    /// customers.
    pub fn with_phone_rules(db: Surreal<C>, allocator: SharedAllocator, rules: PhoneRules) -> Self {
        Self {
            customers: SurrealCustomerRepository::with_phone_rules(
                db.clone(),
                allocator.clone(),
                rules,
            ),
            equipment: SurrealEquipmentRepository::new(db.clone(), allocator.clone()),
            products: SurrealProductRepository::new(db.clone(), allocator.clone()),
            technicians: SurrealTechnicianRepository::new(db.clone(), allocator.clone()),
            orders: SurrealServiceOrderRepository::new(db, allocator),
        }
    }
}

#[derive(Debug, SurrealValue)]
struct ExistsRow {
    #[allow(dead_code)]
    record_id: String,
}

/// Whether a record of `kind` with key `id` is stored.
pub(crate) async fn record_exists<C: Connection>(
    db: &Surreal<C>,
    kind: EntityKind,
    id: &str,
) -> Result<bool, DbError> {
    let mut result = db
        .query("SELECT <string> meta::id(id) AS record_id FROM type::record($table, $id)")
        .bind(("table", kind.table()))
        .bind(("id", id.to_string()))
        .await?;
    let rows: Vec<ExistsRow> = result.take(0)?;
    Ok(!rows.is_empty())
}

/// Fail with `NotFound` unless the referenced record exists.
pub(crate) async fn require_record<C: Connection>(
    db: &Surreal<C>,
    kind: EntityKind,
    id: &str,
) -> Result<(), DbError> {
    if record_exists(db, kind, id).await? {
        Ok(())
    } else {
        Err(DbError::not_found(kind.table(), id))
    }
}

/// Take the next id for `kind`; the lock is released before returning.
pub(crate) fn allocate(allocator: &SharedAllocator, kind: EntityKind) -> Result<String, DbError> {
    allocator
        .lock()
        .next_id(kind)
        .map_err(|e| match e {
            ShopError::Constraint { message } => DbError::Constraint(message),
            other => DbError::Corrupt(other.to_string()),
        })
}
