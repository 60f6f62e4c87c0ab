//! SurrealDB implementation of [`EquipmentRepository`].

use repairdesk_core::error::ShopResult;
use repairdesk_core::ids::{EntityKind, SharedAllocator};
use repairdesk_core::models::equipment::{CreateEquipment, Equipment};
use repairdesk_core::repository::EquipmentRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};

use super::{allocate, require_record};
use crate::error::DbError;

/// Projection shared by every equipment read. The owner link is
/// flattened to its key.
const EQUIPMENT_FIELDS: &str = "meta::id(id) AS record_id, \
    meta::id(customer) AS customer_id, equipment_type, brand, model, \
    serial_number, notes";

#[derive(Debug, SurrealValue)]
struct EquipmentRow {
    record_id: String,
    customer_id: String,
    equipment_type: String,
    brand: Option<String>,
    model: Option<String>,
    serial_number: Option<String>,
    notes: Option<String>,
}

impl From<EquipmentRow> for Equipment {
    fn from(row: EquipmentRow) -> Self {
        Equipment {
            id: row.record_id,
            customer_id: row.customer_id,
            equipment_type: row.equipment_type,
            brand: row.brand,
            model: row.model,
            serial_number: row.serial_number,
            notes: row.notes,
        }
    }
}

/// SurrealDB implementation of the Equipment repository.
#[derive(Clone)]
pub struct SurrealEquipmentRepository<C: Connection> {
    db: Surreal<C>,
    allocator: SharedAllocator,
}

impl<C: Connection> SurrealEquipmentRepository<C> {
    pub fn new(db: Surreal<C>, allocator: SharedAllocator) -> Self {
        Self { db, allocator }
    }
}

impl<C: Connection> EquipmentRepository for SurrealEquipmentRepository<C> {
    async fn create(&self, input: CreateEquipment) -> ShopResult<Equipment> {
        let input = input.normalize()?;
        require_record(&self.db, EntityKind::Customer, &input.customer_id).await?;
        let id = allocate(&self.allocator, EntityKind::Equipment)?;

        let result = self
            .db
            .query(
                "CREATE type::record('equipment', $id) SET \
                 customer = type::record('customer', $customer_id), \
                 equipment_type = $equipment_type, brand = $brand, \
                 model = $model, serial_number = $serial_number, \
                 notes = $notes RETURN NONE",
            )
            .query(format!(
                "SELECT {EQUIPMENT_FIELDS} FROM type::record('equipment', $id)"
            ))
            .bind(("id", id.clone()))
            .bind(("customer_id", input.customer_id.clone()))
            .bind(("equipment_type", input.equipment_type))
            .bind(("brand", input.brand))
            .bind(("model", input.model))
            .bind(("serial_number", input.serial_number))
            .bind(("notes", input.notes))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<EquipmentRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("equipment", id.clone()))?;

        info!(id = %id, customer_id = %input.customer_id, "Equipment registered");
        Ok(row.into())
    }

    async fn get_by_id(&self, id: &str) -> ShopResult<Equipment> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {EQUIPMENT_FIELDS} FROM type::record('equipment', $id)"
            ))
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EquipmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("equipment", id))?;

        Ok(row.into())
    }

    async fn list_by_customer(&self, customer_id: &str) -> ShopResult<Vec<Equipment>> {
        debug!(customer_id, "Listing equipment");

        let mut result = self
            .db
            .query(format!(
                "SELECT {EQUIPMENT_FIELDS} FROM equipment \
                 WHERE customer = type::record('customer', $customer_id) \
                 ORDER BY record_id"
            ))
            .bind(("customer_id", customer_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EquipmentRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(Equipment::from).collect())
    }
}
