//! SurrealDB implementation of [`ServiceOrderRepository`].
//!
//! Orders reference their customer, equipment and technician through
//! record links. Reads flatten the links to their keys; the joined view
//! follows them to pull display columns from the referenced records.

use chrono::{DateTime, Utc};
use repairdesk_core::error::ShopResult;
use repairdesk_core::ids::{EntityKind, SharedAllocator};
use repairdesk_core::models::service_order::{
    CreateServiceOrder, OrderStatus, ServiceOrder, ServiceOrderView, StatusUpdate,
};
use repairdesk_core::repository::{DEFAULT_ORDER_SEARCH_LIMIT, ServiceOrderRepository};
use repairdesk_core::validate;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};

use super::{allocate, require_record};
use crate::error::DbError;

const ORDER_FIELDS: &str = "meta::id(id) AS record_id, \
    meta::id(customer) AS customer_id, \
    meta::id(equipment) AS equipment_id, \
    meta::id(technician) AS technician_id, \
    opened_at, closed_at, status, problem_description, solution_description";

const VIEW_FIELDS: &str = "meta::id(id) AS record_id, \
    meta::id(customer) AS customer_id, \
    meta::id(equipment) AS equipment_id, \
    meta::id(technician) AS technician_id, \
    opened_at, closed_at, status, problem_description, solution_description, \
    customer.name AS customer_name, \
    customer.phone AS customer_phone, \
    customer.email AS customer_email, \
    customer.street AS customer_street, \
    customer.number AS customer_number, \
    customer.neighborhood AS customer_neighborhood, \
    customer.city AS customer_city, \
    customer.state AS customer_state, \
    equipment.equipment_type AS equipment_type, \
    equipment.brand AS equipment_brand, \
    equipment.model AS equipment_model, \
    equipment.serial_number AS equipment_serial_number, \
    equipment.notes AS equipment_notes, \
    technician.name AS technician_name, \
    technician.specialty AS technician_specialty";

#[derive(Debug, SurrealValue)]
struct ServiceOrderRow {
    record_id: String,
    customer_id: String,
    equipment_id: String,
    technician_id: String,
    opened_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    status: String,
    problem_description: String,
    solution_description: Option<String>,
}

#[derive(Debug, SurrealValue)]
struct ServiceOrderViewRow {
    record_id: String,
    customer_id: String,
    equipment_id: String,
    technician_id: String,
    opened_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    status: String,
    problem_description: String,
    solution_description: Option<String>,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    customer_email: Option<String>,
    customer_street: Option<String>,
    customer_number: Option<String>,
    customer_neighborhood: Option<String>,
    customer_city: Option<String>,
    customer_state: Option<String>,
    equipment_type: Option<String>,
    equipment_brand: Option<String>,
    equipment_model: Option<String>,
    equipment_serial_number: Option<String>,
    equipment_notes: Option<String>,
    technician_name: Option<String>,
    technician_specialty: Option<String>,
}

fn parse_status(id: &str, raw: &str) -> Result<OrderStatus, DbError> {
    raw.parse()
        .map_err(|_| DbError::Corrupt(format!("service order {id} has status {raw:?}")))
}

impl TryFrom<ServiceOrderRow> for ServiceOrder {
    type Error = DbError;

    fn try_from(row: ServiceOrderRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.record_id, &row.status)?;
        Ok(ServiceOrder {
            id: row.record_id,
            customer_id: row.customer_id,
            equipment_id: row.equipment_id,
            technician_id: row.technician_id,
            opened_at: row.opened_at,
            closed_at: row.closed_at,
            status,
            problem_description: row.problem_description,
            solution_description: row.solution_description,
        })
    }
}

impl TryFrom<ServiceOrderViewRow> for ServiceOrderView {
    type Error = DbError;

    fn try_from(row: ServiceOrderViewRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.record_id, &row.status)?;
        Ok(ServiceOrderView {
            id: row.record_id,
            status,
            opened_at: row.opened_at,
            closed_at: row.closed_at,
            problem_description: row.problem_description,
            solution_description: row.solution_description,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            customer_email: row.customer_email,
            customer_street: row.customer_street,
            customer_number: row.customer_number,
            customer_neighborhood: row.customer_neighborhood,
            customer_city: row.customer_city,
            customer_state: row.customer_state,
            equipment_id: row.equipment_id,
            equipment_type: row.equipment_type,
            equipment_brand: row.equipment_brand,
            equipment_model: row.equipment_model,
            equipment_serial_number: row.equipment_serial_number,
            equipment_notes: row.equipment_notes,
            technician_id: row.technician_id,
            technician_name: row.technician_name,
            technician_specialty: row.technician_specialty,
        })
    }
}

/// SurrealDB implementation of the ServiceOrder repository.
#[derive(Clone)]
pub struct SurrealServiceOrderRepository<C: Connection> {
    db: Surreal<C>,
    allocator: SharedAllocator,
}

impl<C: Connection> SurrealServiceOrderRepository<C> {
    pub fn new(db: Surreal<C>, allocator: SharedAllocator) -> Self {
        Self { db, allocator }
    }

    /// Number of orders not yet closed.
    pub async fn count_open(&self) -> Result<u64, DbError> {
        #[derive(Debug, SurrealValue)]
        struct CountRow {
            count: u64,
        }

        let mut result = self
            .db
            .query(
                "SELECT count() AS count FROM service_order \
                 WHERE status != 'Closed' GROUP ALL",
            )
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }
}

impl<C: Connection> ServiceOrderRepository for SurrealServiceOrderRepository<C> {
    async fn create(&self, input: CreateServiceOrder) -> ShopResult<ServiceOrder> {
        let input = input.normalize()?;
        require_record(&self.db, EntityKind::Customer, &input.customer_id).await?;
        require_record(&self.db, EntityKind::Equipment, &input.equipment_id).await?;
        require_record(&self.db, EntityKind::Technician, &input.technician_id).await?;
        let id = allocate(&self.allocator, EntityKind::ServiceOrder)?;

        let result = self
            .db
            .query(
                "CREATE type::record('service_order', $id) SET \
                 customer = type::record('customer', $customer_id), \
                 equipment = type::record('equipment', $equipment_id), \
                 technician = type::record('technician', $technician_id), \
                 opened_at = $opened_at, status = $status, \
                 problem_description = $problem_description RETURN NONE",
            )
            .query(format!(
                "SELECT {ORDER_FIELDS} FROM type::record('service_order', $id)"
            ))
            .bind(("id", id.clone()))
            .bind(("customer_id", input.customer_id))
            .bind(("equipment_id", input.equipment_id))
            .bind(("technician_id", input.technician_id))
            .bind(("opened_at", Utc::now()))
            .bind(("status", OrderStatus::Open.as_str()))
            .bind(("problem_description", input.problem_description))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<ServiceOrderRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service_order", id.clone()))?;

        info!(id = %id, "Service order opened");
        Ok(ServiceOrder::try_from(row)?)
    }

    async fn get_by_id(&self, id: &str) -> ShopResult<ServiceOrder> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {ORDER_FIELDS} FROM type::record('service_order', $id)"
            ))
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ServiceOrderRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service_order", id))?;

        Ok(ServiceOrder::try_from(row)?)
    }

    async fn apply_status_update(&self, id: &str, update: StatusUpdate) -> ShopResult<ServiceOrder> {
        // Surface NotFound before writing anything.
        self.get_by_id(id).await?;

        let mut assignments = vec!["status = $status"];
        let mut closed_at = None;
        match update.closed_at {
            Some(Some(at)) => {
                assignments.push("closed_at = $closed_at");
                closed_at = Some(at);
            }
            Some(None) => assignments.push("closed_at = NONE"),
            None => {}
        }
        if update.solution_description.is_some() {
            assignments.push("solution_description = $solution_description");
        }

        let update_sql = format!(
            "UPDATE type::record('service_order', $id) SET {} RETURN NONE",
            assignments.join(", ")
        );

        let mut query = self
            .db
            .query(update_sql)
            .query(format!(
                "SELECT {ORDER_FIELDS} FROM type::record('service_order', $id)"
            ))
            .bind(("id", id.to_string()))
            .bind(("status", update.status.as_str()));
        if let Some(at) = closed_at {
            query = query.bind(("closed_at", at));
        }
        if let Some(solution) = update.solution_description {
            query = query.bind(("solution_description", solution));
        }

        let result = query.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<ServiceOrderRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service_order", id))?;

        debug!(id, status = %update.status, "Service order status written");
        Ok(ServiceOrder::try_from(row)?)
    }

    async fn search(&self, term: Option<&str>) -> ShopResult<Vec<ServiceOrderView>> {
        let term = validate::search_term(term);
        debug!(term = ?term, "Searching service orders");

        let query = match term {
            Some(term) => self
                .db
                .query(format!(
                    "SELECT {VIEW_FIELDS} FROM service_order \
                     WHERE string::contains(string::lowercase(<string> meta::id(id)), $term) \
                     OR string::contains(string::lowercase(customer.name ?? ''), $term) \
                     ORDER BY opened_at DESC, record_id DESC"
                ))
                .bind(("term", term)),
            None => self
                .db
                .query(format!(
                    "SELECT {VIEW_FIELDS} FROM service_order \
                     ORDER BY opened_at DESC, record_id DESC LIMIT $limit"
                ))
                .bind(("limit", DEFAULT_ORDER_SEARCH_LIMIT)),
        };

        let mut result = query.await.map_err(DbError::from)?;
        let rows: Vec<ServiceOrderViewRow> = result.take(0).map_err(DbError::from)?;

        let views = rows
            .into_iter()
            .map(ServiceOrderView::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(views)
    }

    async fn get_view(&self, id: &str) -> ShopResult<ServiceOrderView> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {VIEW_FIELDS} FROM type::record('service_order', $id)"
            ))
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ServiceOrderViewRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service_order", id))?;

        Ok(ServiceOrderView::try_from(row)?)
    }
}
