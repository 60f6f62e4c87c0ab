//! SurrealDB implementation of [`TechnicianRepository`].

use repairdesk_core::error::ShopResult;
use repairdesk_core::ids::{EntityKind, SharedAllocator};
use repairdesk_core::models::technician::{CreateTechnician, Technician};
use repairdesk_core::repository::{DEFAULT_SEARCH_LIMIT, TechnicianRepository};
use repairdesk_core::validate;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};

use super::allocate;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct TechnicianRow {
    name: String,
    specialty: Option<String>,
}

#[derive(Debug, SurrealValue)]
struct TechnicianRowWithId {
    record_id: String,
    name: String,
    specialty: Option<String>,
}

/// SurrealDB implementation of the Technician repository.
#[derive(Clone)]
pub struct SurrealTechnicianRepository<C: Connection> {
    db: Surreal<C>,
    allocator: SharedAllocator,
}

impl<C: Connection> SurrealTechnicianRepository<C> {
    pub fn new(db: Surreal<C>, allocator: SharedAllocator) -> Self {
        Self { db, allocator }
    }
}

impl<C: Connection> TechnicianRepository for SurrealTechnicianRepository<C> {
    async fn create(&self, input: CreateTechnician) -> ShopResult<Technician> {
        let input = input.normalize()?;
        let id = allocate(&self.allocator, EntityKind::Technician)?;

        let result = self
            .db
            .query(
                "CREATE type::record('technician', $id) SET \
                 name = $name, specialty = $specialty",
            )
            .bind(("id", id.clone()))
            .bind(("name", input.name))
            .bind(("specialty", input.specialty))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<TechnicianRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("technician", id.clone()))?;

        info!(id = %id, "Technician registered");
        Ok(Technician {
            id,
            name: row.name,
            specialty: row.specialty,
        })
    }

    async fn get_by_id(&self, id: &str) -> ShopResult<Technician> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('technician', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TechnicianRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("technician", id))?;

        Ok(Technician {
            id: id.to_string(),
            name: row.name,
            specialty: row.specialty,
        })
    }

    async fn search(&self, term: Option<&str>) -> ShopResult<Vec<Technician>> {
        let term = validate::search_term(term);
        debug!(term = ?term, "Searching technicians");

        let query = match term {
            Some(term) => self
                .db
                .query(
                    "SELECT meta::id(id) AS record_id, * FROM technician \
                     WHERE string::contains(string::lowercase(name), $term) \
                     OR string::contains(string::lowercase(specialty ?? ''), $term)",
                )
                .bind(("term", term)),
            None => self
                .db
                .query("SELECT meta::id(id) AS record_id, * FROM technician LIMIT $limit")
                .bind(("limit", DEFAULT_SEARCH_LIMIT)),
        };

        let mut result = query.await.map_err(DbError::from)?;
        let rows: Vec<TechnicianRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| Technician {
                id: row.record_id,
                name: row.name,
                specialty: row.specialty,
            })
            .collect())
    }
}
