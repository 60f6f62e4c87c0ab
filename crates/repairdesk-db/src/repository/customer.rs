//! SurrealDB implementation of [`CustomerRepository`].

use chrono::{DateTime, Utc};
use repairdesk_core::error::ShopResult;
use repairdesk_core::ids::{EntityKind, SharedAllocator};
use repairdesk_core::models::customer::{CreateCustomer, Customer, PhoneRules};
use repairdesk_core::repository::{CustomerRepository, DEFAULT_SEARCH_LIMIT};
use repairdesk_core::validate;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};

use super::allocate;
use crate::error::DbError;

/// DB-side row struct for queries where the id is already known.
#[derive(Debug, SurrealValue)]
struct CustomerRow {
    name: String,
    phone: String,
    email: Option<String>,
    street: Option<String>,
    number: Option<String>,
    neighborhood: Option<String>,
    city: Option<String>,
    state: Option<String>,
    registered_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct CustomerRowWithId {
    record_id: String,
    name: String,
    phone: String,
    email: Option<String>,
    street: Option<String>,
    number: Option<String>,
    neighborhood: Option<String>,
    city: Option<String>,
    state: Option<String>,
    registered_at: DateTime<Utc>,
}

impl CustomerRow {
    fn into_customer(self, id: String) -> Customer {
        Customer {
            id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            street: self.street,
            number: self.number,
            neighborhood: self.neighborhood,
            city: self.city,
            state: self.state,
            registered_at: self.registered_at,
        }
    }
}

impl From<CustomerRowWithId> for Customer {
    fn from(row: CustomerRowWithId) -> Self {
        Customer {
            id: row.record_id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            street: row.street,
            number: row.number,
            neighborhood: row.neighborhood,
            city: row.city,
            state: row.state,
            registered_at: row.registered_at,
        }
    }
}

/// SurrealDB implementation of the Customer repository.
#[derive(Clone)]
pub struct SurrealCustomerRepository<C: Connection> {
    db: Surreal<C>,
    allocator: SharedAllocator,
    phone_rules: PhoneRules,
}

impl<C: Connection> SurrealCustomerRepository<C> {
    pub fn new(db: Surreal<C>, allocator: SharedAllocator) -> Self {
        Self {
            db,
            allocator,
            phone_rules: PhoneRules::default(),
        }
    }

    pub fn with_phone_rules(db: Surreal<C>, allocator: SharedAllocator, rules: PhoneRules) -> Self {
        Self {
            db,
            allocator,
            phone_rules: rules,
        }
    }
}

impl<C: Connection> CustomerRepository for SurrealCustomerRepository<C> {
    async fn create(&self, input: CreateCustomer) -> ShopResult<Customer> {
        let input = input.normalize(self.phone_rules)?;
        let id = allocate(&self.allocator, EntityKind::Customer)?;

        let result = self
            .db
            .query(
                "CREATE type::record('customer', $id) SET \
                 name = $name, phone = $phone, email = $email, \
                 street = $street, number = $number, \
                 neighborhood = $neighborhood, city = $city, \
                 state = $state, registered_at = $registered_at",
            )
            .bind(("id", id.clone()))
            .bind(("name", input.name))
            .bind(("phone", input.phone))
            .bind(("email", input.email))
            .bind(("street", input.street))
            .bind(("number", input.number))
            .bind(("neighborhood", input.neighborhood))
            .bind(("city", input.city))
            .bind(("state", input.state))
            .bind(("registered_at", Utc::now()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<CustomerRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("customer", id.clone()))?;

        info!(id = %id, "Customer registered");
        Ok(row.into_customer(id))
    }

    async fn get_by_id(&self, id: &str) -> ShopResult<Customer> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('customer', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CustomerRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("customer", id))?;

        Ok(row.into_customer(id.to_string()))
    }

    async fn search(&self, term: Option<&str>) -> ShopResult<Vec<Customer>> {
        let term = validate::search_term(term);
        debug!(term = ?term, "Searching customers");

        let query = match term {
            Some(term) => self
                .db
                .query(
                    "SELECT meta::id(id) AS record_id, * FROM customer \
                     WHERE string::contains(string::lowercase(name), $term) \
                     OR string::contains(string::lowercase(phone), $term) \
                     OR string::contains(string::lowercase(email ?? ''), $term)",
                )
                .bind(("term", term)),
            None => self
                .db
                .query("SELECT meta::id(id) AS record_id, * FROM customer LIMIT $limit")
                .bind(("limit", DEFAULT_SEARCH_LIMIT)),
        };

        let mut result = query.await.map_err(DbError::from)?;
        let rows: Vec<CustomerRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }
}
