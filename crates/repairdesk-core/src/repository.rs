//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. `create` assigns the identifier
//! and returns the stored record; `get_by_id` fails with
//! [`ShopError::NotFound`](crate::error::ShopError::NotFound) for an
//! unknown id. Search methods treat a blank term as no term.

use crate::error::ShopResult;
use crate::models::{
    customer::{CreateCustomer, Customer},
    equipment::{CreateEquipment, Equipment},
    product::{CreateProduct, Product},
    service_order::{CreateServiceOrder, ServiceOrder, ServiceOrderView, StatusUpdate},
    technician::{CreateTechnician, Technician},
};

/// Rows returned by an untermed customer/technician/product search.
pub const DEFAULT_SEARCH_LIMIT: u64 = 20;

/// Rows returned by an untermed service order search.
pub const DEFAULT_ORDER_SEARCH_LIMIT: u64 = 50;

// ---------------------------------------------------------------------------
// Registry entities
// ---------------------------------------------------------------------------

pub trait CustomerRepository: Send + Sync {
    fn create(&self, input: CreateCustomer) -> impl Future<Output = ShopResult<Customer>> + Send;
    fn get_by_id(&self, id: &str) -> impl Future<Output = ShopResult<Customer>> + Send;
    /// Case-insensitive substring match over name, phone and email.
    fn search(&self, term: Option<&str>) -> impl Future<Output = ShopResult<Vec<Customer>>> + Send;
}

pub trait EquipmentRepository: Send + Sync {
    /// Fails with `NotFound` when the owning customer does not exist.
    fn create(&self, input: CreateEquipment)
    -> impl Future<Output = ShopResult<Equipment>> + Send;
    fn get_by_id(&self, id: &str) -> impl Future<Output = ShopResult<Equipment>> + Send;
    fn list_by_customer(
        &self,
        customer_id: &str,
    ) -> impl Future<Output = ShopResult<Vec<Equipment>>> + Send;
}

pub trait ProductRepository: Send + Sync {
    fn create(&self, input: CreateProduct) -> impl Future<Output = ShopResult<Product>> + Send;
    fn get_by_id(&self, id: &str) -> impl Future<Output = ShopResult<Product>> + Send;
    /// Case-insensitive substring match over name and description.
    fn search(&self, term: Option<&str>) -> impl Future<Output = ShopResult<Vec<Product>>> + Send;
}

pub trait TechnicianRepository: Send + Sync {
    fn create(
        &self,
        input: CreateTechnician,
    ) -> impl Future<Output = ShopResult<Technician>> + Send;
    fn get_by_id(&self, id: &str) -> impl Future<Output = ShopResult<Technician>> + Send;
    /// Case-insensitive substring match over name and specialty.
    fn search(
        &self,
        term: Option<&str>,
    ) -> impl Future<Output = ShopResult<Vec<Technician>>> + Send;
}

// ---------------------------------------------------------------------------
// Service orders
// ---------------------------------------------------------------------------

pub trait ServiceOrderRepository: Send + Sync {
    /// Insert a new order in status `Open`, stamped with the current time.
    ///
    /// Fails with `NotFound` for the first referenced record that does
    /// not exist.
    fn create(
        &self,
        input: CreateServiceOrder,
    ) -> impl Future<Output = ShopResult<ServiceOrder>> + Send;
    fn get_by_id(&self, id: &str) -> impl Future<Output = ShopResult<ServiceOrder>> + Send;

    /// Persist the effect of a status transition. The caller is
    /// responsible for having validated the transition.
    fn apply_status_update(
        &self,
        id: &str,
        update: StatusUpdate,
    ) -> impl Future<Output = ShopResult<ServiceOrder>> + Send;

    /// Joined view of orders, newest first. Matches the order id or the
    /// customer name when a term is given; otherwise returns at most
    /// [`DEFAULT_ORDER_SEARCH_LIMIT`] rows.
    fn search(
        &self,
        term: Option<&str>,
    ) -> impl Future<Output = ShopResult<Vec<ServiceOrderView>>> + Send;

    /// Joined view of a single order.
    fn get_view(&self, id: &str) -> impl Future<Output = ShopResult<ServiceOrderView>> + Send;
}
