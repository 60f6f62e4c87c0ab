//! Order lifecycle service — opening orders and status transitions.

use chrono::Utc;
use repairdesk_core::error::ShopResult;
use repairdesk_core::models::service_order::{
    CreateServiceOrder, OrderStatus, ServiceOrder, ServiceOrderView, StatusUpdate, TransitionKind,
};
use repairdesk_core::repository::{EquipmentRepository, ServiceOrderRepository};
use tracing::info;

use crate::config::LifecycleConfig;
use crate::error::LifecycleError;

/// Order lifecycle engine.
///
/// Generic over repository implementations so that the lifecycle layer
/// has no dependency on the database crate. Every rule is checked before
/// anything is written, so a rejected call leaves the order as it was.
pub struct OrderLifecycle<O: ServiceOrderRepository, E: EquipmentRepository> {
    order_repo: O,
    equipment_repo: E,
    config: LifecycleConfig,
}

impl<O: ServiceOrderRepository, E: EquipmentRepository> OrderLifecycle<O, E> {
    pub fn new(order_repo: O, equipment_repo: E, config: LifecycleConfig) -> Self {
        Self {
            order_repo,
            equipment_repo,
            config,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Open a new order in status `Open`.
    ///
    /// The three references are required and must exist; the equipment
    /// must belong to the customer. The problem description may be empty.
    pub async fn create(&self, input: CreateServiceOrder) -> ShopResult<ServiceOrder> {
        let customer_id = require_reference("customer_id", &input.customer_id)?;
        let equipment_id = require_reference("equipment_id", &input.equipment_id)?;
        require_reference("technician_id", &input.technician_id)?;

        let equipment = self.equipment_repo.get_by_id(&equipment_id).await?;
        if equipment.customer_id != customer_id {
            return Err(LifecycleError::EquipmentOwnerMismatch {
                equipment_id,
                customer_id,
            }
            .into());
        }

        let order = self.order_repo.create(input).await?;

        info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            equipment_id = %order.equipment_id,
            technician_id = %order.technician_id,
            "Service order opened"
        );
        Ok(order)
    }

    /// Move an order to `new_status`.
    ///
    /// Closing requires a non-blank solution and stamps the close date;
    /// closing an already closed order re-stamps it and replaces the
    /// solution. Reopening clears the close date and is refused when
    /// [`LifecycleConfig::allow_reopen`] is off. Other moves write the
    /// status only and ignore `solution_description`.
    pub async fn set_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
        solution_description: Option<&str>,
    ) -> ShopResult<ServiceOrder> {
        let current = self.order_repo.get_by_id(order_id).await?;

        let kind = current
            .status
            .transition_to(new_status, self.config.allow_reopen)
            .ok_or_else(|| LifecycleError::ReopenNotAllowed {
                order_id: current.id.clone(),
            })?;

        let update = match kind {
            TransitionKind::Close => {
                let solution = solution_description
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or(LifecycleError::MissingSolution)?;
                StatusUpdate {
                    status: new_status,
                    closed_at: Some(Some(Utc::now())),
                    solution_description: Some(solution.to_string()),
                }
            }
            TransitionKind::Reopen => StatusUpdate {
                status: new_status,
                closed_at: Some(None),
                solution_description: None,
            },
            TransitionKind::Advance => StatusUpdate {
                status: new_status,
                closed_at: None,
                solution_description: None,
            },
        };

        let order = self.order_repo.apply_status_update(order_id, update).await?;

        info!(
            order_id = %order.id,
            from = %current.status,
            to = %order.status,
            transition = ?kind,
            "Service order status changed"
        );
        Ok(order)
    }

    pub async fn get(&self, order_id: &str) -> ShopResult<ServiceOrder> {
        self.order_repo.get_by_id(order_id).await
    }

    /// Joined order views, newest first.
    pub async fn search(&self, term: Option<&str>) -> ShopResult<Vec<ServiceOrderView>> {
        self.order_repo.search(term).await
    }

    /// Fully joined view of one order, for document generation.
    pub async fn report(&self, order_id: &str) -> ShopResult<ServiceOrderView> {
        self.order_repo.get_view(order_id).await
    }
}

fn require_reference(field: &'static str, value: &str) -> Result<String, LifecycleError> {
    let value = value.trim();
    if value.is_empty() {
        Err(LifecycleError::MissingReference(field))
    } else {
        Ok(value.to_string())
    }
}
