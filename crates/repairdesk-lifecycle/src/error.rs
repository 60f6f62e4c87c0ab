//! Lifecycle error types.

use repairdesk_core::error::ShopError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("a solution description is required to close an order")]
    MissingSolution,

    #[error("{0} is required")]
    MissingReference(&'static str),

    #[error("service order {order_id} is closed and cannot be reopened")]
    ReopenNotAllowed { order_id: String },

    #[error("equipment {equipment_id} does not belong to customer {customer_id}")]
    EquipmentOwnerMismatch {
        equipment_id: String,
        customer_id: String,
    },
}

impl From<LifecycleError> for ShopError {
    fn from(err: LifecycleError) -> Self {
        ShopError::Validation {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_lifecycle_error_is_a_validation_error() {
        let errors = [
            LifecycleError::MissingSolution,
            LifecycleError::MissingReference("technician_id"),
            LifecycleError::ReopenNotAllowed {
                order_id: "OS00001".into(),
            },
            LifecycleError::EquipmentOwnerMismatch {
                equipment_id: "EQP00001".into(),
                customer_id: "CLI00002".into(),
            },
        ];
        for err in errors {
            assert!(matches!(ShopError::from(err), ShopError::Validation { .. }));
        }
    }

    #[test]
    fn messages_name_the_offending_field() {
        let err = ShopError::from(LifecycleError::MissingReference("equipment_id"));
        assert_eq!(err.to_string(), "Validation error: equipment_id is required");
    }
}
