//! Equipment domain model.

use serde::{Deserialize, Serialize};

use crate::error::ShopResult;
use crate::validate;

/// A device brought in by a customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Equipment {
    pub id: String,
    /// Owning customer.
    pub customer_id: String,
    /// Kind of device (notebook, TV, smartphone...).
    pub equipment_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    /// Condition on arrival, accessories left with the device.
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateEquipment {
    pub customer_id: String,
    pub equipment_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub notes: Option<String>,
}

impl CreateEquipment {
    pub fn normalize(self) -> ShopResult<Self> {
        Ok(Self {
            customer_id: validate::required("customer_id", &self.customer_id)?,
            equipment_type: validate::required("equipment_type", &self.equipment_type)?,
            brand: validate::optional(self.brand),
            model: validate::optional(self.model),
            serial_number: validate::optional(self.serial_number),
            notes: validate::optional(self.notes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShopError;

    #[test]
    fn type_is_required() {
        let err = CreateEquipment {
            customer_id: "CLI00001".into(),
            equipment_type: " ".into(),
            ..Default::default()
        }
        .normalize()
        .unwrap_err();
        assert!(matches!(err, ShopError::Validation { .. }));
    }

    #[test]
    fn owner_is_required() {
        let err = CreateEquipment {
            equipment_type: "Notebook".into(),
            ..Default::default()
        }
        .normalize()
        .unwrap_err();
        assert!(matches!(err, ShopError::Validation { .. }));
    }
}
