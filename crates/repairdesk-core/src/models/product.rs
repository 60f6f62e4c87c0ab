//! Product (inventory item) domain model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ShopError, ShopResult};
use crate::validate;

/// A stocked part or sellable item. Not referenced by other entities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    /// Quantity on hand.
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to zero.
    pub unit_price: Option<Decimal>,
    /// Defaults to zero.
    pub quantity: Option<u32>,
}

impl CreateProduct {
    pub fn normalize(self) -> ShopResult<Self> {
        let unit_price = self.unit_price.unwrap_or(Decimal::ZERO);
        if unit_price < Decimal::ZERO {
            return Err(ShopError::validation("unit_price must not be negative"));
        }
        Ok(Self {
            name: validate::required("name", &self.name)?,
            description: validate::optional(self.description),
            unit_price: Some(unit_price),
            quantity: Some(self.quantity.unwrap_or(0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_and_quantity_default_to_zero() {
        let normalized = CreateProduct {
            name: "Tela 6.1".into(),
            ..Default::default()
        }
        .normalize()
        .unwrap();
        assert_eq!(normalized.unit_price, Some(Decimal::ZERO));
        assert_eq!(normalized.quantity, Some(0));
    }

    #[test]
    fn negative_price_is_rejected() {
        let err = CreateProduct {
            name: "Bateria".into(),
            unit_price: Some(Decimal::new(-150, 2)),
            ..Default::default()
        }
        .normalize()
        .unwrap_err();
        assert!(matches!(err, ShopError::Validation { .. }));
    }
}
