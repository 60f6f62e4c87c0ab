//! Customer domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ShopError, ShopResult};
use crate::validate;

/// A customer of the shop. Owns zero or more equipment records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Digits only, e.g. `11999999999`.
    pub phone: String,
    pub email: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    /// Set once at creation.
    pub registered_at: DateTime<Utc>,
}

/// Fields required to register a new customer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateCustomer {
    pub name: String,
    /// Free-form input; formatting characters are stripped.
    pub phone: String,
    pub email: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Phone acceptance rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhoneRules {
    /// Minimum number of digits after stripping formatting. Zero accepts
    /// any non-empty phone.
    pub min_digits: usize,
}

impl CreateCustomer {
    /// Trim every field, canonicalise the phone to digits and enforce the
    /// required fields.
    pub fn normalize(self, rules: PhoneRules) -> ShopResult<Self> {
        let name = validate::required("name", &self.name)?;
        let phone = validate::digits_only(&self.phone);
        if phone.is_empty() {
            return Err(ShopError::validation("phone is required"));
        }
        if phone.len() < rules.min_digits {
            return Err(ShopError::validation(format!(
                "phone must have at least {} digits",
                rules.min_digits
            )));
        }

        Ok(Self {
            name,
            phone,
            email: validate::optional(self.email),
            street: validate::optional(self.street),
            number: validate::optional(self.number),
            neighborhood: validate::optional(self.neighborhood),
            city: validate::optional(self.city),
            state: validate::optional(self.state),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, phone: &str) -> CreateCustomer {
        CreateCustomer {
            name: name.into(),
            phone: phone.into(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = input("", "11999999999")
            .normalize(PhoneRules::default())
            .unwrap_err();
        assert!(matches!(err, ShopError::Validation { .. }));
    }

    #[test]
    fn empty_phone_is_rejected() {
        let err = input("Ana Silva", "")
            .normalize(PhoneRules::default())
            .unwrap_err();
        assert!(matches!(err, ShopError::Validation { .. }));

        // Formatting alone is still empty.
        let err = input("Ana Silva", "( ) -")
            .normalize(PhoneRules::default())
            .unwrap_err();
        assert!(matches!(err, ShopError::Validation { .. }));
    }

    #[test]
    fn phone_is_reduced_to_digits() {
        let normalized = input(" Ana Silva ", "(11) 99999-9999")
            .normalize(PhoneRules::default())
            .unwrap();
        assert_eq!(normalized.name, "Ana Silva");
        assert_eq!(normalized.phone, "11999999999");
    }

    #[test]
    fn minimum_digits_is_enforced_when_configured() {
        let rules = PhoneRules { min_digits: 11 };
        assert!(input("Ana", "9999-9999").normalize(rules).is_err());
        assert!(input("Ana", "(11) 99999-9999").normalize(rules).is_ok());
    }

    #[test]
    fn blank_optionals_become_none() {
        let normalized = CreateCustomer {
            name: "Ana".into(),
            phone: "1".into(),
            email: Some("   ".into()),
            city: Some(" Campinas ".into()),
            ..Default::default()
        }
        .normalize(PhoneRules::default())
        .unwrap();
        assert_eq!(normalized.email, None);
        assert_eq!(normalized.city.as_deref(), Some("Campinas"));
    }
}
