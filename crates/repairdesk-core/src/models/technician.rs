//! Technician domain model.

use serde::{Deserialize, Serialize};

use crate::error::ShopResult;
use crate::validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Technician {
    pub id: String,
    pub name: String,
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateTechnician {
    pub name: String,
    pub specialty: Option<String>,
}

impl CreateTechnician {
    pub fn normalize(self) -> ShopResult<Self> {
        Ok(Self {
            name: validate::required("name", &self.name)?,
            specialty: validate::optional(self.specialty),
        })
    }
}
