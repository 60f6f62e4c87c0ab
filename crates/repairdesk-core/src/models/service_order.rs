//! Service order (OS) domain model and its status rules.
//!
//! A service order ties a customer, one of their devices and a
//! technician together and moves through [`OrderStatus`] until it is
//! closed with a written solution.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ShopError, ShopResult};
use crate::validate;

/// Status of a service order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Open,
    InProgress,
    AwaitingParts,
    Closed,
}

/// What a status change does besides writing the new status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Between non-closed states, or to the same non-closed state.
    Advance,
    /// Into `Closed` (also `Closed -> Closed`, which re-stamps).
    Close,
    /// Out of `Closed` into any other state.
    Reopen,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Open,
        OrderStatus::InProgress,
        OrderStatus::AwaitingParts,
        OrderStatus::Closed,
    ];

    /// Persisted name.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Open => "Open",
            OrderStatus::InProgress => "InProgress",
            OrderStatus::AwaitingParts => "AwaitingParts",
            OrderStatus::Closed => "Closed",
        }
    }

    /// Label shown to shop staff.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Open => "Aberta",
            OrderStatus::InProgress => "Em andamento",
            OrderStatus::AwaitingParts => "Aguardando peças",
            OrderStatus::Closed => "Fechada",
        }
    }

    pub fn is_closed(self) -> bool {
        self == OrderStatus::Closed
    }

    /// Transition table.
    ///
    /// Returns `None` when the move is not permitted. Reopening a closed
    /// order is permitted only when `allow_reopen` is set.
    pub fn transition_to(self, next: OrderStatus, allow_reopen: bool) -> Option<TransitionKind> {
        match (self, next) {
            (_, OrderStatus::Closed) => Some(TransitionKind::Close),
            (OrderStatus::Closed, _) if allow_reopen => Some(TransitionKind::Reopen),
            (OrderStatus::Closed, _) => None,
            _ => Some(TransitionKind::Advance),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ShopError;

    /// Accepts the persisted names and the shop labels, ignoring case
    /// and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| {
                status.as_str().to_lowercase() == wanted || status.label().to_lowercase() == wanted
            })
            .ok_or_else(|| ShopError::validation(format!("unknown order status: {}", s.trim())))
    }
}

/// A repair order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceOrder {
    pub id: String,
    pub customer_id: String,
    pub equipment_id: String,
    pub technician_id: String,
    pub opened_at: DateTime<Utc>,
    /// Present exactly when `status` is `Closed`.
    pub closed_at: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    /// May be empty.
    pub problem_description: String,
    pub solution_description: Option<String>,
}

/// Fields required to open a service order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateServiceOrder {
    pub customer_id: String,
    pub equipment_id: String,
    pub technician_id: String,
    pub problem_description: String,
}

impl CreateServiceOrder {
    pub fn normalize(self) -> ShopResult<Self> {
        Ok(Self {
            customer_id: validate::required("customer_id", &self.customer_id)?,
            equipment_id: validate::required("equipment_id", &self.equipment_id)?,
            technician_id: validate::required("technician_id", &self.technician_id)?,
            problem_description: self.problem_description.trim().to_string(),
        })
    }
}

/// Persisted effect of a status transition.
///
/// `closed_at`: `Some(Some(t))` = set, `Some(None)` = clear, `None` = no
/// change. `solution_description`: `Some` = overwrite, `None` = keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    pub closed_at: Option<Option<DateTime<Utc>>>,
    pub solution_description: Option<String>,
}

/// A service order joined with its customer, equipment and technician,
/// flattened for display and document generation.
///
/// Joined columns are optional: a reference to a missing record yields
/// `None` rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceOrderView {
    pub id: String,
    pub status: OrderStatus,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub problem_description: String,
    pub solution_description: Option<String>,

    pub customer_id: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub customer_street: Option<String>,
    pub customer_number: Option<String>,
    pub customer_neighborhood: Option<String>,
    pub customer_city: Option<String>,
    pub customer_state: Option<String>,

    pub equipment_id: String,
    pub equipment_type: Option<String>,
    pub equipment_brand: Option<String>,
    pub equipment_model: Option<String>,
    pub equipment_serial_number: Option<String>,
    pub equipment_notes: Option<String>,

    pub technician_id: String,
    pub technician_name: Option<String>,
    pub technician_specialty: Option<String>,
}
