//! Human-readable sequential identifiers.
//!
//! Every record id is a fixed prefix followed by a five digit,
//! zero-padded counter (`CLI00001`, `OS00042`). The fixed width keeps
//! lexical order equal to numeric order, which is what lets the store
//! find the current maximum with a plain `ORDER BY id DESC`.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{ShopError, ShopResult};

/// Number of digits after the prefix.
pub const ID_DIGITS: usize = 5;

/// Largest counter value the fixed-width format can hold.
pub const MAX_COUNTER: u32 = 99_999;

/// The five entity types that receive sequential identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Customer,
    Equipment,
    Product,
    Technician,
    ServiceOrder,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Customer,
        EntityKind::Equipment,
        EntityKind::Product,
        EntityKind::Technician,
        EntityKind::ServiceOrder,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            EntityKind::Customer => "CLI",
            EntityKind::Equipment => "EQP",
            EntityKind::Product => "PRD",
            EntityKind::Technician => "TEC",
            EntityKind::ServiceOrder => "OS",
        }
    }

    /// Name of the table holding this entity.
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::Equipment => "equipment",
            EntityKind::Product => "product",
            EntityKind::Technician => "technician",
            EntityKind::ServiceOrder => "service_order",
        }
    }

    fn index(self) -> usize {
        match self {
            EntityKind::Customer => 0,
            EntityKind::Equipment => 1,
            EntityKind::Product => 2,
            EntityKind::Technician => 3,
            EntityKind::ServiceOrder => 4,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Render `counter` as an identifier for `kind`.
pub fn format_id(kind: EntityKind, counter: u32) -> ShopResult<String> {
    if counter == 0 || counter > MAX_COUNTER {
        return Err(ShopError::constraint(format!(
            "identifier space exhausted for {kind}: counter {counter} outside 1..={MAX_COUNTER}"
        )));
    }
    Ok(format!("{}{:0width$}", kind.prefix(), counter, width = ID_DIGITS))
}

/// Extract the numeric suffix of `id` if it is a well-formed identifier
/// for `kind`. Anything else (foreign prefix, wrong width, non-digits)
/// yields `None`.
pub fn parse_counter(kind: EntityKind, id: &str) -> Option<u32> {
    let digits = id.strip_prefix(kind.prefix())?;
    if digits.len() != ID_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// In-memory counters, one per entity type.
///
/// Seeded once at startup from the largest stored id of each type and
/// then incremented for every new record. Counters are never rolled
/// back, so an id consumed by a failed insert is simply skipped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    counters: [u32; 5],
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the counter for `kind` from the largest persisted id.
    ///
    /// Returns the counter value that was set. A missing or malformed
    /// maximum seeds zero.
    pub fn seed(&mut self, kind: EntityKind, max_persisted: Option<&str>) -> u32 {
        let value = max_persisted
            .and_then(|id| parse_counter(kind, id))
            .unwrap_or(0);
        self.counters[kind.index()] = value;
        value
    }

    /// Current counter value (the suffix of the last id handed out).
    pub fn current(&self, kind: EntityKind) -> u32 {
        self.counters[kind.index()]
    }

    /// Identifier the next call to [`IdAllocator::next_id`] would return.
    pub fn peek(&self, kind: EntityKind) -> ShopResult<String> {
        format_id(kind, self.current(kind).saturating_add(1))
    }

    pub fn next_id(&mut self, kind: EntityKind) -> ShopResult<String> {
        let next = self.current(kind).saturating_add(1);
        let id = format_id(kind, next)?;
        self.counters[kind.index()] = next;
        Ok(id)
    }
}

/// Allocator shared by every repository bound to the same store.
pub type SharedAllocator = Arc<Mutex<IdAllocator>>;

pub fn shared(allocator: IdAllocator) -> SharedAllocator {
    Arc::new(Mutex::new(allocator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_fixed_width() {
        assert_eq!(format_id(EntityKind::Customer, 1).unwrap(), "CLI00001");
        assert_eq!(format_id(EntityKind::ServiceOrder, 42).unwrap(), "OS00042");
        assert_eq!(format_id(EntityKind::Product, 99_999).unwrap(), "PRD99999");
    }

    #[test]
    fn parse_rejects_foreign_or_malformed_ids() {
        assert_eq!(parse_counter(EntityKind::Customer, "CLI00099"), Some(99));
        assert_eq!(parse_counter(EntityKind::Customer, "EQP00099"), None);
        assert_eq!(parse_counter(EntityKind::Customer, "CLI0099"), None);
        assert_eq!(parse_counter(EntityKind::Customer, "CLI000991"), None);
        assert_eq!(parse_counter(EntityKind::Customer, "CLI00a99"), None);
        assert_eq!(
            parse_counter(EntityKind::Customer, "5f0c6a4e-1b7e-4c1e-9d0b-6c2f9e6f8a11"),
            None
        );
    }

    #[test]
    fn next_id_is_strictly_increasing_per_kind() {
        for kind in EntityKind::ALL {
            let mut alloc = IdAllocator::new();
            let ids: Vec<String> = (0..25).map(|_| alloc.next_id(kind).unwrap()).collect();

            for id in &ids {
                assert!(id.starts_with(kind.prefix()), "{id} lacks {kind} prefix");
            }
            let counters: Vec<u32> = ids
                .iter()
                .map(|id| parse_counter(kind, id).unwrap())
                .collect();
            for window in counters.windows(2) {
                assert!(window[0] < window[1]);
            }
            // Lexical order agrees with numeric order.
            let mut sorted = ids.clone();
            sorted.sort();
            assert_eq!(sorted, ids);
        }
    }

    #[test]
    fn counters_are_independent() {
        let mut alloc = IdAllocator::new();
        alloc.next_id(EntityKind::Customer).unwrap();
        alloc.next_id(EntityKind::Customer).unwrap();
        assert_eq!(alloc.next_id(EntityKind::Technician).unwrap(), "TEC00001");
        assert_eq!(alloc.next_id(EntityKind::Customer).unwrap(), "CLI00003");
    }

    #[test]
    fn seed_continues_after_persisted_maximum() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.seed(EntityKind::Equipment, Some("EQP00100")), 100);
        assert_eq!(alloc.next_id(EntityKind::Equipment).unwrap(), "EQP00101");
    }

    #[test]
    fn seed_with_foreign_prefix_resets_to_zero() {
        let mut alloc = IdAllocator::new();
        alloc.seed(EntityKind::Customer, Some("CLI00007"));
        assert_eq!(alloc.seed(EntityKind::Customer, Some("legacy-17")), 0);
        assert_eq!(alloc.next_id(EntityKind::Customer).unwrap(), "CLI00001");
    }

    #[test]
    fn overflow_is_reported_and_counter_is_kept() {
        let mut alloc = IdAllocator::new();
        alloc.seed(EntityKind::Technician, Some("TEC99999"));

        let err = alloc.next_id(EntityKind::Technician).unwrap_err();
        assert!(matches!(err, ShopError::Constraint { .. }));
        assert_eq!(alloc.current(EntityKind::Technician), MAX_COUNTER);
        assert!(alloc.peek(EntityKind::Technician).is_err());
    }

    #[test]
    fn peek_does_not_consume() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.peek(EntityKind::Product).unwrap(), "PRD00001");
        assert_eq!(alloc.next_id(EntityKind::Product).unwrap(), "PRD00001");
        assert_eq!(alloc.peek(EntityKind::Product).unwrap(), "PRD00002");
    }
}
