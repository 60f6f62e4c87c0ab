//! Seeding the identifier counters from the store.

use repairdesk_core::ids::{EntityKind, IdAllocator, parse_counter};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{info, warn};

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct IdRow {
    record_id: String,
}

/// Largest stored id of `kind` that carries the kind's prefix, in
/// lexical order.
pub async fn max_persisted_id<C: Connection>(
    db: &Surreal<C>,
    kind: EntityKind,
) -> Result<Option<String>, DbError> {
    let mut result = db
        .query(
            "SELECT <string> meta::id(id) AS record_id FROM type::table($table) \
             WHERE string::starts_with(<string> meta::id(id), $prefix) \
             ORDER BY record_id DESC LIMIT 1",
        )
        .bind(("table", kind.table()))
        .bind(("prefix", kind.prefix()))
        .await?;

    let rows: Vec<IdRow> = result.take(0)?;
    Ok(rows.into_iter().next().map(|row| row.record_id))
}

/// Build an allocator whose counters continue after the largest stored
/// id of every entity type.
///
/// A maximum that is not `prefix + 5 digits` seeds zero and is logged;
/// new ids may then collide with stored ones, which the store rejects on
/// insert.
pub async fn initialize_counters<C: Connection>(db: &Surreal<C>) -> Result<IdAllocator, DbError> {
    let mut allocator = IdAllocator::new();

    for kind in EntityKind::ALL {
        let max = max_persisted_id(db, kind).await?;
        let seeded = allocator.seed(kind, max.as_deref());

        if let Some(id) = max.as_deref()
            && parse_counter(kind, id).is_none()
        {
            warn!(
                table = kind.table(),
                id,
                "Largest stored id is not a well-formed identifier; counter reset to 0"
            );
        }

        info!(table = kind.table(), counter = seeded, "Counter seeded");
    }

    Ok(allocator)
}
