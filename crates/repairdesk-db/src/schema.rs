//! Schema definitions and migration runner for SurrealDB.
//!
//! All tables are SCHEMAFULL. Foreign keys are typed record links, enum
//! values are strings guarded by ASSERT clauses. Schema evolution is an
//! ordered list of versioned steps; every step is also idempotent on its
//! own, so replaying one against an already-upgraded store changes
//! nothing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

/// Type of a column added by [`ensure_column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    OptionalText,
    Datetime,
    OptionalDatetime,
    Decimal,
    Integer,
}

impl ColumnType {
    fn ddl(self) -> &'static str {
        match self {
            ColumnType::Text => "string",
            ColumnType::OptionalText => "option<string>",
            ColumnType::Datetime => "datetime",
            ColumnType::OptionalDatetime => "option<datetime>",
            ColumnType::Decimal => "decimal",
            ColumnType::Integer => "int",
        }
    }

    fn is_optional(self) -> bool {
        matches!(self, ColumnType::OptionalText | ColumnType::OptionalDatetime)
    }
}

/// Value written into existing rows when a column is added.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDefault {
    /// Leave existing rows without a value (optional columns only).
    None,
    /// The store's clock at backfill time.
    Now,
    Timestamp(DateTime<Utc>),
    Text(String),
    Integer(i64),
    Decimal(Decimal),
}

enum Step {
    Ddl(&'static str),
    Column {
        table: &'static str,
        column: &'static str,
        column_type: ColumnType,
        default: fn() -> ColumnDefault,
    },
}

struct Migration {
    version: u32,
    name: &'static str,
    step: Step,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        step: Step::Ddl(SCHEMA_V1),
    },
    // Customers registered before the registration date existed are
    // stamped with the time of the upgrade.
    Migration {
        version: 2,
        name: "customer_registered_at",
        step: Step::Column {
            table: "customer",
            column: "registered_at",
            column_type: ColumnType::Datetime,
            default: || ColumnDefault::Timestamp(Utc::now()),
        },
    },
    Migration {
        version: 3,
        name: "equipment_notes",
        step: Step::Column {
            table: "equipment",
            column: "notes",
            column_type: ColumnType::OptionalText,
            default: || ColumnDefault::None,
        },
    },
];

// -----------------------------------------------------------------------
// Schema v1: first release table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Customers
-- =======================================================================
DEFINE TABLE IF NOT EXISTS customer SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS name ON TABLE customer TYPE string;
DEFINE FIELD IF NOT EXISTS phone ON TABLE customer TYPE string;
DEFINE FIELD IF NOT EXISTS email ON TABLE customer TYPE option<string>;
DEFINE FIELD IF NOT EXISTS street ON TABLE customer TYPE option<string>;
DEFINE FIELD IF NOT EXISTS number ON TABLE customer TYPE option<string>;
DEFINE FIELD IF NOT EXISTS neighborhood ON TABLE customer \
    TYPE option<string>;
DEFINE FIELD IF NOT EXISTS city ON TABLE customer TYPE option<string>;
DEFINE FIELD IF NOT EXISTS state ON TABLE customer TYPE option<string>;
DEFINE INDEX IF NOT EXISTS idx_customer_name ON TABLE customer \
    COLUMNS name;

-- =======================================================================
-- Equipment (belongs to a customer)
-- =======================================================================
DEFINE TABLE IF NOT EXISTS equipment SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS customer ON TABLE equipment \
    TYPE record<customer>;
DEFINE FIELD IF NOT EXISTS equipment_type ON TABLE equipment TYPE string;
DEFINE FIELD IF NOT EXISTS brand ON TABLE equipment TYPE option<string>;
DEFINE FIELD IF NOT EXISTS model ON TABLE equipment TYPE option<string>;
DEFINE FIELD IF NOT EXISTS serial_number ON TABLE equipment \
    TYPE option<string>;
DEFINE INDEX IF NOT EXISTS idx_equipment_customer ON TABLE equipment \
    COLUMNS customer;

-- =======================================================================
-- Products (inventory)
-- =======================================================================
DEFINE TABLE IF NOT EXISTS product SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS name ON TABLE product TYPE string;
DEFINE FIELD IF NOT EXISTS description ON TABLE product \
    TYPE option<string>;
DEFINE FIELD IF NOT EXISTS unit_price ON TABLE product TYPE decimal \
    DEFAULT 0dec ASSERT $value >= 0;
DEFINE FIELD IF NOT EXISTS quantity ON TABLE product TYPE int \
    DEFAULT 0 ASSERT $value >= 0;

-- =======================================================================
-- Technicians
-- =======================================================================
DEFINE TABLE IF NOT EXISTS technician SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS name ON TABLE technician TYPE string;
DEFINE FIELD IF NOT EXISTS specialty ON TABLE technician \
    TYPE option<string>;

-- =======================================================================
-- Service orders
-- =======================================================================
DEFINE TABLE IF NOT EXISTS service_order SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS customer ON TABLE service_order \
    TYPE record<customer>;
DEFINE FIELD IF NOT EXISTS equipment ON TABLE service_order \
    TYPE record<equipment>;
DEFINE FIELD IF NOT EXISTS technician ON TABLE service_order \
    TYPE record<technician>;
DEFINE FIELD IF NOT EXISTS opened_at ON TABLE service_order \
    TYPE datetime;
DEFINE FIELD IF NOT EXISTS closed_at ON TABLE service_order \
    TYPE option<datetime>;
DEFINE FIELD IF NOT EXISTS status ON TABLE service_order TYPE string \
    ASSERT $value IN ['Open', 'InProgress', 'AwaitingParts', 'Closed'];
DEFINE FIELD IF NOT EXISTS problem_description ON TABLE service_order \
    TYPE string DEFAULT '';
DEFINE FIELD IF NOT EXISTS solution_description ON TABLE service_order \
    TYPE option<string>;
DEFINE INDEX IF NOT EXISTS idx_service_order_opened_at \
    ON TABLE service_order COLUMNS opened_at;
DEFINE INDEX IF NOT EXISTS idx_service_order_customer \
    ON TABLE service_order COLUMNS customer;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Bring the store up to the current schema.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum. Safe to
/// call on every start.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let current_version = current_version(db).await?;

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        let outcome = match &migration.step {
            Step::Ddl(sql) => db
                .query(*sql)
                .await?
                .check()
                .map(|_| ())
                .map_err(|e| DbError::Migration(e.to_string())),
            Step::Column {
                table,
                column,
                column_type,
                default,
            } => ensure_column(db, table, column, *column_type, *default)
                .await
                .map(|_| ()),
        };
        outcome.map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        // Record the applied migration.
        db.query(
            "CREATE _migration SET version = $version, \
             name = $name",
        )
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!(
                "Failed to record migration v{}: {}",
                migration.version, e,
            ))
        })?;

        info!(
            version = migration.version,
            "Migration applied successfully"
        );
    }

    Ok(())
}

/// Highest migration version recorded in the store, 0 for a fresh one.
pub async fn current_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    Ok(records.first().map(|m| m.version).unwrap_or(0))
}

/// Highest migration version this build knows about.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

/// Add `column` to `table` if it is missing and backfill existing rows.
///
/// Presence is probed with `INFO FOR TABLE`. When the column already
/// exists nothing is written and `default` is never called. The field
/// definition and the backfill run in one transaction. Returns whether
/// the column was added.
pub async fn ensure_column<C, F>(
    db: &Surreal<C>,
    table: &str,
    column: &str,
    column_type: ColumnType,
    default: F,
) -> Result<bool, DbError>
where
    C: Connection,
    F: FnOnce() -> ColumnDefault,
{
    check_identifier("table", table)?;
    check_identifier("column", column)?;

    if column_exists(db, table, column).await? {
        debug!(table, column, "Column already present, nothing to do");
        return Ok(false);
    }

    let default = default();
    if default == ColumnDefault::None && !column_type.is_optional() {
        return Err(DbError::Validation(format!(
            "column {table}.{column} is not optional and needs a backfill default"
        )));
    }

    let backfill = match default {
        ColumnDefault::None => None,
        ColumnDefault::Now => Some("time::now()"),
        _ => Some("$default"),
    };

    let mut sql = format!(
        "BEGIN TRANSACTION;\n\
         DEFINE FIELD {column} ON TABLE {table} TYPE {ty};\n",
        ty = column_type.ddl(),
    );
    if let Some(value) = backfill {
        sql.push_str(&format!(
            "UPDATE {table} SET {column} = {value} WHERE {column} = NONE RETURN NONE;\n"
        ));
    }
    sql.push_str("COMMIT TRANSACTION;");

    let query = db.query(sql);
    let query = match default {
        ColumnDefault::Timestamp(at) => query.bind(("default", at)),
        ColumnDefault::Text(text) => query.bind(("default", text)),
        ColumnDefault::Integer(n) => query.bind(("default", n)),
        ColumnDefault::Decimal(d) => query.bind(("default", d)),
        ColumnDefault::None | ColumnDefault::Now => query,
    };

    let mut response = query.await?;
    if let Some(err) = DbError::from_statements(response.take_errors()) {
        return Err(err);
    }

    info!(table, column, ty = column_type.ddl(), "Column added");
    Ok(true)
}

/// Whether `table` defines `column`.
pub async fn column_exists<C: Connection>(
    db: &Surreal<C>,
    table: &str,
    column: &str,
) -> Result<bool, DbError> {
    check_identifier("table", table)?;

    let mut result = db
        .query(format!(
            "RETURN object::keys((INFO FOR TABLE {table}).fields ?? {{}}) CONTAINS $column"
        ))
        .bind(("column", column.to_string()))
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;
    let present: Option<bool> = result.take(0)?;

    Ok(present.unwrap_or(false))
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for tests that need a store in its first-release shape.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

/// Names are spliced into DDL, so only plain identifiers are accepted.
fn check_identifier(kind: &str, name: &str) -> Result<(), DbError> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DbError::Validation(format!("invalid {kind} name: {name:?}")))
    }
}
