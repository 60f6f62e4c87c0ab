//! SurrealDB connection management.

use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use tracing::info;

use crate::error::DbError;

/// Configuration for opening the RepairDesk store.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Engine endpoint: `rocksdb://<path>` for the on-disk store,
    /// `mem://` for a throwaway one.
    pub endpoint: String,
    /// SurrealDB namespace.
    pub namespace: String,
    /// SurrealDB database name.
    pub database: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            endpoint: "rocksdb://data/repairdesk.db".into(),
            namespace: "repairdesk".into(),
            database: "main".into(),
        }
    }
}

/// Owns the single store handle held for the process lifetime.
///
/// Clones share the underlying connection.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Any>,
}

impl DbManager {
    /// Open the store described by `config` and select the configured
    /// namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            endpoint = %config.endpoint,
            namespace = %config.namespace,
            database = %config.database,
            "Opening RepairDesk store"
        );

        let db = any::connect(config.endpoint.as_str()).await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("Store opened");

        Ok(Self { db })
    }

    /// Returns a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Any> {
        &self.db
    }
}
