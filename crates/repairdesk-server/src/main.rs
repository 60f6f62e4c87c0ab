//! RepairDesk — application entry point.
//!
//! Opens the store, brings its schema up to date, seeds the identifier
//! counters and logs a short summary before exiting.

mod config;

use anyhow::Context;
use repairdesk_core::ids::{self, EntityKind};
use repairdesk_db::repository::Repositories;
use repairdesk_db::{DbManager, initialize_counters, run_migrations};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();
    init_tracing(config.log_json);

    info!("Starting RepairDesk...");

    if let Err(err) = run(config).await {
        error!(error = %format!("{err:#}"), "RepairDesk startup failed");
        return Err(err);
    }

    info!("RepairDesk stopped.");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("repairdesk=info"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let manager = DbManager::connect(&config.db)
        .await
        .context("failed to open the store")?;
    let db = manager.client().clone();

    run_migrations(&db)
        .await
        .context("failed to upgrade the schema")?;

    let allocator = initialize_counters(&db)
        .await
        .context("failed to seed identifier counters")?;

    for kind in EntityKind::ALL {
        match allocator.peek(kind) {
            Ok(next_id) => info!(table = kind.table(), next_id = %next_id, "Next identifier"),
            Err(err) => warn!(table = kind.table(), error = %err, "Identifier space exhausted"),
        }
    }

    let repos = Repositories::with_phone_rules(db, ids::shared(allocator), config.phone_rules);

    let open_orders = repos
        .orders
        .count_open()
        .await
        .context("failed to count open orders")?;

    info!(
        open_orders,
        allow_reopen = config.lifecycle.allow_reopen,
        phone_min_digits = config.phone_rules.min_digits,
        "RepairDesk store ready"
    );

    Ok(())
}
