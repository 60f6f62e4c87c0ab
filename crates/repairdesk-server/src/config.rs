//! Process configuration, read from environment variables.

use repairdesk_core::models::customer::PhoneRules;
use repairdesk_db::DbConfig;
use repairdesk_lifecycle::LifecycleConfig;

/// RepairDesk configuration. Every variable is optional.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db: DbConfig,
    pub lifecycle: LifecycleConfig,
    /// Applied to new customers.
    pub phone_rules: PhoneRules,
    /// Emit JSON log lines instead of the human-readable format.
    pub log_json: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_defaults = DbConfig::default();
        let lifecycle_defaults = LifecycleConfig::default();

        Self {
            db: DbConfig {
                endpoint: lookup("REPAIRDESK_DB_ENDPOINT").unwrap_or(db_defaults.endpoint),
                namespace: lookup("REPAIRDESK_DB_NAMESPACE").unwrap_or(db_defaults.namespace),
                database: lookup("REPAIRDESK_DB_DATABASE").unwrap_or(db_defaults.database),
            },
            lifecycle: LifecycleConfig {
                allow_reopen: lookup("REPAIRDESK_ALLOW_REOPEN")
                    .and_then(|v| parse_flag(&v))
                    .unwrap_or(lifecycle_defaults.allow_reopen),
            },
            phone_rules: PhoneRules {
                min_digits: lookup("REPAIRDESK_PHONE_MIN_DIGITS")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(PhoneRules::default().min_digits),
            },
            log_json: lookup("REPAIRDESK_LOG_JSON")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(true),
        }
    }
}

/// Unrecognised values fall back to the default.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
