//! Lifecycle configuration.

/// Configuration for the order lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Whether a closed order may be moved back to a non-closed status
    /// (default: true). Reopening clears the close date and keeps the
    /// solution text.
    pub allow_reopen: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self { allow_reopen: true }
    }
}
