//! Logging infrastructure for framekit.
//!
//! framekit uses `tracing` for structured logging. All events use target
//! "framekit" and include an `event` field for filtering.
//!
//! ## Library Integration
//!
//! framekit never initializes a global subscriber. Applications configure
//! tracing via `tracing_subscriber` or similar.
//!
//! ## Conventions
//!
//! - `event`: snake_case event name (required)
//! - `component`: operator or subsystem (e.g., "filter", "merge")
//! - Use `%` for Display, `?` for Debug formatting
//! - Per-row events are debug level only

/// Target for all framekit log events.
pub(crate) const FRAMEKIT_TARGET: &str = "framekit";

/// Macro for debug-level log events.
///
/// # Example
/// ```ignore
/// log_debug!(
///     component = "filter",
///     event = "filter_applied",
///     rows_in = before,
///     rows_out = after,
/// );
/// ```
macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::observability::FRAMEKIT_TARGET, $($field)*)
    };
}

/// Macro for warn-level log events.
macro_rules! log_warn {
    ($($field:tt)*) => {
        ::tracing::warn!(target: $crate::observability::FRAMEKIT_TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_warn;
