//! CLI command implementations

pub mod credential;
pub mod keys;
pub mod roles;
pub mod serve;
pub mod status;

/// Render a millisecond timestamp for humans
pub(crate) fn format_millis(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}
