//! # Activity Log Boundary
//!
//! Best-effort hook for the audit/activity-log collaborator.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Workflow command                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  transaction commits  ←── the primary operation is DONE here           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  activity_log.record(entry)                                            │
//! │       ├── Ok(_)   → nothing more to do                                 │
//! │       └── Err(e)  → tracing::warn!, swallowed                          │
//! │                                                                         │
//! │  An audit failure NEVER fails or undoes the primary operation.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Real deployments plug in an implementation that forwards to the activity
//! service; the default is a no-op.

use chrono::{DateTime, Utc};
use serde::Serialize;

// =============================================================================
// Activity Entry
// =============================================================================

/// One recorded workflow action.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    /// Tenant the action belongs to.
    pub tenant_id: String,

    /// Branch the action belongs to.
    pub branch_id: String,

    /// Actor who performed the action.
    pub actor_id: String,

    /// Machine-readable action name ("create_immediate_stay", "check_out", ...).
    pub action: &'static str,

    /// The booking the action applied to.
    pub booking_id: String,

    /// When the action completed.
    pub recorded_at: DateTime<Utc>,
}

// =============================================================================
// Activity Log Trait
// =============================================================================

/// The audit collaborator interface.
///
/// Implementations must be cheap or internally queued: `record` is called on
/// the command path (after commit) and should not block on slow I/O.
pub trait ActivityLog: Send + Sync {
    /// Records one entry. Errors are logged and swallowed by the caller.
    fn record(&self, entry: ActivityEntry) -> Result<(), String>;
}

/// Default activity log: discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopActivityLog;

impl ActivityLog for NoopActivityLog {
    fn record(&self, _entry: ActivityEntry) -> Result<(), String> {
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_accepts_entries() {
        let log = NoopActivityLog;
        let entry = ActivityEntry {
            tenant_id: "t".into(),
            branch_id: "b".into(),
            actor_id: "a".into(),
            action: "check_out",
            booking_id: "booking-1".into(),
            recorded_at: Utc::now(),
        };
        assert!(log.record(entry).is_ok());
    }
}
