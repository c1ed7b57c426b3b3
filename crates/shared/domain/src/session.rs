//! Session lifetime evaluation.
//!
//! Clients poll the session endpoint on a fixed interval and use the
//! reported status to decide whether to refresh tokens or sign out.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Where a session stands relative to its expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    RefreshDue,
    Expired,
}

/// Classify a session expiring at `expires_at`.
pub fn evaluate_session(
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
    refresh_margin: Duration,
) -> SessionStatus {
    if now >= expires_at {
        SessionStatus::Expired
    } else if now + refresh_margin >= expires_at {
        SessionStatus::RefreshDue
    } else {
        SessionStatus::Active
    }
}

/// Session state reported to polling clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SessionReport {
    pub status: SessionStatus,
    pub expires_at: DateTime<Utc>,
    /// Seconds until the token expires (0 once expired)
    pub expires_in: i64,
    /// Seconds until the client should refresh (0 when already due)
    pub refresh_in: i64,
    /// How often the client should poll again
    pub poll_interval: i64,
}

impl SessionReport {
    pub fn new(
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
        refresh_margin: Duration,
        poll_interval: Duration,
    ) -> Self {
        let expires_in = (expires_at - now).num_seconds().max(0);
        let refresh_in = (expires_in - refresh_margin.num_seconds()).max(0);

        Self {
            status: evaluate_session(expires_at, now, refresh_margin),
            expires_at,
            expires_in,
            refresh_in,
            poll_interval: poll_interval.num_seconds(),
        }
    }
}
