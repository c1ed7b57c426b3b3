//! Store invitations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::role::StoreRole;

/// Lifecycle of an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Cancelled,
    Expired,
}

impl InvitationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvitationStatus::Pending => "PENDING",
            InvitationStatus::Accepted => "ACCEPTED",
            InvitationStatus::Cancelled => "CANCELLED",
            InvitationStatus::Expired => "EXPIRED",
        }
    }
}

/// An invitation for an email address to join a store with a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Invitation {
    pub id: Uuid,
    pub store_id: Uuid,
    pub email: String,
    pub role: StoreRole,
    /// Secret token; only managers of the store ever see it
    pub token: String,
    pub status: InvitationStatus,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Status as seen at `now`; pending invitations past expiry read as expired.
    pub fn status_at(&self, now: DateTime<Utc>) -> InvitationStatus {
        effective_status(self.status, self.expires_at, now)
    }

    /// Fail unless the invitation can still be accepted.
    pub fn ensure_acceptable(&self, now: DateTime<Utc>) -> DomainResult<()> {
        acceptable(self.status_at(now))
    }

    /// Fail unless the invitation can still be cancelled.
    pub fn ensure_cancellable(&self) -> DomainResult<()> {
        if self.status == InvitationStatus::Pending {
            Ok(())
        } else {
            Err(DomainError::InvitationNotPending)
        }
    }
}

/// What an invitee sees before signing in (no token, no inviter).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InvitationPreview {
    pub store_id: Uuid,
    pub email: String,
    pub role: StoreRole,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
}

impl InvitationPreview {
    pub fn at(invitation: &Invitation, now: DateTime<Utc>) -> Self {
        Self {
            store_id: invitation.store_id,
            email: invitation.email.clone(),
            role: invitation.role,
            status: invitation.status_at(now),
            expires_at: invitation.expires_at,
        }
    }

    /// Re-evaluate a stored status at `now`.
    pub fn settle(mut self, now: DateTime<Utc>) -> Self {
        self.status = effective_status(self.status, self.expires_at, now);
        self
    }

    pub fn ensure_acceptable(&self, now: DateTime<Utc>) -> DomainResult<()> {
        acceptable(effective_status(self.status, self.expires_at, now))
    }
}

fn effective_status(
    status: InvitationStatus,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> InvitationStatus {
    match status {
        InvitationStatus::Pending if now >= expires_at => InvitationStatus::Expired,
        status => status,
    }
}

fn acceptable(status: InvitationStatus) -> DomainResult<()> {
    match status {
        InvitationStatus::Pending => Ok(()),
        InvitationStatus::Expired => Err(DomainError::InvitationExpired),
        _ => Err(DomainError::InvitationNotPending),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invitation(status: InvitationStatus, expires_in: Duration) -> Invitation {
        let now = Utc::now();
        Invitation {
            id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            email: "staff@example.com".to_string(),
            role: StoreRole::PartTimer,
            token: "tok".to_string(),
            status,
            invited_by: Uuid::new_v4(),
            expires_at: now + expires_in,
            created_at: now,
        }
    }

    #[test]
    fn pending_and_unexpired_is_acceptable() {
        let inv = invitation(InvitationStatus::Pending, Duration::days(1));
        assert_eq!(inv.ensure_acceptable(Utc::now()), Ok(()));
    }

    #[test]
    fn pending_past_expiry_reads_as_expired() {
        let inv = invitation(InvitationStatus::Pending, Duration::seconds(-1));
        let now = Utc::now();
        assert_eq!(inv.status_at(now), InvitationStatus::Expired);
        assert_eq!(inv.ensure_acceptable(now), Err(DomainError::InvitationExpired));
    }

    #[test]
    fn accepted_or_cancelled_cannot_be_accepted() {
        let accepted = invitation(InvitationStatus::Accepted, Duration::days(1));
        assert_eq!(
            accepted.ensure_acceptable(Utc::now()),
            Err(DomainError::InvitationNotPending)
        );
        let cancelled = invitation(InvitationStatus::Cancelled, Duration::days(1));
        assert_eq!(cancelled.ensure_cancellable(), Err(DomainError::InvitationNotPending));
    }

    #[test]
    fn preview_hides_token() {
        let inv = invitation(InvitationStatus::Pending, Duration::days(1));
        let json = serde_json::to_value(InvitationPreview::at(&inv, Utc::now())).unwrap();
        assert!(json.get("token").is_none());
        assert_eq!(json["status"], "PENDING");
    }

    #[test]
    fn stored_preview_settles_to_expired() {
        let inv = invitation(InvitationStatus::Pending, Duration::seconds(-1));
        let stored = InvitationPreview {
            status: InvitationStatus::Pending,
            ..InvitationPreview::at(&inv, inv.created_at - Duration::days(1))
        };
        let now = Utc::now();
        assert_eq!(
            stored.ensure_acceptable(now),
            Err(DomainError::InvitationExpired)
        );
        assert_eq!(stored.settle(now).status, InvitationStatus::Expired);
    }
}
