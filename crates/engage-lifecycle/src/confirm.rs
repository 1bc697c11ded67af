use crate::collaborators::{Notification, NotificationSink};
use chrono::{DateTime, Utc};
use engage_store::RequestStore;
use engage_types::{EngageError, ModificationRequest, RequestStatus};
use std::sync::Arc;
use tracing::{info, warn};

/// Public client-confirmation surface.
///
/// A client follows the tokened link from their confirmation email; the
/// gateway validates the token, records the acceptance, and emits one
/// notification event. There is no modeled rejection path: a client who
/// disagrees simply lets the token lapse.
pub struct ConfirmationGateway {
    requests: Arc<dyn RequestStore>,
    notifications: Arc<dyn NotificationSink>,
}

impl ConfirmationGateway {
    pub fn new(requests: Arc<dyn RequestStore>, notifications: Arc<dyn NotificationSink>) -> Self {
        Self {
            requests,
            notifications,
        }
    }

    pub fn lookup_by_token(&self, token: &str) -> Result<ModificationRequest, EngageError> {
        self.requests
            .find_by_token(token)?
            .ok_or_else(|| EngageError::NotFound("confirmation token".to_string()))
    }

    /// Records the client's acceptance of an approved change.
    ///
    /// Succeeds only while the request is `approved` and the token is within
    /// its validity window. Any failure leaves the stored request unchanged:
    /// every guard runs before the write, and the notification event after
    /// it is advisory — a failing notification subsystem must not mask a
    /// confirmation the client already gave, so it is logged and the
    /// committed acceptance is returned.
    pub fn accept(
        &self,
        token: &str,
        client_email: impl Into<String>,
    ) -> Result<ModificationRequest, EngageError> {
        self.accept_at(token, client_email, Utc::now())
    }

    /// Clock-explicit variant of [`accept`](Self::accept); expiry is a pure
    /// comparison against `now`.
    pub fn accept_at(
        &self,
        token: &str,
        client_email: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<ModificationRequest, EngageError> {
        let client_email = client_email.into();
        if client_email.trim().is_empty() || !client_email.contains('@') {
            return Err(EngageError::validation("a valid client email is required"));
        }

        let mut request = self.lookup_by_token(token)?;
        if request.status != RequestStatus::Approved {
            return Err(EngageError::invalid_state("accept", request.status));
        }
        let expiry = request.token_expiry.ok_or_else(|| {
            EngageError::Storage(format!("approved request '{}' has no token expiry", request.id))
        })?;
        if now > expiry {
            return Err(EngageError::ExpiredToken);
        }

        let read_version = request.version;
        request.status = RequestStatus::ClientApproved;
        request.client_email = Some(client_email);
        request.client_approved_at = Some(now);
        let stored = self.requests.update(request, read_version)?;

        let event = Notification {
            kind: "client_confirmation".to_string(),
            title: format!("Change confirmed for {}", stored.engagement_name),
            message: format!(
                "{} confirmed the {} change on {}",
                stored.client_name, stored.request_type, stored.engagement_name
            ),
            link: format!("/engagements/{}/modifications/{}", stored.engagement_id, stored.id),
            entity_ref: stored.id.clone(),
        };
        if let Err(err) = self.notifications.submit(event) {
            // The acceptance is committed; the notification is advisory.
            warn!(request = %stored.id, error = %err, "confirmation notification failed");
        }

        info!(request = %stored.id, "client confirmed modification");
        Ok(stored)
    }
}
