use crate::collaborators::EngagementMutator;
use crate::token::{generate_token, TOKEN_VALIDITY_DAYS};
use chrono::{Duration, NaiveDate, Utc};
use engage_history::HistoryArchive;
use engage_store::RequestStore;
use engage_types::{
    ClientId, ColleagueId, EmailLogEntry, EngageError, EngagementId, ModificationRequest,
    ProposedChange, RequestId, RequestStatus, Upsell,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Parameters for creating a modification request.
///
/// The request type is derived from the proposed change, so a payload can
/// never disagree with its declared type; the remaining field-level checks
/// run in [`ProposedChange::validate`].
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub engagement_id: EngagementId,
    pub client_id: ClientId,
    pub proposed_change: ProposedChange,
    pub effective_from: Option<NaiveDate>,
    pub upsold_by: Option<Upsell>,
    pub requested_by: ColleagueId,
    /// Denormalized display fields copied from the engagement records at
    /// creation time.
    pub client_name: String,
    pub engagement_name: String,
}

/// Partial update of a request still under review.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    /// Replacement payload. Must keep the original request type.
    pub proposed_change: Option<ProposedChange>,
    /// `Some(None)` clears the effective date.
    pub effective_from: Option<Option<NaiveDate>>,
    pub upsold_by: Option<Option<Upsell>>,
}

/// State machine over modification requests.
///
/// Transitions: `pending -> approved | rejected`; `approved ->
/// client_approved` (confirmation gateway, client-facing types only);
/// `approved -> applied` (non-client-facing types only); `client_approved ->
/// applied`. `rejected` and `applied` are terminal. Every transition checks
/// its guards before mutating and goes through a version compare-and-swap,
/// so a lost race surfaces as `ConcurrencyConflict` with stored state
/// intact.
pub struct RequestLifecycle {
    requests: Arc<dyn RequestStore>,
    archive: HistoryArchive,
    mutator: Arc<dyn EngagementMutator>,
}

impl RequestLifecycle {
    pub fn new(
        requests: Arc<dyn RequestStore>,
        archive: HistoryArchive,
        mutator: Arc<dyn EngagementMutator>,
    ) -> Self {
        Self {
            requests,
            archive,
            mutator,
        }
    }

    pub fn get(&self, id: &RequestId) -> Result<ModificationRequest, EngageError> {
        self.requests
            .get(id)?
            .ok_or_else(|| EngageError::not_found("request", id))
    }

    pub fn list(&self) -> Result<Vec<ModificationRequest>, EngageError> {
        self.requests.list()
    }

    /// Validates the payload and stores a new `pending` request.
    pub fn create(&self, params: CreateRequest) -> Result<ModificationRequest, EngageError> {
        params.proposed_change.validate()?;
        if let Some(upsell) = &params.upsold_by {
            upsell.validate()?;
        }

        let request = ModificationRequest {
            id: RequestId::generate(),
            engagement_id: params.engagement_id,
            client_id: params.client_id,
            request_type: params.proposed_change.request_type(),
            status: RequestStatus::Pending,
            proposed_change: params.proposed_change,
            effective_from: params.effective_from,
            upsold_by: params.upsold_by,
            requested_by: params.requested_by,
            requested_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
            token: None,
            token_expiry: None,
            client_email: None,
            client_approved_at: None,
            emails_sent: Vec::new(),
            client_name: params.client_name,
            engagement_name: params.engagement_name,
            version: 0,
        };

        self.requests.insert(request.clone())?;
        info!(
            request = %request.id,
            engagement = %request.engagement_id,
            request_type = %request.request_type,
            "modification request created"
        );
        Ok(request)
    }

    /// Reviewer sign-off. Client-facing types receive a confirmation token
    /// valid for 14 days; internal types stay tokenless and become
    /// immediately applicable.
    pub fn approve(
        &self,
        id: &RequestId,
        reviewer: ColleagueId,
    ) -> Result<ModificationRequest, EngageError> {
        let mut request = self.get(id)?;
        if request.status != RequestStatus::Pending {
            return Err(EngageError::invalid_state("approve", request.status));
        }

        let read_version = request.version;
        let now = Utc::now();
        request.status = RequestStatus::Approved;
        request.reviewed_by = Some(reviewer);
        request.reviewed_at = Some(now);
        if request.is_client_facing() {
            request.token = Some(generate_token());
            request.token_expiry = Some(now + Duration::days(TOKEN_VALIDITY_DAYS));
        }

        let stored = self.requests.update(request, read_version)?;
        info!(
            request = %stored.id,
            client_facing = stored.is_client_facing(),
            "modification request approved"
        );
        Ok(stored)
    }

    /// Rejection is final and only possible while the request is still
    /// pending; an already approved request is withdrawn via `delete`
    /// instead. The reason is mandatory.
    pub fn reject(
        &self,
        id: &RequestId,
        reviewer: ColleagueId,
        reason: impl Into<String>,
    ) -> Result<ModificationRequest, EngageError> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(EngageError::validation("rejection reason is mandatory"));
        }

        let mut request = self.get(id)?;
        if request.status != RequestStatus::Pending {
            return Err(EngageError::invalid_state("reject", request.status));
        }

        let read_version = request.version;
        request.status = RequestStatus::Rejected;
        request.reviewed_by = Some(reviewer);
        request.reviewed_at = Some(Utc::now());
        request.rejection_reason = Some(reason);

        let stored = self.requests.update(request, read_version)?;
        info!(request = %stored.id, "modification request rejected");
        Ok(stored)
    }

    /// Edits the proposal while it is still under review (pending or
    /// approved). The payload is re-validated; the request type is fixed at
    /// creation and cannot be swapped by an edit.
    pub fn update(
        &self,
        id: &RequestId,
        changes: UpdateRequest,
    ) -> Result<ModificationRequest, EngageError> {
        let mut request = self.get(id)?;
        if !matches!(
            request.status,
            RequestStatus::Pending | RequestStatus::Approved
        ) {
            return Err(EngageError::invalid_state("update", request.status));
        }

        if let Some(change) = changes.proposed_change {
            if change.request_type() != request.request_type {
                return Err(EngageError::validation(format!(
                    "cannot change request type from '{}' to '{}'",
                    request.request_type,
                    change.request_type()
                )));
            }
            change.validate()?;
            request.proposed_change = change;
        }
        if let Some(effective_from) = changes.effective_from {
            request.effective_from = effective_from;
        }
        if let Some(upsold_by) = changes.upsold_by {
            if let Some(upsell) = &upsold_by {
                upsell.validate()?;
            }
            request.upsold_by = upsold_by;
        }

        let read_version = request.version;
        let stored = self.requests.update(request, read_version)?;
        info!(request = %stored.id, "modification request updated");
        Ok(stored)
    }

    /// Deletes a request that never reached the client: pending, approved,
    /// or rejected. Once a client has confirmed, and certainly once applied,
    /// the request is part of the audit trail and cannot be removed.
    pub fn delete(&self, id: &RequestId) -> Result<(), EngageError> {
        let request = self.get(id)?;
        if !matches!(
            request.status,
            RequestStatus::Pending | RequestStatus::Approved | RequestStatus::Rejected
        ) {
            return Err(EngageError::invalid_state("delete", request.status));
        }
        self.requests.delete(id)?;
        info!(request = %id, "modification request deleted");
        Ok(())
    }

    /// Applies the change to the live engagement.
    ///
    /// Allowed from `client_approved`, or directly from `approved` for
    /// non-client-facing types. The version CAS makes the transition the
    /// idempotence point: exactly one caller wins, writes the single history
    /// entry, and drives the engagement mutator; a repeat call fails with
    /// `InvalidState` and archives nothing.
    pub fn apply(
        &self,
        id: &RequestId,
        applied_by: ColleagueId,
    ) -> Result<ModificationRequest, EngageError> {
        let mut request = self.get(id)?;
        let allowed = match request.status {
            RequestStatus::ClientApproved => true,
            RequestStatus::Approved => !request.is_client_facing(),
            _ => false,
        };
        if !allowed {
            return Err(EngageError::invalid_state("apply", request.status));
        }

        let read_version = request.version;
        let applied_at = Utc::now();
        request.status = RequestStatus::Applied;
        let stored = self.requests.update(request, read_version)?;

        self.archive.append(&stored, applied_by, applied_at)?;
        if let Err(err) = self.mutator.apply_change(
            &stored.engagement_id,
            &stored.proposed_change,
            stored.effective_from,
        ) {
            // The transition and history entry stand; the engagement
            // collaborator has to reconcile from the archive.
            warn!(request = %stored.id, error = %err, "engagement mutation failed after apply");
            return Err(err);
        }

        info!(request = %stored.id, engagement = %stored.engagement_id, "modification applied");
        Ok(stored)
    }

    /// Appends one entry to the request's email log. Called by the external
    /// mailer collaborator after dispatching a confirmation message; the
    /// core never composes or sends mail.
    pub fn record_email(
        &self,
        id: &RequestId,
        entry: EmailLogEntry,
    ) -> Result<ModificationRequest, EngageError> {
        let mut request = self.get(id)?;
        let read_version = request.version;
        request.emails_sent.push(entry);
        self.requests.update(request, read_version)
    }

    /// Re-reads the denormalized display fields from the source-of-truth
    /// records. The mitigation for display drift is this explicit refresh,
    /// keeping reads pure.
    pub fn refresh_display(
        &self,
        id: &RequestId,
        client_name: impl Into<String>,
        engagement_name: impl Into<String>,
    ) -> Result<ModificationRequest, EngageError> {
        let mut request = self.get(id)?;
        let read_version = request.version;
        request.client_name = client_name.into();
        request.engagement_name = engagement_name.into();
        self.requests.update(request, read_version)
    }
}
