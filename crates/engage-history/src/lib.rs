//! Append-only archive of applied engagement modifications.
//!
//! One immutable entry is written per request, at the moment it transitions
//! to `applied`. Entries carry the request's denormalized audit fields and a
//! derived month bucket for reporting queries.

#![deny(unsafe_code)]

use chrono::{DateTime, Utc};
use engage_store::HistoryStore;
use engage_types::{
    AppliedModification, ClientId, ColleagueId, EngageError, EngagementId, EntryId,
    ModificationRequest, Month,
};
use std::sync::Arc;
use tracing::info;

/// Reporting surface over applied modifications.
pub struct HistoryArchive {
    store: Arc<dyn HistoryStore>,
}

impl HistoryArchive {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Snapshots `request` into one immutable entry bucketed under the month
    /// of `applied_at`.
    ///
    /// Called by the lifecycle manager after it has won the `applied`
    /// transition, so a duplicate append for the same request is a fault.
    pub fn append(
        &self,
        request: &ModificationRequest,
        applied_by: ColleagueId,
        applied_at: DateTime<Utc>,
    ) -> Result<AppliedModification, EngageError> {
        let entry = AppliedModification {
            entry_id: EntryId::generate(),
            request_id: request.id.clone(),
            engagement_id: request.engagement_id.clone(),
            client_id: request.client_id.clone(),
            request_type: request.request_type,
            change: request.proposed_change.clone(),
            effective_from: request.effective_from,
            upsold_by: request.upsold_by.clone(),
            requested_by: request.requested_by.clone(),
            applied_by,
            applied_at,
            applied_month: Month::from_datetime(applied_at),
            client_name: request.client_name.clone(),
            engagement_name: request.engagement_name.clone(),
        };

        self.store.append(entry.clone())?;
        info!(
            request = %entry.request_id,
            engagement = %entry.engagement_id,
            month = %entry.applied_month,
            "modification archived"
        );
        Ok(entry)
    }

    pub fn by_engagement(
        &self,
        engagement_id: &EngagementId,
    ) -> Result<Vec<AppliedModification>, EngageError> {
        self.store.by_engagement(engagement_id)
    }

    pub fn by_month(&self, month: Month) -> Result<Vec<AppliedModification>, EngageError> {
        self.store.by_month(month)
    }

    pub fn by_client(&self, client_id: &ClientId) -> Result<Vec<AppliedModification>, EngageError> {
        self.store.by_client(client_id)
    }

    /// Distinct months with at least one applied modification, most recent
    /// first.
    pub fn available_months(&self) -> Result<Vec<Month>, EngageError> {
        self.store.months()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use engage_store::InMemoryHistoryStore;
    use engage_types::{
        BillingType, ProposedChange, RequestId, RequestStatus, RequestType,
    };

    fn applied_request(id: &str) -> ModificationRequest {
        ModificationRequest {
            id: RequestId::new(id),
            engagement_id: EngagementId::new("eng-1"),
            client_id: ClientId::new("cli-1"),
            request_type: RequestType::AddService,
            status: RequestStatus::Applied,
            proposed_change: ProposedChange::AddService {
                name: "Content Production".to_string(),
                price_minor: 80_000,
                currency: "EUR".to_string(),
                billing_type: BillingType::OneOff,
                credit_pricing: None,
            },
            effective_from: None,
            upsold_by: None,
            requested_by: ColleagueId::new("col-1"),
            requested_at: Utc::now(),
            reviewed_by: Some(ColleagueId::new("lead-1")),
            reviewed_at: Some(Utc::now()),
            rejection_reason: None,
            token: Some("tok-1".to_string()),
            token_expiry: Some(Utc::now()),
            client_email: Some("cfo@acme.example".to_string()),
            client_approved_at: Some(Utc::now()),
            emails_sent: Vec::new(),
            client_name: "Acme GmbH".to_string(),
            engagement_name: "Acme Retainer".to_string(),
            version: 4,
        }
    }

    #[test]
    fn append_derives_month_from_application_instant() {
        let archive = HistoryArchive::new(Arc::new(InMemoryHistoryStore::new()));
        let applied_at = Utc.with_ymd_and_hms(2025, 3, 31, 23, 30, 0).unwrap();

        let entry = archive
            .append(&applied_request("req-1"), ColleagueId::new("ops-1"), applied_at)
            .unwrap();

        assert_eq!(entry.applied_month, Month::new(2025, 3));
        assert_eq!(entry.applied_month.to_string(), "2025-03");
        assert_eq!(archive.by_month(Month::new(2025, 3)).unwrap().len(), 1);
        assert_eq!(archive.available_months().unwrap(), vec![Month::new(2025, 3)]);
    }

    #[test]
    fn entries_snapshot_denormalized_audit_fields() {
        let archive = HistoryArchive::new(Arc::new(InMemoryHistoryStore::new()));
        let entry = archive
            .append(
                &applied_request("req-1"),
                ColleagueId::new("ops-1"),
                Utc.with_ymd_and_hms(2025, 5, 2, 9, 0, 0).unwrap(),
            )
            .unwrap();

        assert_eq!(entry.client_name, "Acme GmbH");
        assert_eq!(entry.engagement_name, "Acme Retainer");
        assert_eq!(entry.applied_by, ColleagueId::new("ops-1"));
        assert_eq!(entry.requested_by, ColleagueId::new("col-1"));
    }
}
