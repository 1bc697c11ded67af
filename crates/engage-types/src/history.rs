use crate::ids::{ClientId, ColleagueId, EngagementId, EntryId, RequestId};
use crate::month::Month;
use crate::request::{ProposedChange, RequestType, Upsell};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of a modification at the moment it was applied.
///
/// Created exactly once per request, at the `applied` transition, and never
/// mutated afterwards. Carries the request's denormalized display fields for
/// audit rendering without joins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedModification {
    pub entry_id: EntryId,
    pub request_id: RequestId,
    pub engagement_id: EngagementId,
    pub client_id: ClientId,
    pub request_type: RequestType,
    pub change: ProposedChange,
    pub effective_from: Option<NaiveDate>,
    pub upsold_by: Option<Upsell>,
    pub requested_by: ColleagueId,
    pub applied_by: ColleagueId,
    pub applied_at: DateTime<Utc>,
    /// Derived month bucket for filtering, e.g. `2025-03`.
    pub applied_month: Month,
    pub client_name: String,
    pub engagement_name: String,
}
