use crate::commission::{BillingType, CreditPricing};
use crate::error::EngageError;
use crate::ids::{AssignmentId, ClientId, ColleagueId, EngagementId, RequestId, ServiceId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The kind of change a modification request proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    AddService,
    UpdateServicePrice,
    DeactivateService,
    AddAssignment,
    UpdateAssignment,
    RemoveAssignment,
}

impl RequestType {
    /// Service-level changes are visible on the client's invoice and require
    /// explicit client confirmation via a tokened link before they can be
    /// applied. Team assignment changes are internal.
    pub fn is_client_facing(self) -> bool {
        matches!(
            self,
            Self::AddService | Self::UpdateServicePrice | Self::DeactivateService
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::AddService => "add_service",
            Self::UpdateServicePrice => "update_service_price",
            Self::DeactivateService => "deactivate_service",
            Self::AddAssignment => "add_assignment",
            Self::UpdateAssignment => "update_assignment",
            Self::RemoveAssignment => "remove_assignment",
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle status of a modification request.
///
/// `Rejected` and `Applied` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    ClientApproved,
    Applied,
}

impl RequestStatus {
    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::ClientApproved => "client_approved",
            Self::Applied => "applied",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Applied)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The proposed change payload, one variant per request type.
///
/// Modeled as a tagged union so reading code must match exhaustively and a
/// payload can never disagree with its declared request type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProposedChange {
    AddService {
        name: String,
        price_minor: u64,
        currency: String,
        billing_type: BillingType,
        credit_pricing: Option<CreditPricing>,
    },
    UpdateServicePrice {
        service_id: ServiceId,
        price_minor: u64,
        currency: String,
    },
    DeactivateService {
        service_id: ServiceId,
        note: Option<String>,
    },
    AddAssignment {
        colleague_id: ColleagueId,
        role: String,
        allocation_percent: Option<u8>,
    },
    UpdateAssignment {
        assignment_id: AssignmentId,
        role: Option<String>,
        allocation_percent: Option<u8>,
    },
    RemoveAssignment {
        assignment_id: AssignmentId,
    },
}

impl ProposedChange {
    pub fn request_type(&self) -> RequestType {
        match self {
            Self::AddService { .. } => RequestType::AddService,
            Self::UpdateServicePrice { .. } => RequestType::UpdateServicePrice,
            Self::DeactivateService { .. } => RequestType::DeactivateService,
            Self::AddAssignment { .. } => RequestType::AddAssignment,
            Self::UpdateAssignment { .. } => RequestType::UpdateAssignment,
            Self::RemoveAssignment { .. } => RequestType::RemoveAssignment,
        }
    }

    /// Field-level validation beyond what the tagged union enforces
    /// structurally.
    pub fn validate(&self) -> Result<(), EngageError> {
        match self {
            Self::AddService {
                name,
                price_minor,
                currency,
                credit_pricing,
                ..
            } => {
                if name.trim().is_empty() {
                    return Err(EngageError::validation("service name must not be empty"));
                }
                if *price_minor == 0 {
                    return Err(EngageError::validation("service price must be positive"));
                }
                validate_currency(currency)?;
                if let Some(pricing) = credit_pricing {
                    if pricing.max_credits == 0 || pricing.price_per_credit_minor == 0 {
                        return Err(EngageError::validation(
                            "credit pricing requires positive max_credits and price_per_credit",
                        ));
                    }
                }
                Ok(())
            }
            Self::UpdateServicePrice {
                service_id,
                price_minor,
                currency,
            } => {
                if service_id.as_str().is_empty() {
                    return Err(EngageError::validation("service_id must not be empty"));
                }
                if *price_minor == 0 {
                    return Err(EngageError::validation("new price must be positive"));
                }
                validate_currency(currency)
            }
            Self::DeactivateService { service_id, .. } => {
                if service_id.as_str().is_empty() {
                    return Err(EngageError::validation("service_id must not be empty"));
                }
                Ok(())
            }
            Self::AddAssignment {
                colleague_id,
                role,
                allocation_percent,
            } => {
                if colleague_id.as_str().is_empty() {
                    return Err(EngageError::validation("colleague_id must not be empty"));
                }
                if role.trim().is_empty() {
                    return Err(EngageError::validation("assignment role must not be empty"));
                }
                validate_allocation(*allocation_percent)
            }
            Self::UpdateAssignment {
                assignment_id,
                role,
                allocation_percent,
            } => {
                if assignment_id.as_str().is_empty() {
                    return Err(EngageError::validation("assignment_id must not be empty"));
                }
                if role.is_none() && allocation_percent.is_none() {
                    return Err(EngageError::validation(
                        "assignment update must change at least one field",
                    ));
                }
                if let Some(role) = role {
                    if role.trim().is_empty() {
                        return Err(EngageError::validation("assignment role must not be empty"));
                    }
                }
                validate_allocation(*allocation_percent)
            }
            Self::RemoveAssignment { assignment_id } => {
                if assignment_id.as_str().is_empty() {
                    return Err(EngageError::validation("assignment_id must not be empty"));
                }
                Ok(())
            }
        }
    }
}

fn validate_currency(currency: &str) -> Result<(), EngageError> {
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(EngageError::validation(format!(
            "currency must be a 3-letter uppercase code, got '{currency}'"
        )));
    }
    Ok(())
}

fn validate_allocation(allocation_percent: Option<u8>) -> Result<(), EngageError> {
    match allocation_percent {
        Some(p) if p == 0 || p > 100 => Err(EngageError::validation(
            "allocation_percent must be within 1..=100",
        )),
        _ => Ok(()),
    }
}

/// Seller attribution for an upsold change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upsell {
    pub seller_id: ColleagueId,
    pub commission_percent: f64,
}

impl Upsell {
    pub fn validate(&self) -> Result<(), EngageError> {
        if self.seller_id.as_str().is_empty() {
            return Err(EngageError::validation("upsell seller_id must not be empty"));
        }
        if !(self.commission_percent > 0.0 && self.commission_percent <= 100.0) {
            return Err(EngageError::validation(
                "commission_percent must be within (0, 100]",
            ));
        }
        Ok(())
    }
}

/// One confirmation-email dispatch recorded against a request.
///
/// Written by the external mailer collaborator; the core never composes or
/// sends mail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailLogEntry {
    pub subject: String,
    pub sent_to: String,
    pub sent_at: DateTime<Utc>,
}

/// A proposed change to a live engagement, moving through review, optional
/// client confirmation, and application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModificationRequest {
    pub id: RequestId,
    pub engagement_id: EngagementId,
    pub client_id: ClientId,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub proposed_change: ProposedChange,
    pub effective_from: Option<NaiveDate>,
    pub upsold_by: Option<Upsell>,
    pub requested_by: ColleagueId,
    pub requested_at: DateTime<Utc>,
    pub reviewed_by: Option<ColleagueId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Set only when status is `Rejected`.
    pub rejection_reason: Option<String>,
    /// Set only for client-facing request types once approved.
    pub token: Option<String>,
    pub token_expiry: Option<DateTime<Utc>>,
    pub client_email: Option<String>,
    pub client_approved_at: Option<DateTime<Utc>>,
    pub emails_sent: Vec<EmailLogEntry>,
    /// Denormalized display fields. They can drift from the source-of-truth
    /// client/engagement records; `refresh_display` re-reads them.
    pub client_name: String,
    pub engagement_name: String,
    /// Optimistic-concurrency counter, bumped on every stored write.
    pub version: u64,
}

impl ModificationRequest {
    pub fn is_client_facing(&self) -> bool {
        self.request_type.is_client_facing()
    }

    /// Token invariant: non-null iff the request type is client-facing and
    /// the status is at least approved.
    pub fn token_invariant_holds(&self) -> bool {
        let should_have_token = self.is_client_facing()
            && matches!(
                self.status,
                RequestStatus::Approved | RequestStatus::ClientApproved | RequestStatus::Applied
            );
        self.token.is_some() == should_have_token
            && self.token.is_some() == self.token_expiry.is_some()
    }
}
