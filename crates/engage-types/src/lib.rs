//! Core domain types for the engagement modification lifecycle and
//! commission attribution engine.
//!
//! This crate defines the persisted data model, the unified error taxonomy,
//! and the month-bucketing value type shared by every other `engage-*`
//! crate. It carries no behavior beyond field-level validation.

#![deny(unsafe_code)]

pub mod commission;
pub mod error;
pub mod history;
pub mod ids;
pub mod month;
pub mod request;

pub use commission::{
    ApprovalKey, ApprovalRecord, BillingType, CommissionableItem, CreditPricing, ItemKind,
    ProrationResult,
};
pub use error::EngageError;
pub use history::AppliedModification;
pub use ids::{
    AssignmentId, ClientId, ColleagueId, EngagementId, EntryId, ItemId, RequestId, ServiceId,
};
pub use month::Month;
pub use request::{
    EmailLogEntry, ModificationRequest, ProposedChange, RequestStatus, RequestType, Upsell,
};
