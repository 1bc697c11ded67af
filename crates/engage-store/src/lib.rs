//! Repository traits and in-memory implementations for the engagement core.
//!
//! The core only requires keyed get/put/delete/scan semantics; durable
//! storage technology is a collaborator concern. Every trait here has an
//! in-memory implementation (an `RwLock`-guarded map) that backs unit tests
//! and single-process deployments. Poisoned locks are surfaced as
//! `EngageError::Storage`, never panicked across.

#![deny(unsafe_code)]

pub mod approvals;
pub mod commission_data;
pub mod history;
pub mod requests;

pub use approvals::{ApprovalStore, InMemoryApprovalStore};
pub use commission_data::{CommissionData, CommissionDataSource, InMemoryCommissionData};
pub use history::{HistoryStore, InMemoryHistoryStore};
pub use requests::{InMemoryRequestStore, RequestStore};
