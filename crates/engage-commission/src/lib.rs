//! Commission attribution for the engagement core.
//!
//! Three concerns live here: the pure proration calculator, the
//! attribution-month rules that decide which calendar month a commission is
//! counted in, and the reporting engine that joins commissionable items with
//! the finance approval ledger. All of it is deterministic rule evaluation;
//! the same inputs always yield the same report.

#![deny(unsafe_code)]

pub mod attribution;
pub mod engine;
pub mod ledger;
pub mod proration;

pub use attribution::{attribution_month, commission_amount_minor, commission_base_minor};
pub use engine::{ColleagueDirectory, CommissionEngine, CommissionLine, InMemoryDirectory};
pub use ledger::ApprovalLedger;
pub use proration::calculate_prorated_reward;
