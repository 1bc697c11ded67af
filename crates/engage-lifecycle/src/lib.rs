//! Lifecycle of proposed engagement modifications.
//!
//! A modification request moves `pending -> approved -> client_approved ->
//! applied`, with `rejected` as the terminal failure branch. Client-facing
//! change types (service add/reprice/deactivate) carry a token-gated client
//! confirmation step between approval and application; internal team changes
//! apply directly from `approved`. The state machine is intentionally
//! explicit so accidental skips cannot happen silently, and every transition
//! is an optimistic compare-and-swap so concurrent reviewers cannot clobber
//! each other.

#![deny(unsafe_code)]

pub mod collaborators;
pub mod confirm;
pub mod lifecycle;
pub mod token;

pub use collaborators::{
    EngagementMutator, Notification, NotificationSink, NullMutator, RecordingMutator,
    RecordingSink,
};
pub use confirm::ConfirmationGateway;
pub use lifecycle::{CreateRequest, RequestLifecycle, UpdateRequest};
pub use token::{generate_token, TOKEN_VALIDITY_DAYS};
