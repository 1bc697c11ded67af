use chrono::NaiveDate;
use engage_types::{EngageError, EngagementId, ProposedChange, RequestId};
use std::sync::Mutex;

/// Write seam to the live engagement/service records.
///
/// Invoked by the apply step after the request has won its `applied`
/// transition; the engagement configuration itself is owned by a
/// collaborator outside this core.
pub trait EngagementMutator: Send + Sync {
    fn apply_change(
        &self,
        engagement_id: &EngagementId,
        change: &ProposedChange,
        effective_from: Option<NaiveDate>,
    ) -> Result<(), EngageError>;
}

/// Notification event emitted when a client confirms a change.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: String,
    pub entity_ref: RequestId,
}

/// Write-only seam to the notification subsystem.
pub trait NotificationSink: Send + Sync {
    fn submit(&self, notification: Notification) -> Result<(), EngageError>;
}

/// Mutator that accepts every change without side effects.
#[derive(Default)]
pub struct NullMutator;

impl EngagementMutator for NullMutator {
    fn apply_change(
        &self,
        _engagement_id: &EngagementId,
        _change: &ProposedChange,
        _effective_from: Option<NaiveDate>,
    ) -> Result<(), EngageError> {
        Ok(())
    }
}

/// Test double that records every applied change.
#[derive(Default)]
pub struct RecordingMutator {
    applied: Mutex<Vec<(EngagementId, ProposedChange)>>,
}

impl RecordingMutator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> Vec<(EngagementId, ProposedChange)> {
        self.applied.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl EngagementMutator for RecordingMutator {
    fn apply_change(
        &self,
        engagement_id: &EngagementId,
        change: &ProposedChange,
        _effective_from: Option<NaiveDate>,
    ) -> Result<(), EngageError> {
        self.applied
            .lock()
            .map_err(|_| EngageError::Storage("recording mutator lock poisoned".to_string()))?
            .push((engagement_id.clone(), change.clone()));
        Ok(())
    }
}

/// Test double that records every submitted notification.
#[derive(Default)]
pub struct RecordingSink {
    submitted: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> Vec<Notification> {
        self.submitted.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl NotificationSink for RecordingSink {
    fn submit(&self, notification: Notification) -> Result<(), EngageError> {
        self.submitted
            .lock()
            .map_err(|_| EngageError::Storage("recording sink lock poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}
