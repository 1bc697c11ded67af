use engage_types::{ApprovalKey, ApprovalRecord, EngageError};
use std::collections::HashMap;
use std::sync::RwLock;

/// Keyed store of finance sign-off records, composite-keyed by
/// `(item kind, item id)`.
///
/// Deliberately decoupled from the request lifecycle: payout sign-off is a
/// finance concern, contract-change application an operations concern, and
/// neither blocks the other.
pub trait ApprovalStore: Send + Sync {
    fn get(&self, key: &ApprovalKey) -> Result<Option<ApprovalRecord>, EngageError>;

    fn upsert(&self, key: ApprovalKey, record: ApprovalRecord) -> Result<(), EngageError>;

    /// Idempotent: removing an absent record is a no-op.
    fn remove(&self, key: &ApprovalKey) -> Result<(), EngageError>;
}

#[derive(Default)]
pub struct InMemoryApprovalStore {
    records: RwLock<HashMap<ApprovalKey, ApprovalRecord>>,
}

impl InMemoryApprovalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned<T>(_: T) -> EngageError {
    EngageError::Storage("approval store lock poisoned".to_string())
}

impl ApprovalStore for InMemoryApprovalStore {
    fn get(&self, key: &ApprovalKey) -> Result<Option<ApprovalRecord>, EngageError> {
        let records = self.records.read().map_err(lock_poisoned)?;
        Ok(records.get(key).cloned())
    }

    fn upsert(&self, key: ApprovalKey, record: ApprovalRecord) -> Result<(), EngageError> {
        let mut records = self.records.write().map_err(lock_poisoned)?;
        records.insert(key, record);
        Ok(())
    }

    fn remove(&self, key: &ApprovalKey) -> Result<(), EngageError> {
        let mut records = self.records.write().map_err(lock_poisoned)?;
        records.remove(key);
        Ok(())
    }
}
