use engage_types::{AppliedModification, ClientId, EngageError, EngagementId, EntryId, Month};
use std::collections::HashMap;
use std::sync::RwLock;

/// Append-only collection of applied-modification snapshots with a derived
/// month index.
///
/// Entries are immutable once appended; there is no update or delete surface.
pub trait HistoryStore: Send + Sync {
    /// Appends one entry. Appending a second entry for the same request id
    /// is a fault (the lifecycle's CAS already guarantees a single `applied`
    /// transition) and fails without writing.
    fn append(&self, entry: AppliedModification) -> Result<(), EngageError>;

    fn by_engagement(&self, id: &EngagementId) -> Result<Vec<AppliedModification>, EngageError>;

    fn by_month(&self, month: Month) -> Result<Vec<AppliedModification>, EngageError>;

    fn by_client(&self, id: &ClientId) -> Result<Vec<AppliedModification>, EngageError>;

    /// Distinct months with at least one entry, most recent first.
    fn months(&self) -> Result<Vec<Month>, EngageError>;
}

/// In-memory history store with month/engagement/client indexes.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<EntryId, AppliedModification>,
    month_index: HashMap<Month, Vec<EntryId>>,
    engagement_index: HashMap<EngagementId, Vec<EntryId>>,
    client_index: HashMap<ClientId, Vec<EntryId>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned<T>(_: T) -> EngageError {
    EngageError::Storage("history store lock poisoned".to_string())
}

impl Inner {
    fn collect(&self, ids: Option<&Vec<EntryId>>) -> Vec<AppliedModification> {
        let mut entries: Vec<_> = ids
            .into_iter()
            .flatten()
            .filter_map(|id| self.entries.get(id).cloned())
            .collect();
        entries.sort_by(|a, b| {
            b.applied_at
                .cmp(&a.applied_at)
                .then_with(|| a.entry_id.cmp(&b.entry_id))
        });
        entries
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn append(&self, entry: AppliedModification) -> Result<(), EngageError> {
        let mut inner = self.inner.write().map_err(lock_poisoned)?;
        if inner
            .entries
            .values()
            .any(|existing| existing.request_id == entry.request_id)
        {
            return Err(EngageError::Storage(format!(
                "history entry for request '{}' already exists",
                entry.request_id
            )));
        }

        let id = entry.entry_id.clone();
        inner
            .month_index
            .entry(entry.applied_month)
            .or_default()
            .push(id.clone());
        inner
            .engagement_index
            .entry(entry.engagement_id.clone())
            .or_default()
            .push(id.clone());
        inner
            .client_index
            .entry(entry.client_id.clone())
            .or_default()
            .push(id.clone());
        inner.entries.insert(id, entry);
        Ok(())
    }

    fn by_engagement(&self, id: &EngagementId) -> Result<Vec<AppliedModification>, EngageError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.collect(inner.engagement_index.get(id)))
    }

    fn by_month(&self, month: Month) -> Result<Vec<AppliedModification>, EngageError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.collect(inner.month_index.get(&month)))
    }

    fn by_client(&self, id: &ClientId) -> Result<Vec<AppliedModification>, EngageError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.collect(inner.client_index.get(id)))
    }

    fn months(&self) -> Result<Vec<Month>, EngageError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        let mut months: Vec<_> = inner.month_index.keys().copied().collect();
        months.sort_unstable_by(|a, b| b.cmp(a));
        Ok(months)
    }
}
