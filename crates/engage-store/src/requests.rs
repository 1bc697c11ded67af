use engage_types::{EngageError, ModificationRequest, RequestId};
use std::collections::HashMap;
use std::sync::RwLock;

/// Keyed store of modification requests.
///
/// Writes are optimistic: `update` compares the stored `version` against the
/// version the caller read, so of two racing lifecycle transitions exactly
/// one wins and the loser observes `ConcurrencyConflict` instead of silently
/// clobbering state.
pub trait RequestStore: Send + Sync {
    fn get(&self, id: &RequestId) -> Result<Option<ModificationRequest>, EngageError>;

    /// Token lookup for the public confirmation surface. Tokens are globally
    /// unique across all requests.
    fn find_by_token(&self, token: &str) -> Result<Option<ModificationRequest>, EngageError>;

    fn insert(&self, request: ModificationRequest) -> Result<(), EngageError>;

    /// Compare-and-swap write. Succeeds only while the stored version equals
    /// `expected_version`; the stored copy gets `expected_version + 1`.
    /// Returns the request as stored.
    fn update(
        &self,
        request: ModificationRequest,
        expected_version: u64,
    ) -> Result<ModificationRequest, EngageError>;

    fn delete(&self, id: &RequestId) -> Result<(), EngageError>;

    fn list(&self) -> Result<Vec<ModificationRequest>, EngageError>;
}

/// In-memory request store with a token index.
#[derive(Default)]
pub struct InMemoryRequestStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    requests: HashMap<RequestId, ModificationRequest>,
    token_index: HashMap<String, RequestId>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned<T>(_: T) -> EngageError {
    EngageError::Storage("request store lock poisoned".to_string())
}

impl Inner {
    fn index_token(&mut self, request: &ModificationRequest) -> Result<(), EngageError> {
        if let Some(token) = &request.token {
            match self.token_index.get(token) {
                Some(existing) if existing != &request.id => {
                    return Err(EngageError::Storage(format!(
                        "token collision between requests '{}' and '{}'",
                        existing, request.id
                    )));
                }
                _ => {
                    self.token_index.insert(token.clone(), request.id.clone());
                }
            }
        }
        Ok(())
    }
}

impl RequestStore for InMemoryRequestStore {
    fn get(&self, id: &RequestId) -> Result<Option<ModificationRequest>, EngageError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.requests.get(id).cloned())
    }

    fn find_by_token(&self, token: &str) -> Result<Option<ModificationRequest>, EngageError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner
            .token_index
            .get(token)
            .and_then(|id| inner.requests.get(id))
            .cloned())
    }

    fn insert(&self, request: ModificationRequest) -> Result<(), EngageError> {
        let mut inner = self.inner.write().map_err(lock_poisoned)?;
        if inner.requests.contains_key(&request.id) {
            return Err(EngageError::Storage(format!(
                "request '{}' already exists",
                request.id
            )));
        }
        inner.index_token(&request)?;
        inner.requests.insert(request.id.clone(), request);
        Ok(())
    }

    fn update(
        &self,
        mut request: ModificationRequest,
        expected_version: u64,
    ) -> Result<ModificationRequest, EngageError> {
        let mut inner = self.inner.write().map_err(lock_poisoned)?;
        let stored = inner
            .requests
            .get(&request.id)
            .ok_or_else(|| EngageError::not_found("request", &request.id))?;
        if stored.version != expected_version {
            return Err(EngageError::ConcurrencyConflict(format!(
                "request '{}' was modified concurrently (stored version {}, expected {})",
                request.id, stored.version, expected_version
            )));
        }
        request.version = expected_version + 1;
        inner.index_token(&request)?;
        inner.requests.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn delete(&self, id: &RequestId) -> Result<(), EngageError> {
        let mut inner = self.inner.write().map_err(lock_poisoned)?;
        let removed = inner
            .requests
            .remove(id)
            .ok_or_else(|| EngageError::not_found("request", id))?;
        if let Some(token) = &removed.token {
            inner.token_index.remove(token);
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<ModificationRequest>, EngageError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        let mut requests: Vec<_> = inner.requests.values().cloned().collect();
        requests.sort_by(|a, b| a.requested_at.cmp(&b.requested_at).then(a.id.cmp(&b.id)));
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use engage_types::{
        BillingType, ClientId, ColleagueId, EngagementId, ProposedChange, RequestStatus,
        RequestType,
    };

    fn sample_request(id: &str) -> ModificationRequest {
        ModificationRequest {
            id: RequestId::new(id),
            engagement_id: EngagementId::new("eng-1"),
            client_id: ClientId::new("cli-1"),
            request_type: RequestType::AddService,
            status: RequestStatus::Pending,
            proposed_change: ProposedChange::AddService {
                name: "Paid Social".to_string(),
                price_minor: 120_000,
                currency: "EUR".to_string(),
                billing_type: BillingType::Recurring,
                credit_pricing: None,
            },
            effective_from: None,
            upsold_by: None,
            requested_by: ColleagueId::new("col-1"),
            requested_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
            token: None,
            token_expiry: None,
            client_email: None,
            client_approved_at: None,
            emails_sent: Vec::new(),
            client_name: "Acme GmbH".to_string(),
            engagement_name: "Acme 2025 Retainer".to_string(),
            version: 0,
        }
    }

    #[test]
    fn cas_update_bumps_version() {
        let store = InMemoryRequestStore::new();
        store.insert(sample_request("req-1")).unwrap();

        let read = store.get(&RequestId::new("req-1")).unwrap().unwrap();
        let stored = store.update(read.clone(), read.version).unwrap();
        assert_eq!(stored.version, 1);
    }

    #[test]
    fn stale_version_loses_the_race() {
        let store = InMemoryRequestStore::new();
        store.insert(sample_request("req-1")).unwrap();

        let first = store.get(&RequestId::new("req-1")).unwrap().unwrap();
        let second = first.clone();

        store.update(first.clone(), first.version).unwrap();
        let err = store.update(second.clone(), second.version).unwrap_err();
        assert!(matches!(err, EngageError::ConcurrencyConflict(_)));
    }

    #[test]
    fn token_index_finds_request_and_rejects_collisions() {
        let store = InMemoryRequestStore::new();
        store.insert(sample_request("req-1")).unwrap();
        store.insert(sample_request("req-2")).unwrap();

        let mut first = store.get(&RequestId::new("req-1")).unwrap().unwrap();
        first.token = Some("tok-abc".to_string());
        store.update(first.clone(), 0).unwrap();

        let found = store.find_by_token("tok-abc").unwrap().unwrap();
        assert_eq!(found.id, RequestId::new("req-1"));

        let mut second = store.get(&RequestId::new("req-2")).unwrap().unwrap();
        second.token = Some("tok-abc".to_string());
        let err = store.update(second, 0).unwrap_err();
        assert!(matches!(err, EngageError::Storage(_)));
    }

    #[test]
    fn delete_unknown_id_is_not_found() {
        let store = InMemoryRequestStore::new();
        let err = store.delete(&RequestId::new("missing")).unwrap_err();
        assert!(matches!(err, EngageError::NotFound(_)));
    }
}
