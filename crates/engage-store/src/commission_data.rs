use crate::approvals::ApprovalStore;
use engage_types::{ApprovalKey, ApprovalRecord, CommissionableItem, EngageError, ItemId, ItemKind};
use std::collections::HashMap;
use std::sync::RwLock;

/// Items and approvals copied out at one logical instant.
pub struct CommissionData {
    pub items: Vec<CommissionableItem>,
    pub approvals: HashMap<ApprovalKey, ApprovalRecord>,
}

/// Read-only enumeration of commissionable items together with their
/// finance sign-offs.
///
/// The attribution engine reads one combined snapshot per report, so a row
/// can never pair item state with an approval flag read at a different
/// instant, and two calls against unchanged data return identical results.
/// Item records live with the extra-work and engagement-service
/// collaborators; this trait is the seam.
pub trait CommissionDataSource: Send + Sync {
    fn report_snapshot(&self) -> Result<CommissionData, EngageError>;
}

/// In-memory data source for tests and single-process deployments.
///
/// Items and approval records share one lock, which is what makes the
/// combined snapshot atomic with respect to concurrent writers. It also
/// implements [`ApprovalStore`], so the same instance backs the approval
/// ledger and the report engine.
#[derive(Default)]
pub struct InMemoryCommissionData {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    items: Vec<CommissionableItem>,
    approvals: HashMap<ApprovalKey, ApprovalRecord>,
}

impl InMemoryCommissionData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<CommissionableItem>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                items,
                approvals: HashMap::new(),
            }),
        }
    }

    pub fn push_item(&self, item: CommissionableItem) -> Result<(), EngageError> {
        let mut inner = self.inner.write().map_err(lock_poisoned)?;
        inner.items.push(item);
        Ok(())
    }

    pub fn remove_item(&self, kind: ItemKind, id: &ItemId) -> Result<(), EngageError> {
        let mut inner = self.inner.write().map_err(lock_poisoned)?;
        inner.items.retain(|item| !(item.kind == kind && &item.id == id));
        Ok(())
    }
}

fn lock_poisoned<T>(_: T) -> EngageError {
    EngageError::Storage("commission data lock poisoned".to_string())
}

impl CommissionDataSource for InMemoryCommissionData {
    fn report_snapshot(&self) -> Result<CommissionData, EngageError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(CommissionData {
            items: inner.items.clone(),
            approvals: inner.approvals.clone(),
        })
    }
}

impl ApprovalStore for InMemoryCommissionData {
    fn get(&self, key: &ApprovalKey) -> Result<Option<ApprovalRecord>, EngageError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.approvals.get(key).cloned())
    }

    fn upsert(&self, key: ApprovalKey, record: ApprovalRecord) -> Result<(), EngageError> {
        let mut inner = self.inner.write().map_err(lock_poisoned)?;
        inner.approvals.insert(key, record);
        Ok(())
    }

    fn remove(&self, key: &ApprovalKey) -> Result<(), EngageError> {
        let mut inner = self.inner.write().map_err(lock_poisoned)?;
        inner.approvals.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use engage_types::{BillingType, ClientId, ColleagueId, EngagementId};

    fn item(id: &str) -> CommissionableItem {
        CommissionableItem {
            id: ItemId::new(id),
            kind: ItemKind::ExtraWork,
            description: format!("Extra work {id}"),
            engagement_id: EngagementId::new("eng-1"),
            client_id: ClientId::new("cli-1"),
            amount_minor: 45_000,
            currency: "EUR".to_string(),
            seller_id: ColleagueId::new("col-1"),
            commission_percent: 5.0,
            billing_type: BillingType::OneOff,
            created_on: NaiveDate::from_ymd_opt(2025, 3, 8).unwrap(),
            effective_from: None,
            credit_pricing: None,
        }
    }

    fn record(by: &str) -> ApprovalRecord {
        ApprovalRecord {
            approved: true,
            approved_at: Utc::now(),
            approved_by: ColleagueId::new(by),
        }
    }

    #[test]
    fn report_snapshot_carries_items_and_approvals() {
        let data = InMemoryCommissionData::with_items(vec![item("w-1")]);
        data.upsert(
            ApprovalKey::new(ItemKind::ExtraWork, ItemId::new("w-1")),
            record("fin-1"),
        )
        .unwrap();

        let snapshot = data.report_snapshot().unwrap();
        assert_eq!(snapshot.items.len(), 1);
        let key = ApprovalKey::new(ItemKind::ExtraWork, ItemId::new("w-1"));
        assert!(snapshot.approvals[&key].approved);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_writes() {
        let data = InMemoryCommissionData::new();
        data.push_item(item("w-1")).unwrap();

        let snapshot = data.report_snapshot().unwrap();
        data.push_item(item("w-2")).unwrap();
        data.upsert(
            ApprovalKey::new(ItemKind::ExtraWork, ItemId::new("w-1")),
            record("fin-1"),
        )
        .unwrap();

        assert_eq!(snapshot.items.len(), 1);
        assert!(snapshot.approvals.is_empty());
    }

    #[test]
    fn removing_an_item_leaves_other_kinds_alone() {
        let data = InMemoryCommissionData::with_items(vec![item("w-1"), item("w-2")]);
        data.remove_item(ItemKind::EngagementService, &ItemId::new("w-1"))
            .unwrap();
        assert_eq!(data.report_snapshot().unwrap().items.len(), 2);

        data.remove_item(ItemKind::ExtraWork, &ItemId::new("w-1")).unwrap();
        let remaining = data.report_snapshot().unwrap().items;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, ItemId::new("w-2"));
    }
}
