use chrono::Utc;
use engage_store::ApprovalStore;
use engage_types::{ApprovalKey, ApprovalRecord, ColleagueId, EngageError, ItemId, ItemKind};
use std::sync::Arc;
use tracing::info;

/// Finance sign-off ledger for commission payouts.
///
/// Independent of the modification-request lifecycle: an item's commission
/// can be approved before, after, or regardless of whether its originating
/// modification was ever applied.
pub struct ApprovalLedger {
    store: Arc<dyn ApprovalStore>,
}

impl ApprovalLedger {
    pub fn new(store: Arc<dyn ApprovalStore>) -> Self {
        Self { store }
    }

    pub fn get_status(
        &self,
        kind: ItemKind,
        item_id: &ItemId,
    ) -> Result<Option<ApprovalRecord>, EngageError> {
        self.store.get(&ApprovalKey::new(kind, item_id.clone()))
    }

    /// Upserts the sign-off. Re-approving overwrites the previous record
    /// with the new approver and timestamp.
    pub fn approve(
        &self,
        kind: ItemKind,
        item_id: &ItemId,
        approved_by: ColleagueId,
    ) -> Result<ApprovalRecord, EngageError> {
        let record = ApprovalRecord {
            approved: true,
            approved_at: Utc::now(),
            approved_by,
        };
        self.store
            .upsert(ApprovalKey::new(kind, item_id.clone()), record.clone())?;
        info!(kind = %kind, item = %item_id, approver = %record.approved_by, "commission approved");
        Ok(record)
    }

    /// Deletes the sign-off. A no-op when no record exists.
    pub fn revoke(&self, kind: ItemKind, item_id: &ItemId) -> Result<(), EngageError> {
        self.store.remove(&ApprovalKey::new(kind, item_id.clone()))?;
        info!(kind = %kind, item = %item_id, "commission approval revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engage_store::InMemoryApprovalStore;

    #[test]
    fn approve_then_revoke_roundtrip() {
        let ledger = ApprovalLedger::new(Arc::new(InMemoryApprovalStore::new()));
        let id = ItemId::new("svc-9");

        assert!(ledger.get_status(ItemKind::EngagementService, &id).unwrap().is_none());

        ledger
            .approve(ItemKind::EngagementService, &id, ColleagueId::new("fin-1"))
            .unwrap();
        let status = ledger
            .get_status(ItemKind::EngagementService, &id)
            .unwrap()
            .unwrap();
        assert!(status.approved);

        ledger.revoke(ItemKind::EngagementService, &id).unwrap();
        assert!(ledger.get_status(ItemKind::EngagementService, &id).unwrap().is_none());
        // Revoking again stays a no-op.
        ledger.revoke(ItemKind::EngagementService, &id).unwrap();
    }

    #[test]
    fn reapproval_overwrites_the_approver() {
        let ledger = ApprovalLedger::new(Arc::new(InMemoryApprovalStore::new()));
        let id = ItemId::new("w-3");

        ledger
            .approve(ItemKind::ExtraWork, &id, ColleagueId::new("fin-1"))
            .unwrap();
        ledger
            .approve(ItemKind::ExtraWork, &id, ColleagueId::new("fin-2"))
            .unwrap();

        let status = ledger.get_status(ItemKind::ExtraWork, &id).unwrap().unwrap();
        assert_eq!(status.approved_by, ColleagueId::new("fin-2"));
    }
}
