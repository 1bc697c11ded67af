use crate::attribution::{attribution_month, commission_amount_minor};
use engage_store::{CommissionData, CommissionDataSource};
use engage_types::{
    ApprovalKey, ApprovalRecord, ClientId, ColleagueId, EngageError, EngagementId, ItemId,
    ItemKind, Month,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Read-only resolution of colleague display names for reports.
///
/// A missing name is `Ok(None)`; `Err` is reserved for directory faults.
pub trait ColleagueDirectory: Send + Sync {
    fn display_name(&self, id: &ColleagueId) -> Result<Option<String>, EngageError>;
}

/// Static directory for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryDirectory {
    names: RwLock<HashMap<ColleagueId, String>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: ColleagueId, name: impl Into<String>) -> Result<(), EngageError> {
        let mut names = self.names.write().map_err(lock_poisoned)?;
        names.insert(id, name.into());
        Ok(())
    }
}

fn lock_poisoned<T>(_: T) -> EngageError {
    EngageError::Storage("colleague directory lock poisoned".to_string())
}

impl ColleagueDirectory for InMemoryDirectory {
    fn display_name(&self, id: &ColleagueId) -> Result<Option<String>, EngageError> {
        let names = self.names.read().map_err(lock_poisoned)?;
        Ok(names.get(id).cloned())
    }
}

/// One row of the monthly commission report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionLine {
    pub item_id: ItemId,
    pub kind: ItemKind,
    pub description: String,
    pub engagement_id: EngagementId,
    pub client_id: ClientId,
    pub seller_id: ColleagueId,
    pub seller_name: String,
    /// The item's raw listed amount, before any credit-pricing override.
    pub amount_minor: u64,
    pub currency: String,
    pub commission_percent: f64,
    /// Commission over the full-price base, never prorated.
    pub commission_minor: u64,
    /// Finance sign-off as persisted in the approval ledger at report time.
    pub approval: Option<ApprovalRecord>,
}

/// Enumerates, for a target month, every commissionable item whose
/// commission belongs to that month.
///
/// Pure with respect to (item state, ledger state): each call reads one
/// combined snapshot of items and approvals, consults no wall clock, and
/// orders rows deterministically, so two calls against unchanged data
/// return deep-equal reports.
pub struct CommissionEngine {
    data: Arc<dyn CommissionDataSource>,
    directory: Arc<dyn ColleagueDirectory>,
}

impl CommissionEngine {
    pub fn new(data: Arc<dyn CommissionDataSource>, directory: Arc<dyn ColleagueDirectory>) -> Self {
        Self { data, directory }
    }

    pub fn list_for_month(&self, month: Month) -> Result<Vec<CommissionLine>, EngageError> {
        let CommissionData { items, approvals } = self.data.report_snapshot()?;

        let mut lines = Vec::new();
        for item in items.into_iter().filter(|item| attribution_month(item) == month) {
            let approval = approvals
                .get(&ApprovalKey::new(item.kind, item.id.clone()))
                .cloned();
            let seller_name = self
                .directory
                .display_name(&item.seller_id)?
                .unwrap_or_else(|| item.seller_id.to_string());
            lines.push(CommissionLine {
                commission_minor: commission_amount_minor(&item),
                item_id: item.id,
                kind: item.kind,
                description: item.description,
                engagement_id: item.engagement_id,
                client_id: item.client_id,
                seller_id: item.seller_id,
                seller_name,
                amount_minor: item.amount_minor,
                currency: item.currency,
                commission_percent: item.commission_percent,
                approval,
            });
        }

        lines.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.item_id.cmp(&b.item_id)));
        Ok(lines)
    }

    /// Total commission payable for the month, in minor units. Only lines
    /// with a positive finance sign-off count.
    pub fn approved_total_for_month(&self, month: Month) -> Result<u64, EngageError> {
        Ok(self
            .list_for_month(month)?
            .iter()
            .filter(|line| line.approval.as_ref().is_some_and(|a| a.approved))
            .map(|line| line.commission_minor)
            .sum())
    }
}
