use crate::ids::{ClientId, ColleagueId, EngagementId, ItemId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The two underlying kinds of commissionable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    ExtraWork,
    EngagementService,
}

impl ItemKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::ExtraWork => "extra_work",
            Self::EngagementService => "engagement_service",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How an item bills: a single charge or a monthly recurring one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingType {
    OneOff,
    Recurring,
}

/// Credit-based pricing. When present, the commission base is
/// `max_credits * price_per_credit_minor` instead of the listed price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditPricing {
    pub max_credits: u32,
    pub price_per_credit_minor: u64,
}

impl CreditPricing {
    pub fn commission_base_minor(&self) -> u64 {
        u64::from(self.max_credits) * self.price_per_credit_minor
    }
}

/// Logical view over a piece of work or service a seller earns commission on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionableItem {
    pub id: ItemId,
    pub kind: ItemKind,
    pub description: String,
    pub engagement_id: EngagementId,
    pub client_id: ClientId,
    /// Listed price in minor currency units.
    pub amount_minor: u64,
    pub currency: String,
    pub seller_id: ColleagueId,
    pub commission_percent: f64,
    pub billing_type: BillingType,
    /// Work date for extra work, creation date for services.
    pub created_on: NaiveDate,
    /// For recurring items, the date the service takes financial effect.
    pub effective_from: Option<NaiveDate>,
    pub credit_pricing: Option<CreditPricing>,
}

/// Composite key into the approval ledger.
///
/// A proper struct rather than a formatted string, so key construction
/// cannot diverge between writers and readers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApprovalKey {
    pub kind: ItemKind,
    pub item_id: ItemId,
}

impl ApprovalKey {
    pub fn new(kind: ItemKind, item_id: ItemId) -> Self {
        Self { kind, item_id }
    }
}

/// Finance sign-off on a commission payout. Lifecycle is independent of the
/// modification-request state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub approved: bool,
    pub approved_at: DateTime<Utc>,
    pub approved_by: ColleagueId,
}

/// Output of the proration calculator. Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProrationResult {
    pub full_amount_minor: u64,
    pub prorated_amount_minor: u64,
    pub is_prorated: bool,
    /// Day-of-month the proration window opens on, when a start date falls
    /// inside the target month.
    pub start_day: Option<u32>,
    pub days_in_month: u32,
    pub days_worked: u32,
    pub percent_of_month: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_pricing_overrides_commission_base() {
        let pricing = CreditPricing {
            max_credits: 40,
            price_per_credit_minor: 1_500,
        };
        assert_eq!(pricing.commission_base_minor(), 60_000);
    }

    #[test]
    fn approval_keys_compare_structurally() {
        let a = ApprovalKey::new(ItemKind::ExtraWork, ItemId::new("w-1"));
        let b = ApprovalKey::new(ItemKind::ExtraWork, ItemId::new("w-1"));
        let c = ApprovalKey::new(ItemKind::EngagementService, ItemId::new("w-1"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
