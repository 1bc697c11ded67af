use chrono::Datelike;
use engage_types::{BillingType, CommissionableItem, Month};

/// The calendar month an item's commission is counted in.
///
/// Priority order:
/// 1. One-off items: the month the work/item was created.
/// 2. Recurring items with an effective date: the effective month when the
///    service starts on the 1st, otherwise the first *full* billing month,
///    i.e. the month immediately following the effective one.
/// 3. Recurring items without an effective date: the creation month.
pub fn attribution_month(item: &CommissionableItem) -> Month {
    match item.billing_type {
        BillingType::OneOff => Month::from_date(item.created_on),
        BillingType::Recurring => match item.effective_from {
            Some(effective) if effective.day() == 1 => Month::from_date(effective),
            Some(effective) => Month::from_date(effective).next(),
            None => Month::from_date(item.created_on),
        },
    }
}

/// Commission base: the full listed price, never prorated. Credit-based
/// services override the list price with `max_credits * price_per_credit`.
pub fn commission_base_minor(item: &CommissionableItem) -> u64 {
    item.credit_pricing
        .map(|pricing| pricing.commission_base_minor())
        .unwrap_or(item.amount_minor)
}

/// Commission amount in minor units, rounded once.
pub fn commission_amount_minor(item: &CommissionableItem) -> u64 {
    (commission_base_minor(item) as f64 * item.commission_percent / 100.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use engage_types::{ClientId, ColleagueId, CreditPricing, EngagementId, ItemId, ItemKind};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(billing_type: BillingType) -> CommissionableItem {
        CommissionableItem {
            id: ItemId::new("item-1"),
            kind: ItemKind::EngagementService,
            description: "Paid Search Management".to_string(),
            engagement_id: EngagementId::new("eng-1"),
            client_id: ClientId::new("cli-1"),
            amount_minor: 200_000,
            currency: "EUR".to_string(),
            seller_id: ColleagueId::new("col-7"),
            commission_percent: 10.0,
            billing_type,
            created_on: date(2025, 1, 20),
            effective_from: None,
            credit_pricing: None,
        }
    }

    #[test]
    fn one_off_attributes_to_creation_month() {
        let one_off = item(BillingType::OneOff);
        assert_eq!(attribution_month(&one_off), Month::new(2025, 1));
    }

    #[test]
    fn recurring_mid_month_attributes_to_first_full_month() {
        let mut recurring = item(BillingType::Recurring);
        recurring.effective_from = Some(date(2025, 2, 15));
        assert_eq!(attribution_month(&recurring), Month::new(2025, 3));
    }

    #[test]
    fn recurring_first_of_month_attributes_to_effective_month() {
        let mut recurring = item(BillingType::Recurring);
        recurring.effective_from = Some(date(2025, 2, 1));
        assert_eq!(attribution_month(&recurring), Month::new(2025, 2));
    }

    #[test]
    fn recurring_december_mid_month_rolls_into_january() {
        let mut recurring = item(BillingType::Recurring);
        recurring.effective_from = Some(date(2025, 12, 10));
        assert_eq!(attribution_month(&recurring), Month::new(2026, 1));
    }

    #[test]
    fn recurring_without_effective_date_falls_back_to_creation() {
        let recurring = item(BillingType::Recurring);
        assert_eq!(attribution_month(&recurring), Month::new(2025, 1));
    }

    #[test]
    fn commission_uses_full_price_never_prorated() {
        let mut recurring = item(BillingType::Recurring);
        recurring.effective_from = Some(date(2025, 2, 15));
        assert_eq!(commission_base_minor(&recurring), 200_000);
        assert_eq!(commission_amount_minor(&recurring), 20_000);
    }

    #[test]
    fn credit_pricing_overrides_the_listed_price() {
        let mut credit_based = item(BillingType::Recurring);
        credit_based.credit_pricing = Some(CreditPricing {
            max_credits: 50,
            price_per_credit_minor: 6_000,
        });
        assert_eq!(commission_base_minor(&credit_based), 300_000);
        assert_eq!(commission_amount_minor(&credit_based), 30_000);
    }

    #[test]
    fn fractional_commission_rounds_once() {
        let mut one_off = item(BillingType::OneOff);
        one_off.amount_minor = 33_333;
        one_off.commission_percent = 7.5;
        // 33333 * 0.075 = 2499.975 -> 2500
        assert_eq!(commission_amount_minor(&one_off), 2_500);
    }
}
