use chrono::{Datelike, NaiveDate};
use engage_types::{Month, ProrationResult};

/// Prorates a fixed monthly amount against a target month for a service that
/// started on `start_date`.
///
/// Rules, evaluated in order:
/// 1. No start date: the service predates tracking, full amount.
/// 2. Start strictly before the target month: full amount.
/// 3. Start within the target month: a 1st-of-month start is a full month;
///    any later day earns `days_in_month - day + 1` days.
/// 4. Start after the target month: nothing earned yet.
///
/// Rounding happens exactly once, on the final prorated amount, so monthly
/// totals match hand-checked expectations.
pub fn calculate_prorated_reward(
    monthly_amount_minor: u64,
    start_date: Option<NaiveDate>,
    target: Month,
) -> ProrationResult {
    let days_in_month = target.days();
    let full = ProrationResult {
        full_amount_minor: monthly_amount_minor,
        prorated_amount_minor: monthly_amount_minor,
        is_prorated: false,
        start_day: None,
        days_in_month,
        days_worked: days_in_month,
        percent_of_month: 100,
    };

    let start = match start_date {
        None => return full,
        Some(start) => start,
    };

    if start < target.first_day() {
        return full;
    }

    if !target.contains(start) {
        // Start is in a future month.
        return ProrationResult {
            full_amount_minor: monthly_amount_minor,
            prorated_amount_minor: 0,
            is_prorated: true,
            start_day: None,
            days_in_month,
            days_worked: 0,
            percent_of_month: 0,
        };
    }

    let day = start.day();
    if day == 1 {
        return ProrationResult {
            start_day: Some(1),
            ..full
        };
    }

    let days_worked = days_in_month - day + 1;
    let prorated = (monthly_amount_minor as f64 / f64::from(days_in_month)
        * f64::from(days_worked))
    .round() as u64;
    let percent_of_month =
        (f64::from(days_worked) / f64::from(days_in_month) * 100.0).round() as u32;

    ProrationResult {
        full_amount_minor: monthly_amount_minor,
        prorated_amount_minor: prorated,
        is_prorated: true,
        start_day: Some(day),
        days_in_month,
        days_worked,
        percent_of_month,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_of_month_start_is_never_partial() {
        let result =
            calculate_prorated_reward(30_000, Some(date(2025, 3, 1)), Month::new(2025, 3));
        assert_eq!(result.prorated_amount_minor, 30_000);
        assert!(!result.is_prorated);
        assert_eq!(result.start_day, Some(1));
    }

    #[test]
    fn mid_march_start_earns_sixteen_days() {
        let result =
            calculate_prorated_reward(30_000, Some(date(2025, 3, 16)), Month::new(2025, 3));
        assert_eq!(result.days_in_month, 31);
        assert_eq!(result.days_worked, 16);
        // 30000 / 31 * 16 = 15483.87..., rounded once at the end.
        assert_eq!(result.prorated_amount_minor, 15_484);
        assert!(result.is_prorated);
        assert_eq!(result.start_day, Some(16));
        assert_eq!(result.percent_of_month, 52);
    }

    #[test]
    fn future_start_earns_nothing() {
        let result =
            calculate_prorated_reward(30_000, Some(date(2025, 4, 10)), Month::new(2025, 3));
        assert_eq!(result.prorated_amount_minor, 0);
        assert_eq!(result.days_worked, 0);
        assert!(result.is_prorated);
    }

    #[test]
    fn missing_start_date_pays_in_full() {
        let result = calculate_prorated_reward(30_000, None, Month::new(2025, 3));
        assert_eq!(result.prorated_amount_minor, 30_000);
        assert!(!result.is_prorated);
        assert_eq!(result.start_day, None);
    }

    #[test]
    fn start_before_target_month_pays_in_full() {
        let result =
            calculate_prorated_reward(30_000, Some(date(2024, 11, 20)), Month::new(2025, 3));
        assert_eq!(result.prorated_amount_minor, 30_000);
        assert!(!result.is_prorated);
    }

    #[test]
    fn last_day_start_earns_one_day() {
        let result =
            calculate_prorated_reward(31_000, Some(date(2025, 3, 31)), Month::new(2025, 3));
        assert_eq!(result.days_worked, 1);
        assert_eq!(result.prorated_amount_minor, 1_000);
    }

    proptest! {
        #[test]
        fn prorated_never_exceeds_full(
            amount in 0u64..10_000_000,
            day in 1u32..=28,
            month in 1u32..=12,
        ) {
            let target = Month::new(2025, month);
            let result = calculate_prorated_reward(
                amount,
                Some(date(2025, month, day)),
                target,
            );
            prop_assert!(result.prorated_amount_minor <= result.full_amount_minor);
        }

        #[test]
        fn worked_days_accounts_for_every_day_from_start(
            day in 1u32..=28,
            month in 1u32..=12,
        ) {
            let target = Month::new(2025, month);
            let result = calculate_prorated_reward(
                10_000,
                Some(date(2025, month, day)),
                target,
            );
            prop_assert_eq!(result.days_worked, result.days_in_month - day + 1);
        }
    }
}
