//! # Checkout Billing Calculator
//!
//! Computes what a stay costs at checkout time.
//!
//! ## The Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Excess-Hour Billing                                │
//! │                                                                         │
//! │  elapsed = now − check_in                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  hours_used = ceil(elapsed in hours), floored at 1                     │
//! │       │                                                                 │
//! │       ├── hours_used ≤ included_hours                                  │
//! │       │        └── total = base price                                  │
//! │       │                                                                 │
//! │       └── hours_used > included_hours                                  │
//! │                ├── excess price configured:                            │
//! │                │     total = base + (hours − included) × excess        │
//! │                └── no excess price:                                    │
//! │                      total = base (overtime not separately billed)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  total = max(total, base price)   ← guards non-monotonic clocks        │
//! │                                                                         │
//! │  Example (base 500.00, 3 included hours, 100.00/excess hour):          │
//! │    2h10m → 3 hours used  → 500.00                                      │
//! │    3h10m → 4 hours used  → 600.00                                      │
//! │    5m    → 1 hour used   → 500.00 (minimum charge)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pure function: the clock is an input, never read here.

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::types::Rate;
use crate::MIN_BILLABLE_HOURS;

// =============================================================================
// Bill
// =============================================================================

/// The outcome of the checkout calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bill {
    /// Whole hours billed (ceiling of elapsed time, minimum 1).
    pub hours_used: i64,

    /// Total amount due.
    pub total: Money,
}

// =============================================================================
// Calculator
// =============================================================================

/// Computes the bill for a stay under `rate` from `check_in` to `now`.
///
/// ## Rules
/// 1. Elapsed time is rounded *up* to whole hours - a started hour is a
///    billed hour.
/// 2. At least [`MIN_BILLABLE_HOURS`] is always charged, even if the clock
///    ran backwards between check-in and checkout.
/// 3. Past the rate's included hours, each excess hour costs the rate's
///    excess price. A rate with no excess price bills the base only.
/// 4. The total is never below the base price.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use veranda_core::billing::compute_bill;
/// use veranda_core::types::Rate;
///
/// let rate = Rate::sample("r", "b", 50_000, 3, Some(10_000));
/// let check_in = Utc::now();
///
/// let bill = compute_bill(&rate, check_in, check_in + Duration::minutes(310));
/// assert_eq!(bill.hours_used, 6);
/// assert_eq!(bill.total.cents(), 80_000);
/// ```
pub fn compute_bill(rate: &Rate, check_in: DateTime<Utc>, now: DateTime<Utc>) -> Bill {
    let hours_used = billable_hours(check_in, now);

    let excess_hours = (hours_used - rate.included_hours).max(0);
    let total = match rate.excess_price() {
        Some(excess_price) if excess_hours > 0 => rate.price() + excess_price * excess_hours,
        _ => rate.price(),
    };

    Bill {
        hours_used,
        // Rule 4: never bill below the base price.
        total: total.max(rate.price()),
    }
}

/// Whole billable hours between `check_in` and `now`.
///
/// Ceiling on seconds, so 1h00m01s is two hours. Non-positive elapsed time
/// clamps to the minimum charge.
fn billable_hours(check_in: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let elapsed_secs = (now - check_in).num_seconds();
    if elapsed_secs <= 0 {
        return MIN_BILLABLE_HOURS;
    }
    let hours = (elapsed_secs + 3599) / 3600;
    hours.max(MIN_BILLABLE_HOURS)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn rate_with_excess() -> Rate {
        // 500.00 base, 3 included hours, 100.00 per excess hour
        Rate::sample("rate-1", "branch-1", 50_000, 3, Some(10_000))
    }

    fn rate_without_excess() -> Rate {
        Rate::sample("rate-2", "branch-1", 50_000, 3, None)
    }

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    #[test]
    fn test_within_included_hours() {
        // 2h10m rounds up to 3 hours, still within the included 3
        let bill = compute_bill(&rate_with_excess(), t0(), t0() + Duration::minutes(130));
        assert_eq!(bill.hours_used, 3);
        assert_eq!(bill.total.cents(), 50_000);
    }

    #[test]
    fn test_one_excess_hour() {
        // 3h10m rounds up to 4 hours: one excess hour
        let bill = compute_bill(&rate_with_excess(), t0(), t0() + Duration::minutes(190));
        assert_eq!(bill.hours_used, 4);
        assert_eq!(bill.total.cents(), 60_000);
    }

    #[test]
    fn test_minimum_charge() {
        // 5 minutes still bills one full hour at the base price
        let bill = compute_bill(&rate_with_excess(), t0(), t0() + Duration::minutes(5));
        assert_eq!(bill.hours_used, 1);
        assert_eq!(bill.total.cents(), 50_000);
    }

    #[test]
    fn test_exact_boundary_is_not_excess() {
        // Exactly 3h00m00s is 3 hours, not 4
        let bill = compute_bill(&rate_with_excess(), t0(), t0() + Duration::hours(3));
        assert_eq!(bill.hours_used, 3);
        assert_eq!(bill.total.cents(), 50_000);

        // One second past the boundary starts the fourth hour
        let bill = compute_bill(
            &rate_with_excess(),
            t0(),
            t0() + Duration::hours(3) + Duration::seconds(1),
        );
        assert_eq!(bill.hours_used, 4);
        assert_eq!(bill.total.cents(), 60_000);
    }

    #[test]
    fn test_no_excess_price_configured() {
        // 5 hours on a 3-hour rate with no excess price: base only
        let bill = compute_bill(&rate_without_excess(), t0(), t0() + Duration::hours(5));
        assert_eq!(bill.hours_used, 5);
        assert_eq!(bill.total.cents(), 50_000);
    }

    #[test]
    fn test_clock_ran_backwards() {
        // now < check_in: clamp to the minimum charge, never a negative bill
        let bill = compute_bill(&rate_with_excess(), t0() + Duration::hours(2), t0());
        assert_eq!(bill.hours_used, 1);
        assert_eq!(bill.total.cents(), 50_000);
    }

    #[test]
    fn test_long_stay() {
        // 10h on the excess rate: 500 + 7 × 100
        let bill = compute_bill(&rate_with_excess(), t0(), t0() + Duration::hours(10));
        assert_eq!(bill.hours_used, 10);
        assert_eq!(bill.total.cents(), 120_000);
    }
}
