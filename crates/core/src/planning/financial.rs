//! Time-value-of-money primitives.
//!
//! All functions work on a periodic-rate model: an annual percentage rate `r`
//! becomes `i = (r / 100) / n` for `n` periods per year, and a horizon of
//! `t` years spans `N = n * t` periods.

use chrono::{DateTime, Utc};

use crate::constants::{DAYS_PER_YEAR, MILLIS_PER_DAY};

/// Years between two instants, using 365.25-day years.
///
/// Negative when `end` is before `start`; callers clamp as needed.
pub fn year_fraction(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let millis = (end - start).num_milliseconds() as f64;
    millis / (DAYS_PER_YEAR * MILLIS_PER_DAY)
}

fn periodic_rate(rate_percent: f64, n_per_year: u32) -> f64 {
    rate_percent / 100.0 / f64::from(n_per_year)
}

/// Payment per period of an ordinary annuity that accumulates to `future_value`.
///
/// Returns `f64::INFINITY` when no periods remain. A zero rate, or growth too
/// small to divide by, falls back to the linear `future_value / N`.
pub fn required_payment_for_future_value(
    future_value: f64,
    rate_percent: f64,
    n_per_year: u32,
    t_years: f64,
) -> f64 {
    let periods = f64::from(n_per_year) * t_years;
    if !(periods > 0.0) {
        return f64::INFINITY;
    }
    if rate_percent == 0.0 {
        return future_value / periods;
    }

    let i = periodic_rate(rate_percent, n_per_year);
    let growth = (1.0 + i).powf(periods) - 1.0;
    if growth.abs() < f64::EPSILON {
        return future_value / periods;
    }
    (i * future_value) / growth
}

/// Present value that grows to `future_value` by the target date.
pub fn required_lump_sum_for_future_value(
    future_value: f64,
    rate_percent: f64,
    n_per_year: u32,
    t_years: f64,
) -> f64 {
    if t_years <= 0.0 || rate_percent == 0.0 {
        return future_value;
    }
    let i = periodic_rate(rate_percent, n_per_year);
    let periods = f64::from(n_per_year) * t_years;
    future_value / (1.0 + i).powf(periods)
}

/// Compounds `present_value` forward to the target date.
pub fn future_value_of_present(
    present_value: f64,
    rate_percent: f64,
    n_per_year: u32,
    t_years: f64,
) -> f64 {
    // Zero stays zero even when the growth factor overflows to infinity.
    if t_years <= 0.0 || rate_percent == 0.0 || present_value == 0.0 {
        return present_value;
    }
    let i = periodic_rate(rate_percent, n_per_year);
    let periods = f64::from(n_per_year) * t_years;
    present_value * (1.0 + i).powf(periods)
}

/// Future value still needed once existing savings have grown to the target date.
///
/// Never negative: savings that meet or exceed the target leave nothing to fund.
pub fn net_target_after_existing(
    future_value: f64,
    existing: f64,
    rate_percent: f64,
    n_per_year: u32,
    t_years: f64,
) -> f64 {
    let grown = future_value_of_present(existing, rate_percent, n_per_year, t_years);
    (future_value - grown).max(0.0)
}
