//! Unit conversions applied to monthly series.
//!
//! All functions operate element-wise; NaN (missing) values stay NaN.

/// Inches per millimetre.
pub const INCHES_PER_MM: f64 = 0.0393701;

/// Days per calendar month. February is 28.25 to average over leap years.
pub const DAYS_PER_MONTH: [f64; 12] = [
    31.0, 28.25, 31.0, 30.0, 31.0, 30.0, 31.0, 31.0, 30.0, 31.0, 30.0, 31.0,
];

pub fn c_to_f(values: [f64; 12]) -> [f64; 12] {
    values.map(|c| c * 9.0 / 5.0 + 32.0)
}

pub fn f_to_c(values: [f64; 12]) -> [f64; 12] {
    values.map(|f| (f - 32.0) * 5.0 / 9.0)
}

pub fn mm_to_in(values: [f64; 12]) -> [f64; 12] {
    values.map(|mm| mm * INCHES_PER_MM)
}

pub fn in_to_mm(values: [f64; 12]) -> [f64; 12] {
    values.map(|inches| inches / INCHES_PER_MM)
}

/// Convert monthly totals into daily averages.
pub fn to_daily_average(values: [f64; 12]) -> [f64; 12] {
    let mut out = values;
    for (value, days) in out.iter_mut().zip(DAYS_PER_MONTH) {
        *value /= days;
    }
    out
}

/// Convert daily averages into monthly totals.
pub fn to_monthly_total(values: [f64; 12]) -> [f64; 12] {
    let mut out = values;
    for (value, days) in out.iter_mut().zip(DAYS_PER_MONTH) {
        *value *= days;
    }
    out
}

/// Case-insensitive substring match on a units string.
///
/// Matching is by containment, so `"dailyin"` matches both `"daily"` and `"in"`.
pub fn units_mention(units: &str, needle: &str) -> bool {
    units.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: [f64; 12], b: [f64; 12]) {
        for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
            assert!((x - y).abs() < 1e-9, "month {i}: {x} != {y}");
        }
    }

    const SAMPLE: [f64; 12] = [
        81.2, 64.0, 70.5, 55.1, 48.9, 33.0, 12.7, 15.3, 22.8, 41.6, 77.4, 90.0,
    ];

    #[test]
    fn mm_inch_round_trip_is_identity() {
        assert_close(in_to_mm(mm_to_in(SAMPLE)), SAMPLE);
    }

    #[test]
    fn celsius_fahrenheit_round_trip_is_identity() {
        assert_close(f_to_c(c_to_f(SAMPLE)), SAMPLE);
    }

    #[test]
    fn daily_average_divides_by_days_per_month() {
        let daily = to_daily_average(SAMPLE);
        assert!((daily[0] - 81.2 / 31.0).abs() < 1e-12);
        assert!((daily[1] - 64.0 / 28.25).abs() < 1e-12);
        assert!((daily[3] - 55.1 / 30.0).abs() < 1e-12);
        assert_close(to_monthly_total(daily), SAMPLE);
    }

    #[test]
    fn freezing_point_converts_to_32f() {
        let mut values = [0.0; 12];
        values[6] = 100.0;
        let f = c_to_f(values);
        assert_eq!(f[0], 32.0);
        assert_eq!(f[6], 212.0);
    }

    #[test]
    fn units_match_by_case_insensitive_containment() {
        assert!(units_mention("dailyIN", "in"));
        assert!(units_mention("DailyIn", "daily"));
        assert!(units_mention("F", "f"));
        assert!(!units_mention("mm/day", "in"));
        // "minutes" contains "in"
        assert!(units_mention("minutes", "in"));
    }
}
