use chrono::{Datelike, Days, Months, NaiveDate};

/// Calendar month `months_back` months before the month of `today`,
/// as (first day, last day), both inclusive.
///
/// ```
/// use backend::dashboards::d400_seller_performance::periods::month_window;
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let (from, to) = month_window(today, 1);
/// assert_eq!(from, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
/// assert_eq!(to, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
/// ```
pub fn month_window(today: NaiveDate, months_back: u32) -> (NaiveDate, NaiveDate) {
    let first_of_current = today - Days::new(u64::from(today.day0()));
    let first = first_of_current
        .checked_sub_months(Months::new(months_back))
        .unwrap_or(first_of_current);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first);
    (first, last)
}

/// Процент изменения `current` относительно `base`.
/// Нулевая база: 100, если есть рост, иначе 0.
pub fn variation_pct(current: f64, base: f64) -> f64 {
    if base == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (current - base) / base * 100.0
    }
}
