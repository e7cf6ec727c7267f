//! Date formatting helpers for rendering issues and releases.

use chrono::{DateTime, Utc};

/// Format a date the long way, e.g. "22 April 2024".
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Format a date relative to now: "today", "yesterday", "3 weeks ago".
pub fn format_relative_time(date: &DateTime<Utc>) -> String {
    relative_from(date, &Utc::now())
}

/// Relative description of `date` as seen from `now`, bucketed by
/// calendar day.
fn relative_from(date: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let days = (now.date_naive() - date.date_naive()).num_days();

    if days <= 0 {
        return "today".to_string();
    }
    if days == 1 {
        return "yesterday".to_string();
    }
    if days < 7 {
        return format!("{days} days ago");
    }
    if days < 30 {
        let weeks = days / 7;
        return format!("{} {} ago", weeks, plural(weeks, "week"));
    }
    if days < 365 {
        let months = days / 30;
        return format!("{} {} ago", months, plural(months, "month"));
    }
    let years = days / 365;
    format!("{} {} ago", years, plural(years, "year"))
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        unit.to_string()
    } else {
        format!("{unit}s")
    }
}
