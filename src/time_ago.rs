//! Human-relative rendering of timestamps ("3 hours ago", "in a minute").
//!
//! Each unit is compared by its rounded value against a cutoff; the first row
//! that fits wins. A month is 30.4375 days and a year is twelve months.

use chrono::{DateTime, Utc};

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
// Average Gregorian month. Calendar-month counting can land one unit away
// near the 10- and 17-month cutoffs; this is an approximation.
const MONTH: f64 = 30.4375 * DAY;
const YEAR: f64 = 12.0 * MONTH;

/// Render `then` relative to `now`.
pub fn from_now(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - then).num_milliseconds() as f64 / 1000.0;
    let phrase = phrase(elapsed.abs());
    if elapsed < 0.0 {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}

fn phrase(secs: f64) -> String {
    let seconds = secs.round();
    if seconds <= 44.0 {
        return "a few seconds".into();
    }
    if seconds <= 89.0 {
        return "a minute".into();
    }

    let minutes = (secs / MINUTE).round();
    if minutes <= 44.0 {
        return counted(minutes, "minutes", "a minute");
    }
    if minutes <= 89.0 {
        return "an hour".into();
    }

    let hours = (secs / HOUR).round();
    if hours <= 21.0 {
        return counted(hours, "hours", "an hour");
    }
    if hours <= 35.0 {
        return "a day".into();
    }

    let days = (secs / DAY).round();
    if days <= 25.0 {
        return counted(days, "days", "a day");
    }
    if days <= 45.0 {
        return "a month".into();
    }

    let months = (secs / MONTH).round();
    if months <= 10.0 {
        return counted(months, "months", "a month");
    }
    if months <= 17.0 {
        return "a year".into();
    }

    counted((secs / YEAR).round(), "years", "a year")
}

fn counted(n: f64, unit: &str, single: &str) -> String {
    if n <= 1.0 {
        single.to_string()
    } else {
        format!("{} {}", n as i64, unit)
    }
}
