//! Spanish date and time expressions.
//!
//! Input is normalized text (see [`crate::text::normalize`]).
//!
//! Dates, most specific first:
//! - `D de MES` (`20 de diciembre`), rolled to next year when already past
//! - `pasado manana` (+2), `manana` (+1), `hoy`
//! - weekday names, resolved to the next occurrence and never to today
//!
//! Times:
//! - `HH:MM` or `HH.MM`
//! - `HH` followed by `am`, `pm`, `hrs`, `horas`, `h`, `de la tarde`,
//!   `de la noche` or `de la manana`
//! - `a las HH`
//!
//! `de la manana` is a time qualifier and never reads as "tomorrow".

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::contains_keyword;

static DAY_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})\s+de\s+(enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|setiembre|octubre|noviembre|diciembre)\b")
        .expect("valid day-month regex")
});
static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})[:.](\d{2})\b").expect("valid clock regex"));
static SUFFIXED_HOUR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})\s*(am|pm|hrs|hr|horas|hora|h|de la tarde|de la noche|de la manana)\b")
        .expect("valid suffixed hour regex")
});
static AT_HOUR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\ba las (\d{1,2})\b").expect("valid at-hour regex"));

const MORNING_QUALIFIER: &str = "de la manana";

const MONTHS: &[(&str, u32)] = &[
    ("enero", 1),
    ("febrero", 2),
    ("marzo", 3),
    ("abril", 4),
    ("mayo", 5),
    ("junio", 6),
    ("julio", 7),
    ("agosto", 8),
    ("septiembre", 9),
    ("setiembre", 9),
    ("octubre", 10),
    ("noviembre", 11),
    ("diciembre", 12),
];

const WEEKDAYS: &[(&str, Weekday)] = &[
    ("lunes", Weekday::Mon),
    ("martes", Weekday::Tue),
    ("miercoles", Weekday::Wed),
    ("jueves", Weekday::Thu),
    ("viernes", Weekday::Fri),
    ("sabado", Weekday::Sat),
    ("domingo", Weekday::Sun),
];

/// Parses the first date expression relative to `today`.
pub fn parse_date(normalized: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = normalized.replace(MORNING_QUALIFIER, " ");

    for caps in DAY_MONTH_RE.captures_iter(&text) {
        let Ok(day) = caps[1].parse::<u32>() else {
            continue;
        };
        let Some(month) = MONTHS
            .iter()
            .find(|(name, _)| *name == &caps[2])
            .map(|(_, m)| *m)
        else {
            continue;
        };
        let Some(date) = NaiveDate::from_ymd_opt(today.year(), month, day) else {
            continue;
        };
        if date >= today {
            return Some(date);
        }
        if let Some(next_year) = NaiveDate::from_ymd_opt(today.year() + 1, month, day) {
            return Some(next_year);
        }
    }

    if contains_keyword(&text, &["pasado manana"]) {
        return Some(today + Duration::days(2));
    }
    if contains_keyword(&text, &["manana"]) {
        return Some(today + Duration::days(1));
    }
    if contains_keyword(&text, &["hoy"]) {
        return Some(today);
    }

    WEEKDAYS
        .iter()
        .find(|(name, _)| contains_keyword(&text, &[*name]))
        .map(|(_, weekday)| {
            let current = today.weekday().num_days_from_monday() as i64;
            let target = weekday.num_days_from_monday() as i64;
            let mut diff = target - current;
            if diff <= 0 {
                diff += 7;
            }
            today + Duration::days(diff)
        })
}

/// Parses the first time-of-day expression.
pub fn parse_time(normalized: &str) -> Option<NaiveTime> {
    if let Some(caps) = CLOCK_RE.captures(normalized) {
        let hour = caps[1].parse::<u32>().ok();
        let minute = caps[2].parse::<u32>().ok();
        if let (Some(hour), Some(minute)) = (hour, minute) {
            if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
                return Some(time);
            }
        }
    }

    if let Some(caps) = SUFFIXED_HOUR_RE.captures(normalized) {
        if let Ok(mut hour) = caps[1].parse::<u32>() {
            let suffix = &caps[2];
            let afternoon = matches!(suffix, "pm" | "de la tarde" | "de la noche");
            if afternoon && hour < 12 {
                hour += 12;
            } else if suffix == "am" && hour == 12 {
                hour = 0;
            }
            if let Some(time) = NaiveTime::from_hms_opt(hour, 0, 0) {
                return Some(time);
            }
        }
    }

    AT_HOUR_RE
        .captures(normalized)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .and_then(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
}

/// Removes date and time expressions so their digits are not read as a
/// headcount.
pub fn strip_date_time(normalized: &str) -> String {
    let text = CLOCK_RE.replace_all(normalized, " ");
    let text = SUFFIXED_HOUR_RE.replace_all(&text, " ");
    let text = AT_HOUR_RE.replace_all(&text, " ");
    DAY_MONTH_RE.replace_all(&text, " ").into_owned()
}
