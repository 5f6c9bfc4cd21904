//! Spoken renderings of slot values.
//!
//! Every function returns `None` for an absent, blank or unparseable value so callers can
//! treat "malformed" and "not provided" the same way.

use chrono::{Local, NaiveDate, NaiveTime};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_WEEK: i64 = 604_800;
const SECONDS_PER_MONTH: i64 = 2_635_200;
const SECONDS_PER_YEAR: i64 = 31_536_000;

/// Day that relative dates ("today", "tomorrow") are measured against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReferenceDay {
    #[default]
    Today,
    Fixed(NaiveDate),
}

impl ReferenceDay {
    pub fn resolve(self) -> NaiveDate {
        match self {
            Self::Today => Local::now().date_naive(),
            Self::Fixed(date) => date,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpeechFormatter {
    reference: ReferenceDay,
}

impl SpeechFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference_date(date: NaiveDate) -> Self {
        Self { reference: ReferenceDay::Fixed(date) }
    }

    pub fn format_date(&self, date: Option<&str>) -> Option<String> {
        format_date(date, self.reference.resolve())
    }

    pub fn format_time(&self, time: Option<&str>) -> Option<String> {
        format_time(time)
    }

    pub fn format_duration(&self, duration: Option<&str>) -> Option<String> {
        format_duration(duration)
    }
}

/// `2016-12-31` becomes `December 31`; the reference day and its neighbours become
/// `today`, `tomorrow` and `yesterday`. The literal tokens `today` and `tomorrow` pass through.
pub fn format_date(date: Option<&str>, today: NaiveDate) -> Option<String> {
    let raw = non_empty(date)?;

    for token in ["today", "tomorrow"] {
        if raw.eq_ignore_ascii_case(token) {
            return Some(token.to_owned());
        }
    }

    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let rendered = match parsed.signed_duration_since(today).num_days() {
        0 => "today".to_owned(),
        1 => "tomorrow".to_owned(),
        -1 => "yesterday".to_owned(),
        _ => parsed.format("%B %d").to_string(),
    };
    Some(rendered)
}

/// `19:00` becomes `07:00 PM`.
pub fn format_time(time: Option<&str>) -> Option<String> {
    let raw = non_empty(time)?;
    let parsed = NaiveTime::parse_from_str(raw, "%H:%M").ok()?;
    Some(parsed.format("%I:%M %p").to_string())
}

/// ISO-8601 durations in coarse natural units: `PT4H` becomes `4 hours`.
pub fn format_duration(duration: Option<&str>) -> Option<String> {
    let raw = non_empty(duration)?;
    parse_duration_seconds(raw).map(natural_delta)
}

fn parse_duration_seconds(raw: &str) -> Option<i64> {
    let body = raw.strip_prefix('P')?;
    if body.is_empty() {
        return None;
    }

    let (date_part, time_part) = match body.split_once('T') {
        Some((_, "")) => return None,
        Some((date_part, time_part)) => (date_part, Some(time_part)),
        None => (body, None),
    };

    let mut total = sum_components(
        date_part,
        &[
            ('Y', SECONDS_PER_YEAR),
            ('M', SECONDS_PER_MONTH),
            ('W', SECONDS_PER_WEEK),
            ('D', SECONDS_PER_DAY),
        ],
    )?;
    if let Some(time_part) = time_part {
        total += sum_components(
            time_part,
            &[('H', SECONDS_PER_HOUR), ('M', SECONDS_PER_MINUTE), ('S', 1)],
        )?;
    }

    (total.is_finite() && total < i64::MAX as f64).then(|| total.floor() as i64)
}

// Designators must appear in the order given by `units`, each at most once. Amounts may carry
// a decimal fraction written with `.` or `,`.
fn sum_components(part: &str, units: &[(char, i64)]) -> Option<f64> {
    let mut total = 0.0;
    let mut amount = String::new();
    let mut next_unit = 0;

    for ch in part.chars() {
        match ch {
            '0'..='9' | '.' => {
                amount.push(ch);
                continue;
            }
            ',' => {
                amount.push('.');
                continue;
            }
            _ => {}
        }

        let offset = units[next_unit..].iter().position(|(unit, _)| *unit == ch)?;
        let index = next_unit + offset;
        let value = amount.parse::<f64>().ok()?;
        total += value * units[index].1 as f64;
        amount.clear();
        next_unit = index + 1;
    }

    amount.is_empty().then_some(total)
}

// Coarse units: whole seconds up to a day, then days, months of 30.5 days and 365-day years.
fn natural_delta(seconds: i64) -> String {
    let years = seconds / SECONDS_PER_YEAR;
    let within_year = seconds % SECONDS_PER_YEAR;
    let days = within_year / SECONDS_PER_DAY;
    let months = within_year / SECONDS_PER_MONTH;

    match (years, days) {
        (0, 0) => within_day(seconds),
        (0, 1) => "a day".to_owned(),
        (0, _) => match months {
            0 => format!("{days} days"),
            1 => "a month".to_owned(),
            _ => format!("{months} months"),
        },
        (1, _) => match (months, days) {
            (0, 0) => "a year".to_owned(),
            (0, 1) => "1 year, 1 day".to_owned(),
            (0, _) => format!("1 year, {days} days"),
            (1, _) => "1 year, 1 month".to_owned(),
            _ => format!("1 year, {months} months"),
        },
        _ => format!("{years} years"),
    }
}

fn within_day(seconds: i64) -> String {
    match seconds {
        0 => "a moment".to_owned(),
        1 => "a second".to_owned(),
        2..=59 => format!("{seconds} seconds"),
        60..=119 => "a minute".to_owned(),
        120..=3_599 => format!("{} minutes", seconds / SECONDS_PER_MINUTE),
        3_600..=7_199 => "an hour".to_owned(),
        _ => format!("{} hours", seconds / SECONDS_PER_HOUR),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
