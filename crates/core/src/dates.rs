use crate::metadata::{MetaValue, Timestamp};
use crate::zone::{LocalZone, Timezone};
use chrono::format::{parse, Parsed, StrftimeItems};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Utc};

pub const DEFAULT_DATE_STAMP_TAGS: &[&str] = &["GPSDateStamp"];

const DATE_TIME_MEDIUM: &str = "%b %-d, %Y, %-I:%M:%S %p";
const DATE_FULL: &str = "%B %-d, %Y";
const DATE_STAMP_FORMAT: &str = "%Y:%m:%d";

// `%.f` also matches a missing fraction. Each entry is tried with a trailing offset first.
const ISO_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
    "%Y%m%dT%H",
];
const ISO_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%Y-%m", "%Y"];

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedDateValue {
    NativeInstant(Timestamp),
    IsoInstant(Timestamp),
    DateStamp(NaiveDate),
    Unparsed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateField<'a> {
    pub key: &'a str,
    pub raw: &'a MetaValue,
    pub parsed: ParsedDateValue,
}

pub fn is_date_key(key: &str) -> bool {
    key.to_ascii_lowercase().contains("date")
}

pub fn is_date_stamp_key(key: &str, separator: &str, date_stamp_tags: &[String]) -> bool {
    let last = if separator.is_empty() {
        key
    } else {
        key.rsplit(separator).next().unwrap_or(key)
    };
    date_stamp_tags.iter().any(|tag| tag == key || tag == last)
}

pub fn classify<'a>(key: &'a str, raw: &'a MetaValue, date_stamp: bool) -> DateField<'a> {
    let parsed = match raw {
        MetaValue::DateTime(ts) => ParsedDateValue::NativeInstant(*ts),
        MetaValue::Text(text) if date_stamp => parse_date_stamp(text)
            .map(ParsedDateValue::DateStamp)
            .unwrap_or_else(|| ParsedDateValue::Unparsed(text.clone())),
        MetaValue::Text(text) => parse_iso(text)
            .map(ParsedDateValue::IsoInstant)
            .unwrap_or_else(|| ParsedDateValue::Unparsed(text.clone())),
        other => ParsedDateValue::Unparsed(other.to_string()),
    };
    DateField { key, raw, parsed }
}

pub fn parse_date_stamp(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_STAMP_FORMAT).ok()
}

pub fn parse_iso(input: &str) -> Option<Timestamp> {
    let normalized = input.trim().replacen(',', ".", 1);
    if normalized.is_empty() {
        return None;
    }

    if let Some(ts) = parse_date_time(&normalized, ISO_DATE_TIME_FORMATS) {
        return Some(ts);
    }
    ISO_DATE_FORMATS
        .iter()
        .find_map(|fmt| parse_fields(&normalized, fmt))
}

pub(crate) fn parse_date_time(input: &str, formats: &[&str]) -> Option<Timestamp> {
    let input = input.trim();
    for fmt in formats {
        if let Some(ts) = parse_fields(input, &format!("{fmt}%#z")) {
            return Some(ts);
        }
        if let Some(ts) = parse_fields(input, fmt) {
            return Some(ts);
        }
    }

    None
}

// Missing month/day default to 1, missing hour/minute to 0.
fn parse_fields(input: &str, fmt: &str) -> Option<Timestamp> {
    let mut parsed = Parsed::new();
    parse(&mut parsed, input, StrftimeItems::new(fmt)).ok()?;
    if parsed.month().is_none() {
        parsed.set_month(1).ok()?;
    }
    if parsed.day().is_none() {
        parsed.set_day(1).ok()?;
    }
    if parsed.hour_div_12().is_none() {
        parsed.set_hour(0).ok()?;
    }
    if parsed.minute().is_none() {
        parsed.set_minute(0).ok()?;
    }

    let date = parsed.to_naive_date().ok()?;
    let time = parsed.to_naive_time().ok()?;
    let local = date.and_time(time);
    match parsed.offset() {
        Some(seconds) => {
            let offset = FixedOffset::east_opt(seconds)?;
            Some(Timestamp::with_offset(local, offset))
        }
        None => Some(Timestamp::naive(local)),
    }
}

pub fn format_date_time<Tz>(value: &chrono::DateTime<Tz>) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    value.format(DATE_TIME_MEDIUM).to_string()
}

pub fn format_naive_date_time(value: &NaiveDateTime) -> String {
    value.format(DATE_TIME_MEDIUM).to_string()
}

pub fn format_date(value: &NaiveDate) -> String {
    value.format(DATE_FULL).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendering {
    Plain(String),
    Zoned {
        original: String,
        utc: String,
        requested: String,
    },
}

pub fn render(
    parsed: &ParsedDateValue,
    zone: Option<&Timezone>,
    local_zone: &LocalZone,
) -> Option<Rendering> {
    match parsed {
        ParsedDateValue::NativeInstant(ts) | ParsedDateValue::IsoInstant(ts) => {
            render_instant(ts, zone, local_zone)
        }
        ParsedDateValue::DateStamp(date) => Some(Rendering::Plain(format_date(date))),
        ParsedDateValue::Unparsed(_) => None,
    }
}

fn render_instant(
    ts: &Timestamp,
    zone: Option<&Timezone>,
    local_zone: &LocalZone,
) -> Option<Rendering> {
    let original = format_naive_date_time(&ts.local);
    let Some(zone) = zone else {
        return Some(Rendering::Plain(original));
    };

    let instant = match ts.offset() {
        Some(offset) => ts.local.and_local_timezone(offset).single(),
        None => local_zone.resolve(&ts.local),
    };
    let Some(instant) = instant else {
        return Some(Rendering::Plain(original));
    };
    Some(Rendering::Zoned {
        original,
        utc: format_date_time(&instant.with_timezone(&Utc)),
        requested: format_date_time(&instant.with_timezone(&zone.tz())),
    })
}
