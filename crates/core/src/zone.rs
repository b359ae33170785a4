use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{zone} is not a valid IANA zone")]
pub struct InvalidZoneError {
    pub zone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(Tz);

impl Timezone {
    pub fn parse(input: &str) -> Result<Self, InvalidZoneError> {
        Tz::from_str(input.trim())
            .map(Timezone)
            .map_err(|_| InvalidZoneError {
                zone: input.to_string(),
            })
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn tz(&self) -> Tz {
        self.0
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn parse_zone(input: Option<&str>) -> Result<Option<Timezone>, InvalidZoneError> {
    match input.map(str::trim).filter(|v| !v.is_empty()) {
        Some(zone) => Timezone::parse(zone).map(Some),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalZone {
    #[default]
    System,
    Named(Timezone),
}

impl LocalZone {
    pub fn resolve(&self, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            LocalZone::System => resolve_in(&Local, naive),
            LocalZone::Named(zone) => resolve_in(&zone.tz(), naive),
        }
    }
}

fn resolve_in<Z: TimeZone>(zone: &Z, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    zone.from_local_datetime(naive)
        .earliest()
        .or_else(|| {
            zone.from_local_datetime(&(*naive + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::{parse_zone, LocalZone, Timezone};
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn parse_accepts_iana_names() {
        let zone = Timezone::parse("Asia/Tokyo").expect("valid zone");
        assert_eq!(zone.name(), "Asia/Tokyo");
        assert_eq!(zone.to_string(), "Asia/Tokyo");
    }

    #[test]
    fn parse_rejects_unknown_zone_and_names_it() {
        let err = Timezone::parse("a/b").expect_err("must fail");
        assert_eq!(err.zone, "a/b");
        assert_eq!(err.to_string(), "a/b is not a valid IANA zone");
    }

    #[test]
    fn blank_zone_means_no_zone() {
        assert_eq!(parse_zone(None).expect("none"), None);
        assert_eq!(parse_zone(Some("  ")).expect("blank"), None);
        assert!(parse_zone(Some("Europe/London")).expect("valid").is_some());
        assert!(parse_zone(Some("Not/AZone")).is_err());
    }

    #[test]
    fn named_local_zone_shifts_forward_across_dst_gap() {
        let zone = LocalZone::Named(Timezone::parse("Europe/London").expect("zone"));
        let gap = NaiveDate::from_ymd_opt(2023, 3, 26)
            .and_then(|d| d.and_hms_opt(1, 30, 0))
            .expect("naive");
        let resolved = zone.resolve(&gap).expect("shifted");
        assert_eq!(resolved.hour(), 2);
        assert_eq!(resolved.minute(), 30);
    }
}
