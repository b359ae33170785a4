use crate::dates::{
    classify, is_date_key, is_date_stamp_key, render, Rendering, DEFAULT_DATE_STAMP_TAGS,
};
use crate::flatten::{flatten_with_separator, DEFAULT_KEY_SEPARATOR};
use crate::metadata::RawMetadata;
use crate::zone::{LocalZone, Timezone};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneLabel {
    NoZone,
    Utc,
    Named(Timezone),
}

impl fmt::Display for ZoneLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneLabel::NoZone => f.write_str("NO ZONE"),
            ZoneLabel::Utc => f.write_str("UTC"),
            ZoneLabel::Named(zone) => f.write_str(zone.name()),
        }
    }
}

impl Serialize for ZoneLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRecord {
    pub key: String,
    pub value: String,
    pub zone: Option<ZoneLabel>,
}

impl ReportRecord {
    fn new(key: &str, value: impl Into<String>, zone: Option<ZoneLabel>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
            zone,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub zone: Option<Timezone>,
    pub include_all: bool,
    pub local_zone: LocalZone,
    pub date_stamp_tags: Vec<String>,
    pub key_separator: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            zone: None,
            include_all: false,
            local_zone: LocalZone::System,
            date_stamp_tags: DEFAULT_DATE_STAMP_TAGS
                .iter()
                .map(|tag| tag.to_string())
                .collect(),
            key_separator: DEFAULT_KEY_SEPARATOR.to_string(),
        }
    }
}

pub fn assemble_report(raw: &RawMetadata, options: &ReportOptions) -> Vec<ReportRecord> {
    let flat = flatten_with_separator(raw, &options.key_separator);
    let mut records = Vec::new();

    for (key, value) in &flat {
        if !is_date_key(key) {
            if options.include_all {
                records.push(ReportRecord::new(key, value.to_string(), None));
            }
            continue;
        }

        let date_stamp = is_date_stamp_key(key, &options.key_separator, &options.date_stamp_tags);
        let field = classify(key, value, date_stamp);
        trace!(key = field.key, parsed = ?field.parsed, "classified date field");

        match render(&field.parsed, options.zone.as_ref(), &options.local_zone) {
            Some(Rendering::Plain(text)) => {
                records.push(ReportRecord::new(key, text, None));
            }
            Some(Rendering::Zoned {
                original,
                utc,
                requested,
            }) => {
                records.push(ReportRecord::new(key, original, Some(ZoneLabel::NoZone)));
                records.push(ReportRecord::new(key, utc, Some(ZoneLabel::Utc)));
                if let Some(zone) = options.zone {
                    let label = Some(ZoneLabel::Named(zone));
                    records.push(ReportRecord::new(key, requested, label));
                }
            }
            None => {}
        }
        records.push(ReportRecord::new(key, field.raw.to_string(), None));
    }

    records
}
