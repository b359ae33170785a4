use chrono::{FixedOffset, NaiveDateTime};
use std::collections::BTreeMap;
use std::fmt;

pub type RawMetadata = BTreeMap<String, MetaValue>;
pub type FlatMetadata = BTreeMap<String, MetaValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub local: NaiveDateTime,
    pub offset_seconds: Option<i32>,
}

impl Timestamp {
    pub fn naive(local: NaiveDateTime) -> Self {
        Self {
            local,
            offset_seconds: None,
        }
    }

    pub fn with_offset(local: NaiveDateTime, offset: FixedOffset) -> Self {
        Self {
            local,
            offset_seconds: Some(offset.local_minus_utc()),
        }
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset_seconds.and_then(FixedOffset::east_opt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.local.format("%Y-%m-%dT%H:%M:%S%.f"))?;
        if let Some(offset) = self.offset() {
            write!(f, "{}", offset)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    DateTime(Timestamp),
    List(Vec<MetaValue>),
    Map(BTreeMap<String, MetaValue>),
}

impl MetaValue {
    pub fn is_container(&self) -> bool {
        matches!(self, MetaValue::List(_) | MetaValue::Map(_))
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Null => f.write_str("null"),
            MetaValue::Bool(v) => write!(f, "{}", v),
            MetaValue::Integer(v) => write!(f, "{}", v),
            MetaValue::Float(v) => write!(f, "{}", v),
            MetaValue::Text(v) => f.write_str(v),
            MetaValue::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            MetaValue::DateTime(v) => write!(f, "{}", v),
            MetaValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            MetaValue::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MetaValue, Timestamp};
    use chrono::{FixedOffset, NaiveDate};
    use std::collections::BTreeMap;

    fn sample_time() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 4, 10)
            .and_then(|d| d.and_hms_opt(15, 29, 56))
            .expect("valid date")
    }

    #[test]
    fn timestamp_displays_as_iso() {
        let naive = Timestamp::naive(sample_time());
        assert_eq!(naive.to_string(), "2023-04-10T15:29:56");

        let offset = FixedOffset::east_opt(9 * 3600).expect("offset");
        let zoned = Timestamp::with_offset(sample_time(), offset);
        assert_eq!(zoned.to_string(), "2023-04-10T15:29:56+09:00");
        assert_eq!(zoned.offset(), Some(offset));
    }

    #[test]
    fn display_renders_scalars_and_empty_containers() {
        assert_eq!(MetaValue::Float(72.0).to_string(), "72");
        assert_eq!(MetaValue::Float(2.8).to_string(), "2.8");
        assert_eq!(MetaValue::Bytes(vec![0, 1, 2]).to_string(), "<3 bytes>");
        assert_eq!(MetaValue::List(Vec::new()).to_string(), "[]");
        assert_eq!(MetaValue::Map(BTreeMap::new()).to_string(), "{}");
        assert_eq!(
            MetaValue::List(vec![MetaValue::Integer(2), MetaValue::Integer(3)]).to_string(),
            "[2, 3]"
        );
    }
}
