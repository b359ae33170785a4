use crate::decoder::{DecodeError, MetadataDecoder};
use crate::metadata::{MetaValue, RawMetadata, Timestamp};
use chrono::{FixedOffset, NaiveDate};
use exif::{Exif, Field, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::warn;

const DECODER_NAME: &str = "kamadak-exif";

const SKIPPED_TAGS: &[Tag] = &[
    Tag::ExifIFDPointer,
    Tag::GPSInfoIFDPointer,
    Tag::InteropIFDPointer,
];

// (date tag, output name, offset tag, subsec tag)
const DATE_TIME_TAGS: &[(Tag, &str, Tag, Tag)] = &[
    (
        Tag::DateTime,
        "ModifyDate",
        Tag::OffsetTime,
        Tag::SubSecTime,
    ),
    (
        Tag::DateTimeOriginal,
        "DateTimeOriginal",
        Tag::OffsetTimeOriginal,
        Tag::SubSecTimeOriginal,
    ),
    (
        Tag::DateTimeDigitized,
        "CreateDate",
        Tag::OffsetTimeDigitized,
        Tag::SubSecTimeDigitized,
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct KamadakExifDecoder;

impl MetadataDecoder for KamadakExifDecoder {
    fn name(&self) -> &'static str {
        DECODER_NAME
    }

    fn decode(&self, path: &Path) -> Result<RawMetadata, DecodeError> {
        read_exif_metadata(path)
    }
}

pub fn read_exif_metadata(path: &Path) -> Result<RawMetadata, DecodeError> {
    let file = File::open(path).map_err(|err| DecodeError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let mut buf = BufReader::new(file);
    let exif = Reader::new()
        .continue_on_error(true)
        .read_from_container(&mut buf)
        .or_else(|err| {
            err.distill_partial_result(|errors| {
                for err in errors {
                    warn!(path = %path.display(), error = %err, "EXIFの一部を読み飛ばしました");
                }
            })
        })
        .map_err(|err| DecodeError::Parse {
            decoder: DECODER_NAME,
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    Ok(collect_fields(&exif))
}

fn collect_fields(exif: &Exif) -> RawMetadata {
    let mut out = RawMetadata::new();

    for field in exif.fields() {
        if field.ifd_num != In::PRIMARY || SKIPPED_TAGS.contains(&field.tag) {
            continue;
        }

        let (name, value) = match DATE_TIME_TAGS.iter().find(|(tag, ..)| *tag == field.tag) {
            Some((_, name, offset_tag, subsec_tag)) => (
                name.to_string(),
                date_time_value(exif, field, *offset_tag, *subsec_tag)
                    .unwrap_or_else(|| convert_value(&field.value)),
            ),
            None => (field.tag.to_string(), convert_value(&field.value)),
        };
        out.entry(name).or_insert(value);
    }

    out
}

fn date_time_value(
    exif: &Exif,
    field: &Field,
    offset_tag: Tag,
    subsec_tag: Tag,
) -> Option<MetaValue> {
    let Value::Ascii(ref parts) = field.value else {
        return None;
    };
    let mut dt = exif::DateTime::from_ascii(parts.first()?).ok()?;

    if let Some(raw) = first_ascii(exif, subsec_tag) {
        if let Err(err) = dt.parse_subsec(raw) {
            warn!(tag = %subsec_tag, error = %err, "サブ秒タグを解釈できませんでした");
        }
    }
    if let Some(raw) = first_ascii(exif, offset_tag) {
        if let Err(err) = dt.parse_offset(raw) {
            warn!(tag = %offset_tag, error = %err, "オフセットタグを解釈できませんでした");
        }
    }

    let local = NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())?
        .and_hms_nano_opt(
            dt.hour.into(),
            dt.minute.into(),
            dt.second.into(),
            dt.nanosecond.unwrap_or(0),
        )?;
    let timestamp = match dt.offset.and_then(|m| FixedOffset::east_opt(i32::from(m) * 60)) {
        Some(offset) => Timestamp::with_offset(local, offset),
        None => Timestamp::naive(local),
    };
    Some(MetaValue::DateTime(timestamp))
}

fn first_ascii(exif: &Exif, tag: Tag) -> Option<&[u8]> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(parts) => parts.first().map(Vec::as_slice),
        _ => None,
    }
}

fn convert_value(value: &Value) -> MetaValue {
    match value {
        Value::Ascii(parts) => {
            let texts = parts.iter().map(|raw| MetaValue::Text(ascii(raw)));
            collapse(texts.collect())
        }
        Value::Byte(v) => integers(v),
        Value::Short(v) => integers(v),
        Value::Long(v) => integers(v),
        Value::SByte(v) => integers(v),
        Value::SShort(v) => integers(v),
        Value::SLong(v) => integers(v),
        Value::Rational(v) => collapse(v.iter().map(|r| MetaValue::Float(r.to_f64())).collect()),
        Value::SRational(v) => collapse(v.iter().map(|r| MetaValue::Float(r.to_f64())).collect()),
        Value::Float(v) => collapse(v.iter().map(|n| MetaValue::Float(f64::from(*n))).collect()),
        Value::Double(v) => collapse(v.iter().map(|n| MetaValue::Float(*n)).collect()),
        Value::Undefined(bytes, _) => undefined(bytes),
        _ => MetaValue::Null,
    }
}

fn integers<T: Copy + Into<i64>>(values: &[T]) -> MetaValue {
    let items = values.iter().map(|n| MetaValue::Integer((*n).into()));
    collapse(items.collect())
}

fn collapse(mut items: Vec<MetaValue>) -> MetaValue {
    match items.len() {
        0 => MetaValue::Null,
        1 => items.remove(0),
        _ => MetaValue::List(items),
    }
}

fn ascii(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches('\0')
        .trim()
        .to_string()
}

fn undefined(bytes: &[u8]) -> MetaValue {
    let trimmed = ascii(bytes);
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
        MetaValue::Text(trimmed)
    } else {
        MetaValue::Bytes(bytes.to_vec())
    }
}
