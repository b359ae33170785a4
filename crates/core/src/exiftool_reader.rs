use crate::dates::parse_date_time;
use crate::decoder::{DecodeError, MetadataDecoder};
use crate::metadata::{MetaValue, RawMetadata, Timestamp};
use exiftool::ExifTool;
use serde_json::Value;
use std::path::{Path, PathBuf};

const DECODER_NAME: &str = "exiftool";
const SOURCE_FILE_KEY: &str = "SourceFile";
const EXIF_DATE_TIME_FORMATS: &[&str] = &["%Y:%m:%d %H:%M:%S%.f"];

#[derive(Debug, Clone)]
pub struct ExifToolDecoder {
    args: Vec<String>,
    executable: Option<PathBuf>,
}

impl ExifToolDecoder {
    pub fn new(args: Vec<String>) -> Self {
        Self {
            args,
            executable: None,
        }
    }

    pub fn with_executable(mut self, executable: Option<PathBuf>) -> Self {
        self.executable = executable;
        self
    }
}

impl Default for ExifToolDecoder {
    fn default() -> Self {
        Self::new(vec!["-g1".to_string()])
    }
}

impl MetadataDecoder for ExifToolDecoder {
    fn name(&self) -> &'static str {
        DECODER_NAME
    }

    fn decode(&self, path: &Path) -> Result<RawMetadata, DecodeError> {
        let spawned = match &self.executable {
            Some(executable) => ExifTool::with_executable(executable),
            None => ExifTool::new(),
        };
        let exiftool = spawned.map_err(|err| DecodeError::Unavailable {
            decoder: DECODER_NAME,
            message: err.to_string(),
        })?;
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        let document = exiftool
            .json(path, &args)
            .map_err(|err| DecodeError::Parse {
                decoder: DECODER_NAME,
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        Ok(json_to_metadata(document))
    }
}

pub fn json_to_metadata(document: Value) -> RawMetadata {
    let object = match document {
        Value::Array(items) => items.into_iter().find_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        }),
        Value::Object(map) => Some(map),
        _ => None,
    };

    object
        .into_iter()
        .flatten()
        .filter(|(key, _)| key != SOURCE_FILE_KEY)
        .map(|(key, value)| (key, convert_json(value)))
        .collect()
}

fn convert_json(value: Value) -> MetaValue {
    match value {
        Value::Null => MetaValue::Null,
        Value::Bool(v) => MetaValue::Bool(v),
        Value::Number(n) => match n.as_i64() {
            Some(v) => MetaValue::Integer(v),
            None => MetaValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(text) => match parse_exif_date_time(&text) {
            Some(ts) => MetaValue::DateTime(ts),
            None => MetaValue::Text(text),
        },
        Value::Array(items) => MetaValue::List(items.into_iter().map(convert_json).collect()),
        Value::Object(map) => MetaValue::Map(
            map.into_iter()
                .map(|(key, value)| (key, convert_json(value)))
                .collect(),
        ),
    }
}

// YYYY:MM:DD HH:MM:SS[.fff][Z|+HH:MM]
fn parse_exif_date_time(input: &str) -> Option<Timestamp> {
    parse_date_time(input, EXIF_DATE_TIME_FORMATS)
}

#[cfg(test)]
mod tests {
    use super::{json_to_metadata, parse_exif_date_time, ExifToolDecoder};
    use crate::decoder::{DecodeError, MetadataDecoder};
    use crate::metadata::MetaValue;
    use chrono::Timelike;
    use serde_json::json;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn grouped_output_becomes_nested_maps() {
        let meta = json_to_metadata(json!([{
            "SourceFile": "IMG_0001.jpg",
            "IFD0": { "Make": "FUJIFILM", "ModifyDate": "2023:04:10 15:29:56" },
            "ExifIFD": { "ISO": 400, "FNumber": 2.8 },
            "GPS": { "GPSDateStamp": "2023:04:10", "GPSVersionID": "2.3.0.0" }
        }]));

        assert!(!meta.contains_key("SourceFile"));
        let Some(MetaValue::Map(ifd0)) = meta.get("IFD0") else {
            panic!("IFD0 should be a nested map");
        };
        assert_eq!(ifd0.get("Make"), Some(&MetaValue::from("FUJIFILM")));
        let modify_date = ifd0.get("ModifyDate");
        assert!(matches!(modify_date, Some(MetaValue::DateTime(_))));

        let Some(MetaValue::Map(exif)) = meta.get("ExifIFD") else {
            panic!("ExifIFD should be a nested map");
        };
        assert_eq!(exif.get("ISO"), Some(&MetaValue::Integer(400)));
        assert_eq!(exif.get("FNumber"), Some(&MetaValue::Float(2.8)));

        let Some(MetaValue::Map(gps)) = meta.get("GPS") else {
            panic!("GPS should be a nested map");
        };
        let stamp = MetaValue::from("2023:04:10");
        assert_eq!(gps.get("GPSDateStamp"), Some(&stamp));
    }

    #[test]
    fn non_object_documents_are_empty() {
        assert!(json_to_metadata(json!([])).is_empty());
        assert!(json_to_metadata(json!("error")).is_empty());
    }

    #[test]
    fn exif_date_strings_parse_with_fraction_and_offset() {
        let ts = parse_exif_date_time("2023:04:10 15:29:56").expect("plain");
        assert_eq!(ts.to_string(), "2023-04-10T15:29:56");

        let ts = parse_exif_date_time("2023:04:10 15:29:56.25+09:00").expect("zoned");
        assert_eq!(ts.offset_seconds, Some(9 * 3600));
        assert_eq!(ts.local.nanosecond(), 250_000_000);

        let ts = parse_exif_date_time("2023:04:10 15:29:56Z").expect("zulu");
        assert_eq!(ts.offset_seconds, Some(0));

        assert_eq!(parse_exif_date_time("0000:00:00 00:00:00"), None);
        assert_eq!(parse_exif_date_time("2023:04:10"), None);
        assert_eq!(parse_exif_date_time("2023-04-10T15:29:56"), None);
    }

    #[test]
    fn exif_date_strings_accept_compact_offsets() {
        let ts = parse_exif_date_time("2023:04:10 15:29:56-0530").expect("compact offset");
        assert_eq!(ts.offset_seconds, Some(-(5 * 3600 + 30 * 60)));

        let ts = parse_exif_date_time("2023:04:10 15:29:56+09").expect("hour offset");
        assert_eq!(ts.offset_seconds, Some(9 * 3600));

        assert_eq!(parse_exif_date_time("2023:04:10 15:29:56+99:00"), None);
    }

    #[test]
    fn missing_executable_is_unavailable() {
        let temp = tempdir().expect("tempdir");
        let decoder = ExifToolDecoder::default()
            .with_executable(Some(temp.path().join("no-such-exiftool")));

        let err = decoder.decode(Path::new("photo.jpg")).expect_err("must fail");
        assert!(matches!(
            err,
            DecodeError::Unavailable {
                decoder: "exiftool",
                ..
            }
        ));
    }
}
