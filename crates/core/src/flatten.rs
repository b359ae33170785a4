use crate::metadata::{FlatMetadata, MetaValue, RawMetadata};
use std::collections::btree_map::Entry;
use tracing::warn;

pub const DEFAULT_KEY_SEPARATOR: &str = ".";

pub fn flatten(raw: &RawMetadata) -> FlatMetadata {
    flatten_with_separator(raw, DEFAULT_KEY_SEPARATOR)
}

pub fn flatten_with_separator(raw: &RawMetadata, separator: &str) -> FlatMetadata {
    flatten_with(raw, |parent, child| format!("{parent}{separator}{child}"))
}

pub fn flatten_with<J>(raw: &RawMetadata, join: J) -> FlatMetadata
where
    J: Fn(&str, &str) -> String,
{
    let mut out = FlatMetadata::new();
    for (key, value) in raw {
        walk(key.clone(), value, &join, &mut out);
    }
    out
}

fn walk<J>(path: String, value: &MetaValue, join: &J, out: &mut FlatMetadata)
where
    J: Fn(&str, &str) -> String,
{
    match value {
        MetaValue::Map(entries) if !entries.is_empty() => {
            for (key, child) in entries {
                walk(join(&path, key), child, join, out);
            }
        }
        MetaValue::List(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                walk(join(&path, &index.to_string()), child, join, out);
            }
        }
        _ => insert_leaf(path, value, out),
    }
}

fn insert_leaf(path: String, value: &MetaValue, out: &mut FlatMetadata) {
    match out.entry(path) {
        Entry::Vacant(slot) => {
            slot.insert(value.clone());
        }
        Entry::Occupied(slot) => {
            warn!(key = %slot.key(), "キーが重複したため最初の値を残しました");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{flatten, flatten_with, flatten_with_separator};
    use crate::metadata::{MetaValue, RawMetadata};
    use std::collections::BTreeMap;

    fn nested() -> RawMetadata {
        let mut exif = BTreeMap::new();
        let create_date = MetaValue::from("2023:04:10 15:29:56");
        exif.insert("CreateDate".to_string(), create_date);
        exif.insert("FNumber".to_string(), MetaValue::Float(2.8));

        let mut gps = BTreeMap::new();
        gps.insert(
            "GPSVersionID".to_string(),
            MetaValue::List(vec![MetaValue::Integer(2), MetaValue::Integer(3)]),
        );

        let mut raw = RawMetadata::new();
        raw.insert("exif".to_string(), MetaValue::Map(exif));
        raw.insert("gps".to_string(), MetaValue::Map(gps));
        raw.insert("Make".to_string(), MetaValue::from("FUJIFILM"));
        raw
    }

    #[test]
    fn flat_input_is_unchanged() {
        let mut raw = RawMetadata::new();
        raw.insert("Make".to_string(), MetaValue::from("SONY"));
        raw.insert("ISO".to_string(), MetaValue::Integer(200));

        let flat = flatten(&raw);
        assert_eq!(flat, raw);
    }

    #[test]
    fn nested_maps_and_lists_join_with_dots() {
        let flat = flatten(&nested());
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "Make",
                "exif.CreateDate",
                "exif.FNumber",
                "gps.GPSVersionID.0",
                "gps.GPSVersionID.1",
            ]
        );
        assert_eq!(flat["gps.GPSVersionID.1"], MetaValue::Integer(3));
        assert!(flat.values().all(|v| !v.is_container()));
    }

    #[test]
    fn custom_join_strategy_is_used_at_every_level() {
        let flat = flatten_with(&nested(), |parent, child| format!("{parent}/{child}"));
        assert!(flat.contains_key("gps/GPSVersionID/0"));

        let flat = flatten_with_separator(&nested(), "_");
        assert!(flat.contains_key("exif_CreateDate"));
    }

    #[test]
    fn empty_containers_are_kept_as_leaves() {
        let mut raw = RawMetadata::new();
        raw.insert("thumbnail".to_string(), MetaValue::Map(BTreeMap::new()));
        raw.insert("tags".to_string(), MetaValue::List(Vec::new()));

        let flat = flatten(&raw);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat["thumbnail"].to_string(), "{}");
        assert_eq!(flat["tags"].to_string(), "[]");
    }

    #[test]
    fn colliding_paths_keep_the_first_leaf() {
        let mut inner = BTreeMap::new();
        inner.insert("b".to_string(), MetaValue::Integer(2));

        let mut raw = RawMetadata::new();
        raw.insert("a".to_string(), MetaValue::Map(inner));
        raw.insert("a.b".to_string(), MetaValue::Integer(1));

        let flat = flatten(&raw);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat["a.b"], MetaValue::Integer(2));
    }
}
