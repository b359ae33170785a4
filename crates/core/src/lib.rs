mod config;
mod dates;
mod decoder;
mod exif_reader;
mod exiftool_reader;
mod flatten;
mod metadata;
mod pipeline;
mod report;
mod zone;

pub use config::{
    app_paths, load_config, load_config_from, save_config, save_config_to, AppConfig, AppPaths,
};
pub use dates::{classify, is_date_key, render, DateField, ParsedDateValue, Rendering};
pub use decoder::{DecodeError, Decoded, DecoderChain, MetadataDecoder};
pub use exif_reader::KamadakExifDecoder;
pub use exiftool_reader::ExifToolDecoder;
pub use flatten::{flatten, flatten_with, flatten_with_separator};
pub use metadata::{FlatMetadata, MetaValue, RawMetadata, Timestamp};
pub use pipeline::{build_report, default_decoder_chain, process_file_exif, ExifReport};
pub use report::{assemble_report, ReportOptions, ReportRecord, ZoneLabel};
pub use zone::{parse_zone, InvalidZoneError, LocalZone, Timezone};
