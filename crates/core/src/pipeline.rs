use crate::config::AppConfig;
use crate::decoder::{DecodeError, DecoderChain, MetadataDecoder};
use crate::exif_reader::KamadakExifDecoder;
use crate::exiftool_reader::ExifToolDecoder;
use crate::report::{assemble_report, ReportOptions, ReportRecord};
use crate::zone::{parse_zone, InvalidZoneError};
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifReport {
    pub records: Vec<ReportRecord>,
    pub decode_error: Option<DecodeError>,
}

pub fn default_decoder_chain(config: &AppConfig) -> DecoderChain {
    let chain = DecoderChain::new().with(KamadakExifDecoder);
    if config.exiftool_fallback {
        chain.with(
            ExifToolDecoder::new(config.exiftool_args.clone())
                .with_executable(config.exiftool_path.clone()),
        )
    } else {
        chain
    }
}

pub fn build_report(
    decoder: &dyn MetadataDecoder,
    path: &Path,
    options: &ReportOptions,
) -> ExifReport {
    match decoder.decode(path) {
        Ok(raw) => ExifReport {
            records: assemble_report(&raw, options),
            decode_error: None,
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "メタデータを取得できませんでした");
            ExifReport {
                records: Vec::new(),
                decode_error: Some(err),
            }
        }
    }
}

pub fn process_file_exif(
    path: &Path,
    zone: Option<&str>,
    include_all: bool,
) -> Result<ExifReport, InvalidZoneError> {
    let zone = parse_zone(zone)?;
    let options = ReportOptions {
        zone,
        include_all,
        ..ReportOptions::default()
    };
    let chain = default_decoder_chain(&AppConfig::default());
    Ok(build_report(&chain, path, &options))
}
