use crate::metadata::RawMetadata;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("画像ファイルを開けませんでした: {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
    #[error(
        "{decoder} でメタデータを解析できませんでした: {}: {message}",
        .path.display()
    )]
    Parse {
        decoder: &'static str,
        path: PathBuf,
        message: String,
    },
    #[error("{decoder} を利用できません: {message}")]
    Unavailable {
        decoder: &'static str,
        message: String,
    },
    #[error("メタデータが見つかりませんでした: {}", .path.display())]
    NoMetadata { path: PathBuf },
}

pub trait MetadataDecoder {
    fn name(&self) -> &'static str;

    fn decode(&self, path: &Path) -> Result<RawMetadata, DecodeError>;
}

#[derive(Debug)]
pub struct Decoded {
    pub decoder: &'static str,
    pub metadata: RawMetadata,
}

#[derive(Default)]
pub struct DecoderChain {
    decoders: Vec<Box<dyn MetadataDecoder>>,
}

impl DecoderChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, decoder: impl MetadataDecoder + 'static) -> Self {
        self.decoders.push(Box::new(decoder));
        self
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    pub fn decode_first(&self, path: &Path) -> Result<Decoded, DecodeError> {
        let mut last_error = None;

        for decoder in &self.decoders {
            match decoder.decode(path) {
                Ok(metadata) if !metadata.is_empty() => {
                    debug!(
                        decoder = decoder.name(),
                        path = %path.display(),
                        tags = metadata.len(),
                        "decoded metadata"
                    );
                    return Ok(Decoded {
                        decoder: decoder.name(),
                        metadata,
                    });
                }
                Ok(_) => {
                    debug!(
                        decoder = decoder.name(),
                        path = %path.display(),
                        "decoder returned no metadata"
                    );
                }
                Err(err) => {
                    warn!(decoder = decoder.name(), error = %err, "decoder failed");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DecodeError::NoMetadata {
            path: path.to_path_buf(),
        }))
    }
}

impl MetadataDecoder for DecoderChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn decode(&self, path: &Path) -> Result<RawMetadata, DecodeError> {
        self.decode_first(path).map(|decoded| decoded.metadata)
    }
}
