use std::path::PathBuf;
use std::time::Instant;

use engine_logging::{engine_debug, engine_info};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::Deserialize;

use crate::decode::{decode_heif, decode_raster, join_error, sniff_format, SourceFormat};
use crate::preview::{render_preview, DEFAULT_PREVIEW_EDGE};
use crate::{ConversionOutput, ConvertError, ConvertFailureKind, FileId, Source};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConvertSettings {
    /// JPEG quality in `0.0..=1.0`.
    pub quality: f32,
    /// External program invoked as `<program> <input.heic> <output.png>`.
    pub heif_decoder: PathBuf,
    pub preview_max_edge: u32,
    pub max_source_bytes: u64,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            quality: 0.8,
            heif_decoder: PathBuf::from("heif-dec"),
            preview_max_edge: DEFAULT_PREVIEW_EDGE,
            max_source_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Map a `0.0..=1.0` quality to the encoder's `1..=100` scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    if quality.is_nan() {
        return 1;
    }
    (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8
}

/// Encode as baseline JPEG, dropping any alpha channel.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ConvertError> {
    let rgb = image.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&rgb)
        .map_err(|err| ConvertError::new(ConvertFailureKind::Encode, err.to_string()))?;
    Ok(out)
}

#[async_trait::async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, file_id: FileId, source: &Source)
        -> Result<ConversionOutput, ConvertError>;
}

/// Converts HEIF (through the external decoder) and common raster formats to JPEG.
#[derive(Debug, Clone, Default)]
pub struct JpegConverter {
    settings: ConvertSettings,
}

impl JpegConverter {
    pub fn new(settings: ConvertSettings) -> Self {
        Self { settings }
    }

    async fn read_source(&self, source: &Source) -> Result<Vec<u8>, ConvertError> {
        let max_bytes = self.settings.max_source_bytes;
        match source {
            Source::Path(path) => {
                let len = tokio::fs::metadata(path)
                    .await
                    .map_err(|err| read_error(path, err))?
                    .len();
                check_size(max_bytes, len)?;
                tokio::fs::read(path).await.map_err(|err| read_error(path, err))
            }
            Source::Bytes(bytes) => {
                check_size(max_bytes, bytes.len() as u64)?;
                Ok(bytes.to_vec())
            }
        }
    }
}

fn read_error(path: &std::path::Path, err: std::io::Error) -> ConvertError {
    ConvertError::new(
        ConvertFailureKind::Read,
        format!("{}: {}", path.display(), err),
    )
}

fn check_size(max_bytes: u64, actual: u64) -> Result<(), ConvertError> {
    if actual > max_bytes {
        return Err(ConvertError::new(
            ConvertFailureKind::TooLarge { max_bytes, actual },
            "",
        ));
    }
    Ok(())
}

#[async_trait::async_trait]
impl Converter for JpegConverter {
    async fn convert(
        &self,
        file_id: FileId,
        source: &Source,
    ) -> Result<ConversionOutput, ConvertError> {
        let started = Instant::now();
        let bytes = self.read_source(source).await?;

        let format = sniff_format(&bytes);
        engine_debug!(
            "file_id={} sniffed {:?} ({} bytes)",
            file_id,
            format,
            bytes.len()
        );
        let decoded = match format {
            SourceFormat::Heif => {
                let path = match source {
                    Source::Path(path) => Some(path.as_path()),
                    Source::Bytes(_) => None,
                };
                decode_heif(&self.settings.heif_decoder, path, &bytes).await?
            }
            SourceFormat::Raster(raster) => {
                tokio::task::spawn_blocking(move || decode_raster(&bytes, raster))
                    .await
                    .map_err(join_error)??
            }
            SourceFormat::Unknown => {
                return Err(ConvertError::new(ConvertFailureKind::UnsupportedFormat, ""));
            }
        };

        let quality = jpeg_quality(self.settings.quality);
        let preview_edge = self.settings.preview_max_edge;
        let output = tokio::task::spawn_blocking(move || {
            let jpeg = encode_jpeg(&decoded, quality)?;
            let preview = render_preview(&decoded, preview_edge, quality)?;
            Ok::<_, ConvertError>(ConversionOutput {
                jpeg,
                width: decoded.width(),
                height: decoded.height(),
                preview,
            })
        })
        .await
        .map_err(join_error)??;

        engine_info!(
            "file_id={} converted {}x{} -> {} bytes in {:?}",
            file_id,
            output.width,
            output.height,
            output.jpeg.len(),
            started.elapsed()
        );
        Ok(output)
    }
}
