use std::path::{Path, PathBuf};
use std::process::Stdio;

use engine_logging::engine_debug;
use image::DynamicImage;
use tempfile::NamedTempFile;
use tokio::process::Command;

use crate::{ConvertError, ConvertFailureKind};

const DECODED_NAME: &str = "out.png";

/// ISO-BMFF major/compatible brands that identify a HEIF still image or sequence.
const HEIF_BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"heim", b"heis", b"hevc", b"hevx", b"hevm", b"hevs", b"mif1", b"msf1",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Heif,
    /// Anything the `image` crate can decode on its own.
    Raster(image::ImageFormat),
    Unknown,
}

/// Identify the container from magic bytes: `ftyp` box brands first, then `image`'s guesser.
pub fn sniff_format(bytes: &[u8]) -> SourceFormat {
    if is_heif(bytes) {
        return SourceFormat::Heif;
    }
    match image::guess_format(bytes) {
        Ok(format) if format.reading_enabled() => SourceFormat::Raster(format),
        _ => SourceFormat::Unknown,
    }
}

fn is_heif(bytes: &[u8]) -> bool {
    if bytes.len() < 12 || &bytes[4..8] != b"ftyp" {
        return false;
    }
    let box_len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let box_end = box_len.clamp(12, bytes.len());

    // Major brand at 8..12, minor version at 12..16, compatible brands after.
    let major = &bytes[8..12];
    let compatible = bytes.get(16..box_end).unwrap_or(&[]);
    std::iter::once(major)
        .chain(compatible.chunks_exact(4))
        .any(|brand| HEIF_BRANDS.iter().any(|known| brand == &known[..]))
}

pub(crate) fn decode_raster(
    bytes: &[u8],
    format: image::ImageFormat,
) -> Result<DynamicImage, ConvertError> {
    image::load_from_memory_with_format(bytes, format)
        .map_err(|err| ConvertError::new(ConvertFailureKind::Decode, err.to_string()))
}

/// Decode a HEIF payload by running the external decoder into a temporary directory.
///
/// `path` is used directly when the source already lives on disk; otherwise the
/// bytes are spilled to a temporary `.heic` file first.
pub(crate) async fn decode_heif(
    program: &Path,
    path: Option<&Path>,
    bytes: &[u8],
) -> Result<DynamicImage, ConvertError> {
    // Held until the decoder has exited.
    let spilled: NamedTempFile;
    let input: PathBuf = match path {
        Some(path) => path.to_path_buf(),
        None => {
            spilled = spill(bytes)?;
            spilled.path().to_path_buf()
        }
    };

    let out_dir = tempfile::Builder::new()
        .prefix("heic2jpeg-")
        .tempdir()
        .map_err(|err| ConvertError::new(ConvertFailureKind::Read, err.to_string()))?;
    let output = out_dir.path().join(DECODED_NAME);

    engine_debug!("Running {} {:?} -> {:?}", program.display(), input, output);
    let result = Command::new(program)
        .arg("--")
        .arg(&input)
        .arg(&output)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|err| spawn_error(program, err))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
        return Err(ConvertError::new(
            ConvertFailureKind::DecoderFailed {
                status: result.status.code(),
            },
            stderr,
        ));
    }

    tokio::task::spawn_blocking(move || {
        let png_path = decoded_image_path(out_dir.path()).ok_or_else(|| {
            ConvertError::new(ConvertFailureKind::Decode, "decoder wrote no image")
        })?;
        image::open(&png_path)
            .map_err(|err| ConvertError::new(ConvertFailureKind::Decode, err.to_string()))
    })
    .await
    .map_err(join_error)?
}

fn spawn_error(program: &Path, err: std::io::Error) -> ConvertError {
    if err.kind() == std::io::ErrorKind::NotFound {
        ConvertError::new(
            ConvertFailureKind::DecoderUnavailable {
                program: program.display().to_string(),
            },
            err.to_string(),
        )
    } else {
        ConvertError::new(ConvertFailureKind::Decode, err.to_string())
    }
}

/// The decoder writes `out.png` for a single image and `out-1.png`, `out-2.png`, ...
/// when the file holds several top-level images. The primary image comes first.
fn decoded_image_path(dir: &Path) -> Option<PathBuf> {
    let single = dir.join(DECODED_NAME);
    if single.is_file() {
        return Some(single);
    }

    let entries = std::fs::read_dir(dir).ok()?;
    entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name();
            let index = name
                .to_str()?
                .strip_prefix("out-")?
                .strip_suffix(".png")?
                .parse::<u32>()
                .ok()?;
            Some((index, entry.path()))
        })
        .min_by_key(|(index, _)| *index)
        .map(|(_, path)| path)
}

pub(crate) fn join_error(err: tokio::task::JoinError) -> ConvertError {
    ConvertError::new(ConvertFailureKind::Cancelled, err.to_string())
}

fn spill(bytes: &[u8]) -> Result<NamedTempFile, ConvertError> {
    use std::io::Write;

    let mut tmp = tempfile::Builder::new()
        .prefix("heic2jpeg-")
        .suffix(".heic")
        .tempfile()
        .map_err(|err| ConvertError::new(ConvertFailureKind::Read, err.to_string()))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.flush())
        .map_err(|err| ConvertError::new(ConvertFailureKind::Read, err.to_string()))?;
    Ok(tmp)
}
