use image::DynamicImage;

use crate::convert::encode_jpeg;
use crate::{ConvertError, PreviewImage};

/// Longest edge of a preview, matching one thumbnail tile.
pub const DEFAULT_PREVIEW_EDGE: u32 = 200;

/// Shrink `image` to fit in a `max_edge` square and encode it as JPEG.
///
/// Aspect ratio is kept and images already small enough are never upscaled.
pub fn render_preview(
    image: &DynamicImage,
    max_edge: u32,
    quality: u8,
) -> Result<PreviewImage, ConvertError> {
    let max_edge = max_edge.max(1);
    let thumb = if image.width() <= max_edge && image.height() <= max_edge {
        image.clone()
    } else {
        image.thumbnail(max_edge, max_edge)
    };
    let jpeg = encode_jpeg(&thumb, quality)?;
    Ok(PreviewImage {
        width: thumb.width(),
        height: thumb.height(),
        jpeg,
    })
}
