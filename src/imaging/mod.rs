//! Data-URI image handling: decoding canvas uploads, detecting blank
//! canvases and re-encoding images for the model.

use crate::{Error, Result};
use base64::{Engine as _, engine::general_purpose};
use image::{
    DynamicImage, ImageBuffer, ImageOutputFormat, Pixel, Primitive,
    io::{Limits, Reader},
};
use std::io::Cursor;
use tracing::debug;

/// Largest accepted width or height of an uploaded image.
pub const MAX_IMAGE_SIDE: u32 = 16_384;

/// Upper bound on memory the decoder may allocate for one image.
pub const MAX_DECODE_ALLOC: u64 = 256 * 1024 * 1024;

/// Bounding box of non-background content. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Bounds {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    fn include(bounds: Option<Self>, x: u32, y: u32) -> Self {
        match bounds {
            None => Self {
                left: x,
                top: y,
                right: x + 1,
                bottom: y + 1,
            },
            Some(b) => Self {
                left: b.left.min(x),
                top: b.top.min(y),
                right: b.right.max(x + 1),
                bottom: b.bottom.max(y + 1),
            },
        }
    }
}

/// A decoded upload together with the extent of what was drawn on it.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub image: DynamicImage,
    pub bounds: Option<Bounds>,
}

pub fn upload_limits() -> Limits {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_IMAGE_SIDE);
    limits.max_image_height = Some(MAX_IMAGE_SIDE);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    limits
}

/// Decodes a `data:<mime>;base64,<payload>` string into an image.
///
/// Everything up to the first `,` is treated as metadata and ignored; the
/// image format is sniffed from the decoded bytes.
pub fn decode_data_uri(data_uri: &str) -> Result<DynamicImage> {
    decode_data_uri_with_limits(data_uri, upload_limits())
}

pub fn decode_data_uri_with_limits(data_uri: &str, limits: Limits) -> Result<DynamicImage> {
    let (_, payload) = data_uri
        .split_once(',')
        .ok_or_else(|| Error::invalid_data_uri("missing ',' between metadata and payload"))?;

    let bytes = decode_base64(payload)?;
    debug!("Decoded {} bytes of image data", bytes.len());

    let mut reader = Reader::new(Cursor::new(bytes)).with_guessed_format()?;
    reader.limits(limits);
    let image = reader.decode()?;
    debug!(
        "Loaded {}x{} image ({:?})",
        image.width(),
        image.height(),
        image.color()
    );

    Ok(image)
}

// Line-wrapped (MIME style) payloads are accepted.
fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    let payload = payload.trim();
    if payload.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        return Ok(general_purpose::STANDARD.decode(compact)?);
    }
    Ok(general_purpose::STANDARD.decode(payload)?)
}

/// Finds the bounding box of non-background pixels.
///
/// For images with an alpha channel only alpha is considered, so a fully
/// transparent canvas is blank whatever its colour values. Without alpha a
/// pixel is background when every channel is zero.
pub fn content_bounds(image: &DynamicImage) -> Option<Bounds> {
    let has_alpha = image.color().has_alpha();

    match image {
        DynamicImage::ImageLuma8(buffer) => scan_bounds(buffer, has_alpha),
        DynamicImage::ImageLumaA8(buffer) => scan_bounds(buffer, has_alpha),
        DynamicImage::ImageRgb8(buffer) => scan_bounds(buffer, has_alpha),
        DynamicImage::ImageRgba8(buffer) => scan_bounds(buffer, has_alpha),
        DynamicImage::ImageLuma16(buffer) => scan_bounds(buffer, has_alpha),
        DynamicImage::ImageLumaA16(buffer) => scan_bounds(buffer, has_alpha),
        DynamicImage::ImageRgb16(buffer) => scan_bounds(buffer, has_alpha),
        DynamicImage::ImageRgba16(buffer) => scan_bounds(buffer, has_alpha),
        DynamicImage::ImageRgb32F(buffer) => scan_bounds(buffer, has_alpha),
        DynamicImage::ImageRgba32F(buffer) => scan_bounds(buffer, has_alpha),
        other if has_alpha => scan_bounds(&other.to_rgba16(), true),
        other => scan_bounds(&other.to_rgb16(), false),
    }
}

fn scan_bounds<P: Pixel>(
    buffer: &ImageBuffer<P, Vec<P::Subpixel>>,
    has_alpha: bool,
) -> Option<Bounds> {
    let background = <P::Subpixel as Primitive>::DEFAULT_MIN_VALUE;

    let mut bounds = None;
    for (x, y, pixel) in buffer.enumerate_pixels() {
        let channels = pixel.channels();
        let foreground = if has_alpha {
            channels.last().is_some_and(|a| *a != background)
        } else {
            channels.iter().any(|c| *c != background)
        };
        if foreground {
            bounds = Some(Bounds::include(bounds, x, y));
        }
    }

    bounds
}

/// Decodes an upload and measures its content on the blocking pool.
pub async fn load_canvas(data_uri: String) -> Result<Canvas> {
    run_blocking(move || {
        let image = decode_data_uri(&data_uri)?;
        let bounds = content_bounds(&image);
        Ok(Canvas { image, bounds })
    })
    .await
}

/// Decodes an upload on the blocking pool.
pub async fn load_image(data_uri: String) -> Result<DynamicImage> {
    run_blocking(move || decode_data_uri(&data_uri)).await
}

/// Runs CPU-bound image work off the async workers.
pub(crate) async fn run_blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| Error::internal(format!("Image task failed: {e}")))?
}

/// Re-encodes an image as a PNG data URI.
pub fn to_data_uri(image: &DynamicImage) -> Result<String> {
    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageOutputFormat::Png)?;

    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png.into_inner())
    ))
}
