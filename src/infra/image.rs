//! Image codec glue: decoding, square resizing, encoding and data URIs.
//!
//! Still images are handled as a single RGBA frame and encoded as PNG.
//! Animated GIFs keep every frame with its delay and are re-encoded as
//! looping GIFs.

use std::io::Cursor;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::imageops::{self, FilterType};
use image::{AnimationDecoder, DynamicImage, Frame, ImageFormat, ImageReader, RgbaImage};

use crate::core::ItemError;

/// Largest accepted width or height, in pixels.
pub const MAX_DIMENSION: u32 = 4096;

/// Side of the chat-sized rendition, in pixels.
pub const EMOTE_SIZE: u32 = 28;

const GIF_MAGIC: &[u8; 3] = b"GIF";

/// A decoded input image.
pub enum DecodedImage {
    /// A single still frame.
    Still(DynamicImage),
    /// Every frame of a GIF, with per-frame delays.
    Animated(Vec<Frame>),
}

impl DecodedImage {
    /// Dimensions of the (first) frame.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Still(img) => (img.width(), img.height()),
            Self::Animated(frames) => frames
                .first()
                .map_or((0, 0), |f| f.buffer().dimensions()),
        }
    }

    /// Encode at original size: PNG for stills, GIF for animations.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::Encode`] if the encoder fails.
    pub fn encode(&self) -> Result<Vec<u8>, ItemError> {
        match self {
            Self::Still(img) => encode_png(img),
            Self::Animated(frames) => encode_gif(frames.clone()),
        }
    }

    /// Aspect-fit every frame into a transparent `size`×`size` square.
    #[must_use]
    pub fn to_square(&self, size: u32) -> Self {
        match self {
            Self::Still(img) => Self::Still(DynamicImage::ImageRgba8(resize_to_square(
                &img.to_rgba8(),
                size,
            ))),
            Self::Animated(frames) => Self::Animated(
                frames
                    .iter()
                    .map(|f| {
                        Frame::from_parts(resize_to_square(f.buffer(), size), 0, 0, f.delay())
                    })
                    .collect(),
            ),
        }
    }
}

/// Decode the image at `path`, validating its dimensions.
///
/// GIF files are decoded as animations; anything else the `image` crate can
/// sniff is decoded as a still.
///
/// # Errors
///
/// Returns [`ItemError::Io`] if the file cannot be read and
/// [`ItemError::Decode`] if it is not a supported image, is empty, or is
/// larger than [`MAX_DIMENSION`] on either side.
pub fn load(path: &Path) -> Result<DecodedImage, ItemError> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Decode image bytes, validating dimensions.
///
/// # Errors
///
/// See [`load`].
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, ItemError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ItemError::Decode(e.to_string()))?;
    let format = reader
        .format()
        .ok_or_else(|| ItemError::Decode("unrecognised image format".into()))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ItemError::Decode(e.to_string()))?;
    check_dimensions(width, height)?;

    if format == ImageFormat::Gif {
        let decoder =
            GifDecoder::new(Cursor::new(bytes)).map_err(|e| ItemError::Decode(e.to_string()))?;
        let frames = decoder
            .into_frames()
            .collect_frames()
            .map_err(|e| ItemError::Decode(e.to_string()))?;
        if frames.is_empty() {
            return Err(ItemError::Decode("gif has no frames".into()));
        }
        return Ok(DecodedImage::Animated(frames));
    }

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ItemError::Decode(e.to_string()))?;
    Ok(DecodedImage::Still(img))
}

fn check_dimensions(width: u32, height: u32) -> Result<(), ItemError> {
    if width == 0 || height == 0 {
        return Err(ItemError::Decode("image has a zero width or height".into()));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(ItemError::Decode(format!(
            "image is {width}x{height}, larger than the maximum of {MAX_DIMENSION}"
        )));
    }
    Ok(())
}

/// Scale `img` to fit inside a `size`×`size` square, centred on a
/// transparent canvas.
#[must_use]
pub fn resize_to_square(img: &RgbaImage, size: u32) -> RgbaImage {
    let (width, height) = img.dimensions();
    let scale = (f64::from(size) / f64::from(width)).min(f64::from(size) / f64::from(height));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (new_width, new_height) = (
        ((f64::from(width) * scale) as u32).clamp(1, size),
        ((f64::from(height) * scale) as u32).clamp(1, size),
    );

    let resized = imageops::resize(img, new_width, new_height, FilterType::Triangle);
    let mut canvas = RgbaImage::new(size, size);
    let x = (size - new_width) / 2;
    let y = (size - new_height) / 2;
    imageops::overlay(&mut canvas, &resized, i64::from(x), i64::from(y));
    canvas
}

/// Encode a still image as PNG.
///
/// # Errors
///
/// Returns [`ItemError::Encode`] if the encoder fails.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ItemError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| ItemError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Encode frames as an infinitely looping GIF.
///
/// # Errors
///
/// Returns [`ItemError::Encode`] if the encoder fails.
pub fn encode_gif(frames: Vec<Frame>) -> Result<Vec<u8>, ItemError> {
    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buf);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| ItemError::Encode(e.to_string()))?;
        encoder
            .encode_frames(frames)
            .map_err(|e| ItemError::Encode(e.to_string()))?;
    }
    Ok(buf)
}

/// Whether `bytes` start with the GIF signature.
#[must_use]
pub fn is_gif(bytes: &[u8]) -> bool {
    bytes.len() > GIF_MAGIC.len() && bytes.starts_with(GIF_MAGIC)
}

/// File extension matching the encoded bytes.
#[must_use]
pub fn extension_for(bytes: &[u8]) -> &'static str {
    if is_gif(bytes) {
        "gif"
    } else {
        "png"
    }
}

/// Base64 `data:` URI for encoded PNG or GIF bytes.
#[must_use]
pub fn data_uri(bytes: &[u8]) -> String {
    let mime = if is_gif(bytes) { "image/gif" } else { "image/png" };
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
