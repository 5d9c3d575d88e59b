//! Decoding helpers built on the `image` crate.

use std::path::Path;

use boardsight_core::{ImageError, RgbImage};

use crate::{BoardReadError, BoardReader, BoardReport, BoardRequest};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Convert an `image::RgbImage` into the lightweight `boardsight-core` type.
pub fn rgb_from_image(img: ::image::RgbImage) -> Result<RgbImage, ImageError> {
    let (width, height) = (img.width() as usize, img.height() as usize);
    RgbImage::new(width, height, img.into_raw())
}

/// Convert any decoded image, dropping alpha and widening grayscale.
pub fn rgb_from_dynamic(img: &::image::DynamicImage) -> Result<RgbImage, ImageError> {
    rgb_from_image(img.to_rgb8())
}

/// Open and decode an image file.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(path)))]
pub fn load_rgb(path: impl AsRef<Path>) -> Result<RgbImage, BoardReadError> {
    let img = ::image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;
    Ok(rgb_from_dynamic(&img)?)
}

/// Decode `path` and read the board. Mode and threshold come from
/// `request`; its image, if any, is replaced by the decoded file.
pub fn read_board_file(
    reader: &BoardReader,
    path: impl AsRef<Path>,
    request: BoardRequest,
) -> Result<BoardReport, BoardReadError> {
    let image = load_rgb(path)?;
    reader.read(BoardRequest {
        image: Some(std::sync::Arc::new(image)),
        ..request
    })
}
