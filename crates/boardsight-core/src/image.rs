use crate::ImageSize;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid RGB buffer length (expected {expected} bytes, got {got})")]
    BufferSize { expected: usize, got: usize },
    #[error("image dimensions overflow (width={width}, height={height})")]
    Overflow { width: usize, height: usize },
}

#[derive(Clone, Copy, Debug)]
pub struct RgbImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, interleaved RGB, len = w*h*3
}

#[derive(Clone, Debug)]
pub struct RgbImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbImage {
    /// Wrap an interleaved RGB buffer. The length must be `width * height * 3`.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(3))
            .ok_or(ImageError::Overflow { width, height })?;
        if data.len() != expected {
            return Err(ImageError::BufferSize {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Black image of the given size.
    pub fn blank(width: usize, height: usize) -> Result<Self, ImageError> {
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(3))
            .ok_or(ImageError::Overflow { width, height })?;
        Self::new(width, height, vec![0; len])
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(
            u32::try_from(self.width).unwrap_or(u32::MAX),
            u32::try_from(self.height).unwrap_or(u32::MAX),
        )
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn view(&self) -> RgbImageView<'_> {
        RgbImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// BT.601 luma, one byte per pixel.
pub fn to_gray(src: &RgbImageView<'_>) -> Vec<u8> {
    src.data
        .chunks_exact(3)
        .map(|px| {
            let y = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
            y.round().clamp(0.0, 255.0) as u8
        })
        .collect()
}

/// Mean HSV saturation on a `0..=255` scale.
pub fn mean_saturation(src: &RgbImageView<'_>) -> f32 {
    let n = src.width * src.height;
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = src
        .data
        .chunks_exact(3)
        .map(|px| {
            let max = px[0].max(px[1]).max(px[2]) as f64;
            let min = px[0].min(px[1]).min(px[2]) as f64;
            if max > 0.0 {
                255.0 * (max - min) / max
            } else {
                0.0
            }
        })
        .sum();
    (sum / n as f64) as f32
}

#[inline]
fn get_gray(gray: &[u8], width: usize, height: usize, x: i64, y: i64) -> i32 {
    let x = x.clamp(0, width as i64 - 1) as usize;
    let y = y.clamp(0, height as i64 - 1) as usize;
    gray[y * width + x] as i32
}

/// Fraction of pixels whose Sobel gradient (L1 norm) reaches `magnitude`.
///
/// Rendered diagrams have large flat regions and score low; photos of
/// physical boards are dominated by texture and score high.
pub fn edge_density(src: &RgbImageView<'_>, magnitude: f32) -> f32 {
    let (w, h) = (src.width, src.height);
    if w == 0 || h == 0 {
        return 0.0;
    }
    let gray = to_gray(src);
    let mut edges = 0usize;
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let p = |dx: i64, dy: i64| get_gray(&gray, w, h, x + dx, y + dy);
            let gx = (p(1, -1) + 2 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2 * p(-1, 0) + p(-1, 1));
            let gy = (p(-1, 1) + 2 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2 * p(0, -1) + p(1, -1));
            if (gx.abs() + gy.abs()) as f32 >= magnitude {
                edges += 1;
            }
        }
    }
    edges as f32 / (w * h) as f32
}
