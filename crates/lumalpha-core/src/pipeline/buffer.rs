//! Canonical in-memory image: 8-bit RGBA, row-major.

use image::RgbaImage;

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// An owned RGBA8 image. Dimensions are non-zero and the data length is
/// always `width * height * 4`; nothing mutates a buffer after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Buffer returned by the preview compositor.
pub type DisplayBuffer = PixelBuffer;

impl PixelBuffer {
    /// Wrap raw RGBA bytes. Returns `None` for zero dimensions or a length
    /// that does not match `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(CHANNELS)?;
        if width == 0 || height == 0 || data.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> Option<Self> {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self::from_raw(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Iterate over pixels as `[r, g, b, a]` slices.
    pub fn pixels(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(CHANNELS)
    }

    /// The pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = self.data.get(offset..offset + CHANNELS)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Produce a new buffer of the same size by mapping every pixel.
    pub fn map_pixels(&self, f: impl Fn([u8; 4]) -> [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for px in self.pixels() {
            data.extend_from_slice(&f([px[0], px[1], px[2], px[3]]));
        }
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Like [`map_pixels`](Self::map_pixels) but also passes the coordinates.
    pub fn map_pixels_xy(&self, f: impl Fn(u32, u32, [u8; 4]) -> [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        let width = self.width as usize;
        for (i, px) in self.pixels().enumerate() {
            let (x, y) = ((i % width) as u32, (i / width) as u32);
            data.extend_from_slice(&f(x, y, [px[0], px[1], px[2], px[3]]));
        }
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Consume the buffer, returning the raw bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Convert into an `image` crate buffer for encoding.
    pub fn into_rgba_image(self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data)
    }
}

impl TryFrom<RgbaImage> for PixelBuffer {
    type Error = (u32, u32);

    /// Fails with the offending dimensions when the image is empty.
    fn try_from(image: RgbaImage) -> Result<Self, Self::Error> {
        let (width, height) = image.dimensions();
        Self::from_raw(width, height, image.into_raw()).ok_or((width, height))
    }
}
