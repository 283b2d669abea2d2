//! Luminance to alpha transform.
//!
//! Every output pixel keeps its colour channels and gets a new alpha derived
//! from its weighted luminance. The mapping is per-pixel and pure, so a
//! buffer can be split at any row boundary without changing the result.

use serde::{Deserialize, Serialize};

use super::buffer::PixelBuffer;

/// ITU-R BT.709 coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.2126;

/// ITU-R BT.709 coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.7152;

/// ITU-R BT.709 coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.0722;

/// Per-channel weights of the luminance sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LumaWeights {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for LumaWeights {
    fn default() -> Self {
        Self {
            r: LUMINANCE_R,
            g: LUMINANCE_G,
            b: LUMINANCE_B,
        }
    }
}

/// Which end of the luminance range ends up opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphaPolarity {
    /// alpha = L: white is opaque, black is transparent
    #[default]
    BrightOpaque,
    /// alpha falls from 255 to 0 as L rises from the threshold to 255
    BrightTransparent,
}

/// Full parameter set of the luminance to alpha family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LumaParams {
    pub weights: LumaWeights,
    pub polarity: AlphaPolarity,
    /// Only consulted for [`AlphaPolarity::BrightTransparent`]
    pub threshold: u8,
    pub preserve_source_alpha: bool,
}

impl Default for LumaParams {
    fn default() -> Self {
        Self {
            weights: LumaWeights::default(),
            polarity: AlphaPolarity::BrightOpaque,
            threshold: 0,
            preserve_source_alpha: false,
        }
    }
}

/// Weighted luminance of an 8-bit RGB triple, rounded half up and clamped to 0..=255.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8, weights: &LumaWeights) -> u8 {
    if *weights == LumaWeights::default() {
        return bt709_luminance(r, g, b);
    }
    // f32 weights are not exact decimals; the bias keeps true .5 ties rounding up.
    let lum = f64::from(weights.r) * f64::from(r)
        + f64::from(weights.g) * f64::from(g)
        + f64::from(weights.b) * f64::from(b);
    (lum + 1e-6).round().clamp(0.0, 255.0) as u8
}

/// BT.709 luminance in fixed point (coefficients scaled by 10 000).
#[inline]
pub fn bt709_luminance(r: u8, g: u8, b: u8) -> u8 {
    let sum = 2126 * u32::from(r) + 7152 * u32::from(g) + 722 * u32::from(b);
    ((sum + 5000) / 10000).min(255) as u8
}

/// Recomputes the alpha channel of a buffer from per-pixel luminance.
#[derive(Debug, Clone)]
pub struct LuminanceAlphaTransform {
    params: LumaParams,
    bt709: bool,
}

impl Default for LuminanceAlphaTransform {
    fn default() -> Self {
        Self::new(LumaParams::default())
    }
}

impl LuminanceAlphaTransform {
    pub fn new(params: LumaParams) -> Self {
        Self {
            bt709: params.weights == LumaWeights::default(),
            params,
        }
    }

    pub fn params(&self) -> &LumaParams {
        &self.params
    }

    /// Apply the transform, returning a new buffer of the same size.
    pub fn apply(&self, buffer: &PixelBuffer) -> PixelBuffer {
        buffer.map_pixels(|px| self.map_pixel(px))
    }

    /// Map a single RGBA pixel.
    #[inline]
    pub fn map_pixel(&self, [r, g, b, a]: [u8; 4]) -> [u8; 4] {
        let lum = if self.bt709 {
            bt709_luminance(r, g, b)
        } else {
            luminance(r, g, b, &self.params.weights)
        };
        let alpha = match self.params.polarity {
            AlphaPolarity::BrightOpaque => lum,
            AlphaPolarity::BrightTransparent => inverse_alpha(lum, self.params.threshold),
        };
        let alpha = if self.params.preserve_source_alpha {
            ((alpha as u16 * a as u16) / 255) as u8
        } else {
            alpha
        };
        [r, g, b, alpha]
    }
}

/// Below `threshold` stays opaque; `threshold..=255` ramps linearly to 0.
fn inverse_alpha(lum: u8, threshold: u8) -> u8 {
    if lum < threshold {
        return 255;
    }
    let span = 255 - threshold as u16;
    if span == 0 {
        return 0;
    }
    let over = (lum - threshold) as u16;
    (255 - over * 255 / span) as u8
}
