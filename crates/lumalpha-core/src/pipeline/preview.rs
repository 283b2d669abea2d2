//! Preview rendering: turns a buffer into something a display surface can
//! show unambiguously under the selected [`DisplayMode`].

use crate::config::PreviewConfig;
use crate::types::DisplayMode;

use super::buffer::{DisplayBuffer, PixelBuffer};

/// Stateless compositor for preview panes.
#[derive(Debug, Clone)]
pub struct PreviewCompositor {
    cell: u32,
    light: u8,
    dark: u8,
}

/// The "before" and "after" panes of a preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewPair {
    /// Decoded source rendered as-is
    pub before: DisplayBuffer,
    /// Processed buffer rendered in the requested mode
    pub after: DisplayBuffer,
}

impl Default for PreviewCompositor {
    fn default() -> Self {
        Self::new(&PreviewConfig::default())
    }
}

impl PreviewCompositor {
    pub fn new(config: &PreviewConfig) -> Self {
        Self {
            cell: config.checker_size.max(1),
            light: config.light_tone,
            dark: config.dark_tone,
        }
    }

    /// Render `buffer` for display. Output has the same dimensions and is
    /// always fully opaque except in [`DisplayMode::Normal`].
    pub fn render(&self, buffer: &PixelBuffer, mode: DisplayMode) -> DisplayBuffer {
        match mode {
            DisplayMode::Normal => buffer.clone(),
            DisplayMode::AlphaOnly => buffer.map_pixels(|[_, _, _, a]| [a, a, a, 255]),
            DisplayMode::Checkerboard => buffer.map_pixels_xy(|x, y, [r, g, b, a]| {
                let bg = self.background(x, y);
                [over(r, bg, a), over(g, bg, a), over(b, bg, a), 255]
            }),
        }
    }

    /// Gray level of the checkerboard at `(x, y)`; the top-left cell is light.
    pub fn background(&self, x: u32, y: u32) -> u8 {
        if ((x / self.cell) + (y / self.cell)) % 2 == 0 {
            self.light
        } else {
            self.dark
        }
    }
}

/// Alpha-over of one channel onto an opaque background, rounded to nearest.
#[inline]
fn over(src: u8, bg: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((src as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn solid(width: u32, height: u32, px: [u8; 4]) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |_, _| px).unwrap()
    }

    #[test]
    fn test_normal_is_pass_through() {
        let buf = PixelBuffer::from_fn(3, 3, |x, y| [x as u8, y as u8, 7, 99]).unwrap();
        let out = PreviewCompositor::default().render(&buf, DisplayMode::Normal);
        assert_eq!(out, buf);
    }

    #[test]
    fn test_alpha_only_is_opaque_gray() {
        let buf = solid(2, 2, [10, 20, 30, 123]);
        let out = PreviewCompositor::default().render(&buf, DisplayMode::AlphaOnly);
        assert!(out.pixels().all(|px| px == [123, 123, 123, 255]));
    }

    #[test]
    fn test_checkerboard_pattern_and_cells() {
        let comp = PreviewCompositor::default();
        assert_eq!(comp.background(0, 0), 204);
        assert_eq!(comp.background(7, 7), 204);
        assert_eq!(comp.background(8, 0), 153);
        assert_eq!(comp.background(0, 8), 153);
        assert_eq!(comp.background(8, 8), 204);
    }

    #[test]
    fn test_checkerboard_transparent_shows_background() {
        let comp = PreviewCompositor::default();
        let out = comp.render(&solid(16, 16, [255, 0, 0, 0]), DisplayMode::Checkerboard);
        assert_eq!(out.pixel(0, 0), Some([204, 204, 204, 255]));
        assert_eq!(out.pixel(9, 0), Some([153, 153, 153, 255]));
    }

    #[test]
    fn test_checkerboard_opaque_hides_background() {
        let comp = PreviewCompositor::default();
        let out = comp.render(&solid(16, 16, [12, 34, 56, 255]), DisplayMode::Checkerboard);
        assert!(out.pixels().all(|px| px == [12, 34, 56, 255]));
    }

    #[test]
    fn test_checkerboard_half_alpha_blends() {
        let comp = PreviewCompositor::default();
        let out = comp.render(&solid(1, 1, [0, 0, 0, 128]), DisplayMode::Checkerboard);
        // 204 * 127 / 255 = 101.6
        assert_eq!(out.pixel(0, 0), Some([102, 102, 102, 255]));
    }

    #[test]
    fn test_custom_cell_size() {
        let comp = PreviewCompositor::new(&PreviewConfig {
            checker_size: 2,
            light_tone: 255,
            dark_tone: 0,
        });
        assert_eq!(comp.background(1, 0), 255);
        assert_eq!(comp.background(2, 0), 0);
    }

    proptest! {
        #[test]
        fn prop_render_is_deterministic(
            px in any::<[u8; 4]>(),
            width in 1u32..20,
            height in 1u32..20,
            mode in prop_oneof![
                Just(DisplayMode::Normal),
                Just(DisplayMode::AlphaOnly),
                Just(DisplayMode::Checkerboard),
            ],
        ) {
            let buf = PixelBuffer::from_fn(width, height, |x, y| {
                [px[0] ^ x as u8, px[1] ^ y as u8, px[2], px[3]]
            })
            .unwrap();
            let comp = PreviewCompositor::default();
            let first = comp.render(&buf, mode);
            let second = comp.render(&buf, mode);
            prop_assert_eq!(first.as_bytes(), second.as_bytes());
            prop_assert_eq!((first.width(), first.height()), (width, height));
        }

        #[test]
        fn prop_over_stays_between_inputs(src in any::<u8>(), bg in any::<u8>(), alpha in any::<u8>()) {
            let out = over(src, bg, alpha);
            prop_assert!(out >= src.min(bg) && out <= src.max(bg));
        }
    }
}
