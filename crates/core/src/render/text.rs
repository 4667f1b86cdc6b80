//! 8×8 bitmap text.

use flameview_protocol::Color;
use font8x8::legacy::BASIC_LEGACY;
use image::RgbaImage;

use super::{PixelRect, blend};

pub const GLYPH_SIZE: u32 = 8;

fn glyph(ch: char) -> [u8; 8] {
    BASIC_LEGACY
        .get(ch as usize)
        .copied()
        .unwrap_or(BASIC_LEGACY[b'?' as usize])
}

/// Pixel size of `text` drawn at `scale`.
pub fn measure(text: &str, scale: u32) -> (u32, u32) {
    let cell = GLYPH_SIZE * scale.max(1);
    (text.chars().count() as u32 * cell, cell)
}

/// Draw `text` with its top-left corner at `(x, y)`, touching only pixels
/// inside `clip`.
pub fn draw_text(
    image: &mut RgbaImage,
    (x, y): (i64, i64),
    text: &str,
    scale: u32,
    color: Color,
    clip: PixelRect,
) {
    let scale = i64::from(scale.max(1));
    let advance = i64::from(GLYPH_SIZE) * scale;
    for (i, ch) in text.chars().enumerate() {
        let gx = x + i as i64 * advance;
        if gx >= i64::from(clip.right()) {
            break;
        }
        if gx + advance <= i64::from(clip.x) {
            continue;
        }
        for (row, bits) in glyph(ch).into_iter().enumerate() {
            for col in 0..8 {
                // Bit 0 is the leftmost pixel.
                if bits >> col & 1 == 0 {
                    continue;
                }
                let px = gx + col * scale;
                let py = y + row as i64 * scale;
                if let Some(dot) = PixelRect::from_bounds(px, py, px + scale, py + scale)
                    .and_then(|r| r.intersect(&clip))
                {
                    for yy in dot.y..dot.bottom() {
                        for xx in dot.x..dot.right() {
                            blend(image.get_pixel_mut(xx, yy), color);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn measures_in_glyph_cells() {
        assert_eq!(measure("abc", 1), (24, 8));
        assert_eq!(measure("ab", 2), (32, 16));
        assert_eq!(measure("", 3), (0, 24));
    }

    #[test]
    fn non_ascii_falls_back_to_question_mark() {
        assert_eq!(glyph('é'), glyph('?'));
        assert_ne!(glyph('A'), glyph('?'));
    }

    #[test]
    fn draws_only_inside_clip() {
        let bg = Rgba([0, 0, 0, 255]);
        let mut img = RgbaImage::from_pixel(16, 8, bg);
        let clip = PixelRect::new(0, 0, 8, 8);
        draw_text(&mut img, (0, 0), "HH", 1, Color::WHITE, clip);
        let lit_left = (0..8).any(|y| (0..8).any(|x| img.get_pixel(x, y).0 == [255; 4]));
        let lit_right = (0..8).any(|y| (8..16).any(|x| img.get_pixel(x, y).0 == [255; 4]));
        assert!(lit_left);
        assert!(!lit_right);
    }
}
