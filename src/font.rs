// Tiny 5x7 bitmap font, used twice:
// 1) HUD text drawn straight into the frame buffer.
// 2) The text fallback artwork (e.g. "GM"), rasterized at a large cell size
//    into an RGBA canvas that the sampler then scans for particles.

use crate::render::put_pixel;
use crate::types::FrameBuffer;
use image::{Rgba, RgbaImage};

pub const GLYPH_W: usize = 5;
pub const GLYPH_H: usize = 7;
/// Advance between glyphs in cells (glyph width + 1 cell spacing).
pub const ADVANCE: usize = GLYPH_W + 1;

/// Return a 5x7 glyph bitmap. Lowercase maps to uppercase.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
pub fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    // Helper macro to define a glyph quickly
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),

        _ => None,
    }
}

#[inline]
fn lit(rows: &[u8; 7], col: usize, row: usize) -> bool {
    (rows[row] & (1 << (GLYPH_W - 1 - col))) != 0
}

/// Draw a single 5x7 character at (x,y).
/// Visual: a tiny glyph with a 1-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch) {
        // Shadow pass first, then the glyph itself on top
        for (dx, dy, c) in [(1, 1, 0x00000000), (0, 0, color)] {
            for ry in 0..GLYPH_H {
                for rx in 0..GLYPH_W {
                    if lit(&rows, rx, ry) {
                        put_pixel(fb, x + rx as i32 + dx, y + ry as i32 + dy, c);
                    }
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs (HUD).
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += ADVANCE as i32;
    }
}

/// Text block size in cells: (columns, rows). No trailing spacing column.
pub fn text_cells(text: &str) -> (usize, usize) {
    let n = text.chars().count();
    if n == 0 {
        return (0, 0);
    }
    (n * ADVANCE - 1, GLYPH_H)
}

/// Rasterize `text` into `canvas` with its top-left at (x, y), each glyph cell
/// being a `cell` x `cell` square. A canvas pixel is lit when its center falls
/// inside a lit cell, so fractional cell sizes work.
pub fn rasterize_text(canvas: &mut RgbaImage, x: f32, y: f32, text: &str, cell: f32, color: Rgba<u8>) {
    let (cols, rows) = text_cells(text);
    if cols == 0 || cell <= 0.0 {
        return;
    }
    let glyphs: Vec<Option<[u8; 7]>> = text.chars().map(glyph5x7).collect();

    let x0 = x.floor().max(0.0) as u32;
    let y0 = y.floor().max(0.0) as u32;
    let x1 = ((x + cols as f32 * cell).ceil() as u32).min(canvas.width());
    let y1 = ((y + rows as f32 * cell).ceil() as u32).min(canvas.height());

    for py in y0..y1 {
        let row = ((py as f32 + 0.5 - y) / cell).floor();
        if row < 0.0 || row >= rows as f32 {
            continue;
        }
        for px in x0..x1 {
            let col = ((px as f32 + 0.5 - x) / cell).floor();
            if col < 0.0 || col >= cols as f32 {
                continue;
            }
            let col = col as usize;
            let (gi, gx) = (col / ADVANCE, col % ADVANCE);
            if gx >= GLYPH_W {
                continue; // spacing column
            }
            if let Some(Some(rows_bits)) = glyphs.get(gi) {
                if lit(rows_bits, gx, row as usize) {
                    canvas.put_pixel(px, py, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_maps_to_uppercase_and_unknown_is_none() {
        assert_eq!(glyph5x7('g'), glyph5x7('G'));
        assert!(glyph5x7('~').is_none());
    }

    #[test]
    fn text_cells_has_no_trailing_spacing() {
        assert_eq!(text_cells(""), (0, 0));
        assert_eq!(text_cells("G"), (5, 7));
        assert_eq!(text_cells("GM"), (11, 7));
    }

    #[test]
    fn rasterize_fills_lit_cells_only() {
        let mut canvas = RgbaImage::new(40, 40);
        let white = Rgba([240, 240, 240, 255]);
        // "I" at cell size 4: top row is 0b01110 -> columns 1..=3 lit.
        rasterize_text(&mut canvas, 0.0, 0.0, "I", 4.0, white);
        assert_eq!(canvas.get_pixel(1, 1)[3], 0); // column 0 unlit
        assert_eq!(*canvas.get_pixel(5, 1), white); // column 1 lit
        assert_eq!(*canvas.get_pixel(10, 10), white); // stem, row 2 column 2
        assert_eq!(canvas.get_pixel(30, 30)[3], 0); // outside the glyph block
    }

    #[test]
    fn rasterize_clips_to_canvas() {
        let mut canvas = RgbaImage::new(8, 8);
        rasterize_text(&mut canvas, 4.0, 4.0, "MM", 3.0, Rgba([255, 255, 255, 255]));
        // No panic; bottom-right corner region got something from the first M.
        assert!(canvas.pixels().any(|p| p[3] == 255));
    }

    #[test]
    fn hud_text_draws_shadow_and_glyph() {
        let mut fb = FrameBuffer::new(20, 10);
        fb.pixels.fill(0x00_40_40_40);
        draw_text_5x7(&mut fb, 0, 0, "I", 0x00_FF_FF_FF);
        // Top row of "I": columns 1..=3.
        assert_eq!(fb.pixels[1], 0x00_FF_FF_FF);
        // Shadow at (4,1) (from (3,0) + 1,1), not covered by the glyph.
        assert_eq!(fb.pixels[fb.width + 4], 0x00000000);
    }
}
