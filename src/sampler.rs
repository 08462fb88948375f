// Image sampler: draw the artwork (bitmap or fallback text) centered into a
// transparent canvas the size of the target, then scan it on a fixed stride
// and keep every pixel whose alpha clears the threshold.
//
// Sampling is deterministic: the same source and target always produce the
// same points in the same order. An artwork that yields no points at all is
// reported as ZeroDimensions, never as an empty generation.

use crate::config::Tuning;
use crate::error::{Error, Result};
use crate::font;
use crate::types::{Rect, Size};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Artwork never fills the whole target; this leaves a margin around it.
pub const FIT_FRACTION: f32 = 0.95;

/// Colour every particle is drawn with (0x00RRGGBB).
pub const PARTICLE_COLOR: u32 = 0x00_F0_F0_F0;
const TEXT_RGBA: Rgba<u8> = Rgba([0xF0, 0xF0, 0xF0, 0xFF]);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Bitmap,
    Text,
}

/// How a source kind is scanned and how its particles look.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleProfile {
    /// Scan step in pixels; fractional steps floor to a pixel.
    pub stride: f32,
    /// Keep pixels with alpha strictly above this.
    pub alpha_threshold: u8,
    pub particle_radius: f32,
    pub min_alpha: f32,
    pub alpha_scale: f32,
}

impl SampleProfile {
    /// Dense scan, big opaque dots: the logo reads as a solid silhouette.
    pub fn bitmap(tuning: &Tuning) -> Self {
        Self {
            stride: 1.2,
            alpha_threshold: tuning.image_alpha_threshold,
            particle_radius: 3.5,
            min_alpha: 0.9,
            alpha_scale: 1.0,
        }
    }

    /// Sparse scan, small faint dots.
    pub fn text() -> Self {
        Self { stride: 4.0, alpha_threshold: 50, particle_radius: 2.0, min_alpha: 0.0, alpha_scale: 0.6 }
    }

    /// Opacity a particle gets from its source pixel's alpha.
    pub fn visual_alpha(&self, a: u8) -> f32 {
        (a as f32 / 255.0 * self.alpha_scale).max(self.min_alpha)
    }
}

/// Target-sized RGBA canvas with the artwork drawn into `bounds`.
pub struct SampleImage {
    pub pixels: RgbaImage,
    pub bounds: Rect,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplePoint {
    pub x: f32,
    pub y: f32,
    pub alpha: u8,
}

/// Everything the particle field needs to build one generation.
#[derive(Clone, Debug)]
pub struct Sampled {
    pub kind: SourceKind,
    pub bounds: Rect,
    pub profile: SampleProfile,
    pub points: Vec<SamplePoint>,
}

fn canvas_for(target: Size) -> Result<RgbaImage> {
    if target.is_empty() {
        return Err(Error::ZeroDimensions(format!("target {}x{}", target.width, target.height)));
    }
    let (w, h) = (target.width.round() as u32, target.height.round() as u32);
    if w == 0 || h == 0 {
        return Err(Error::ZeroDimensions(format!("canvas {w}x{h}")));
    }
    Ok(RgbaImage::new(w, h))
}

/// Aspect-preserving fit of a `src_w` x `src_h` artwork, centered in `target`.
/// scale = min(W/srcW, H/srcH) * FIT_FRACTION * scale_multiplier.
pub fn fit_rect(target: Size, src_w: u32, src_h: u32, scale_multiplier: f32) -> Result<Rect> {
    if target.is_empty() || src_w == 0 || src_h == 0 {
        return Err(Error::ZeroDimensions(format!(
            "fit {src_w}x{src_h} into {}x{}",
            target.width, target.height
        )));
    }
    let scale = (target.width / src_w as f32).min(target.height / src_h as f32)
        * FIT_FRACTION
        * scale_multiplier.clamp(0.0, 1.0);
    let sw = src_w as f32 * scale;
    let sh = src_h as f32 * scale;
    Ok(Rect::new((target.width - sw) / 2.0, (target.height - sh) / 2.0, sw, sh))
}

/// Resize `src` into its fitted rectangle on a transparent target canvas.
pub fn rasterize_bitmap(target: Size, src: &RgbaImage, scale_multiplier: f32) -> Result<SampleImage> {
    let mut pixels = canvas_for(target)?;
    let bounds = fit_rect(target, src.width(), src.height(), scale_multiplier)?;

    let (dw, dh) = (bounds.width.round() as u32, bounds.height.round() as u32);
    if dw == 0 || dh == 0 {
        return Err(Error::ZeroDimensions(format!("artwork scaled to {dw}x{dh}")));
    }
    let scaled = imageops::resize(src, dw, dh, FilterType::Triangle);
    imageops::overlay(&mut pixels, &scaled, bounds.x.floor() as i64, bounds.y.floor() as i64);

    Ok(SampleImage { pixels, bounds })
}

/// Render the fallback text centered on a transparent target canvas.
/// Font size is min(W*0.5, H*0.7) * scale_multiplier; one glyph cell is a
/// tenth of that, shrunk further if the whole string would not fit.
pub fn rasterize_text(target: Size, text: &str, scale_multiplier: f32) -> Result<SampleImage> {
    let mut pixels = canvas_for(target)?;
    let (cols, rows) = font::text_cells(text);
    if cols == 0 {
        return Err(Error::ZeroDimensions("empty fallback text".to_string()));
    }

    let font_size = (target.width * 0.5).min(target.height * 0.7) * scale_multiplier;
    let cell = (font_size / 10.0)
        .min(target.width * FIT_FRACTION / cols as f32)
        .min(target.height * FIT_FRACTION / rows as f32);

    let (tw, th) = (cols as f32 * cell, rows as f32 * cell);
    // Whole-pixel origin so every lit pixel's corner lies inside the bounds.
    let bounds = Rect::new(((target.width - tw) / 2.0).floor(), ((target.height - th) / 2.0).floor(), tw, th);
    font::rasterize_text(&mut pixels, bounds.x, bounds.y, text, cell, TEXT_RGBA);

    Ok(SampleImage { pixels, bounds })
}

/// Scan `region` of `img` every `stride` pixels; keep alpha > `threshold`.
/// Returned coordinates are canvas space (region origin + offset).
pub fn sample_points(img: &RgbaImage, region: Rect, stride: f32, threshold: u8) -> Vec<SamplePoint> {
    let mut points = Vec::new();
    if stride <= 0.0 || region.area() <= 0.0 {
        return points;
    }
    let (ox, oy) = (region.x.floor() as i64, region.y.floor() as i64);

    let mut py = 0.0f32;
    while py < region.height {
        let sy = oy + py.floor() as i64;
        let mut px = 0.0f32;
        while px < region.width {
            let sx = ox + px.floor() as i64;
            if sx >= 0 && sy >= 0 && (sx as u32) < img.width() && (sy as u32) < img.height() {
                let alpha = img.get_pixel(sx as u32, sy as u32)[3];
                if alpha > threshold {
                    points.push(SamplePoint { x: region.x + px, y: region.y + py, alpha });
                }
            }
            px += stride;
        }
        py += stride;
    }
    points
}

/// Bitmap path: the artwork region only.
pub fn sample_bitmap(target: Size, src: &RgbaImage, tuning: &Tuning) -> Result<Sampled> {
    let image = rasterize_bitmap(target, src, tuning.scale_multiplier)?;
    let profile = SampleProfile::bitmap(tuning);
    let points = sample_points(&image.pixels, image.bounds, profile.stride, profile.alpha_threshold);
    non_empty(Sampled { kind: SourceKind::Bitmap, bounds: image.bounds, profile, points })
}

/// Text path: the whole canvas, from the origin.
pub fn sample_text(target: Size, text: &str, tuning: &Tuning) -> Result<Sampled> {
    let image = rasterize_text(target, text, tuning.scale_multiplier)?;
    let profile = SampleProfile::text();
    let whole = Rect::new(0.0, 0.0, image.pixels.width() as f32, image.pixels.height() as f32);
    let points = sample_points(&image.pixels, whole, profile.stride, profile.alpha_threshold);
    non_empty(Sampled { kind: SourceKind::Text, bounds: image.bounds, profile, points })
}

fn non_empty(sampled: Sampled) -> Result<Sampled> {
    if sampled.points.is_empty() {
        return Err(Error::ZeroDimensions(format!(
            "{:?} artwork produced no particles in {}x{}",
            sampled.kind, sampled.bounds.width, sampled.bounds.height
        )));
    }
    Ok(sampled)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Opaque disc on a transparent square; a stand-in for a logo with alpha.
    fn disc_logo(side: u32) -> RgbaImage {
        let c = side as f32 / 2.0;
        RgbaImage::from_fn(side, side, |x, y| {
            let (dx, dy) = (x as f32 + 0.5 - c, y as f32 + 0.5 - c);
            if dx * dx + dy * dy <= c * c * 0.8 { Rgba([200, 30, 30, 255]) } else { Rgba([0, 0, 0, 0]) }
        })
    }

    fn assert_inside(bounds: Rect, target: Size) {
        assert!(bounds.x >= 0.0 && bounds.y >= 0.0, "{bounds:?}");
        assert!(bounds.x + bounds.width <= target.width, "{bounds:?}");
        assert!(bounds.y + bounds.height <= target.height, "{bounds:?}");
    }

    #[test]
    fn fit_rect_preserves_aspect_and_centers() {
        let target = Size::new(400.0, 200.0);
        let r = fit_rect(target, 100, 50, 1.0).unwrap();
        assert!((r.width / r.height - 2.0).abs() < 1e-4);
        assert!((r.width - 400.0 * FIT_FRACTION).abs() < 1e-3);
        assert!((r.x * 2.0 + r.width - 400.0).abs() < 1e-3);
        assert!((r.y * 2.0 + r.height - 200.0).abs() < 1e-3);
    }

    #[test]
    fn bounds_stay_inside_target_for_many_shapes() {
        let targets = [Size::new(480.0, 240.0), Size::new(37.0, 911.0), Size::new(1.0, 1.0)];
        let sources = [(1, 1), (300, 20), (20, 300), (4096, 4096)];
        for &t in &targets {
            for &(w, h) in &sources {
                for mult in [0.78, 0.85, 1.0] {
                    assert_inside(fit_rect(t, w, h, mult).unwrap(), t);
                }
            }
            for text in ["GM", "A", "LONG NAME HERE"] {
                assert_inside(rasterize_text(t, text, 0.78).unwrap().bounds, t);
            }
        }
    }

    #[test]
    fn zero_sized_target_is_deferred_not_empty() {
        let logo = disc_logo(16);
        let t = Tuning::full();
        assert!(matches!(sample_bitmap(Size::new(0.0, 100.0), &logo, &t), Err(Error::ZeroDimensions(_))));
        assert!(matches!(sample_text(Size::new(100.0, 0.0), "GM", &t), Err(Error::ZeroDimensions(_))));
        assert!(matches!(sample_text(Size::new(100.0, 100.0), "", &t), Err(Error::ZeroDimensions(_))));
    }

    #[test]
    fn bitmap_sampling_is_deterministic_and_inside_bounds() {
        let logo = disc_logo(64);
        let target = Size::new(300.0, 150.0);
        let a = sample_bitmap(target, &logo, &Tuning::full()).unwrap();
        let b = sample_bitmap(target, &logo, &Tuning::full()).unwrap();
        assert!(!a.points.is_empty());
        assert_eq!(a.points, b.points);
        assert_eq!(a.kind, SourceKind::Bitmap);
        for p in &a.points {
            assert!(a.bounds.contains(p.x, p.y), "{p:?} outside {:?}", a.bounds);
            assert!(p.alpha > Tuning::full().image_alpha_threshold);
        }
    }

    #[test]
    fn lower_threshold_never_yields_fewer_points() {
        // Soft-edged logo: alpha ramps from the center outwards.
        let soft = RgbaImage::from_fn(48, 48, |x, y| {
            let d = ((x as f32 - 24.0).powi(2) + (y as f32 - 24.0).powi(2)).sqrt();
            Rgba([255, 255, 255, (255.0 - d * 10.0).clamp(0.0, 255.0) as u8])
        });
        let target = Size::new(200.0, 200.0);
        let dense = Tuning { image_alpha_threshold: 15, ..Tuning::full() };
        let sparse = Tuning { image_alpha_threshold: 200, ..Tuning::full() };
        let n_dense = sample_bitmap(target, &soft, &dense).unwrap().points.len();
        let n_sparse = sample_bitmap(target, &soft, &sparse).unwrap().points.len();
        assert!(n_dense > n_sparse, "{n_dense} vs {n_sparse}");
    }

    #[test]
    fn text_sampling_uses_stride_four_grid() {
        let s = sample_text(Size::new(480.0, 240.0), "GM", &Tuning::full()).unwrap();
        assert_eq!(s.kind, SourceKind::Text);
        assert!(!s.points.is_empty());
        for p in &s.points {
            assert_eq!(p.x % 4.0, 0.0);
            assert_eq!(p.y % 4.0, 0.0);
            assert!(s.bounds.contains(p.x, p.y));
        }
    }

    #[test]
    fn artwork_without_visible_pixels_is_deferred() {
        let t = Tuning::full();
        let target = Size::new(480.0, 240.0);
        let clear = RgbaImage::from_pixel(32, 32, Rgba([255, 255, 255, 0]));
        assert!(matches!(sample_bitmap(target, &clear, &t), Err(Error::ZeroDimensions(_))));
        assert!(matches!(sample_text(target, "~~", &t), Err(Error::ZeroDimensions(_))));
        let collapsed = Tuning { scale_multiplier: 0.0, ..t };
        assert!(matches!(sample_text(target, "GM", &collapsed), Err(Error::ZeroDimensions(_))));
    }

    #[test]
    fn visual_alpha_follows_profile() {
        let bitmap = SampleProfile::bitmap(&Tuning::full());
        assert_eq!(bitmap.visual_alpha(30), 0.9);
        assert_eq!(bitmap.visual_alpha(255), 1.0);
        let text = SampleProfile::text();
        assert!((text.visual_alpha(255) - 0.6).abs() < 1e-6);
    }
}
