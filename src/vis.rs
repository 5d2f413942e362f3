//! Rendering HOG feature maps as oriented-line glyph images.

use std::f64::consts::PI;

use image::{GrayImage, Luma};

use crate::multi::MultiImage;
use crate::shape::{CHANNELS, ORIENTATIONS, TEXTURE_OFFSET};
use crate::{HogError, Result};

/// Which part of the feature weights to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weights {
    /// Both signs on a mid-gray background; positive renders brighter than
    /// the background, negative darker. For signed maps such as trained
    /// detector weights.
    Signed,
    /// Positive components only.
    Positive,
    /// Magnitude of the negative components.
    Negative,
    /// Absolute value of all components.
    Absolute,
}

/// Renders a feature map as a grid of orientation glyphs.
///
/// Each cell becomes a `cell_px` x `cell_px` tile containing one line per
/// orientation axis, brighter where that orientation carries more energy.
/// Accepts 31-channel maps from [`compute_hog`](crate::compute_hog) as well
/// as 27-channel maps with the texture channels stripped.
pub fn visualize(feat: &MultiImage, weights: Weights, cell_px: usize) -> Result<GrayImage> {
    if feat.channels() != CHANNELS && feat.channels() != TEXTURE_OFFSET {
        return Err(HogError::InvalidArgument(format!(
            "feature map must have {} or {} channels, got {}",
            CHANNELS,
            TEXTURE_OFFSET,
            feat.channels()
        )));
    }
    if cell_px == 0 {
        return Err(HogError::InvalidArgument(
            "cell pixel size must be positive".into(),
        ));
    }

    let glyphs = rescale(compress(feat, weights), weights);

    let bg = if weights == Weights::Signed { 128 } else { 0 };
    let mut img = GrayImage::from_pixel(
        (feat.width() * cell_px) as u32,
        (feat.height() * cell_px) as u32,
        Luma([bg]),
    );
    for x in 0..glyphs.width() {
        for y in 0..glyphs.height() {
            draw_cell(&glyphs, x, y, cell_px, &mut img);
        }
    }
    Ok(img)
}

/// Flattens the 27 orientation channels down to 9 axes by summing each
/// axis' contrast-sensitive pair and insensitive channel.
fn compress(src: &MultiImage, weights: Weights) -> MultiImage {
    let mut dst = MultiImage::new(src.width(), src.height(), ORIENTATIONS);
    for d in 0..TEXTURE_OFFSET {
        for x in 0..src.width() {
            for y in 0..src.height() {
                let v = match weights {
                    Weights::Signed => src.at(x, y, d),
                    Weights::Positive => src.at(x, y, d).max(0.0),
                    Weights::Negative => src.at(x, y, d).min(0.0),
                    Weights::Absolute => src.at(x, y, d).abs(),
                };
                let axis = d % ORIENTATIONS;
                dst.set(x, y, axis, dst.at(x, y, axis) + v);
            }
        }
    }
    dst
}

/// Rescales glyph intensities into `[0, 1]` against the strongest response.
///
/// Signed weights map to `(1 + x/max)/2` so zero sits at mid-gray; the
/// other sets map `x/max` with negatives (already selected away) at 0.
fn rescale(mut glyphs: MultiImage, weights: Weights) -> MultiImage {
    if weights == Weights::Signed {
        let max = glyphs.as_slice().iter().fold(0.0, |m, &v| v.abs().max(m));
        for v in glyphs.as_mut_slice() {
            *v = if max > 0.0 { (1.0 + *v / max) / 2.0 } else { 0.5 };
        }
        return glyphs;
    }
    if weights == Weights::Negative {
        for v in glyphs.as_mut_slice() {
            *v = -*v;
        }
    }
    let max = glyphs.as_slice().iter().cloned().fold(0.0, f64::max);
    for v in glyphs.as_mut_slice() {
        *v = if max > 0.0 { (*v / max).max(0.0) } else { 0.0 };
    }
    glyphs
}

fn draw_cell(glyphs: &MultiImage, cx: usize, cy: usize, cell_px: usize, img: &mut GrayImage) {
    let u = (cx as f64 + 0.5) * cell_px as f64;
    let v = (cy as f64 + 0.5) * cell_px as f64;
    let r = cell_px as f64 / 2.0;

    for k in 0..ORIENTATIONS {
        let strength = glyphs.at(cx, cy, k).clamp(0.0, 1.0);
        let shade = (strength * 254.0 + 1.0) as u8;
        // Lines are drawn perpendicular to the gradient axis, as edges
        // appear in the image.
        let theta = (0.5 + k as f64 / ORIENTATIONS as f64) * PI;
        draw_oriented_line(img, u, v, theta, r, shade);
    }
}

/// Strokes a line of half-length `r` through `(x, y)` at angle `theta` by
/// dense sampling along the segment.
fn draw_oriented_line(img: &mut GrayImage, x: f64, y: f64, theta: f64, r: f64, shade: u8) {
    let (s, c) = theta.sin_cos();
    let steps = (4.0 * r).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f64 / steps as f64 * 2.0 - 1.0;
        let px = (x + t * r * c).round();
        let py = (y + t * r * s).round();
        if px >= 0.0 && py >= 0.0 && (px as u32) < img.width() && (py as u32) < img.height() {
            img.put_pixel(px as u32, py as u32, Luma([shade]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::INSENSITIVE_OFFSET;

    #[test]
    fn rejects_non_descriptor_channel_counts() {
        let feat = MultiImage::new(4, 4, 9);
        assert!(matches!(
            visualize(&feat, Weights::Positive, 8),
            Err(HogError::InvalidArgument(_))
        ));
    }

    #[test]
    fn zero_features_render_near_black() {
        let feat = MultiImage::new(4, 3, CHANNELS);
        let img = visualize(&feat, Weights::Positive, 8).unwrap();
        assert_eq!(img.width(), 32);
        assert_eq!(img.height(), 24);
        // Glyph strokes bottom out at intensity 1; background stays 0.
        assert!(img.pixels().all(|p| p[0] <= 1));
    }

    #[test]
    fn signed_weights_render_on_mid_gray() {
        // Zero weights sit exactly at the background level, so the whole
        // image is uniform mid-gray.
        let feat = MultiImage::new(2, 2, CHANNELS);
        let img = visualize(&feat, Weights::Signed, 8).unwrap();
        assert!(img.pixels().all(|p| p[0] == 128));

        // A positive weight strokes brighter than the background, and its
        // sign-flipped counterpart strokes darker.
        let mut pos = MultiImage::new(1, 1, CHANNELS);
        pos.set(0, 0, 3, 1.0);
        let bright = visualize(&pos, Weights::Signed, 8).unwrap();
        assert!(bright.pixels().any(|p| p[0] > 128));
        assert!(bright.pixels().all(|p| p[0] >= 128));

        let mut neg = MultiImage::new(1, 1, CHANNELS);
        neg.set(0, 0, 3, -1.0);
        let dark = visualize(&neg, Weights::Signed, 8).unwrap();
        assert!(dark.pixels().any(|p| p[0] < 128));
    }

    #[test]
    fn compress_folds_pairs_onto_axes() {
        let mut feat = MultiImage::new(1, 1, CHANNELS);
        feat.set(0, 0, 2, 0.1); // sensitive, axis 2
        feat.set(0, 0, 2 + ORIENTATIONS, 0.3); // opposite direction, axis 2
        feat.set(0, 0, INSENSITIVE_OFFSET + 2, 0.2); // insensitive, axis 2
        let glyphs = compress(&feat, Weights::Positive);
        assert!((glyphs.at(0, 0, 2) - 0.6).abs() < 1e-12);
        for k in (0..ORIENTATIONS).filter(|&k| k != 2) {
            assert_eq!(glyphs.at(0, 0, k), 0.0);
        }
    }
}
