//! FGMR HOG descriptor computation.
//!
//! Three strictly sequential phases over the image: gradient computation
//! with orientation binning into per-cell histograms, per-cell energy
//! aggregation, and block-normalized feature assembly. The arithmetic
//! reproduces the reference voc-release implementation, so outputs can be
//! compared against detectors trained on it.

use rayon::prelude::*;

use crate::multi::MultiImage;
use crate::shape::{
    feature_shape, CellGrid, FeatureShape, CHANNELS, INSENSITIVE_OFFSET, ORIENTATIONS,
    TEXTURE_OFFSET,
};
use crate::{HogError, Result};

// Guards division by zero in the block normalizers.
const EPS: f64 = 1e-4;

// Normalized histogram entries are clipped here to bound outlier influence.
const CLIP: f64 = 0.2;

// 1/sqrt(18), calibration for the texture (total energy) channels.
const TEXTURE_SCALE: f64 = 0.2357;

// Unit vectors at 20-degree spacing spanning 0-180 degrees, used to snap
// gradient direction to a discrete orientation.
const UU: [f64; ORIENTATIONS] = [
    1.0000, 0.9397, 0.7660, 0.5000, 0.1736, -0.1736, -0.5000, -0.7660, -0.9397,
];
const VV: [f64; ORIENTATIONS] = [
    0.0000, 0.3420, 0.6428, 0.8660, 0.9848, 0.9848, 0.8660, 0.6428, 0.3420,
];

pub struct HogParams {
    /// Side length of a square histogram cell, in pixels.
    pub cell_size: usize,
}

impl Default for HogParams {
    fn default() -> Self {
        // FGMR detector default.
        Self { cell_size: 8 }
    }
}

impl HogParams {
    pub fn new(cell_size: usize) -> Self {
        Self { cell_size }
    }

    /// Cell grid and output shape this parameter set produces for an image
    /// of `height` x `width` pixels.
    pub fn shape_for(&self, height: usize, width: usize) -> (CellGrid, FeatureShape) {
        feature_shape(height, width, self.cell_size)
    }
}

/// Computes the 31-channel HOG feature map of a three-channel real image.
///
/// Returns a [`MultiImage`] of `shape.cols` x `shape.rows` cells with 31
/// channels each: 18 contrast-sensitive orientations, 9 contrast-insensitive
/// orientations, 4 texture summaries. Images smaller than three cells in
/// either axis yield an empty feature map.
///
/// The computation is deterministic: identical inputs produce bit-identical
/// output regardless of the rayon pool configuration.
pub fn compute_hog(image: &MultiImage, params: &HogParams) -> Result<MultiImage> {
    if image.channels() != 3 {
        return Err(HogError::InvalidArgument(format!(
            "input image must have 3 channels, got {}",
            image.channels()
        )));
    }
    if params.cell_size == 0 {
        return Err(HogError::InvalidArgument(
            "cell size must be positive".into(),
        ));
    }

    let (grid, shape) = feature_shape(image.height(), image.width(), params.cell_size);
    let mut feat = MultiImage::new(shape.cols, shape.rows, CHANNELS);
    if shape.is_empty() {
        return Ok(feat);
    }

    let mut hist = vec![0.0f64; grid.len() * 2 * ORIENTATIONS];
    let mut norm = vec![0.0f64; grid.len()];

    accumulate_histograms(image, params.cell_size, grid, &mut hist);
    cell_energies(&hist, grid, &mut norm);
    assemble_features(&hist, &norm, grid, shape, &mut feat);

    Ok(feat)
}

/// Phase 1: per-pixel gradients, orientation snap and bilinear splat into
/// the orientation histograms.
///
/// Serial with a fixed x-outer/y-inner traversal so the accumulation order,
/// and therefore the floating-point result, never varies between runs.
fn accumulate_histograms(image: &MultiImage, cell_size: usize, grid: CellGrid, hist: &mut [f64]) {
    let width = image.width();
    let height = image.height();
    let cells = grid.len();

    // The visible region rounds the image to whole cells; it may exceed the
    // image, in which case the stencil position is clamped below.
    let visible_x = grid.cols * cell_size;
    let visible_y = grid.rows * cell_size;

    for x in 1..visible_x - 1 {
        for y in 1..visible_y - 1 {
            let a = x.min(width - 2);
            let b = y.min(height - 2);

            // Central differences per color channel; keep the strongest.
            let mut dx = image.at(a + 1, b, 0) - image.at(a - 1, b, 0);
            let mut dy = image.at(a, b + 1, 0) - image.at(a, b - 1, 0);
            let mut v = dx * dx + dy * dy;
            for d in 1..3 {
                let dxd = image.at(a + 1, b, d) - image.at(a - 1, b, d);
                let dyd = image.at(a, b + 1, d) - image.at(a, b - 1, d);
                let vd = dxd * dxd + dyd * dyd;
                if vd > v {
                    v = vd;
                    dx = dxd;
                    dy = dyd;
                }
            }

            let bin = snap_orientation(dx, dy);
            let weight = v.sqrt();

            // Splat into the 2x2 cell neighborhood around the pixel's
            // fractional cell coordinate; out-of-grid neighbors are dropped.
            let xp = (x as f64 + 0.5) / cell_size as f64 - 0.5;
            let yp = (y as f64 + 0.5) / cell_size as f64 - 0.5;
            let ixp = xp.floor() as isize;
            let iyp = yp.floor() as isize;
            let vx0 = xp - ixp as f64;
            let vy0 = yp - iyp as f64;
            let vx1 = 1.0 - vx0;
            let vy1 = 1.0 - vy0;

            let base = bin * cells;
            if ixp >= 0 && iyp >= 0 {
                hist[base + ixp as usize * grid.rows + iyp as usize] += vx1 * vy1 * weight;
            }
            if ixp + 1 < grid.cols as isize && iyp >= 0 {
                hist[base + (ixp + 1) as usize * grid.rows + iyp as usize] += vx0 * vy1 * weight;
            }
            if ixp >= 0 && iyp + 1 < grid.rows as isize {
                hist[base + ixp as usize * grid.rows + (iyp + 1) as usize] += vx1 * vy0 * weight;
            }
            if ixp + 1 < grid.cols as isize && iyp + 1 < grid.rows as isize {
                hist[base + (ixp + 1) as usize * grid.rows + (iyp + 1) as usize] +=
                    vx0 * vy0 * weight;
            }
        }
    }
}

/// Snaps a gradient to one of 18 signed orientation bins.
///
/// Projects onto the 9 fixed unit vectors; the largest absolute projection
/// wins, with a negative projection selecting the opposite-direction bin
/// `o + 9`. A zero gradient stays in bin 0 (its vote carries zero weight).
fn snap_orientation(dx: f64, dy: f64) -> usize {
    let mut best_dot = 0.0;
    let mut best_o = 0;
    for o in 0..ORIENTATIONS {
        let dot = UU[o] * dx + VV[o] * dy;
        if dot > best_dot {
            best_dot = dot;
            best_o = o;
        } else if -dot > best_dot {
            best_dot = -dot;
            best_o = o + ORIENTATIONS;
        }
    }
    best_o
}

/// Phase 2: per-cell gradient energy, summed over orientation axes.
///
/// Each axis contributes the squared sum of its two opposite-direction
/// bins, making the energy invariant to gradient sign.
fn cell_energies(hist: &[f64], grid: CellGrid, norm: &mut [f64]) {
    let cells = grid.len();
    for o in 0..ORIENTATIONS {
        let pos = &hist[o * cells..(o + 1) * cells];
        let neg = &hist[(o + ORIENTATIONS) * cells..(o + ORIENTATIONS + 1) * cells];
        for ((n, &p), &q) in norm.iter_mut().zip(pos).zip(neg) {
            let s = p + q;
            *n += s * s;
        }
    }
}

/// The four inverse block normalizers for output cell `(x, y)`.
///
/// Each normalizes against a different 2x2 window of cell energies; all four
/// windows share the histogram cell at `(x + 1, y + 1)`. The anchoring is
/// pinned behavior: a transposed or mirrored window produces plausible but
/// wrong features.
fn corner_norms(norm: &[f64], rows: usize, x: usize, y: usize) -> [f64; 4] {
    [
        inv_block_norm(norm, rows, x + 1, y + 1),
        inv_block_norm(norm, rows, x + 1, y),
        inv_block_norm(norm, rows, x, y + 1),
        inv_block_norm(norm, rows, x, y),
    ]
}

/// `1 / sqrt(energy)` over the 2x2 cell window whose top-left cell is
/// `(cx, cy)` in the column-outer energy buffer.
fn inv_block_norm(norm: &[f64], rows: usize, cx: usize, cy: usize) -> f64 {
    let p = cx * rows + cy;
    1.0 / (norm[p] + norm[p + 1] + norm[p + rows] + norm[p + rows + 1] + EPS).sqrt()
}

/// Phase 3: clipped, block-normalized feature assembly.
///
/// Output columns are disjoint contiguous chunks in the column-outer layout,
/// so they parallelize without affecting the result.
fn assemble_features(
    hist: &[f64],
    norm: &[f64],
    grid: CellGrid,
    shape: FeatureShape,
    feat: &mut MultiImage,
) {
    let rows = grid.rows;
    let cells = grid.len();
    let col_len = shape.rows * CHANNELS;

    feat.as_mut_slice()
        .par_chunks_mut(col_len)
        .enumerate()
        .for_each(|(x, col)| {
            for y in 0..shape.rows {
                let [n1, n2, n3, n4] = corner_norms(norm, rows, x, y);
                let cell = (x + 1) * rows + (y + 1);
                let dst = &mut col[y * CHANNELS..(y + 1) * CHANNELS];

                let mut t1 = 0.0;
                let mut t2 = 0.0;
                let mut t3 = 0.0;
                let mut t4 = 0.0;

                // Contrast-sensitive channels, accumulating the per-normalizer
                // totals reused by the texture channels.
                for o in 0..2 * ORIENTATIONS {
                    let h = hist[o * cells + cell];
                    let h1 = (h * n1).min(CLIP);
                    let h2 = (h * n2).min(CLIP);
                    let h3 = (h * n3).min(CLIP);
                    let h4 = (h * n4).min(CLIP);
                    dst[o] = 0.5 * (h1 + h2 + h3 + h4);
                    t1 += h1;
                    t2 += h2;
                    t3 += h3;
                    t4 += h4;
                }

                // Contrast-insensitive channels over opposite-direction pairs.
                for o in 0..ORIENTATIONS {
                    let sum = hist[o * cells + cell] + hist[(o + ORIENTATIONS) * cells + cell];
                    let h1 = (sum * n1).min(CLIP);
                    let h2 = (sum * n2).min(CLIP);
                    let h3 = (sum * n3).min(CLIP);
                    let h4 = (sum * n4).min(CLIP);
                    dst[INSENSITIVE_OFFSET + o] = 0.5 * (h1 + h2 + h3 + h4);
                }

                dst[TEXTURE_OFFSET] = TEXTURE_SCALE * t1;
                dst[TEXTURE_OFFSET + 1] = TEXTURE_SCALE * t2;
                dst[TEXTURE_OFFSET + 2] = TEXTURE_SCALE * t3;
                dst[TEXTURE_OFFSET + 3] = TEXTURE_SCALE * t4;
            }
        });
}
