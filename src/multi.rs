//! Dense real-valued vector images.

use image::RgbImage;

use crate::{HogError, Result};

/// A dense image of real-valued vectors, stored as `f64`.
///
/// Element `(x, y, d)` lives at index `(x * height + y) * channels + d`:
/// column-outer, row next, channel fastest. The HOG normalization windows
/// depend on this layout, so it is part of the type's contract.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiImage {
    elems: Vec<f64>,
    width: usize,
    height: usize,
    channels: usize,
}

impl MultiImage {
    /// Allocates an image of zeros.
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        Self {
            elems: vec![0.0; width * height * channels],
            width,
            height,
            channels,
        }
    }

    /// Wraps an existing element buffer in the pinned layout.
    pub fn from_vec(
        width: usize,
        height: usize,
        channels: usize,
        elems: Vec<f64>,
    ) -> Result<Self> {
        let expected = width * height * channels;
        if elems.len() != expected {
            return Err(HogError::DimensionMismatch(format!(
                "element buffer: expected {} elements, got {}",
                expected,
                elems.len()
            )));
        }
        Ok(Self {
            elems,
            width,
            height,
            channels,
        })
    }

    /// Converts an 8-bit color image to a 3-channel real image in `[0, 1]`.
    pub fn from_rgb(img: &RgbImage) -> Self {
        let (width, height) = (img.width() as usize, img.height() as usize);
        let mut f = Self::new(width, height, 3);
        for (x, y, px) in img.enumerate_pixels() {
            for d in 0..3 {
                f.set(x as usize, y as usize, d, f64::from(px[d]) / 255.0);
            }
        }
        f
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn at(&self, x: usize, y: usize, d: usize) -> f64 {
        self.elems[self.index(x, y, d)]
    }

    /// The channel values at a point, as a contiguous slice.
    pub fn pixel(&self, x: usize, y: usize) -> &[f64] {
        let i = self.index(x, y, 0);
        &self.elems[i..i + self.channels]
    }

    pub fn set(&mut self, x: usize, y: usize, d: usize, v: f64) {
        let i = self.index(x, y, d);
        self.elems[i] = v;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.elems
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.elems
    }

    fn index(&self, x: usize, y: usize, d: usize) -> usize {
        debug_assert!(x < self.width, "x {} out of bounds ({})", x, self.width);
        debug_assert!(y < self.height, "y {} out of bounds ({})", y, self.height);
        debug_assert!(d < self.channels, "channel {} out of bounds ({})", d, self.channels);
        (x * self.height + y) * self.channels + d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn element_layout_is_column_outer() {
        let mut f = MultiImage::new(4, 3, 2);
        f.set(2, 1, 1, 7.0);
        // (x * height + y) * channels + d = (2 * 3 + 1) * 2 + 1
        assert_eq!(f.as_slice()[15], 7.0);
        assert_eq!(f.at(2, 1, 1), 7.0);
    }

    #[test]
    fn pixel_returns_channel_run_at_point() {
        let mut f = MultiImage::new(4, 3, 2);
        f.set(2, 1, 0, 3.0);
        f.set(2, 1, 1, 7.0);
        assert_eq!(f.pixel(2, 1), &[3.0, 7.0]);
        assert_eq!(f.pixel(0, 0), &[0.0, 0.0]);
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = MultiImage::from_vec(2, 2, 3, vec![0.0; 11]).unwrap_err();
        assert!(matches!(err, crate::HogError::DimensionMismatch(_)));
    }

    #[test]
    fn from_rgb_scales_to_unit_range() {
        let mut img = RgbImage::new(4, 2);
        img.put_pixel(3, 1, Rgb([255, 128, 0]));
        let f = MultiImage::from_rgb(&img);
        assert_eq!(f.channels(), 3);
        assert_eq!(f.at(3, 1, 0), 1.0);
        assert!((f.at(3, 1, 1) - 128.0 / 255.0).abs() < 1e-12);
        assert_eq!(f.at(3, 1, 2), 0.0);
        assert_eq!(f.at(0, 0, 0), 0.0);
    }
}
