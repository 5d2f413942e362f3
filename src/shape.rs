//! Cell grid and output shape arithmetic.

/// Number of discrete orientation axes spanning 0-180 degrees.
pub const ORIENTATIONS: usize = 9;

/// Channels per output cell: 18 contrast-sensitive + 9 contrast-insensitive
/// + 4 texture.
pub const CHANNELS: usize = 3 * ORIENTATIONS + 4;

/// First contrast-insensitive channel.
pub const INSENSITIVE_OFFSET: usize = 2 * ORIENTATIONS;

/// First texture channel.
pub const TEXTURE_OFFSET: usize = 3 * ORIENTATIONS;

/// Grid of histogram cells covering the image, each `cell_size` pixels square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGrid {
    pub rows: usize,
    pub cols: usize,
}

impl CellGrid {
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shape of the output feature map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureShape {
    pub rows: usize,
    pub cols: usize,
    pub channels: usize,
}

impl FeatureShape {
    pub fn len(&self) -> usize {
        self.rows * self.cols * self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

/// Computes the cell grid and output shape for an image of `height` x `width`
/// pixels and the given cell size.
///
/// Cell counts round the image extents to the nearest multiple of `cell_size`
/// (half away from zero). The output is two cells smaller in each dimension
/// because normalization reads a 2x2 cell neighborhood offset by one cell;
/// images smaller than three cells in either axis produce an empty (not
/// erroneous) shape.
///
/// `cell_size` must be positive; [`compute_hog`](crate::compute_hog) checks
/// this at the boundary.
pub fn feature_shape(height: usize, width: usize, cell_size: usize) -> (CellGrid, FeatureShape) {
    let grid = CellGrid {
        rows: (height as f64 / cell_size as f64).round() as usize,
        cols: (width as f64 / cell_size as f64).round() as usize,
    };
    let shape = FeatureShape {
        rows: grid.rows.saturating_sub(2),
        cols: grid.cols.saturating_sub(2),
        channels: CHANNELS,
    };
    (grid, shape)
}
