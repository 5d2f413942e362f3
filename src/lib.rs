//! Histogram of Oriented Gradients (HOG) feature descriptor.
//!
//! Implements the 31-channel HOG variant of Felzenszwalb, Girshick,
//! McAllester and Ramanan (FGMR), used as the feature map underneath
//! deformable part models and similar object detectors. The descriptor
//! summarizes local edge statistics per spatial cell: 18 contrast-sensitive
//! orientation channels, 9 contrast-insensitive channels and 4 texture
//! (total energy) channels.
//!
//! The input is a dense three-channel real image ([`MultiImage`]); the
//! output is a 31-channel [`MultiImage`] two cells smaller than the cell
//! grid in each dimension.

pub mod hog;
pub mod multi;
pub mod shape;
pub mod vis;

pub use hog::*;
pub use multi::MultiImage;
pub use shape::*;
pub use vis::*;

pub type Result<T> = std::result::Result<T, HogError>;

#[derive(Debug, thiserror::Error)]
pub enum HogError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
}
