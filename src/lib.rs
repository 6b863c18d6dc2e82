//! Region management for adaptive multidimensional cubature
//!
//! This crate implements the bookkeeping core of an adaptive cubature
//! engine: hyper-rectangular integration regions carrying per-output
//! value/error estimates, and a max-priority queue of those regions keyed
//! by estimated error, with running totals over everything still enqueued.
//!
//! The quadrature rule that evaluates an integrand over a region, and the
//! policy that decides when the totals are good enough, both live in the
//! caller. A refinement step looks like:
//!
//! ```
//! use math_cubature::{Hypercube, Region, RegionHeap};
//!
//! let cube = Hypercube::from_range(&[0.0, 0.0], &[1.0, 1.0]).unwrap();
//! let mut heap = RegionHeap::new(16, 1).unwrap();
//!
//! // Evaluate the whole domain once, then refine the worst region.
//! let mut whole = Region::new(&cube, 1);
//! whole.estimates_mut()[0].val = 1.0;
//! whole.estimates_mut()[0].err = 0.5;
//! whole.recompute_errmax();
//! heap.push(whole).unwrap();
//!
//! let worst = heap.pop().expect("heap is non-empty");
//! let (mut lo, mut hi) = worst.split();
//! for half in [&mut lo, &mut hi] {
//!     half.estimates_mut()[0].val = 0.5; // quadrature rule goes here
//!     half.estimates_mut()[0].err = 0.2;
//!     half.recompute_errmax();
//! }
//! heap.push_many([lo, hi]).unwrap();
//!
//! assert_eq!(heap.len(), 2);
//! assert!(heap.totals()[0].err < 0.5);
//! ```
//!
//! # Features
//!
//! - **Hypercube**: center/half-width representation with cached volume
//! - **Region**: estimates per output dimension, a split axis, and an
//!   `errmax` priority key with an `+INFINITY` "not yet evaluated" sentinel
//! - **RegionHeap**: max-heap ordered by `errmax` that keeps element-wise
//!   running totals of value and error across all contained regions
//!
//! The crate is single-threaded; callers that refine from several
//! workers must serialize access to the heap externally.

mod heap;
mod hypercube;
mod region;

pub use heap::RegionHeap;
pub use hypercube::Hypercube;
pub use region::{EstErr, Region};

use std::collections::TryReserveError;

/// Error types for region and heap operations
#[derive(Debug, thiserror::Error)]
pub enum CubatureError {
    /// A hypercube needs at least one axis.
    #[error("hypercube must have at least one axis")]
    ZeroDimension,

    /// Center and half-width slices disagree on the number of axes.
    #[error("axis count mismatch: center has {center_len} axes, half-widths have {halfwidth_len}")]
    AxisMismatch {
        /// Number of center coordinates given
        center_len: usize,
        /// Number of half-widths given
        halfwidth_len: usize,
    },

    /// Range bounds disagree on the number of axes.
    #[error("axis count mismatch: xmin has {min_len} axes, xmax has {max_len}")]
    RangeMismatch {
        /// Number of lower bounds given
        min_len: usize,
        /// Number of upper bounds given
        max_len: usize,
    },

    /// A half-width is negative.
    #[error("negative half-width {halfwidth} on axis {axis}")]
    NegativeHalfwidth {
        /// Offending axis
        axis: usize,
        /// The half-width that was given
        halfwidth: f64,
    },

    /// A range has its upper bound below its lower bound.
    #[error("inverted range on axis {axis}: min ({min}) > max ({max})")]
    InvertedRange {
        /// Offending axis
        axis: usize,
        /// The lower bound that was given
        min: f64,
        /// The upper bound that was given
        max: f64,
    },

    /// A region was pushed into a heap of a different output dimensionality.
    #[error("fdim mismatch: heap aggregates {heap} outputs, region carries {region}")]
    FdimMismatch {
        /// Output dimensionality of the heap
        heap: usize,
        /// Output dimensionality of the rejected region
        region: usize,
    },

    /// Region storage could not be grown to the requested capacity.
    #[error("could not reserve storage for {requested} regions")]
    CapacityOverflow {
        /// Capacity that was requested
        requested: usize,
        /// Underlying reservation failure
        #[source]
        source: TryReserveError,
    },
}

/// A specialized `Result` type for cubature bookkeeping operations.
pub type Result<T> = std::result::Result<T, CubatureError>;

impl CubatureError {
    /// Returns `true` if this error came from hypercube construction.
    pub fn is_geometry_error(&self) -> bool {
        matches!(
            self,
            CubatureError::ZeroDimension
                | CubatureError::AxisMismatch { .. }
                | CubatureError::RangeMismatch { .. }
                | CubatureError::NegativeHalfwidth { .. }
                | CubatureError::InvertedRange { .. }
        )
    }

    /// Returns `true` if this error came from heap storage management.
    pub fn is_heap_error(&self) -> bool {
        matches!(
            self,
            CubatureError::FdimMismatch { .. } | CubatureError::CapacityOverflow { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CubatureError::AxisMismatch {
            center_len: 3,
            halfwidth_len: 2,
        };
        assert_eq!(
            err.to_string(),
            "axis count mismatch: center has 3 axes, half-widths have 2"
        );
    }

    #[test]
    fn test_error_classification() {
        let geo = CubatureError::InvertedRange {
            axis: 1,
            min: 2.0,
            max: -2.0,
        };
        let heap = CubatureError::FdimMismatch { heap: 1, region: 3 };

        assert!(geo.is_geometry_error());
        assert!(!geo.is_heap_error());
        assert!(heap.is_heap_error());
        assert!(!heap.is_geometry_error());
    }
}
