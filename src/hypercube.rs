//! Axis-aligned hypercubes in R^dim
//!
//! A hypercube is stored as a center and a half-width per axis, packed into
//! a single buffer: indices `[0, dim)` hold the center coordinates and
//! `[dim, 2*dim)` the half-widths. The volume (product of the full widths)
//! is cached and kept in step with the buffer by every mutating operation;
//! it is never recomputed lazily.

use crate::{CubatureError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An axis-aligned hyper-rectangle with cached volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypercube {
    /// Number of axes (always >= 1)
    dim: usize,
    /// Packed center-then-half-width buffer of length `2 * dim`
    data: Vec<f64>,
    /// Cached volume, product of `2 * half-width` over all axes
    vol: f64,
}

/// Volume of a box with the given half-widths
fn volume_of(halfwidths: &[f64]) -> f64 {
    halfwidths.iter().map(|hw| 2.0 * hw).product()
}

impl Hypercube {
    /// Create a hypercube from its center and half-width per axis.
    ///
    /// Both slices must have the same non-zero length, and every
    /// half-width must be non-negative (a zero half-width is allowed and
    /// yields a degenerate box of volume zero).
    pub fn new(center: &[f64], halfwidth: &[f64]) -> Result<Self> {
        if center.len() != halfwidth.len() {
            return Err(CubatureError::AxisMismatch {
                center_len: center.len(),
                halfwidth_len: halfwidth.len(),
            });
        }
        if center.is_empty() {
            return Err(CubatureError::ZeroDimension);
        }
        if let Some((axis, &hw)) = halfwidth.iter().enumerate().find(|(_, hw)| **hw < 0.0) {
            return Err(CubatureError::NegativeHalfwidth { axis, halfwidth: hw });
        }

        let dim = center.len();
        let mut data = Vec::with_capacity(2 * dim);
        data.extend_from_slice(center);
        data.extend_from_slice(halfwidth);
        let vol = volume_of(&data[dim..]);
        Ok(Self { dim, data, vol })
    }

    /// Create a hypercube covering `[xmin[i], xmax[i]]` on each axis.
    ///
    /// The center is the midpoint and the half-width is half the span,
    /// per axis.
    pub fn from_range(xmin: &[f64], xmax: &[f64]) -> Result<Self> {
        if xmin.len() != xmax.len() {
            return Err(CubatureError::RangeMismatch {
                min_len: xmin.len(),
                max_len: xmax.len(),
            });
        }
        if xmin.is_empty() {
            return Err(CubatureError::ZeroDimension);
        }
        if let Some((axis, (&lo, &hi))) = xmin
            .iter()
            .zip(xmax.iter())
            .enumerate()
            .find(|(_, (lo, hi))| hi < lo)
        {
            return Err(CubatureError::InvertedRange {
                axis,
                min: lo,
                max: hi,
            });
        }

        let dim = xmin.len();
        let mut data = Vec::with_capacity(2 * dim);
        for i in 0..dim {
            data.push(0.5 * (xmin[i] + xmax[i]));
        }
        for i in 0..dim {
            data.push(0.5 * (xmax[i] - xmin[i]));
        }
        let vol = volume_of(&data[dim..]);
        Ok(Self { dim, data, vol })
    }

    /// Number of axes
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Cached volume
    pub fn volume(&self) -> f64 {
        self.vol
    }

    /// Recompute the volume from the half-widths.
    ///
    /// Pure; does not touch the cache. Always equal to [`volume`] for a
    /// hypercube that is only mutated through this crate.
    ///
    /// [`volume`]: Hypercube::volume
    pub fn compute_volume(&self) -> f64 {
        volume_of(self.halfwidths())
    }

    /// Center coordinates, one per axis
    pub fn center(&self) -> &[f64] {
        &self.data[..self.dim]
    }

    /// Half-widths, one per axis
    pub fn halfwidths(&self) -> &[f64] {
        &self.data[self.dim..]
    }

    /// The covered interval `(center - hw, center + hw)` along one axis
    pub fn extent(&self, axis: usize) -> (f64, f64) {
        let c = self.data[axis];
        let hw = self.data[self.dim + axis];
        (c - hw, c + hw)
    }

    /// Halve the half-width along `axis`, halving the cached volume.
    ///
    /// Scaling by 0.5 is exact, so the cache stays consistent with the
    /// buffer without a full recompute.
    pub(crate) fn halve_axis(&mut self, axis: usize) {
        self.data[self.dim + axis] *= 0.5;
        self.vol *= 0.5;
    }

    /// Move the center along `axis`; the volume does not change.
    pub(crate) fn shift_center(&mut self, axis: usize, delta: f64) {
        self.data[axis] += delta;
    }
}

impl fmt::Display for Hypercube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for i in 0..self.dim {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.6} ± {:.6}", self.data[i], self.data[self.dim + i])?;
        }
        write!(f, "]")
    }
}
