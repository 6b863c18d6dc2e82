//! Integration regions: a hypercube plus per-output estimates
//!
//! A region is the unit of adaptive refinement. The external quadrature
//! rule fills in its estimates and its `errmax` priority key; this module
//! only does the bookkeeping and the geometric bisection.

use crate::hypercube::Hypercube;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An estimated integral value and its estimated absolute error, for one
/// output dimension of a vector-valued integrand
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EstErr {
    pub val: f64,
    pub err: f64,
}

impl EstErr {
    /// Create an estimate from a value and an absolute error
    pub fn new(val: f64, err: f64) -> Self {
        Self { val, err }
    }
}

impl fmt::Display for EstErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6e} ± {:.6e}", self.val, self.err)
    }
}

/// A sub-region of the integration domain, annotated with one estimate per
/// output dimension and a scalar priority key.
///
/// `errmax` is a plain stored field, not a live computation over the
/// estimates: a freshly constructed region carries the `f64::INFINITY`
/// sentinel, which drains it from a heap before any evaluated region, and
/// the quadrature rule overwrites the key (directly or via
/// [`recompute_errmax`]) once real estimates exist.
///
/// [`recompute_errmax`]: Region::recompute_errmax
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    cube: Hypercube,
    /// Axis along which the next bisection runs
    split_dim: usize,
    /// Per-output estimates; length fixes the region's fdim
    ee: Vec<EstErr>,
    /// Priority key, conventionally `max` of the per-output errors
    errmax: f64,
}

impl Region {
    /// Create an unevaluated region covering `cube`.
    ///
    /// The hypercube is deep-copied; the caller keeps its own. The `fdim`
    /// estimates start zeroed and carry no information until the caller
    /// evaluates the integrand and writes them; `errmax` starts at
    /// `f64::INFINITY` to mark exactly that state.
    pub fn new(cube: &Hypercube, fdim: usize) -> Self {
        Self {
            cube: cube.clone(),
            split_dim: 0,
            ee: vec![EstErr::default(); fdim],
            errmax: f64::INFINITY,
        }
    }

    /// Bisect this region along its split axis.
    ///
    /// Consumes the region and returns the lower and upper halves. Each
    /// half covers exactly one side of the split: half-width and volume
    /// are halved, and the centers move down/up by the new half-width, so
    /// the two extents tile the original with no gap or overlap. The two
    /// halves share no storage.
    ///
    /// The halves' estimates are stale: the lower keeps the consumed
    /// region's values and the upper starts zeroed, but both inherit the
    /// old `errmax` and split axis. Callers must re-evaluate both halves
    /// before trusting either.
    pub fn split(mut self) -> (Region, Region) {
        let axis = self.split_dim;
        self.cube.halve_axis(axis);

        let mut upper_cube = self.cube.clone();
        let hw = self.cube.halfwidths()[axis];
        self.cube.shift_center(axis, -hw);
        upper_cube.shift_center(axis, hw);

        let upper = Region {
            cube: upper_cube,
            split_dim: self.split_dim,
            ee: vec![EstErr::default(); self.ee.len()],
            errmax: self.errmax,
        };
        (self, upper)
    }

    /// Set `errmax` to the largest per-output error estimate.
    ///
    /// Treats the estimates as absolute errors; a region with no outputs
    /// gets `0.0`.
    pub fn recompute_errmax(&mut self) {
        self.errmax = self.ee.iter().map(|e| e.err).fold(0.0_f64, f64::max);
    }

    /// The priority key the heap orders by
    pub fn errmax(&self) -> f64 {
        self.errmax
    }

    /// Overwrite the priority key.
    ///
    /// The key is never derived automatically; an unevaluated region
    /// keeps its `INFINITY` sentinel until something writes the key.
    pub fn set_errmax(&mut self, errmax: f64) {
        self.errmax = errmax;
    }

    /// Per-output estimates
    pub fn estimates(&self) -> &[EstErr] {
        &self.ee
    }

    /// Mutable per-output estimates; the quadrature rule writes through
    /// this after evaluating the integrand over [`cube`](Region::cube)
    pub fn estimates_mut(&mut self) -> &mut [EstErr] {
        &mut self.ee
    }

    /// Axis the next [`split`](Region::split) will bisect
    pub fn split_dim(&self) -> usize {
        self.split_dim
    }

    /// Choose the axis for the next bisection.
    ///
    /// # Panics
    ///
    /// Panics if `axis` is not a valid axis of the region's hypercube.
    pub fn set_split_dim(&mut self, axis: usize) {
        assert!(
            axis < self.cube.dim(),
            "split axis {} out of range for a {}-dimensional region",
            axis,
            self.cube.dim()
        );
        self.split_dim = axis;
    }

    /// Output dimensionality of the integrand this region is tracking
    pub fn fdim(&self) -> usize {
        self.ee.len()
    }

    /// The covered hypercube
    pub fn cube(&self) -> &Hypercube {
        &self.cube
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_region_is_unevaluated() {
        let h = Hypercube::from_range(&[0.0, 0.0], &[1.0, 1.0]).unwrap();
        let r = Region::new(&h, 3);

        assert_eq!(r.errmax(), f64::INFINITY);
        assert_eq!(r.split_dim(), 0);
        assert_eq!(r.fdim(), 3);
        assert!(r.estimates().iter().all(|e| e.val == 0.0 && e.err == 0.0));
        // deep copy: the caller's cube is untouched and independent
        assert_eq!(r.cube(), &h);
    }

    #[test]
    fn test_recompute_errmax() {
        let h = Hypercube::from_range(&[0.0], &[1.0]).unwrap();
        let mut r = Region::new(&h, 3);
        r.estimates_mut()[0] = EstErr::new(1.0, 0.02);
        r.estimates_mut()[1] = EstErr::new(-2.0, 0.5);
        r.estimates_mut()[2] = EstErr::new(0.3, 0.04);

        r.recompute_errmax();
        assert_eq!(r.errmax(), 0.5);
    }

    #[test]
    fn test_recompute_errmax_no_outputs() {
        let h = Hypercube::from_range(&[0.0], &[1.0]).unwrap();
        let mut r = Region::new(&h, 0);
        r.recompute_errmax();
        assert_eq!(r.errmax(), 0.0);
    }

    #[test]
    fn test_split_conserves_volume_and_tiles_extent() {
        let h = Hypercube::from_range(&[-1.0, 0.0], &[1.0, 1.0]).unwrap();
        let r = Region::new(&h, 1);
        let vol = r.cube().volume();

        let (lo, hi) = r.split();

        assert_eq!(lo.cube().halfwidths()[0], 0.5);
        assert_eq!(hi.cube().halfwidths()[0], 0.5);
        assert_eq!(lo.cube().volume(), vol / 2.0);
        assert_eq!(hi.cube().volume(), vol / 2.0);

        // the halves tile the original [-1, 1] along axis 0
        assert_eq!(lo.cube().extent(0), (-1.0, 0.0));
        assert_eq!(hi.cube().extent(0), (0.0, 1.0));
        // the untouched axis is unchanged
        assert_eq!(lo.cube().extent(1), (0.0, 1.0));
        assert_eq!(hi.cube().extent(1), (0.0, 1.0));
    }

    #[test]
    fn test_split_along_chosen_axis() {
        let h = Hypercube::from_range(&[0.0, 0.0], &[1.0, 4.0]).unwrap();
        let mut r = Region::new(&h, 1);
        r.set_split_dim(1);

        let (lo, hi) = r.split();

        assert_eq!(lo.cube().extent(1), (0.0, 2.0));
        assert_eq!(hi.cube().extent(1), (2.0, 4.0));
        assert_eq!(lo.cube().extent(0), (0.0, 1.0));
        assert_eq!(hi.cube().extent(0), (0.0, 1.0));
        assert_eq!(lo.split_dim(), 1);
        assert_eq!(hi.split_dim(), 1);
    }

    #[test]
    fn test_split_halves_carry_stale_estimates() {
        let h = Hypercube::from_range(&[0.0], &[1.0]).unwrap();
        let mut r = Region::new(&h, 2);
        r.estimates_mut()[0] = EstErr::new(3.0, 0.1);
        r.estimates_mut()[1] = EstErr::new(-1.0, 0.7);
        r.recompute_errmax();

        let (lo, hi) = r.split();

        // lower keeps the consumed region's numbers, upper starts zeroed;
        // both inherit the key, so neither looks freshly evaluated
        assert_eq!(lo.estimates()[1], EstErr::new(-1.0, 0.7));
        assert!(hi.estimates().iter().all(|e| *e == EstErr::default()));
        assert_eq!(lo.errmax(), 0.7);
        assert_eq!(hi.errmax(), 0.7);
        assert_eq!(hi.fdim(), 2);
    }

    #[test]
    #[should_panic(expected = "split axis 2 out of range")]
    fn test_set_split_dim_out_of_range() {
        let h = Hypercube::from_range(&[0.0, 0.0], &[1.0, 1.0]).unwrap();
        let mut r = Region::new(&h, 1);
        r.set_split_dim(2);
    }

    #[test]
    fn test_region_checkpoints_through_json() {
        let h = Hypercube::from_range(&[0.0, -2.0], &[1.0, 2.0]).unwrap();
        let mut r = Region::new(&h, 2);
        r.estimates_mut()[0] = EstErr::new(0.25, 1e-3);
        r.estimates_mut()[1] = EstErr::new(-4.0, 2e-2);
        r.recompute_errmax();
        r.set_split_dim(1);

        let json = serde_json::to_string(&r).unwrap();
        let restored: Region = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, r);
    }
}
