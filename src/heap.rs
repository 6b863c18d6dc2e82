//! Max-heap of regions keyed by `errmax`, with running totals
//!
//! A binary heap in the classic array layout (ala _Introduction to
//! Algorithms_ by Cormen, Leiserson, and Rivest), used as the priority
//! queue of regions still waiting to be refined. Alongside the structure
//! itself the heap maintains, per output dimension, the element-wise sum
//! of value and error estimates over everything it currently contains, so
//! the driving loop reads its global estimate without a scan.

use crate::region::{EstErr, Region};
use crate::{CubatureError, Result};

/// Priority queue of [`Region`]s, worst estimated error first.
///
/// Two invariants hold between calls:
///
/// 1. Heap property: a parent's `errmax` is never below a child's. All key
///    comparisons are non-strict, so equal keys never force a swap.
/// 2. Running totals: [`totals`](RegionHeap::totals) equals the
///    element-wise sum of the estimates of every contained region.
///
/// The one documented exception is a [`push`](RegionHeap::push) that fails
/// while growing storage: the totals already include the region that was
/// never inserted, and the heap must be treated as unreliable from then
/// on.
///
/// All regions in one heap share a single output dimensionality, fixed at
/// construction.
#[derive(Debug, Clone)]
pub struct RegionHeap {
    /// Heap array; `items[0]` is the worst region
    items: Vec<Region>,
    /// Output dimensionality every pushed region must match
    fdim: usize,
    /// Per-output running sums over all contained regions
    totals: Vec<EstErr>,
}

impl RegionHeap {
    /// Create a heap with room for `nalloc` regions of output
    /// dimensionality `fdim`.
    ///
    /// The totals start at zero. `nalloc` is only a pre-sizing hint in the
    /// sense that [`push`](RegionHeap::push) grows storage on demand;
    /// passing `0` is fine.
    pub fn new(nalloc: usize, fdim: usize) -> Result<Self> {
        let mut heap = Self {
            items: Vec::new(),
            fdim,
            totals: vec![EstErr::default(); fdim],
        };
        heap.resize(nalloc)?;
        Ok(heap)
    }

    /// Request storage for exactly `nalloc` regions.
    ///
    /// `nalloc = 0` releases the buffer outright (capacity back to zero,
    /// dropping any regions still contained without touching the totals)
    /// and is safe to repeat. Otherwise the capacity is grown to `nalloc`,
    /// or shrunk toward it but never below the current count. The doubling
    /// growth policy lives in `push`, not here.
    pub fn resize(&mut self, nalloc: usize) -> Result<()> {
        if nalloc == 0 {
            self.items = Vec::new();
            return Ok(());
        }
        if nalloc > self.items.capacity() {
            let additional = nalloc - self.items.len();
            self.items
                .try_reserve_exact(additional)
                .map_err(|source| CubatureError::CapacityOverflow {
                    requested: nalloc,
                    source,
                })?;
        } else {
            self.items.shrink_to(nalloc);
        }
        Ok(())
    }

    /// Insert a region, taking ownership.
    ///
    /// The region's estimates are added to the running totals *before* any
    /// capacity handling; if growing storage then fails, the totals
    /// already count the rejected (and dropped) region and the heap is
    /// unreliable until cleared. When full, capacity grows to twice the
    /// new count, amortizing reallocation over many pushes.
    pub fn push(&mut self, region: Region) -> Result<()> {
        if region.fdim() != self.fdim {
            return Err(CubatureError::FdimMismatch {
                heap: self.fdim,
                region: region.fdim(),
            });
        }

        for (total, e) in self.totals.iter_mut().zip(region.estimates()) {
            total.val += e.val;
            total.err += e.err;
        }

        let count = self.items.len() + 1;
        if count > self.items.capacity() {
            log::trace!(
                "growing region heap capacity from {} to {}",
                self.items.capacity(),
                2 * count
            );
            self.resize(2 * count)?;
        }

        self.items.push(region);
        self.sift_up(self.items.len() - 1);
        Ok(())
    }

    /// Insert several regions in order.
    ///
    /// Stops at the first failure; regions pushed before it stay
    /// committed (totals included), regions after it are dropped. There is
    /// no rollback.
    pub fn push_many<I>(&mut self, regions: I) -> Result<()>
    where
        I: IntoIterator<Item = Region>,
    {
        for region in regions {
            self.push(region)?;
        }
        Ok(())
    }

    /// Remove and return the region with the largest `errmax`, or `None`
    /// if the heap is empty.
    ///
    /// The popped region's estimates are subtracted from the running
    /// totals. Callers that require a region must check
    /// [`is_empty`](RegionHeap::is_empty) first; an empty pop is not an
    /// error here, just `None`.
    pub fn pop(&mut self) -> Option<Region> {
        if self.items.is_empty() {
            return None;
        }

        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let popped = self.items.pop()?;
        self.sift_down(0);

        for (total, e) in self.totals.iter_mut().zip(popped.estimates()) {
            total.val -= e.val;
            total.err -= e.err;
        }
        Some(popped)
    }

    /// Borrow the region with the largest `errmax` without removing it
    pub fn peek(&self) -> Option<&Region> {
        self.items.first()
    }

    /// Drop every contained region, release the item storage, and zero
    /// the running totals, leaving the heap empty and reusable.
    pub fn clear(&mut self) {
        self.items = Vec::new();
        for total in &mut self.totals {
            *total = EstErr::default();
        }
    }

    /// Number of contained regions
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the heap contains no regions
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current item-storage capacity, in regions
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Output dimensionality shared by all contained regions
    pub fn fdim(&self) -> usize {
        self.fdim
    }

    /// Per-output sums of value and error over all contained regions.
    ///
    /// This is what the driving loop's convergence test reads.
    pub fn totals(&self) -> &[EstErr] {
        &self.totals
    }

    /// Read-only view of the contained regions, in internal heap order
    /// (worst first, then layer by layer)
    pub fn regions(&self) -> &[Region] {
        &self.items
    }

    /// Restore the heap property upward from `i` after an insertion.
    ///
    /// A node never moves past a parent with an equal key.
    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.items[i].errmax() <= self.items[parent].errmax() {
                break;
            }
            self.items.swap(i, parent);
            i = parent;
        }
    }

    /// Restore the heap property downward from `i` after a root
    /// replacement.
    ///
    /// The current node yields only to a strictly greater child, and of
    /// two equal children the left one wins.
    fn sift_down(&mut self, mut i: usize) {
        loop {
            let left = 2 * i + 1;
            if left >= self.items.len() {
                break;
            }
            let mut largest = if self.items[left].errmax() <= self.items[i].errmax() {
                i
            } else {
                left
            };
            let right = left + 1;
            if right < self.items.len() && self.items[largest].errmax() < self.items[right].errmax()
            {
                largest = right;
            }
            if largest == i {
                break;
            }
            self.items.swap(i, largest);
            i = largest;
        }
    }
}
