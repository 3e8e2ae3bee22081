//! Rank-based selection over ordered values and scored resources.
//!
//! This crate provides the selection helpers that sit next to the spatial
//! index in a harvest pipeline:
//!
//! - [`Percentiles`] - sorted container with insertion, removal, and
//!   percentile-trim queries
//! - [`Deposit`] / [`DepositSelector`] - bounded best-of-N selection over
//!   harvestable resource deposits
//!
//! # Example
//!
//! ```
//! use loam_rank::Percentiles;
//!
//! let mut percentiles = Percentiles::new();
//! for value in [5, 1, 4, 2, 3] {
//!     percentiles.insert(value);
//! }
//!
//! // Drop the bottom and top 20%.
//! assert_eq!(percentiles.trimmed(20.0, 20.0), &[2, 3, 4]);
//! ```

use glam::IVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

// ============================================================================
// Percentiles
// ============================================================================

/// A sorted container supporting rank-range queries over a sliding set of
/// values.
///
/// Values can be inserted and removed at any time; [`Percentiles::trimmed`]
/// returns the values that survive cutting a percentage off each end of the
/// sorted order.
///
/// # Type Parameters
///
/// * `T` - The ordered value type.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Percentiles<T> {
    points: Vec<T>,
}

impl<T> Default for Percentiles<T> {
    fn default() -> Self {
        Self { points: Vec::new() }
    }
}

impl<T: Ord> Percentiles<T> {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Returns the number of stored values.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if no values are stored.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Inserts a value, keeping the contents sorted.
    ///
    /// Duplicates are allowed; each insertion stores one more occurrence.
    pub fn insert(&mut self, value: T) {
        let at = self.points.partition_point(|p| p < &value);
        self.points.insert(at, value);
    }

    /// Removes one occurrence of `value`.
    ///
    /// Returns `false` when the value is not present; absence is not an
    /// error.
    pub fn remove(&mut self, value: &T) -> bool {
        match self.points.binary_search(value) {
            Ok(at) => {
                self.points.remove(at);
                true
            }
            Err(_) => false,
        }
    }

    /// Returns the stored values in sorted order.
    pub fn as_slice(&self) -> &[T] {
        &self.points
    }

    /// Returns the values left after trimming `lower_pct` percent off the
    /// bottom and `upper_pct` percent off the top of the sorted order.
    ///
    /// With `n` stored values, `ceil(n * lower_pct / 100)` are cut from the
    /// bottom and `ceil(n * upper_pct / 100)` from the top. Over-trimming
    /// yields an empty slice.
    pub fn trimmed(&self, lower_pct: f64, upper_pct: f64) -> &[T] {
        let n = self.points.len();
        let cut_low = ((n as f64) * lower_pct / 100.0).ceil() as usize;
        let cut_high = ((n as f64) * upper_pct / 100.0).ceil() as usize;
        let end = n.saturating_sub(cut_high);
        if cut_low >= end {
            return &[];
        }
        &self.points[cut_low..end]
    }
}

// ============================================================================
// Deposit selection
// ============================================================================

/// A harvestable resource deposit at a position in the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Deposit {
    /// Position of the deposit.
    pub position: IVec3,
    /// Maximum volume one harvest pass can extract.
    pub capacity: u64,
    /// Value of one unit of extracted volume.
    pub richness: u64,
    /// Remaining volume.
    pub volume: u64,
}

impl Deposit {
    /// Value one harvest pass would produce at the current volume.
    pub fn yield_estimate(&self) -> u64 {
        self.volume.min(self.capacity) * self.richness
    }
}

/// Max-heap ordering for deposits, by estimated yield only.
#[derive(Debug, Clone)]
struct ByYield(Deposit);

impl PartialEq for ByYield {
    fn eq(&self, other: &Self) -> bool {
        self.0.yield_estimate() == other.0.yield_estimate()
    }
}

impl Eq for ByYield {}

impl PartialOrd for ByYield {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByYield {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.yield_estimate().cmp(&other.0.yield_estimate())
    }
}

/// A bounded selector that repeatedly harvests the highest-yield deposit.
///
/// Holds at most `limit` deposits. Each [`DepositSelector::harvest_best`]
/// extracts the deposit with the highest estimated yield, drains up to its
/// capacity, and puts it back when volume remains.
///
/// # Example
///
/// ```
/// use loam_rank::{Deposit, DepositSelector};
/// use glam::IVec3;
///
/// let mut selector = DepositSelector::new(8);
/// selector.add(Deposit {
///     position: IVec3::new(2, 0, 1),
///     capacity: 4,
///     richness: 3,
///     volume: 10,
/// });
///
/// // First pass drains 4 units at richness 3.
/// assert_eq!(selector.harvest_best(), Some(12));
/// ```
#[derive(Debug, Clone)]
pub struct DepositSelector {
    limit: usize,
    deposits: BinaryHeap<ByYield>,
}

impl DepositSelector {
    /// Creates a selector holding at most `limit` deposits.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            deposits: BinaryHeap::with_capacity(limit),
        }
    }

    /// Returns the number of deposits currently held.
    pub fn len(&self) -> usize {
        self.deposits.len()
    }

    /// Returns `true` if no deposits are held.
    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty()
    }

    /// Returns the maximum number of deposits this selector holds.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Adds a deposit.
    ///
    /// Returns `false` when the selector is already full; the deposit is
    /// dropped in that case.
    pub fn add(&mut self, deposit: Deposit) -> bool {
        if self.deposits.len() >= self.limit {
            return false;
        }
        self.deposits.push(ByYield(deposit));
        true
    }

    /// Replaces the held deposits.
    ///
    /// Deposits past the limit are dropped.
    pub fn set_all(&mut self, deposits: Vec<Deposit>) {
        self.deposits.clear();
        for deposit in deposits {
            if !self.add(deposit) {
                break;
            }
        }
    }

    /// Returns the deposit the next harvest would pick.
    pub fn peek_best(&self) -> Option<&Deposit> {
        self.deposits.peek().map(|best| &best.0)
    }

    /// Harvests the highest-yield deposit and returns the value produced.
    ///
    /// Drains up to the deposit's capacity; a deposit with volume left over
    /// is reinserted and competes again on its remaining yield. Returns
    /// `None` when no deposits are held.
    pub fn harvest_best(&mut self) -> Option<u64> {
        let ByYield(mut best) = self.deposits.pop()?;
        let drained = best.volume.min(best.capacity);
        best.volume -= drained;
        if best.volume > 0 {
            self.deposits.push(ByYield(best));
        }
        Some(drained * best.richness)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentiles_trimmed() {
        let mut percentiles = Percentiles::new();
        // 0..50 in a scrambled order.
        for i in 0..50 {
            percentiles.insert((i * 7) % 50);
        }

        // Cut 15% below and 66% above: ranks 8..17 survive.
        assert_eq!(
            percentiles.trimmed(15.0, 66.0),
            &[8, 9, 10, 11, 12, 13, 14, 15, 16]
        );
    }

    #[test]
    fn test_percentiles_insert_keeps_sorted() {
        let mut percentiles = Percentiles::new();
        for value in [9, 1, 8, 1, 5] {
            percentiles.insert(value);
        }
        assert_eq!(percentiles.as_slice(), &[1, 1, 5, 8, 9]);
        assert_eq!(percentiles.len(), 5);
    }

    #[test]
    fn test_percentiles_remove() {
        let mut percentiles = Percentiles::new();
        for value in [3, 1, 2, 2] {
            percentiles.insert(value);
        }

        assert!(percentiles.remove(&2));
        assert_eq!(percentiles.as_slice(), &[1, 2, 3]);
        assert!(!percentiles.remove(&7));
        assert_eq!(percentiles.len(), 3);
    }

    #[test]
    fn test_percentiles_overtrim_is_empty() {
        let mut percentiles = Percentiles::new();
        for value in 0..10 {
            percentiles.insert(value);
        }

        assert!(percentiles.trimmed(60.0, 60.0).is_empty());
        assert!(percentiles.trimmed(100.0, 0.0).is_empty());
        assert_eq!(percentiles.trimmed(0.0, 0.0).len(), 10);

        let empty: Percentiles<i32> = Percentiles::new();
        assert!(empty.trimmed(0.0, 0.0).is_empty());
    }

    fn deposit(capacity: u64, richness: u64, volume: u64) -> Deposit {
        Deposit {
            position: IVec3::ZERO,
            capacity,
            richness,
            volume,
        }
    }

    #[test]
    fn test_harvest_order_follows_yield() {
        let mut selector = DepositSelector::new(4);
        selector.add(deposit(10, 1, 10)); // yield 10
        selector.add(deposit(10, 5, 10)); // yield 50
        selector.add(deposit(10, 2, 10)); // yield 20

        assert_eq!(selector.harvest_best(), Some(50));
        assert_eq!(selector.harvest_best(), Some(20));
        assert_eq!(selector.harvest_best(), Some(10));
        assert_eq!(selector.harvest_best(), None);
    }

    #[test]
    fn test_harvest_reinserts_remainder() {
        let mut selector = DepositSelector::new(2);
        selector.add(deposit(4, 3, 10));

        // 10 units drain as 4 + 4 + 2.
        assert_eq!(selector.harvest_best(), Some(12));
        assert_eq!(selector.harvest_best(), Some(12));
        assert_eq!(selector.harvest_best(), Some(6));
        assert_eq!(selector.harvest_best(), None);
        assert!(selector.is_empty());
    }

    #[test]
    fn test_drained_deposit_is_not_reinserted() {
        let mut selector = DepositSelector::new(2);
        selector.add(deposit(8, 2, 5));

        assert_eq!(selector.harvest_best(), Some(10));
        assert!(selector.is_empty());
    }

    #[test]
    fn test_add_rejects_past_limit() {
        let mut selector = DepositSelector::new(2);
        assert!(selector.add(deposit(1, 1, 1)));
        assert!(selector.add(deposit(2, 2, 2)));
        assert!(!selector.add(deposit(3, 3, 3)));
        assert_eq!(selector.len(), 2);
    }

    #[test]
    fn test_set_all_replaces_and_truncates() {
        let mut selector = DepositSelector::new(2);
        selector.add(deposit(9, 9, 9));

        selector.set_all(vec![
            deposit(1, 1, 1), // yield 1
            deposit(2, 2, 2), // yield 4
            deposit(3, 3, 3), // dropped: past the limit
        ]);
        assert_eq!(selector.len(), 2);
        assert_eq!(selector.peek_best().map(Deposit::yield_estimate), Some(4));
    }

    #[test]
    fn test_interleaved_harvest_competes_on_remaining_yield() {
        let mut selector = DepositSelector::new(2);
        selector.add(deposit(6, 1, 9)); // yield 6, remainder yield 3
        selector.add(deposit(5, 1, 5)); // yield 5

        // After the first pass the remainder (3) loses to the second
        // deposit (5).
        assert_eq!(selector.harvest_best(), Some(6));
        assert_eq!(selector.harvest_best(), Some(5));
        assert_eq!(selector.harvest_best(), Some(3));
        assert_eq!(selector.harvest_best(), None);
    }
}
