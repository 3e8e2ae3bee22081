//! Point-keyed spatial indexing over 3D integer coordinates.
//!
//! This crate provides an octant-partitioned search tree for items keyed by
//! exact integer positions, together with helpers for choosing a bulk-load
//! order:
//!
//! - [`PointOctree`] - point-keyed octant tree with exact-key lookup and
//!   per-node subtree counts
//! - [`octant_index`] - the routing function that assigns a key to a child
//!   slot relative to a reference point
//! - [`interleaved_order`] / [`balanced_order`] - insertion orders that keep
//!   a bulk-loaded tree shallow
//!
//! # Example
//!
//! ```
//! use loam_spatial::PointOctree;
//! use glam::IVec3;
//!
//! let mut tree = PointOctree::new();
//! tree.insert(IVec3::new(3, 3, 3), "hub");
//! tree.insert(IVec3::new(1, 5, 2), "meadow");
//!
//! assert_eq!(tree.len(), 2);
//! assert_eq!(tree.lookup(IVec3::new(1, 5, 2)), Ok(&"meadow"));
//! assert!(tree.lookup(IVec3::new(9, 9, 9)).is_err());
//! ```

use glam::IVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Error when a key is not present in a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("key not found: {0}")]
pub struct KeyNotFound(pub IVec3);

// ============================================================================
// Octant routing
// ============================================================================

/// Computes the octant index of `key` relative to `origin`.
///
/// Bit 0 is set when `key.x >= origin.x`, bit 1 when `key.y >= origin.y`,
/// and bit 2 when `key.z >= origin.z`, giving an index in `0..8`. This is
/// the sole routing mechanism of [`PointOctree`] and is recomputed fresh at
/// every level of a descent.
pub fn octant_index(origin: IVec3, key: IVec3) -> usize {
    let mut octant = 0;
    if key.x >= origin.x {
        octant |= 1;
    }
    if key.y >= origin.y {
        octant |= 2;
    }
    if key.z >= origin.z {
        octant |= 4;
    }
    octant
}

// ============================================================================
// PointOctree
// ============================================================================

/// A node in the point octree.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct PointNode<T> {
    key: IVec3,
    item: T,
    /// Nodes in the subtree rooted here, including this one.
    subtree_size: usize,
    /// Sparse child slots, indexed by octant.
    children: [Option<Box<PointNode<T>>>; 8],
}

impl<T> PointNode<T> {
    fn new(key: IVec3, item: T) -> Self {
        Self {
            key,
            item,
            subtree_size: 1,
            children: Default::default(),
        }
    }

    fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

/// A point-keyed octant tree over 3D integer coordinates.
///
/// Every node stores one item under a unique integer position and partitions
/// the key space around itself into eight octants. Lookups and insertions
/// descend by recomputing the octant of the target key at each node, so
/// routing is deterministic for any insertion sequence. The tree never
/// rebalances: its shape, and therefore its lookup cost, is entirely a
/// function of insertion order. Feed it [`balanced_order`] or
/// [`interleaved_order`] sequences to keep bulk loads shallow.
///
/// Each node also maintains the number of nodes in its subtree, queryable
/// through [`PointOctree::subtree_size`] for order statistics over spatial
/// regions.
///
/// # Type Parameters
///
/// * `T` - The type of data associated with each key.
///
/// # Example
///
/// ```
/// use loam_spatial::PointOctree;
/// use glam::IVec3;
///
/// let mut tree = PointOctree::new();
/// tree.insert(IVec3::new(3, 3, 3), "A");
/// tree.insert(IVec3::new(4, 3, 1), "C");
/// tree.insert(IVec3::new(5, 4, 0), "D");
///
/// // (5, 4, 0) routes below (4, 3, 1), so that subtree holds two nodes.
/// assert_eq!(tree.subtree_size(IVec3::new(4, 3, 1)), Ok(2));
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointOctree<T> {
    root: Option<Box<PointNode<T>>>,
}

impl<T> Default for PointOctree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PointOctree<T> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Returns the total number of keys in the tree.
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.subtree_size)
    }

    /// Returns `true` if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns `true` if `key` is present in the tree.
    pub fn contains(&self, key: IVec3) -> bool {
        self.find(key).is_some()
    }

    /// Returns the item stored under `key`.
    ///
    /// Fails with [`KeyNotFound`] when the key is absent, including on an
    /// empty tree. Cost is proportional to the depth reached; there is no
    /// logarithmic guarantee for adversarial insertion orders.
    pub fn lookup(&self, key: IVec3) -> Result<&T, KeyNotFound> {
        self.find(key).map(|node| &node.item).ok_or(KeyNotFound(key))
    }

    /// Returns a mutable reference to the item stored under `key`.
    pub fn lookup_mut(&mut self, key: IVec3) -> Result<&mut T, KeyNotFound> {
        self.find_mut(key)
            .map(|node| &mut node.item)
            .ok_or(KeyNotFound(key))
    }

    /// Inserts an item under `key`, returning the previous item if the key
    /// was already present.
    ///
    /// A new key creates exactly one leaf node and bumps the subtree count
    /// of every node on the path to it. Re-inserting an existing key
    /// replaces the item in place and leaves the structure and all counts
    /// untouched.
    pub fn insert(&mut self, key: IVec3, item: T) -> Option<T> {
        match self.root {
            Some(ref mut root) => Self::insert_recursive(root, key, item),
            None => {
                self.root = Some(Box::new(PointNode::new(key, item)));
                None
            }
        }
    }

    fn insert_recursive(node: &mut PointNode<T>, key: IVec3, item: T) -> Option<T> {
        if node.key == key {
            return Some(std::mem::replace(&mut node.item, item));
        }

        let octant = octant_index(node.key, key);
        let previous = match node.children[octant] {
            Some(ref mut child) => Self::insert_recursive(child, key, item),
            None => {
                node.children[octant] = Some(Box::new(PointNode::new(key, item)));
                None
            }
        };

        // Only a brand-new node below grows this subtree; an overwrite
        // deeper down must not let the counts drift.
        if previous.is_none() {
            node.subtree_size += 1;
        }
        previous
    }

    /// Returns the number of keys in the subtree rooted at `key`, including
    /// `key` itself.
    pub fn subtree_size(&self, key: IVec3) -> Result<usize, KeyNotFound> {
        self.find(key)
            .map(|node| node.subtree_size)
            .ok_or(KeyNotFound(key))
    }

    /// Returns `true` if the node holding `key` has no children.
    pub fn is_leaf(&self, key: IVec3) -> Result<bool, KeyNotFound> {
        self.find(key)
            .map(PointNode::is_leaf)
            .ok_or(KeyNotFound(key))
    }

    /// Returns the height of the tree: the longest root-to-leaf node count,
    /// or 0 for an empty tree.
    ///
    /// Walks the whole tree; useful for judging the shape quality of a
    /// bulk-load order.
    pub fn height(&self) -> usize {
        self.root.as_deref().map_or(0, Self::height_recursive)
    }

    fn height_recursive(node: &PointNode<T>) -> usize {
        1 + node
            .children
            .iter()
            .flatten()
            .map(|child| Self::height_recursive(child))
            .max()
            .unwrap_or(0)
    }

    /// Removes all keys from the tree.
    pub fn clear(&mut self) {
        self.root = None;
    }

    fn find(&self, key: IVec3) -> Option<&PointNode<T>> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            if node.key == key {
                return Some(node);
            }
            current = node.children[octant_index(node.key, key)].as_deref();
        }
        None
    }

    fn find_mut(&mut self, key: IVec3) -> Option<&mut PointNode<T>> {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            if node.key == key {
                return Some(node);
            }
            current = node.children[octant_index(node.key, key)].as_deref_mut();
        }
        None
    }
}

// ============================================================================
// Insertion ordering
// ============================================================================

/// Orders points by interleaving the three per-axis sorted sequences.
///
/// The points are sorted by x, by y, and by z, and the three sequences are
/// merged round-robin; each point is kept at its earliest interleaved
/// position. Loading a [`PointOctree`] in this order tends to place central
/// points near the root.
///
/// # Example
///
/// ```
/// use loam_spatial::interleaved_order;
/// use glam::IVec3;
///
/// let points = vec![
///     IVec3::new(9, 0, 0),
///     IVec3::new(0, 9, 0),
///     IVec3::new(0, 0, 9),
/// ];
/// let order = interleaved_order(&points);
/// assert_eq!(order.len(), 3);
/// ```
pub fn interleaved_order(points: &[IVec3]) -> Vec<IVec3> {
    let mut by_x = points.to_vec();
    let mut by_y = points.to_vec();
    let mut by_z = points.to_vec();
    by_x.sort_by_key(|p| p.x);
    by_y.sort_by_key(|p| p.y);
    by_z.sort_by_key(|p| p.z);

    let mut seen = HashSet::with_capacity(points.len());
    let mut order = Vec::with_capacity(points.len());
    for i in 0..points.len() {
        for point in [by_x[i], by_y[i], by_z[i]] {
            if seen.insert(point) {
                order.push(point);
            }
        }
    }
    order
}

/// Orders points by recursive median split along the widest axis.
///
/// Each step emits the median of the points along the axis with the widest
/// spread, then orders the lower and upper halves the same way. Bulk-loading
/// a [`PointOctree`] in this order keeps its height close to `log2(n)`,
/// since every point is emitted after the medians that end up above it.
pub fn balanced_order(points: &[IVec3]) -> Vec<IVec3> {
    let mut remaining = points.to_vec();
    let mut order = Vec::with_capacity(points.len());
    median_split(&mut remaining, &mut order);
    order
}

fn median_split(points: &mut [IVec3], order: &mut Vec<IVec3>) {
    if points.is_empty() {
        return;
    }

    // Split on the axis with the widest spread.
    let min = points.iter().fold(points[0], |acc, p| acc.min(*p));
    let max = points.iter().fold(points[0], |acc, p| acc.max(*p));
    let spread = max - min;
    let axis = if spread.x >= spread.y && spread.x >= spread.z {
        0
    } else if spread.y >= spread.z {
        1
    } else {
        2
    };

    let mid = points.len() / 2;
    points.select_nth_unstable_by_key(mid, |p| p[axis]);
    order.push(points[mid]);

    let (lower, upper) = points.split_at_mut(mid);
    median_split(lower, order);
    median_split(&mut upper[1..], order);
}

// ============================================================================
// Tests
// ============================================================================
