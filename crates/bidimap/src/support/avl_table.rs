//! Bucket table with an AVL tree per bucket.
//!
//! Trees are ordered by `(hash, index)`: the entry's full 64-bit hash first,
//! then its arena index to break ties. That makes every key in a tree unique
//! without requiring `Ord` on the map's keys. Entries whose full hashes are
//! equal end up adjacent in order, and lookups walk that run calling the
//! equality function.

use crate::{
    buckets::private::{bucket_index, BucketHeads, BucketTable},
    internal::TableValidationError,
};
use alloc::{collections::TryReserveError, format, vec::Vec};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TreeLink {
    parent: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
    // Leaves have height 1; an empty subtree has height 0.
    height: u8,
}

/// Collision trees: each bucket is an AVL tree of entries ordered by their
/// full hash.
///
/// Lookups within a bucket take logarithmic rather than linear time, which
/// keeps a map usable when many keys share a bucket.
#[derive(Clone, Debug)]
pub struct TreeBuckets {
    roots: Vec<Option<usize>>,
    // Indexed by arena index. Links of unlinked entries are unspecified.
    links: Vec<TreeLink>,
}

impl TreeBuckets {
    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        bucket_index(hash, self.roots.len())
    }

    #[inline]
    fn height(&self, node: Option<usize>) -> u8 {
        node.map_or(0, |node| self.links[node].height)
    }

    fn update_height(&mut self, node: usize) {
        let TreeLink { left, right, .. } = self.links[node];
        self.links[node].height =
            1 + self.height(left).max(self.height(right));
    }

    /// Left height minus right height.
    fn balance(&self, node: usize) -> i16 {
        let TreeLink { left, right, .. } = self.links[node];
        i16::from(self.height(left)) - i16::from(self.height(right))
    }

    /// Points whatever referred to `old` (its parent, or the bucket root) at
    /// `new` instead.
    fn replace_child(
        &mut self,
        bucket: usize,
        parent: Option<usize>,
        old: usize,
        new: Option<usize>,
    ) {
        match parent {
            None => self.roots[bucket] = new,
            Some(parent) => {
                let link = &mut self.links[parent];
                if link.left == Some(old) {
                    link.left = new;
                } else {
                    debug_assert_eq!(link.right, Some(old));
                    link.right = new;
                }
            }
        }
    }

    /// Rotates `node` down to the left. Returns the new subtree root.
    fn rotate_left(&mut self, bucket: usize, node: usize) -> usize {
        let pivot =
            self.links[node].right.expect("rotate_left requires a right child");
        let inner = self.links[pivot].left;
        let parent = self.links[node].parent;

        self.links[node].right = inner;
        if let Some(inner) = inner {
            self.links[inner].parent = Some(node);
        }
        self.links[pivot].left = Some(node);
        self.links[node].parent = Some(pivot);
        self.links[pivot].parent = parent;
        self.replace_child(bucket, parent, node, Some(pivot));

        self.update_height(node);
        self.update_height(pivot);
        pivot
    }

    /// Rotates `node` down to the right. Returns the new subtree root.
    fn rotate_right(&mut self, bucket: usize, node: usize) -> usize {
        let pivot =
            self.links[node].left.expect("rotate_right requires a left child");
        let inner = self.links[pivot].right;
        let parent = self.links[node].parent;

        self.links[node].left = inner;
        if let Some(inner) = inner {
            self.links[inner].parent = Some(node);
        }
        self.links[pivot].right = Some(node);
        self.links[node].parent = Some(pivot);
        self.links[pivot].parent = parent;
        self.replace_child(bucket, parent, node, Some(pivot));

        self.update_height(node);
        self.update_height(pivot);
        pivot
    }

    /// Restores heights and balance on the path from `start` to the root.
    fn rebalance(&mut self, bucket: usize, start: Option<usize>) {
        let mut current = start;
        while let Some(node) = current {
            self.update_height(node);
            let balance = self.balance(node);
            let top = if balance > 1 {
                let left = self.links[node]
                    .left
                    .expect("left-heavy node has a left child");
                if self.balance(left) < 0 {
                    self.rotate_left(bucket, left);
                }
                self.rotate_right(bucket, node)
            } else if balance < -1 {
                let right = self.links[node]
                    .right
                    .expect("right-heavy node has a right child");
                if self.balance(right) > 0 {
                    self.rotate_right(bucket, right);
                }
                self.rotate_left(bucket, node)
            } else {
                node
            };
            current = self.links[top].parent;
        }
    }

    fn leftmost(&self, mut node: usize) -> usize {
        while let Some(left) = self.links[node].left {
            node = left;
        }
        node
    }

    /// The next entry in `(hash, index)` order within the same tree.
    fn successor(&self, node: usize) -> Option<usize> {
        if let Some(right) = self.links[node].right {
            return Some(self.leftmost(right));
        }
        let mut child = node;
        let mut parent = self.links[node].parent;
        while let Some(p) = parent {
            if self.links[p].left == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.links[p].parent;
        }
        None
    }

    fn check_subtree<H>(
        &self,
        bucket: usize,
        node: usize,
        parent: Option<usize>,
        hash_at: &H,
        budget: &mut usize,
        prev_key: &mut Option<(u64, usize)>,
    ) -> Result<u8, TableValidationError>
    where
        H: Fn(usize) -> u64,
    {
        if *budget == 0 {
            return Err(TableValidationError::new(format!(
                "more entries linked than expected (cycle in bucket \
                 {bucket}?)"
            )));
        }
        *budget -= 1;

        let link = self.links[node];
        if link.parent != parent {
            return Err(TableValidationError::new(format!(
                "entry {node} has parent {:?}, expected {parent:?}",
                link.parent
            )));
        }
        let hash = hash_at(node);
        let home = self.bucket_of(hash);
        if home != bucket {
            return Err(TableValidationError::new(format!(
                "entry {node} is in bucket {bucket}, but its hash selects \
                 bucket {home}"
            )));
        }

        let left_height = match link.left {
            Some(left) => self.check_subtree(
                bucket,
                left,
                Some(node),
                hash_at,
                budget,
                prev_key,
            )?,
            None => 0,
        };

        let key = (hash, node);
        if let Some(prev) = *prev_key {
            if prev >= key {
                return Err(TableValidationError::new(format!(
                    "entry {node} is out of order in bucket {bucket}: \
                     {prev:?} >= {key:?}"
                )));
            }
        }
        *prev_key = Some(key);

        let right_height = match link.right {
            Some(right) => self.check_subtree(
                bucket,
                right,
                Some(node),
                hash_at,
                budget,
                prev_key,
            )?,
            None => 0,
        };

        let height = 1 + left_height.max(right_height);
        if link.height != height {
            return Err(TableValidationError::new(format!(
                "entry {node} records height {}, actual height {height}",
                link.height
            )));
        }
        if left_height.abs_diff(right_height) > 1 {
            return Err(TableValidationError::new(format!(
                "entry {node} is unbalanced: left height {left_height}, \
                 right height {right_height}"
            )));
        }

        Ok(height)
    }
}

impl BucketTable for TreeBuckets {
    fn from_heads(heads: BucketHeads) -> Self {
        Self { roots: heads.0, links: Vec::new() }
    }

    #[inline]
    fn bucket_count(&self) -> usize {
        self.roots.len()
    }

    fn reserve_links(
        &mut self,
        slots: usize,
    ) -> Result<(), TryReserveError> {
        if slots > self.links.len() {
            self.links.try_reserve(slots - self.links.len())?;
        }
        Ok(())
    }

    fn find<H, F>(&self, hash: u64, hash_at: H, mut eq: F) -> Option<usize>
    where
        H: Fn(usize) -> u64,
        F: FnMut(usize) -> bool,
    {
        // Descend to the first entry whose hash is at least `hash`.
        let mut first = None;
        let mut current = self.roots[self.bucket_of(hash)];
        while let Some(node) = current {
            if hash_at(node) < hash {
                current = self.links[node].right;
            } else {
                first = Some(node);
                current = self.links[node].left;
            }
        }

        // Then walk the run of entries with exactly this hash.
        let mut current = first;
        while let Some(node) = current {
            if hash_at(node) != hash {
                break;
            }
            if eq(node) {
                return Some(node);
            }
            current = self.successor(node);
        }
        None
    }

    fn link<H>(&mut self, index: usize, hash: u64, hash_at: H)
    where
        H: Fn(usize) -> u64,
    {
        if index >= self.links.len() {
            self.links.resize(index + 1, TreeLink::default());
        }

        let bucket = self.bucket_of(hash);
        let key = (hash, index);
        let mut parent = None;
        let mut goes_left = false;
        let mut current = self.roots[bucket];
        while let Some(node) = current {
            parent = Some(node);
            goes_left = key < (hash_at(node), node);
            current = if goes_left {
                self.links[node].left
            } else {
                self.links[node].right
            };
        }

        self.links[index] =
            TreeLink { parent, left: None, right: None, height: 1 };
        match parent {
            None => self.roots[bucket] = Some(index),
            Some(parent) if goes_left => self.links[parent].left = Some(index),
            Some(parent) => self.links[parent].right = Some(index),
        }
        self.rebalance(bucket, parent);
    }

    fn unlink(&mut self, index: usize, hash: u64) {
        let bucket = self.bucket_of(hash);
        let TreeLink { parent, left, right, .. } = self.links[index];

        let rebalance_from = match (left, right) {
            (Some(left), Some(right)) => {
                // Splice the in-order successor into this node's place.
                let successor = self.leftmost(right);
                let rebalance_from = if successor == right {
                    successor
                } else {
                    let successor_parent = self.links[successor]
                        .parent
                        .expect("successor below `right` has a parent");
                    let successor_right = self.links[successor].right;
                    self.links[successor_parent].left = successor_right;
                    if let Some(successor_right) = successor_right {
                        self.links[successor_right].parent =
                            Some(successor_parent);
                    }
                    self.links[successor].right = Some(right);
                    self.links[right].parent = Some(successor);
                    successor_parent
                };
                self.links[successor].left = Some(left);
                self.links[left].parent = Some(successor);
                self.links[successor].parent = parent;
                self.replace_child(bucket, parent, index, Some(successor));
                Some(rebalance_from)
            }
            (child, None) | (None, child) => {
                if let Some(child) = child {
                    self.links[child].parent = parent;
                }
                self.replace_child(bucket, parent, index, child);
                parent
            }
        };

        self.links[index] = TreeLink::default();
        self.rebalance(bucket, rebalance_from);
    }

    fn rebuild<I, H>(&mut self, heads: BucketHeads, entries: I, hash_at: H)
    where
        I: IntoIterator<Item = (usize, u64)>,
        H: Fn(usize) -> u64,
    {
        self.roots = heads.0;
        for (index, hash) in entries {
            self.link(index, hash, &hash_at);
        }
    }

    fn validate<I, H>(
        &self,
        entries: I,
        hash_at: H,
    ) -> Result<(), TableValidationError>
    where
        I: IntoIterator<Item = (usize, u64)>,
        H: Fn(usize) -> u64,
    {
        if !self.roots.len().is_power_of_two() {
            return Err(TableValidationError::new(format!(
                "bucket count {} is not a power of two",
                self.roots.len()
            )));
        }

        let entries: Vec<(usize, u64)> = entries.into_iter().collect();
        let mut budget = entries.len();
        for (bucket, root) in self.roots.iter().enumerate() {
            let Some(root) = *root else { continue };
            let mut prev_key = None;
            self.check_subtree(
                bucket,
                root,
                None,
                &hash_at,
                &mut budget,
                &mut prev_key,
            )?;
        }
        if budget != 0 {
            return Err(TableValidationError::new(format!(
                "{} entries linked, expected {}",
                entries.len() - budget,
                entries.len()
            )));
        }

        for (index, hash) in entries {
            if self.find(hash, &hash_at, |found| found == index).is_none() {
                return Err(TableValidationError::new(format!(
                    "entry {index} is not linked in bucket {}",
                    self.bucket_of(hash)
                )));
            }
        }

        Ok(())
    }
}
