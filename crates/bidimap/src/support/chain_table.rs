//! Bucket table with a doubly linked collision chain per bucket.

use crate::{
    buckets::private::{bucket_index, BucketHeads, BucketTable},
    internal::TableValidationError,
};
use alloc::{collections::TryReserveError, format, vec::Vec};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ChainLink {
    prev: Option<usize>,
    next: Option<usize>,
}

/// Collision chains: each bucket is a doubly linked list of entries, newest
/// first.
///
/// This is the default bucket structure of
/// [`BiHashMap`](crate::BiHashMap).
#[derive(Clone, Debug)]
pub struct ChainBuckets {
    heads: Vec<Option<usize>>,
    // Indexed by arena index. Links of unlinked entries are unspecified.
    links: Vec<ChainLink>,
}

impl ChainBuckets {
    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        bucket_index(hash, self.heads.len())
    }

    fn push_front(&mut self, index: usize, hash: u64) {
        if index >= self.links.len() {
            self.links.resize(index + 1, ChainLink::default());
        }
        let bucket = self.bucket_of(hash);
        let old_head = self.heads[bucket];
        self.links[index] = ChainLink { prev: None, next: old_head };
        if let Some(old_head) = old_head {
            self.links[old_head].prev = Some(index);
        }
        self.heads[bucket] = Some(index);
    }
}

impl BucketTable for ChainBuckets {
    fn from_heads(heads: BucketHeads) -> Self {
        Self { heads: heads.0, links: Vec::new() }
    }

    #[inline]
    fn bucket_count(&self) -> usize {
        self.heads.len()
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
        let mut current = self.heads[self.bucket_of(hash)];
        while let Some(index) = current {
            if hash_at(index) == hash && eq(index) {
                return Some(index);
            }
            current = self.links[index].next;
        }
        None
    }

    fn link<H>(&mut self, index: usize, hash: u64, _hash_at: H)
    where
        H: Fn(usize) -> u64,
    {
        self.push_front(index, hash);
    }

    fn unlink(&mut self, index: usize, hash: u64) {
        let ChainLink { prev, next } = self.links[index];
        match prev {
            Some(prev) => self.links[prev].next = next,
            None => {
                let bucket = self.bucket_of(hash);
                debug_assert_eq!(self.heads[bucket], Some(index));
                self.heads[bucket] = next;
            }
        }
        if let Some(next) = next {
            self.links[next].prev = prev;
        }
        self.links[index] = ChainLink::default();
    }

    fn rebuild<I, H>(&mut self, heads: BucketHeads, entries: I, _hash_at: H)
    where
        I: IntoIterator<Item = (usize, u64)>,
        H: Fn(usize) -> u64,
    {
        self.heads = heads.0;
        for (index, hash) in entries {
            self.push_front(index, hash);
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
        if !self.heads.len().is_power_of_two() {
            return Err(TableValidationError::new(format!(
                "bucket count {} is not a power of two",
                self.heads.len()
            )));
        }

        let entries: Vec<(usize, u64)> = entries.into_iter().collect();
        let expected = entries.len();

        // Walk every chain: links must be symmetric, every entry must sit in
        // the bucket its hash selects, and no entry may appear twice.
        let mut linked = 0;
        for (bucket, head) in self.heads.iter().enumerate() {
            let mut prev = None;
            let mut current = *head;
            while let Some(index) = current {
                if linked == expected {
                    return Err(TableValidationError::new(format!(
                        "more than {expected} entries linked (cycle in \
                         bucket {bucket}?)"
                    )));
                }
                let link = self.links[index];
                if link.prev != prev {
                    return Err(TableValidationError::new(format!(
                        "entry {index} in bucket {bucket} has prev {:?}, \
                         expected {prev:?}",
                        link.prev
                    )));
                }
                let home = self.bucket_of(hash_at(index));
                if home != bucket {
                    return Err(TableValidationError::new(format!(
                        "entry {index} is in bucket {bucket}, but its hash \
                         selects bucket {home}"
                    )));
                }
                linked += 1;
                prev = Some(index);
                current = link.next;
            }
        }

        if linked != expected {
            return Err(TableValidationError::new(format!(
                "{linked} entries linked, expected {expected}"
            )));
        }

        for (index, hash) in entries {
            if hash_at(index) != hash {
                return Err(TableValidationError::new(format!(
                    "entry {index}: cached hash disagrees with the caller"
                )));
            }
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
