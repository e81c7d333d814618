//! One hash index of a map: a hash builder plus a bucket table of arena
//! indexes.

use crate::{
    buckets::private::{BucketHeads, BucketTable},
    internal::TableValidationError,
};
use core::hash::{BuildHasher, Hash};
use equivalent::Equivalent;

#[derive(Clone, Debug)]
pub(crate) struct MapHashTable<S, B> {
    pub(crate) state: S,
    pub(crate) buckets: B,
}

impl<S: BuildHasher, B: BucketTable> MapHashTable<S, B> {
    pub(crate) fn new(state: S, heads: BucketHeads) -> Self {
        Self { state, buckets: B::from_heads(heads) }
    }

    #[inline]
    pub(crate) fn state(&self) -> &S {
        &self.state
    }

    #[inline]
    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.bucket_count()
    }

    #[inline]
    pub(crate) fn compute_hash<K: ?Sized + Hash>(&self, key: &K) -> u64 {
        self.state.hash_one(key)
    }

    /// Finds the arena index of `key`.
    ///
    /// `hash_at` returns the cached hash of an arena index and `lookup` the
    /// key stored there.
    pub(crate) fn find_index<'a, K, Q, H, F>(
        &self,
        key: &Q,
        hash_at: H,
        lookup: F,
    ) -> Option<usize>
    where
        K: 'a,
        Q: ?Sized + Hash + Equivalent<K>,
        H: Fn(usize) -> u64,
        F: Fn(usize) -> &'a K,
    {
        let hash = self.compute_hash(key);
        self.find_hashed(hash, key, hash_at, lookup)
    }

    /// Like [`Self::find_index`], with the hash of `key` already computed.
    pub(crate) fn find_hashed<'a, K, Q, H, F>(
        &self,
        hash: u64,
        key: &Q,
        hash_at: H,
        lookup: F,
    ) -> Option<usize>
    where
        K: 'a,
        Q: ?Sized + Equivalent<K>,
        H: Fn(usize) -> u64,
        F: Fn(usize) -> &'a K,
    {
        self.buckets.find(hash, hash_at, |index| key.equivalent(lookup(index)))
    }

    pub(crate) fn validate<I, H>(
        &self,
        entries: I,
        hash_at: H,
    ) -> Result<(), TableValidationError>
    where
        I: IntoIterator<Item = (usize, u64)>,
        H: Fn(usize) -> u64,
    {
        self.buckets.validate(entries, hash_at)
    }
}
