//! Collision resolution for the two hash indexes of a
//! [`BiHashMap`](crate::BiHashMap).
//!
//! Both indexes of a map share one bucket structure, chosen through the `B`
//! type parameter:
//!
//! * [`ChainBuckets`] (the default) keeps a doubly linked collision chain
//!   per bucket. Lookups within a bucket are linear, which is fine as long as
//!   the hash function spreads keys well.
//! * [`TreeBuckets`] keeps an AVL tree per bucket, ordered by the full 64-bit
//!   hash. Lookups within a bucket are logarithmic, which bounds the damage
//!   done by many keys that share a bucket.
//!
//! Neither requires anything of the keys beyond `Hash + Eq`.

pub use crate::support::{avl_table::TreeBuckets, chain_table::ChainBuckets};

/// A bucket structure usable by [`BiHashMap`](crate::BiHashMap).
///
/// This trait is sealed: it is implemented by [`ChainBuckets`] and
/// [`TreeBuckets`] only.
pub trait Buckets: private::BucketTable {}

impl Buckets for ChainBuckets {}
impl Buckets for TreeBuckets {}

pub(crate) mod private {
    use crate::internal::TableValidationError;
    use alloc::{collections::TryReserveError, vec::Vec};

    /// Freshly allocated, empty bucket heads.
    ///
    /// Allocated separately from the tables they end up in so that growing a
    /// map can obtain the memory for both of its tables before touching
    /// either.
    #[derive(Debug)]
    pub struct BucketHeads(pub(crate) Vec<Option<usize>>);

    impl BucketHeads {
        /// `count` must be a power of two.
        pub fn try_new(count: usize) -> Result<Self, TryReserveError> {
            debug_assert!(count.is_power_of_two());
            let mut heads = Vec::new();
            heads.try_reserve_exact(count)?;
            heads.resize(count, None);
            Ok(Self(heads))
        }
    }

    /// The operations a map performs on each of its two indexes.
    ///
    /// Entries are identified by their index in the map's arena, and every
    /// entry's hash is cached there; `hash_at` reads that cache. Link storage
    /// is indexed by arena index too, so it must be reserved through
    /// [`Self::reserve_links`] before an entry with a new index is linked.
    pub trait BucketTable: Sized {
        fn from_heads(heads: BucketHeads) -> Self;

        fn bucket_count(&self) -> usize;

        /// Makes room for links of arena indexes below `slots`.
        fn reserve_links(
            &mut self,
            slots: usize,
        ) -> Result<(), TryReserveError>;

        /// Finds the entry with the given hash for which `eq` returns true.
        ///
        /// `eq` is only called for entries whose cached hash is `hash`.
        fn find<H, F>(&self, hash: u64, hash_at: H, eq: F) -> Option<usize>
        where
            H: Fn(usize) -> u64,
            F: FnMut(usize) -> bool;

        /// Links `index` into the bucket for `hash`, which must already be
        /// what `hash_at(index)` returns.
        fn link<H>(&mut self, index: usize, hash: u64, hash_at: H)
        where
            H: Fn(usize) -> u64;

        /// Unlinks `index`, which must be linked with `hash`.
        fn unlink(&mut self, index: usize, hash: u64);

        /// Replaces the bucket heads and links every entry in `entries` into
        /// them. Does not allocate.
        fn rebuild<I, H>(&mut self, heads: BucketHeads, entries: I, hash_at: H)
        where
            I: IntoIterator<Item = (usize, u64)>,
            H: Fn(usize) -> u64;

        /// Checks the structure of the table, and that exactly the entries in
        /// `entries` are linked at the buckets their hashes select.
        fn validate<I, H>(
            &self,
            entries: I,
            hash_at: H,
        ) -> Result<(), TableValidationError>
        where
            I: IntoIterator<Item = (usize, u64)>,
            H: Fn(usize) -> u64;
    }

    #[inline]
    pub(crate) fn bucket_index(hash: u64, bucket_count: usize) -> usize {
        // Truncation on 32-bit targets keeps the low bits, which are the ones
        // the mask selects anyway.
        (hash as usize) & (bucket_count - 1)
    }
}
