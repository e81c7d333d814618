use crate::{
    buckets::private::{BucketHeads, BucketTable},
    errors::AllocError,
    internal::ValidationError,
    support::{hash_table::MapHashTable, item_set::ItemSet},
};
use alloc::format;
use core::hash::{BuildHasher, Hash};

#[derive(Clone, Debug)]
pub(super) struct BiHashMapTables<S, B> {
    pub(super) k1_to_item: MapHashTable<S, B>,
    pub(super) k2_to_item: MapHashTable<S, B>,
}

impl<S: BuildHasher, B: BucketTable> BiHashMapTables<S, B> {
    /// Allocates both tables, or neither.
    pub(super) fn new(
        bucket_count: usize,
        hasher1: S,
        hasher2: S,
    ) -> Result<Self, AllocError> {
        let heads1 = BucketHeads::try_new(bucket_count)?;
        let heads2 = BucketHeads::try_new(bucket_count)?;
        Ok(Self {
            k1_to_item: MapHashTable::new(hasher1, heads1),
            k2_to_item: MapHashTable::new(hasher2, heads2),
        })
    }

    /// The bucket count, shared by both tables.
    #[inline]
    pub(super) fn capacity(&self) -> usize {
        self.k1_to_item.bucket_count()
    }

    pub(super) fn make_hashes<K1, K2>(&self, k1: &K1, k2: &K2) -> [u64; 2]
    where
        K1: ?Sized + Hash,
        K2: ?Sized + Hash,
    {
        let h1 = self.k1_to_item.compute_hash(k1);
        let h2 = self.k2_to_item.compute_hash(k2);

        [h1, h2]
    }

    /// Makes room in both tables for links of arena indexes below `slots`.
    pub(super) fn reserve_links(
        &mut self,
        slots: usize,
    ) -> Result<(), AllocError> {
        self.k1_to_item.buckets.reserve_links(slots)?;
        self.k2_to_item.buckets.reserve_links(slots)?;
        Ok(())
    }

    /// Links the entry at `index` into both tables, using the hashes cached
    /// in `items`.
    pub(super) fn link<K1, K2>(
        &mut self,
        index: usize,
        items: &ItemSet<K1, K2>,
    ) {
        let pair = &items[index];
        self.k1_to_item.buckets.link(index, pair.hash1, |ix| items[ix].hash1);
        self.k2_to_item.buckets.link(index, pair.hash2, |ix| items[ix].hash2);
    }

    /// Unlinks the entry at `index` from both tables.
    pub(super) fn unlink<K1, K2>(
        &mut self,
        index: usize,
        items: &ItemSet<K1, K2>,
    ) {
        let pair = &items[index];
        self.k1_to_item.buckets.unlink(index, pair.hash1);
        self.k2_to_item.buckets.unlink(index, pair.hash2);
    }

    /// Doubles the bucket count of both tables.
    ///
    /// Both new sets of bucket heads are allocated before either table is
    /// touched, so on error the old tables are left as they were. Entries are
    /// relinked in insertion order from their cached hashes.
    pub(super) fn grow<K1, K2>(
        &mut self,
        items: &ItemSet<K1, K2>,
    ) -> Result<(), AllocError> {
        let capacity = self.capacity();
        let new_count = capacity
            .checked_mul(2)
            .ok_or(AllocError::CapacityOverflow { requested: capacity + 1 })?;
        let heads1 = BucketHeads::try_new(new_count)?;
        let heads2 = BucketHeads::try_new(new_count)?;

        self.k1_to_item.buckets.rebuild(
            heads1,
            items.iter().map(|(ix, pair)| (ix, pair.hash1)),
            |ix| items[ix].hash1,
        );
        self.k2_to_item.buckets.rebuild(
            heads2,
            items.iter().map(|(ix, pair)| (ix, pair.hash2)),
            |ix| items[ix].hash2,
        );
        Ok(())
    }

    pub(super) fn validate<K1, K2>(
        &self,
        items: &ItemSet<K1, K2>,
    ) -> Result<(), ValidationError> {
        let (count1, count2) =
            (self.k1_to_item.bucket_count(), self.k2_to_item.bucket_count());
        if count1 != count2 {
            return Err(ValidationError::general(format!(
                "bucket counts differ: k1_to_item has {count1}, k2_to_item \
                 has {count2}"
            )));
        }

        self.k1_to_item
            .validate(items.iter().map(|(ix, pair)| (ix, pair.hash1)), |ix| {
                items[ix].hash1
            })
            .map_err(|error| ValidationError::Table {
                name: "k1_to_item",
                error,
            })?;
        self.k2_to_item
            .validate(items.iter().map(|(ix, pair)| (ix, pair.hash2)), |ix| {
                items[ix].hash2
            })
            .map_err(|error| ValidationError::Table {
                name: "k2_to_item",
                error,
            })?;

        Ok(())
    }
}
