use super::{tables::BiHashMapTables, IntoIter, Iter};
use crate::{
    buckets::{Buckets, ChainBuckets},
    config::{BiMapConfig, MINIMUM_INITIAL_CAPACITY},
    errors::AllocError,
    internal::ValidationError,
    support::{
        hash_builder::DefaultHashBuilder,
        item_set::{ItemSet, KeyPair},
    },
};
use alloc::format;
use core::{
    fmt,
    hash::{BuildHasher, Hash},
    mem,
};
use equivalent::Equivalent;

/// An insertion-ordered 1:1 (bijective) map between primary keys of type
/// `K1` and secondary keys of type `K2`.
///
/// Either key can be used to look up the other in O(1) average time. Each
/// primary key appears in at most one mapping, and so does each secondary
/// key: associating a key with a new partner replaces its old partner, and
/// claims the new partner from any mapping that held it before.
///
/// The storage mechanism is an arena of key pairs addressed by integer
/// indexes, with those indexes stored in two hash tables, one per key.
/// Iteration follows insertion order, which updates do not change.
///
/// `S` is the hash builder used for each key (one instance per side) and `B`
/// is the [bucket structure](crate::buckets) of both tables.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "default-hasher")] {
/// use bidimap::BiHashMap;
///
/// let mut map = BiHashMap::try_new()?;
/// assert_eq!(map.put_by_primary("lead", 'a')?, None);
/// assert_eq!(map.put_by_secondary('b', "bass")?, None);
///
/// assert_eq!(map.get_by_primary("lead"), Some(&'a'));
/// assert_eq!(map.get_by_secondary(&'b'), Some(&"bass"));
///
/// // Giving "lead" a new secondary key returns the old one.
/// assert_eq!(map.put_by_primary("lead", 'c')?, Some('a'));
/// assert!(!map.contains_secondary(&'a'));
/// # }
/// # Ok::<(), bidimap::AllocError>(())
/// ```
#[derive(Clone)]
pub struct BiHashMap<K1, K2, S = DefaultHashBuilder, B = ChainBuckets> {
    pub(super) items: ItemSet<K1, K2>,
    // Invariant: the values (usize) in these tables are valid indexes into
    // `items`, and are a 1:1 mapping.
    tables: BiHashMapTables<S, B>,
    load_factor: f32,
}

#[cfg(feature = "default-hasher")]
impl<K1: Hash + Eq, K2: Hash + Eq> BiHashMap<K1, K2> {
    /// Creates a new, empty `BiHashMap` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial bucket tables cannot be allocated.
    #[inline]
    pub fn try_new() -> Result<Self, AllocError> {
        Self::with_config(BiMapConfig::new())
    }

    /// Creates a new, empty `BiHashMap` sized according to `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured bucket count cannot be represented
    /// or allocated.
    pub fn with_config(config: BiMapConfig) -> Result<Self, AllocError> {
        Self::with_config_and_hashers(
            config,
            DefaultHashBuilder::default(),
            DefaultHashBuilder::default(),
        )
    }
}

impl<K1, K2, S, B> BiHashMap<K1, K2, S, B> {
    /// Returns the number of mappings in the map.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the map contains no mappings.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the load factor in effect, after clamping to
    /// [`MINIMUM_LOAD_FACTOR`](crate::config::MINIMUM_LOAD_FACTOR).
    #[inline]
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Iterates over the mappings in insertion order.
    ///
    /// The map cannot be modified while the iterator is alive.
    #[inline]
    pub fn iter(&self) -> Iter<'_, K1, K2> {
        Iter::new(&self.items)
    }
}

impl<K1, K2, S, B> BiHashMap<K1, K2, S, B>
where
    K1: Hash + Eq,
    K2: Hash + Eq,
    S: BuildHasher,
    B: Buckets,
{
    /// Creates a new, empty `BiHashMap` sized according to `config`, hashing
    /// primary keys with `hasher1` and secondary keys with `hasher2`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured bucket count cannot be represented
    /// or allocated. Nothing is leaked in that case.
    pub fn with_config_and_hashers(
        config: BiMapConfig,
        hasher1: S,
        hasher2: S,
    ) -> Result<Self, AllocError> {
        let bucket_count = config.bucket_count()?;
        let tables = BiHashMapTables::new(bucket_count, hasher1, hasher2)?;
        Ok(Self {
            items: ItemSet::default(),
            tables,
            load_factor: config.effective_load_factor(),
        })
    }

    /// Returns the number of buckets in each of the two hash tables.
    ///
    /// This is always a power of two, and at least
    /// [`MINIMUM_INITIAL_CAPACITY`](crate::config::MINIMUM_INITIAL_CAPACITY).
    ///
    /// The tables double as part of the insertion that would take
    /// [`len`](Self::len) above `capacity * load_factor`, so the load never
    /// exceeds the configured factor, even between insertions. Growth is
    /// decided on the length the map will have afterwards, not on the
    /// length it has beforehand. A map with 8 buckets and a load factor of
    /// 1.0 therefore grows on its ninth mapping rather than its tenth.
    ///
    /// ```
    /// use bidimap::{BiHashMap, BiMapConfig};
    ///
    /// let config = BiMapConfig::new().initial_capacity(8).load_factor(1.0);
    /// let mut map = BiHashMap::<u32, u32>::with_config(config)?;
    /// for i in 0..8 {
    ///     map.put_by_primary(i, i)?;
    /// }
    /// assert_eq!(map.capacity(), 8);
    ///
    /// map.put_by_primary(8, 8)?;
    /// assert_eq!(map.capacity(), 16);
    /// # Ok::<(), bidimap::AllocError>(())
    /// ```
    #[inline]
    pub fn capacity(&self) -> usize {
        self.tables.capacity()
    }

    /// Returns the hash builders for primary and secondary keys.
    pub fn hashers(&self) -> (&S, &S) {
        (self.tables.k1_to_item.state(), self.tables.k2_to_item.state())
    }

    /// Checks general invariants of the map.
    ///
    /// The code below always upholds these invariants, but it's useful to have
    /// an explicit check for tests.
    #[doc(hidden)]
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.items.validate()?;
        self.tables.validate(&self.items)?;

        let capacity = self.capacity();
        if capacity < MINIMUM_INITIAL_CAPACITY {
            return Err(ValidationError::general(format!(
                "capacity {capacity} is below the minimum \
                 {MINIMUM_INITIAL_CAPACITY}"
            )));
        }
        if self.exceeds_load(self.len()) {
            return Err(ValidationError::general(format!(
                "{} mappings in {capacity} buckets exceeds load factor {}",
                self.len(),
                self.load_factor,
            )));
        }

        // Check that the hashes are current and that each key leads back to
        // its own pair.
        for (ix, pair) in self.items.iter() {
            let [hash1, hash2] =
                self.tables.make_hashes(&pair.key1, &pair.key2);
            if hash1 != pair.hash1 || hash2 != pair.hash2 {
                return Err(ValidationError::general(format!(
                    "pair at index {ix} has stale cached hashes"
                )));
            }

            let Some(ix1) = self.find1_index(&pair.key1) else {
                return Err(ValidationError::general(format!(
                    "pair at index {ix} has no key1 index"
                )));
            };
            let Some(ix2) = self.find2_index(&pair.key2) else {
                return Err(ValidationError::general(format!(
                    "pair at index {ix} has no key2 index"
                )));
            };

            if ix1 != ix || ix2 != ix {
                return Err(ValidationError::general(format!(
                    "pair at index {ix} has inconsistent indexes: {ix1}/{ix2}"
                )));
            }
        }

        Ok(())
    }

    /// Associates `key1` with `key2`, keyed by the primary key.
    ///
    /// * If `key1` is already mapped, its secondary key is replaced by `key2`
    ///   and the old secondary key is returned. The mapping keeps its place
    ///   in iteration order.
    /// * Otherwise a new mapping is appended and `None` is returned.
    ///
    /// In both cases, if `key2` belonged to a different mapping, that mapping
    /// is removed first.
    ///
    /// # Errors
    ///
    /// Returns an error if memory for a new mapping or for growing the map
    /// cannot be allocated. The map is unchanged in that case.
    pub fn put_by_primary(
        &mut self,
        key1: K1,
        key2: K2,
    ) -> Result<Option<K2>, AllocError> {
        let [hash1, hash2] = self.tables.make_hashes(&key1, &key2);
        let conflict = self.find2_hashed(hash2, &key2);

        match self.find1_hashed(hash1, &key1) {
            Some(index) => {
                if let Some(other) = conflict.filter(|&other| other != index) {
                    self.remove_index(other);
                }
                Ok(Some(self.replace_key2(index, key2, hash2)))
            }
            None => {
                let pair = KeyPair { key1, key2, hash1, hash2 };
                self.insert_new(pair, conflict)?;
                Ok(None)
            }
        }
    }

    /// Associates `key2` with `key1`, keyed by the secondary key.
    ///
    /// This mirrors [`Self::put_by_primary`]: if `key2` is already mapped,
    /// its primary key is replaced by `key1` and the old primary key is
    /// returned. If `key1` belonged to a different mapping, that mapping is
    /// removed first.
    ///
    /// # Errors
    ///
    /// Returns an error if memory for a new mapping or for growing the map
    /// cannot be allocated. The map is unchanged in that case.
    pub fn put_by_secondary(
        &mut self,
        key2: K2,
        key1: K1,
    ) -> Result<Option<K1>, AllocError> {
        let [hash1, hash2] = self.tables.make_hashes(&key1, &key2);
        let conflict = self.find1_hashed(hash1, &key1);

        match self.find2_hashed(hash2, &key2) {
            Some(index) => {
                if let Some(other) = conflict.filter(|&other| other != index) {
                    self.remove_index(other);
                }
                Ok(Some(self.replace_key1(index, key1, hash1)))
            }
            None => {
                let pair = KeyPair { key1, key2, hash1, hash2 };
                self.insert_new(pair, conflict)?;
                Ok(None)
            }
        }
    }

    /// Returns true if the map has a mapping for the given primary key.
    pub fn contains_primary<Q>(&self, key1: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K1>,
    {
        self.find1_index(key1).is_some()
    }

    /// Returns true if the map has a mapping for the given secondary key.
    pub fn contains_secondary<Q>(&self, key2: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K2>,
    {
        self.find2_index(key2).is_some()
    }

    /// Returns the secondary key mapped to the given primary key.
    pub fn get_by_primary<Q>(&self, key1: &Q) -> Option<&K2>
    where
        Q: ?Sized + Hash + Equivalent<K1>,
    {
        self.find1_index(key1).map(|ix| &self.items[ix].key2)
    }

    /// Returns the primary key mapped to the given secondary key.
    pub fn get_by_secondary<Q>(&self, key2: &Q) -> Option<&K1>
    where
        Q: ?Sized + Hash + Equivalent<K2>,
    {
        self.find2_index(key2).map(|ix| &self.items[ix].key1)
    }

    /// Removes the mapping for the given primary key, returning its
    /// secondary key.
    pub fn remove_by_primary<Q>(&mut self, key1: &Q) -> Option<K2>
    where
        Q: ?Sized + Hash + Equivalent<K1>,
    {
        self.remove_pair_by_primary(key1).map(|(_, key2)| key2)
    }

    /// Removes the mapping for the given secondary key, returning its
    /// primary key.
    pub fn remove_by_secondary<Q>(&mut self, key2: &Q) -> Option<K1>
    where
        Q: ?Sized + Hash + Equivalent<K2>,
    {
        self.remove_pair_by_secondary(key2).map(|(key1, _)| key1)
    }

    /// Removes the mapping for the given primary key, returning both of its
    /// keys.
    pub fn remove_pair_by_primary<Q>(&mut self, key1: &Q) -> Option<(K1, K2)>
    where
        Q: ?Sized + Hash + Equivalent<K1>,
    {
        let index = self.find1_index(key1)?;
        self.remove_index(index)
    }

    /// Removes the mapping for the given secondary key, returning both of its
    /// keys.
    pub fn remove_pair_by_secondary<Q>(&mut self, key2: &Q) -> Option<(K1, K2)>
    where
        Q: ?Sized + Hash + Equivalent<K2>,
    {
        let index = self.find2_index(key2)?;
        self.remove_index(index)
    }

    fn find1_index<Q>(&self, key1: &Q) -> Option<usize>
    where
        Q: ?Sized + Hash + Equivalent<K1>,
    {
        let items = &self.items;
        self.tables.k1_to_item.find_index(
            key1,
            |ix| items[ix].hash1,
            |ix| &items[ix].key1,
        )
    }

    fn find2_index<Q>(&self, key2: &Q) -> Option<usize>
    where
        Q: ?Sized + Hash + Equivalent<K2>,
    {
        let items = &self.items;
        self.tables.k2_to_item.find_index(
            key2,
            |ix| items[ix].hash2,
            |ix| &items[ix].key2,
        )
    }

    fn find1_hashed(&self, hash1: u64, key1: &K1) -> Option<usize> {
        let items = &self.items;
        self.tables.k1_to_item.find_hashed(
            hash1,
            key1,
            |ix| items[ix].hash1,
            |ix| &items[ix].key1,
        )
    }

    fn find2_hashed(&self, hash2: u64, key2: &K2) -> Option<usize> {
        let items = &self.items;
        self.tables.k2_to_item.find_hashed(
            hash2,
            key2,
            |ix| items[ix].hash2,
            |ix| &items[ix].key2,
        )
    }

    fn exceeds_load(&self, len: usize) -> bool {
        len as f64 > self.capacity() as f64 * f64::from(self.load_factor)
    }

    /// Appends a new mapping, first evicting `conflict` (a mapping that holds
    /// one of the new keys on its other side).
    ///
    /// Everything that can fail happens before the map is modified.
    fn insert_new(
        &mut self,
        pair: KeyPair<K1, K2>,
        conflict: Option<usize>,
    ) -> Result<(), AllocError> {
        self.items.try_reserve_one()?;
        self.tables.reserve_links(self.items.next_index() + 1)?;

        let len_after = self.len() - usize::from(conflict.is_some()) + 1;
        if self.exceeds_load(len_after) {
            self.tables.grow(&self.items)?;
        }

        // Evicting frees a slot, so the reservations above still cover the
        // index that push_back picks.
        if let Some(other) = conflict {
            self.remove_index(other);
        }
        let index = self.items.push_back(pair);
        self.tables.link(index, &self.items);
        Ok(())
    }

    fn replace_key1(&mut self, index: usize, key1: K1, hash1: u64) -> K1 {
        let old_hash = self.items[index].hash1;
        self.tables.k1_to_item.buckets.unlink(index, old_hash);

        let pair = &mut self.items[index];
        pair.hash1 = hash1;
        let old = mem::replace(&mut pair.key1, key1);

        let items = &self.items;
        self.tables.k1_to_item.buckets.link(index, hash1, |ix| items[ix].hash1);
        old
    }

    fn replace_key2(&mut self, index: usize, key2: K2, hash2: u64) -> K2 {
        let old_hash = self.items[index].hash2;
        self.tables.k2_to_item.buckets.unlink(index, old_hash);

        let pair = &mut self.items[index];
        pair.hash2 = hash2;
        let old = mem::replace(&mut pair.key2, key2);

        let items = &self.items;
        self.tables.k2_to_item.buckets.link(index, hash2, |ix| items[ix].hash2);
        old
    }

    fn remove_index(&mut self, index: usize) -> Option<(K1, K2)> {
        self.items.get(index)?;
        self.tables.unlink(index, &self.items);
        let pair = self.items.remove(index)?;
        Some((pair.key1, pair.key2))
    }
}

impl<K1, K2, S, B> fmt::Debug for BiHashMap<K1, K2, S, B>
where
    K1: fmt::Debug,
    K2: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K1, K2, S, B> PartialEq for BiHashMap<K1, K2, S, B>
where
    K1: Hash + Eq,
    K2: Hash + Eq,
    S: BuildHasher,
    B: Buckets,
{
    fn eq(&self, other: &Self) -> bool {
        // Two maps are equal if they hold the same set of pairs, in any
        // order. Both sides are bijective, so with equal lengths it is enough
        // to check that every primary key maps to the same secondary key in
        // the other map.
        if self.len() != other.len() {
            return false;
        }

        self.iter()
            .all(|(key1, key2)| other.get_by_primary(key1) == Some(key2))
    }
}

impl<K1, K2, S, B> Eq for BiHashMap<K1, K2, S, B>
where
    K1: Hash + Eq,
    K2: Hash + Eq,
    S: BuildHasher,
    B: Buckets,
{
}

impl<'a, K1, K2, S, B> IntoIterator for &'a BiHashMap<K1, K2, S, B> {
    type Item = (&'a K1, &'a K2);
    type IntoIter = Iter<'a, K1, K2>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K1, K2, S, B> IntoIterator for BiHashMap<K1, K2, S, B> {
    type Item = (K1, K2);
    type IntoIter = IntoIter<K1, K2>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.items)
    }
}
