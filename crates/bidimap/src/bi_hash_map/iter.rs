use crate::support::item_set::{IntoOrdered, ItemSet, OrderIter};
use core::iter::FusedIterator;
use derive_where::derive_where;

/// An iterator over the mappings of a [`BiHashMap`] in insertion order.
///
/// Created by [`BiHashMap::iter`]. The iterator borrows the map, so the map
/// cannot be modified while it is alive.
///
/// [`BiHashMap`]: crate::BiHashMap
/// [`BiHashMap::iter`]: crate::BiHashMap::iter
#[derive_where(Clone)]
#[derive(Debug)]
pub struct Iter<'a, K1, K2> {
    inner: OrderIter<'a, K1, K2>,
}

impl<'a, K1, K2> Iter<'a, K1, K2> {
    pub(super) fn new(items: &'a ItemSet<K1, K2>) -> Self {
        Self { inner: items.iter() }
    }

    /// Returns true if the iterator has more mappings to yield.
    ///
    /// The count of mappings is fixed when the iterator is created.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.inner.remaining() > 0
    }
}

impl<'a, K1, K2> Iterator for Iter<'a, K1, K2> {
    type Item = (&'a K1, &'a K2);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let (_, pair) = self.inner.next()?;
        Some((&pair.key1, &pair.key2))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K1, K2> ExactSizeIterator for Iter<'_, K1, K2> {
    #[inline]
    fn len(&self) -> usize {
        self.inner.remaining()
    }
}

// OrderIter is a FusedIterator, so Iter is as well.
impl<K1, K2> FusedIterator for Iter<'_, K1, K2> {}

/// An iterator over the mappings of a [`BiHashMap`] by ownership, in
/// insertion order.
///
/// Created by [`BiHashMap::into_iter`].
///
/// [`BiHashMap`]: crate::BiHashMap
/// [`BiHashMap::into_iter`]: crate::BiHashMap::into_iter
#[derive(Debug)]
pub struct IntoIter<K1, K2> {
    inner: IntoOrdered<K1, K2>,
}

impl<K1, K2> IntoIter<K1, K2> {
    pub(super) fn new(items: ItemSet<K1, K2>) -> Self {
        Self { inner: items.into_ordered() }
    }
}

impl<K1, K2> Iterator for IntoIter<K1, K2> {
    type Item = (K1, K2);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let pair = self.inner.next()?;
        Some((pair.key1, pair.key2))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K1, K2> ExactSizeIterator for IntoIter<K1, K2> {}

impl<K1, K2> FusedIterator for IntoIter<K1, K2> {}
