use crate::internal::ValidationError;
use alloc::{collections::TryReserveError, format, vec::Vec};
use core::{
    fmt,
    iter::FusedIterator,
    mem,
    ops::{Index, IndexMut},
};
use derive_where::derive_where;
use hashbrown::HashSet;
use rustc_hash::FxBuildHasher;

/// One mapping: both keys, plus their hashes as computed on insertion.
#[derive(Clone, Debug)]
pub(crate) struct KeyPair<K1, K2> {
    pub(crate) key1: K1,
    pub(crate) key2: K2,
    pub(crate) hash1: u64,
    pub(crate) hash2: u64,
}

#[derive(Clone, Debug)]
struct Node<K1, K2> {
    pair: KeyPair<K1, K2>,
    // Neighbors in insertion order.
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Clone, Debug)]
enum Slot<K1, K2> {
    Occupied(Node<K1, K2>),
    Vacant { next_free: Option<usize> },
}

/// An arena of key pairs addressed by stable integer indexes, threaded with a
/// doubly linked list in insertion order.
///
/// The index of a key pair never changes while it is in the set, so the
/// bucket tables can refer to it. Vacated indexes are kept on a free list and
/// handed out again by later insertions.
#[derive_where(Default)]
#[derive_where(Clone; K1: Clone, K2: Clone)]
#[derive_where(Debug; K1: fmt::Debug, K2: fmt::Debug)]
pub(crate) struct ItemSet<K1, K2> {
    slots: Vec<Slot<K1, K2>>,
    free_head: Option<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<K1, K2> ItemSet<K1, K2> {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The index the next call to [`Self::push_back`] will use.
    #[inline]
    pub(crate) fn next_index(&self) -> usize {
        self.free_head.unwrap_or(self.slots.len())
    }

    /// Makes sure the next [`Self::push_back`] does not need to allocate.
    pub(crate) fn try_reserve_one(&mut self) -> Result<(), TryReserveError> {
        if self.free_head.is_none() {
            self.slots.try_reserve(1)?;
        }
        Ok(())
    }

    /// Stores a key pair at the end of the insertion order and returns its
    /// index.
    pub(crate) fn push_back(&mut self, pair: KeyPair<K1, K2>) -> usize {
        let node = Node { pair, prev: self.tail, next: None };
        let index = match self.free_head {
            Some(index) => {
                let Slot::Vacant { next_free } =
                    mem::replace(&mut self.slots[index], Slot::Occupied(node))
                else {
                    panic!("free list entry {index} is occupied");
                };
                self.free_head = next_free;
                index
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                self.slots.len() - 1
            }
        };

        match self.tail {
            Some(tail) => self.node_mut(tail).next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
        index
    }

    /// Removes the key pair at `index`, closing the gap in the insertion
    /// order.
    pub(crate) fn remove(&mut self, index: usize) -> Option<KeyPair<K1, K2>> {
        let slot = self.slots.get_mut(index)?;
        if matches!(slot, Slot::Vacant { .. }) {
            return None;
        }
        let Slot::Occupied(node) =
            mem::replace(slot, Slot::Vacant { next_free: self.free_head })
        else {
            unreachable!("slot {index} was checked to be occupied");
        };
        self.free_head = Some(index);

        match node.prev {
            Some(prev) => self.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }
        self.len -= 1;

        Some(node.pair)
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&KeyPair<K1, K2>> {
        match self.slots.get(index)? {
            Slot::Occupied(node) => Some(&node.pair),
            Slot::Vacant { .. } => None,
        }
    }

    /// Iterates over indexes and key pairs in insertion order.
    pub(crate) fn iter(&self) -> OrderIter<'_, K1, K2> {
        OrderIter { items: self, current: self.head, remaining: self.len }
    }

    pub(crate) fn into_ordered(self) -> IntoOrdered<K1, K2> {
        IntoOrdered {
            current: self.head,
            remaining: self.len,
            slots: self.slots,
        }
    }

    /// Checks that the insertion list, the free list and the slot count agree
    /// with each other.
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        let mut visited =
            HashSet::with_capacity_and_hasher(self.len, FxBuildHasher);
        let mut seen = 0;
        let mut prev = None;
        let mut current = self.head;
        while let Some(index) = current {
            if !visited.insert(index) {
                return Err(ValidationError::general(format!(
                    "insertion list visits index {index} twice"
                )));
            }
            if seen == self.len {
                return Err(ValidationError::general(format!(
                    "insertion list is longer than len {}",
                    self.len
                )));
            }
            let Some(Slot::Occupied(node)) = self.slots.get(index) else {
                return Err(ValidationError::general(format!(
                    "insertion list reaches vacant index {index}"
                )));
            };
            if node.prev != prev {
                return Err(ValidationError::general(format!(
                    "index {index} has prev {:?}, expected {prev:?}",
                    node.prev
                )));
            }
            seen += 1;
            prev = Some(index);
            current = node.next;
        }

        if seen != self.len {
            return Err(ValidationError::general(format!(
                "insertion list has {seen} entries, expected {}",
                self.len
            )));
        }
        if self.tail != prev {
            return Err(ValidationError::general(format!(
                "tail is {:?}, but the list ends at {prev:?}",
                self.tail
            )));
        }

        let occupied = self
            .slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Occupied(_)))
            .count();
        if occupied != self.len {
            return Err(ValidationError::general(format!(
                "{occupied} occupied slots, expected {}",
                self.len
            )));
        }

        let vacant = self.slots.len() - occupied;
        let mut free = 0;
        let mut current = self.free_head;
        while let Some(index) = current {
            if free == vacant {
                return Err(ValidationError::general(
                    "free list is longer than the number of vacant slots",
                ));
            }
            let Some(Slot::Vacant { next_free }) = self.slots.get(index)
            else {
                return Err(ValidationError::general(format!(
                    "free list reaches occupied index {index}"
                )));
            };
            free += 1;
            current = *next_free;
        }
        if free != vacant {
            return Err(ValidationError::general(format!(
                "free list has {free} entries, expected {vacant}"
            )));
        }

        Ok(())
    }

    fn node(&self, index: usize) -> &Node<K1, K2> {
        match &self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => {
                panic!("ItemSet index {index} is vacant")
            }
        }
    }

    fn node_mut(&mut self, index: usize) -> &mut Node<K1, K2> {
        match &mut self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => {
                panic!("ItemSet index {index} is vacant")
            }
        }
    }
}

impl<K1, K2> Index<usize> for ItemSet<K1, K2> {
    type Output = KeyPair<K1, K2>;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.node(index).pair
    }
}

impl<K1, K2> IndexMut<usize> for ItemSet<K1, K2> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.node_mut(index).pair
    }
}

/// Borrowing iterator over an [`ItemSet`] in insertion order.
#[derive_where(Clone)]
#[derive(Debug)]
pub(crate) struct OrderIter<'a, K1, K2> {
    items: &'a ItemSet<K1, K2>,
    current: Option<usize>,
    remaining: usize,
}

impl<'a, K1, K2> OrderIter<'a, K1, K2> {
    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.remaining
    }
}

impl<'a, K1, K2> Iterator for OrderIter<'a, K1, K2> {
    type Item = (usize, &'a KeyPair<K1, K2>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.current?;
        let node = self.items.node(index);
        self.current = node.next;
        self.remaining -= 1;
        Some((index, &node.pair))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K1, K2> ExactSizeIterator for OrderIter<'_, K1, K2> {}

impl<K1, K2> FusedIterator for OrderIter<'_, K1, K2> {}

/// Owning iterator over an [`ItemSet`] in insertion order.
#[derive(Debug)]
pub(crate) struct IntoOrdered<K1, K2> {
    slots: Vec<Slot<K1, K2>>,
    current: Option<usize>,
    remaining: usize,
}

impl<K1, K2> Iterator for IntoOrdered<K1, K2> {
    type Item = KeyPair<K1, K2>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.current?;
        let vacant = Slot::Vacant { next_free: None };
        let Slot::Occupied(node) = mem::replace(&mut self.slots[index], vacant)
        else {
            panic!("insertion list reaches vacant index {index}");
        };
        self.current = node.next;
        self.remaining -= 1;
        Some(node.pair)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K1, K2> ExactSizeIterator for IntoOrdered<K1, K2> {}

impl<K1, K2> FusedIterator for IntoOrdered<K1, K2> {}
