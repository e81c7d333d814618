use crate::test_keys::{TestKey1, TestKey2};
use proptest::{prelude::*, sample::SizeRange};

/// A naive, inefficient bidirectional map that acts as an oracle for
/// property-based tests.
///
/// Pairs are stored in a vector in insertion order, without any indexes, and
/// every operation is a linear scan.
#[derive(Clone, Debug, Default)]
pub struct NaiveMap {
    pairs: Vec<(TestKey1, TestKey2)>,
}

impl NaiveMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn put_by_primary(
        &mut self,
        key1: TestKey1,
        key2: TestKey2,
    ) -> Option<TestKey2> {
        let existing = self.pairs.iter().position(|(k1, _)| *k1 == key1);
        // Another pair holding key2 loses it, and with it its place in the
        // map.
        let conflict =
            self.pairs.iter().position(|(k1, k2)| *k2 == key2 && *k1 != key1);

        match existing {
            Some(index) => {
                let old = std::mem::replace(&mut self.pairs[index].1, key2);
                if let Some(conflict) = conflict {
                    self.pairs.remove(conflict);
                }
                Some(old)
            }
            None => {
                if let Some(conflict) = conflict {
                    self.pairs.remove(conflict);
                }
                self.pairs.push((key1, key2));
                None
            }
        }
    }

    pub fn put_by_secondary(
        &mut self,
        key2: TestKey2,
        key1: TestKey1,
    ) -> Option<TestKey1> {
        let existing = self.pairs.iter().position(|(_, k2)| *k2 == key2);
        let conflict =
            self.pairs.iter().position(|(k1, k2)| *k1 == key1 && *k2 != key2);

        match existing {
            Some(index) => {
                let old = std::mem::replace(&mut self.pairs[index].0, key1);
                if let Some(conflict) = conflict {
                    self.pairs.remove(conflict);
                }
                Some(old)
            }
            None => {
                if let Some(conflict) = conflict {
                    self.pairs.remove(conflict);
                }
                self.pairs.push((key1, key2));
                None
            }
        }
    }

    pub fn get_by_primary(&self, key1: TestKey1) -> Option<&TestKey2> {
        self.pairs.iter().find(|(k1, _)| *k1 == key1).map(|(_, k2)| k2)
    }

    pub fn get_by_secondary(&self, key2: TestKey2) -> Option<&TestKey1> {
        self.pairs.iter().find(|(_, k2)| *k2 == key2).map(|(k1, _)| k1)
    }

    pub fn remove_by_primary(&mut self, key1: TestKey1) -> Option<TestKey2> {
        let index = self.pairs.iter().position(|(k1, _)| *k1 == key1)?;
        Some(self.pairs.remove(index).1)
    }

    pub fn remove_by_secondary(&mut self, key2: TestKey2) -> Option<TestKey1> {
        let index = self.pairs.iter().position(|(_, k2)| *k2 == key2)?;
        Some(self.pairs.remove(index).0)
    }

    /// Iterates over the pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&TestKey1, &TestKey2)> {
        self.pairs.iter().map(|(k1, k2)| (k1, k2))
    }
}

/// Generates a list of pairs with no repeated primary or secondary keys,
/// along with a shuffled copy of it.
pub fn pair_permutation_strategy(
    size: impl Into<SizeRange>,
) -> impl Strategy<Value = (Vec<(TestKey1, TestKey2)>, Vec<(TestKey1, TestKey2)>)>
{
    prop::collection::vec(any::<(TestKey1, TestKey2)>(), size.into())
        .prop_perturb(|pairs, mut rng| {
            // The input very likely repeats keys. Running it through the
            // oracle leaves one pair per key on each side.
            let mut map = NaiveMap::new();
            for (key1, key2) in pairs {
                map.put_by_primary(key1, key2);
            }
            let set: Vec<_> = map.pairs;

            // Now shuffle the pairs. This is a simple Fisher-Yates shuffle
            // (Durstenfeld variant, low to high).
            let mut set2 = set.clone();
            if set.len() < 2 {
                return (set, set2);
            }
            for i in 0..set2.len() - 1 {
                let j = rng.random_range(i..set2.len());
                set2.swap(i, j);
            }

            (set, set2)
        })
}
