use bidimap::{buckets::Buckets, BiHashMap, BiMapConfig, DefaultHashBuilder};
use std::collections::HashMap;

/// Builds a map of `size` mappings from `i` to `"key{i}"`.
pub fn make_bimap<B: Buckets>(
    size: u32,
) -> BiHashMap<u32, String, DefaultHashBuilder, B> {
    let mut map = BiHashMap::with_config_and_hashers(
        BiMapConfig::new(),
        DefaultHashBuilder::default(),
        DefaultHashBuilder::default(),
    )
    .expect("map allocated");
    for i in 0..size {
        map.put_by_primary(i, secondary_key(i)).expect("map grew");
    }
    map
}

pub fn secondary_key(i: u32) -> String {
    format!("key{i}")
}

/// The usual stand-in for a bidirectional map: two hash maps kept in sync by
/// hand.
pub struct PairOfMaps {
    forward: HashMap<u32, String, DefaultHashBuilder>,
    backward: HashMap<String, u32, DefaultHashBuilder>,
}

impl PairOfMaps {
    pub fn new() -> Self {
        Self {
            forward: HashMap::with_hasher(DefaultHashBuilder::default()),
            backward: HashMap::with_hasher(DefaultHashBuilder::default()),
        }
    }

    pub fn with_size(size: u32) -> Self {
        let mut maps = Self::new();
        for i in 0..size {
            maps.put_by_primary(i, secondary_key(i));
        }
        maps
    }

    pub fn put_by_primary(
        &mut self,
        key1: u32,
        key2: String,
    ) -> Option<String> {
        if self.backward.get(&key2) == Some(&key1) {
            return Some(key2);
        }
        if let Some(old_key1) = self.backward.remove(&key2) {
            self.forward.remove(&old_key1);
        }
        let old = self.forward.insert(key1, key2.clone());
        if let Some(old) = &old {
            self.backward.remove(old);
        }
        self.backward.insert(key2, key1);
        old
    }

    pub fn get_by_primary(&self, key1: &u32) -> Option<&String> {
        self.forward.get(key1)
    }

    pub fn get_by_secondary(&self, key2: &str) -> Option<&u32> {
        self.backward.get(key2)
    }
}

impl Default for PairOfMaps {
    fn default() -> Self {
        Self::new()
    }
}
