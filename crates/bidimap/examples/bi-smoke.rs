//! A smoke test exercising `BiHashMap` from both sides: bulk insertion
//! through either key, lookups, removal and ordered iteration.

use bidimap::{AllocError, BiHashMap, BiMapConfig};

fn main() -> Result<(), AllocError> {
    // Start as small as possible and let the map grow as it fills up.
    let config = BiMapConfig::new().initial_capacity(0).load_factor(1.0);
    let mut map = BiHashMap::with_config(config)?;

    for i in 0..32 {
        assert_eq!(map.len(), i);
        assert_eq!(map.put_by_primary(i, 32 + i)?, None);
        assert_eq!(map.len(), i + 1);
    }

    // Primary and secondary keys live in separate key spaces, so these are
    // all new mappings.
    for i in 0..32 {
        assert_eq!(map.len(), 32 + i);
        assert_eq!(map.put_by_secondary(i, 32 + i)?, None);
        assert_eq!(map.len(), 33 + i);
    }

    for i in 0..32 {
        assert_eq!(map.get_by_primary(&i), Some(&(i + 32)));
        assert_eq!(map.get_by_secondary(&i), Some(&(i + 32)));
        assert!(map.contains_primary(&i));
        assert!(map.contains_primary(&(i + 32)));
        assert!(map.contains_secondary(&i));
        assert!(map.contains_secondary(&(i + 32)));
    }
    println!(
        "{} mappings in {} buckets (load factor {})",
        map.len(),
        map.capacity(),
        map.load_factor(),
    );

    let mut map = BiHashMap::with_config(config)?;
    for i in 0..10 {
        assert_eq!(map.put_by_primary(i, i + 1000)?, None);
    }

    assert_eq!(map.remove_by_primary(&1), Some(1001));
    assert_eq!(map.remove_by_secondary(&1002), Some(2));

    let mut iter = map.iter();
    for _ in 0..8 {
        assert!(iter.has_next());
        let (primary, secondary) = iter.next().expect("has_next was true");
        assert_eq!(primary + 1000, *secondary);
    }
    assert!(!iter.has_next());

    println!("remaining mappings: {map:?}");
    Ok(())
}
