use bidimap::{
    buckets::{Buckets, ChainBuckets, TreeBuckets},
    config::{MINIMUM_INITIAL_CAPACITY, MINIMUM_LOAD_FACTOR},
    AllocError, BiHashMap, BiMapConfig,
};
use bidimap_test_utils::{
    eq_props::{assert_eq_props, assert_ne_props},
    naive_map::{pair_permutation_strategy, NaiveMap},
    test_keys::{HashBuilder, MakeMap, TestHashBuilder, TestKey1, TestKey2},
};
use proptest::prelude::*;
use std::hash::BuildHasher;
use test_strategy::{proptest, Arbitrary};

type ChainMap = BiHashMap<TestKey1, TestKey2, TestHashBuilder, ChainBuckets>;
type TreeMap = BiHashMap<TestKey1, TestKey2, TestHashBuilder, TreeBuckets>;

type IdentityMap<B> = BiHashMap<u32, u32, TestHashBuilder, B>;

fn try_identity_map<B: Buckets>(
    config: BiMapConfig,
) -> Result<IdentityMap<B>, AllocError> {
    BiHashMap::with_config_and_hashers(
        config,
        TestHashBuilder::IDENTITY,
        TestHashBuilder::IDENTITY,
    )
}

fn identity_map<B: Buckets>(config: BiMapConfig) -> IdentityMap<B> {
    try_identity_map(config).expect("map allocated")
}

fn chain_map() -> ChainMap {
    ChainMap::make_with(BiMapConfig::new(), TestHashBuilder::IDENTITY)
}

fn tree_map() -> TreeMap {
    TreeMap::make_with(BiMapConfig::new(), TestHashBuilder::IDENTITY)
}

fn check_scenario<B: Buckets + Clone>() {
    // Capacity 0 rounds up to the minimum; every integer hashes to itself.
    let config = BiMapConfig::new().initial_capacity(0).load_factor(1.0);
    let mut map = identity_map::<B>(config);
    assert_eq!(map.capacity(), MINIMUM_INITIAL_CAPACITY);

    for i in 0..32 {
        assert_eq!(map.len(), i as usize);
        assert_eq!(map.put_by_primary(i, 32 + i), Ok(None));
        map.validate().expect("map should be valid");
    }
    assert_eq!(map.len(), 32);
    // 32 mappings at load factor 1.0 fit exactly in 32 buckets.
    assert_eq!(map.capacity(), 32);

    let mut by_secondary = map.clone();

    assert_eq!(map.put_by_primary(5, 64), Ok(Some(37)));
    assert_eq!(map.len(), 32);
    assert_eq!(map.get_by_primary(&5), Some(&64));
    assert_eq!(map.get_by_secondary(&64), Some(&5));
    assert_eq!(map.get_by_secondary(&37), None);
    map.validate().expect("map should be valid");

    // Claiming primary key 5 for secondary key 64 evicts (5, 37). Secondary
    // key 64 had no primary key before, so nothing is returned.
    assert_eq!(by_secondary.put_by_secondary(64, 5), Ok(None));
    assert_eq!(by_secondary.len(), 32);
    assert_eq!(by_secondary.get_by_primary(&5), Some(&64));
    assert_eq!(by_secondary.get_by_secondary(&37), None);
    by_secondary.validate().expect("map should be valid");

    assert_eq_props(&map, &by_secondary);

    // The update kept (5, 64) in place; the eviction moved it to the end.
    assert_eq!(map.iter().nth(5), Some((&5, &64)));
    assert_eq!(by_secondary.iter().last(), Some((&5, &64)));
}

#[test]
fn test_scenario_chain() {
    check_scenario::<ChainBuckets>();
}

#[test]
fn test_scenario_tree() {
    check_scenario::<TreeBuckets>();
}

fn check_smoke<B: Buckets>() {
    let config = BiMapConfig::new().initial_capacity(0).load_factor(1.0);
    let mut map = identity_map::<B>(config);

    for i in 0..32 {
        assert_eq!(map.put_by_primary(i, 32 + i), Ok(None));
    }
    // Primary and secondary keys are separate key spaces.
    for i in 0..32 {
        assert_eq!(map.len(), 32 + i as usize);
        assert_eq!(map.put_by_secondary(i, 32 + i), Ok(None));
    }
    assert_eq!(map.len(), 64);
    map.validate().expect("map should be valid");

    for i in 0..32 {
        assert_eq!(map.get_by_primary(&i), Some(&(i + 32)));
        assert_eq!(map.get_by_secondary(&i), Some(&(i + 32)));
        assert!(map.contains_primary(&i));
        assert!(map.contains_primary(&(i + 32)));
        assert!(map.contains_secondary(&i));
        assert!(map.contains_secondary(&(i + 32)));
    }

    let mut map = identity_map::<B>(config);
    for i in 0..10 {
        assert_eq!(map.put_by_primary(i, i + 1000), Ok(None));
    }
    assert_eq!(map.remove_by_primary(&1), Some(1001));
    assert_eq!(map.remove_by_secondary(&1002), Some(2));
    map.validate().expect("map should be valid");

    let mut iter = map.iter();
    for expected in [0, 3, 4, 5, 6, 7, 8, 9] {
        assert!(iter.has_next());
        let (primary, secondary) = iter.next().expect("has_next was true");
        assert_eq!(*primary, expected);
        assert_eq!(primary + 1000, *secondary);
    }
    assert!(!iter.has_next());
    assert_eq!(iter.next(), None);
}

#[test]
fn test_smoke_chain() {
    check_smoke::<ChainBuckets>();
}

#[test]
fn test_smoke_tree() {
    check_smoke::<TreeBuckets>();
}

#[test]
fn test_update_keeps_position() {
    let mut map = chain_map();
    assert_eq!(map.put_by_primary(1, 'a'), Ok(None));
    assert_eq!(map.put_by_primary(2, 'b'), Ok(None));
    assert_eq!(map.put_by_primary(3, 'c'), Ok(None));

    assert_eq!(map.put_by_primary(2, 'x'), Ok(Some('b')));
    assert_eq!(map.len(), 3);
    assert_eq!(map.get_by_primary(&2), Some(&'x'));
    assert_eq!(map.get_by_secondary(&'x'), Some(&2));
    assert!(!map.contains_secondary(&'b'));

    assert_eq!(map.put_by_secondary('c', 9), Ok(Some(3)));
    assert_eq!(map.get_by_secondary(&'c'), Some(&9));
    assert!(!map.contains_primary(&3));

    // Re-putting an existing pair is an update that returns the same key.
    assert_eq!(map.put_by_primary(1, 'a'), Ok(Some('a')));
    assert_eq!(map.put_by_secondary('a', 1), Ok(Some(1)));

    let pairs: Vec<_> = map.iter().collect();
    assert_eq!(pairs, [(&1, &'a'), (&2, &'x'), (&9, &'c')]);
    map.validate().expect("map should be valid");
}

#[test]
fn test_put_evicts_conflicting_mapping() {
    let mut map = tree_map();
    map.put_by_primary(1, 'a').unwrap();
    map.put_by_primary(2, 'b').unwrap();
    map.put_by_primary(3, 'c').unwrap();

    // Primary 1 takes 'b' from primary 2, which disappears.
    assert_eq!(map.put_by_primary(1, 'b'), Ok(Some('a')));
    assert_eq!(map.len(), 2);
    assert!(!map.contains_primary(&2));
    assert!(!map.contains_secondary(&'a'));
    assert_eq!(map.get_by_secondary(&'b'), Some(&1));

    // A new secondary key claiming primary 3 evicts (3, 'c').
    assert_eq!(map.put_by_secondary('z', 3), Ok(None));
    assert_eq!(map.len(), 2);
    assert!(!map.contains_secondary(&'c'));

    let pairs: Vec<_> = map.iter().collect();
    assert_eq!(pairs, [(&1, &'b'), (&3, &'z')]);
    map.validate().expect("map should be valid");
}

#[test]
fn test_remove_cleanup() {
    let mut map = chain_map();
    for (key1, key2) in [(1, 'a'), (2, 'b'), (3, 'c')] {
        map.put_by_primary(key1, key2).unwrap();
    }

    assert_eq!(map.remove_by_primary(&7), None);
    assert_eq!(map.remove_by_secondary(&'q'), None);
    assert_eq!(map.len(), 3);

    assert_eq!(map.remove_by_primary(&1), Some('a'));
    assert!(!map.contains_primary(&1));
    assert!(!map.contains_secondary(&'a'));
    assert_eq!(map.remove_pair_by_secondary(&'c'), Some((3, 'c')));
    assert_eq!(map.remove_pair_by_primary(&2), Some((2, 'b')));
    assert!(map.is_empty());
    assert_eq!(map.iter().next(), None);
    map.validate().expect("map should be valid");

    // Freed slots are reused.
    map.put_by_secondary('d', 4).unwrap();
    assert_eq!(map.iter().collect::<Vec<_>>(), [(&4, &'d')]);
    map.validate().expect("map should be valid");
}

fn check_growth<B: Buckets>() {
    let config = BiMapConfig::new().load_factor(0.5);
    let mut map = identity_map::<B>(config);
    let mut capacities = vec![map.capacity()];

    for i in 0..1000 {
        map.put_by_primary(i, i * 7 + 3).unwrap();
        let capacity = map.capacity();
        assert!(capacity.is_power_of_two());
        assert!(map.len() as f64 <= capacity as f64 * 0.5);
        if capacities.last() != Some(&capacity) {
            capacities.push(capacity);
            map.validate().expect("map should be valid after growing");
        }
    }

    assert_eq!(capacities, [8, 16, 32, 64, 128, 256, 512, 1024, 2048]);
    for i in 0..1000 {
        assert_eq!(map.get_by_primary(&i), Some(&(i * 7 + 3)));
        assert_eq!(map.get_by_secondary(&(i * 7 + 3)), Some(&i));
    }
    // Growth does not change iteration order.
    assert!(map.iter().map(|(k1, _)| *k1).eq(0..1000));
}

#[test]
fn test_growth_chain() {
    check_growth::<ChainBuckets>();
}

#[test]
fn test_growth_tree() {
    check_growth::<TreeBuckets>();
}

#[test]
fn test_full_collisions() {
    // Every key hashes to 0, so each table is a single bucket.
    let mut chain =
        ChainMap::make_with(BiMapConfig::new(), TestHashBuilder::colliding(1));
    let mut tree =
        TreeMap::make_with(BiMapConfig::new(), TestHashBuilder::colliding(1));

    for key1 in 0..=200u8 {
        let key2 = char::from(b'!' + key1 % 90);
        assert_eq!(
            chain.put_by_primary(key1, key2),
            tree.put_by_primary(key1, key2)
        );
    }
    chain.validate().expect("chain map should be valid");
    tree.validate().expect("tree map should be valid");
    assert_eq!(chain.len(), 90);
    assert!(chain.iter().eq(tree.iter()));

    for key1 in (0..=200u8).step_by(3) {
        assert_eq!(
            chain.remove_by_primary(&key1),
            tree.remove_by_primary(&key1)
        );
        tree.validate().expect("tree map should be valid");
    }
    chain.validate().expect("chain map should be valid");
    assert!(chain.iter().eq(tree.iter()));
}

#[test]
fn test_allocation_failure() {
    let config = BiMapConfig::new().initial_capacity(usize::MAX);
    let error = try_identity_map::<ChainBuckets>(config).unwrap_err();
    assert_eq!(error, AllocError::CapacityOverflow { requested: usize::MAX });

    // A power of two, but far too large for the allocator to accept.
    let config = BiMapConfig::new().initial_capacity(usize::MAX / 2 + 1);
    let error = try_identity_map::<TreeBuckets>(config).unwrap_err();
    assert!(matches!(error, AllocError::Reserve(_)), "{error:?}");
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn test_config_normalization() {
    for (load_factor, expected) in [
        (0.0, MINIMUM_LOAD_FACTOR),
        (-3.0, MINIMUM_LOAD_FACTOR),
        (f32::NAN, MINIMUM_LOAD_FACTOR),
        (0.9, 0.9),
    ] {
        let config = BiMapConfig::new().load_factor(load_factor);
        let map = ChainMap::make_with(config, TestHashBuilder::IDENTITY);
        assert_eq!(map.load_factor(), expected);
    }

    for (initial_capacity, expected) in [(0, 8), (8, 8), (9, 16), (100, 128)] {
        let config = BiMapConfig::new().initial_capacity(initial_capacity);
        let map = TreeMap::make_with(config, TestHashBuilder::IDENTITY);
        assert_eq!(map.capacity(), expected);
    }
}

#[test]
fn test_iterators() {
    let mut map = chain_map();
    for (key1, key2) in [(30, 'x'), (10, 'y'), (20, 'z')] {
        map.put_by_primary(key1, key2).unwrap();
    }

    let mut iter = map.iter();
    assert_eq!(iter.len(), 3);
    assert_eq!(iter.next(), Some((&30, &'x')));
    assert_eq!(iter.len(), 2);
    let rest: Vec<_> = iter.clone().collect();
    assert_eq!(rest, [(&10, &'y'), (&20, &'z')]);
    assert_eq!(iter.count(), 2);

    let borrowed: Vec<_> = (&map).into_iter().collect();
    assert_eq!(borrowed, [(&30, &'x'), (&10, &'y'), (&20, &'z')]);

    let mut owned = map.clone().into_iter();
    assert_eq!(owned.len(), 3);
    assert_eq!(owned.next(), Some((30, 'x')));
    assert_eq!(owned.collect::<Vec<_>>(), [(10, 'y'), (20, 'z')]);

    assert_eq!(format!("{map:?}"), "{30: 'x', 10: 'y', 20: 'z'}");
}

#[test]
fn test_clone_is_independent() {
    let mut map = tree_map();
    map.put_by_primary(1, 'a').unwrap();

    let mut clone = map.clone();
    clone.put_by_primary(2, 'b').unwrap();
    clone.remove_by_primary(&1);

    assert_eq!(map.iter().collect::<Vec<_>>(), [(&1, &'a')]);
    assert_eq!(clone.iter().collect::<Vec<_>>(), [(&2, &'b')]);
    map.validate().expect("map should be valid");
    clone.validate().expect("clone should be valid");
}

#[cfg(feature = "default-hasher")]
#[test]
fn test_default_constructors() {
    let mut map = BiHashMap::try_new().expect("map allocated");
    map.put_by_primary(String::from("alpha"), 1u32).unwrap();
    map.put_by_secondary(2, String::from("beta")).unwrap();

    // Borrowed forms work for lookups.
    assert_eq!(map.get_by_primary("alpha"), Some(&1));
    assert_eq!(map.get_by_secondary(&2), Some(&String::from("beta")));
    assert_eq!(map.remove_by_primary("beta"), Some(2));
    assert_eq!(map.capacity(), MINIMUM_INITIAL_CAPACITY);
    map.validate().expect("map should be valid");

    let config = BiMapConfig::new().initial_capacity(64);
    let map = BiHashMap::<u8, u8>::with_config(config).expect("map allocated");
    assert_eq!(map.capacity(), 64);
}

#[test]
fn test_permutation_eq_examples() {
    let mut map1 = chain_map();
    let mut map2 =
        ChainMap::make_with(BiMapConfig::new(), TestHashBuilder::colliding(2));

    // Two empty maps are equal.
    assert_eq!(map1, map2);

    map1.put_by_primary(0, 'a').unwrap();
    assert_ne_props(&map1, &map2);

    map2.put_by_secondary('a', 0).unwrap();
    assert_eq_props(&map1, &map2);

    {
        // Same primary key, different secondary key.
        let mut map1 = map1.clone();
        map1.put_by_primary(1, 'b').unwrap();
        let mut map2 = map2.clone();
        map2.put_by_primary(1, 'c').unwrap();
        assert_ne_props(&map1, &map2);
    }

    {
        // Same secondary key, different primary key.
        let mut map1 = map1.clone();
        map1.put_by_primary(1, 'b').unwrap();
        let mut map2 = map2.clone();
        map2.put_by_primary(2, 'b').unwrap();
        assert_ne_props(&map1, &map2);
    }
}

fn key1_strategy() -> impl Strategy<Value = TestKey1> {
    // A small key space makes updates and evictions common.
    0u8..48
}

fn key2_strategy() -> impl Strategy<Value = TestKey2> {
    prop::char::range('a', 'z')
}

#[derive(Debug, Arbitrary)]
enum Operation {
    // Make puts a bit more common to try and fill up the map.
    #[weight(3)]
    PutByPrimary(
        #[strategy(key1_strategy())] TestKey1,
        #[strategy(key2_strategy())] TestKey2,
    ),
    #[weight(3)]
    PutBySecondary(
        #[strategy(key2_strategy())] TestKey2,
        #[strategy(key1_strategy())] TestKey1,
    ),
    GetByPrimary(#[strategy(key1_strategy())] TestKey1),
    GetBySecondary(#[strategy(key2_strategy())] TestKey2),
    RemoveByPrimary(#[strategy(key1_strategy())] TestKey1),
    RemoveBySecondary(#[strategy(key2_strategy())] TestKey2),
}

#[derive(Debug, Arbitrary)]
struct TestConfig {
    #[strategy(0usize..64)]
    initial_capacity: usize,
    #[strategy(0.0f32..1.5)]
    load_factor: f32,
}

impl TestConfig {
    fn to_config(&self) -> BiMapConfig {
        BiMapConfig::new()
            .initial_capacity(self.initial_capacity)
            .load_factor(self.load_factor)
    }
}

fn run_ops<S: BuildHasher, B: Buckets>(
    mut map: BiHashMap<TestKey1, TestKey2, S, B>,
    ops: Vec<Operation>,
) {
    let mut naive_map = NaiveMap::new();

    for op in ops {
        match op {
            Operation::PutByPrimary(key1, key2) => {
                let map_res = map.put_by_primary(key1, key2).unwrap();
                let naive_res = naive_map.put_by_primary(key1, key2);
                assert_eq!(map_res, naive_res);
                map.validate().expect("map should be valid");
            }
            Operation::PutBySecondary(key2, key1) => {
                let map_res = map.put_by_secondary(key2, key1).unwrap();
                let naive_res = naive_map.put_by_secondary(key2, key1);
                assert_eq!(map_res, naive_res);
                map.validate().expect("map should be valid");
            }
            Operation::GetByPrimary(key1) => {
                assert_eq!(
                    map.get_by_primary(&key1),
                    naive_map.get_by_primary(key1)
                );
                assert_eq!(
                    map.contains_primary(&key1),
                    naive_map.get_by_primary(key1).is_some()
                );
            }
            Operation::GetBySecondary(key2) => {
                assert_eq!(
                    map.get_by_secondary(&key2),
                    naive_map.get_by_secondary(key2)
                );
                assert_eq!(
                    map.contains_secondary(&key2),
                    naive_map.get_by_secondary(key2).is_some()
                );
            }
            Operation::RemoveByPrimary(key1) => {
                let map_res = map.remove_by_primary(&key1);
                let naive_res = naive_map.remove_by_primary(key1);
                assert_eq!(map_res, naive_res);
                map.validate().expect("map should be valid");
            }
            Operation::RemoveBySecondary(key2) => {
                let map_res = map.remove_by_secondary(&key2);
                let naive_res = naive_map.remove_by_secondary(key2);
                assert_eq!(map_res, naive_res);
                map.validate().expect("map should be valid");
            }
        }

        assert_eq!(map.len(), naive_map.len());
        assert_eq!(map.is_empty(), naive_map.is_empty());

        // Iteration matches the oracle, including order.
        assert!(map.iter().eq(naive_map.iter()));
        assert_eq!(map.iter().len(), naive_map.len());

        // Every mapping is reachable from both sides.
        for (key1, key2) in &map {
            assert_eq!(map.get_by_primary(key1), Some(key2));
            assert_eq!(map.get_by_secondary(key2), Some(key1));
        }
    }
}

#[proptest(cases = 32)]
fn proptest_ops_chain(
    config: TestConfig,
    hasher: TestHashBuilder,
    #[strategy(prop::collection::vec(any::<Operation>(), 0..512))] ops: Vec<
        Operation,
    >,
) {
    run_ops(ChainMap::make_with(config.to_config(), hasher), ops);
}

#[proptest(cases = 32)]
fn proptest_ops_tree(
    config: TestConfig,
    hasher: TestHashBuilder,
    #[strategy(prop::collection::vec(any::<Operation>(), 0..512))] ops: Vec<
        Operation,
    >,
) {
    run_ops(TreeMap::make_with(config.to_config(), hasher), ops);
}

#[proptest(cases = 16)]
fn proptest_ops_random_state(
    config: TestConfig,
    #[strategy(prop::collection::vec(any::<Operation>(), 0..512))] ops: Vec<
        Operation,
    >,
) {
    let map: BiHashMap<_, _, _, TreeBuckets> =
        BiHashMap::with_config_and_hashers(
            config.to_config(),
            HashBuilder::default(),
            HashBuilder::default(),
        )
        .unwrap();
    run_ops(map, ops);
}

#[proptest(cases = 64)]
fn proptest_permutation_eq(
    #[strategy(pair_permutation_strategy(0..128))] pairs: (
        Vec<(TestKey1, TestKey2)>,
        Vec<(TestKey1, TestKey2)>,
    ),
    hasher: TestHashBuilder,
) {
    let (pairs1, pairs2) = pairs;
    let mut map1 = ChainMap::make_with(BiMapConfig::new(), hasher);
    let mut map2 = ChainMap::make_with(BiMapConfig::new(), hasher);

    for (key1, key2) in pairs1 {
        prop_assert_eq!(map1.put_by_primary(key1, key2), Ok(None));
    }
    for (key1, key2) in pairs2 {
        prop_assert_eq!(map2.put_by_secondary(key2, key1), Ok(None));
    }

    assert_eq_props(map1, map2);
}
