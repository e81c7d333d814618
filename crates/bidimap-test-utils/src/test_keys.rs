use bidimap::{buckets::Buckets, BiHashMap, BiMapConfig};
use std::hash::{BuildHasher, Hasher};
use test_strategy::Arbitrary;

/// Primary keys used by property tests. Kept small so that random operations
/// hit existing keys often.
pub type TestKey1 = u8;

/// Secondary keys used by property tests.
pub type TestKey2 = char;

#[cfg(feature = "default-hasher")]
pub type HashBuilder = bidimap::DefaultHashBuilder;

#[cfg(not(feature = "default-hasher"))]
pub type HashBuilder = std::hash::RandomState;

/// How a [`TestHashBuilder`] turns the value written to it into a hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Arbitrary)]
pub enum HashMode {
    /// The written value itself: an integer key hashes to itself.
    Identity,
    /// The written value, mixed so that all bits are used.
    Scrambled,
    /// The written value modulo a small number, so that many keys share a
    /// full hash and lookups must fall back to equality.
    Colliding(#[strategy(1u64..5)] u64),
}

/// A deterministic hash builder whose collisions can be controlled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Arbitrary)]
pub struct TestHashBuilder {
    pub mode: HashMode,
}

impl TestHashBuilder {
    pub const IDENTITY: Self = Self { mode: HashMode::Identity };

    pub fn colliding(modulus: u64) -> Self {
        Self { mode: HashMode::Colliding(modulus) }
    }
}

impl BuildHasher for TestHashBuilder {
    type Hasher = TestHasher;

    fn build_hasher(&self) -> TestHasher {
        TestHasher { mode: self.mode, state: 0 }
    }
}

#[derive(Clone, Debug)]
pub struct TestHasher {
    mode: HashMode,
    state: u64,
}

impl TestHasher {
    fn push(&mut self, value: u64) {
        // A single write leaves the state equal to the written value.
        self.state = self.state.wrapping_mul(31).wrapping_add(value);
    }
}

impl Hasher for TestHasher {
    fn finish(&self) -> u64 {
        match self.mode {
            HashMode::Identity => self.state,
            HashMode::Scrambled => {
                let mixed = self.state.wrapping_mul(0x9e37_79b9_7f4a_7c15);
                mixed ^ (mixed >> 29)
            }
            HashMode::Colliding(modulus) => self.state % modulus,
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(u64::from(byte));
        }
    }

    fn write_u8(&mut self, i: u8) {
        self.push(u64::from(i));
    }

    fn write_u16(&mut self, i: u16) {
        self.push(u64::from(i));
    }

    fn write_u32(&mut self, i: u32) {
        self.push(u64::from(i));
    }

    fn write_u64(&mut self, i: u64) {
        self.push(i);
    }

    fn write_usize(&mut self, i: usize) {
        self.push(i as u64);
    }
}

/// Map constructors shared by the tests.
pub trait MakeMap: Sized {
    /// Builds an empty map from `config` with the given hash builder on
    /// both sides.
    fn make_with(config: BiMapConfig, hasher: TestHashBuilder) -> Self;
}

impl<B: Buckets> MakeMap for BiHashMap<TestKey1, TestKey2, TestHashBuilder, B> {
    fn make_with(config: BiMapConfig, hasher: TestHashBuilder) -> Self {
        BiHashMap::with_config_and_hashers(config, hasher, hasher)
            .expect("a small map can be allocated")
    }
}
