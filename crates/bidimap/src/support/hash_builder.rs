/// Default hasher for [`BiHashMap`](crate::BiHashMap).
#[cfg(feature = "default-hasher")]
pub type DefaultHashBuilder = foldhash::fast::RandomState;

#[cfg(not(feature = "default-hasher"))]
mod dummy {
    use core::hash::{BuildHasher, Hasher};

    /// Dummy default hasher, present so the type parameter default exists
    /// without the `default-hasher` feature. It cannot be constructed.
    #[derive(Clone, Copy, Debug)]
    pub enum DefaultHashBuilder {}

    impl BuildHasher for DefaultHashBuilder {
        type Hasher = Self;

        fn build_hasher(&self) -> Self::Hasher {
            match *self {}
        }
    }

    impl Hasher for DefaultHashBuilder {
        fn write(&mut self, _bytes: &[u8]) {}

        fn finish(&self) -> u64 {
            0
        }
    }
}

#[cfg(not(feature = "default-hasher"))]
pub use dummy::DefaultHashBuilder;
