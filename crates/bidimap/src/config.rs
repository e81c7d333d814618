//! Construction-time configuration for [`BiHashMap`](crate::BiHashMap).

use crate::errors::AllocError;

/// The smallest number of buckets a map is ever created with.
pub const MINIMUM_INITIAL_CAPACITY: usize = 8;

/// Load factors below this value are raised to it.
pub const MINIMUM_LOAD_FACTOR: f32 = 0.2;

/// The load factor used when none is configured.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Sizing options for a [`BiHashMap`](crate::BiHashMap).
///
/// Values are normalized when the map is built, not when they are set: the
/// initial capacity is rounded up to a power of two no smaller than
/// [`MINIMUM_INITIAL_CAPACITY`], and the load factor is raised to at least
/// [`MINIMUM_LOAD_FACTOR`].
///
/// # Examples
///
/// ```
/// use bidimap::BiMapConfig;
///
/// let config = BiMapConfig::new().initial_capacity(100).load_factor(0.1);
/// assert_eq!(config.bucket_count(), Ok(128));
/// assert_eq!(config.effective_load_factor(), 0.2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiMapConfig {
    initial_capacity: usize,
    load_factor: f32,
}

impl BiMapConfig {
    /// Creates a configuration with the default sizing.
    pub const fn new() -> Self {
        Self {
            initial_capacity: MINIMUM_INITIAL_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }

    /// Sets the minimum number of buckets to start with.
    pub fn initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Sets the ratio of mappings to buckets above which the map grows.
    pub fn load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Returns the number of buckets a map built from this configuration
    /// starts with.
    pub fn bucket_count(&self) -> Result<usize, AllocError> {
        self.initial_capacity
            .max(MINIMUM_INITIAL_CAPACITY)
            .checked_next_power_of_two()
            .ok_or(AllocError::CapacityOverflow {
                requested: self.initial_capacity,
            })
    }

    /// Returns the load factor a map built from this configuration uses.
    ///
    /// A NaN load factor is treated as the minimum.
    pub fn effective_load_factor(&self) -> f32 {
        // f32::max returns the non-NaN operand.
        self.load_factor.max(MINIMUM_LOAD_FACTOR)
    }
}

impl Default for BiMapConfig {
    fn default() -> Self {
        Self::new()
    }
}
