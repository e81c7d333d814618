//! An insertion-ordered bidirectional hash map.
//!
//! A [`BiHashMap<K1, K2>`](BiHashMap) associates primary keys with secondary
//! keys, one to one. Either key can be used to look up the other in O(1)
//! average time, and iteration visits mappings in the order they were first
//! inserted.
//!
//! ```
//! # #[cfg(feature = "default-hasher")] {
//! use bidimap::{BiHashMap, BiMapConfig};
//!
//! let config = BiMapConfig::new().initial_capacity(32).load_factor(0.5);
//! let mut hosts = BiHashMap::with_config(config)?;
//!
//! hosts.put_by_primary("gateway", [10, 0, 0, 1])?;
//! hosts.put_by_primary("printer", [10, 0, 0, 7])?;
//!
//! assert_eq!(hosts.get_by_primary("printer"), Some(&[10, 0, 0, 7]));
//! assert_eq!(hosts.get_by_secondary(&[10, 0, 0, 1]), Some(&"gateway"));
//!
//! // Moving an address to another host takes it away from the first one.
//! hosts.put_by_secondary([10, 0, 0, 7], "scanner")?;
//! assert!(!hosts.contains_primary("printer"));
//!
//! let pairs: Vec<_> = hosts.iter().collect();
//! assert_eq!(
//!     pairs,
//!     [(&"gateway", &[10, 0, 0, 1]), (&"scanner", &[10, 0, 0, 7])],
//! );
//! # }
//! # Ok::<(), bidimap::AllocError>(())
//! ```
//!
//! # Allocation failures
//!
//! Constructors and insertions return [`AllocError`] instead of aborting when
//! memory cannot be obtained. A failed insertion leaves the map as it was.
//!
//! # Bucket structures
//!
//! Collisions are resolved with doubly linked chains by default. The
//! [`buckets`] module also offers AVL trees per bucket; see there for the
//! trade-off.
//!
//! # Features
//!
//! * `std` (default): links the standard library. Without it the crate is
//!   `no_std` and only needs `alloc`.
//! * `default-hasher` (default): uses [foldhash](https://docs.rs/foldhash)
//!   as the default hash builder and enables [`BiHashMap::try_new`] and
//!   [`BiHashMap::with_config`].

#![no_std]
#![warn(missing_docs)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod bi_hash_map;
pub mod buckets;
pub mod config;
pub mod errors;
#[doc(hidden)]
pub mod internal;
mod support;

pub use bi_hash_map::BiHashMap;
pub use config::BiMapConfig;
pub use errors::AllocError;
pub use support::hash_builder::DefaultHashBuilder;
