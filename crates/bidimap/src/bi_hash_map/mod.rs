//! A hash map where primary and secondary keys map to each other 1:1.
//!
//! See [`BiHashMap`] for details.

pub(crate) mod imp;
mod iter;
mod tables;

pub use imp::BiHashMap;
pub use iter::{IntoIter, Iter};
