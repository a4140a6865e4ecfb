#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

mod cache;
mod list;
mod release;

pub use cache::LruCache;
pub use release::Release;

#[cfg(not(feature = "ahash"))]
type RandomState = std::hash::RandomState;
#[cfg(feature = "ahash")]
type RandomState = ahash::RandomState;

/// Errors surfaced at cache construction.
///
/// The four cache operations never return an error: absent keys, already
/// present keys, and empty removals are ordinary outcomes reported through
/// their `bool`/`Option` results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested capacity was zero. The cache needs room for at least
    /// one live entry.
    #[error("cache capacity must be greater than zero")]
    InvalidCapacity,
}
