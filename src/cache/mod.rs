//! Cache module for storing API responses in the storage medium
//!
//! `CacheStore` keeps each value alongside its creation time under a `CACHE.`
//! prefixed key and filters expired entries at read time. The `cached` family
//! of decorators put an asynchronous producer behind that store so it only runs
//! on a miss. Every cache fault reads as a miss; only producer errors surface.

mod clock;
mod operator;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use operator::{cached, cached_stream, CachePolicy, Cached};
pub use store::{CacheStore, CACHE_KEY_PREFIX};
