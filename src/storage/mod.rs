//! Storage Engine
//!
//! Ordered in-memory index: arena skip list, recency cache and TTL expiry.

mod expiry;
mod lru;
mod node;
mod skiplist;
mod sweeper;

pub use expiry::ExpirationPolicy;
pub use lru::LruCache;
pub use skiplist::{InsertOutcome, SkipList};
pub use sweeper::ExpirySweeper;
