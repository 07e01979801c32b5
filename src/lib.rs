//! skipcache - Ordered In-Memory Key-Value Index
//!
//! A probabilistic skip list with a bounded LRU read cache, per-entry
//! time-to-live expiry and a line-oriented text dump format. Intended as the
//! indexing/memtable layer of a larger key-value engine.
//!
//! ```rust
//! use skipcache::{Config, InsertOutcome, SkipList};
//! use std::time::Duration;
//!
//! let list: SkipList<u32, String> = SkipList::new(
//!     Config::default().with_max_level(6).with_ttl(Duration::from_secs(2)),
//! )
//! .unwrap();
//!
//! assert_eq!(list.insert(3, "bbb".into()), InsertOutcome::Inserted);
//! assert_eq!(list.insert(3, "ccc".into()), InsertOutcome::AlreadyExists);
//! assert_eq!(list.search(&3), Some("bbb".to_string()));
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod persistence;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use metrics::{Metrics, Op};
pub use persistence::{LineCodec, LoadReport};
pub use storage::{ExpirationPolicy, ExpirySweeper, InsertOutcome, LruCache, SkipList};
