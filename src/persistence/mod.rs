//! Persistence Module
//!
//! Plain-text dump and reload of the ordered index.

mod dump;

pub use dump::{LineCodec, LoadReport};
