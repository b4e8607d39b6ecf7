// SQLite-backed key-value storage
// Where the tried/saved selections live between sessions

pub mod cache;

pub use cache::KvCache;
