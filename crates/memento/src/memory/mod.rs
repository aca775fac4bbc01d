//! In-memory reference store.
//!
//! Provides a thread-safe, bounded store with TTL support for
//! single-process deployments. This is the store the registry falls back to
//! when nothing else has been registered.

mod store;

pub use store::{MemoryStore, DEFAULT_MAX_ENTRIES};
