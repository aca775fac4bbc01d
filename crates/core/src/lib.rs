//! Core contracts for the memento caching aspect.
//!
//! This crate holds the pure pieces: the [`cache::Store`] capability set,
//! cache errors, key generation, the default cacheability predicate and the
//! [`logger::CacheLogger`] sinks. The registry, the in-memory store and the
//! interception protocol live in the `memento` crate.

pub mod cache;
pub mod logger;
