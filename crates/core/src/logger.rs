//! Logger capability used by the cache registry and interceptors.
//!
//! Two sinks ship with the crate: [`DisabledLogger`] drops every message and
//! [`JsonLogger`] emits one JSON record per call through `tracing`.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// Sink for cache diagnostics.
pub trait CacheLogger: Send + Sync {
    fn info(&self, message: &str, params: &[Value]);
    fn warn(&self, message: &str, params: &[Value]);
    fn error(&self, message: &str, params: &[Value]);
}

/// Logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledLogger;

impl CacheLogger for DisabledLogger {
    fn info(&self, _message: &str, _params: &[Value]) {}
    fn warn(&self, _message: &str, _params: &[Value]) {}
    fn error(&self, _message: &str, _params: &[Value]) {}
}

/// Structured logger emitting `{"pid": .., "message": .., "0": .., ...}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLogger;

impl JsonLogger {
    /// Builds the record for one log call.
    ///
    /// Extra parameters are stored under their position (`"0"`, `"1"`, ...).
    pub fn record(message: &str, params: &[Value]) -> Value {
        let mut record = Map::new();
        record.insert("pid".to_string(), Value::from(std::process::id()));
        record.insert("message".to_string(), Value::from(message));
        for (i, param) in params.iter().enumerate() {
            record.insert(i.to_string(), param.clone());
        }
        Value::Object(record)
    }
}

impl CacheLogger for JsonLogger {
    fn info(&self, message: &str, params: &[Value]) {
        tracing::info!(target: "memento", "{}", Self::record(message, params));
    }

    fn warn(&self, message: &str, params: &[Value]) {
        tracing::warn!(target: "memento", "{}", Self::record(message, params));
    }

    fn error(&self, message: &str, params: &[Value]) {
        tracing::error!(target: "memento", "{}", Self::record(message, params));
    }
}

/// Logger selection accepted by the registry.
#[derive(Clone)]
pub enum LoggerConfig {
    /// Silent sink.
    Disabled,
    /// Default structured sink ([`JsonLogger`]).
    Json,
    /// Caller-supplied implementation.
    Custom(Arc<dyn CacheLogger>),
}

impl LoggerConfig {
    /// Resolves the configuration into a logger instance.
    pub fn into_logger(self) -> Arc<dyn CacheLogger> {
        match self {
            Self::Disabled => Arc::new(DisabledLogger),
            Self::Json => Arc::new(JsonLogger),
            Self::Custom(logger) => logger,
        }
    }
}

impl From<bool> for LoggerConfig {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Json
        } else {
            Self::Disabled
        }
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Json => f.write_str("Json"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
