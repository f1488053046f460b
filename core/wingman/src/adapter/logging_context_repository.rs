//! コンテキストの read / write をログに記録する ContextRepository のラッパ

use crate::ports::outbound::ContextRepository;
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use serde_json::Value;
use std::sync::Arc;

pub struct LoggingContextRepository {
    inner: Arc<dyn ContextRepository>,
    log: Arc<dyn Log>,
}

impl LoggingContextRepository {
    pub fn new(inner: Arc<dyn ContextRepository>, log: Arc<dyn Log>) -> Self {
        Self { inner, log }
    }

    fn record(&self, level: LogLevel, message: &str, operation: &str, key: &str) -> LogRecord {
        LogRecord::new(level, message)
            .layer("adapter")
            .kind("context")
            .field("operation", operation)
            .field("key", key)
    }
}

impl ContextRepository for LoggingContextRepository {
    fn read(&self, key: &str) -> Result<Option<Value>, Error> {
        match self.inner.read(key) {
            Ok(v) => {
                let turns = v.as_ref().and_then(Value::as_array).map_or(0, Vec::len);
                self.log.emit(
                    self.record(LogLevel::Debug, "context read", "read", key)
                        .field("found", v.is_some())
                        .field("turns", turns),
                );
                Ok(v)
            }
            Err(e) => {
                self.log.emit(
                    self.record(LogLevel::Warn, "context read failed", "read", key)
                        .field("error", e.to_string()),
                );
                Err(e)
            }
        }
    }

    fn write(&self, key: &str, value: &Value) -> Result<(), Error> {
        let turns = value.as_array().map_or(0, Vec::len);
        match self.inner.write(key, value) {
            Ok(()) => {
                self.log.emit(
                    self.record(LogLevel::Debug, "context write", "write", key)
                        .field("turns", turns),
                );
                Ok(())
            }
            Err(e) => {
                self.log.emit(
                    self.record(LogLevel::Warn, "context write failed", "write", key)
                        .field("error", e.to_string()),
                );
                Err(e)
            }
        }
    }
}
