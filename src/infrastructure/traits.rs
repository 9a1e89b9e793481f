//! I/O boundary traits for testability
//!
//! These traits abstract the collaborators of the listing use case (where model
//! data comes from, where log events go), allowing services to be tested with
//! mock implementations.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::PathBuf;
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};

use crate::util::path::expand_env_vars;

/// Readable model data obtained from a data source.
pub type ModelStream = Box<dyn Read + Send>;

/// Source of raw model data, addressed by an opaque locator.
pub trait DataSource: Send + Sync {
    /// Open the locator for reading.
    ///
    /// An absent locator and a locator that exists but cannot be read are both errors.
    fn open(&self, locator: &str) -> io::Result<ModelStream>;
}

/// Severity of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(label)
    }
}

/// Fire-and-forget logging sink.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Opens locators as filesystem paths.
///
/// `~`, `$VAR` and `${VAR}` in the locator are expanded.
#[derive(Debug, Default)]
pub struct FileDataSource;

impl FileDataSource {
    fn resolve(locator: &str) -> PathBuf {
        PathBuf::from(expand_env_vars(locator))
    }
}

impl DataSource for FileDataSource {
    fn open(&self, locator: &str) -> io::Result<ModelStream> {
        let path = Self::resolve(locator);
        let metadata = std::fs::metadata(&path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }
        let file = File::open(&path)?;
        Ok(Box::new(file))
    }
}

/// Opens `.json` files only; any other locator is rejected.
#[derive(Debug, Default)]
pub struct JsonFileDataSource {
    files: FileDataSource,
}

impl DataSource for JsonFileDataSource {
    fn open(&self, locator: &str) -> io::Result<ModelStream> {
        if !locator.ends_with(".json") {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a .json locator: {locator}"),
            ));
        }
        self.files.open(locator)
    }
}

/// In-memory content store keyed by locator.
#[derive(Debug, Default)]
pub struct MemoryDataSource {
    store: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register content under a virtual locator, replacing earlier content.
    pub fn register(&self, locator: impl Into<String>, content: impl Into<Vec<u8>>) {
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        store.insert(locator.into(), content.into());
    }

    pub fn contains(&self, locator: &str) -> bool {
        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        store.contains_key(locator)
    }
}

impl DataSource for MemoryDataSource {
    fn open(&self, locator: &str) -> io::Result<ModelStream> {
        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        let content = store.get(locator).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no content registered for {locator}"),
            )
        })?;
        Ok(Box::new(Cursor::new(content)))
    }
}

/// Forwards log events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!(target: "cadtree::listing", "{message}"),
            LogLevel::Debug => tracing::debug!(target: "cadtree::listing", "{message}"),
            LogLevel::Info => tracing::info!(target: "cadtree::listing", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "cadtree::listing", "{message}"),
            LogLevel::Error => tracing::error!(target: "cadtree::listing", "{message}"),
        }
    }
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: LogLevel, _message: &str) {}
}

/// A recorded log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Messages logged at exactly `level`.
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message)
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(LogEntry {
                level,
                message: message.to_string(),
            });
    }
}
