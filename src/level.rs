//! Severities and the shared, mutable level threshold.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Record severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    /// Logs like an error, and panics after logging when the pipeline was
    /// built in development mode.
    DPanic,
    /// Logs, then always panics.
    Panic,
    /// Logs, then terminates the process.
    Fatal,
}

impl Level {
    /// Lowercase text, as rendered by the encoders.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::DPanic => "dpanic",
            Level::Panic => "panic",
            Level::Fatal => "fatal",
        }
    }

    fn from_u8(value: u8) -> Level {
        match value {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warn,
            3 => Level::Error,
            4 => Level::DPanic,
            5 => Level::Panic,
            _ => Level::Fatal,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "dpanic" => Ok(Level::DPanic),
            "panic" => Ok(Level::Panic),
            "fatal" => Ok(Level::Fatal),
            _ => Err(Error::ParseLevel(s.to_string())),
        }
    }
}

/// Shared, mutable minimum-severity threshold.
///
/// `Clone` hands out another handle to the same cell, so every logger
/// derived from the same root observes level changes immediately.
#[derive(Debug, Clone)]
pub struct AtomicLevel(Arc<AtomicU8>);

impl AtomicLevel {
    pub fn new(level: Level) -> Self {
        AtomicLevel(Arc::new(AtomicU8::new(level as u8)))
    }

    /// The minimum enabled level.
    pub fn level(&self) -> Level {
        Level::from_u8(self.0.load(Ordering::Relaxed))
    }

    /// True if `level` is at or above the threshold.
    pub fn enabled(&self, level: Level) -> bool {
        level as u8 >= self.0.load(Ordering::Relaxed)
    }

    pub fn set_level(&self, level: Level) {
        self.0.store(level as u8, Ordering::Relaxed);
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        AtomicLevel::new(Level::Info)
    }
}
