//! Resolves a [`Config`] into a concrete (encoder, writer, level) pipeline
//! and wraps it in a root [`Logger`].
//!
//! # Example
//!
//! ```rust
//! let log = scopelog::builder()
//!     .with_level("debug")
//!     .with_format("console")
//!     .build()
//!     .named("api");
//!
//! log.info("ready");
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{Adapter, Config};
use crate::core::Core;
use crate::encode::Encoder;
use crate::level::{AtomicLevel, Level};
use crate::logger::Logger;
use crate::rotation::Rotation;
use crate::writer::{Fanout, RawSink, RollingFileWriter, Sink, StdoutSink};

/// Fluent front door: `builder().with_level("debug").build()`.
pub fn builder() -> Builder {
    Builder::new()
}

/// Assembles a [`Config`] and resolves it into a working pipeline.
/// Construction never fails: bad level text falls back to info and the
/// rotating file opens lazily on the first write.
#[derive(Debug, Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            config: Config::new(),
        }
    }

    pub fn from_config(config: Config) -> Self {
        Builder { config }
    }

    pub fn with_adapter(mut self, adapter: Adapter) -> Self {
        self.config = self.config.with_adapter(adapter);
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = self.config.with_path(path);
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.config = self.config.with_filename(filename);
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.config = self.config.with_format(format);
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config = self.config.with_level(level);
        self
    }

    pub fn with_add_caller(mut self, enabled: bool) -> Self {
        self.config = self.config.with_add_caller(enabled);
        self
    }

    pub fn with_caller_skip(mut self, skip: usize) -> Self {
        self.config = self.config.with_caller_skip(skip);
        self
    }

    pub fn with_stack(mut self, enabled: bool) -> Self {
        self.config = self.config.with_stack(enabled);
        self
    }

    pub fn with_development(mut self, enabled: bool) -> Self {
        self.config = self.config.with_development(enabled);
        self
    }

    pub fn with_max_size(mut self, megabytes: u64) -> Self {
        self.config = self.config.with_max_size(megabytes);
        self
    }

    pub fn with_max_age(mut self, days: u32) -> Self {
        self.config = self.config.with_max_age(days);
        self
    }

    pub fn with_max_backups(mut self, count: u32) -> Self {
        self.config = self.config.with_max_backups(count);
        self
    }

    pub fn with_local_time(mut self, enabled: bool) -> Self {
        self.config = self.config.with_local_time(enabled);
        self
    }

    pub fn with_compress(mut self, enabled: bool) -> Self {
        self.config = self.config.with_compress(enabled);
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.config = self.config.with_rotation(rotation);
        self
    }

    pub fn with_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.config = self.config.with_writer(writer);
        self
    }

    /// The assembled configuration, without resolving a pipeline.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Resolve the pipeline and wrap it in a root [`Logger`].
    pub fn build(self) -> Logger {
        let (core, level) = self.build_parts();
        Logger::new(core, level)
    }

    /// The raw (engine, level) pair, for callers composing their own
    /// facade around the engine.
    pub fn build_parts(self) -> (Core, AtomicLevel) {
        let file_path = self.config.file_path();
        let Config {
            adapter,
            format,
            level,
            add_caller,
            caller_skip,
            stack,
            development,
            rotation,
            writers,
            ..
        } = self.config;

        // Lenient by policy: unparseable level text selects info.
        let threshold = AtomicLevel::new(level.parse().unwrap_or(Level::Info));
        let encoder = if format == "console" {
            Encoder::Console
        } else {
            Encoder::Json
        };
        let sink = resolve_sink(adapter, file_path, rotation, writers);

        let core = Core::new(encoder, sink)
            .with_caller(add_caller)
            .with_caller_skip(caller_skip)
            .with_stacktrace(stack)
            .with_development(development);
        (core, threshold)
    }
}

fn resolve_sink(
    adapter: Adapter,
    file_path: PathBuf,
    rotation: Rotation,
    writers: Vec<Box<dyn Write + Send>>,
) -> Arc<dyn Sink> {
    let file = move || -> Arc<dyn Sink> { Arc::new(RollingFileWriter::new(file_path, rotation)) };
    let stdout = || -> Arc<dyn Sink> { Arc::new(StdoutSink) };
    let mut raw: Vec<Arc<dyn Sink>> = writers
        .into_iter()
        .map(|w| Arc::new(RawSink::new(w)) as Arc<dyn Sink>)
        .collect();

    match adapter {
        Adapter::File => file(),
        Adapter::Multi => fanout(vec![stdout(), file()]),
        Adapter::FileCustom => {
            raw.push(file());
            fanout(raw)
        }
        Adapter::ConsoleCustom => {
            raw.push(stdout());
            fanout(raw)
        }
        Adapter::MultiCustom => {
            raw.push(stdout());
            raw.push(file());
            fanout(raw)
        }
        Adapter::Custom => match raw.len() {
            0 => stdout(),
            // A lone writer is used directly, no fan-out wrapper.
            1 => raw.remove(0),
            _ => fanout(raw),
        },
        Adapter::Console => stdout(),
    }
}

fn fanout(sinks: Vec<Arc<dyn Sink>>) -> Arc<dyn Sink> {
    Arc::new(Fanout::new(sinks))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_build_is_info_threshold() {
        let log = builder().build();
        assert_eq!(log.level(), Level::Info);
        assert!(!log.enabled(Level::Debug));
    }

    #[test]
    fn test_bad_level_text_falls_back_to_info() {
        let log = builder().with_level("not-a-level").build();
        assert_eq!(log.level(), Level::Info);
    }

    #[test]
    fn test_level_text_is_honored() {
        let log = builder().with_level("error").build();
        assert_eq!(log.level(), Level::Error);
        assert!(!log.enabled(Level::Warn));
        assert!(log.enabled(Level::Fatal));
    }

    #[test]
    fn test_into_config_round_trip() {
        let config = builder()
            .with_adapter(Adapter::File)
            .with_path("/tmp/logs")
            .with_filename("svc.log")
            .with_max_backups(4)
            .into_config();

        assert_eq!(config.adapter, Adapter::File);
        assert_eq!(config.file_path(), PathBuf::from("/tmp/logs/svc.log"));
        assert_eq!(config.rotation.max_backups, 4);
    }
}
