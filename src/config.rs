//! Logger configuration: named, defaulted fields with chainable setters,
//! loadable from any serde format. Nothing is validated here — the builder
//! applies documented fallbacks (unparseable level text selects "info",
//! unknown adapter text the console writer).

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::rotation::Rotation;

/// Which writers back the constructed logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Adapter {
    /// Stdout only.
    #[default]
    Console,
    /// The rotating file only.
    File,
    /// Stdout plus the rotating file.
    Multi,
    /// The configured raw writers plus the rotating file.
    FileCustom,
    /// The configured raw writers plus stdout.
    ConsoleCustom,
    /// The configured raw writers, stdout and the rotating file.
    MultiCustom,
    /// The configured raw writers only; stdout when none are configured.
    Custom,
}

impl Adapter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Adapter::Console => "console",
            Adapter::File => "file",
            Adapter::Multi => "multi",
            Adapter::FileCustom => "file-custom",
            Adapter::ConsoleCustom => "console-custom",
            Adapter::MultiCustom => "multi-custom",
            Adapter::Custom => "custom",
        }
    }

    fn from_text(text: &str) -> Adapter {
        match text.to_ascii_lowercase().as_str() {
            "file" => Adapter::File,
            "multi" => Adapter::Multi,
            "file-custom" => Adapter::FileCustom,
            "console-custom" => Adapter::ConsoleCustom,
            "multi-custom" => Adapter::MultiCustom,
            "custom" => Adapter::Custom,
            _ => Adapter::Console,
        }
    }
}

impl fmt::Display for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown adapter text selects the console writer rather than failing.
impl FromStr for Adapter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Adapter::from_text(s))
    }
}

impl Serialize for Adapter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Adapter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Adapter::from_text(&text))
    }
}

/// Everything a [`Builder`](crate::Builder) needs to resolve an output
/// pipeline. Starts at documented defaults; each `with_*` setter changes
/// exactly one field, except [`Config::with_writer`], which appends.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Writer selection, see [`Adapter`].
    pub adapter: Adapter,
    /// Directory the rotating file lives in; empty means the working dir.
    pub path: PathBuf,
    /// Name of the rotating file.
    pub filename: String,
    /// `"console"` selects tab-separated lines, anything else JSON.
    pub format: String,
    /// Minimum severity text, parsed leniently at build time.
    pub level: String,
    /// Annotate records with the call site.
    pub add_caller: bool,
    /// Report the frame this many levels above the call site instead of
    /// the call site itself, for code that logs through wrapper layers of
    /// its own. Zero reports the direct call site.
    pub caller_skip: usize,
    /// Attach a stacktrace to records at dpanic severity and above.
    pub stack: bool,
    /// Development mode; dpanic records panic after logging.
    pub development: bool,
    /// Rotation and retention for the file writer.
    pub rotation: Rotation,
    /// Externally supplied writers for the custom adapters.
    #[serde(skip)]
    pub writers: Vec<Box<dyn Write + Send>>,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    pub fn with_adapter(mut self, adapter: Adapter) -> Self {
        self.adapter = adapter;
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_add_caller(mut self, enabled: bool) -> Self {
        self.add_caller = enabled;
        self
    }

    pub fn with_caller_skip(mut self, skip: usize) -> Self {
        self.caller_skip = skip;
        self
    }

    pub fn with_stack(mut self, enabled: bool) -> Self {
        self.stack = enabled;
        self
    }

    pub fn with_development(mut self, enabled: bool) -> Self {
        self.development = enabled;
        self
    }

    /// Maximum size of the active log file, in megabytes.
    pub fn with_max_size(mut self, megabytes: u64) -> Self {
        self.rotation.max_size = megabytes * 1024 * 1024;
        self
    }

    /// Delete backups older than `days`; zero keeps everything.
    pub fn with_max_age(mut self, days: u32) -> Self {
        self.rotation.max_age = days;
        self
    }

    /// Keep at most `count` backups; zero keeps everything.
    pub fn with_max_backups(mut self, count: u32) -> Self {
        self.rotation.max_backups = count;
        self
    }

    /// Stamp backup names with local time instead of UTC.
    pub fn with_local_time(mut self, enabled: bool) -> Self {
        self.rotation.local_time = enabled;
        self
    }

    /// Gzip backups after rotation.
    pub fn with_compress(mut self, enabled: bool) -> Self {
        self.rotation.compress = enabled;
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Appends a raw writer; earlier writers stay.
    pub fn with_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writers.push(Box::new(writer));
        self
    }

    /// Where the rotating file lives: `path` joined with `filename`.
    pub(crate) fn file_path(&self) -> PathBuf {
        self.path.join(&self.filename)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            adapter: Adapter::Console,
            path: PathBuf::new(),
            filename: "app.log".to_string(),
            format: "json".to_string(),
            level: "info".to_string(),
            add_caller: false,
            caller_skip: 0,
            stack: false,
            development: false,
            rotation: Rotation::default(),
            writers: Vec::new(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("adapter", &self.adapter)
            .field("path", &self.path)
            .field("filename", &self.filename)
            .field("format", &self.format)
            .field("level", &self.level)
            .field("add_caller", &self.add_caller)
            .field("caller_skip", &self.caller_skip)
            .field("stack", &self.stack)
            .field("development", &self.development)
            .field("rotation", &self.rotation)
            .field("writers", &self.writers.len())
            .finish()
    }
}
