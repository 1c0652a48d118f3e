//! The engine core: the resolved encoder/sink pair plus everything a
//! record carries besides its message — permanent fields, the hierarchical
//! name, and the caller/stacktrace/development options.

use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use time::OffsetDateTime;

use crate::caller;
use crate::encode::{Encoder, Record};
use crate::error::Result;
use crate::field::Field;
use crate::level::Level;
use crate::writer::Sink;

/// A handle to the resolved output pipeline. `with` and `named` derive new
/// cores without touching the receiver; the sink and encoder stay shared,
/// so every derived core writes through the same pipeline.
#[derive(Clone)]
pub struct Core {
    encoder: Encoder,
    sink: Arc<dyn Sink>,
    fields: Vec<Field>,
    name: Option<String>,
    add_caller: bool,
    caller_skip: usize,
    stack: bool,
    development: bool,
}

impl Core {
    pub fn new(encoder: Encoder, sink: Arc<dyn Sink>) -> Core {
        Core {
            encoder,
            sink,
            fields: Vec::new(),
            name: None,
            add_caller: false,
            caller_skip: 0,
            stack: false,
            development: false,
        }
    }

    /// Annotate records with the capturing call site.
    pub fn with_caller(mut self, enabled: bool) -> Core {
        self.add_caller = enabled;
        self
    }

    /// Report the frame `skip` levels above the call site instead of the
    /// call site itself, for callers logging through their own wrappers.
    pub fn with_caller_skip(mut self, skip: usize) -> Core {
        self.caller_skip = skip;
        self
    }

    /// Attach a stacktrace to records at dpanic severity and above.
    pub fn with_stacktrace(mut self, enabled: bool) -> Core {
        self.stack = enabled;
        self
    }

    /// Development mode; dpanic records panic after being written.
    pub fn with_development(mut self, enabled: bool) -> Core {
        self.development = enabled;
        self
    }

    pub(crate) fn development(&self) -> bool {
        self.development
    }

    /// A derived core whose records permanently carry `fields`, appended
    /// after any the receiver already holds. The receiver is unchanged.
    pub fn with(&self, fields: impl IntoIterator<Item = Field>) -> Core {
        let mut derived = self.clone();
        derived.fields.extend(fields);
        derived
    }

    /// A derived core with `name` appended to the hierarchical name,
    /// dot-joined. The receiver is unchanged.
    pub fn named(&self, name: &str) -> Core {
        let mut derived = self.clone();
        derived.name = Some(match &self.name {
            Some(existing) => format!("{existing}.{name}"),
            None => name.to_string(),
        });
        derived
    }

    /// The hierarchical name, if any segment has been attached.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Encode and write one record. Emit-path failures are dropped; `sync`
    /// is where writer errors surface.
    pub(crate) fn write(&self, level: Level, location: &'static Location<'static>, fields: &[Field]) {
        let merged: Vec<Field>;
        let all = if self.fields.is_empty() {
            fields
        } else {
            merged = self
                .fields
                .iter()
                .cloned()
                .chain(fields.iter().cloned())
                .collect();
            &merged
        };

        let record = Record {
            time: now(),
            level,
            name: self.name.as_deref(),
            caller: self
                .add_caller
                .then(|| caller::resolve(location, self.caller_skip)),
            stack: (self.stack && level >= Level::DPanic)
                .then(|| Backtrace::force_capture().to_string()),
            fields: all,
        };

        let mut buf = Vec::with_capacity(256);
        if self.encoder.encode(&record, &mut buf).is_ok() {
            let _ = self.sink.write(&buf);
        }
    }

    /// Flush the sink, surfacing any writer error.
    pub fn sync(&self) -> Result<()> {
        self.sink.sync()?;
        Ok(())
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

impl fmt::Debug for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Core")
            .field("encoder", &self.encoder)
            .field("fields", &self.fields)
            .field("name", &self.name)
            .field("add_caller", &self.add_caller)
            .field("caller_skip", &self.caller_skip)
            .field("stack", &self.stack)
            .field("development", &self.development)
            .finish_non_exhaustive()
    }
}
