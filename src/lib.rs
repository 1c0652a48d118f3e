//! # scopelog
//!
//! A structured logging facade: resolve a pipeline once, derive scoped
//! loggers freely, log in print, printf and key-value styles.
//!
//! ## Features
//!
//! - Console, file and fan-out output behind one adapter setting
//! - Size-capped file rotation with count/age retention and gzip
//! - JSON or tab-separated console encoding
//! - Non-mutating scope derivation: fields, names, contexts, valuers
//! - A shared, atomically adjustable level across every derived logger
//!
//! ## Example
//!
//! ```rust
//! use scopelog::{Field, builder};
//!
//! let log = builder()
//!     .with_level("debug")
//!     .build()
//!     .named("api");
//!
//! log.info("started");
//! log.infof(format_args!("listening on {}", 8080));
//! log.infow("request done", [Field::int("status", 200)]);
//!
//! let scoped = log.with([Field::string("component", "auth")]);
//! scoped.debug(("attempt", "-", 2));
//! ```

pub mod builder;
mod caller;
pub mod config;
pub mod core;
pub mod encode;
pub mod error;
pub mod field;
pub mod global;
pub mod level;
pub mod logger;
pub mod rotation;
pub mod writer;

pub use builder::{Builder, builder};
pub use config::{Adapter, Config};
pub use self::core::Core;
pub use encode::Encoder;
pub use error::{Error, Result};
pub use field::{Context, Field, Valuer, Value, from_context, immut_string};
pub use global::{
    debug, debugf, debugw, dpanic, dpanicf, dpanicw, enabled, error, errorf, errorw, fatal,
    fatalf, fatalw, global, info, infof, infow, level, named, panic, panicf, panicw,
    replace_globals, set_default_valuer, set_level, set_level_with_text, sync, warn, warnf,
    warnw, with, with_context, with_new_valuer, with_valuer,
};
pub use level::{AtomicLevel, Level};
pub use logger::{Logger, ToMessage};
pub use rotation::Rotation;
pub use writer::{RollingFileWriter, Sink};
