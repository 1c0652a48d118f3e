//! The process-wide default logger and free functions mirroring the
//! facade, for ambient use without threading a [`Logger`] around.
//!
//! Each logging wrapper captures [`Location::caller`] itself and forwards
//! it into the facade's explicit-location entry points, so caller
//! annotation reports the user's frame rather than this file.

use std::fmt;
use std::panic::Location;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use crate::builder::Builder;
use crate::error::Result;
use crate::field::{Context, Field, Valuer};
use crate::level::Level;
use crate::logger::{Logger, ToMessage};

static GLOBAL: Lazy<RwLock<Logger>> = Lazy::new(|| RwLock::new(Builder::new().build()));

/// Swaps the process-wide logger, returning the previous one.
///
/// Replacement is not synchronized against in-flight logging calls; do it
/// during single-threaded startup.
pub fn replace_globals(logger: Logger) -> Logger {
    std::mem::replace(&mut *GLOBAL.write().unwrap(), logger)
}

/// A clone of the current process-wide logger.
pub fn global() -> Logger {
    GLOBAL.read().unwrap().clone()
}

/// Logs a print-style message at debug through the global logger.
#[track_caller]
pub fn debug(args: impl ToMessage) {
    let location = Location::caller();
    GLOBAL.read().unwrap().print_at(Level::Debug, location, args);
}

/// Logs a print-style message at info through the global logger.
#[track_caller]
pub fn info(args: impl ToMessage) {
    let location = Location::caller();
    GLOBAL.read().unwrap().print_at(Level::Info, location, args);
}

/// Logs a print-style message at warn through the global logger.
#[track_caller]
pub fn warn(args: impl ToMessage) {
    let location = Location::caller();
    GLOBAL.read().unwrap().print_at(Level::Warn, location, args);
}

/// Logs a print-style message at error through the global logger.
#[track_caller]
pub fn error(args: impl ToMessage) {
    let location = Location::caller();
    GLOBAL.read().unwrap().print_at(Level::Error, location, args);
}

/// Logs at dpanic through the global logger; panics in development mode.
#[track_caller]
pub fn dpanic(args: impl ToMessage) {
    let location = Location::caller();
    GLOBAL.read().unwrap().print_at(Level::DPanic, location, args);
}

/// Logs through the global logger, then panics with the message.
#[track_caller]
pub fn panic(args: impl ToMessage) {
    let location = Location::caller();
    GLOBAL.read().unwrap().print_at(Level::Panic, location, args);
}

/// Logs through the global logger, then terminates the process.
#[track_caller]
pub fn fatal(args: impl ToMessage) {
    let location = Location::caller();
    GLOBAL.read().unwrap().print_at(Level::Fatal, location, args);
}

/// Logs a templated message at debug through the global logger.
#[track_caller]
pub fn debugf(template: fmt::Arguments<'_>) {
    let location = Location::caller();
    GLOBAL.read().unwrap().format_at(Level::Debug, location, template);
}

/// Logs a templated message at info through the global logger.
#[track_caller]
pub fn infof(template: fmt::Arguments<'_>) {
    let location = Location::caller();
    GLOBAL.read().unwrap().format_at(Level::Info, location, template);
}

/// Logs a templated message at warn through the global logger.
#[track_caller]
pub fn warnf(template: fmt::Arguments<'_>) {
    let location = Location::caller();
    GLOBAL.read().unwrap().format_at(Level::Warn, location, template);
}

/// Logs a templated message at error through the global logger.
#[track_caller]
pub fn errorf(template: fmt::Arguments<'_>) {
    let location = Location::caller();
    GLOBAL.read().unwrap().format_at(Level::Error, location, template);
}

/// Logs a templated message at dpanic through the global logger.
#[track_caller]
pub fn dpanicf(template: fmt::Arguments<'_>) {
    let location = Location::caller();
    GLOBAL.read().unwrap().format_at(Level::DPanic, location, template);
}

/// Logs a templated message through the global logger, then panics.
#[track_caller]
pub fn panicf(template: fmt::Arguments<'_>) {
    let location = Location::caller();
    GLOBAL.read().unwrap().format_at(Level::Panic, location, template);
}

/// Logs a templated message through the global logger, then terminates
/// the process.
#[track_caller]
pub fn fatalf(template: fmt::Arguments<'_>) {
    let location = Location::caller();
    GLOBAL.read().unwrap().format_at(Level::Fatal, location, template);
}

/// Logs at debug with key/value fields through the global logger.
#[track_caller]
pub fn debugw(msg: &str, kvs: impl IntoIterator<Item = Field>) {
    let location = Location::caller();
    GLOBAL.read().unwrap().keyed_at(Level::Debug, location, msg, kvs);
}

/// Logs at info with key/value fields through the global logger.
#[track_caller]
pub fn infow(msg: &str, kvs: impl IntoIterator<Item = Field>) {
    let location = Location::caller();
    GLOBAL.read().unwrap().keyed_at(Level::Info, location, msg, kvs);
}

/// Logs at warn with key/value fields through the global logger.
#[track_caller]
pub fn warnw(msg: &str, kvs: impl IntoIterator<Item = Field>) {
    let location = Location::caller();
    GLOBAL.read().unwrap().keyed_at(Level::Warn, location, msg, kvs);
}

/// Logs at error with key/value fields through the global logger.
#[track_caller]
pub fn errorw(msg: &str, kvs: impl IntoIterator<Item = Field>) {
    let location = Location::caller();
    GLOBAL.read().unwrap().keyed_at(Level::Error, location, msg, kvs);
}

/// Logs at dpanic with key/value fields through the global logger.
#[track_caller]
pub fn dpanicw(msg: &str, kvs: impl IntoIterator<Item = Field>) {
    let location = Location::caller();
    GLOBAL.read().unwrap().keyed_at(Level::DPanic, location, msg, kvs);
}

/// Logs with key/value fields through the global logger, then panics.
#[track_caller]
pub fn panicw(msg: &str, kvs: impl IntoIterator<Item = Field>) {
    let location = Location::caller();
    GLOBAL.read().unwrap().keyed_at(Level::Panic, location, msg, kvs);
}

/// Logs with key/value fields through the global logger, then terminates
/// the process.
#[track_caller]
pub fn fatalw(msg: &str, kvs: impl IntoIterator<Item = Field>) {
    let location = Location::caller();
    GLOBAL.read().unwrap().keyed_at(Level::Fatal, location, msg, kvs);
}

/// A child of the global logger permanently carrying `fields`.
pub fn with(fields: impl IntoIterator<Item = Field>) -> Logger {
    GLOBAL.read().unwrap().with(fields)
}

/// A child of the global logger with `name` appended to its name.
pub fn named(name: &str) -> Logger {
    GLOBAL.read().unwrap().named(name)
}

/// A child of the global logger with the attached context replaced.
pub fn with_context(ctx: Context) -> Logger {
    GLOBAL.read().unwrap().with_context(ctx)
}

/// A child of the global logger with `valuers` appended.
pub fn with_valuer(valuers: impl IntoIterator<Item = Valuer>) -> Logger {
    GLOBAL.read().unwrap().with_valuer(valuers)
}

/// A child of the global logger with its valuer list replaced.
pub fn with_new_valuer(valuers: impl IntoIterator<Item = Valuer>) -> Logger {
    GLOBAL.read().unwrap().with_new_valuer(valuers)
}

/// Appends valuers to the global logger in place. Call once, before
/// spawning concurrent use.
pub fn set_default_valuer(valuers: impl IntoIterator<Item = Valuer>) {
    GLOBAL.write().unwrap().set_default_valuer(valuers);
}

/// Changes the global logger's shared threshold.
pub fn set_level(level: Level) {
    GLOBAL.read().unwrap().set_level(level);
}

/// Like [`set_level`], from level text; unknown text is an error and the
/// level stays put.
pub fn set_level_with_text(text: &str) -> Result<()> {
    GLOBAL.read().unwrap().set_level_with_text(text)
}

/// The global logger's minimum enabled level.
pub fn level() -> Level {
    GLOBAL.read().unwrap().level()
}

/// True if `level` is enabled on the global logger.
pub fn enabled(level: Level) -> bool {
    GLOBAL.read().unwrap().enabled(level)
}

/// Flushes the global logger's writer state.
pub fn sync() -> Result<()> {
    GLOBAL.read().unwrap().sync()
}
