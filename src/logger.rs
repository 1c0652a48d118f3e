//! The logger facade: leveled methods in three calling conventions and
//! scope derivation. Every method checks the shared level first, so a
//! disabled call costs one atomic load.

use std::fmt::{self, Write as _};
use std::panic::Location;
use std::process;

use crate::core::Core;
use crate::error::Result;
use crate::field::{Context, Field, Valuer};
use crate::level::{AtomicLevel, Level};

/// Print-style arguments, rendered into the record message: strings pass
/// through verbatim, `Display` scalars use their display form, tuples
/// concatenate their members' display forms with no separator.
pub trait ToMessage {
    fn to_message(self) -> String;
}

impl ToMessage for String {
    fn to_message(self) -> String {
        self
    }
}

impl ToMessage for &String {
    fn to_message(self) -> String {
        self.clone()
    }
}

impl ToMessage for &str {
    fn to_message(self) -> String {
        self.to_string()
    }
}

impl ToMessage for fmt::Arguments<'_> {
    fn to_message(self) -> String {
        fmt::format(self)
    }
}

impl ToMessage for () {
    fn to_message(self) -> String {
        String::new()
    }
}

macro_rules! message_from_display {
    ($($ty:ty),* $(,)?) => {
        $(impl ToMessage for $ty {
            fn to_message(self) -> String {
                self.to_string()
            }
        })*
    };
}

message_from_display!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

macro_rules! message_from_tuple {
    ($($name:ident),+) => {
        #[allow(non_snake_case)]
        impl<$($name: fmt::Display),+> ToMessage for ($($name,)+) {
            fn to_message(self) -> String {
                let ($($name,)+) = self;
                let mut message = String::new();
                $(let _ = write!(message, "{}", $name);)+
                message
            }
        }
    };
}

message_from_tuple!(A);
message_from_tuple!(A, B);
message_from_tuple!(A, B, C);
message_from_tuple!(A, B, C, D);
message_from_tuple!(A, B, C, D, E);
message_from_tuple!(A, B, C, D, E, F);
message_from_tuple!(A, B, C, D, E, F, G);
message_from_tuple!(A, B, C, D, E, F, G, H);

/// A scoped logging handle over an engine [`Core`] and a shared
/// [`AtomicLevel`].
///
/// Derivation (`with`, `named`, `with_context`, `with_valuer`,
/// `with_new_valuer`) never mutates the receiver: each returns a new
/// `Logger` sharing the core's sink and the level cell, so a parent stays
/// safe to log through concurrently after children are spawned.
#[derive(Debug, Clone)]
pub struct Logger {
    core: Core,
    level: AtomicLevel,
    valuers: Vec<Valuer>,
    ctx: Context,
}

impl Logger {
    /// Wrap an engine core and its level handle, as produced by
    /// [`Builder::build_parts`](crate::Builder::build_parts).
    pub fn new(core: Core, level: AtomicLevel) -> Logger {
        Logger {
            core,
            level,
            valuers: Vec::new(),
            ctx: Context::new(),
        }
    }

    /// The underlying engine core.
    pub fn core(&self) -> &Core {
        &self.core
    }

    /// The minimum enabled level.
    pub fn level(&self) -> Level {
        self.level.level()
    }

    /// True if `level` is at or above the threshold.
    pub fn enabled(&self, level: Level) -> bool {
        self.level.enabled(level)
    }

    /// Changes the shared threshold; visible to every logger derived from
    /// the same root, including ones derived before the call.
    pub fn set_level(&self, level: Level) {
        self.level.set_level(level);
    }

    /// Like [`Logger::set_level`], from level text. Strict, unlike the
    /// build-time parse: unknown text is an error and the level stays put.
    pub fn set_level_with_text(&self, text: &str) -> Result<()> {
        let level = text.parse()?;
        self.level.set_level(level);
        Ok(())
    }

    /// Appends valuers to this instance in place. Meant for one-time
    /// setup; do not call concurrently with logging or derivation on the
    /// same instance.
    pub fn set_default_valuer(&mut self, valuers: impl IntoIterator<Item = Valuer>) {
        self.valuers.extend(valuers);
    }

    /// A child logger whose records permanently carry `fields`. Fields
    /// added to the child don't affect the parent, and vice versa.
    pub fn with(&self, fields: impl IntoIterator<Item = Field>) -> Logger {
        Logger {
            core: self.core.with(fields),
            level: self.level.clone(),
            valuers: self.valuers.clone(),
            ctx: self.ctx.clone(),
        }
    }

    /// A child logger with `name` appended to the hierarchical name.
    pub fn named(&self, name: &str) -> Logger {
        Logger {
            core: self.core.named(name),
            level: self.level.clone(),
            valuers: self.valuers.clone(),
            ctx: self.ctx.clone(),
        }
    }

    /// A child logger with the attached context replaced; the valuer list
    /// is unchanged.
    pub fn with_context(&self, ctx: Context) -> Logger {
        Logger {
            core: self.core.clone(),
            level: self.level.clone(),
            valuers: self.valuers.clone(),
            ctx,
        }
    }

    /// A child logger with `valuers` appended after the inherited ones.
    pub fn with_valuer(&self, valuers: impl IntoIterator<Item = Valuer>) -> Logger {
        let mut combined = self.valuers.clone();
        combined.extend(valuers);
        Logger {
            core: self.core.clone(),
            level: self.level.clone(),
            valuers: combined,
            ctx: self.ctx.clone(),
        }
    }

    /// A child logger whose valuer list is exactly `valuers`, dropping the
    /// inherited ones.
    pub fn with_new_valuer(&self, valuers: impl IntoIterator<Item = Valuer>) -> Logger {
        Logger {
            core: self.core.clone(),
            level: self.level.clone(),
            valuers: valuers.into_iter().collect(),
            ctx: self.ctx.clone(),
        }
    }

    /// Flushes buffered writer state, surfacing any writer error.
    pub fn sync(&self) -> Result<()> {
        self.core.sync()
    }

    /// Logs a print-style message at debug.
    #[track_caller]
    pub fn debug(&self, args: impl ToMessage) {
        self.print_at(Level::Debug, Location::caller(), args);
    }

    /// Logs a print-style message at info.
    #[track_caller]
    pub fn info(&self, args: impl ToMessage) {
        self.print_at(Level::Info, Location::caller(), args);
    }

    /// Logs a print-style message at warn.
    #[track_caller]
    pub fn warn(&self, args: impl ToMessage) {
        self.print_at(Level::Warn, Location::caller(), args);
    }

    /// Logs a print-style message at error.
    #[track_caller]
    pub fn error(&self, args: impl ToMessage) {
        self.print_at(Level::Error, Location::caller(), args);
    }

    /// Logs a print-style message at dpanic, then panics when the pipeline
    /// was built in development mode.
    #[track_caller]
    pub fn dpanic(&self, args: impl ToMessage) {
        self.print_at(Level::DPanic, Location::caller(), args);
    }

    /// Logs a print-style message, then panics with the rendered message.
    /// When the panic level is disabled, neither happens.
    #[track_caller]
    pub fn panic(&self, args: impl ToMessage) {
        self.print_at(Level::Panic, Location::caller(), args);
    }

    /// Logs a print-style message, then terminates the process. When the
    /// fatal level is disabled, neither happens.
    #[track_caller]
    pub fn fatal(&self, args: impl ToMessage) {
        self.print_at(Level::Fatal, Location::caller(), args);
    }

    /// Logs a templated message at debug: `log.debugf(format_args!(...))`.
    #[track_caller]
    pub fn debugf(&self, template: fmt::Arguments<'_>) {
        self.format_at(Level::Debug, Location::caller(), template);
    }

    /// Logs a templated message at info.
    #[track_caller]
    pub fn infof(&self, template: fmt::Arguments<'_>) {
        self.format_at(Level::Info, Location::caller(), template);
    }

    /// Logs a templated message at warn.
    #[track_caller]
    pub fn warnf(&self, template: fmt::Arguments<'_>) {
        self.format_at(Level::Warn, Location::caller(), template);
    }

    /// Logs a templated message at error.
    #[track_caller]
    pub fn errorf(&self, template: fmt::Arguments<'_>) {
        self.format_at(Level::Error, Location::caller(), template);
    }

    /// Logs a templated message at dpanic, then panics in development mode.
    #[track_caller]
    pub fn dpanicf(&self, template: fmt::Arguments<'_>) {
        self.format_at(Level::DPanic, Location::caller(), template);
    }

    /// Logs a templated message, then panics with the rendered message.
    #[track_caller]
    pub fn panicf(&self, template: fmt::Arguments<'_>) {
        self.format_at(Level::Panic, Location::caller(), template);
    }

    /// Logs a templated message, then terminates the process.
    #[track_caller]
    pub fn fatalf(&self, template: fmt::Arguments<'_>) {
        self.format_at(Level::Fatal, Location::caller(), template);
    }

    /// Logs at debug with additional key/value fields, appended after the
    /// message and valuer fields.
    #[track_caller]
    pub fn debugw(&self, msg: &str, kvs: impl IntoIterator<Item = Field>) {
        self.keyed_at(Level::Debug, Location::caller(), msg, kvs);
    }

    /// Logs at info with additional key/value fields.
    #[track_caller]
    pub fn infow(&self, msg: &str, kvs: impl IntoIterator<Item = Field>) {
        self.keyed_at(Level::Info, Location::caller(), msg, kvs);
    }

    /// Logs at warn with additional key/value fields.
    #[track_caller]
    pub fn warnw(&self, msg: &str, kvs: impl IntoIterator<Item = Field>) {
        self.keyed_at(Level::Warn, Location::caller(), msg, kvs);
    }

    /// Logs at error with additional key/value fields.
    #[track_caller]
    pub fn errorw(&self, msg: &str, kvs: impl IntoIterator<Item = Field>) {
        self.keyed_at(Level::Error, Location::caller(), msg, kvs);
    }

    /// Logs at dpanic with additional key/value fields, then panics in
    /// development mode.
    #[track_caller]
    pub fn dpanicw(&self, msg: &str, kvs: impl IntoIterator<Item = Field>) {
        self.keyed_at(Level::DPanic, Location::caller(), msg, kvs);
    }

    /// Logs with additional key/value fields, then panics with the message.
    #[track_caller]
    pub fn panicw(&self, msg: &str, kvs: impl IntoIterator<Item = Field>) {
        self.keyed_at(Level::Panic, Location::caller(), msg, kvs);
    }

    /// Logs with additional key/value fields, then terminates the process.
    #[track_caller]
    pub fn fatalw(&self, msg: &str, kvs: impl IntoIterator<Item = Field>) {
        self.keyed_at(Level::Fatal, Location::caller(), msg, kvs);
    }

    /// Print-style entry point with an explicit call site. The global
    /// wrappers route through here so the location they capture survives
    /// the extra hop; the level gate runs before any message work.
    pub(crate) fn print_at(
        &self,
        level: Level,
        location: &'static Location<'static>,
        args: impl ToMessage,
    ) {
        if !self.level.enabled(level) {
            return;
        }
        self.emit(level, location, args.to_message(), Vec::new());
    }

    /// Format-style entry point with an explicit call site.
    pub(crate) fn format_at(
        &self,
        level: Level,
        location: &'static Location<'static>,
        template: fmt::Arguments<'_>,
    ) {
        if !self.level.enabled(level) {
            return;
        }
        self.emit(level, location, fmt::format(template), Vec::new());
    }

    /// Keyed-style entry point with an explicit call site.
    pub(crate) fn keyed_at(
        &self,
        level: Level,
        location: &'static Location<'static>,
        msg: &str,
        kvs: impl IntoIterator<Item = Field>,
    ) {
        if !self.level.enabled(level) {
            return;
        }
        self.emit(level, location, msg.to_string(), kvs.into_iter().collect());
    }

    /// Assembles the field list (message first, then valuer fields in
    /// registration order, then call-site fields), writes the record, and
    /// carries out the severity's terminal action.
    fn emit(
        &self,
        level: Level,
        location: &'static Location<'static>,
        message: String,
        kvs: Vec<Field>,
    ) {
        let mut fields = Vec::with_capacity(1 + self.valuers.len() + kvs.len());
        fields.push(Field::string("msg", message.as_str()));
        for valuer in &self.valuers {
            fields.push(valuer.call(&self.ctx));
        }
        fields.extend(kvs);

        self.core.write(level, location, &fields);

        match level {
            Level::DPanic if self.core.development() => panic!("{message}"),
            Level::Panic => panic!("{message}"),
            Level::Fatal => {
                let _ = self.core.sync();
                process::exit(1);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_messages_pass_through_verbatim() {
        assert_eq!("hello".to_message(), "hello");
        assert_eq!(String::from("hello").to_message(), "hello");
        assert_eq!((&String::from("hello")).to_message(), "hello");
    }

    #[test]
    fn test_tuple_messages_concatenate_without_separator() {
        assert_eq!(("Debug", "-", "111111", "-", 1).to_message(), "Debug-111111-1");
        assert_eq!((1, 2.5, true).to_message(), "12.5true");
    }

    #[test]
    fn test_scalar_and_unit_messages() {
        assert_eq!(42.to_message(), "42");
        assert_eq!(true.to_message(), "true");
        assert_eq!(().to_message(), "");
    }

    #[test]
    fn test_format_args_render() {
        assert_eq!(format_args!("Debugf: {}", "debug").to_message(), "Debugf: debug");
    }
}
