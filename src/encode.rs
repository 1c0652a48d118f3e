//! Record encoders: one JSON object per line, or tab-separated console
//! lines. Key names are fixed: `ts`, `level`, `project`, `caller`,
//! `stacktrace`; the message travels as an ordinary `msg` field appended by
//! the facade, so neither encoder owns a message key.

use std::io::{self, Write};

use serde::ser::{SerializeMap, Serializer};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::field::Field;
use crate::level::Level;

/// A fully assembled record, ready for encoding.
pub(crate) struct Record<'a> {
    pub time: OffsetDateTime,
    pub level: Level,
    pub name: Option<&'a str>,
    pub caller: Option<String>,
    pub stack: Option<String>,
    pub fields: &'a [Field],
}

/// Encodes records into bytes; selected by the configured format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoder {
    /// Tab-separated human-readable lines.
    Console,
    /// One JSON object per line.
    Json,
}

impl Encoder {
    pub(crate) fn encode(&self, record: &Record<'_>, buf: &mut Vec<u8>) -> io::Result<()> {
        match self {
            Encoder::Json => encode_json(record, buf),
            Encoder::Console => encode_console(record, buf),
        }
    }
}

pub(crate) fn format_timestamp(time: OffsetDateTime) -> String {
    let layout = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    );
    time.format(layout).unwrap_or_else(|_| time.to_string())
}

fn encode_json(record: &Record<'_>, buf: &mut Vec<u8>) -> io::Result<()> {
    json_object(record, buf).map_err(io::Error::other)?;
    buf.push(b'\n');
    Ok(())
}

fn json_object(record: &Record<'_>, buf: &mut Vec<u8>) -> Result<(), serde_json::Error> {
    let mut ser = serde_json::Serializer::new(&mut *buf);
    let mut map = ser.serialize_map(None)?;
    map.serialize_entry("ts", &format_timestamp(record.time))?;
    map.serialize_entry("level", record.level.as_str())?;
    if let Some(name) = record.name {
        map.serialize_entry("project", name)?;
    }
    if let Some(caller) = &record.caller {
        map.serialize_entry("caller", caller)?;
    }
    if let Some(stack) = &record.stack {
        map.serialize_entry("stacktrace", stack)?;
    }
    for field in record.fields {
        map.serialize_entry(&field.key, &field.value)?;
    }
    map.end()
}

fn encode_console(record: &Record<'_>, buf: &mut Vec<u8>) -> io::Result<()> {
    write!(buf, "{}\t{}", format_timestamp(record.time), record.level)?;
    if let Some(name) = record.name {
        write!(buf, "\t{name}")?;
    }
    if let Some(caller) = &record.caller {
        write!(buf, "\t{caller}")?;
    }
    if !record.fields.is_empty() {
        buf.push(b'\t');
        fields_object(record.fields, buf).map_err(io::Error::other)?;
    }
    if let Some(stack) = &record.stack {
        write!(buf, "\n{stack}")?;
    }
    buf.push(b'\n');
    Ok(())
}

fn fields_object(fields: &[Field], buf: &mut Vec<u8>) -> Result<(), serde_json::Error> {
    let mut ser = serde_json::Serializer::new(&mut *buf);
    let mut map = ser.serialize_map(None)?;
    for field in fields {
        map.serialize_entry(&field.key, &field.value)?;
    }
    map.end()
}
