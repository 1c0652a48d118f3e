//! Structured fields, per-call valuers and the context they read from.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use serde_json::Value;

/// A single key/value pair attached to a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: Value,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Field {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A string field.
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Field::new(key, value.into())
    }

    /// An integer field.
    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Field::new(key, value)
    }

    /// A float field.
    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Field::new(key, value)
    }
}

/// An immutable bag of request-scoped values, cheap to clone and attach to
/// a logger with [`Logger::with_context`](crate::Logger::with_context).
/// Valuers are evaluated against it on every log call.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: Arc<HashMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    /// A context with `key` bound to `value`; the receiver is unchanged.
    pub fn with_value(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut values = (*self.values).clone();
        values.insert(key.into(), value.into());
        Context {
            values: Arc::new(values),
        }
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

/// Produces one field per log call, evaluated against the logger's context
/// in registration order.
#[derive(Clone)]
pub struct Valuer(Arc<dyn Fn(&Context) -> Field + Send + Sync>);

impl Valuer {
    pub fn new(f: impl Fn(&Context) -> Field + Send + Sync + 'static) -> Self {
        Valuer(Arc::new(f))
    }

    pub(crate) fn call(&self, ctx: &Context) -> Field {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Valuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Valuer")
    }
}

/// A valuer that always yields the same string field.
pub fn immut_string(key: impl Into<String>, value: impl Into<String>) -> Valuer {
    let field = Field::string(key, value);
    Valuer::new(move |_| field.clone())
}

/// A valuer that copies `key` out of the attached context, `null` when the
/// context does not carry it.
pub fn from_context(key: &'static str) -> Valuer {
    Valuer::new(move |ctx| Field::new(key, ctx.value(key).cloned().unwrap_or(Value::Null)))
}
