//! Rotation and retention policy for the rolling file writer.

use serde::{Deserialize, Deserializer, Serialize, de};

const DEFAULT_MAX_SIZE: u64 = 100 * 1024 * 1024;

/// Parse a size string with an optional unit (K/M/G, case-insensitive);
/// a bare number is megabytes.
fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".to_string());
    }

    let (num_str, unit) = match s.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => (&s[..s.len() - 1], c.to_ascii_uppercase()),
        _ => (s, 'M'),
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number: {num_str}"))?;

    let multiplier = match unit {
        'K' => 1024,
        'M' => 1024 * 1024,
        'G' => 1024 * 1024 * 1024,
        _ => return Err(format!("invalid unit: {unit}, supported: K/M/G")),
    };

    num.checked_mul(multiplier)
        .ok_or_else(|| "size too large".to_string())
}

/// Size value that can be a number (megabytes) or a string with units.
#[derive(Deserialize)]
#[serde(untagged)]
enum SizeValue {
    Number(u64),
    String(String),
}

impl SizeValue {
    fn to_bytes(&self) -> Result<u64, String> {
        match self {
            SizeValue::Number(n) => n
                .checked_mul(1024 * 1024)
                .ok_or_else(|| "size too large".to_string()),
            SizeValue::String(s) => parse_size(s),
        }
    }
}

/// When the rolling writer retires the active file and what it keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rotation {
    /// Maximum size of the active file in bytes before rotation. Config
    /// files may give a bare number (megabytes) or a string with K/M/G
    /// units ("512K", "1G"). Zero selects the 100 MB default.
    pub max_size: u64,
    /// Delete backups older than this many days; zero keeps everything.
    pub max_age: u32,
    /// Keep at most this many backups; zero keeps everything.
    pub max_backups: u32,
    /// Stamp backup names with local time instead of UTC.
    pub local_time: bool,
    /// Gzip backups after rotation.
    pub compress: bool,
}

impl Rotation {
    pub(crate) fn max_size_bytes(&self) -> u64 {
        if self.max_size == 0 {
            DEFAULT_MAX_SIZE
        } else {
            self.max_size
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation {
            max_size: DEFAULT_MAX_SIZE,
            max_age: 0,
            max_backups: 0,
            local_time: false,
            compress: false,
        }
    }
}

impl<'de> Deserialize<'de> for Rotation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize, Default)]
        #[serde(default)]
        struct RotationInput {
            max_size: Option<SizeValue>,
            max_age: u32,
            max_backups: u32,
            local_time: bool,
            compress: bool,
        }

        let input = RotationInput::deserialize(deserializer)?;
        let max_size = match input.max_size {
            Some(value) => value.to_bytes().map_err(de::Error::custom)?,
            None => DEFAULT_MAX_SIZE,
        };

        Ok(Rotation {
            max_size,
            max_age: input.max_age,
            max_backups: input.max_backups,
            local_time: input.local_time,
            compress: input.compress,
        })
    }
}
