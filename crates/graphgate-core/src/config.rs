//! # Runtime Configuration
//!
//! The gateway is configured entirely from environment variables. Every
//! value has a default and nothing here is ever fatal: a malformed value is
//! either defaulted or passed through uninterpreted.
//!
//! | Variable                | Default      | Meaning                                  |
//! |-------------------------|--------------|------------------------------------------|
//! | `CROSS_ORIGIN`          | `false`      | permissive CORS when `"true"` (any case) |
//! | `PORT`                  | `8000`       | listen port                              |
//! | `MAX_PAYLOAD_SIZE`      | `128mb`      | JSON body limit, byte-size string        |
//! | `KUZU_PATH`             | `./database` | database directory                       |
//! | `KUZU_IN_MEMORY`        | `false`      | open an in-memory database instead       |
//! | `MODE`                  | `READ_WRITE` | `READ_ONLY` or `READ_WRITE`              |
//! | `KUZU_BUFFER_POOL_SIZE` | engine's     | buffer pool size in bytes                |

use bytesize::ByteSize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_PAYLOAD_SIZE: &str = "128mb";
pub const DEFAULT_DATABASE_PATH: &str = "./database";

// =============================================================================
// ACCESS MODE
// =============================================================================

/// Whether the engine was opened read-only or read-write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessMode {
    ReadOnly,
    #[default]
    ReadWrite,
}

impl AccessMode {
    /// Parse a `MODE` value. Anything other than `READ_ONLY` is read-write.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("READ_ONLY") {
            Self::ReadOnly
        } else {
            Self::ReadWrite
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadOnly => "READ_ONLY",
            Self::ReadWrite => "READ_WRITE",
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ENGINE CONFIG
// =============================================================================

/// How to open the embedded engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub path: PathBuf,
    pub in_memory: bool,
    pub access_mode: AccessMode,
    pub buffer_pool_size: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
            in_memory: false,
            access_mode: AccessMode::ReadWrite,
            buffer_pool_size: None,
        }
    }
}

// =============================================================================
// GATEWAY CONFIG
// =============================================================================

/// Immutable runtime configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub cross_origin: bool,
    pub port: u16,
    /// Byte-size string as given, e.g. `"128mb"`.
    pub max_payload_size: String,
    pub database: EngineConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            cross_origin: false,
            port: DEFAULT_PORT,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE.to_string(),
            database: EngineConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).map(|v| parse_flag(&v)).unwrap_or(false);

        let database = EngineConfig {
            path: lookup("KUZU_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            in_memory: flag("KUZU_IN_MEMORY"),
            access_mode: lookup("MODE")
                .map(|m| AccessMode::parse(&m))
                .unwrap_or_default(),
            buffer_pool_size: lookup("KUZU_BUFFER_POOL_SIZE").and_then(|s| s.trim().parse().ok()),
        };

        Self {
            cross_origin: flag("CROSS_ORIGIN"),
            port: lookup("PORT")
                .map(|p| parse_port(&p))
                .unwrap_or(DEFAULT_PORT),
            max_payload_size: lookup("MAX_PAYLOAD_SIZE")
                .unwrap_or_else(|| DEFAULT_MAX_PAYLOAD_SIZE.to_string()),
            database,
        }
    }

    /// Resolve `max_payload_size` to a byte count.
    ///
    /// An unparsable size is logged and replaced by the default.
    pub fn max_payload_bytes(&self) -> usize {
        match parse_byte_size(&self.max_payload_size) {
            Some(bytes) => bytes,
            None => {
                tracing::warn!(
                    "MAX_PAYLOAD_SIZE '{}' is not a byte size, using {}",
                    self.max_payload_size,
                    DEFAULT_MAX_PAYLOAD_SIZE
                );
                parse_byte_size(DEFAULT_MAX_PAYLOAD_SIZE).unwrap_or(usize::MAX)
            }
        }
    }
}

/// `"true"` in any letter case is true; everything else is false.
pub fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Parse a listen port, falling back to [`DEFAULT_PORT`].
pub fn parse_port(value: &str) -> u16 {
    value.trim().parse().unwrap_or(DEFAULT_PORT)
}

/// Parse a byte-size string such as `"128mb"`, `"1kb"` or `"4096"`.
///
/// `kb`, `mb`, `gb`, `tb` and `pb` are 1024-based in any letter case, so
/// `"1kb"` and `"1KiB"` are both 1024 bytes.
pub fn parse_byte_size(value: &str) -> Option<usize> {
    let value = value.trim();
    let split = value
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let unit = match unit.to_ascii_lowercase().as_str() {
        "kb" => "KiB",
        "mb" => "MiB",
        "gb" => "GiB",
        "tb" => "TiB",
        "pb" => "PiB",
        _ => unit,
    };

    format!("{}{}", number.trim_end(), unit)
        .parse::<ByteSize>()
        .ok()
        .and_then(|size| usize::try_from(size.as_u64()).ok())
}

// =============================================================================
// TESTS
// =============================================================================
