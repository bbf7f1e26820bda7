//! # Profiling
//!
//! With the `profiling` feature enabled every tick phase runs inside a
//! `tracing` span:
//!
//! | span               | covers                                 |
//! |--------------------|----------------------------------------|
//! | `world.update`     | the whole update                       |
//! | `world.admit`      | unit catch-up and the admit queue      |
//! | `world.reconsider` | the reconsider queue                   |
//! | `world.evict`      | the evict queue                        |
//! | `world.process`    | unit `update` calls                    |
//! | `world.paint`      | unit `paint` calls                     |
//!
//! Registrations and id recycling emit `debug!` events.
//!
//! ```toml
//! [dependencies]
//! sparse_ecs = { version = "0.1", features = ["profiling"] }
//! ```
//!
//! ```no_run
//! use sparse_ecs::profiling::{self, ProfilingConfig};
//!
//! let config = ProfilingConfig {
//!     json: true,
//!     log_file: Some("logs/ticks.jsonl".into()),
//!     ..Default::default()
//! };
//! // keep the guard alive or buffered lines are lost
//! let _guard = profiling::init(&config).unwrap();
//! ```
//!
//! Profile in release mode; debug builds also run the slot-initialization asserts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

use crate::error::{EcsError, Result};

/// Where and how tick traces are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilingConfig {
    /// Maximum level recorded: `trace`, `debug`, `info`, `warn` or `error`
    pub level: String,
    /// Emit one JSON object per line instead of plain text
    pub json: bool,
    /// Write to this file instead of stdout
    pub log_file: Option<PathBuf>,
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            log_file: None,
        }
    }
}

/// Install the global subscriber described by `config`.
///
/// Returns the appender's worker guard when logging to a file. Fails if the
/// level is unknown or a global subscriber is already set.
pub fn init(config: &ProfilingConfig) -> Result<Option<WorkerGuard>> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| EcsError::Config(format!("unknown log level `{}`", config.level)))?;
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true);

    let Some(path) = &config.log_file else {
        let installed = if config.json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        installed.map_err(|e| EcsError::Config(e.to_string()))?;
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| EcsError::Config(format!("log_file `{}` has no file name", path.display())))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    let installed = if config.json {
        builder.json().with_writer(writer).try_init()
    } else {
        builder.with_ansi(false).with_writer(writer).try_init()
    };
    installed.map_err(|e| EcsError::Config(e.to_string()))?;
    Ok(Some(guard))
}
