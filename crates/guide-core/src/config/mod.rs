//! Configuration loading for the guide reader.
//!
//! All tunables (geometry, timing windows, search limits, logging) are
//! centralized here and loaded from `conf/config.toml` if present. Missing or
//! invalid entries fall back to defaults so reading can always start.

mod defaults;
mod io;
mod models;
mod tables;

pub use io::{load_config, parse_config, serialize_config};
pub use models::{LogLevel, ReaderConfig};
