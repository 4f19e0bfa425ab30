use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// Reader configuration; deserializable from TOML.
///
/// This is the flat form. `conf/config.toml` is normally written in tables
/// (see `tables.rs`) and converted into this shape.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct ReaderConfig {
    #[serde(default = "crate::config::defaults::default_line_height_px")]
    pub line_height_px: f32,
    #[serde(default = "crate::config::defaults::default_viewport_height_px")]
    pub viewport_height_px: f32,
    #[serde(default = "crate::config::defaults::default_buffer_lines")]
    pub buffer_lines: usize,
    #[serde(default = "crate::config::defaults::default_range_stability_lines")]
    pub range_stability_lines: usize,
    #[serde(default = "crate::config::defaults::default_scroll_debounce_ms")]
    pub scroll_debounce_ms: u64,
    #[serde(default = "crate::config::defaults::default_programmatic_settle_ms")]
    pub programmatic_settle_ms: u64,
    #[serde(default = "crate::config::defaults::default_scroll_activity_window_ms")]
    pub scroll_activity_window_ms: u64,
    #[serde(default = "crate::config::defaults::default_initial_restore_delay_ms")]
    pub initial_restore_delay_ms: u64,
    #[serde(default = "crate::config::defaults::default_double_tap_window_ms")]
    pub double_tap_window_ms: u64,
    #[serde(default = "crate::config::defaults::default_save_debounce_ms")]
    pub save_debounce_ms: u64,
    #[serde(default = "crate::config::defaults::default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "crate::config::defaults::default_search_max_scan_lines")]
    pub search_max_scan_lines: usize,
    #[serde(default = "crate::config::defaults::default_search_max_results")]
    pub search_max_results: usize,
    #[serde(default = "crate::config::defaults::default_search_min_query_len")]
    pub search_min_query_len: usize,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            line_height_px: crate::config::defaults::default_line_height_px(),
            viewport_height_px: crate::config::defaults::default_viewport_height_px(),
            buffer_lines: crate::config::defaults::default_buffer_lines(),
            range_stability_lines: crate::config::defaults::default_range_stability_lines(),
            scroll_debounce_ms: crate::config::defaults::default_scroll_debounce_ms(),
            programmatic_settle_ms: crate::config::defaults::default_programmatic_settle_ms(),
            scroll_activity_window_ms: crate::config::defaults::default_scroll_activity_window_ms(),
            initial_restore_delay_ms: crate::config::defaults::default_initial_restore_delay_ms(),
            double_tap_window_ms: crate::config::defaults::default_double_tap_window_ms(),
            save_debounce_ms: crate::config::defaults::default_save_debounce_ms(),
            tick_interval_ms: crate::config::defaults::default_tick_interval_ms(),
            search_max_scan_lines: crate::config::defaults::default_search_max_scan_lines(),
            search_max_results: crate::config::defaults::default_search_max_results(),
            search_min_query_len: crate::config::defaults::default_search_min_query_len(),
            log_level: crate::config::defaults::default_log_level(),
            cache_dir: crate::config::defaults::default_cache_dir(),
        }
    }
}

impl ReaderConfig {
    /// Replace values that would make geometry or timers meaningless.
    pub fn sanitized(mut self) -> Self {
        let defaults = ReaderConfig::default();
        if !(self.line_height_px.is_finite() && self.line_height_px > 0.0) {
            warn!(value = self.line_height_px, "Ignoring invalid line_height_px");
            self.line_height_px = defaults.line_height_px;
        }
        if !(self.viewport_height_px.is_finite() && self.viewport_height_px >= 0.0) {
            warn!(value = self.viewport_height_px, "Ignoring invalid viewport_height_px");
            self.viewport_height_px = defaults.viewport_height_px;
        }
        if self.double_tap_window_ms == 0 {
            warn!("double_tap_window_ms must be positive; using default");
            self.double_tap_window_ms = defaults.double_tap_window_ms;
        }
        if self.tick_interval_ms == 0 {
            self.tick_interval_ms = defaults.tick_interval_ms;
        }
        if self.search_max_results == 0 {
            warn!("search_max_results must be positive; using default");
            self.search_max_results = defaults.search_max_results;
        }
        if self.cache_dir.trim().is_empty() {
            self.cache_dir = defaults.cache_dir;
        }
        self
    }

    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms)
    }

    pub fn programmatic_settle(&self) -> Duration {
        Duration::from_millis(self.programmatic_settle_ms)
    }

    pub fn scroll_activity_window(&self) -> Duration {
        Duration::from_millis(self.scroll_activity_window_ms)
    }

    pub fn initial_restore_delay(&self) -> Duration {
        Duration::from_millis(self.initial_restore_delay_ms)
    }

    pub fn double_tap_window(&self) -> Duration {
        Duration::from_millis(self.double_tap_window_ms)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
