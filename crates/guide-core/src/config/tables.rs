use super::defaults;
use super::models::{LogLevel, ReaderConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, serde::Serialize, Default)]
pub(super) struct ConfigTables {
    #[serde(default)]
    viewport: ViewportConfig,
    #[serde(default)]
    scroll: ScrollConfig,
    #[serde(default)]
    gestures: GestureConfig,
    #[serde(default)]
    persistence: PersistenceConfig,
    #[serde(default)]
    search: SearchConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for ReaderConfig {
    fn from(tables: ConfigTables) -> Self {
        ReaderConfig {
            line_height_px: tables.viewport.line_height_px,
            viewport_height_px: tables.viewport.viewport_height_px,
            buffer_lines: tables.viewport.buffer_lines,
            range_stability_lines: tables.viewport.range_stability_lines,
            scroll_debounce_ms: tables.scroll.debounce_ms,
            programmatic_settle_ms: tables.scroll.programmatic_settle_ms,
            scroll_activity_window_ms: tables.scroll.activity_window_ms,
            initial_restore_delay_ms: tables.scroll.initial_restore_delay_ms,
            tick_interval_ms: tables.scroll.tick_interval_ms,
            double_tap_window_ms: tables.gestures.double_tap_window_ms,
            save_debounce_ms: tables.persistence.save_debounce_ms,
            cache_dir: tables.persistence.cache_dir,
            search_max_scan_lines: tables.search.max_scan_lines,
            search_max_results: tables.search.max_results,
            search_min_query_len: tables.search.min_query_len,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&ReaderConfig> for ConfigTables {
    fn from(config: &ReaderConfig) -> Self {
        ConfigTables {
            viewport: ViewportConfig {
                line_height_px: config.line_height_px,
                viewport_height_px: config.viewport_height_px,
                buffer_lines: config.buffer_lines,
                range_stability_lines: config.range_stability_lines,
            },
            scroll: ScrollConfig {
                debounce_ms: config.scroll_debounce_ms,
                programmatic_settle_ms: config.programmatic_settle_ms,
                activity_window_ms: config.scroll_activity_window_ms,
                initial_restore_delay_ms: config.initial_restore_delay_ms,
                tick_interval_ms: config.tick_interval_ms,
            },
            gestures: GestureConfig {
                double_tap_window_ms: config.double_tap_window_ms,
            },
            persistence: PersistenceConfig {
                save_debounce_ms: config.save_debounce_ms,
                cache_dir: config.cache_dir.clone(),
            },
            search: SearchConfig {
                max_scan_lines: config.search_max_scan_lines,
                max_results: config.search_max_results,
                min_query_len: config.search_min_query_len,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ViewportConfig {
    #[serde(default = "defaults::default_line_height_px")]
    line_height_px: f32,
    #[serde(default = "defaults::default_viewport_height_px")]
    viewport_height_px: f32,
    #[serde(default = "defaults::default_buffer_lines")]
    buffer_lines: usize,
    #[serde(default = "defaults::default_range_stability_lines")]
    range_stability_lines: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        ViewportConfig {
            line_height_px: defaults::default_line_height_px(),
            viewport_height_px: defaults::default_viewport_height_px(),
            buffer_lines: defaults::default_buffer_lines(),
            range_stability_lines: defaults::default_range_stability_lines(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ScrollConfig {
    #[serde(default = "defaults::default_scroll_debounce_ms")]
    debounce_ms: u64,
    #[serde(default = "defaults::default_programmatic_settle_ms")]
    programmatic_settle_ms: u64,
    #[serde(default = "defaults::default_scroll_activity_window_ms")]
    activity_window_ms: u64,
    #[serde(default = "defaults::default_initial_restore_delay_ms")]
    initial_restore_delay_ms: u64,
    #[serde(default = "defaults::default_tick_interval_ms")]
    tick_interval_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        ScrollConfig {
            debounce_ms: defaults::default_scroll_debounce_ms(),
            programmatic_settle_ms: defaults::default_programmatic_settle_ms(),
            activity_window_ms: defaults::default_scroll_activity_window_ms(),
            initial_restore_delay_ms: defaults::default_initial_restore_delay_ms(),
            tick_interval_ms: defaults::default_tick_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct GestureConfig {
    #[serde(default = "defaults::default_double_tap_window_ms")]
    double_tap_window_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            double_tap_window_ms: defaults::default_double_tap_window_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct PersistenceConfig {
    #[serde(default = "defaults::default_save_debounce_ms")]
    save_debounce_ms: u64,
    #[serde(default = "defaults::default_cache_dir")]
    cache_dir: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        PersistenceConfig {
            save_debounce_ms: defaults::default_save_debounce_ms(),
            cache_dir: defaults::default_cache_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct SearchConfig {
    #[serde(default = "defaults::default_search_max_scan_lines")]
    max_scan_lines: usize,
    #[serde(default = "defaults::default_search_max_results")]
    max_results: usize,
    #[serde(default = "defaults::default_search_min_query_len")]
    min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_scan_lines: defaults::default_search_max_scan_lines(),
            max_results: defaults::default_search_max_results(),
            min_query_len: defaults::default_search_min_query_len(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}
