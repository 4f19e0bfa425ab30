pub(crate) fn default_line_height_px() -> f32 {
    24.0
}

pub(crate) fn default_viewport_height_px() -> f32 {
    800.0
}

pub(crate) fn default_buffer_lines() -> usize {
    50
}

pub(crate) fn default_range_stability_lines() -> usize {
    10
}

pub(crate) fn default_scroll_debounce_ms() -> u64 {
    50
}

pub(crate) fn default_programmatic_settle_ms() -> u64 {
    800
}

pub(crate) fn default_scroll_activity_window_ms() -> u64 {
    500
}

pub(crate) fn default_initial_restore_delay_ms() -> u64 {
    200
}

pub(crate) fn default_double_tap_window_ms() -> u64 {
    300
}

pub(crate) fn default_save_debounce_ms() -> u64 {
    1000
}

pub(crate) fn default_tick_interval_ms() -> u64 {
    50
}

pub(crate) fn default_search_max_scan_lines() -> usize {
    10_000
}

pub(crate) fn default_search_max_results() -> usize {
    20
}

pub(crate) fn default_search_min_query_len() -> usize {
    3
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}

pub(crate) fn default_cache_dir() -> String {
    ".cache".to_string()
}
