use super::models::ReaderConfig;
use super::tables::ConfigTables;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

const TABLE_NAMES: [&str; 6] = [
    "viewport",
    "scroll",
    "gestures",
    "persistence",
    "search",
    "logging",
];

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> ReaderConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return ReaderConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err}");
            ReaderConfig::default()
        }
    }
}

/// Parse either the tabled layout or the flat layout, then sanitize.
pub fn parse_config(contents: &str) -> Result<ReaderConfig, toml::de::Error> {
    let raw: toml::Table = toml::from_str(contents)?;
    let tabled = raw.keys().any(|key| TABLE_NAMES.contains(&key.as_str()));
    let config = if tabled {
        ReaderConfig::from(toml::from_str::<ConfigTables>(contents)?)
    } else {
        toml::from_str::<ReaderConfig>(contents)?
    };
    Ok(config.sanitized())
}

pub fn serialize_config(config: &ReaderConfig) -> Result<String, toml::ser::Error> {
    toml::to_string(&ConfigTables::from(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(parse_config("").unwrap(), ReaderConfig::default());
    }

    #[test]
    fn tabled_layout_overrides_selected_fields() {
        let cfg = parse_config(
            r#"
            [viewport]
            line_height_px = 20.0
            buffer_lines = 30

            [gestures]
            double_tap_window_ms = 250

            [logging]
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.line_height_px, 20.0);
        assert_eq!(cfg.buffer_lines, 30);
        assert_eq!(cfg.double_tap_window_ms, 250);
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.save_debounce_ms, 1000);
    }

    #[test]
    fn flat_layout_is_accepted() {
        let cfg = parse_config("search_max_results = 5\nscroll_debounce_ms = 80\n").unwrap();
        assert_eq!(cfg.search_max_results, 5);
        assert_eq!(cfg.scroll_debounce_ms, 80);
    }

    #[test]
    fn invalid_geometry_is_replaced_with_defaults() {
        let cfg = parse_config("[viewport]\nline_height_px = 0.0\nviewport_height_px = -3.0\n")
            .unwrap();
        assert_eq!(cfg.line_height_px, 24.0);
        assert_eq!(cfg.viewport_height_px, 800.0);
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut cfg = ReaderConfig::default();
        cfg.buffer_lines = 75;
        cfg.log_level = LogLevel::Warn;
        let text = serialize_config(&cfg).unwrap();
        assert!(text.contains("[viewport]"));
        assert_eq!(parse_config(&text).unwrap(), cfg);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = load_config(Path::new("/nonexistent/guide-viewer/config.toml"));
        assert_eq!(cfg, ReaderConfig::default());
    }
}
