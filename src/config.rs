use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::style::{NamedStyles, StyleSheet};

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub tokenizer: TokenizerConfig,
    pub layout: LayoutConfig,
    pub fallback: FallbackConfig,
    /// Per-slot style overrides, e.g. `[styles.link]`.
    pub styles: NamedStyles,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub tables: bool,
    pub task_lists: bool,
    pub strikethrough: bool,
    pub strip_front_matter: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            tables: true,
            task_lists: true,
            strikethrough: true,
            strip_front_matter: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Left margin added per level of list nesting.
    pub indent_per_level: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            indent_per_level: 16.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub message: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            message: "Unable to render this content.".to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file, or return defaults if not found.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Load config from a TOML file, reporting every problem.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse config from TOML text. Style overrides must name known slots.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        StyleSheet::default().try_with_overrides(config.styles.clone())?;
        Ok(config)
    }

    /// Built-in styles with this config's overrides applied.
    pub fn style_sheet(&self) -> StyleSheet {
        StyleSheet::compiled_default().with_overrides(self.styles.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Slot, StyleValue};

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert!(config.tokenizer.tables);
        assert!(config.tokenizer.strip_front_matter);
        assert_eq!(config.layout.indent_per_level, 16.0);
        assert_eq!(config.fallback.message, "Unable to render this content.");
        assert!(config.styles.is_empty());
    }

    #[test]
    fn partial_sections() {
        let config = Config::from_toml(
            r##"
[tokenizer]
tables = false

[layout]
indent_per_level = 24.0

[fallback]
message = "Oops"

[styles.link]
color = "#ff0000"
"##,
        )
        .unwrap();
        assert!(!config.tokenizer.tables);
        assert!(config.tokenizer.task_lists);
        assert_eq!(config.layout.indent_per_level, 24.0);
        assert_eq!(config.fallback.message, "Oops");

        let sheet = config.style_sheet();
        let link = sheet.style(Slot::Link);
        assert_eq!(link.get("color"), Some(&StyleValue::from("#ff0000")));
        assert!(link.contains_key("textDecorationLine"));
    }

    #[test]
    fn unknown_slot_is_rejected() {
        let result = Config::from_toml("[styles.sidebar]\nwidth = 10\n");
        assert!(matches!(result, Err(ConfigError::UnknownSlot(name)) if name == "sidebar"));
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(matches!(
            Config::from_toml("[layout\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_falls_back_to_defaults() {
        let config = Config::load(Path::new("/nonexistent/mdnative.toml"));
        assert_eq!(config.layout.indent_per_level, 16.0);
    }

    #[test]
    fn from_path_reports_missing_file() {
        assert!(matches!(
            Config::from_path(Path::new("/nonexistent/mdnative.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
