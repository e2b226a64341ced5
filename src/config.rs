//! Engine configuration loaded from TOML
//!
//! A config names the directories whose files become views and includes:
//!
//! ```toml
//! extension = ".html"
//! recursive = true
//! view_dirs = ["templates/views"]
//! include_dirs = ["templates/includes"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::engine::Engine;
use crate::loader::{self, LoadError, DEFAULT_EXTENSION};

/// Errors that can occur when loading or parsing a config
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Which directories an engine scans for templates
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Roots whose files register as views
    pub view_dirs: Vec<PathBuf>,
    /// Roots whose files register as includes
    pub include_dirs: Vec<PathBuf>,
    /// File extension filter, suffix-matched
    pub extension: String,
    /// Whether to descend into subdirectories
    pub recursive: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            view_dirs: Vec::new(),
            include_dirs: Vec::new(),
            extension: DEFAULT_EXTENSION.to_string(),
            recursive: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_str(&content)?)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load every configured directory into `engine`
    ///
    /// View directories load first, then include directories, each with the
    /// loader's usual key derivation and abort-on-failure semantics.
    pub fn apply(&self, engine: &mut Engine) -> Result<(), LoadError> {
        for dir in &self.view_dirs {
            loader::load_dir(engine.views_mut(), dir, self.recursive, &self.extension)?;
        }
        for dir in &self.include_dirs {
            loader::load_dir(engine.includes_mut(), dir, self.recursive, &self.extension)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.view_dirs.is_empty());
        assert!(config.include_dirs.is_empty());
        assert_eq!(config.extension, ".html");
        assert!(config.recursive);
    }

    #[test]
    fn test_parse_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_str(r#"view_dirs = ["views"]"#).expect("Should parse");
        assert_eq!(config.view_dirs, vec![PathBuf::from("views")]);
        assert_eq!(config.extension, ".html");
        assert!(config.recursive);
    }

    #[test]
    fn test_parse_full_toml() {
        let config = EngineConfig::from_str(
            r#"
            extension = ".tpl"
            recursive = false
            view_dirs = ["v1", "v2"]
            include_dirs = ["inc"]
            "#,
        )
        .expect("Should parse");
        assert_eq!(config.view_dirs.len(), 2);
        assert_eq!(config.include_dirs, vec![PathBuf::from("inc")]);
        assert_eq!(config.extension, ".tpl");
        assert!(!config.recursive);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(EngineConfig::from_str("views = []").is_err());
    }

    #[test]
    fn test_apply_loads_configured_dirs() {
        let dir = tempfile::tempdir().expect("Should create tempdir");
        std::fs::create_dir_all(dir.path().join("views")).unwrap();
        std::fs::create_dir_all(dir.path().join("includes")).unwrap();
        std::fs::write(dir.path().join("views/home.html"), "home").unwrap();
        std::fs::write(dir.path().join("includes/footer.html"), "footer").unwrap();

        let config = EngineConfig {
            view_dirs: vec![dir.path().join("views")],
            include_dirs: vec![dir.path().join("includes")],
            ..EngineConfig::default()
        };

        let mut engine = Engine::new();
        config.apply(&mut engine).expect("Should apply");
        assert!(engine.views().contains("home"));
        assert!(engine.includes().contains("footer"));
    }
}
