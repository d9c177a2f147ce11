//=========================================================================
// Engine Configuration
//=========================================================================
//
// TOML-backed settings for engine construction. Every field is optional
// in the file; missing ones take the defaults below.
//
// ```toml
// plugin_dir     = "libs"
// kernel_pattern = "kernel"
// textures_dir   = "."
// collision_mode = "all_to_all"   # "none" | "one_to_all" | "all_to_all"
// feed_capacity  = 128
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::core::error::{EngineError, EngineResult};
use crate::core::physics::CollisionMode;

//=== EngineConfig ========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory scanned for the kernel plugin.
    #[serde(default = "default_plugin_dir")]
    pub plugin_dir: PathBuf,

    /// Substring a file name must contain to be picked as the kernel.
    #[serde(default = "default_kernel_pattern")]
    pub kernel_pattern: String,

    /// Root for texture names.
    #[serde(default = "default_textures_dir")]
    pub textures_dir: PathBuf,

    #[serde(default)]
    pub collision_mode: CollisionMode,

    /// Channel bound for in-process kernels fed through a `KernelFeed`.
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,
}

fn default_plugin_dir() -> PathBuf {
    PathBuf::from("libs")
}
fn default_kernel_pattern() -> String {
    "kernel".to_string()
}
fn default_textures_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_feed_capacity() -> usize {
    128
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            plugin_dir: default_plugin_dir(),
            kernel_pattern: default_kernel_pattern(),
            textures_dir: default_textures_dir(),
            collision_mode: CollisionMode::default(),
            feed_capacity: default_feed_capacity(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        toml::from_str(text)
            .map_err(|e| EngineError::Configuration(format!("invalid engine config: {e}")))
    }

    /// Reads and parses a config file.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            EngineError::Configuration(format!("cannot read '{}': {e}", path.display()))
        })?;

        Self::from_toml_str(&text)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.plugin_dir, PathBuf::from("libs"));
        assert_eq!(config.collision_mode, CollisionMode::AllToAll);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            plugin_dir = "plugins"
            collision_mode = "one_to_all"
            "#,
        )
        .unwrap();

        assert_eq!(config.plugin_dir, PathBuf::from("plugins"));
        assert_eq!(config.collision_mode, CollisionMode::OneToAll);
        assert_eq!(config.kernel_pattern, "kernel");
        assert_eq!(config.feed_capacity, 128);
    }

    #[test]
    fn unknown_mode_is_a_configuration_error() {
        let result = EngineConfig::from_toml_str(r#"collision_mode = "sometimes""#);
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn load_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "textures_dir = \"assets/textures\"").unwrap();
        writeln!(file, "feed_capacity = 16").unwrap();

        let config = EngineConfig::load(file.path()).unwrap();

        assert_eq!(config.textures_dir, PathBuf::from("assets/textures"));
        assert_eq!(config.feed_capacity, 16);
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let result = EngineConfig::load(Path::new("/definitely/missing/engine.toml"));
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }
}
