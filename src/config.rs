//! Engine configuration.
//!
//! Hosts hand the engine a JSON blob (camelCase keys, every field optional):
//!
//! ```json
//! { "parser": { "loadTimeoutMs": 2000 }, "tailwind": { "maxCandidates": 500 } }
//! ```

use serde::Deserialize;
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserConfig {
    pub load_timeout_ms: u64,
    /// How long a failed load is replayed to callers before retrying.
    pub failure_cooldown_ms: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            load_timeout_ms: 10_000,
            failure_cooldown_ms: 5_000,
        }
    }
}

impl ParserConfig {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn failure_cooldown(&self) -> Duration {
        Duration::from_millis(self.failure_cooldown_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VfsConfig {
    pub max_import_depth: usize,
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self { max_import_depth: 20 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TailwindConfig {
    pub max_candidates: usize,
    pub max_css_bytes: usize,
    /// The CSS cache is cleared wholesale once it reaches this many entries.
    pub cache_max_entries: usize,
}

impl Default for TailwindConfig {
    fn default() -> Self {
        Self {
            max_candidates: 2_000,
            max_css_bytes: 512 * 1024,
            cache_max_entries: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InspectConfig {
    pub max_text_ranges: usize,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self { max_text_ranges: 120 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// One level of indentation for inserted children.
    pub indent_unit: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent_unit: "  ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub parser: ParserConfig,
    pub vfs: VfsConfig,
    pub tailwind: TailwindConfig,
    pub inspect: InspectConfig,
    pub editor: EditorConfig,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parser.load_timeout_ms == 0 {
            return Err(ConfigError::Zero {
                field: "parser.loadTimeoutMs",
            });
        }
        if self.vfs.max_import_depth == 0 {
            return Err(ConfigError::Zero {
                field: "vfs.maxImportDepth",
            });
        }
        if self.tailwind.max_candidates == 0 {
            return Err(ConfigError::Zero {
                field: "tailwind.maxCandidates",
            });
        }
        if self.tailwind.max_css_bytes == 0 {
            return Err(ConfigError::Zero {
                field: "tailwind.maxCssBytes",
            });
        }
        Ok(())
    }
}
