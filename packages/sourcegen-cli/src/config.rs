use std::fs;
use std::path::{Path, PathBuf};

use composer_sourcegen::GenerateOptions;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "sourcegen.json";

/// Project configuration read from `sourcegen.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcegenConfig {
    #[serde(flatten)]
    pub options: GenerateOptions,
    pub out_dir: Option<PathBuf>,
    #[serde(default)]
    pub source_map: bool,
    #[serde(default)]
    pub source_map_comment: bool,
}

impl SourcegenConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SourcegenConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise `sourcegen.json` from the working
    /// directory if it exists, otherwise the defaults.
    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path)
                .map_err(|e| anyhow::anyhow!("failed to load {}: {}", path.display(), e)),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }
}
