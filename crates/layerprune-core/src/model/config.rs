//! Model configuration.

use crate::error::{PruneError, Result};
use crate::prune::DepthConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the configuration inside a model directory.
pub const CONFIG_FILE: &str = "config.json";

/// Configuration of a BERT-family encoder (`config.json`).
///
/// Only the fields the pruner reads are typed; everything else is kept in
/// `extra` and written back as it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BertConfig {
    /// Number of encoder blocks.
    pub num_hidden_layers: usize,
    /// Model architecture type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    /// Hidden dimension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_size: Option<usize>,
    /// Number of attention heads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_attention_heads: Option<usize>,
    /// All remaining fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BertConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Load `config.json` from a model directory.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Err(PruneError::ModelError(format!(
                "{CONFIG_FILE} not found in {}",
                dir.display()
            )));
        }
        Self::from_file(&path)
    }

    /// Write `config.json` into `dir`.
    pub fn save_pretrained(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(CONFIG_FILE);
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

impl DepthConfig for BertConfig {
    fn num_hidden_layers(&self) -> usize {
        self.num_hidden_layers
    }

    fn with_num_hidden_layers(&self, depth: usize) -> Self {
        Self {
            num_hidden_layers: depth,
            ..self.clone()
        }
    }
}
