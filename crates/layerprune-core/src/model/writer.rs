//! Pruned checkpoint output.

use crate::error::{PruneError, Result};
use crate::params::ParameterMap;
use candle_core::Tensor;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the written checkpoint.
pub const CHECKPOINT_FILE: &str = "model.safetensors";

/// Write `params` into `dir` as a single `model.safetensors`.
///
/// The header carries `format = pt`, which HuggingFace loaders require
/// before they accept a safetensors checkpoint for a PyTorch model.
pub fn save_checkpoint(params: &ParameterMap<Tensor>, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(CHECKPOINT_FILE);
    let metadata: Option<HashMap<String, String>> =
        Some([("format".to_string(), "pt".to_string())].into_iter().collect());

    safetensors::tensor::serialize_to_file(params.iter(), &metadata, &path).map_err(|e| {
        PruneError::CheckpointError(format!("failed to write {}: {}", path.display(), e))
    })?;

    info!(tensors = params.len(), file = %path.display(), "saved checkpoint");
    Ok(path)
}
