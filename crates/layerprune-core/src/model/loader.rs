//! Checkpoint weight loading.
//!
//! Reads the named tensors of a model directory into a [`ParameterMap`].
//! SafeTensors files are preferred; a lone `pytorch_model.bin` is read
//! through candle's pickle support.
//!
//! # Example
//!
//! ```ignore
//! use layerprune_core::model::WeightLoader;
//!
//! let params = WeightLoader::from_dir("/path/to/bert-base".as_ref(), &Device::Cpu)?;
//! println!("{} tensors", params.len());
//! ```

use crate::error::{PruneError, Result};
use crate::params::ParameterMap;
use candle_core::{Device, Tensor};
use safetensors::SafeTensors;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// PyTorch checkpoint file name used by Hugging Face model directories.
pub const PYTORCH_WEIGHTS_FILE: &str = "pytorch_model.bin";

/// Loads checkpoint tensors from disk.
pub struct WeightLoader;

impl WeightLoader {
    /// Load every tensor in a model directory.
    ///
    /// All `.safetensors` files are merged (sharded checkpoints); when there
    /// are none, `pytorch_model.bin` is used. Entries come back in
    /// numeric-aware name order.
    pub fn from_dir(dir: &Path, device: &Device) -> Result<ParameterMap<Tensor>> {
        let mut safetensor_files: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |e| e == "safetensors") {
                safetensor_files.push(path);
            }
        }
        safetensor_files.sort();

        let mut params = ParameterMap::new();
        if !safetensor_files.is_empty() {
            for path in &safetensor_files {
                for (name, tensor) in Self::load_safetensors_file(path, device)? {
                    params.insert(name, tensor);
                }
            }
        } else {
            let bin = dir.join(PYTORCH_WEIGHTS_FILE);
            if !bin.exists() {
                return Err(PruneError::ModelError(format!(
                    "no .safetensors or {PYTORCH_WEIGHTS_FILE} found in {}",
                    dir.display()
                )));
            }
            for (name, tensor) in Self::load_pytorch_file(&bin, device)? {
                params.insert(name, tensor);
            }
        }

        params.sort_natural();
        info!(tensors = params.len(), dir = %dir.display(), "loaded weights");
        Ok(params)
    }

    /// Load a single checkpoint file, picking the reader by extension.
    pub fn from_file(path: &Path, device: &Device) -> Result<ParameterMap<Tensor>> {
        let tensors = if path.extension().map_or(false, |e| e == "safetensors") {
            Self::load_safetensors_file(path, device)?
        } else {
            Self::load_pytorch_file(path, device)?
        };
        let mut params: ParameterMap<Tensor> = tensors.into_iter().collect();
        params.sort_natural();
        Ok(params)
    }

    /// Load tensors from a single safetensors file.
    fn load_safetensors_file(path: &Path, device: &Device) -> Result<Vec<(String, Tensor)>> {
        let data = fs::read(path)?;
        let safetensors = SafeTensors::deserialize(&data).map_err(|e| {
            PruneError::ModelError(format!("failed to deserialize {}: {}", path.display(), e))
        })?;

        let mut tensors = Vec::new();
        for (name, view) in safetensors.tensors() {
            let tensor = Self::view_to_tensor(&view, device).map_err(|e| match e {
                PruneError::ModelError(msg) => PruneError::ModelError(format!("{name}: {msg}")),
                other => other,
            })?;
            tensors.push((name, tensor));
        }
        debug!(file = %path.display(), tensors = tensors.len(), "read safetensors");
        Ok(tensors)
    }

    /// Load tensors from a PyTorch pickle checkpoint.
    fn load_pytorch_file(path: &Path, device: &Device) -> Result<Vec<(String, Tensor)>> {
        let tensors = candle_core::pickle::read_all(path)?;
        debug!(file = %path.display(), tensors = tensors.len(), "read pytorch checkpoint");
        tensors
            .into_iter()
            .map(|(name, t)| Ok((name, t.to_device(device)?)))
            .collect()
    }

    /// Convert a SafeTensors view to a Candle tensor.
    fn view_to_tensor(view: &safetensors::tensor::TensorView, device: &Device) -> Result<Tensor> {
        let shape: Vec<usize> = view.shape().to_vec();
        let data = view.data();

        let tensor = match view.dtype() {
            safetensors::Dtype::F32 => {
                let values: Vec<f32> = read_values(data);
                Tensor::from_vec(values, shape, device)?
            }
            safetensors::Dtype::F16 => {
                let values: Vec<half::f16> = read_values(data);
                Tensor::from_vec(values, shape, device)?
            }
            safetensors::Dtype::BF16 => {
                let values: Vec<half::bf16> = read_values(data);
                Tensor::from_vec(values, shape, device)?
            }
            safetensors::Dtype::I64 => {
                let values: Vec<i64> = read_values(data);
                Tensor::from_vec(values, shape, device)?
            }
            safetensors::Dtype::I32 => {
                // Candle has no I32, upcast
                let values: Vec<i32> = read_values(data);
                let values: Vec<i64> = values.into_iter().map(i64::from).collect();
                Tensor::from_vec(values, shape, device)?
            }
            safetensors::Dtype::U32 => {
                let values: Vec<u32> = read_values(data);
                Tensor::from_vec(values, shape, device)?
            }
            safetensors::Dtype::U8 => Tensor::from_vec(data.to_vec(), shape, device)?,
            other => {
                return Err(PruneError::ModelError(format!(
                    "unsupported dtype: {:?}",
                    other
                )));
            }
        };

        Ok(tensor)
    }
}

/// Copy little-endian bytes into typed values.
///
/// The byte buffer of a safetensors file carries no alignment guarantee, so
/// values are read unaligned instead of cast in place.
fn read_values<T: bytemuck::Pod>(data: &[u8]) -> Vec<T> {
    data.chunks_exact(std::mem::size_of::<T>())
        .map(bytemuck::pod_read_unaligned)
        .collect()
}
