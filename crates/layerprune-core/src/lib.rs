//! # Layerprune Core
//!
//! Depth pruning for BERT-family encoders: keep a subset of transformer
//! blocks and re-emit a checkpoint that loads as an ordinary shallower model.
//!
//! This crate provides:
//! - **Parameter naming**: classify tensors as embedding, encoder block,
//!   pooler, or unclassified
//! - **Layer selection**: first-N or explicit block indices
//! - **The transform**: selection, depth adjustment, and contiguous
//!   renumbering of surviving blocks
//! - **Model I/O**: `config.json`, safetensors/PyTorch weights, tokenizer
//!   pass-through

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod model;
pub mod naming;
pub mod params;
pub mod prune;
pub mod selection;

pub use error::{PruneError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{PruneError, Result};
    pub use crate::model::{BertConfig, TokenizerFiles, WeightLoader};
    pub use crate::naming::ParamKind;
    pub use crate::params::ParameterMap;
    pub use crate::prune::{
        adjust_config, prune, reconcile, select, DepthConfig, ParameterSelector, ReconcileReport,
        Reconciled, UnclassifiedPolicy,
    };
    pub use crate::selection::LayerSelection;
}
