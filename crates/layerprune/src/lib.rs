//! # Layerprune
//!
//! Reduce the depth of a BERT-family encoder by keeping a subset of its
//! transformer blocks.
//!
//! The pruned directory holds a `model.safetensors` with contiguously
//! renumbered blocks, a `config.json` declaring the new depth, and the
//! source tokenizer files, so it loads as an ordinary shallower model.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use layerprune::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let report = PruneJob::builder()
//!         .model_path("bert-base-uncased")
//!         .output_path("bert-4-layers")
//!         .selection(vec![0usize, 3, 7, 11])
//!         .build()
//!         .run()?;
//!
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// Re-export core crate
pub use layerprune_core::*;

mod job;

pub use job::{PruneJob, PruneJobBuilder, PruneJobConfig, PruneReport, DEFAULT_OUTPUT_DIR};

/// Commonly used types.
pub mod prelude {
    pub use crate::job::{PruneJob, PruneJobBuilder, PruneJobConfig, PruneReport};
    pub use crate::{
        error::{PruneError, Result},
        model::{BertConfig, TokenizerFiles, WeightLoader},
        params::ParameterMap,
        prune::{prune, DepthConfig, ReconcileReport, UnclassifiedPolicy},
        selection::LayerSelection,
    };

    // Re-export useful external types
    pub use anyhow;
    pub use tracing;
}
