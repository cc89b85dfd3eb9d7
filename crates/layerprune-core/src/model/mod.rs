//! Model directory I/O.
//!
//! Reads and writes the pieces of a Hugging Face style model directory:
//! - Configuration (`config.json`)
//! - Weights (`*.safetensors` or `pytorch_model.bin`)
//! - Tokenizer artifacts

mod config;
mod loader;
mod tokenizer;
mod writer;

pub use config::{BertConfig, CONFIG_FILE};
pub use loader::{WeightLoader, PYTORCH_WEIGHTS_FILE};
pub use tokenizer::{TokenizerFiles, TOKENIZER_FILES};
pub use writer::{save_checkpoint, CHECKPOINT_FILE};
