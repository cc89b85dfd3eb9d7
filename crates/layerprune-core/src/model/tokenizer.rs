//! Tokenizer pass-through.
//!
//! Pruning never touches the vocabulary, so tokenizer artifacts are copied
//! to the pruned model directory byte for byte. A `tokenizer.json`, when
//! present, is parsed with the HuggingFace tokenizers library first so a
//! corrupt file is caught before anything is written.

use crate::error::{PruneError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer as HfTokenizer;
use tracing::{debug, info};

/// Tokenizer files a BERT-family model directory may carry.
pub const TOKENIZER_FILES: &[&str] = &[
    "tokenizer.json",
    "vocab.txt",
    "tokenizer_config.json",
    "special_tokens_map.json",
    "added_tokens.json",
];

/// Tokenizer artifacts found in a model directory.
#[derive(Debug, Clone)]
pub struct TokenizerFiles {
    /// Paths of the artifacts, in [`TOKENIZER_FILES`] order.
    files: Vec<PathBuf>,
    /// Vocabulary size from `tokenizer.json`, if there is one.
    vocab_size: Option<usize>,
}

impl TokenizerFiles {
    /// Find the tokenizer artifacts in `model_dir`.
    pub fn discover<P: AsRef<Path>>(model_dir: P) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let files: Vec<PathBuf> = TOKENIZER_FILES
            .iter()
            .map(|name| model_dir.join(name))
            .filter(|path| path.is_file())
            .collect();

        if files.is_empty() {
            return Err(PruneError::ModelError(format!(
                "no tokenizer files ({}) found in {}",
                TOKENIZER_FILES.join(", "),
                model_dir.display()
            )));
        }

        let tokenizer_json = model_dir.join("tokenizer.json");
        let vocab_size = if tokenizer_json.is_file() {
            let tokenizer = HfTokenizer::from_file(&tokenizer_json).map_err(|e| {
                PruneError::ModelError(format!("failed to load tokenizer: {}", e))
            })?;
            Some(tokenizer.get_vocab_size(true))
        } else {
            None
        };

        info!(files = files.len(), ?vocab_size, "found tokenizer");
        Ok(Self { files, vocab_size })
    }

    /// Artifact paths.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Vocabulary size, when a `tokenizer.json` was found.
    pub fn vocab_size(&self) -> Option<usize> {
        self.vocab_size
    }

    /// Copy every artifact into `dest`, returning the written paths.
    pub fn save_pretrained(&self, dest: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.files.len());
        for src in &self.files {
            let Some(name) = src.file_name() else {
                continue;
            };
            let target = dest.join(name);
            fs::copy(src, &target)?;
            debug!(file = %target.display(), "copied tokenizer file");
            written.push(target);
        }
        Ok(written)
    }
}
