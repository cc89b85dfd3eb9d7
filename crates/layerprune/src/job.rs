//! End-to-end pruning of a model directory.

use anyhow::{Context, Result};
use candle_core::Device;
use layerprune_core::{
    model::{save_checkpoint, BertConfig, TokenizerFiles, WeightLoader},
    params::ParamSummary,
    prune::{prune, DepthConfig, UnclassifiedPolicy},
    selection::LayerSelection,
    PruneError,
};
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default destination directory.
pub const DEFAULT_OUTPUT_DIR: &str = "./prune_model";

/// Configuration for a pruning job.
#[derive(Debug, Clone)]
pub struct PruneJobConfig {
    /// Source model directory.
    pub model_path: PathBuf,
    /// Destination directory for the pruned model.
    pub output_path: PathBuf,
    /// Blocks to keep.
    pub selection: LayerSelection,
    /// What to do with parameters outside embeddings/encoder/pooler.
    pub unclassified: UnclassifiedPolicy,
    /// Run the transform but write nothing.
    pub dry_run: bool,
    /// Record every source parameter in the report.
    pub list_parameters: bool,
}

impl Default for PruneJobConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_DIR),
            selection: LayerSelection::First(2),
            unclassified: UnclassifiedPolicy::Drop,
            dry_run: false,
            list_parameters: false,
        }
    }
}

/// Builder for creating a [`PruneJob`].
pub struct PruneJobBuilder {
    config: PruneJobConfig,
}

impl PruneJobBuilder {
    /// Create a new job builder.
    pub fn new() -> Self {
        Self {
            config: PruneJobConfig::default(),
        }
    }

    /// Set source model path.
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.model_path = path.into();
        self
    }

    /// Set destination path.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    /// Set the blocks to keep.
    pub fn selection(mut self, selection: impl Into<LayerSelection>) -> Self {
        self.config.selection = selection.into();
        self
    }

    /// Set the unclassified-parameter policy.
    pub fn unclassified(mut self, policy: UnclassifiedPolicy) -> Self {
        self.config.unclassified = policy;
        self
    }

    /// Skip writing the pruned model.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// Include the source parameter listing in the report.
    pub fn list_parameters(mut self, list: bool) -> Self {
        self.config.list_parameters = list;
        self
    }

    /// Build the job.
    pub fn build(self) -> PruneJob {
        PruneJob {
            config: self.config,
        }
    }
}

impl Default for PruneJobBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads a model directory, prunes it, and saves the result.
#[derive(Debug, Clone)]
pub struct PruneJob {
    config: PruneJobConfig,
}

impl PruneJob {
    /// Create a job builder.
    pub fn builder() -> PruneJobBuilder {
        PruneJobBuilder::new()
    }

    /// Create a job from a configuration.
    pub fn new(config: PruneJobConfig) -> Self {
        Self { config }
    }

    /// Job configuration.
    pub fn config(&self) -> &PruneJobConfig {
        &self.config
    }

    /// Run the job.
    pub fn run(&self) -> Result<PruneReport> {
        let cfg = &self.config;
        cfg.selection.validate()?;
        let source = cfg.model_path.as_path();
        if !source.exists() {
            return Err(PruneError::SourceNotFound(source.to_path_buf()).into());
        }

        info!(model = %source.display(), selection = %cfg.selection, "loading model");
        let config = BertConfig::from_dir(source)
            .with_context(|| format!("reading config from {}", source.display()))?;
        let params = WeightLoader::from_dir(source, &Device::Cpu)
            .with_context(|| format!("reading weights from {}", source.display()))?;
        let tokenizer = TokenizerFiles::discover(source)
            .with_context(|| format!("reading tokenizer from {}", source.display()))?;

        let source_parameters = if cfg.list_parameters {
            params.summaries()
        } else {
            Vec::new()
        };
        let source_depth = config.num_hidden_layers();
        let source_blocks = params.block_indices().len();
        let source_count = params.len();

        info!("pruning model");
        let pruned = prune(params, &config, &cfg.selection, cfg.unclassified)?;

        let mut written = Vec::new();
        let destination = if cfg.dry_run {
            None
        } else {
            let dest = cfg.output_path.as_path();
            std::fs::create_dir_all(dest)
                .with_context(|| format!("creating {}", dest.display()))?;
            info!(dest = %dest.display(), "saving pruned model");
            written.push(save_checkpoint(&pruned.params, dest)?);
            written.push(pruned.config.save_pretrained(dest)?);
            written.extend(tokenizer.save_pretrained(dest)?);
            Some(dest.to_path_buf())
        };

        Ok(PruneReport {
            source: source.to_path_buf(),
            destination,
            selection: cfg.selection.clone(),
            source_depth,
            source_blocks,
            final_depth: pruned.config.num_hidden_layers(),
            renumbering: pruned.report.renumbering().collect(),
            missing_blocks: pruned.report.missing_blocks.clone(),
            missing_tail: pruned.report.missing_tail.clone(),
            warnings: pruned.report.warnings.clone(),
            source_parameters,
            kept_parameters: pruned.params.len(),
            dropped_parameters: source_count - pruned.params.len(),
            kept_elements: pruned.params.element_count(),
            written,
        })
    }
}

/// Summary of a finished job.
#[derive(Debug, Clone)]
pub struct PruneReport {
    /// Source model directory.
    pub source: PathBuf,
    /// Destination directory, `None` for a dry run.
    pub destination: Option<PathBuf>,
    /// Blocks that were requested.
    pub selection: LayerSelection,
    /// Depth declared by the source configuration.
    pub source_depth: usize,
    /// Encoder blocks actually present in the source weights.
    pub source_blocks: usize,
    /// Depth of the pruned model.
    pub final_depth: usize,
    /// `(source index, new index)` for every kept block.
    pub renumbering: Vec<(usize, usize)>,
    /// Requested blocks the source does not have.
    pub missing_blocks: Vec<usize>,
    /// Missing range past the source's last block, for a leading count.
    pub missing_tail: Option<Range<usize>>,
    /// Advisory diagnostics raised while pruning.
    pub warnings: Vec<String>,
    /// Source parameter listing, when requested.
    pub source_parameters: Vec<ParamSummary>,
    /// Parameters in the pruned checkpoint.
    pub kept_parameters: usize,
    /// Parameters left out.
    pub dropped_parameters: usize,
    /// Scalar elements in the pruned checkpoint.
    pub kept_elements: usize,
    /// Files written.
    pub written: Vec<PathBuf>,
}

impl PruneReport {
    /// Whether anything was written.
    pub fn is_dry_run(&self) -> bool {
        self.destination.is_none()
    }

    /// Path of a written file by name.
    pub fn written_file(&self, name: &str) -> Option<&Path> {
        self.written
            .iter()
            .find(|p| p.file_name().map_or(false, |n| n == name))
            .map(PathBuf::as_path)
    }
}

impl fmt::Display for PruneReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let blocks: Vec<String> = self
            .renumbering
            .iter()
            .map(|(old, new)| format!("{old}->{new}"))
            .collect();

        writeln!(f, "  Source:        {}", self.source.display())?;
        writeln!(f, "  Selection:     {}", self.selection)?;
        writeln!(
            f,
            "  Depth:         {} ({} blocks in weights) -> {}",
            self.source_depth, self.source_blocks, self.final_depth
        )?;
        writeln!(f, "  Blocks:        {}", blocks.join(" "))?;
        let mut missing: Vec<String> =
            self.missing_blocks.iter().map(usize::to_string).collect();
        if let Some(tail) = &self.missing_tail {
            missing.push(format!("{}..{}", tail.start, tail.end));
        }
        if !missing.is_empty() {
            writeln!(f, "  Missing:       {}", missing.join(" "))?;
        }
        for warning in &self.warnings {
            writeln!(f, "  Warning:       {warning}")?;
        }
        writeln!(
            f,
            "  Parameters:    {} kept, {} dropped ({} elements)",
            self.kept_parameters, self.dropped_parameters, self.kept_elements
        )?;
        match &self.destination {
            Some(dest) => write!(f, "  Output:        {}", dest.display()),
            None => write!(f, "  Output:        (dry run, nothing written)"),
        }
    }
}
