//! Parameter selection.

use crate::naming::ParamKind;
use crate::params::ParameterMap;
use crate::selection::LayerSelection;
use tracing::{debug, warn};

/// What to do with parameters that are neither embeddings, encoder blocks,
/// nor the pooler (task heads such as `cls.predictions.*`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnclassifiedPolicy {
    /// Leave them out of the pruned checkpoint.
    #[default]
    Drop,
    /// Carry them through untouched.
    Keep,
}

/// Filters a full parameter mapping down to the requested blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterSelector {
    unclassified: UnclassifiedPolicy,
}

impl ParameterSelector {
    /// Create a selector with the given unclassified-parameter policy.
    pub fn new(unclassified: UnclassifiedPolicy) -> Self {
        Self { unclassified }
    }

    /// Policy for unclassified parameters.
    pub fn unclassified_policy(&self) -> UnclassifiedPolicy {
        self.unclassified
    }

    /// Keep embeddings, the pooler, and the requested encoder blocks.
    ///
    /// Tensors are moved, not copied. Output order follows input order.
    pub fn select<T>(&self, all: ParameterMap<T>, selection: &LayerSelection) -> ParameterMap<T> {
        let dups = selection.duplicates();
        if !dups.is_empty() {
            warn!(?dups, "duplicate block indices in selection, keeping each block once");
        }

        let mut kept = ParameterMap::with_capacity(all.len());
        let mut unclassified = 0usize;

        for (name, value) in all {
            let keep = match ParamKind::of(&name) {
                ParamKind::Embedding | ParamKind::Pooler => true,
                ParamKind::EncoderBlock(idx) => selection.contains(idx),
                ParamKind::Unclassified => {
                    unclassified += 1;
                    self.unclassified == UnclassifiedPolicy::Keep
                }
            };

            if keep {
                kept.insert(name, value);
            } else {
                debug!(%name, "dropping parameter");
            }
        }

        if unclassified > 0 {
            match self.unclassified {
                UnclassifiedPolicy::Drop => warn!(
                    count = unclassified,
                    "dropped parameters outside embeddings/encoder/pooler"
                ),
                UnclassifiedPolicy::Keep => debug!(
                    count = unclassified,
                    "kept parameters outside embeddings/encoder/pooler"
                ),
            }
        }

        kept
    }
}

/// Select with the default policy (unclassified parameters dropped).
pub fn select<T>(all: ParameterMap<T>, selection: &LayerSelection) -> ParameterMap<T> {
    ParameterSelector::default().select(all, selection)
}
