//! Block renumbering and depth reconciliation.
//!
//! After selection the surviving blocks may have gaps (`{1, 3}`), may be
//! fewer than requested (indices past the model's depth), and the nominal
//! configuration may disagree with both. Reconciliation rewrites the
//! surviving blocks to `0..k` in ascending source order and produces a
//! configuration declaring exactly `k` blocks.

use super::adjust::DepthConfig;
use crate::error::{PruneError, Result};
use crate::naming::{renumber_block, ParamKind};
use crate::params::ParameterMap;
use crate::selection::LayerSelection;
use std::collections::HashMap;
use std::ops::Range;
use tracing::{debug, warn};

/// Outcome of reconciliation.
#[derive(Debug, Clone)]
pub struct Reconciled<T, C> {
    /// Parameters with contiguous block indices.
    pub params: ParameterMap<T>,
    /// Configuration declaring the surviving depth.
    pub config: C,
    /// What was renumbered and corrected.
    pub report: ReconcileReport,
}

/// Details of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Source block indices that survived, ascending. Block `kept_blocks[i]`
    /// became block `i`.
    pub kept_blocks: Vec<usize>,
    /// Requested indices that had no parameters in the source. Explicit lists
    /// keep request order; a leading count lists its gaps ascending.
    pub missing_blocks: Vec<usize>,
    /// Missing indices past the last source block for a leading count
    /// (`First(n)` with `n` beyond the model), kept as a range.
    pub missing_tail: Option<Range<usize>>,
    /// Largest index the request asked for.
    pub requested_max: Option<usize>,
    /// Depth the incoming configuration declared.
    pub nominal_depth: usize,
    /// Advisory diagnostics, also logged at `warn`.
    pub warnings: Vec<String>,
}

impl ReconcileReport {
    /// Depth of the pruned model.
    pub fn depth(&self) -> usize {
        self.kept_blocks.len()
    }

    /// Whether the declared depth had to be corrected.
    pub fn depth_corrected(&self) -> bool {
        self.nominal_depth != self.depth()
    }

    /// `(source index, new index)` pairs.
    pub fn renumbering(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.kept_blocks.iter().enumerate().map(|(new, &old)| (old, new))
    }

    /// Whether the request reached past the last surviving block.
    pub fn over_requested(&self) -> bool {
        match (self.requested_max, self.kept_blocks.last()) {
            (Some(requested), Some(&actual)) => requested > actual,
            _ => false,
        }
    }

    /// Number of requested indices absent from the source.
    pub fn missing_count(&self) -> usize {
        self.missing_blocks.len() + self.missing_tail.as_ref().map_or(0, ExactSizeIterator::len)
    }
}

/// Renumber surviving blocks to `0..k` and set the configuration depth to `k`.
///
/// `config` is the nominal configuration (usually from
/// [`adjust_config`](super::adjust_config)); it is not modified, a corrected
/// copy is returned. Non-block parameters pass through untouched.
///
/// Fails with [`PruneError::EmptySelection`] when `selected` holds no
/// encoder-block parameters. Requesting blocks the model does not have is
/// not an error: only the existing blocks are kept and a warning is
/// recorded, both for a request past the last block and for gaps below it.
pub fn reconcile<T, C: DepthConfig>(
    config: &C,
    selected: ParameterMap<T>,
    requested: &LayerSelection,
) -> Result<Reconciled<T, C>> {
    let kept_blocks: Vec<usize> = selected.block_indices().into_iter().collect();
    let Some(&actual_max) = kept_blocks.last() else {
        return Err(PruneError::EmptySelection);
    };
    let depth = kept_blocks.len();

    let nominal_depth = config.num_hidden_layers();
    if nominal_depth != depth {
        debug!(nominal_depth, depth, "correcting declared encoder depth");
    }
    let config = config.with_num_hidden_layers(depth);

    let ranks: HashMap<usize, usize> = kept_blocks
        .iter()
        .enumerate()
        .map(|(new, &old)| (old, new))
        .collect();

    let mut params = ParameterMap::with_capacity(selected.len());
    for (name, value) in selected {
        let name = match ParamKind::of(&name) {
            ParamKind::EncoderBlock(old) => {
                let new = ranks[&old];
                match renumber_block(&name, new) {
                    Some(renamed) => {
                        if old != new {
                            debug!(from = %name, to = %renamed, "renumbering block parameter");
                        }
                        renamed
                    }
                    None => name,
                }
            }
            _ => name,
        };
        let previous = params.insert(name, value);
        debug_assert!(previous.is_none(), "renumbering collided");
    }

    let (missing_blocks, missing_tail) = match requested {
        LayerSelection::First(n) => {
            let gaps: Vec<usize> = (0..actual_max)
                .filter(|idx| !ranks.contains_key(idx))
                .collect();
            let tail = actual_max
                .checked_add(1)
                .filter(|&start| *n > start)
                .map(|start| start..*n);
            (gaps, tail)
        }
        LayerSelection::Indices(_) => {
            let listed: Vec<usize> = requested
                .indices()
                .into_iter()
                .filter(|idx| !ranks.contains_key(idx))
                .collect();
            (listed, None)
        }
    };

    let mut report = ReconcileReport {
        kept_blocks,
        missing_blocks,
        missing_tail,
        requested_max: requested.max_index(),
        nominal_depth,
        warnings: Vec::new(),
    };

    if report.over_requested() {
        let message = format!(
            "selection reaches block {} but the source ends at block {actual_max}, keeping only the {depth} available",
            report.requested_max.unwrap_or(actual_max),
        );
        warn!(missing = report.missing_count(), "{message}");
        report.warnings.push(message);
    }

    let gaps: Vec<usize> = report
        .missing_blocks
        .iter()
        .copied()
        .filter(|&idx| idx < actual_max)
        .collect();
    if !gaps.is_empty() {
        let message = format!("requested blocks {gaps:?} are absent from the source");
        warn!(?gaps, "{message}");
        report.warnings.push(message);
    }

    Ok(Reconciled {
        params,
        config,
        report,
    })
}
