//! The depth-pruning transform.
//!
//! Three steps over an in-memory checkpoint:
//! 1. [`ParameterSelector`] keeps embeddings, the pooler, and the requested
//!    encoder blocks.
//! 2. [`adjust_config`] sets the declared depth from the request.
//! 3. [`reconcile`] renumbers the surviving blocks to `0..k` and corrects
//!    the declared depth to `k`.
//!
//! [`prune`] runs all three.

mod adjust;
mod reconcile;
mod select;

pub use adjust::{adjust_config, DepthConfig};
pub use reconcile::{reconcile, ReconcileReport, Reconciled};
pub use select::{select, ParameterSelector, UnclassifiedPolicy};

use crate::error::Result;
use crate::params::ParameterMap;
use crate::selection::LayerSelection;

/// Select, adjust, and reconcile in one pass.
pub fn prune<T, C: DepthConfig>(
    params: ParameterMap<T>,
    config: &C,
    selection: &LayerSelection,
    unclassified: UnclassifiedPolicy,
) -> Result<Reconciled<T, C>> {
    let selected = ParameterSelector::new(unclassified).select(params, selection);
    let nominal = adjust_config(config, selection);
    reconcile(&nominal, selected, selection)
}
