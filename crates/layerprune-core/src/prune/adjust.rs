//! Nominal configuration adjustment.

use crate::selection::LayerSelection;

/// A model configuration with a declared encoder depth.
///
/// Every other field is carried through the transform unchanged.
pub trait DepthConfig: Clone {
    /// Declared number of encoder blocks.
    fn num_hidden_layers(&self) -> usize;

    /// Copy of this configuration declaring `depth` blocks.
    fn with_num_hidden_layers(&self, depth: usize) -> Self;
}

/// Copy `config` with its depth set to what `selection` asks for.
///
/// This trusts the request; [`reconcile`](super::reconcile) later checks it
/// against the blocks that actually survived.
pub fn adjust_config<C: DepthConfig>(config: &C, selection: &LayerSelection) -> C {
    config.with_num_hidden_layers(selection.nominal_depth())
}
