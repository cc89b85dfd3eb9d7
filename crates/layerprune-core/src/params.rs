//! Ordered name-to-tensor mapping.

use crate::naming::{natural_cmp, ParamKind};
use candle_core::{DType, Tensor};
use std::collections::BTreeSet;

/// Ordered mapping from parameter name to tensor.
///
/// Insertion order is kept so the transform emits parameters in a
/// deterministic order. Lookups are linear; a BERT checkpoint holds a few
/// hundred entries at most.
///
/// The value type is generic so the transform can be exercised without
/// real tensors; the model loaders produce `ParameterMap<Tensor>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMap<T = Tensor> {
    entries: Vec<(String, T)>,
}

impl<T> ParameterMap<T> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert a parameter, returning the previous value under that name.
    ///
    /// Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, value: T) -> Option<T> {
        let name = name.into();
        match self.position(&name) {
            Some(pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Get a parameter by name.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.position(name).map(|pos| &self.entries[pos].1)
    }

    /// Remove a parameter by name.
    pub fn remove(&mut self, name: &str) -> Option<T> {
        self.position(name).map(|pos| self.entries.remove(pos).1)
    }

    /// Check if a parameter exists.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parameter names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Distinct encoder block indices present, ascending.
    pub fn block_indices(&self) -> BTreeSet<usize> {
        self.names()
            .filter_map(|name| ParamKind::of(name).block_index())
            .collect()
    }

    /// Reorder entries by numeric-aware name order.
    pub fn sort_natural(&mut self) {
        self.entries.sort_by(|(a, _), (b, _)| natural_cmp(a, b));
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }
}

impl<T> Default for ParameterMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: Into<String>> FromIterator<(S, T)> for ParameterMap<T> {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl<T> IntoIterator for ParameterMap<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// One row of a parameter listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSummary {
    /// Parameter name.
    pub name: String,
    /// Tensor shape.
    pub shape: Vec<usize>,
    /// Element type.
    pub dtype: DType,
}

impl std::fmt::Display for ParamSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?} {:?}", self.name, self.shape, self.dtype)
    }
}

impl ParameterMap<Tensor> {
    /// Name, shape, and dtype of every tensor, in order.
    pub fn summaries(&self) -> Vec<ParamSummary> {
        self.iter()
            .map(|(name, tensor)| ParamSummary {
                name: name.to_string(),
                shape: tensor.dims().to_vec(),
                dtype: tensor.dtype(),
            })
            .collect()
    }

    /// Total number of scalar elements across all tensors.
    pub fn element_count(&self) -> usize {
        self.entries.iter().map(|(_, t)| t.elem_count()).sum()
    }
}
