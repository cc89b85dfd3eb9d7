//! Which encoder blocks to keep.

use crate::error::{PruneError, Result};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A request for encoder blocks to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSelection {
    /// Keep the first `n` blocks, `0..n`.
    First(usize),
    /// Keep these block indices. Order and gaps are allowed.
    Indices(Vec<usize>),
}

impl LayerSelection {
    /// Requested block indices in request order, duplicates removed.
    ///
    /// The first occurrence of a repeated index wins. `First(n)` expands to
    /// `n` entries; prefer [`contains`](Self::contains) for membership.
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Self::First(n) => (0..*n).collect(),
            Self::Indices(list) => {
                let mut seen = HashSet::with_capacity(list.len());
                list.iter().copied().filter(|idx| seen.insert(*idx)).collect()
            }
        }
    }

    /// Indices listed more than once, in first-repeat order.
    pub fn duplicates(&self) -> Vec<usize> {
        match self {
            Self::First(_) => Vec::new(),
            Self::Indices(list) => {
                let mut seen = HashSet::with_capacity(list.len());
                let mut dups = Vec::new();
                for &idx in list {
                    if !seen.insert(idx) && !dups.contains(&idx) {
                        dups.push(idx);
                    }
                }
                dups
            }
        }
    }

    /// Block count the request asks for, before checking the model.
    pub fn nominal_depth(&self) -> usize {
        match self {
            Self::First(n) => *n,
            Self::Indices(_) => self.indices().len(),
        }
    }

    /// Largest requested index.
    pub fn max_index(&self) -> Option<usize> {
        match self {
            Self::First(n) => n.checked_sub(1),
            Self::Indices(list) => list.iter().copied().max(),
        }
    }

    /// Whether block `index` is requested.
    pub fn contains(&self, index: usize) -> bool {
        match self {
            Self::First(n) => index < *n,
            Self::Indices(list) => list.contains(&index),
        }
    }

    /// Reject a request for zero blocks.
    pub fn validate(&self) -> Result<()> {
        let empty = match self {
            Self::First(n) => *n == 0,
            Self::Indices(list) => list.is_empty(),
        };
        if empty {
            return Err(PruneError::InvalidSelection(
                "selection must keep at least one block".to_string(),
            ));
        }
        Ok(())
    }

    fn ensure_non_empty(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}

impl fmt::Display for LayerSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First(n) => write!(f, "{n}"),
            Self::Indices(list) => {
                let parts: Vec<String> = list.iter().map(usize::to_string).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

/// Parse `N` (first N blocks) or `i,j,k` (explicit indices).
impl FromStr for LayerSelection {
    type Err = PruneError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parse_index = |token: &str| -> Result<usize> {
            let token = token.trim();
            token.parse().map_err(|_| {
                PruneError::InvalidSelection(format!(
                    "`{token}` is not a block index (expected a non-negative integer)"
                ))
            })
        };

        let selection = if s.contains(',') {
            Self::Indices(s.split(',').map(parse_index).collect::<Result<_>>()?)
        } else {
            Self::First(parse_index(s)?)
        };
        selection.ensure_non_empty()
    }
}

impl From<usize> for LayerSelection {
    fn from(n: usize) -> Self {
        Self::First(n)
    }
}

impl From<Vec<usize>> for LayerSelection {
    fn from(list: Vec<usize>) -> Self {
        Self::Indices(list)
    }
}

/// Accept a JSON integer or an array of integers; any other shape is rejected.
impl TryFrom<&serde_json::Value> for LayerSelection {
    type Error = PruneError;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        let as_index = |v: &serde_json::Value| -> Result<usize> {
            v.as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    PruneError::InvalidSelection(format!("`{v}` is not a block index"))
                })
        };

        let selection = match value {
            serde_json::Value::Number(_) => Self::First(as_index(value)?),
            serde_json::Value::Array(items) => {
                Self::Indices(items.iter().map(as_index).collect::<Result<_>>()?)
            }
            other => {
                return Err(PruneError::InvalidSelection(format!(
                    "unsupported selection type: {other}"
                )))
            }
        };
        selection.ensure_non_empty()
    }
}
