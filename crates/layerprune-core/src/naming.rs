//! Parameter name parsing.
//!
//! BERT-family checkpoints name their tensors with dot-separated paths:
//!
//! - `embeddings.word_embeddings.weight`
//! - `encoder.layer.3.attention.self.query.weight`
//! - `pooler.dense.bias`
//!
//! Task heads and wrapper prefixes (`bert.`, `cls.predictions.`) appear in
//! checkpoints saved from pretraining or fine-tuning classes. Everything the
//! pruner decides about a tensor is derived from its name here.

use std::cmp::Ordering;
use std::ops::Range;

/// Path segment marking embedding parameters.
pub const EMBEDDINGS_SEGMENT: &str = "embeddings";
/// Path segment marking pooler parameters.
pub const POOLER_SEGMENT: &str = "pooler";
/// Path prefix that precedes an encoder block index.
pub const ENCODER_LAYER_PREFIX: &str = "encoder.layer.";

/// Category of a named parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Token, position, and type embeddings (plus their LayerNorm).
    Embedding,
    /// A parameter of encoder block `N`.
    EncoderBlock(usize),
    /// The pooler head.
    Pooler,
    /// Anything else: task heads, wrapper-only tensors, buffers.
    Unclassified,
}

impl ParamKind {
    /// Classify a parameter by name.
    ///
    /// Embeddings win over encoder blocks, which win over the pooler.
    pub fn of(name: &str) -> Self {
        if has_segment(name, EMBEDDINGS_SEGMENT) {
            Self::Embedding
        } else if let Some(block) = BlockRef::parse(name) {
            Self::EncoderBlock(block.index)
        } else if has_segment(name, POOLER_SEGMENT) {
            Self::Pooler
        } else {
            Self::Unclassified
        }
    }

    /// Block index for encoder-block parameters.
    pub fn block_index(self) -> Option<usize> {
        match self {
            Self::EncoderBlock(idx) => Some(idx),
            _ => None,
        }
    }
}

fn has_segment(name: &str, segment: &str) -> bool {
    name.split('.').any(|s| s == segment)
}

/// Location of the block index inside an encoder-block parameter name.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BlockRef {
    index: usize,
    span: Range<usize>,
}

impl BlockRef {
    /// Find `encoder.layer.<N>.` starting at a segment boundary.
    ///
    /// `xencoder.layer.1.w` does not match, and neither does a name that
    /// ends right after the index (a block parameter always has a rest).
    fn parse(name: &str) -> Option<Self> {
        for (at, _) in name.match_indices(ENCODER_LAYER_PREFIX) {
            if at > 0 && name.as_bytes()[at - 1] != b'.' {
                continue;
            }
            let start = at + ENCODER_LAYER_PREFIX.len();
            let tail = &name[start..];
            let digits = tail.bytes().take_while(u8::is_ascii_digit).count();
            if digits == 0 || tail.as_bytes().get(digits) != Some(&b'.') {
                continue;
            }
            if let Ok(index) = tail[..digits].parse() {
                return Some(Self {
                    index,
                    span: start..start + digits,
                });
            }
        }
        None
    }
}

/// Extract the encoder block index from a parameter name.
pub fn block_index(name: &str) -> Option<usize> {
    BlockRef::parse(name).map(|b| b.index)
}

/// Rewrite the block index of an encoder-block parameter name.
///
/// Only the index segment changes; the rest of the path is kept verbatim.
/// Returns `None` for names that are not encoder-block parameters.
pub fn renumber_block(name: &str, new_index: usize) -> Option<String> {
    let block = BlockRef::parse(name)?;
    Some(format!(
        "{}{}{}",
        &name[..block.span.start],
        new_index,
        &name[block.span.end..]
    ))
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Segment<'a> {
    Number(u64),
    Text(&'a str),
}

fn segments(name: &str) -> impl Iterator<Item = Segment<'_>> {
    name.split('.').map(|s| match s.parse::<u64>() {
        Ok(n) => Segment::Number(n),
        Err(_) => Segment::Text(s),
    })
}

/// Numeric-aware ordering of parameter names.
///
/// `encoder.layer.2.*` sorts before `encoder.layer.10.*`, which keeps
/// blocks in model order instead of lexicographic order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    segments(a).cmp(segments(b))
}
