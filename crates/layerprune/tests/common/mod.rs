//! Tiny BERT model directories for end-to-end tests.

#![allow(dead_code)]

use candle_core::{DType, Device, Tensor};
use std::collections::HashMap;
use std::path::Path;

pub const HIDDEN: usize = 2;

const BLOCK_SUFFIXES: &[&str] = &[
    "attention.self.query.weight",
    "attention.self.key.weight",
    "attention.output.dense.weight",
    "intermediate.dense.weight",
    "output.dense.weight",
    "output.LayerNorm.bias",
];

/// Write a `depth`-block model whose block `i` tensors are filled with `i`.
pub fn write_tiny_bert(dir: &Path, depth: usize) {
    let device = Device::Cpu;
    let mut tensors: HashMap<String, Tensor> = HashMap::new();

    let filled = |value: f64| {
        (Tensor::ones((HIDDEN, HIDDEN), DType::F32, &device).unwrap() * value).unwrap()
    };

    tensors.insert("embeddings.word_embeddings.weight".into(), filled(-1.0));
    tensors.insert(
        "embeddings.position_ids".into(),
        Tensor::new(&[[0i64, 1, 2, 3]], &device).unwrap(),
    );
    for layer in 0..depth {
        for suffix in BLOCK_SUFFIXES {
            tensors.insert(format!("encoder.layer.{layer}.{suffix}"), filled(layer as f64));
        }
    }
    tensors.insert("pooler.dense.weight".into(), filled(-2.0));
    tensors.insert("cls.predictions.bias".into(), filled(-3.0));
    candle_core::safetensors::save(&tensors, dir.join("model.safetensors")).unwrap();

    let config = serde_json::json!({
        "architectures": ["BertModel"],
        "hidden_size": HIDDEN,
        "model_type": "bert",
        "num_attention_heads": 1,
        "num_hidden_layers": depth,
        "vocab_size": 8,
        "layer_norm_eps": 1e-12
    });
    std::fs::write(
        dir.join("config.json"),
        serde_json::to_string_pretty(&config).unwrap(),
    )
    .unwrap();

    std::fs::write(dir.join("vocab.txt"), "[PAD]\n[UNK]\n[CLS]\n[SEP]\nhello\n").unwrap();
}

/// Number of parameters a tiny model with `depth` blocks holds.
pub fn tiny_bert_len(depth: usize) -> usize {
    depth * BLOCK_SUFFIXES.len() + 4
}

pub fn block_suffixes() -> &'static [&'static str] {
    BLOCK_SUFFIXES
}
