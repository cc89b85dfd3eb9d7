use candle_core::{DType, Device, Tensor};
use layerprune_core::prelude::*;

fn bert_config(depth: usize) -> BertConfig {
    serde_json::from_value(serde_json::json!({
        "model_type": "bert",
        "num_hidden_layers": depth,
        "hidden_size": 4,
        "vocab_size": 16
    }))
    .unwrap()
}

/// `bert.`-prefixed checkpoint, as saved from `BertForPreTraining`.
fn prefixed_checkpoint(depth: usize) -> ParameterMap {
    let device = Device::Cpu;
    let mut params = ParameterMap::new();
    params.insert(
        "bert.embeddings.word_embeddings.weight",
        Tensor::zeros((16, 4), DType::F32, &device).unwrap(),
    );
    for layer in 0..depth {
        let marker = Tensor::full(layer as f32, (4, 4), &device).unwrap();
        params.insert(
            format!("bert.encoder.layer.{layer}.attention.self.query.weight"),
            marker.clone(),
        );
        params.insert(format!("bert.encoder.layer.{layer}.output.dense.weight"), marker);
    }
    params.insert(
        "bert.pooler.dense.weight",
        Tensor::zeros((4, 4), DType::F32, &device).unwrap(),
    );
    params.insert(
        "cls.seq_relationship.weight",
        Tensor::zeros((2, 4), DType::F32, &device).unwrap(),
    );
    params
}

fn marker(params: &ParameterMap, layer: usize) -> f32 {
    params
        .get(&format!("bert.encoder.layer.{layer}.output.dense.weight"))
        .unwrap()
        .to_vec2::<f32>()
        .unwrap()[0][0]
}

#[test]
fn prefixed_checkpoint_is_renumbered() {
    let out = prune(
        prefixed_checkpoint(12),
        &bert_config(12),
        &"11,0,6".parse().unwrap(),
        UnclassifiedPolicy::Drop,
    )
    .unwrap();

    assert_eq!(out.config.num_hidden_layers, 3);
    assert_eq!(out.config.extra["vocab_size"], serde_json::json!(16));
    assert_eq!(out.report.kept_blocks, vec![0, 6, 11]);
    assert_eq!(marker(&out.params, 0), 0.0);
    assert_eq!(marker(&out.params, 1), 6.0);
    assert_eq!(marker(&out.params, 2), 11.0);
    assert!(out.params.contains("bert.pooler.dense.weight"));
    assert!(!out.params.contains("cls.seq_relationship.weight"));
}

#[test]
fn steps_compose_like_prune() {
    let selection = LayerSelection::First(3);
    let config = bert_config(6);

    let selected = select(prefixed_checkpoint(6), &selection);
    let nominal = adjust_config(&config, &selection);
    assert_eq!(nominal.num_hidden_layers, 3);
    let stepwise = reconcile(&nominal, selected, &selection).unwrap();

    let direct = prune(
        prefixed_checkpoint(6),
        &config,
        &selection,
        UnclassifiedPolicy::Drop,
    )
    .unwrap();

    assert_eq!(
        stepwise.params.names().collect::<Vec<_>>(),
        direct.params.names().collect::<Vec<_>>()
    );
    assert_eq!(stepwise.config, direct.config);
}

#[test]
fn count_matches_surviving_blocks() {
    for selection in ["1", "5", "2,4", "0,9", "7,3,3"] {
        let selection: LayerSelection = selection.parse().unwrap();
        let out = prune(
            prefixed_checkpoint(6),
            &bert_config(6),
            &selection,
            UnclassifiedPolicy::Keep,
        )
        .unwrap();
        let blocks = out.params.block_indices();
        assert_eq!(out.config.num_hidden_layers, blocks.len(), "{selection}");
        assert_eq!(
            blocks.into_iter().collect::<Vec<_>>(),
            (0..out.config.num_hidden_layers).collect::<Vec<_>>()
        );
    }
}
