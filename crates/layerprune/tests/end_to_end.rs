mod common;

use candle_core::Device;
use common::{block_suffixes, tiny_bert_len, write_tiny_bert};
use layerprune::prelude::*;
use tempfile::TempDir;

fn block_value(params: &ParameterMap, layer: usize) -> f32 {
    let name = format!("encoder.layer.{layer}.attention.self.query.weight");
    params.get(&name).unwrap().to_vec2::<f32>().unwrap()[0][0]
}

fn indices(params: &ParameterMap) -> Vec<usize> {
    params.block_indices().into_iter().collect()
}

#[test]
fn prunes_and_renumbers_selected_blocks() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let dest = out.path().join("pruned");
    write_tiny_bert(src.path(), 6);

    let report = PruneJob::builder()
        .model_path(src.path())
        .output_path(&dest)
        .selection(vec![3usize, 1])
        .build()
        .run()
        .unwrap();

    assert_eq!(report.source_depth, 6);
    assert_eq!(report.source_blocks, 6);
    assert_eq!(report.final_depth, 2);
    assert!(report.warnings.is_empty());
    assert!(report.to_string().contains("6 (6 blocks in weights) -> 2"));
    assert_eq!(report.renumbering, vec![(1, 0), (3, 1)]);
    assert!(report.missing_blocks.is_empty());

    let config = BertConfig::from_dir(&dest).unwrap();
    assert_eq!(config.num_hidden_layers, 2);
    assert_eq!(config.extra["vocab_size"], serde_json::json!(8));
    assert_eq!(config.extra["layer_norm_eps"], serde_json::json!(1e-12));

    let params = WeightLoader::from_dir(&dest, &Device::Cpu).unwrap();
    assert_eq!(indices(&params), vec![0, 1]);
    assert_eq!(block_value(&params, 0), 1.0);
    assert_eq!(block_value(&params, 1), 3.0);
    assert_eq!(params.len(), 2 * block_suffixes().len() + 3);
    assert!(params.contains("embeddings.position_ids"));
    assert!(params.contains("pooler.dense.weight"));
    assert!(!params.contains("cls.predictions.bias"));

    assert_eq!(
        std::fs::read(src.path().join("vocab.txt")).unwrap(),
        std::fs::read(dest.join("vocab.txt")).unwrap()
    );
    assert!(report.written_file("model.safetensors").is_some());
    assert!(report.written_file("config.json").is_some());
}

#[test]
fn integer_selection_keeps_leading_blocks() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write_tiny_bert(src.path(), 4);

    let report = PruneJob::builder()
        .model_path(src.path())
        .output_path(dest.path())
        .selection(2usize)
        .build()
        .run()
        .unwrap();
    assert_eq!(report.final_depth, 2);

    let params = WeightLoader::from_dir(dest.path(), &Device::Cpu).unwrap();
    assert_eq!(indices(&params), vec![0, 1]);
    assert_eq!(block_value(&params, 0), 0.0);
    assert_eq!(block_value(&params, 1), 1.0);
}

#[test]
fn over_request_keeps_available_blocks() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write_tiny_bert(src.path(), 4);

    let report = PruneJob::builder()
        .model_path(src.path())
        .output_path(dest.path())
        .selection(vec![2usize, 9])
        .build()
        .run()
        .unwrap();

    assert_eq!(report.final_depth, 1);
    assert_eq!(report.missing_blocks, vec![9]);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.to_string().contains("Warning:"));
    assert_eq!(BertConfig::from_dir(dest.path()).unwrap().num_hidden_layers, 1);
    let params = WeightLoader::from_dir(dest.path(), &Device::Cpu).unwrap();
    assert_eq!(block_value(&params, 0), 2.0);
}

#[test]
fn selecting_only_missing_blocks_fails_before_writing() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let dest = out.path().join("never");
    write_tiny_bert(src.path(), 4);

    let err = PruneJob::builder()
        .model_path(src.path())
        .output_path(&dest)
        .selection(vec![7usize])
        .build()
        .run()
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PruneError>(),
        Some(PruneError::EmptySelection)
    ));
    assert!(!dest.exists());
}

#[test]
fn zero_block_selection_fails_before_loading() {
    let empty = TempDir::new().unwrap();
    for selection in [LayerSelection::from(0usize), LayerSelection::from(Vec::new())] {
        let err = PruneJob::builder()
            .model_path(empty.path())
            .output_path(empty.path().join("out"))
            .selection(selection)
            .build()
            .run()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PruneError>(),
            Some(PruneError::InvalidSelection(_))
        ));
    }
}

#[test]
fn leading_count_past_depth_reports_missing_range() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write_tiny_bert(src.path(), 3);

    let report = PruneJob::builder()
        .model_path(src.path())
        .output_path(dest.path())
        .selection(usize::MAX)
        .dry_run(true)
        .build()
        .run()
        .unwrap();

    assert_eq!(report.final_depth, 3);
    assert_eq!(report.missing_tail, Some(3..usize::MAX));
    assert!(report.to_string().contains(&format!("3..{}", usize::MAX)));
}

#[test]
fn missing_source_fails_fast() {
    let out = TempDir::new().unwrap();
    let err = PruneJob::builder()
        .model_path("/nonexistent/bert")
        .output_path(out.path().join("x"))
        .build()
        .run()
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PruneError>(),
        Some(PruneError::SourceNotFound(_))
    ));
}

#[test]
fn dry_run_writes_nothing() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let dest = out.path().join("pruned");
    write_tiny_bert(src.path(), 3);

    let report = PruneJob::builder()
        .model_path(src.path())
        .output_path(&dest)
        .selection(1usize)
        .dry_run(true)
        .list_parameters(true)
        .build()
        .run()
        .unwrap();

    assert!(report.is_dry_run());
    assert!(report.written.is_empty());
    assert!(!dest.exists());
    assert_eq!(report.source_parameters.len(), tiny_bert_len(3));
    assert_eq!(report.kept_parameters + report.dropped_parameters, tiny_bert_len(3));
    assert!(report.to_string().contains("dry run"));
}

#[test]
fn keep_policy_carries_task_heads() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write_tiny_bert(src.path(), 3);

    PruneJob::builder()
        .model_path(src.path())
        .output_path(dest.path())
        .selection(1usize)
        .unclassified(UnclassifiedPolicy::Keep)
        .build()
        .run()
        .unwrap();

    let params = WeightLoader::from_dir(dest.path(), &Device::Cpu).unwrap();
    assert!(params.contains("cls.predictions.bias"));
}
