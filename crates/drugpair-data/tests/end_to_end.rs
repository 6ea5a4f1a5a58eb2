use drugpair_data::prelude::*;
use drugpair_data::{io, DrugPairError};
use ndarray::{array, Array2};

fn single_pair_dataset() -> DatasetLoader {
    let mut contexts = ContextFeatureSet::new();
    contexts.set("c1", vec![1.0, 0.0, 0.0]);
    let mut drugs = DrugFeatureSet::new();
    drugs.set("d1", vec![0.0, 1.0]);
    let triples = LabeledTriples::from_triples(vec![LabeledTriple::new("d1", "c1", "c1", 1.0)]);
    DatasetLoader::new("single", contexts, drugs, triples)
}

#[test]
fn single_triple_yields_one_batch() {
    let loader = single_pair_dataset();
    let config = BatchConfig::builder()
        .batch_size(1)
        .right_source(RightEntitySource::Context)
        .build()
        .unwrap();
    let generator = loader.batch_generator(config).unwrap();
    assert_eq!(generator.num_batches(), 1);

    let batches: Vec<DrugPairBatch> = generator
        .generate()
        .collect::<drugpair_data::Result<_>>()
        .unwrap();
    assert_eq!(batches.len(), 1);

    let batch = &batches[0];
    assert_eq!(batch.left_features().unwrap(), &array![[0.0f32, 1.0]]);
    assert_eq!(batch.right_features().unwrap(), &array![[1.0f32, 0.0, 0.0]]);
    assert_eq!(batch.context_features().unwrap(), &array![[1.0f32, 0.0, 0.0]]);
    assert_eq!(batch.labels().unwrap().to_vec(), vec![1.0]);
}

#[test]
fn missing_drug_is_reported_by_name() {
    let mut loader = single_pair_dataset();
    let (contexts, drugs, mut triples) = loader.into_parts();
    triples.push(LabeledTriple::new("d2", "d1", "c1", 0.0));
    loader = DatasetLoader::new("broken", contexts, drugs, triples);

    let config = BatchConfig::builder()
        .batch_size(2)
        .shuffle(false)
        .build()
        .unwrap();
    let generator = loader.batch_generator(config).unwrap();
    let mut stream = generator.generate();

    let err = stream.next().unwrap().unwrap_err();
    assert_eq!(err.missing_key(), Some("d2"));
    assert!(matches!(err, DrugPairError::KeyNotFound { role: "drug", .. }));
    assert!(stream.next().is_none());
}

#[test]
fn shuffle_is_deterministic_per_seed() {
    let triples: LabeledTriples = (0..50)
        .map(|i| LabeledTriple::new(format!("d{i}"), format!("d{}", i + 1), "c1", (i % 2) as f32))
        .collect();

    let first = triples.shuffle(42);
    let second = triples.shuffle(42);
    assert_eq!(first, second);
    assert_eq!(first.len(), triples.len());
    assert_ne!(first.rows(), triples.rows());

    let mut sorted = first.into_rows();
    sorted.sort_by(|a, b| a.left.cmp(&b.left));
    let mut original = triples.into_rows();
    original.sort_by(|a, b| a.left.cmp(&b.left));
    assert_eq!(sorted, original);
}

#[test]
fn partition_covers_every_row() {
    let triples: LabeledTriples = (0..10)
        .map(|i| LabeledTriple::new("d1", "d2", format!("c{i}"), 1.0))
        .collect();

    let sizes: Vec<usize> = triples.partition(3).unwrap().map(<[_]>::len).collect();
    assert_eq!(sizes, vec![3, 3, 3, 1]);
    assert_eq!(triples.partition(10).unwrap().count(), 1);
    assert_eq!(triples.partition(20).unwrap().count(), 1);
    assert!(triples.partition(0).is_err());
}

#[test]
fn update_and_items_round_trip() {
    let mut drugs = DrugFeatureSet::new();
    drugs.update(vec![("b", vec![2.0, 0.0]), ("a", vec![1.0, 0.0])]);

    let items = drugs.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].0, "a");
    assert_eq!(items[1].1, &array![[2.0f32, 0.0]]);

    let copy: DrugFeatureSet = items
        .into_iter()
        .map(|(key, features)| (key.to_string(), features.clone()))
        .collect();
    assert_eq!(copy, drugs);
}

#[test]
fn gathered_rows_follow_key_order() {
    let contexts = ContextFeatureSet::from_rows(vec![
        ("c1", vec![1.0, 0.0]),
        ("c2", vec![0.0, 1.0]),
    ]);
    let gathered = contexts.gather(&["c2", "c1", "c2"]).unwrap();
    let expected: Array2<f32> = array![[0.0, 1.0], [1.0, 0.0], [0.0, 1.0]];
    assert_eq!(gathered, expected);
}

#[test]
fn saved_dataset_resolves_through_registry() {
    let root = tempfile::tempdir().unwrap();
    let mut loader = single_pair_dataset();
    let (contexts, mut drugs, mut triples) = loader.into_parts();
    drugs.set("d2", vec![1.0, 1.0]);
    triples.push(LabeledTriple::new("d1", "d2", "c1", 0.0));
    loader = DatasetLoader::new("Toy Comb", contexts, drugs, triples);

    io::save_dataset(&loader, root.path().join("toy_comb")).unwrap();

    let registry = DatasetRegistry::discover(root.path()).unwrap();
    assert!(registry.contains("ToyComb"));

    let resolved = registry.resolve("toy-comb").unwrap();
    assert_eq!(resolved.drug_features(), loader.drug_features());
    assert_eq!(resolved.context_features(), loader.context_features());
    assert_eq!(resolved.labeled_triples(), loader.labeled_triples());

    let summary = resolved.summary();
    assert_eq!(summary.triple_count, 2);
    assert_eq!(summary.positive_rate, Some(0.5));
    assert!(resolved
        .validate_references(RightEntitySource::Context)
        .is_err());
    assert!(resolved.validate_references(RightEntitySource::Drug).is_err());
}

#[test]
fn restarted_stream_replays_with_next_seed() {
    let contexts = ContextFeatureSet::from_rows(vec![("c1", vec![1.0])]);
    let drugs: DrugFeatureSet = (0..8).map(|i| (format!("d{i}"), vec![i as f32])).collect();
    let triples: LabeledTriples = (0..8)
        .map(|i| LabeledTriple::new(format!("d{i}"), format!("d{}", (i + 1) % 8), "c1", 1.0))
        .collect();

    let config = BatchConfig::builder().batch_size(3).seed(7).build().unwrap();
    let generator = BatchGenerator::new(&contexts, &drugs, &triples, config).unwrap();

    let order = |batches: Vec<DrugPairBatch>| -> Vec<String> {
        batches
            .iter()
            .flat_map(|batch| batch.iter().map(|t| t.left.clone()))
            .collect()
    };

    let mut stream = generator.generate();
    let first = order(stream.by_ref().collect::<drugpair_data::Result<_>>().unwrap());
    assert_eq!(first.len(), 8);
    assert_eq!(stream.remaining(), 0);

    stream.restart();
    assert_eq!(stream.pass(), 1);
    let second = order(stream.collect::<drugpair_data::Result<_>>().unwrap());

    let expected: Vec<String> = triples.shuffle(8).iter().map(|t| t.left.clone()).collect();
    assert_eq!(second, expected);
}
