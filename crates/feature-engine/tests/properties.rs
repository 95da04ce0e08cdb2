//! Property-based tests for the feature transformer.
//!
//! These use proptest to generate arbitrary song batches and verify the
//! shape, ordering and determinism guarantees of `transform`.

use feature_engine::{FeatureConfig, FeatureTransformer, Record, RecordBatch, Value};
use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

#[derive(Debug, Clone)]
struct Song {
    explicit: bool,
    mode: &'static str,
    tempo: Option<f64>,
    loudness: f64,
}

fn arb_song() -> impl Strategy<Value = Song> {
    (
        any::<bool>(),
        prop::sample::select(vec!["A", "B", "C", "unknown"]),
        prop::option::of(-1e3f64..1e3),
        -60.0f64..0.0,
    )
        .prop_map(|(explicit, mode, tempo, loudness)| Song {
            explicit,
            mode,
            tempo,
            loudness,
        })
}

/// Records carry extra columns and are built in varying key order
fn to_batch(songs: &[Song]) -> RecordBatch {
    songs
        .iter()
        .enumerate()
        .map(|(i, song)| {
            let mut cells: Vec<(String, Value)> = vec![
                ("title".to_string(), Value::from(format!("song {}", i))),
                ("loudness".to_string(), Value::from(song.loudness)),
                ("tempo".to_string(), Value::from(song.tempo)),
                ("mode".to_string(), Value::from(song.mode)),
                ("explicit".to_string(), Value::from(song.explicit)),
            ];
            cells.rotate_left(i % 5);
            cells.into_iter().collect::<Record>()
        })
        .collect()
}

fn transformer() -> FeatureTransformer {
    let config: FeatureConfig = serde_json::from_str(
        r#"{
            "binary": {"columns": ["explicit"]},
            "categorical": {"columns": ["mode"], "one_hot_encode": true,
                            "one_hot_categories": ["A", "B", "C"]},
            "numerical": {"columns": ["tempo", "loudness"], "normalization": "minmax",
                          "impute_missing": "mean"}
        }"#,
    )
    .unwrap();
    FeatureTransformer::from_config(&config).unwrap()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn rows_preserved_in_order(songs in prop_vec(arb_song(), 0..32)) {
        let matrix = transformer().transform(&to_batch(&songs)).unwrap();

        prop_assert_eq!(matrix.nrows(), songs.len());
        let explicit = matrix.column("explicit").unwrap();
        for (row, song) in songs.iter().enumerate() {
            prop_assert_eq!(explicit[row], if song.explicit { 1.0 } else { 0.0 });
        }
    }

    #[test]
    fn column_order_is_fixed(songs in prop_vec(arb_song(), 0..32)) {
        let matrix = transformer().transform(&to_batch(&songs)).unwrap();
        prop_assert_eq!(
            matrix.columns(),
            ["explicit", "mode_A", "mode_B", "mode_C", "tempo", "loudness"]
        );
    }

    #[test]
    fn one_hot_groups_have_at_most_one_active(songs in prop_vec(arb_song(), 1..32)) {
        let matrix = transformer().transform(&to_batch(&songs)).unwrap();
        for (row, song) in songs.iter().enumerate() {
            let active: f64 = (1..4).map(|c| matrix.values()[[row, c]]).sum();
            let expected = if song.mode == "unknown" { 0.0 } else { 1.0 };
            prop_assert_eq!(active, expected);
        }
    }

    #[test]
    fn transform_is_deterministic(songs in prop_vec(arb_song(), 0..32)) {
        let t = transformer();
        let batch = to_batch(&songs);
        let first = t.transform(&batch).unwrap();
        let second = t.transform(&batch).unwrap();

        prop_assert_eq!(first.columns(), second.columns());
        let identical = first
            .values()
            .iter()
            .zip(second.values().iter())
            .all(|(a, b)| a.to_bits() == b.to_bits());
        prop_assert!(identical);
    }

    #[test]
    fn minmax_output_in_unit_range(songs in prop_vec(arb_song(), 1..32)) {
        let matrix = transformer().transform(&to_batch(&songs)).unwrap();
        for name in ["tempo", "loudness"] {
            for &v in matrix.column(name).unwrap().iter() {
                prop_assert!((0.0..=1.0).contains(&v), "{} out of range: {}", name, v);
            }
        }
    }
}
