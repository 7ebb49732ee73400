use super::*;
use crate::experiment::Experiment;
use crate::peak::{MassSpectrum, Peak};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

fn spectrum(values: &[f64]) -> MassSpectrum {
    let masses = (0..values.len()).map(|i| 50.0 + i as f64).collect();
    MassSpectrum::new(masses, values.to_vec()).unwrap()
}

fn peak(rt: f64, values: &[f64]) -> Peak {
    Peak::new(rt, 100.0).unwrap().with_mass_spectrum(spectrum(values))
}

fn experiment(code: &str, rts: &[f64]) -> Experiment {
    Experiment::new(code, rts.iter().map(|&rt| peak(rt, &[1.0, 2.0, 3.0])).collect())
}

fn row_rts(alignment: &Alignment, row: usize) -> Vec<Option<f64>> {
    alignment.rows()[row]
        .iter()
        .map(|c| c.peak().map(|p| p.retention_time))
        .collect()
}

#[derive(Default)]
struct Recorder(Mutex<Vec<ProgressEvent>>);

impl ProgressObserver for Recorder {
    fn on_event(&self, event: &ProgressEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

#[test]
fn test_three_identical_experiments() {
    let exprs = vec![
        experiment("a", &[10.0, 20.0, 30.0]),
        experiment("b", &[10.0, 20.0, 30.0]),
        experiment("c", &[10.0, 20.0, 30.0]),
    ];
    let params = AlignmentParams::new(5.0, 0.2);
    let ctx = RunContext::new();

    let pairwise = PairwiseAlignment::from_experiments(&exprs, &params, &ctx).unwrap();
    let tree = pairwise.tree().unwrap();
    assert_eq!(tree.nodes()[0].left, NodeRef::Leaf(0));
    assert_eq!(tree.nodes()[0].right, NodeRef::Leaf(1));
    assert_eq!(tree.nodes()[1].left, NodeRef::Internal(0));
    assert_eq!(tree.nodes()[1].right, NodeRef::Leaf(2));
    // Equal similarities give an all-zero distance matrix
    assert!(pairwise.dist_matrix().as_slice().iter().all(|&d| d == 0.0));

    let result = align_with_tree(pairwise, 2, &ctx).unwrap();
    assert_eq!(result.nrows(), 3);
    assert_eq!(result.ncols(), 3);
    assert_eq!(result.gap_count(), 0);
    for row in 0..3 {
        assert_eq!(row_rts(&result, row), vec![Some(10.0), Some(20.0), Some(30.0)]);
    }
}

#[test]
fn test_missing_peak_becomes_gap() {
    let a = Alignment::from_experiment(&experiment("a", &[10.0, 20.0, 30.0]));
    let b = Alignment::from_experiment(&experiment("b", &[10.0, 30.0]));
    let merged = align(&a, &b, &AlignmentParams::new(5.0, 0.5)).unwrap();

    assert_eq!(merged.ncols(), 3);
    assert_eq!(merged.gap_count(), 1);
    assert_eq!(row_rts(&merged, 0), vec![Some(10.0), Some(20.0), Some(30.0)]);
    assert_eq!(row_rts(&merged, 1), vec![Some(10.0), None, Some(30.0)]);
    // Two perfect matches, one gap
    assert!((merged.similarity().unwrap() - 1.5).abs() < 1e-12);
}

#[test]
fn test_trivial_inputs() {
    let ctx = RunContext::new();
    let params = AlignmentParams::default();

    let empty = PairwiseAlignment::new(Vec::new(), &params, &ctx).unwrap();
    assert!(empty.tree().is_none());
    let result = align_with_tree(empty, 1, &ctx).unwrap();
    assert_eq!(result.nrows(), 0);
    assert!(result.is_empty());

    let single = experiment("only", &[10.0, 20.0]);
    let pairwise = PairwiseAlignment::from_experiments(&[single.clone()], &params, &ctx).unwrap();
    assert!(pairwise.tree().is_none());
    let result = align_with_tree(pairwise, 1, &ctx).unwrap();
    assert_eq!(result, Alignment::from_experiment(&single));

    // Every column of a singleton holds one peak
    let pairwise = PairwiseAlignment::from_experiments(&[single], &params, &ctx).unwrap();
    assert!(align_with_tree(pairwise, 2, &ctx).unwrap().is_empty());
}

#[test]
fn test_empty_peak_list_rejected() {
    let ctx = RunContext::new();
    let params = AlignmentParams::default();

    let exprs = vec![experiment("a", &[10.0, 20.0]), Experiment::new("blank_run", Vec::new())];
    match PairwiseAlignment::from_experiments(&exprs, &params, &ctx) {
        Err(AlignmentError::EmptyInput(msg)) => assert!(msg.contains("blank_run")),
        other => panic!("expected EmptyInput, got {:?}", other),
    }

    // A lone empty experiment is rejected too
    let lone = vec![Experiment::new("blank_run", Vec::new())];
    assert!(matches!(
        PairwiseAlignment::from_experiments(&lone, &params, &ctx),
        Err(AlignmentError::EmptyInput(_))
    ));

    let a = Alignment::from_experiment(&exprs[0]);
    let empty = Alignment::from_experiment(&exprs[1]);
    assert!(matches!(align(&a, &empty, &params), Err(AlignmentError::EmptyInput(_))));
}

#[test]
fn test_min_peaks_zero_rejected() {
    let ctx = RunContext::new();
    let pairwise = PairwiseAlignment::new(Vec::new(), &AlignmentParams::default(), &ctx).unwrap();
    assert!(matches!(
        align_with_tree(pairwise, 0, &ctx),
        Err(AlignmentError::InvalidParameter(_))
    ));
}

#[test]
fn test_missing_tree_is_malformed() {
    let ctx = RunContext::new();
    let exprs = vec![experiment("a", &[10.0]), experiment("b", &[10.0])];
    let mut pairwise =
        PairwiseAlignment::from_experiments(&exprs, &AlignmentParams::default(), &ctx).unwrap();
    pairwise.tree = None;
    assert!(matches!(
        align_with_tree(pairwise, 1, &ctx),
        Err(AlignmentError::MalformedTree(_))
    ));
}

#[test]
fn test_similarity_and_distance_matrices() {
    let exprs = vec![
        experiment("a", &[10.0, 20.0, 30.0]),
        experiment("b", &[10.0, 20.0, 30.0]),
        experiment("c", &[10.0, 30.0]),
    ];
    let pairwise =
        PairwiseAlignment::from_experiments(&exprs, &AlignmentParams::new(5.0, 0.5), &RunContext::new())
            .unwrap();

    let sim = pairwise.sim_matrix();
    let dist = pairwise.dist_matrix();
    assert!(sim[(0, 0)].is_nan());
    assert!((sim[(0, 1)] - 3.0).abs() < 1e-12);
    assert!((sim[(0, 2)] - 1.5).abs() < 1e-12);
    assert_eq!(sim[(0, 2)], sim[(2, 0)]);
    assert_eq!(dist[(0, 0)], 0.0);
    assert_eq!(dist[(0, 1)], 0.0);
    assert!((dist[(1, 2)] - 1.5).abs() < 1e-12);

    // The two complete runs are joined first
    let tree = pairwise.tree().unwrap();
    assert_eq!(tree.nodes()[0].left, NodeRef::Leaf(0));
    assert_eq!(tree.nodes()[0].right, NodeRef::Leaf(1));
}

#[test]
fn test_progress_events() {
    let recorder = Arc::new(Recorder::default());
    let ctx = RunContext::new().with_observer(recorder.clone());
    let exprs = vec![
        experiment("a", &[10.0, 20.0]),
        experiment("b", &[10.0, 20.0]),
        experiment("c", &[10.0, 20.0]),
    ];

    let pairwise =
        PairwiseAlignment::from_experiments(&exprs, &AlignmentParams::default(), &ctx).unwrap();
    align_with_tree(pairwise, 3, &ctx).unwrap();

    let events = recorder.0.lock().unwrap();
    assert_eq!(events[0], ProgressEvent::PairwiseStarted { inputs: 3, pairs: 3 });
    let aligned = events
        .iter()
        .filter(|e| matches!(e, ProgressEvent::PairwiseAligned { .. }))
        .count();
    assert_eq!(aligned, 3);
    assert!(events.contains(&ProgressEvent::ClusteringDone { nodes: 2 }));
    assert!(events.contains(&ProgressEvent::MergeStarted { merges: 2 }));
    assert!(events.contains(&ProgressEvent::Merged {
        remaining: 0,
        columns: 2
    }));
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::Filtered {
            before: 2,
            after: 2
        })
    );
}

#[test]
fn test_cancellation() {
    let token = CancellationToken::new();
    let ctx = RunContext::new().with_cancellation(token.clone());
    let exprs = vec![experiment("a", &[10.0]), experiment("b", &[10.0])];
    let params = AlignmentParams::default();

    let pairwise = PairwiseAlignment::from_experiments(&exprs, &params, &ctx).unwrap();
    token.cancel();
    assert!(matches!(
        align_with_tree(pairwise, 1, &ctx),
        Err(AlignmentError::Cancelled)
    ));
    assert!(matches!(
        PairwiseAlignment::from_experiments(&exprs, &params, &ctx),
        Err(AlignmentError::Cancelled)
    ));
}

#[test]
fn test_invalid_params_rejected() {
    let a = Alignment::from_experiment(&experiment("a", &[10.0]));
    assert!(matches!(
        align(&a, &a, &AlignmentParams::new(-1.0, 0.3)),
        Err(AlignmentError::InvalidParameter(_))
    ));
}

#[test]
fn test_mass_axis_mismatch_aborts_run() {
    let a = Experiment::new("a", vec![peak(10.0, &[1.0, 2.0])]);
    let b = Experiment::new("b", vec![peak(10.0, &[1.0, 2.0, 3.0])]);
    let result =
        PairwiseAlignment::from_experiments(&[a, b], &AlignmentParams::default(), &RunContext::new());
    assert!(matches!(result, Err(AlignmentError::MassAxisMismatch { .. })));
}

#[test]
fn test_mean_match_cost_method() {
    let a = Alignment::from_experiment(&experiment("a", &[10.0, 20.0, 30.0]));
    let b = Alignment::from_experiment(&experiment("b", &[10.0, 30.0]));
    let params = AlignmentParams::new(5.0, 0.5).with_similarity(SimilarityMethod::MeanMatchCost);
    let merged = align(&a, &b, &params).unwrap();
    // Both matches are exact, so the mean cost is zero
    assert!(merged.similarity().unwrap().abs() < 1e-12);
}

#[test]
fn test_filter_min_peaks_keeps_order() {
    let a = Alignment::from_experiment(&experiment("a", &[10.0, 20.0, 30.0]));
    let b = Alignment::from_experiment(&experiment("b", &[10.0, 30.0]));
    let mut merged = align(&a, &b, &AlignmentParams::new(5.0, 0.5)).unwrap();
    merged.filter_min_peaks(2);
    assert_eq!(merged.ncols(), 2);
    assert_eq!(row_rts(&merged, 0), vec![Some(10.0), Some(30.0)]);
    assert_eq!(row_rts(&merged, 1), vec![Some(10.0), Some(30.0)]);
}

#[test]
fn test_composite_peak_needs_common_mass_axis() {
    let rows = vec![
        vec![Cell::from(peak(10.0, &[2.0, 4.0]))],
        vec![Cell::from(peak(11.0, &[1.0, 1.0, 1.0]))],
    ];
    let alignment = Alignment::from_rows(vec!["a".into(), "b".into()], rows).unwrap();
    assert!(alignment.composite_peak(0).is_none());
}

#[test]
fn test_composite_peak() {
    let a = Experiment::new("a", vec![peak(10.0, &[2.0, 4.0])]);
    let b = Experiment::new("b", vec![peak(12.0, &[1.0, 1.0])]);
    let merged = align(
        &Alignment::from_experiment(&a),
        &Alignment::from_experiment(&b),
        &AlignmentParams::new(5.0, 0.5),
    )
    .unwrap();
    assert_eq!(merged.ncols(), 1);

    let composite = merged.composite_peak(0).unwrap();
    assert!((composite.retention_time - 11.0).abs() < 1e-12);
    assert_eq!(composite.mass_spectrum.intensities, vec![0.75, 1.0]);
    assert_eq!(composite.raw_area, 100.0);
    assert!(merged.composite_peak(1).is_none());
}

fn experiment_strategy(code: &'static str) -> impl Strategy<Value = Experiment> {
    prop::collection::vec(
        (1.0f64..600.0, prop::collection::vec(0.1f64..10.0, 4)),
        1..8,
    )
    .prop_map(move |peaks| {
        Experiment::new(
            code,
            peaks.into_iter().map(|(rt, values)| peak(rt, &values)).collect(),
        )
    })
}

fn alignment_strategy() -> impl Strategy<Value = Alignment> {
    (1usize..4, 0usize..8).prop_flat_map(|(nrows, ncols)| {
        prop::collection::vec(
            prop::collection::vec(prop::option::weighted(0.6, 1.0f64..100.0), ncols),
            nrows,
        )
        .prop_map(move |rows| {
            let codes = (0..nrows).map(|r| format!("e{}", r)).collect();
            let cells = rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|rt| rt.map_or(Cell::Gap, |rt| peak(rt, &[1.0, 1.0]).into()))
                        .collect()
                })
                .collect();
            Alignment::from_rows(codes, cells).unwrap()
        })
    })
}

proptest! {
    #[test]
    fn prop_dp_cost_symmetric(
        rows in prop::collection::vec(prop::collection::vec(0.0f64..1.0, 1..6), 1..6),
        gap in 0.0f64..2.0,
    ) {
        let width = rows[0].len();
        let rows: Vec<Vec<f64>> = rows.into_iter().map(|mut r| { r.resize(width, 0.5); r }).collect();
        let s = DenseMatrix::from_rows(rows).unwrap();
        let forward = dp(&s, gap).unwrap();
        let backward = dp(&s.transpose(), gap).unwrap();
        prop_assert!((forward.cost - backward.cost).abs() < 1e-9);
    }

    #[test]
    fn prop_alignment_cost_symmetric(a in experiment_strategy("a"), b in experiment_strategy("b")) {
        let (a, b) = (Alignment::from_experiment(&a), Alignment::from_experiment(&b));
        let ab = score_matrix(&a, &b, 5.0).unwrap();
        let ba = score_matrix(&b, &a, 5.0).unwrap();
        let cost_ab = dp(&ab.scores, 0.3).unwrap().cost;
        let cost_ba = dp(&ba.scores, 0.3).unwrap().cost;
        prop_assert!((cost_ab - cost_ba).abs() < 1e-9);
    }

    #[test]
    fn prop_self_alignment_has_no_gaps(expr in experiment_strategy("a"), gap in 0.01f64..2.0) {
        let a = Alignment::from_experiment(&expr);
        let scores = score_matrix(&a, &a, 5.0).unwrap();
        let result = dp(&scores.scores, gap).unwrap();
        prop_assert_eq!(result.gap_count(), 0);
        let expected: Vec<(usize, usize)> = (0..a.ncols()).map(|i| (i, i)).collect();
        prop_assert_eq!(result.matches, expected);
    }

    #[test]
    fn prop_merged_columns_in_time_order(
        a in experiment_strategy("a"),
        b in experiment_strategy("b"),
        gap in 0.0f64..1.0,
    ) {
        let merged = align(
            &Alignment::from_experiment(&a),
            &Alignment::from_experiment(&b),
            &AlignmentParams::new(5.0, gap),
        ).unwrap();
        prop_assert_eq!(merged.ncols() >= a.len().max(b.len()), true);
        let means: Vec<f64> = (0..merged.ncols())
            .filter_map(|c| merged.column_mean_rt(c))
            .collect();
        prop_assert!(means.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn prop_filter_min_peaks(alignment in alignment_strategy(), k in 1usize..4) {
        let expected: Vec<Vec<Cell>> = (0..alignment.ncols())
            .filter(|&c| alignment.column_peak_count(c) >= k)
            .map(|c| alignment.column(c).cloned().collect())
            .collect();

        let mut filtered = alignment.clone();
        filtered.filter_min_peaks(k);

        prop_assert_eq!(filtered.ncols(), expected.len());
        prop_assert_eq!(filtered.expr_codes(), alignment.expr_codes());
        for (c, column) in expected.iter().enumerate() {
            let actual: Vec<Cell> = filtered.column(c).cloned().collect();
            prop_assert_eq!(&actual, column);
        }
    }
}
