mod common;

use lineseg_eval::util::{polygon_from_vertices, rectangle};
use lineseg_eval::{
    page, BoundingBox, Error, EvaluationOptions, EvaluatorBuilder, LinePolygon, Metric, PixelMask,
    WeightMode,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn evaluate(
    truth: &[LinePolygon],
    output: &[LinePolygon],
    threshold: f64,
) -> lineseg_eval::Evaluation {
    EvaluatorBuilder::new()
        .threshold(threshold)
        .build()
        .expect("Failed to build evaluator")
        .evaluate(truth, output, EvaluationOptions::default())
        .expect("Evaluation failed")
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

fn text_lines(count: i32) -> Vec<LinePolygon> {
    (0..count)
        .map(|i| rectangle(0, i * 20, 100, i * 20 + 15))
        .collect()
}

#[test]
fn disjoint_sets_score_zero() {
    init();
    let truth = vec![rectangle(0, 0, 10, 10), rectangle(0, 20, 10, 30)];
    let output = vec![rectangle(10, 0, 20, 10), rectangle(50, 50, 60, 60)];
    let evaluation = evaluate(&truth, &output, 0.75);

    assert!(evaluation.matching.is_empty());
    for (metric, value) in evaluation.results.iter() {
        let value = value.as_f64().unwrap();
        match metric {
            Metric::TruthLines | Metric::ProposedLines => assert_eq!(value, 2.0),
            _ => assert_eq!(value, 0.0, "{metric}"),
        }
    }
}

#[test]
fn empty_inputs_score_zero() {
    init();
    let evaluation = evaluate(&[], &text_lines(3), 0.75);
    assert_eq!(evaluation.results.value(Metric::LineIoU), Some(0.0));
    assert_eq!(evaluation.results.value(Metric::LinePrecision), Some(0.0));
    let evaluation = evaluate(&text_lines(3), &[], 0.75);
    assert_eq!(evaluation.results.value(Metric::LineRecall), Some(0.0));
    assert_eq!(evaluation.results.value(Metric::PixelIoU), Some(0.0));
}

#[test]
fn self_evaluation_is_perfect() {
    init();
    let lines = text_lines(5);
    let evaluation = evaluate(&lines, &lines, 0.75);
    let results = &evaluation.results;

    assert_eq!(results.count(Metric::CorrectLines), Some(5));
    for metric in [
        Metric::LineIoU,
        Metric::LinePrecision,
        Metric::LineRecall,
        Metric::PixelIoU,
        Metric::PixelPrecision,
        Metric::PixelRecall,
    ] {
        assert_eq!(results.value(metric), Some(1.0), "{metric}");
    }
    assert_eq!(results.value(Metric::FalsePositiveRate), Some(0.0));
    assert_eq!(results.value(Metric::FalseNegativeRate), Some(0.0));
}

#[test]
fn overlapping_squares_with_low_threshold() {
    init();
    let truth = vec![rectangle(0, 0, 10, 10)];
    let output = vec![rectangle(5, 5, 15, 15)];
    let evaluation = evaluate(&truth, &output, 0.1);
    let results = &evaluation.results;

    assert!(close(evaluation.pairs[0].iou, 25.0 / 175.0));
    assert_eq!(results.count(Metric::CorrectLines), Some(1));
    assert_eq!(results.value(Metric::PixelPrecision), Some(0.25));
    assert_eq!(results.value(Metric::PixelRecall), Some(0.25));
    assert_eq!(results.value(Metric::LineIoU), Some(1.0));
}

#[test]
fn overlapping_squares_with_high_threshold() {
    init();
    let truth = vec![rectangle(0, 0, 10, 10)];
    let output = vec![rectangle(5, 5, 15, 15)];
    let evaluation = evaluate(&truth, &output, 0.5);
    let results = &evaluation.results;

    assert_eq!(evaluation.matching.len(), 1);
    assert_eq!(evaluation.accepted_pairs().count(), 0);
    assert_eq!(results.count(Metric::CorrectLines), Some(0));
    for metric in [
        Metric::PixelIoU,
        Metric::PixelPrecision,
        Metric::PixelRecall,
        Metric::LinePrecision,
        Metric::LineRecall,
    ] {
        assert_eq!(results.value(metric), Some(0.0), "{metric}");
    }
}

#[test]
fn swapping_sets_swaps_precision_and_recall() {
    init();
    let truth = text_lines(3);
    let output = vec![rectangle(2, 1, 98, 16), rectangle(0, 22, 90, 36)];
    let forward = evaluate(&truth, &output, 0.75).results;
    let backward = evaluate(&output, &truth, 0.75).results;

    let pairs = [
        (Metric::LinePrecision, Metric::LineRecall),
        (Metric::PixelPrecision, Metric::PixelRecall),
        (Metric::LineIoU, Metric::LineIoU),
        (Metric::PixelIoU, Metric::PixelIoU),
    ];
    for (a, b) in pairs {
        let (x, y) = (forward.value(a).unwrap(), backward.value(b).unwrap());
        assert!(close(x, y), "{a} = {x}, {b} = {y}");
    }
    assert!(forward.value(Metric::PixelIoU).unwrap() > 0.0);
}

#[test]
fn raising_the_threshold_never_adds_lines() {
    init();
    let truth = text_lines(6);
    let output = (0..6)
        .map(|i| rectangle(i * 6, i * 20 + i, 100 - i * 4, i * 20 + 15))
        .collect::<Vec<_>>();

    let mut previous = usize::MAX;
    for step in 0..=20 {
        let threshold = f64::from(step) / 20.0;
        let correct = evaluate(&truth, &output, threshold)
            .results
            .count(Metric::CorrectLines)
            .unwrap();
        assert!(correct <= previous, "threshold {threshold}");
        previous = correct;
    }
    assert_eq!(previous, 0);
}

#[test]
fn invalid_threshold_is_rejected() {
    for threshold in [-0.1, 1.5, f64::NAN] {
        let result = EvaluatorBuilder::new().threshold(threshold).build();
        assert!(matches!(result, Err(Error::InvalidThreshold(_))));
    }
}

#[test]
fn polygon_weighting_prefers_true_overlap() {
    init();
    // Both outputs share the ground truth's bounding box overlap, but only the
    // second one covers the same triangle.
    let truth = vec![polygon_from_vertices(&[(0, 0), (40, 0), (0, 40)])];
    let output = vec![
        polygon_from_vertices(&[(40, 40), (0, 40), (40, 0)]),
        polygon_from_vertices(&[(0, 0), (38, 0), (0, 38)]),
    ];

    let boxed = EvaluatorBuilder::new()
        .threshold(0.5)
        .build()
        .unwrap()
        .evaluate(&truth, &output, EvaluationOptions::default())
        .unwrap();
    assert_eq!(boxed.matching.output_for(0), Some(0));
    assert_eq!(boxed.results.count(Metric::CorrectLines), Some(0));

    let exact = EvaluatorBuilder::new()
        .threshold(0.5)
        .weight_mode(WeightMode::PolygonArea)
        .build()
        .unwrap()
        .evaluate(&truth, &output, EvaluationOptions::default())
        .unwrap();
    assert_eq!(exact.matching.output_for(0), Some(1));
    assert_eq!(exact.results.count(Metric::CorrectLines), Some(1));
}

#[test]
fn mask_smaller_than_a_pair_fails() {
    init();
    let lines = text_lines(2);
    let mask = PixelMask::new(50, 50);
    let result = EvaluatorBuilder::new().build().unwrap().evaluate(
        &lines,
        &lines,
        EvaluationOptions {
            mask: Some(&mask),
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(Error::MaskOutOfRange { .. })));
}

#[test]
fn visualization_is_returned_per_call() {
    init();
    let evaluator = EvaluatorBuilder::new().threshold(0.1).build().unwrap();
    let truth = vec![rectangle(0, 0, 10, 10)];
    let output = vec![rectangle(5, 5, 15, 15)];

    let first = evaluator
        .evaluate(
            &truth,
            &output,
            EvaluationOptions {
                visualize: true,
                ..Default::default()
            },
        )
        .unwrap();
    let second = evaluator
        .evaluate(&truth, &output, EvaluationOptions::default())
        .unwrap();

    let image = first.visualization.expect("visualization requested");
    assert_eq!(image.dimensions(), (15, 15));
    assert!(second.visualization.is_none());
    assert_eq!(first.results, second.results);
}

#[test]
fn page_files_with_pixel_ground_truth() {
    init();
    let dir = common::fixture_dir("page_files_with_pixel_ground_truth");
    let region = (5, 5, 115, 55);
    let truth_path = dir.join("truth.xml");
    let output_path = dir.join("output.xml");
    let mask_path = dir.join("truth.png");
    std::fs::write(&truth_path, common::page_xml(region, &[(10, 10, 60, 30)])).unwrap();
    std::fs::write(
        &output_path,
        common::page_xml(region, &[(10, 10, 60, 30), (70, 10, 110, 30)]),
    )
    .unwrap();
    common::mask_image(120, 60, 20, 10)
        .save(&mask_path)
        .expect("Failed to save mask");

    let truth = page::read_page(&truth_path, false).unwrap();
    let output = page::read_page(&output_path, false).unwrap();
    let mask = PixelMask::open(&mask_path).unwrap();
    assert_eq!(truth.main_text_area, Some(BoundingBox::new(5, 5, 115, 55)));

    let evaluation = EvaluatorBuilder::new()
        .build()
        .unwrap()
        .evaluate(
            &truth.lines,
            &output.lines,
            EvaluationOptions {
                mask: Some(&mask),
                main_text_area: truth.main_text_area,
                visualize: true,
            },
        )
        .unwrap();

    // 50x20 line minus the boundary column and the background row.
    let expected = 50 * 20 - 20 - 49;
    let counts = evaluation.pairs[0].counts;
    assert_eq!(counts.matching, expected);
    assert_eq!(counts.truth, expected);
    assert_eq!(evaluation.results.count(Metric::CorrectLines), Some(1));
    assert_eq!(evaluation.results.value(Metric::LineRecall), Some(1.0));
    assert_eq!(evaluation.results.value(Metric::LinePrecision), Some(0.5));
    assert_eq!(evaluation.results.value(Metric::PixelIoU), Some(1.0));
    assert_eq!(
        evaluation.visualization.map(|image| image.dimensions()),
        Some((120, 60))
    );
}
