//! Line-count and pixel-level metrics computed from scored pairs.

use std::fmt;

use tracing::instrument;

use crate::{
    scoring::{ConfusionCounts, PairScore},
    util::ratio,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    TruthLines,
    ProposedLines,
    CorrectLines,
    LineRecall,
    LinePrecision,
    LineIoU,
    PixelIoU,
    PixelPrecision,
    PixelRecall,
    TruePositiveRate,
    FalsePositiveRate,
    FalseNegativeRate,
    /// Name of the evaluated document, added by callers.
    Filename,
}

impl Metric {
    /// Column name used by the CSV and JSON reports.
    pub const fn name(self) -> &'static str {
        match self {
            Metric::TruthLines => "NbLinesTruth",
            Metric::ProposedLines => "NbLinesProposed",
            Metric::CorrectLines => "NbLinesCorrect",
            Metric::LineRecall => "LinesRecall",
            Metric::LinePrecision => "LinesPrecision",
            Metric::LineIoU => "LinesIU",
            Metric::PixelIoU => "PixelIU",
            Metric::PixelPrecision => "Precision",
            Metric::PixelRecall => "Recall",
            Metric::TruePositiveRate => "TruePositive",
            Metric::FalsePositiveRate => "FalsePositive",
            Metric::FalseNegativeRate => "FalseNegative",
            Metric::Filename => "filename",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Count(usize),
    Ratio(f64),
    Text(String),
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Count(count) => Some(*count as f64),
            MetricValue::Ratio(value) => Some(*value),
            MetricValue::Text(_) => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(count) => write!(f, "{count}"),
            MetricValue::Ratio(value) => write!(f, "{value}"),
            MetricValue::Text(text) => f.write_str(text),
        }
    }
}

/// Metrics in insertion order. Inserting an existing metric replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Results {
    entries: Vec<(Metric, MetricValue)>,
}

impl Results {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, metric: Metric, value: MetricValue) {
        log::trace!("put({metric}) = {value}");
        match self.entries.iter_mut().find(|(key, _)| *key == metric) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((metric, value)),
        }
    }

    pub fn get(&self, metric: Metric) -> Option<&MetricValue> {
        self.entries
            .iter()
            .find(|(key, _)| *key == metric)
            .map(|(_, value)| value)
    }

    /// Numeric value of `metric`, counts included.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.get(metric).and_then(MetricValue::as_f64)
    }

    pub fn count(&self, metric: Metric) -> Option<usize> {
        match self.get(metric)? {
            MetricValue::Count(count) => Some(*count),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, &MetricValue)> {
        self.entries.iter().map(|(metric, value)| (*metric, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sums the counts of accepted pairs and derives every metric.
///
/// `truth_lines` and `proposed_lines` are the sizes of the two polygon sets;
/// unmatched lines only show up through them.
#[instrument(level = "debug", skip(scores))]
pub fn aggregate(truth_lines: usize, proposed_lines: usize, scores: &[PairScore]) -> Results {
    let accepted = scores.iter().filter(|score| score.accepted);
    let correct_lines = accepted.clone().count();
    let pixels = accepted.fold(ConfusionCounts::default(), |sum, score| {
        sum + score.counts
    });
    log::trace!("summed pixel counts {pixels:?}");
    line_and_pixel_metrics(truth_lines, proposed_lines, correct_lines, &pixels)
}

pub fn line_and_pixel_metrics(
    truth_lines: usize,
    proposed_lines: usize,
    correct_lines: usize,
    pixels: &ConfusionCounts,
) -> Results {
    let (truth, proposed, correct) = (
        truth_lines as f64,
        proposed_lines as f64,
        correct_lines as f64,
    );
    let line_recall = ratio(correct, truth);
    let line_precision = ratio(correct, proposed);
    let line_iou = ratio(correct, truth + proposed - correct);

    let matching = pixels.matching as f64;
    let pixel_precision = ratio(matching, pixels.output as f64);
    let pixel_recall = ratio(matching, pixels.truth as f64);
    let pixel_iou = ratio(matching, pixels.union() as f64);

    log::debug!("line IU = {line_iou}");
    log::debug!("line precision = {line_precision}");
    log::debug!("line recall = {line_recall}");
    log::debug!("pixel IU = {pixel_iou}");
    log::debug!("pixel precision = {pixel_precision}");
    log::debug!("pixel recall = {pixel_recall}");

    let mut results = Results::new();
    results.insert(Metric::TruthLines, MetricValue::Count(truth_lines));
    results.insert(Metric::ProposedLines, MetricValue::Count(proposed_lines));
    results.insert(Metric::CorrectLines, MetricValue::Count(correct_lines));
    results.insert(Metric::LineRecall, MetricValue::Ratio(line_recall));
    results.insert(Metric::LinePrecision, MetricValue::Ratio(line_precision));
    results.insert(Metric::LineIoU, MetricValue::Ratio(line_iou));
    results.insert(Metric::PixelIoU, MetricValue::Ratio(pixel_iou));
    results.insert(Metric::PixelPrecision, MetricValue::Ratio(pixel_precision));
    results.insert(Metric::PixelRecall, MetricValue::Ratio(pixel_recall));
    results.insert(Metric::TruePositiveRate, MetricValue::Ratio(pixel_recall));
    results.insert(
        Metric::FalsePositiveRate,
        MetricValue::Ratio(ratio(pixels.false_positive as f64, pixels.output as f64)),
    );
    results.insert(
        Metric::FalseNegativeRate,
        MetricValue::Ratio(ratio(pixels.missed as f64, pixels.truth as f64)),
    );
    results
}
