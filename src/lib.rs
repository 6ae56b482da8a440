use image::RgbImage;
use tracing::instrument;

mod error;
pub mod geometry;
pub mod mask;
pub mod matching;
pub mod metrics;
pub mod page;
pub mod report;
pub mod scoring;
pub mod util;
pub mod visualization;

pub use error::{Error, Result};
pub use geometry::{BoundingBox, LinePolygon};
pub use mask::{MaskFlags, PixelMask};
pub use matching::{Candidate, Matching, WeightMode};
pub use metrics::{Metric, MetricValue, Results};
pub use scoring::{ConfusionCounts, PairScore, PixelScorer};

use matching::{build_candidates, greedy_match};

pub const DEFAULT_THRESHOLD: f64 = 0.75;

pub struct EvaluatorBuilder {
    threshold: f64,
    weight_mode: WeightMode,
}

impl EvaluatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// IoU a matched pair must exceed to count as a correct line.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn weight_mode(mut self, weight_mode: WeightMode) -> Self {
        self.weight_mode = weight_mode;
        self
    }

    #[instrument(skip(self))]
    pub fn build(self) -> Result<LineSegmentationEvaluator> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::InvalidThreshold(self.threshold));
        }
        Ok(LineSegmentationEvaluator {
            threshold: self.threshold,
            weight_mode: self.weight_mode,
        })
    }
}

impl Default for EvaluatorBuilder {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            weight_mode: WeightMode::default(),
        }
    }
}

/// Scores method-output line polygons against ground-truth line polygons.
///
/// The evaluator holds configuration only; every call to
/// [`evaluate`](Self::evaluate) is independent.
#[derive(Debug, Clone)]
pub struct LineSegmentationEvaluator {
    threshold: f64,
    weight_mode: WeightMode,
}

impl LineSegmentationEvaluator {
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn weight_mode(&self) -> WeightMode {
        self.weight_mode
    }

    /// Matches the two line sets, scores every matched pair and aggregates
    /// the accepted ones.
    ///
    /// Fails only when `options.mask` does not cover a matched pair.
    #[instrument(skip_all, fields(truth = truth.len(), output = output.len()))]
    pub fn evaluate(
        &self,
        truth: &[LinePolygon],
        output: &[LinePolygon],
        options: EvaluationOptions<'_>,
    ) -> Result<Evaluation> {
        let candidates = build_candidates(truth, output, self.weight_mode);
        let matching = greedy_match(&candidates, truth.len(), output.len());
        log::debug!("matching.size {}", matching.len());

        let scorer = PixelScorer::new(self.threshold)
            .with_mask(options.mask)
            .with_main_text_area(options.main_text_area);
        let pairs = matching
            .pairs()
            .iter()
            .map(|pair| scorer.score(&truth[pair.truth], &output[pair.output], pair))
            .collect::<Result<Vec<_>>>()?;

        let results = metrics::aggregate(truth.len(), output.len(), &pairs);

        let visualization = options.visualize.then(|| {
            let (width, height) = visualization::canvas_size(truth, output, options.mask);
            visualization::render(width, height, truth, output, &pairs, &scorer)
        });

        Ok(Evaluation {
            results,
            matching,
            pairs,
            visualization,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationOptions<'a> {
    /// Pixel ground truth; boundary and background pixels are not scored.
    pub mask: Option<&'a PixelMask>,
    /// Pixels outside this box are not scored.
    pub main_text_area: Option<BoundingBox>,
    /// Also paint the classification raster.
    pub visualize: bool,
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub results: Results,
    pub matching: Matching,
    /// One score per matched pair, accepted or not.
    pub pairs: Vec<PairScore>,
    pub visualization: Option<RgbImage>,
}

impl Evaluation {
    pub fn accepted_pairs(&self) -> impl Iterator<Item = &PairScore> {
        self.pairs.iter().filter(|pair| pair.accepted)
    }
}
