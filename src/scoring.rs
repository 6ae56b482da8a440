//! Pixel-level confusion counts for matched line pairs.

use std::ops::{Add, AddAssign};

use tracing::instrument;

use crate::{
    geometry::{self, BoundingBox, LinePolygon},
    mask::PixelMask,
    matching::Candidate,
    util::ratio,
    Error, Result,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    /// Pixels inside both polygons.
    pub matching: u64,
    /// Ground-truth pixels the output missed.
    pub missed: u64,
    /// Output pixels outside the ground truth.
    pub false_positive: u64,
    /// Pixels inside the output polygon.
    pub output: u64,
    /// Pixels inside the ground-truth polygon.
    pub truth: u64,
}

impl ConfusionCounts {
    pub fn union(&self) -> u64 {
        self.matching + self.missed + self.false_positive
    }

    pub fn iou(&self) -> f64 {
        ratio(self.matching as f64, self.union() as f64)
    }

    fn record(&mut self, class: PixelClass) {
        match class {
            PixelClass::Matching => {
                self.matching += 1;
                self.output += 1;
                self.truth += 1;
            }
            PixelClass::Missed => {
                self.missed += 1;
                self.truth += 1;
            }
            PixelClass::False => {
                self.false_positive += 1;
                self.output += 1;
            }
            PixelClass::Boundary
            | PixelClass::Background
            | PixelClass::OutsideArea
            | PixelClass::Neither => {}
        }
    }
}

impl AddAssign for ConfusionCounts {
    fn add_assign(&mut self, other: Self) {
        self.matching += other.matching;
        self.missed += other.missed;
        self.false_positive += other.false_positive;
        self.output += other.output;
        self.truth += other.truth;
    }
}

impl Add for ConfusionCounts {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PixelClass {
    Boundary,
    Background,
    OutsideArea,
    Matching,
    Missed,
    False,
    Neither,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairScore {
    pub truth: usize,
    pub output: usize,
    pub counts: ConfusionCounts,
    pub iou: f64,
    /// Whether `iou` exceeds the threshold. Rejected pairs count for nothing.
    pub accepted: bool,
}

/// Classifies the pixels of matched pairs, honouring an optional pixel mask
/// and main text area.
#[derive(Debug, Clone, Copy)]
pub struct PixelScorer<'a> {
    pub mask: Option<&'a PixelMask>,
    pub main_text_area: Option<BoundingBox>,
    pub threshold: f64,
}

impl<'a> PixelScorer<'a> {
    pub fn new(threshold: f64) -> Self {
        Self {
            mask: None,
            main_text_area: None,
            threshold,
        }
    }

    pub fn with_mask(mut self, mask: Option<&'a PixelMask>) -> Self {
        self.mask = mask;
        self
    }

    pub fn with_main_text_area(mut self, area: Option<BoundingBox>) -> Self {
        self.main_text_area = area;
        self
    }

    /// Scores one matched pair over the union of the two bounding boxes.
    ///
    /// Fails with [`Error::MaskOutOfRange`] when a mask is set but does not
    /// cover that region.
    #[instrument(level = "trace", skip(self, truth, output))]
    pub fn score(
        &self,
        truth: &LinePolygon,
        output: &LinePolygon,
        pair: &Candidate,
    ) -> Result<PairScore> {
        let region = BoundingBox::of(truth).union(&BoundingBox::of(output));
        self.check_coverage(&region)?;

        let mut counts = ConfusionCounts::default();
        for (x, y) in region.pixels() {
            counts.record(self.classify(x, y, truth, output));
        }

        let iou = counts.iou();
        let accepted = iou > self.threshold;
        if accepted {
            log::trace!("IU = {iou}");
        } else {
            log::debug!(
                "line skipped, IU below threshold: {iou} (truth {}, output {})",
                pair.truth,
                pair.output
            );
        }

        Ok(PairScore {
            truth: pair.truth,
            output: pair.output,
            counts,
            iou,
            accepted,
        })
    }

    pub(crate) fn check_coverage(&self, region: &BoundingBox) -> Result<()> {
        match self.mask {
            Some(mask) if !mask.covers(region) => Err(Error::MaskOutOfRange {
                region: *region,
                width: mask.width(),
                height: mask.height(),
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn classify(
        &self,
        x: i32,
        y: i32,
        truth: &LinePolygon,
        output: &LinePolygon,
    ) -> PixelClass {
        if let Some(mask) = self.mask {
            let flags = mask.flags(x, y).unwrap_or_default();
            if flags.boundary {
                return PixelClass::Boundary;
            }
            if flags.background {
                return PixelClass::Background;
            }
        }
        if let Some(area) = &self.main_text_area {
            if !area.contains(x, y) {
                return PixelClass::OutsideArea;
            }
        }
        match (
            geometry::contains(output, x, y),
            geometry::contains(truth, x, y),
        ) {
            (true, true) => PixelClass::Matching,
            (false, true) => PixelClass::Missed,
            (true, false) => PixelClass::False,
            (false, false) => PixelClass::Neither,
        }
    }
}
