//! Candidate correspondences between ground-truth and method-output lines, and
//! their greedy resolution into a one-to-one matching.
//!
//! Polygons are referred to by their index in the input slices.

use std::collections::HashSet;

use geo::Area;
use geo_clipper::Clipper;
use tracing::instrument;

use crate::{
    geometry::{BoundingBox, LinePolygon},
    util::to_clip_polygon,
};

/// How the overlap weight of a candidate is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WeightMode {
    /// Pixels shared by the two bounding boxes.
    #[default]
    BoundingBox,
    /// Area shared by the two polygons themselves.
    PolygonArea,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub truth: usize,
    pub output: usize,
    pub weight: f64,
}

/// Injective pairing of ground-truth and method-output indices, in the order
/// the pairs were committed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matching {
    pairs: Vec<Candidate>,
    truth_count: usize,
    output_count: usize,
}

impl Matching {
    pub fn pairs(&self) -> &[Candidate] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn output_for(&self, truth: usize) -> Option<usize> {
        self.pairs
            .iter()
            .find(|pair| pair.truth == truth)
            .map(|pair| pair.output)
    }

    pub fn truth_for(&self, output: usize) -> Option<usize> {
        self.pairs
            .iter()
            .find(|pair| pair.output == output)
            .map(|pair| pair.truth)
    }

    /// Ground-truth lines left without a partner (implicit misses).
    pub fn unmatched_truth(&self) -> Vec<usize> {
        (0..self.truth_count)
            .filter(|&index| self.output_for(index).is_none())
            .collect()
    }

    /// Method-output lines left without a partner (implicit false detections).
    pub fn unmatched_output(&self) -> Vec<usize> {
        (0..self.output_count)
            .filter(|&index| self.truth_for(index).is_none())
            .collect()
    }
}

/// Every pair of lines whose bounding boxes overlap, ground truth major.
#[instrument(level = "debug", skip_all, fields(truth = truth.len(), output = output.len()))]
pub fn build_candidates(
    truth: &[LinePolygon],
    output: &[LinePolygon],
    mode: WeightMode,
) -> Vec<Candidate> {
    let output_bounds = output.iter().map(BoundingBox::of).collect::<Vec<_>>();
    let mut candidates = Vec::new();

    for (truth_index, truth_polygon) in truth.iter().enumerate() {
        let truth_bounds = BoundingBox::of(truth_polygon);
        for (output_index, output_box) in output_bounds.iter().enumerate() {
            if !truth_bounds.intersects(output_box) {
                continue;
            }
            let weight = match mode {
                WeightMode::BoundingBox => truth_bounds.intersection(output_box).area() as f64,
                WeightMode::PolygonArea => overlap_area(truth_polygon, &output[output_index]),
            };
            log::trace!("candidate truth {truth_index} * output {output_index} = {weight}");
            candidates.push(Candidate {
                truth: truth_index,
                output: output_index,
                weight,
            });
        }
    }

    log::debug!("{} candidates", candidates.len());
    candidates
}

fn overlap_area(a: &LinePolygon, b: &LinePolygon) -> f64 {
    to_clip_polygon(a)
        .intersection(&to_clip_polygon(b), 1.0)
        .unsigned_area()
}

/// Commits the heaviest remaining candidate until none is left.
///
/// Only strictly positive weights are eligible. Among equal weights the
/// candidate seen first wins, so the result depends on candidate order. This
/// approximates a maximum-weight bipartite matching; it is not optimal.
#[instrument(level = "debug", skip(candidates), fields(candidates = candidates.len()))]
pub fn greedy_match(candidates: &[Candidate], truth_count: usize, output_count: usize) -> Matching {
    let mut taken_truth = HashSet::new();
    let mut taken_output = HashSet::new();
    let mut pairs = Vec::new();

    loop {
        let mut best: Option<&Candidate> = None;
        for candidate in candidates {
            if taken_truth.contains(&candidate.truth) || taken_output.contains(&candidate.output) {
                continue;
            }
            if candidate.weight > best.map_or(0.0, |it| it.weight) {
                best = Some(candidate);
            }
        }
        let Some(best) = best else {
            break;
        };
        log::trace!(
            "match truth {} with output {} ({})",
            best.truth,
            best.output,
            best.weight
        );
        taken_truth.insert(best.truth);
        taken_output.insert(best.output);
        pairs.push(*best);
    }

    log::debug!("found {} matches", pairs.len());
    Matching {
        pairs,
        truth_count,
        output_count,
    }
}
