//! Diagnostic raster showing how the pixels of accepted pairs were classified.

use image::{Rgb, RgbImage};
use tracing::instrument;

use crate::{
    geometry::{BoundingBox, LinePolygon},
    mask::PixelMask,
    scoring::{PairScore, PixelClass, PixelScorer},
};

pub const BOUNDARY_COLOR: Rgb<u8> = Rgb([0x7f, 0x7f, 0x7f]);
pub const MATCHING_COLOR: Rgb<u8> = Rgb([0x00, 0xff, 0x00]);
pub const MISSED_COLOR: Rgb<u8> = Rgb([0xff, 0x00, 0x00]);
pub const FALSE_COLOR: Rgb<u8> = Rgb([0x00, 0x00, 0xff]);

/// Size of the ground-truth image: the mask when there is one, otherwise the
/// extent of every polygon.
pub fn canvas_size(
    truth: &[LinePolygon],
    output: &[LinePolygon],
    mask: Option<&PixelMask>,
) -> (u32, u32) {
    if let Some(mask) = mask {
        return mask.dimensions();
    }
    let extent = truth
        .iter()
        .chain(output)
        .map(BoundingBox::of)
        .fold(BoundingBox::default(), |extent, bounds| extent.union(&bounds));
    (
        u32::try_from(extent.max_x).unwrap_or(0),
        u32::try_from(extent.max_y).unwrap_or(0),
    )
}

/// Paints the union box of every accepted pair onto a black canvas.
///
/// Pixels the scorer skipped for being background or outside the main text
/// area, and pixels inside neither polygon, keep the canvas colour.
#[instrument(level = "debug", skip(truth, output, scores, scorer))]
pub fn render(
    width: u32,
    height: u32,
    truth: &[LinePolygon],
    output: &[LinePolygon],
    scores: &[PairScore],
    scorer: &PixelScorer<'_>,
) -> RgbImage {
    let mut canvas = RgbImage::new(width, height);
    let canvas_bounds = BoundingBox::from_size(0, 0, width, height);

    for score in scores.iter().filter(|score| score.accepted) {
        let (truth_polygon, output_polygon) = (&truth[score.truth], &output[score.output]);
        let region = BoundingBox::of(truth_polygon)
            .union(&BoundingBox::of(output_polygon))
            .intersection(&canvas_bounds);
        for (x, y) in region.pixels() {
            let color = match scorer.classify(x, y, truth_polygon, output_polygon) {
                PixelClass::Boundary => BOUNDARY_COLOR,
                PixelClass::Matching => MATCHING_COLOR,
                PixelClass::Missed => MISSED_COLOR,
                PixelClass::False => FALSE_COLOR,
                PixelClass::Background | PixelClass::OutsideArea | PixelClass::Neither => {
                    continue
                }
            };
            canvas.put_pixel(x as u32, y as u32, color);
        }
    }

    canvas
}
