#![allow(dead_code)]

use std::path::PathBuf;

use image::{Rgb, RgbImage};

/// Fresh directory for one test's fixture files.
pub fn fixture_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from(std::env!("CARGO_TARGET_TMPDIR")).join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("Failed to create fixture dir");
    dir
}

/// PAGE document with one text line region holding an axis-aligned rectangle
/// per entry of `lines`.
pub fn page_xml(region: (i32, i32, i32, i32), lines: &[(i32, i32, i32, i32)]) -> String {
    let rect = |(x0, y0, x1, y1): (i32, i32, i32, i32)| {
        format!("{x0},{y0} {x1},{y0} {x1},{y1} {x0},{y1}")
    };
    let lines = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            format!(
                "      <TextLine id=\"line_{i}\"><Coords points=\"{}\"/></TextLine>\n",
                rect(*line)
            )
        })
        .collect::<String>();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<PcGts xmlns="http://schema.primaresearch.org/PAGE/gts/pagecontent/2013-07-15">
  <Page imageFilename="page.png" imageWidth="120" imageHeight="60">
    <TextRegion id="region_textline">
      <Coords points="{}"/>
{lines}    </TextRegion>
  </Page>
</PcGts>
"#,
        rect(region)
    )
}

/// HisDoc-encoded pixel ground truth: column `boundary_x` is flagged as
/// boundary and row `background_y` as background.
pub fn mask_image(width: u32, height: u32, boundary_x: u32, background_y: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let red = if x == boundary_x { 0xff } else { 0x10 };
        let blue = if y == background_y { 0x01 } else { 0x00 };
        Rgb([red, 0x20, blue])
    })
}
