//! Text line polygons from PAGE XML documents.
//!
//! Lines are read from `Page/TextRegion/TextLine/Coords`, either from the
//! `points="x,y x,y ..."` attribute or from legacy `<Point x=".." y=".."/>`
//! children. Only regions with the id `region_textline` are used unless
//! comments are requested, in which case every region counts.

use std::{fs, path::Path};

use imageproc::point::Point;
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use tracing::instrument;

use crate::{
    geometry::{BoundingBox, LinePolygon},
    util::to_line_polygon,
    Error, Result,
};

const TEXT_LINE_REGION_ID: &str = "region_textline";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageDocument {
    pub lines: Vec<LinePolygon>,
    /// Bounds of the first text region's own outline.
    pub main_text_area: Option<BoundingBox>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoordsOwner {
    Region,
    Line,
}

/// Element depths refer to positions in `open_elements`; only
/// `Page/TextRegion/TextLine/Coords` direct children are read.
#[derive(Debug, Default)]
struct PageParser {
    include_comments: bool,
    open_elements: Vec<Vec<u8>>,
    page_seen: bool,
    page_depth: Option<usize>,
    regions_seen: usize,
    region: Option<(usize, bool)>,
    line: Option<(usize, Option<Vec<Point<i32>>>)>,
    coords: Option<(usize, CoordsOwner, Vec<Point<i32>>)>,
    document: PageDocument,
}

impl PageParser {
    fn is_child_of(parent: Option<usize>, depth: usize) -> bool {
        parent.is_some_and(|parent| parent + 1 == depth)
    }

    fn open(&mut self, element: &BytesStart<'_>, self_closing: bool) -> Result<()> {
        let name = element.local_name();
        let depth = self.open_elements.len();
        match name.as_ref() {
            b"Page" => {
                self.page_seen = true;
                if !self_closing {
                    self.page_depth = Some(depth);
                }
            }
            b"TextRegion" if Self::is_child_of(self.page_depth, depth) => {
                self.regions_seen += 1;
                let id = attribute(element, b"id")?;
                let included = self.include_comments || id.as_deref() == Some(TEXT_LINE_REGION_ID);
                if !self_closing {
                    self.region = Some((depth, included));
                }
            }
            b"TextLine" if Self::is_child_of(self.region.map(|(it, _)| it), depth) => {
                if self_closing {
                    log::warn!("skipping TextLine without Coords");
                } else {
                    self.line = Some((depth, None));
                }
            }
            b"Coords" => {
                let region_depth = self.region.map(|(it, _)| it);
                let owner = match &self.line {
                    Some((line_depth, None)) if line_depth + 1 == depth => CoordsOwner::Line,
                    None if Self::is_child_of(region_depth, depth) => CoordsOwner::Region,
                    _ => return self.push(name.as_ref(), self_closing),
                };
                let points = match attribute(element, b"points")? {
                    Some(points) => parse_points(&points)?,
                    None => Vec::new(),
                };
                if self_closing {
                    self.finish_coords(owner, points);
                } else {
                    self.coords = Some((depth, owner, points));
                }
            }
            b"Point" => {
                if let Some((coords_depth, _, points)) = self.coords.as_mut() {
                    if *coords_depth + 1 == depth {
                        let x = attribute(element, b"x")?.unwrap_or_default();
                        let y = attribute(element, b"y")?.unwrap_or_default();
                        points.push(Point::new(
                            parse_coordinate(&x, &x)?,
                            parse_coordinate(&y, &y)?,
                        ));
                    }
                }
            }
            _ => {}
        }
        self.push(name.as_ref(), self_closing)
    }

    fn push(&mut self, name: &[u8], self_closing: bool) -> Result<()> {
        if !self_closing {
            self.open_elements.push(name.to_vec());
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.open_elements.pop().is_none() {
            return;
        }
        let depth = Some(self.open_elements.len());

        if self.coords.as_ref().map(|(it, ..)| *it) == depth {
            if let Some((_, owner, points)) = self.coords.take() {
                self.finish_coords(owner, points);
            }
        } else if self.line.as_ref().map(|(it, _)| *it) == depth {
            match self.line.take() {
                Some((_, Some(points))) => {
                    if self.region.is_some_and(|(_, included)| included) {
                        self.document.lines.push(to_line_polygon(&points));
                    }
                }
                _ => log::warn!("skipping TextLine without Coords"),
            }
        } else if self.region.map(|(it, _)| it) == depth {
            self.region = None;
        } else if self.page_depth == depth {
            self.page_depth = None;
        }
    }

    fn finish_coords(&mut self, owner: CoordsOwner, points: Vec<Point<i32>>) {
        match owner {
            CoordsOwner::Line => {
                if let Some((_, outline)) = self.line.as_mut() {
                    outline.get_or_insert(points);
                }
            }
            CoordsOwner::Region => {
                if self.regions_seen == 1
                    && self.document.main_text_area.is_none()
                    && !points.is_empty()
                {
                    let outline = to_line_polygon(&points);
                    self.document.main_text_area = Some(BoundingBox::of(&outline));
                }
            }
        }
    }
}

fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    match element.try_get_attribute(name)? {
        Some(attribute) => Ok(Some(attribute.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn parse_coordinate(value: &str, context: &str) -> Result<i32> {
    let value = value.trim();
    value
        .parse::<i32>()
        .or_else(|_| value.parse::<f64>().map(|it| it as i32))
        .map_err(|_| Error::InvalidPoints(context.to_string()))
}

/// Parses a PAGE `points` attribute. Fractional coordinates are truncated.
pub fn parse_points(points: &str) -> Result<Vec<Point<i32>>> {
    points
        .split_whitespace()
        .map(|pair| {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| Error::InvalidPoints(pair.to_string()))?;
            Ok(Point::new(
                parse_coordinate(x, pair)?,
                parse_coordinate(y, pair)?,
            ))
        })
        .collect()
}

#[instrument(level = "debug", skip(xml))]
pub fn parse_page(xml: &str, include_comments: bool) -> Result<PageDocument> {
    let mut reader = Reader::from_str(xml);
    let mut parser = PageParser {
        include_comments,
        ..Default::default()
    };

    loop {
        match reader.read_event()? {
            Event::Start(element) => parser.open(&element, false)?,
            Event::Empty(element) => parser.open(&element, true)?,
            Event::End(_) => parser.close(),
            Event::Eof => break,
            _ => {}
        }
    }

    if !parser.page_seen {
        return Err(Error::MissingPage);
    }
    log::debug!("found {} polygons", parser.document.lines.len());
    Ok(parser.document)
}

pub fn read_page(path: impl AsRef<Path>, include_comments: bool) -> Result<PageDocument> {
    let path = path.as_ref();
    log::debug!("Loading PAGE document from {}", path.display());
    parse_page(&fs::read_to_string(path)?, include_comments)
}

pub fn read_line_polygons(xml: &str, include_comments: bool) -> Result<Vec<LinePolygon>> {
    Ok(parse_page(xml, include_comments)?.lines)
}

pub fn read_main_text_area(xml: &str) -> Result<Option<BoundingBox>> {
    Ok(parse_page(xml, true)?.main_text_area)
}
