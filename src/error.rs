use thiserror::Error;

use crate::geometry::BoundingBox;

#[derive(Error, Debug)]
pub enum Error {
    #[error("matching threshold must lie in [0, 1], got {0}")]
    InvalidThreshold(f64),

    /// A matched pair reaches outside the supplied pixel mask.
    #[error("pixel mask of {width}x{height} does not cover {region:?}")]
    MaskOutOfRange {
        region: BoundingBox,
        width: u32,
        height: u32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("invalid polygon points: {0}")]
    InvalidPoints(String),

    #[error("document has no Page element")]
    MissingPage,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
