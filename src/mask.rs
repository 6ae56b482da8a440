//! Pixel-level ground truth used to exclude pixels from scoring.
//!
//! The HisDoc layout ground truth stores its flags in the colour bits of each
//! pixel: the most significant bit of the red channel marks an ambiguous
//! boundary pixel and the least significant bit of the blue channel marks
//! background.

use std::path::Path;

use image::{DynamicImage, Rgb};
use tracing::instrument;

use crate::{geometry::BoundingBox, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaskFlags {
    pub boundary: bool,
    pub background: bool,
}

impl MaskFlags {
    pub fn from_rgb(Rgb([red, _, blue]): Rgb<u8>) -> Self {
        Self {
            boundary: red & 0x80 != 0,
            background: blue & 0x01 != 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelMask {
    width: u32,
    height: u32,
    flags: Vec<MaskFlags>,
}

impl PixelMask {
    /// A mask of the given size with no flag set.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            flags: vec![MaskFlags::default(); width as usize * height as usize],
        }
    }

    #[instrument(level = "debug", skip(image))]
    pub fn from_image(image: &DynamicImage) -> Self {
        let image = image.to_rgb8();
        let flags = image
            .pixels()
            .map(|pixel| MaskFlags::from_rgb(*pixel))
            .collect::<Vec<_>>();
        log::debug!(
            "decoded {}x{} pixel mask, {} boundary pixels",
            image.width(),
            image.height(),
            flags.iter().filter(|it| it.boundary).count()
        );
        Self {
            width: image.width(),
            height: image.height(),
            flags,
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading pixel ground truth from {}", path.display());
        Ok(Self::from_image(&image::open(path)?))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn flags(&self, x: i32, y: i32) -> Option<MaskFlags> {
        let index = self.index(x, y)?;
        self.flags.get(index).copied()
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the mask.
    pub fn set(&mut self, x: u32, y: u32, flags: MaskFlags) {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{} mask",
            self.width,
            self.height
        );
        let index = y as usize * self.width as usize + x as usize;
        self.flags[index] = flags;
    }

    /// Whether every pixel of `region` has a cell in this mask.
    pub fn covers(&self, region: &BoundingBox) -> bool {
        region.is_empty()
            || (region.min_x >= 0
                && region.min_y >= 0
                && i64::from(region.max_x) <= i64::from(self.width)
                && i64::from(region.max_y) <= i64::from(self.height))
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = u32::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(y as usize * self.width as usize + x as usize)
    }
}
