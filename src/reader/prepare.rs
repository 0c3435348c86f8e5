use image::GrayImage;
use imageproc::contrast::otsu_level;
use rqrr::PreparedImage;
use tracing::{debug, warn};

// Preparation
//------------------------------------------------------------------------------

/// How a grayscale image is turned into a bitmap before grid detection.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Preparation {
    /// Detector's own local thresholding on raw luma.
    Greyscale,
    /// Global Otsu threshold, for images with uneven backgrounds.
    Otsu,
}

impl Preparation {
    /// Order in which the reader tries preparations.
    pub const CASCADE: [Preparation; 2] = [Self::Greyscale, Self::Otsu];

    /// Detects grids and returns the payload of the first one that decodes.
    /// Grids are tried in reading order: topmost first, then leftmost.
    pub(crate) fn scan(self, img: &GrayImage) -> Option<Vec<u8>> {
        let (w, h) = (img.width() as usize, img.height() as usize);
        let luma = |x: usize, y: usize| img.get_pixel(x as u32, y as u32)[0];

        let mut prepared = match self {
            Self::Greyscale => PreparedImage::prepare_from_greyscale(w, h, luma),
            Self::Otsu => {
                let level = otsu_level(img);
                PreparedImage::prepare_from_bitmap(w, h, |x, y| luma(x, y) <= level)
            }
        };
        let mut grids = prepared.detect_grids();
        debug!("{self:?}: {} grid(s) detected", grids.len());

        grids.sort_by_key(|g| {
            let top = g.bounds.iter().map(|p| p.y).min().unwrap_or_default();
            let left = g.bounds.iter().map(|p| p.x).min().unwrap_or_default();
            (top, left)
        });

        for (i, grid) in grids.iter().enumerate() {
            let mut buf = Vec::new();
            match grid.decode_to(&mut buf) {
                Ok(_) => return Some(buf),
                Err(e) => warn!("{self:?}: skipping grid {i}: {e}"),
            }
        }
        None
    }
}
