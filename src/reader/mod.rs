mod prepare;

pub use prepare::Preparation;

use image::DynamicImage;
use tracing::debug;

use crate::common::{QRError, QRResult};

// Symbol reader
//------------------------------------------------------------------------------

pub struct SymbolReader();

impl SymbolReader {
    /// Returns the raw payload of one symbol in `img`, or `None` when no
    /// decodable symbol is present.
    pub fn read(img: &DynamicImage) -> Option<Vec<u8>> {
        debug!("Reading symbol from {}x{} image...", img.width(), img.height());
        if img.width() == 0 || img.height() == 0 {
            return None;
        }
        let gray = img.to_luma8();
        Preparation::CASCADE.into_iter().find_map(|prep| prep.scan(&gray))
    }

    /// Loads an encoded image (PNG, JPEG, ...) and reads it.
    pub fn read_bytes(data: &[u8]) -> QRResult<Option<Vec<u8>>> {
        let img = image::load_from_memory(data)
            .map_err(|e| QRError::ImageDecodeFailure(e.to_string()))?;
        Ok(Self::read(&img))
    }
}
