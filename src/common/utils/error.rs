use thiserror::Error;

// Error
//------------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum QRError {
    // Compressor
    #[error("Error opening image: {0}")]
    ImageDecodeFailure(String),
    #[error("Error encoding image: {0}")]
    ImageEncodeFailure(String),
    #[error(
        "Cannot compress image to {target} bytes: smallest encoding was {size} bytes at {width}x{height}"
    )]
    CompressionUnsatisfiable { target: usize, size: usize, width: u32, height: u32 },

    // Symbol builder
    #[error("Payload of {len} bytes exceeds symbol capacity of {capacity} bytes")]
    PayloadTooLarge { len: usize, capacity: usize },
    #[error("Invalid version {0}, expected 1 to 40")]
    InvalidVersion(i16),
    #[error("Error building symbol: {0}")]
    SymbolEncodeFailure(String),

    // Symbol reader
    #[error("No QR code detected")]
    SymbolNotFound,
}

pub type QRResult<T> = Result<T, QRError>;

impl From<image::ImageError> for QRError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Encoding(_) | image::ImageError::Unsupported(_) => {
                Self::ImageEncodeFailure(e.to_string())
            }
            _ => Self::ImageDecodeFailure(e.to_string()),
        }
    }
}
