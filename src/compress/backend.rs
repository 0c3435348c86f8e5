use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage};

use crate::{PayloadFormat, QRResult};

// Image backend
//------------------------------------------------------------------------------

/// Image operations the compressor relies on.
pub trait ImageBackend {
    type Image;

    /// Format of every buffer produced by [`ImageBackend::encode`].
    const FORMAT: PayloadFormat;

    fn load(&self, data: &[u8]) -> QRResult<Self::Image>;

    fn dimensions(&self, img: &Self::Image) -> (u32, u32);

    fn resize(&self, img: &Self::Image, width: u32, height: u32) -> Self::Image;

    fn encode(&self, img: &Self::Image, quality: u8) -> QRResult<Vec<u8>>;
}

// Backend built on the image crate
//------------------------------------------------------------------------------

/// JPEG backend over [`DynamicImage`]. Resizing uses `filter`, Lanczos3 by
/// default.
#[derive(Debug, Clone, Copy)]
pub struct ImageCrateBackend {
    filter: FilterType,
}

impl ImageCrateBackend {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }

    /// Drops alpha and high bit depths so the image can be written as JPEG.
    pub fn prepare(img: DynamicImage) -> DynamicImage {
        match img {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img,
            _ if img.color().has_color() => DynamicImage::ImageRgb8(img.to_rgb8()),
            _ => DynamicImage::ImageLuma8(img.to_luma8()),
        }
    }
}

impl Default for ImageCrateBackend {
    fn default() -> Self {
        Self::new(FilterType::Lanczos3)
    }
}

impl ImageBackend for ImageCrateBackend {
    type Image = DynamicImage;

    const FORMAT: PayloadFormat = PayloadFormat::Jpeg;

    fn load(&self, data: &[u8]) -> QRResult<DynamicImage> {
        let img = image::load_from_memory(data)
            .map_err(|e| crate::QRError::ImageDecodeFailure(e.to_string()))?;
        Ok(Self::prepare(img))
    }

    fn dimensions(&self, img: &DynamicImage) -> (u32, u32) {
        (img.width(), img.height())
    }

    fn resize(&self, img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        img.resize_exact(width, height, self.filter)
    }

    fn encode(&self, img: &DynamicImage, quality: u8) -> QRResult<Vec<u8>> {
        let mut buf = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
        img.write_with_encoder(encoder)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod backend_tests {
    use image::{DynamicImage, GrayAlphaImage, LumaA, Rgba, RgbaImage};

    use super::{ImageBackend, ImageCrateBackend};
    use crate::{PayloadFormat, QRError};

    #[test]
    fn test_prepare_flattens_alpha() {
        let rgba = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 128]));
        let img = ImageCrateBackend::prepare(DynamicImage::ImageRgba8(rgba));
        assert!(matches!(img, DynamicImage::ImageRgb8(_)));

        let la = GrayAlphaImage::from_pixel(4, 4, LumaA([10, 128]));
        let img = ImageCrateBackend::prepare(DynamicImage::ImageLumaA8(la));
        assert!(matches!(img, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn test_encode_is_jpeg() {
        let backend = ImageCrateBackend::default();
        let rgba = RgbaImage::from_fn(32, 16, |x, y| Rgba([(x * 8) as u8, (y * 16) as u8, 0, 255]));
        let img = ImageCrateBackend::prepare(DynamicImage::ImageRgba8(rgba));

        let data = backend.encode(&img, 50).unwrap();
        assert_eq!(PayloadFormat::sniff(&data), Some(PayloadFormat::Jpeg));

        let small = backend.resize(&img, 8, 4);
        assert_eq!(backend.dimensions(&small), (8, 4));
    }

    #[test]
    fn test_load_garbage() {
        let backend = ImageCrateBackend::default();
        let res = backend.load(b"definitely not an image");
        assert!(matches!(res, Err(QRError::ImageDecodeFailure(_))));
    }
}
