mod backend;

pub use backend::{ImageBackend, ImageCrateBackend};

use tracing::debug;

use crate::{PayloadFormat, QRError, QRResult};

/// Largest compressed size whose base64 text still fits a version 40 symbol
/// at EC level L in byte mode (2952 of 2953 bytes).
pub const DEFAULT_TARGET_CAPACITY: usize = 2214;

// Compressor config
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorConfig {
    pub target_capacity: usize,
    pub start_quality: u8,
    pub quality_step: u8,
    pub min_quality: u8,
    pub scale_ratio: f32,
    pub min_dimension: u32,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            target_capacity: DEFAULT_TARGET_CAPACITY,
            start_quality: 85,
            quality_step: 10,
            min_quality: 10,
            scale_ratio: 0.8,
            min_dimension: 1,
        }
    }
}

impl CompressorConfig {
    pub fn new(target_capacity: usize) -> Self {
        Self { target_capacity, ..Self::default() }
    }

    pub fn target_capacity(mut self, target_capacity: usize) -> Self {
        self.target_capacity = target_capacity;
        self
    }

    pub fn start_quality(mut self, quality: u8) -> Self {
        self.start_quality = quality;
        self
    }

    pub fn quality_step(mut self, step: u8) -> Self {
        self.quality_step = step;
        self
    }

    pub fn min_quality(mut self, quality: u8) -> Self {
        self.min_quality = quality;
        self
    }

    pub fn scale_ratio(mut self, ratio: f32) -> Self {
        self.scale_ratio = ratio;
        self
    }

    pub fn min_dimension(mut self, px: u32) -> Self {
        self.min_dimension = px;
        self
    }

    fn scaled(&self, w: u32, h: u32) -> (u32, u32) {
        let scale = |d: u32| (d as f32 * self.scale_ratio) as u32;
        (scale(w), scale(h))
    }
}

// Compressed artifact
//------------------------------------------------------------------------------

/// One encode attempt of the compression loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionStep {
    pub quality: u8,
    pub width: u32,
    pub height: u32,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedArtifact {
    pub data: Vec<u8>,
    pub format: PayloadFormat,
    pub quality: u8,
    pub width: u32,
    pub height: u32,
    pub steps: Vec<CompressionStep>,
}

impl CompressedArtifact {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

// Adaptive compression
//------------------------------------------------------------------------------

/// Re-encodes `img` until the output fits `cfg.target_capacity`.
///
/// Quality drops by `quality_step` down to `min_quality` first. If that is not
/// enough, the image is repeatedly downscaled by `scale_ratio` and encoded at
/// the floor quality. Fails with [`QRError::CompressionUnsatisfiable`] once a
/// downscale would go below `min_dimension` or stop shrinking the image.
pub fn compress<B: ImageBackend>(
    backend: &B,
    img: &B::Image,
    cfg: &CompressorConfig,
) -> QRResult<CompressedArtifact> {
    let target = cfg.target_capacity;
    let (mut w, mut h) = backend.dimensions(img);
    if w == 0 || h == 0 {
        return Err(QRError::CompressionUnsatisfiable { target, size: 0, width: w, height: h });
    }

    let floor = cfg.min_quality.clamp(1, 100);
    let step = cfg.quality_step.max(1);
    let min_dim = cfg.min_dimension.max(1);
    let mut quality = cfg.start_quality.clamp(floor, 100);
    let mut steps = Vec::new();

    debug!("Compressing {w}x{h} image to at most {target} bytes...");

    let mut data = backend.encode(img, quality)?;
    steps.push(CompressionStep { quality, width: w, height: h, size: data.len() });

    while data.len() > target && quality > floor {
        quality = quality.saturating_sub(step).max(floor);
        data = backend.encode(img, quality)?;
        debug!("Quality {quality}: {} bytes", data.len());
        steps.push(CompressionStep { quality, width: w, height: h, size: data.len() });
    }

    let mut resized: Option<B::Image> = None;
    while data.len() > target {
        let (nw, nh) = cfg.scaled(w, h);
        if nw < min_dim || nh < min_dim || (nw >= w && nh >= h) {
            debug!("Cannot downscale {w}x{h} any further");
            return Err(QRError::CompressionUnsatisfiable {
                target,
                size: data.len(),
                width: w,
                height: h,
            });
        }

        let next = backend.resize(resized.as_ref().unwrap_or(img), nw, nh);
        data = backend.encode(&next, quality)?;
        resized = Some(next);
        (w, h) = (nw, nh);
        debug!("Resized to {w}x{h}: {} bytes", data.len());
        steps.push(CompressionStep { quality, width: w, height: h, size: data.len() });
    }

    Ok(CompressedArtifact { data, format: B::FORMAT, quality, width: w, height: h, steps })
}

#[cfg(test)]
mod compress_tests {
    use image::{DynamicImage, RgbImage};

    use super::{compress, CompressorConfig, ImageBackend, ImageCrateBackend};
    use crate::{PayloadFormat, QRError, QRResult};

    /// Size model: `header + w * h * bytes_per_px * quality / 100`.
    pub struct FakeBackend {
        pub header: usize,
        pub bytes_per_px: f64,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FakeImage {
        pub w: u32,
        pub h: u32,
    }

    impl ImageBackend for FakeBackend {
        type Image = FakeImage;

        const FORMAT: PayloadFormat = PayloadFormat::Jpeg;

        fn load(&self, _data: &[u8]) -> QRResult<FakeImage> {
            Err(QRError::ImageDecodeFailure("fake backend".to_string()))
        }

        fn dimensions(&self, img: &FakeImage) -> (u32, u32) {
            (img.w, img.h)
        }

        fn resize(&self, _img: &FakeImage, w: u32, h: u32) -> FakeImage {
            FakeImage { w, h }
        }

        fn encode(&self, img: &FakeImage, quality: u8) -> QRResult<Vec<u8>> {
            let px = (img.w as f64) * (img.h as f64);
            let body = px * self.bytes_per_px * quality as f64 / 100.0;
            Ok(vec![0; self.header + body as usize])
        }
    }

    fn sizes_non_increasing(steps: &[super::CompressionStep]) -> bool {
        steps.windows(2).all(|w| w[1].size <= w[0].size)
    }

    #[test]
    fn test_fits_at_start_quality() {
        let backend = FakeBackend { header: 0, bytes_per_px: 1.0 };
        let img = FakeImage { w: 10, h: 10 };
        let art = compress(&backend, &img, &CompressorConfig::new(100)).unwrap();
        assert_eq!(art.quality, 85);
        assert_eq!(art.steps.len(), 1);
        assert_eq!(art.len(), 85);
        assert_eq!(art.format, PayloadFormat::Jpeg);
    }

    #[test]
    fn test_quality_phase() {
        let backend = FakeBackend { header: 0, bytes_per_px: 1.0 };
        let img = FakeImage { w: 100, h: 10 };
        let art = compress(&backend, &img, &CompressorConfig::new(500)).unwrap();

        let qualities: Vec<_> = art.steps.iter().map(|s| s.quality).collect();
        assert_eq!(qualities, [85, 75, 65, 55, 45]);
        assert_eq!((art.width, art.height), (100, 10));
        assert_eq!(art.len(), 450);
    }

    #[test]
    fn test_quality_clamped_to_floor() {
        let backend = FakeBackend { header: 0, bytes_per_px: 1.0 };
        let img = FakeImage { w: 100, h: 10 };
        let cfg = CompressorConfig::new(120).quality_step(30);
        let art = compress(&backend, &img, &cfg).unwrap();

        let qualities: Vec<_> = art.steps.iter().map(|s| s.quality).collect();
        assert_eq!(qualities, [85, 55, 25, 10]);
        assert_eq!(art.len(), 100);
    }

    #[test]
    fn test_resolution_phase() {
        let backend = FakeBackend { header: 20, bytes_per_px: 1.0 };
        let img = FakeImage { w: 1000, h: 500 };
        let cfg = CompressorConfig::new(2220);
        let art = compress(&backend, &img, &cfg).unwrap();

        assert!(art.len() <= 2220);
        assert_eq!(art.quality, 10);
        assert!(art.width < 1000 && art.height < 500);
        assert!(sizes_non_increasing(&art.steps));

        let first_resize = art.steps.iter().find(|s| s.width != 1000).unwrap();
        assert_eq!((first_resize.width, first_resize.height), (800, 400));
    }

    #[test]
    fn test_unsatisfiable_when_too_small() {
        let backend = FakeBackend { header: 200, bytes_per_px: 1.0 };
        let img = FakeImage { w: 64, h: 64 };
        let res = compress(&backend, &img, &CompressorConfig::new(100));
        match res {
            Err(QRError::CompressionUnsatisfiable { target, width, height, .. }) => {
                assert_eq!(target, 100);
                assert_eq!((width, height), (1, 1));
            }
            other => panic!("Expected unsatisfiable, got {other:?}"),
        }
    }

    #[test]
    fn test_unsatisfiable_respects_min_dimension() {
        let backend = FakeBackend { header: 200, bytes_per_px: 1.0 };
        let img = FakeImage { w: 100, h: 100 };
        let cfg = CompressorConfig::new(100).min_dimension(50);
        let res = compress(&backend, &img, &cfg);
        assert!(matches!(
            res,
            Err(QRError::CompressionUnsatisfiable { width: 51, height: 51, .. })
        ));
    }

    #[test]
    fn test_unsatisfiable_when_not_shrinking() {
        let backend = FakeBackend { header: 0, bytes_per_px: 1.0 };
        let img = FakeImage { w: 100, h: 100 };
        let cfg = CompressorConfig::new(10).scale_ratio(1.0);
        let res = compress(&backend, &img, &cfg);
        assert!(matches!(res, Err(QRError::CompressionUnsatisfiable { width: 100, .. })));
    }

    #[test]
    fn test_zero_sized_image() {
        let backend = FakeBackend { header: 0, bytes_per_px: 1.0 };
        let img = FakeImage { w: 0, h: 10 };
        let res = compress(&backend, &img, &CompressorConfig::default());
        assert!(matches!(res, Err(QRError::CompressionUnsatisfiable { size: 0, .. })));
    }

    #[test]
    fn test_zero_step_still_progresses() {
        let backend = FakeBackend { header: 0, bytes_per_px: 1.0 };
        let img = FakeImage { w: 10, h: 10 };
        let cfg = CompressorConfig::new(80).quality_step(0);
        let art = compress(&backend, &img, &cfg).unwrap();
        assert_eq!(art.quality, 80);
        assert_eq!(art.steps.len(), 6);
    }

    #[test]
    fn test_real_backend_gradient() {
        let backend = ImageCrateBackend::default();
        let rgb = RgbImage::from_fn(96, 64, |x, y| image::Rgb([(x * 2) as u8, (y * 3) as u8, 128]));
        let img = DynamicImage::ImageRgb8(rgb);
        let art = compress(&backend, &img, &CompressorConfig::new(1000)).unwrap();

        assert!(art.len() <= 1000);
        assert_eq!(PayloadFormat::sniff(&art.data), Some(PayloadFormat::Jpeg));
        assert_eq!((img.width(), img.height()), (96, 64));
    }

    mod compress_proptests {
        use proptest::prelude::*;

        use super::{compress, sizes_non_increasing, CompressorConfig, FakeBackend, FakeImage};
        use crate::QRError;

        proptest! {
            #[test]
            fn proptest_converges_square(
                side in 1u32..3000,
                target in 100usize..5000,
                bytes_per_px in 0.01f64..4.0,
            ) {
                let backend = FakeBackend { header: 60, bytes_per_px };
                let img = FakeImage { w: side, h: side };
                let art = compress(&backend, &img, &CompressorConfig::new(target)).unwrap();
                prop_assert!(art.len() <= target);
                prop_assert!(sizes_non_increasing(&art.steps));
                // 9 quality steps, then at most 36 downscales from 3000px to 1px
                prop_assert!(art.steps.len() <= 9 + 36);
            }

            #[test]
            fn proptest_any_aspect_terminates(
                w in 1u32..3000,
                h in 1u32..3000,
                target in 100usize..5000,
            ) {
                let backend = FakeBackend { header: 60, bytes_per_px: 1.0 };
                let img = FakeImage { w, h };
                match compress(&backend, &img, &CompressorConfig::new(target)) {
                    Ok(art) => {
                        prop_assert!(art.len() <= target);
                        prop_assert!(sizes_non_increasing(&art.steps));
                    }
                    Err(e) => {
                        let unsatisfiable = matches!(e, QRError::CompressionUnsatisfiable { .. });
                        prop_assert!(unsatisfiable);
                    }
                }
            }

            #[test]
            fn proptest_terminates_when_unreachable(w in 1u32..3000, h in 1u32..3000) {
                let backend = FakeBackend { header: 500, bytes_per_px: 1.0 };
                let img = FakeImage { w, h };
                let res = compress(&backend, &img, &CompressorConfig::new(100));
                let is_unsatisfiable = matches!(res, Err(QRError::CompressionUnsatisfiable { .. }));
                prop_assert!(is_unsatisfiable);
            }
        }
    }
}
