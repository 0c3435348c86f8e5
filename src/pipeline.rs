use image::DynamicImage;
use tracing::{debug, info};

use crate::{
    builder::{ECLevel, Symbol, SymbolBuilder, MAX_VERSION},
    classify::{ContentClassifier, DecodeMode, DecodedResult},
    common::{to_text, PayloadFormat, QRError, QRResult},
    compress::{compress, CompressorConfig, ImageBackend, ImageCrateBackend},
    reader::SymbolReader,
};

/// Pixels per module of the rendered symbol.
pub const DEFAULT_MODULE_SIZE: u32 = 10;

// Encode config
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeConfig {
    pub compressor: CompressorConfig,
    pub version: i16,
    pub ec_level: ECLevel,
    pub module_size: u32,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            compressor: CompressorConfig::default(),
            version: MAX_VERSION,
            ec_level: ECLevel::L,
            module_size: DEFAULT_MODULE_SIZE,
        }
    }
}

impl EncodeConfig {
    pub fn compressor(mut self, compressor: CompressorConfig) -> Self {
        self.compressor = compressor;
        self
    }

    pub fn version(mut self, version: i16) -> Self {
        self.version = version;
        self
    }

    pub fn ec_level(mut self, ec_level: ECLevel) -> Self {
        self.ec_level = ec_level;
        self
    }

    pub fn module_size(mut self, px: u32) -> Self {
        self.module_size = px;
        self
    }
}

// Encode
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EncodeOutcome {
    pub symbol: Symbol,
    pub symbol_png: Vec<u8>,
    pub compressed_size: usize,
    pub format: PayloadFormat,
    pub quality: u8,
    pub width: u32,
    pub height: u32,
}

impl EncodeOutcome {
    pub fn format_name(&self) -> &'static str {
        self.format.name()
    }

    /// Inline `data:` URI of the symbol PNG.
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", to_text(&self.symbol_png))
    }

    pub fn message(&self) -> String {
        format!(
            "Image compressed to {} bytes ({}, {}x{}, quality {}) and embedded in QR code.",
            self.compressed_size,
            self.format_name().to_uppercase(),
            self.width,
            self.height,
            self.quality
        )
    }
}

/// Loads an encoded image and embeds it in a symbol.
pub fn encode(data: &[u8], cfg: &EncodeConfig) -> QRResult<EncodeOutcome> {
    let backend = ImageCrateBackend::default();
    let img = backend.load(data)?;
    encode_with(&backend, &img, cfg)
}

/// Embeds an already decoded image in a symbol.
pub fn encode_image(img: DynamicImage, cfg: &EncodeConfig) -> QRResult<EncodeOutcome> {
    let img = ImageCrateBackend::prepare(img);
    encode_with(&ImageCrateBackend::default(), &img, cfg)
}

fn encode_with(
    backend: &ImageCrateBackend,
    img: &DynamicImage,
    cfg: &EncodeConfig,
) -> QRResult<EncodeOutcome> {
    let art = compress(backend, img, &cfg.compressor)?;
    info!("Compressed to {} bytes in {} steps", art.len(), art.steps.len());

    let txt = to_text(&art.data);
    debug!("Base64 payload is {} characters", txt.len());
    let symbol =
        SymbolBuilder::new(txt.as_bytes()).version(cfg.version).ec_level(cfg.ec_level).build()?;
    let symbol_png = symbol.to_png(cfg.module_size)?;

    Ok(EncodeOutcome {
        symbol,
        symbol_png,
        compressed_size: art.len(),
        format: art.format,
        quality: art.quality,
        width: art.width,
        height: art.height,
    })
}

// Decode
//------------------------------------------------------------------------------

/// Loads a scanned image, reads one symbol and classifies its payload.
pub fn decode(data: &[u8], mode: DecodeMode) -> QRResult<DecodedResult> {
    classify_read(SymbolReader::read_bytes(data)?, mode)
}

pub fn decode_image(img: &DynamicImage, mode: DecodeMode) -> QRResult<DecodedResult> {
    classify_read(SymbolReader::read(img), mode)
}

fn classify_read(raw: Option<Vec<u8>>, mode: DecodeMode) -> QRResult<DecodedResult> {
    let raw = raw.ok_or(QRError::SymbolNotFound)?;
    debug!("Read {} payload bytes, classifying as {mode:?}", raw.len());
    Ok(mode.classify(&raw))
}
