//! # imgqr
//!
//! Embeds a raster image inside a single QR code, and recovers images or text from
//! scanned QR codes.
//!
//! ## Features
//!
//! - **Adaptive Compression**: Re-encodes an image as JPEG, lowering quality and then resolution
//!   until it fits a byte budget
//! - **Text Safe Payloads**: Wraps compressed bytes in standard base64 and tolerates stray
//!   characters when unwrapping
//! - **Symbol Generation**: Version 40 symbols at error correction level L by default, the
//!   largest byte capacity a single QR code offers
//! - **Symbol Reading**: Locates and decodes one QR code per image
//! - **Content Classification**: Sniffs PNG, BMP and JPEG signatures, falling back to text
//!
//! ## Quick Start
//!
//! ### Embedding an Image
//!
//! ```rust,no_run
//! use imgqr::{encode, EncodeConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let photo = std::fs::read("photo.png")?;
//! let out = encode(&photo, &EncodeConfig::default())?;
//!
//! println!("{}", out.message());
//! std::fs::write("photo_qr.png", &out.symbol_png)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading a QR Code
//!
//! ```rust,no_run
//! use imgqr::{decode, DecodeMode, DecodedResult};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let scan = std::fs::read("scan.jpg")?;
//! match decode(&scan, DecodeMode::Base64)? {
//!     DecodedResult::ImagePayload { data, format } => {
//!         std::fs::write(format!("recovered.{}", format.extension()), data)?
//!     }
//!     other => println!("{}", other.message()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Building a Symbol by Hand
//!
//! ```rust
//! use imgqr::{ECLevel, SymbolBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let symbol = SymbolBuilder::new(b"Hello, World!").version(2).ec_level(ECLevel::M).build()?;
//!
//! let img = symbol.render(4); // 4px per module
//! assert_eq!(img.width(), (25 + 8) * 4);
//! # Ok(())
//! # }
//! ```
//!
//! ## Decode Modes
//!
//! - **Direct**: The payload itself is the content. Known image signatures give an image,
//!   anything else is read as UTF-8 text
//! - **Base64**: The payload is base64 text wrapping an image, as produced by [`encode`]

pub mod builder;
pub mod classify;
pub(crate) mod common;
pub mod compress;
pub mod pipeline;
pub mod reader;

pub use builder::{capacity, generate, ECLevel, Symbol, SymbolBuilder, MAX_MODULE_SIZE};
pub use classify::{
    Base64Wrapped, ContentClassifier, DecodeMode, DecodedResult, DirectSignature, MalformedReason,
};
pub use common::*;
pub use compress::{
    compress, CompressedArtifact, CompressionStep, CompressorConfig, ImageBackend,
    ImageCrateBackend, DEFAULT_TARGET_CAPACITY,
};
pub use pipeline::{decode, decode_image, encode, encode_image, EncodeConfig, EncodeOutcome};
pub use reader::{Preparation, SymbolReader};
