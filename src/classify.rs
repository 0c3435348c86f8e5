use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use encoding_rs::UTF_8;
use tracing::debug;

use crate::common::{from_text, sanitize, to_text, PayloadFormat};

// Decoded result
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// Text left after sanitizing is not valid base64.
    DecodeError(String),
    /// Payload decoded, but is not a recognised image.
    UnrecognizedContent,
}

impl Display for MalformedReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DecodeError(e) => write!(f, "decode error: {e}"),
            Self::UnrecognizedContent => f.write_str("decoded data is not a recognized image"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedResult {
    ImagePayload { data: Vec<u8>, format: PayloadFormat },
    TextPayload(String),
    Empty,
    MalformedPayload(MalformedReason),
}

impl DecodedResult {
    pub fn is_image(&self) -> bool {
        matches!(self, Self::ImagePayload { .. })
    }

    /// Inline `data:` URI for image payloads.
    pub fn data_uri(&self) -> Option<String> {
        match self {
            Self::ImagePayload { data, format } => {
                Some(format!("data:{};base64,{}", format.mime_type(), to_text(data)))
            }
            _ => None,
        }
    }

    /// Text to show a user for this result.
    pub fn message(&self) -> String {
        match self {
            Self::ImagePayload { data, format } => {
                format!("Recovered {} image ({} bytes).", format.name().to_uppercase(), data.len())
            }
            Self::TextPayload(s) => s.clone(),
            Self::Empty => "QR code is empty.".to_string(),
            Self::MalformedPayload(reason) => format!("Malformed payload: {reason}."),
        }
    }
}

// Classifiers
//------------------------------------------------------------------------------

pub trait ContentClassifier {
    /// Classifies a raw symbol payload. Never fails.
    fn classify(&self, raw: &[u8]) -> DecodedResult;
}

/// Treats the payload as the content itself: a known image signature makes
/// it an image, anything else is text.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectSignature;

impl ContentClassifier for DirectSignature {
    fn classify(&self, raw: &[u8]) -> DecodedResult {
        if raw.is_empty() {
            return DecodedResult::Empty;
        }
        match PayloadFormat::sniff(raw) {
            Some(format) => DecodedResult::ImagePayload { data: raw.to_vec(), format },
            None => DecodedResult::TextPayload(lossy_utf8(raw).into_owned()),
        }
    }
}

/// Treats the payload as base64 text wrapping an image.
#[derive(Debug, Default, Clone, Copy)]
pub struct Base64Wrapped;

impl ContentClassifier for Base64Wrapped {
    fn classify(&self, raw: &[u8]) -> DecodedResult {
        let text = lossy_utf8(raw);
        let clean = sanitize(&text);
        if clean.is_empty() {
            return DecodedResult::Empty;
        }
        if clean.len() != text.len() {
            debug!("Sanitizing dropped {} characters", text.len() - clean.len());
        }

        let data = match from_text(&clean) {
            Ok(data) => data,
            Err(e) => {
                return DecodedResult::MalformedPayload(MalformedReason::DecodeError(e.to_string()))
            }
        };
        match PayloadFormat::sniff(&data) {
            Some(format) => DecodedResult::ImagePayload { data, format },
            None => DecodedResult::MalformedPayload(MalformedReason::UnrecognizedContent),
        }
    }
}

fn lossy_utf8(raw: &[u8]) -> Cow<'_, str> {
    let (text, had_errors) = UTF_8.decode_without_bom_handling(raw);
    if had_errors {
        debug!("Payload is not valid UTF-8, invalid sequences replaced");
    }
    text
}

// Decode mode
//------------------------------------------------------------------------------

/// Selects the classifier for a decode.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum DecodeMode {
    Direct,
    #[default]
    Base64,
}

impl ContentClassifier for DecodeMode {
    fn classify(&self, raw: &[u8]) -> DecodedResult {
        match self {
            Self::Direct => DirectSignature.classify(raw),
            Self::Base64 => Base64Wrapped.classify(raw),
        }
    }
}
