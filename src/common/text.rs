use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use base64::{engine::general_purpose::STANDARD, DecodeError, Engine};

// Text safe payload
//------------------------------------------------------------------------------

/// Base64 text carried by a symbol. Every character belongs to the standard
/// alphabet `A-Z a-z 0-9 + /` plus `=` padding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextSafePayload(String);

impl TextSafePayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for TextSafePayload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for TextSafePayload {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// Encoding & decoding
//------------------------------------------------------------------------------

pub fn to_text(data: &[u8]) -> TextSafePayload {
    TextSafePayload(STANDARD.encode(data))
}

pub fn is_alphabet(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}

/// Drops every character outside the base64 alphabet. Lossy, never fails.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_alphabet) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| is_alphabet(c)).collect())
    }
}

/// Sanitizes `text` and decodes it. Only malformed base64 left after
/// sanitizing, such as a wrong padding length, is reported as an error.
pub fn from_text(text: &str) -> Result<Vec<u8>, DecodeError> {
    let clean = sanitize(text);
    STANDARD.decode(clean.as_bytes())
}
