use std::fmt::{Display, Formatter};

use image::ImageFormat;

// Payload format
//------------------------------------------------------------------------------

/// Image formats recognised inside a symbol payload.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum PayloadFormat {
    Png,
    Bmp,
    Jpeg,
}

impl PayloadFormat {
    pub const ALL: [PayloadFormat; 3] = [Self::Png, Self::Bmp, Self::Jpeg];

    pub fn name(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Jpeg => "jpeg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Bmp => "image/bmp",
            Self::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Jpeg => "jpg",
        }
    }

    /// Leading bytes every stream of this format starts with.
    pub fn signature(self) -> &'static [u8] {
        match self {
            Self::Png => b"\x89PNG\r\n\x1a\n",
            Self::Bmp => b"BM",
            Self::Jpeg => b"\xff\xd8\xff",
        }
    }

    /// Identifies the format of `data` from its leading bytes alone.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|f| data.starts_with(f.signature()))
    }
}

impl Display for PayloadFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<PayloadFormat> for ImageFormat {
    fn from(fmt: PayloadFormat) -> Self {
        match fmt {
            PayloadFormat::Png => ImageFormat::Png,
            PayloadFormat::Bmp => ImageFormat::Bmp,
            PayloadFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}
