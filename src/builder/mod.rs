mod qr;

pub use qr::{Symbol, MAX_MODULE_SIZE, QUIET_ZONE};

use std::fmt::{Display, Formatter};

use qrcode::{
    bits::Bits,
    types::{Mode, QrError},
    EcLevel, QrCode, Version,
};
use tracing::debug;

use crate::common::{QRError, QRResult, TextSafePayload};

pub const MAX_VERSION: i16 = 40;

// Error correction level
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ECLevel {
    L,
    M,
    Q,
    H,
}

impl From<ECLevel> for EcLevel {
    fn from(ecl: ECLevel) -> Self {
        match ecl {
            ECLevel::L => EcLevel::L,
            ECLevel::M => EcLevel::M,
            ECLevel::Q => EcLevel::Q,
            ECLevel::H => EcLevel::H,
        }
    }
}

impl Display for ECLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

// Capacity
//------------------------------------------------------------------------------

/// Number of bytes a single byte-mode segment can carry in a symbol of the
/// given version and error correction level.
pub fn capacity(ver: i16, ecl: ECLevel) -> QRResult<usize> {
    if !(1..=MAX_VERSION).contains(&ver) {
        return Err(QRError::InvalidVersion(ver));
    }
    let version = Version::Normal(ver);
    let data_bits =
        Bits::new(version).max_len(ecl.into()).map_err(|_| QRError::InvalidVersion(ver))?;
    let header_bits = version.mode_bits_count() + Mode::Byte.length_bits_count(version);
    Ok((data_bits - header_bits) / 8)
}

// Symbol builder
//------------------------------------------------------------------------------

/// Builds a symbol carrying `data` as one byte-mode segment. Defaults to the
/// largest version at the lowest error correction level.
pub struct SymbolBuilder<'a> {
    data: &'a [u8],
    version: i16,
    ec_level: ECLevel,
}

impl<'a> SymbolBuilder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, version: MAX_VERSION, ec_level: ECLevel::L }
    }

    pub fn data(&mut self, data: &'a [u8]) -> &mut Self {
        self.data = data;
        self
    }

    pub fn version(&mut self, version: i16) -> &mut Self {
        self.version = version;
        self
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    pub fn metadata(&self) -> String {
        format!("{{ Version: {}, Ec level: {:?} }}", self.version, self.ec_level)
    }

    pub fn build(&self) -> QRResult<Symbol> {
        let ver = self.version;
        let ecl = self.ec_level;

        debug!("Generating symbol {}...", self.metadata());
        let capacity = capacity(ver, ecl)?;
        let len = self.data.len();
        if len > capacity {
            return Err(QRError::PayloadTooLarge { len, capacity });
        }

        debug!("Encoding {len} bytes...");
        let to_err = |e: QrError| match e {
            QrError::DataTooLong => QRError::PayloadTooLarge { len, capacity },
            QrError::InvalidVersion => QRError::InvalidVersion(ver),
            e => QRError::SymbolEncodeFailure(e.to_string()),
        };
        let mut bits = Bits::new(Version::Normal(ver));
        bits.push_byte_data(self.data).map_err(to_err)?;
        bits.push_terminator(ecl.into()).map_err(to_err)?;

        debug!("Placing modules...");
        let code = QrCode::with_bits(bits, ecl.into()).map_err(to_err)?;
        let w = code.width();
        Ok(Symbol::new(code.to_colors(), w, ver, ecl, len, capacity))
    }
}

/// Wraps base64 text in a symbol of the default version and error correction
/// level.
pub fn generate(payload: &TextSafePayload) -> QRResult<Symbol> {
    SymbolBuilder::new(payload.as_bytes()).build()
}
