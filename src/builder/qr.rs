use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::Color;

use super::ECLevel;
use crate::{QRError, QRResult};

/// Quiet zone around a rendered symbol, in modules.
pub const QUIET_ZONE: u32 = 4;

/// Largest pixels-per-module accepted when rendering.
pub const MAX_MODULE_SIZE: u32 = 64;

// Symbol
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    grid: Vec<Color>,
    w: usize,
    ver: i16,
    ecl: ECLevel,
    data_len: usize,
    capacity: usize,
}

impl Symbol {
    pub(crate) fn new(
        grid: Vec<Color>,
        w: usize,
        ver: i16,
        ecl: ECLevel,
        data_len: usize,
        capacity: usize,
    ) -> Self {
        debug_assert!(grid.len() == w * w, "Grid of {} modules is not {w}x{w}", grid.len());
        Self { grid, w, ver, ecl, data_len, capacity }
    }

    pub fn grid(&self) -> &[Color] {
        &self.grid
    }

    /// Width in modules.
    pub fn width(&self) -> usize {
        self.w
    }

    pub fn version(&self) -> i16 {
        self.ver
    }

    pub fn ec_level(&self) -> ECLevel {
        self.ecl
    }

    /// Length of the byte payload carried by the symbol.
    pub fn data_len(&self) -> usize {
        self.data_len
    }

    /// Byte payload capacity of the symbol's version and EC level.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn metadata(&self) -> String {
        format!(
            "{{ Version: {}, Ec level: {:?}, Data: {}/{} }}",
            self.ver, self.ecl, self.data_len, self.capacity
        )
    }

    pub fn count_dark_modules(&self) -> usize {
        self.grid.iter().filter(|&&c| c == Color::Dark).count()
    }

    pub fn get(&self, r: usize, c: usize) -> Color {
        debug_assert!(r < self.w && c < self.w, "Module ({r}, {c}) out of bounds");
        self.grid[r * self.w + c]
    }
}

// Render
//------------------------------------------------------------------------------

impl Symbol {
    /// Renders black modules on white, `module_sz` pixels per module, with a
    /// quiet zone of [`QUIET_ZONE`] modules. `module_sz` is clamped to
    /// `1..=MAX_MODULE_SIZE`.
    pub fn render(&self, module_sz: u32) -> GrayImage {
        let module_sz = module_sz.clamp(1, MAX_MODULE_SIZE);
        let qz_sz = QUIET_ZONE * module_sz;
        let qr_sz = self.w as u32 * module_sz;
        let total_sz = qz_sz + qr_sz + qz_sz;

        GrayImage::from_fn(total_sz, total_sz, |x, y| {
            if x < qz_sz || x >= qz_sz + qr_sz || y < qz_sz || y >= qz_sz + qr_sz {
                return Luma([255]);
            }
            let r = ((y - qz_sz) / module_sz) as usize;
            let c = ((x - qz_sz) / module_sz) as usize;
            Luma([self.get(r, c).select(0, 255)])
        })
    }

    pub fn to_png(&self, module_sz: u32) -> QRResult<Vec<u8>> {
        if module_sz > MAX_MODULE_SIZE {
            return Err(QRError::SymbolEncodeFailure(format!(
                "Module size {module_sz}px exceeds {MAX_MODULE_SIZE}px"
            )));
        }
        let img = DynamicImage::ImageLuma8(self.render(module_sz));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(buf)
    }

    /// Text rendering, two characters per module so the output stays square
    /// in a terminal.
    pub fn to_str(&self) -> String {
        let qz = QUIET_ZONE as usize;
        let total_sz = qz + self.w + qz;

        let mut canvas = String::with_capacity(total_sz * (total_sz * 2 + 1));
        for i in 0..total_sz {
            for j in 0..total_sz {
                let inside = (qz..qz + self.w).contains(&i) && (qz..qz + self.w).contains(&j);
                let clr = if inside { self.get(i - qz, j - qz) } else { Color::Light };
                canvas.push_str(clr.select("  ", "██"));
            }
            canvas.push('\n');
        }
        canvas
    }
}
