//! Colour generation.
//!
//! The sixteen VIC-II colours are produced from per-model luma levels and
//! fixed chroma angles in the YUV plane, then converted to ARGB32. Luma
//! tables for the NMOS chips are VICE measurements; the HMOS chips use
//! Pepto's Colodore levels. PAL output is gamma corrected from 2.8 to 2.2.

use crate::config::ChipModel;

/// Colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaletteKind {
    #[default]
    Color,
    BlackWhite,
    PaperWhite,
    Green,
    Amber,
    Sepia,
}

impl PaletteKind {
    /// Fixed (u, v) chroma for the monochrome schemes.
    const fn monochrome_uv(self) -> Option<(f64, f64)> {
        match self {
            Self::Color => None,
            Self::BlackWhite => Some((0.0, 0.0)),
            Self::PaperWhite => Some((-8.0, 5.0)),
            Self::Green => Some((-99.0, -64.0)),
            Self::Amber => Some((-104.0, 50.0)),
            Self::Sepia => Some((-31.0, 26.0)),
        }
    }
}

const fn vice(level: u16, black: u16, white: u16) -> f64 {
    ((level - black) as f64 * 256.0) / ((white - black) as f64)
}

const fn colodore(level: u8) -> f64 {
    level as f64 * 7.968_75
}

const LUMA_6569_R1: [f64; 16] = [
    vice(630, 630, 1850),
    vice(1850, 630, 1850),
    vice(900, 630, 1850),
    vice(1560, 630, 1850),
    vice(1260, 630, 1850),
    vice(1260, 630, 1850),
    vice(900, 630, 1850),
    vice(1560, 630, 1850),
    vice(1260, 630, 1850),
    vice(900, 630, 1850),
    vice(1260, 630, 1850),
    vice(900, 630, 1850),
    vice(1260, 630, 1850),
    vice(1560, 630, 1850),
    vice(1260, 630, 1850),
    vice(1560, 630, 1850),
];

const LUMA_6569_R3: [f64; 16] = [
    vice(700, 700, 1850),
    vice(1850, 700, 1850),
    vice(1090, 700, 1850),
    vice(1480, 700, 1850),
    vice(1180, 700, 1850),
    vice(1340, 700, 1850),
    vice(1020, 700, 1850),
    vice(1620, 700, 1850),
    vice(1180, 700, 1850),
    vice(1020, 700, 1850),
    vice(1340, 700, 1850),
    vice(1090, 700, 1850),
    vice(1300, 700, 1850),
    vice(1620, 700, 1850),
    vice(1300, 700, 1850),
    vice(1480, 700, 1850),
];

const LUMA_6567: [f64; 16] = [
    vice(590, 590, 1825),
    vice(1825, 590, 1825),
    vice(950, 590, 1825),
    vice(1380, 590, 1825),
    vice(1030, 590, 1825),
    vice(1210, 590, 1825),
    vice(860, 590, 1825),
    vice(1560, 590, 1825),
    vice(1030, 590, 1825),
    vice(860, 590, 1825),
    vice(1210, 590, 1825),
    vice(950, 590, 1825),
    vice(1160, 590, 1825),
    vice(1560, 590, 1825),
    vice(1160, 590, 1825),
    vice(1380, 590, 1825),
];

const LUMA_6567_R56A: [f64; 16] = [
    vice(560, 560, 1825),
    vice(1825, 560, 1825),
    vice(840, 560, 1825),
    vice(1500, 560, 1825),
    vice(1180, 560, 1825),
    vice(1180, 560, 1825),
    vice(840, 560, 1825),
    vice(1500, 560, 1825),
    vice(1180, 560, 1825),
    vice(840, 560, 1825),
    vice(1180, 560, 1825),
    vice(840, 560, 1825),
    vice(1180, 560, 1825),
    vice(1500, 560, 1825),
    vice(1180, 560, 1825),
    vice(1500, 560, 1825),
];

const LUMA_HMOS: [f64; 16] = [
    colodore(0),
    colodore(32),
    colodore(10),
    colodore(20),
    colodore(12),
    colodore(16),
    colodore(8),
    colodore(24),
    colodore(12),
    colodore(8),
    colodore(16),
    colodore(10),
    colodore(15),
    colodore(24),
    colodore(15),
    colodore(20),
];

/// Chroma angle step (in 22.5 degree units) per colour; `None` for grays.
const ANGLES: [Option<u8>; 16] = [
    None,
    None,
    Some(4),
    Some(12),
    Some(2),
    Some(10),
    Some(15),
    Some(7),
    Some(5),
    Some(6),
    Some(4),
    None,
    None,
    Some(10),
    Some(15),
    None,
];

const fn luma_table(model: ChipModel) -> &'static [f64; 16] {
    match model {
        ChipModel::Pal6569R1 => &LUMA_6569_R1,
        ChipModel::Pal6569R3 => &LUMA_6569_R3,
        ChipModel::Ntsc6567 => &LUMA_6567,
        ChipModel::Ntsc6567R56A => &LUMA_6567_R56A,
        ChipModel::Pal8565 | ChipModel::Ntsc8562 => &LUMA_HMOS,
    }
}

fn gamma_correct(value: f64, source: f64, target: f64) -> f64 {
    let linear = (255f64.powf(1.0 - source) * value.powf(source)).clamp(0.0, 255.0);
    let corrected = (255f64.powf(1.0 - 1.0 / target) * linear.powf(1.0 / target)).clamp(0.0, 255.0);
    corrected.round()
}

/// ARGB32 value for colour `index` (0-15).
///
/// `brightness`, `contrast` and `saturation` are in 0..=100.
#[must_use]
pub fn color(
    model: ChipModel,
    kind: PaletteKind,
    index: u8,
    brightness: f64,
    contrast: f64,
    saturation: f64,
) -> u32 {
    let index = usize::from(index & 0x0F);
    let brightness = brightness - 50.0;
    let contrast = contrast / 100.0 + 0.2;
    let saturation = saturation / 1.25;

    let mut y = luma_table(model)[index];
    let (mut u, mut v) = match ANGLES[index] {
        Some(step) => {
            let angle = (f64::from(step) * 22.5 + 11.5).to_radians();
            (angle.cos() * saturation, angle.sin() * saturation)
        }
        None => (0.0, 0.0),
    };

    y = y * contrast + brightness;
    u *= contrast;
    v *= contrast;

    if let Some((mono_u, mono_v)) = kind.monochrome_uv() {
        u = mono_u;
        v = mono_v;
    }

    let mut r = (y + 1.140 * v).clamp(0.0, 255.0);
    let mut g = (y - 0.396 * u - 0.581 * v).clamp(0.0, 255.0);
    let mut b = (y + 2.029 * u).clamp(0.0, 255.0);

    if model.is_pal() {
        r = gamma_correct(r, 2.8, 2.2);
        g = gamma_correct(g, 2.8, 2.2);
        b = gamma_correct(b, 2.8, 2.2);
    }

    0xFF00_0000 | (u32::from(r as u8) << 16) | (u32::from(g as u8) << 8) | u32::from(b as u8)
}

/// All sixteen colours as ARGB32.
#[must_use]
pub fn palette(
    model: ChipModel,
    kind: PaletteKind,
    brightness: f64,
    contrast: f64,
    saturation: f64,
) -> [u32; 16] {
    let mut table = [0; 16];
    for (index, entry) in (0u8..).zip(table.iter_mut()) {
        *entry = color(model, kind, index, brightness, contrast, saturation);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(argb: u32) -> (u8, u8, u8) {
        ((argb >> 16) as u8, (argb >> 8) as u8, argb as u8)
    }

    fn default_palette(model: ChipModel, kind: PaletteKind) -> [u32; 16] {
        palette(model, kind, 50.0, 100.0, 50.0)
    }

    #[test]
    fn black_and_white_are_extremes() {
        for model in ChipModel::ALL {
            let table = default_palette(model, PaletteKind::Color);
            let (r, g, b) = rgb(table[0]);
            assert!(r < 0x10 && g < 0x10 && b < 0x10, "{model}: black is dark");
            let (r, g, b) = rgb(table[1]);
            assert!(r > 0xF0 && g > 0xF0 && b > 0xF0, "{model}: white is bright");
        }
    }

    #[test]
    fn alpha_channel_is_opaque() {
        for argb in default_palette(ChipModel::Ntsc8562, PaletteKind::Sepia) {
            assert_eq!(argb >> 24, 0xFF);
        }
    }

    #[test]
    fn grays_have_no_chroma() {
        let table = default_palette(ChipModel::Ntsc6567, PaletteKind::Color);
        for index in [0usize, 1, 11, 12, 15] {
            let (r, g, b) = rgb(table[index]);
            assert_eq!(r, g, "colour {index}");
            assert_eq!(g, b, "colour {index}");
        }
    }

    #[test]
    fn red_leans_red() {
        let (r, g, b) = rgb(default_palette(ChipModel::Pal6569R3, PaletteKind::Color)[2]);
        assert!(r > g && r > b, "red is ({r}, {g}, {b})");
    }

    #[test]
    fn black_white_palette_is_gray() {
        for argb in default_palette(ChipModel::Pal8565, PaletteKind::BlackWhite) {
            let (r, g, b) = rgb(argb);
            assert_eq!(r, g);
            assert_eq!(g, b);
        }
    }

    #[test]
    fn brightness_raises_every_colour() {
        let normal = palette(ChipModel::Ntsc6567, PaletteKind::BlackWhite, 50.0, 100.0, 50.0);
        let bright = palette(ChipModel::Ntsc6567, PaletteKind::BlackWhite, 80.0, 100.0, 50.0);
        for (n, b) in normal.iter().zip(bright.iter()) {
            assert!(rgb(*b).0 >= rgb(*n).0);
        }
    }
}
