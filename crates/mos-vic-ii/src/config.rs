//! Chip-model selection and the injected configuration.
//!
//! The model is chosen once, before the first cycle runs. Everything that
//! differs between revisions (line geometry, clock, light-pen behaviour,
//! g-access addressing, gray dots) is answered by [`ChipModel`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::palette::PaletteKind;

/// PAL system clock in Hz.
pub const PAL_CLOCK_FREQUENCY: u32 = 985_248;

/// NTSC system clock in Hz.
pub const NTSC_CLOCK_FREQUENCY: u32 = 1_022_727;

/// Configuration errors. Raised before any cycle is executed, never mid-stream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown VIC-II model '{0}'")]
    UnknownModel(String),
    #[error("invalid VIC-II model id {0} (expected 0-5)")]
    InvalidModelId(u8),
    #[error("{name} must be within 0..=100, got {value}")]
    InvalidAdjustment { name: &'static str, value: f64 },
}

/// VIC-II revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChipModel {
    /// Early PAL chip (delayed light-pen IRQs).
    Pal6569R1,
    /// PAL 6569R3 (also stands in for R4/R5).
    #[default]
    Pal6569R3,
    /// PAL HMOS-II chip used in the C64C.
    Pal8565,
    /// Early NTSC chip, 64 cycles x 262 lines.
    Ntsc6567R56A,
    /// NTSC 6567R8, 65 cycles x 263 lines.
    Ntsc6567,
    /// NTSC HMOS-II chip used in the C64C.
    Ntsc8562,
}

impl ChipModel {
    /// Every supported revision, in numeric-id order.
    pub const ALL: [ChipModel; 6] = [
        ChipModel::Pal6569R1,
        ChipModel::Pal6569R3,
        ChipModel::Pal8565,
        ChipModel::Ntsc6567R56A,
        ChipModel::Ntsc6567,
        ChipModel::Ntsc8562,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pal6569R1 => "PAL_6569_R1",
            Self::Pal6569R3 => "PAL_6569_R3",
            Self::Pal8565 => "PAL_8565",
            Self::Ntsc6567R56A => "NTSC_6567_R56A",
            Self::Ntsc6567 => "NTSC_6567",
            Self::Ntsc8562 => "NTSC_8562",
        }
    }

    #[must_use]
    pub const fn is_pal(self) -> bool {
        matches!(self, Self::Pal6569R1 | Self::Pal6569R3 | Self::Pal8565)
    }

    #[must_use]
    pub const fn is_ntsc(self) -> bool {
        !self.is_pal()
    }

    /// HMOS-II revisions (8565, 8562).
    #[must_use]
    pub const fn is_856x(self) -> bool {
        matches!(self, Self::Pal8565 | Self::Ntsc8562)
    }

    /// NMOS revisions (6567, 6569).
    #[must_use]
    pub const fn is_656x(self) -> bool {
        !self.is_856x()
    }

    /// Colour register writes show colour 15 for one pixel.
    #[must_use]
    pub const fn has_gray_dot_bug(self) -> bool {
        self.is_856x()
    }

    /// Light-pen IRQs are only raised at the start of the next frame.
    #[must_use]
    pub const fn delayed_light_pen_irqs(self) -> bool {
        matches!(self, Self::Pal6569R1 | Self::Ntsc6567R56A)
    }

    #[must_use]
    pub const fn clock_frequency(self) -> u32 {
        if self.is_pal() {
            PAL_CLOCK_FREQUENCY
        } else {
            NTSC_CLOCK_FREQUENCY
        }
    }

    #[must_use]
    pub const fn cycles_per_line(self) -> u8 {
        match self {
            Self::Ntsc6567R56A => 64,
            Self::Ntsc6567 | Self::Ntsc8562 => 65,
            _ => 63,
        }
    }

    #[must_use]
    pub const fn lines_per_frame(self) -> u16 {
        match self {
            Self::Ntsc6567R56A => 262,
            Self::Ntsc6567 | Self::Ntsc8562 => 263,
            _ => 312,
        }
    }

    #[must_use]
    pub const fn cycles_per_frame(self) -> u32 {
        self.cycles_per_line() as u32 * self.lines_per_frame() as u32
    }

    /// Pixels per rasterline (8 per cycle).
    #[must_use]
    pub const fn pixels_per_line(self) -> u16 {
        self.cycles_per_line() as u16 * 8
    }

    /// Rasterlines outside the vertical blanking interval.
    #[must_use]
    pub const fn visible_lines(self) -> u16 {
        match self {
            Self::Ntsc6567R56A => 234,
            Self::Ntsc6567 | Self::Ntsc8562 => 235,
            _ => 284,
        }
    }

    /// Lines `< 16` and `>= 16 + visible_lines()` are blanked.
    #[must_use]
    pub const fn is_vblank_line(self, line: u16) -> bool {
        line < 16 || line >= 16 + self.visible_lines()
    }

    #[must_use]
    pub fn frames_per_second(self) -> f64 {
        f64::from(self.clock_frequency()) / f64::from(self.cycles_per_frame())
    }
}

impl fmt::Display for ChipModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for ChipModel {
    type Error = ConfigError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(id))
            .copied()
            .ok_or(ConfigError::InvalidModelId(id))
    }
}

impl FromStr for ChipModel {
    type Err = ConfigError;

    /// Accepts `PAL_6569_R3`, `pal-6569r3`, `6569R3`, `8562`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_uppercase()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect();
        let chip = normalized
            .strip_prefix("PAL")
            .or_else(|| normalized.strip_prefix("NTSC"))
            .unwrap_or(&normalized);

        match chip {
            "6569R1" => Ok(Self::Pal6569R1),
            "6569" | "6569R3" | "6569R4" | "6569R5" => Ok(Self::Pal6569R3),
            "8565" => Ok(Self::Pal8565),
            "6567R56A" => Ok(Self::Ntsc6567R56A),
            "6567" | "6567R8" => Ok(Self::Ntsc6567),
            "8562" => Ok(Self::Ntsc8562),
            _ => Err(ConfigError::UnknownModel(s.to_string())),
        }
    }
}

/// Configuration injected at construction time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VicConfig {
    /// Chip revision. Fixed for the lifetime of the chip.
    pub model: ChipModel,
    /// Emulate the gray dot bug (only has an effect on 856x chips).
    pub gray_dot_bug: bool,
    /// Sprites taking part in sprite-sprite collision detection (bit n = sprite n).
    pub sprite_sprite_collisions: u8,
    /// Sprites taking part in sprite-background collision detection.
    pub sprite_background_collisions: u8,
    /// Suppress sprite pixels in the output. Hidden sprites do not collide.
    pub hide_sprites: bool,
    /// Record every memory access for the DMA debug overlay.
    pub dma_trace: bool,
    /// Colour scheme used to turn colour indices into ARGB.
    pub palette: PaletteKind,
    /// 0..=100, 50 is neutral.
    pub brightness: f64,
    /// 0..=100.
    pub contrast: f64,
    /// 0..=100.
    pub saturation: f64,
}

impl Default for VicConfig {
    fn default() -> Self {
        Self {
            model: ChipModel::default(),
            gray_dot_bug: true,
            sprite_sprite_collisions: 0xFF,
            sprite_background_collisions: 0xFF,
            hide_sprites: false,
            dma_trace: false,
            palette: PaletteKind::Color,
            brightness: 50.0,
            contrast: 100.0,
            saturation: 50.0,
        }
    }
}

impl VicConfig {
    /// Default configuration for the given model.
    #[must_use]
    pub fn new(model: ChipModel) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_gray_dot_bug(mut self, enabled: bool) -> Self {
        self.gray_dot_bug = enabled;
        self
    }

    #[must_use]
    pub fn with_sprite_sprite_collisions(mut self, mask: u8) -> Self {
        self.sprite_sprite_collisions = mask;
        self
    }

    #[must_use]
    pub fn with_sprite_background_collisions(mut self, mask: u8) -> Self {
        self.sprite_background_collisions = mask;
        self
    }

    #[must_use]
    pub fn with_hidden_sprites(mut self, hidden: bool) -> Self {
        self.hide_sprites = hidden;
        self
    }

    #[must_use]
    pub fn with_dma_trace(mut self, enabled: bool) -> Self {
        self.dma_trace = enabled;
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: PaletteKind) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn with_adjustments(mut self, brightness: f64, contrast: f64, saturation: f64) -> Self {
        self.brightness = brightness;
        self.contrast = contrast;
        self.saturation = saturation;
        self
    }

    /// Gray dots are drawn only if requested and the chip has the bug.
    #[must_use]
    pub fn emulates_gray_dots(&self) -> bool {
        self.gray_dot_bug && self.model.has_gray_dot_bug()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::InvalidAdjustment { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_geometry_per_model() {
        assert_eq!(ChipModel::Pal6569R3.cycles_per_frame(), 19_656);
        assert_eq!(ChipModel::Pal8565.cycles_per_frame(), 312 * 63);
        assert_eq!(ChipModel::Ntsc6567.cycles_per_frame(), 17_095);
        assert_eq!(ChipModel::Ntsc8562.cycles_per_frame(), 263 * 65);
        assert_eq!(ChipModel::Ntsc6567R56A.cycles_per_frame(), 262 * 64);
    }

    #[test]
    fn frame_rates() {
        assert!((ChipModel::Pal6569R3.frames_per_second() - 50.1245).abs() < 1e-4);
        assert!((ChipModel::Ntsc6567.frames_per_second() - 59.8261).abs() < 1e-4);
        assert!((ChipModel::Ntsc6567R56A.frames_per_second() - 60.9928).abs() < 1e-4);
    }

    #[test]
    fn model_traits() {
        assert!(ChipModel::Pal8565.is_856x());
        assert!(ChipModel::Ntsc8562.has_gray_dot_bug());
        assert!(!ChipModel::Pal6569R3.has_gray_dot_bug());
        assert!(ChipModel::Pal6569R1.delayed_light_pen_irqs());
        assert!(ChipModel::Ntsc6567R56A.delayed_light_pen_irqs());
        assert!(!ChipModel::Ntsc6567.delayed_light_pen_irqs());
        assert!(ChipModel::Ntsc6567R56A.is_ntsc());
    }

    #[test]
    fn parse_model_names() {
        assert_eq!("PAL_6569_R3".parse::<ChipModel>(), Ok(ChipModel::Pal6569R3));
        assert_eq!("pal-8565".parse::<ChipModel>(), Ok(ChipModel::Pal8565));
        assert_eq!("ntsc_6567_r56a".parse::<ChipModel>(), Ok(ChipModel::Ntsc6567R56A));
        assert_eq!("8562".parse::<ChipModel>(), Ok(ChipModel::Ntsc8562));
        assert_eq!(
            "6581".parse::<ChipModel>(),
            Err(ConfigError::UnknownModel("6581".to_string()))
        );
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for model in ChipModel::ALL {
            assert_eq!(model.to_string().parse::<ChipModel>(), Ok(model));
        }
    }

    #[test]
    fn numeric_ids() {
        assert_eq!(ChipModel::try_from(0), Ok(ChipModel::Pal6569R1));
        assert_eq!(ChipModel::try_from(5), Ok(ChipModel::Ntsc8562));
        assert_eq!(ChipModel::try_from(6), Err(ConfigError::InvalidModelId(6)));
    }

    #[test]
    fn vblank_lines() {
        let pal = ChipModel::Pal6569R3;
        assert!(pal.is_vblank_line(15));
        assert!(!pal.is_vblank_line(16));
        assert!(!pal.is_vblank_line(299));
        assert!(pal.is_vblank_line(300));
        assert!(ChipModel::Ntsc6567.is_vblank_line(251));
        assert!(ChipModel::Ntsc6567R56A.is_vblank_line(250));
    }

    #[test]
    fn adjustments_are_validated() {
        assert!(VicConfig::default().validate().is_ok());
        let bad = VicConfig::default().with_adjustments(50.0, 120.0, 50.0);
        assert_eq!(
            bad.validate(),
            Err(ConfigError::InvalidAdjustment {
                name: "contrast",
                value: 120.0
            })
        );
    }

    #[test]
    fn gray_dots_need_856x() {
        assert!(!VicConfig::new(ChipModel::Pal6569R3).emulates_gray_dots());
        assert!(VicConfig::new(ChipModel::Pal8565).emulates_gray_dots());
        assert!(
            !VicConfig::new(ChipModel::Pal8565)
                .with_gray_dot_bug(false)
                .emulates_gray_dots()
        );
    }
}
