//! Register file, the current/delayed register pipeline, and the set of
//! actions deferred to the end of a cycle.
//!
//! # Register map ($D000-$D03F, mirrored every 64 bytes)
//!
//! | Addr | Register |
//! |------|----------|
//! | $00-$0F | Sprite X (low 8 bits) / Y pairs |
//! | $10  | Sprite X bit 8 |
//! | $11  | Control 1: RST8, ECM, BMM, DEN, RSEL, YSCROLL |
//! | $12  | Raster counter / raster compare |
//! | $13-$14 | Light pen X/Y |
//! | $15  | Sprite enable |
//! | $16  | Control 2: MCM, CSEL, XSCROLL |
//! | $17  | Sprite Y expansion |
//! | $18  | Memory pointers |
//! | $19-$1A | IRQ request / mask |
//! | $1B-$1D | Sprite priority, multicolour, X expansion |
//! | $1E-$1F | Sprite-sprite / sprite-background collisions |
//! | $20-$2E | Colour registers |
//! | $2F-$3F | Unused, read $FF |

/// Colour register indices into [`RegisterFile::colors`].
pub mod color {
    pub const BORDER: usize = 0;
    pub const BACKGROUND_0: usize = 1;
    pub const BACKGROUND_1: usize = 2;
    pub const BACKGROUND_2: usize = 3;
    pub const BACKGROUND_3: usize = 4;
    pub const SPRITE_EXTRA_1: usize = 5;
    pub const SPRITE_EXTRA_2: usize = 6;
    pub const SPRITE_0: usize = 7;
}

/// Control register 1 bits ($D011).
pub const CTRL1_RST8: u8 = 0x80;
pub const CTRL1_ECM: u8 = 0x40;
pub const CTRL1_BMM: u8 = 0x20;
pub const CTRL1_DEN: u8 = 0x10;
pub const CTRL1_RSEL: u8 = 0x08;

/// Control register 2 bits ($D016).
pub const CTRL2_MCM: u8 = 0x10;
pub const CTRL2_CSEL: u8 = 0x08;

/// A register whose effect lags the CPU write by one cycle.
///
/// `current` is what the CPU wrote; `delayed` is what the pixel pipeline
/// sees. [`RegisterPipe::commit`] copies one into the other and is called
/// from a single place at the end of each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterPipe<T> {
    pub current: T,
    pub delayed: T,
}

impl<T: Copy> RegisterPipe<T> {
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            current: value,
            delayed: value,
        }
    }

    pub fn commit(&mut self) {
        self.delayed = self.current;
    }

    /// Overwrite both copies.
    pub fn force(&mut self, value: T) {
        self.current = value;
        self.delayed = value;
    }
}

/// The CPU-visible registers that feed the pixel pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterFile {
    /// 9-bit sprite X coordinates.
    pub sprite_x: [u16; 8],
    pub sprite_y: [u8; 8],
    pub ctrl1: u8,
    pub ctrl2: u8,
    pub sprite_enable: u8,
    pub sprite_priority: u8,
    pub sprite_multicolor: u8,
    pub sprite_expand_x: u8,
    pub sprite_expand_y: u8,
    /// $D020-$D02E, 4 bits each.
    pub colors: [u8; 15],
}

impl RegisterFile {
    /// Power-up values.
    #[must_use]
    pub const fn power_up() -> Self {
        let mut colors = [0; 15];
        colors[color::BORDER] = 0x0E;
        colors[color::BACKGROUND_0] = 0x06;
        Self {
            sprite_x: [0; 8],
            sprite_y: [0; 8],
            ctrl1: CTRL1_DEN,
            ctrl2: 0,
            sprite_enable: 0,
            sprite_priority: 0,
            sprite_multicolor: 0,
            sprite_expand_x: 0,
            sprite_expand_y: 0,
            colors,
        }
    }

    #[must_use]
    pub const fn yscroll(&self) -> u8 {
        self.ctrl1 & 0x07
    }

    #[must_use]
    pub const fn xscroll(&self) -> u8 {
        self.ctrl2 & 0x07
    }

    #[must_use]
    pub const fn den(&self) -> bool {
        self.ctrl1 & CTRL1_DEN != 0
    }

    #[must_use]
    pub const fn rsel(&self) -> bool {
        self.ctrl1 & CTRL1_RSEL != 0
    }

    #[must_use]
    pub const fn csel(&self) -> bool {
        self.ctrl2 & CTRL2_CSEL != 0
    }

    /// ECM | BMM | MCM packed as bits 6, 5, 4.
    #[must_use]
    pub const fn mode_bits(&self) -> u8 {
        (self.ctrl1 & (CTRL1_ECM | CTRL1_BMM)) | (self.ctrl2 & CTRL2_MCM)
    }

    #[must_use]
    pub const fn display_mode(&self) -> DisplayMode {
        DisplayMode::from_bits(self.mode_bits())
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::power_up()
    }
}

/// Graphics mode selected by ECM/BMM/MCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplayMode {
    StandardText,
    MulticolorText,
    StandardBitmap,
    MulticolorBitmap,
    ExtendedBackgroundColor,
    InvalidText,
    InvalidStandardBitmap,
    InvalidMulticolorBitmap,
}

impl DisplayMode {
    /// Decode ECM | BMM | MCM as returned by [`RegisterFile::mode_bits`].
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match (bits >> 4) & 0x07 {
            0 => Self::StandardText,
            1 => Self::MulticolorText,
            2 => Self::StandardBitmap,
            3 => Self::MulticolorBitmap,
            4 => Self::ExtendedBackgroundColor,
            5 => Self::InvalidText,
            6 => Self::InvalidStandardBitmap,
            _ => Self::InvalidMulticolorBitmap,
        }
    }
}

/// Actions deferred to the end of the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Actions(u16);

impl Actions {
    /// Recompute the IRQ output from IRR & IMR.
    pub const UPDATE_IRQ_LINE: Self = Self(1 << 0);
    /// Falling edge on the light-pen input.
    pub const LP_TRANSITION: Self = Self(1 << 1);
    /// Copy the border flip-flops into their delayed copies.
    pub const UPDATE_FLIPFLOPS: Self = Self(1 << 2);
    /// Copy the register file into its delayed copy.
    pub const UPDATE_REGISTERS: Self = Self(1 << 3);
    /// Switch to the pending VIC bank.
    pub const UPDATE_BANK: Self = Self(1 << 4);
    /// A bad line condition switches to display state.
    pub const SET_DISPLAY_STATE: Self = Self(1 << 5);
    pub const CLEAR_SPRITE_SPRITE: Self = Self(1 << 6);
    pub const CLEAR_SPRITE_BACKGROUND: Self = Self(1 << 7);

    pub const NONE: Self = Self(0);

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Return the pending set and leave nothing scheduled.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipe_commits_current_into_delayed() {
        let mut pipe = RegisterPipe::new(1u8);
        pipe.current = 7;
        assert_eq!(pipe.delayed, 1);
        pipe.commit();
        assert_eq!(pipe.delayed, 7);
    }

    #[test]
    fn power_up_register_values() {
        let regs = RegisterFile::power_up();
        assert_eq!(regs.ctrl1, 0x10);
        assert_eq!(regs.colors[color::BORDER], 0x0E, "border is light blue");
        assert_eq!(regs.colors[color::BACKGROUND_0], 0x06, "background is blue");
        assert!(regs.den());
        assert_eq!(regs.display_mode(), DisplayMode::StandardText);
    }

    #[test]
    fn mode_bits_combine_both_control_registers() {
        let regs = RegisterFile {
            ctrl1: CTRL1_ECM | CTRL1_BMM,
            ctrl2: CTRL2_MCM,
            ..RegisterFile::power_up()
        };
        assert_eq!(regs.mode_bits(), 0x70);
        assert_eq!(regs.display_mode(), DisplayMode::InvalidMulticolorBitmap);
    }

    #[test]
    fn actions_take_clears_pending_set() {
        let mut actions = Actions::NONE;
        actions.insert(Actions::UPDATE_IRQ_LINE);
        actions.insert(Actions::UPDATE_REGISTERS);
        let taken = actions.take();
        assert!(taken.contains(Actions::UPDATE_IRQ_LINE));
        assert!(taken.contains(Actions::UPDATE_REGISTERS));
        assert!(!taken.contains(Actions::LP_TRANSITION));
        assert!(actions.is_empty());
    }
}
