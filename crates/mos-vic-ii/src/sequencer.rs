//! Graphics data sequencer.
//!
//! An 8-bit shift register reloaded from the g-access pipeline when the
//! pixel index matches XSCROLL. Each pixel shifts one bit out; multicolour
//! modes take two bits every other pixel, paced by `mc_flop`. The colour
//! of a pixel is looked up in [`COLOR_TABLE`] by mode and colour bits.

use crate::mixer::Mixer;
use crate::registers::{CTRL2_MCM, RegisterFile, RegisterPipe, color};

/// Where a canvas pixel takes its colour from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSource {
    /// Background colour register 0-3.
    Background(u8),
    /// The c-access colour nibble.
    Color,
    /// The low three bits of the colour nibble.
    ColorLow,
    /// Low nibble of the character code.
    CharLow,
    /// High nibble of the character code.
    CharHigh,
    /// Background register selected by character bits 6-7.
    Extended,
    Black,
}

const fn source(key: u8) -> ColorSource {
    use ColorSource::{Background, Black, CharHigh, CharLow, Color, ColorLow, Extended};
    match key {
        // Standard text, multicolour text with MC = 0.
        0x00..=0x0B => {
            if key & 1 == 0 {
                Background(0)
            } else {
                Color
            }
        }
        0x0C => Background(0),
        0x0D => Background(1),
        0x0E => Background(2),
        0x0F => ColorLow,
        // Standard bitmap.
        0x10..=0x17 => {
            if key & 1 == 0 {
                CharLow
            } else {
                CharHigh
            }
        }
        // Multicolour bitmap.
        0x18..=0x1F => match key & 3 {
            0 => Background(0),
            1 => CharHigh,
            2 => CharLow,
            _ => Color,
        },
        // Extended background colour.
        0x20..=0x27 => {
            if key & 1 == 0 {
                Extended
            } else {
                Color
            }
        }
        _ => Black,
    }
}

const fn build_table() -> [ColorSource; 64] {
    let mut table = [ColorSource::Black; 64];
    let mut key = 0;
    while key < 64 {
        table[key] = source(key as u8);
        key += 1;
    }
    table
}

/// Indexed by `((mode | MC bit) >> 1) | colour bits`, where mode packs
/// ECM/BMM/MCM as bits 6/5/4 and the MC bit is colour nibble bit 3.
pub const COLOR_TABLE: [ColorSource; 64] = build_table();

/// ECM | BMM from control 1, MCM from control 2.
const fn mode_bits(ctrl1: u8, ctrl2: u8) -> u8 {
    (ctrl1 & 0x60) | (ctrl2 & CTRL2_MCM)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequencer {
    pub data: u8,
    /// Set between cycles 18 and 57.
    pub can_load: bool,
    pub mc_flop: bool,
    pub latched_char: u8,
    pub latched_color: u8,
    pub colorbits: u8,
}

/// Per-cycle inputs the sequencer does not own.
#[derive(Debug, Clone, Copy)]
pub struct CanvasContext {
    /// The g-access result due this cycle.
    pub g_access: u32,
    /// Delayed vertical border flip-flop; blocks reloading when set.
    pub vertical_border: bool,
    /// 6567/6569 timing of mode register changes.
    pub old_chip: bool,
}

impl Sequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn load(&mut self, ctx: &CanvasContext) {
        if !ctx.vertical_border && self.can_load {
            let [data, color, character, _] = ctx.g_access.to_le_bytes();
            self.data = data;
            self.latched_color = color;
            self.latched_char = character;
            self.mc_flop = true;
        }
    }

    /// Draw the eight canvas pixels of a cycle.
    ///
    /// Register changes land part way through the chunk: background
    /// colours after pixel 0, the new $D016 mode after pixel 3 (together
    /// with the one bits of $D011 on old chips, its zero bits after pixel
    /// 5), and a new MCM bit resets `mc_flop` before pixel 7.
    pub fn draw(&mut self, regs: &mut RegisterPipe<RegisterFile>, ctx: &CanvasContext, mixer: &mut Mixer) {
        let xscroll = usize::from(regs.delayed.xscroll());
        let mut d011 = regs.delayed.ctrl1;
        let mut d016 = regs.delayed.ctrl2;
        let mut mode = mode_bits(d011, d016);

        self.pixel(0, mode, d016, xscroll, ctx, &regs.delayed.colors, mixer);

        for index in color::BACKGROUND_0..=color::BACKGROUND_3 {
            regs.delayed.colors[index] = regs.current.colors[index];
        }

        for pixel in 1..=3 {
            self.pixel(pixel, mode, d016, xscroll, ctx, &regs.delayed.colors, mixer);
        }

        let new_d016 = regs.current.ctrl2;
        if ctx.old_chip {
            d011 |= regs.current.ctrl1;
        }
        mode = mode_bits(d011, new_d016);

        for pixel in 4..=5 {
            self.pixel(pixel, mode, d016, xscroll, ctx, &regs.delayed.colors, mixer);
        }

        if ctx.old_chip {
            d011 = regs.current.ctrl1;
            mode = mode_bits(d011, new_d016);
        }

        self.pixel(6, mode, d016, xscroll, ctx, &regs.delayed.colors, mixer);

        if d016 != new_d016 {
            if d016 & CTRL2_MCM == 0 && new_d016 & CTRL2_MCM != 0 {
                self.mc_flop = false;
            }
            d016 = new_d016;
        }

        self.pixel(7, mode, d016, xscroll, ctx, &regs.delayed.colors, mixer);
    }

    fn pixel(
        &mut self,
        pixel: usize,
        mode: u8,
        d016: u8,
        xscroll: usize,
        ctx: &CanvasContext,
        colors: &[u8; 15],
        mixer: &mut Mixer,
    ) {
        if pixel == xscroll {
            self.load(ctx);
        }

        let mc_bit = self.latched_color & 0x08;
        let wide = mode & 0x20 != 0 || mc_bit != 0;
        let mc_display = mode & 0x10 != 0 && wide;
        let mc_generate = d016 & CTRL2_MCM != 0 && wide;

        if mc_generate {
            if self.mc_flop {
                self.colorbits = (self.data >> 6) >> u8::from(!mc_display);
            }
        } else {
            self.colorbits = (self.data >> 7) << u8::from(mc_display);
        }
        self.data <<= 1;
        self.mc_flop = !self.mc_flop;

        let key = ((mode | mc_bit) >> 1) | self.colorbits;
        let color = self.resolve(COLOR_TABLE[usize::from(key & 0x3F)], colors);
        let foreground = if mc_display {
            self.colorbits & 0x02 != 0
        } else {
            self.colorbits != 0
        };
        mixer.canvas(pixel, color, foreground);
    }

    fn resolve(&self, source: ColorSource, colors: &[u8; 15]) -> u8 {
        match source {
            ColorSource::Background(n) => colors[color::BACKGROUND_0 + usize::from(n)],
            ColorSource::Color => self.latched_color,
            ColorSource::ColorLow => self.latched_color & 0x07,
            ColorSource::CharLow => self.latched_char & 0x0F,
            ColorSource::CharHigh => self.latched_char >> 4,
            ColorSource::Extended => colors[color::BACKGROUND_0 + usize::from(self.latched_char >> 6)],
            ColorSource::Black => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{CTRL1_BMM, CTRL1_ECM};

    fn regs_with(ctrl1: u8, ctrl2: u8) -> RegisterPipe<RegisterFile> {
        let mut file = RegisterFile::power_up();
        file.ctrl1 = ctrl1;
        file.ctrl2 = ctrl2;
        file.colors[color::BACKGROUND_0] = 6;
        file.colors[color::BACKGROUND_1] = 1;
        file.colors[color::BACKGROUND_2] = 2;
        file.colors[color::BACKGROUND_3] = 3;
        RegisterPipe::new(file)
    }

    fn ctx(data: u8, color: u8, character: u8) -> CanvasContext {
        CanvasContext {
            g_access: u32::from(data) | u32::from(color) << 8 | u32::from(character) << 16,
            vertical_border: false,
            old_chip: false,
        }
    }

    fn draw(ctrl1: u8, ctrl2: u8, context: &CanvasContext) -> Mixer {
        let mut regs = regs_with(ctrl1, ctrl2);
        let mut seq = Sequencer {
            can_load: true,
            ..Sequencer::new()
        };
        let mut mixer = Mixer::new();
        mixer.begin_chunk();
        seq.draw(&mut regs, context, &mut mixer);
        mixer
    }

    #[test]
    fn table_covers_every_mode() {
        assert_eq!(COLOR_TABLE[0x00], ColorSource::Background(0));
        assert_eq!(COLOR_TABLE[0x01], ColorSource::Color);
        assert_eq!(COLOR_TABLE[0x0F], ColorSource::ColorLow);
        assert_eq!(COLOR_TABLE[0x11], ColorSource::CharHigh);
        assert_eq!(COLOR_TABLE[0x1A], ColorSource::CharLow);
        assert_eq!(COLOR_TABLE[0x20], ColorSource::Extended);
        for key in 0x28..0x40 {
            assert_eq!(COLOR_TABLE[key], ColorSource::Black, "invalid mode key {key:#04X}");
        }
    }

    #[test]
    fn standard_text_pixels() {
        let mixer = draw(0x1B, 0x08, &ctx(0b1010_0000, 0x05, 0x01));
        assert_eq!(&mixer.colors()[..4], &[5, 6, 5, 6]);
        assert!(mixer.is_foreground(0));
        assert!(!mixer.is_foreground(1));
    }

    #[test]
    fn xscroll_delays_the_load() {
        let mixer = draw(0x1B, 0x0B, &ctx(0xFF, 0x05, 0x01));
        assert_eq!(&mixer.colors()[..3], &[6, 6, 6], "old register contents before the load");
        assert_eq!(&mixer.colors()[3..], &[5, 5, 5, 5, 5]);
    }

    #[test]
    fn load_blocked_by_vertical_border() {
        let mut context = ctx(0xFF, 0x05, 0x01);
        context.vertical_border = true;
        let mixer = draw(0x1B, 0x08, &context);
        assert!(mixer.colors().iter().all(|&c| c == 6));
    }

    #[test]
    fn multicolor_text_uses_pairs() {
        // Colour nibble bit 3 set: pairs 01, 10, 11, 00.
        let mixer = draw(0x1B, 0x18, &ctx(0b0110_1100, 0x0D, 0x00));
        assert_eq!(mixer.colors(), &[1, 1, 2, 2, 5, 5, 6, 6]);
        assert!(!mixer.is_foreground(0), "01 is background");
        assert!(mixer.is_foreground(2), "10 is foreground");
    }

    #[test]
    fn multicolor_text_without_mc_bit_is_hires() {
        let mixer = draw(0x1B, 0x18, &ctx(0b1000_0000, 0x05, 0x00));
        assert_eq!(mixer.colors()[0], 5);
        assert_eq!(mixer.colors()[1], 6);
    }

    #[test]
    fn standard_bitmap_uses_character_nibbles() {
        let mixer = draw(0x1B | CTRL1_BMM, 0x08, &ctx(0b1000_0000, 0x00, 0x27));
        assert_eq!(mixer.colors()[0], 2);
        assert_eq!(mixer.colors()[1], 7);
    }

    #[test]
    fn ecm_selects_background_by_character_bits() {
        let mixer = draw(0x1B | CTRL1_ECM, 0x08, &ctx(0b0111_1111, 0x05, 0xC1));
        assert_eq!(mixer.colors()[0], 3, "character bits 6-7 = 3 selects background 3");
        assert_eq!(mixer.colors()[1], 5);
    }

    #[test]
    fn invalid_mode_is_black_but_keeps_foreground() {
        let mixer = draw(0x1B | CTRL1_ECM | CTRL1_BMM, 0x08, &ctx(0xF0, 0x05, 0x00));
        assert!(mixer.colors().iter().all(|&c| c == 0));
        assert!(mixer.is_foreground(0));
        assert!(!mixer.is_foreground(7));
    }

    #[test]
    fn background_change_shows_after_first_pixel() {
        let mut regs = regs_with(0x1B, 0x08);
        regs.current.colors[color::BACKGROUND_0] = 2;
        let mut seq = Sequencer::new();
        let mut mixer = Mixer::new();
        mixer.begin_chunk();
        seq.draw(&mut regs, &ctx(0, 0, 0), &mut mixer);
        assert_eq!(mixer.colors()[0], 6);
        assert!(mixer.colors()[1..].iter().all(|&c| c == 2));
    }
}
