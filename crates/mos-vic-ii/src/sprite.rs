//! The eight sprite units.
//!
//! Per-sprite state lives in [`SpriteUnit`]; everything the hardware keeps
//! as one bit per sprite (DMA, display, expansion flip-flop, shift register
//! activity) is an 8-bit mask in [`SpriteEngine`], sprite n in bit n.
//!
//! Counter rules, by cycle:
//!
//! - 15/16: MC -> MCBASE where the expansion flip-flop is set; DMA off at 63.
//! - 55/56: DMA on where enabled and Y matches; MCBASE cleared.
//! - 56: expansion flip-flops toggle for Y-expanded sprites.
//! - 58: MCBASE -> MC; display on where DMA is on and Y matches.

use crate::mixer::Mixer;
use crate::registers::{RegisterFile, RegisterPipe, color};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteUnit {
    /// 6-bit data counter.
    pub mc: u8,
    pub mcbase: u8,
    /// Data block base from the p-access (pointer << 6).
    pub pointer: u16,
    /// Bytes from s-accesses 1-3.
    pub chunks: [u8; 3],
    /// 24-bit shift register.
    pub data: u32,
    pub mc_flop: bool,
    /// X-expansion flip-flop; the register shifts only while it is set.
    pub exp_flop: bool,
    pub color_bits: u8,
}

impl SpriteUnit {
    /// Address of the next s-access.
    #[must_use]
    pub const fn data_address(&self) -> u16 {
        self.pointer | self.mc as u16
    }

    pub fn advance(&mut self) {
        self.mc = (self.mc + 1) & 0x3F;
    }

    pub fn load_shift_register(&mut self) {
        let [c1, c2, c3] = self.chunks;
        self.data = u32::from(c1) << 16 | u32::from(c2) << 8 | u32::from(c3);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteEngine {
    pub units: [SpriteUnit; 8],
    pub dma: u8,
    pub display: u8,
    /// `display` as of cycle 58/59, used for the first half of a chunk.
    pub display_delayed: u8,
    /// Y-expansion flip-flops.
    pub expansion: u8,
    /// Shift registers currently pumping out pixels.
    pub active: u8,
    /// Sprite whose s-access 1 ran this cycle.
    pub first_dma: u8,
    /// Sprite whose s-access 2 ran this cycle.
    pub second_dma: u8,
    /// Y-expansion bits cleared by the CPU in cycle 15.
    pub cleared_expansion: u8,
}

impl SpriteEngine {
    /// Power-up state. The 6567/6569 start with MCBASE at 63.
    #[must_use]
    pub fn new(old_chip: bool) -> Self {
        let start = if old_chip { 63 } else { 0 };
        let unit = SpriteUnit {
            mc: start,
            mcbase: start,
            ..SpriteUnit::default()
        };
        Self {
            units: [unit; 8],
            dma: 0,
            display: 0,
            display_delayed: 0,
            expansion: 0xFF,
            active: 0,
            first_dma: 0,
            second_dma: 0,
            cleared_expansion: 0,
        }
    }

    /// Sprites whose Y register equals the low byte of the raster counter.
    #[must_use]
    pub fn compare_y(regs: &RegisterFile, y: u16) -> u8 {
        let line = y as u8;
        (0..8).fold(0, |mask, n| mask | (u8::from(regs.sprite_y[n] == line) << n))
    }

    /// Cycle 16: MCBASE update and end of DMA.
    pub fn dma_off(&mut self) {
        for (n, unit) in self.units.iter_mut().enumerate() {
            let bit = 1 << n;
            if self.expansion & bit == 0 {
                continue;
            }
            unit.mcbase = if self.cleared_expansion & bit != 0 {
                (0b10_1010 & (unit.mcbase & unit.mc)) | (0b01_0101 & (unit.mcbase | unit.mc))
            } else {
                unit.mc
            };
            if unit.mcbase == 63 {
                self.dma &= !bit;
            }
        }
    }

    /// Cycles 55 and 56: start DMA for enabled sprites at their Y position.
    pub fn dma_on(&mut self, regs: &RegisterFile, y: u16) {
        let rising = !self.dma & regs.sprite_enable & Self::compare_y(regs, y);
        for (n, unit) in self.units.iter_mut().enumerate() {
            if rising & (1 << n) != 0 {
                unit.mcbase = 0;
            }
        }
        self.dma |= rising;
        self.expansion |= rising;
    }

    /// Cycle 56.
    pub fn toggle_expansion(&mut self, expand_y: u8) {
        self.expansion ^= expand_y;
    }

    /// Cycle 58.
    pub fn turn_display(&mut self, regs: &RegisterFile, y: u16) {
        for unit in &mut self.units {
            unit.mc = unit.mcbase;
        }
        self.display |= regs.sprite_enable & Self::compare_y(regs, y);
        self.display &= self.dma;
    }

    /// CPU write to $D017.
    pub fn write_expand_y(&mut self, value: u8) {
        self.cleared_expansion = !value & !self.expansion;
        self.expansion |= !value;
    }

    fn load_second_dma(&mut self) {
        for (n, unit) in self.units.iter_mut().enumerate() {
            if self.second_dma & (1 << n) != 0 {
                unit.load_shift_register();
            }
        }
    }

    /// Sprite output runs while a sprite is displayed or reloading its
    /// shift register, and in cycle 59 for the delayed display flags.
    #[must_use]
    pub fn needs_drawing(&self, cycle: u8) -> bool {
        self.display != 0 || self.second_dma != 0 || (cycle == 59 && self.display_delayed != 0)
    }

    /// Draw sprite pixels for one chunk into `mixer`.
    ///
    /// Register changes land mid-chunk: sprite colours after pixel 0,
    /// X expansion and priority after pixel 5. A multicolour toggle
    /// shows up after pixel 5 on the 856x and after pixel 6 on older
    /// chips. Sprites in a DMA cycle freeze for part of the chunk and
    /// reload their shift register after pixel 3.
    pub fn draw(
        &mut self,
        regs: &mut RegisterPipe<RegisterFile>,
        x_counter: u16,
        new_chip: bool,
        hide: bool,
        mixer: &mut Mixer,
    ) {
        let first = self.first_dma;
        let second = self.second_dma;
        let ctx = DrawContext { x_counter, hide };

        self.pixel(0, self.display_delayed, second, &regs.delayed, &ctx, mixer);

        regs.delayed.colors[color::SPRITE_EXTRA_1] = regs.current.colors[color::SPRITE_EXTRA_1];
        regs.delayed.colors[color::SPRITE_EXTRA_2] = regs.current.colors[color::SPRITE_EXTRA_2];
        for n in 0..8 {
            regs.delayed.colors[color::SPRITE_0 + n] = regs.current.colors[color::SPRITE_0 + n];
        }

        self.pixel(1, self.display_delayed, second, &regs.delayed, &ctx, mixer);
        self.active &= !second;
        self.pixel(2, self.display_delayed, second, &regs.delayed, &ctx, mixer);
        self.pixel(3, self.display_delayed, first | second, &regs.delayed, &ctx, mixer);

        self.load_second_dma();

        self.pixel(4, self.display, first | second, &regs.delayed, &ctx, mixer);
        self.pixel(5, self.display, first | second, &regs.delayed, &ctx, mixer);

        regs.delayed.sprite_expand_x = regs.current.sprite_expand_x;
        regs.delayed.sprite_priority = regs.current.sprite_priority;

        let toggled = regs.delayed.sprite_multicolor ^ regs.current.sprite_multicolor;
        if toggled != 0 && new_chip {
            regs.delayed.sprite_multicolor = regs.current.sprite_multicolor;
            for (n, unit) in self.units.iter_mut().enumerate() {
                if toggled & (1 << n) != 0 {
                    unit.mc_flop ^= !unit.exp_flop;
                }
            }
        }

        self.pixel(6, self.display, first | second, &regs.delayed, &ctx, mixer);

        if toggled != 0 && !new_chip {
            regs.delayed.sprite_multicolor = regs.current.sprite_multicolor;
            for (n, unit) in self.units.iter_mut().enumerate() {
                if toggled & (1 << n) != 0 {
                    unit.mc_flop = false;
                }
            }
        }

        self.pixel(7, self.display, first, &regs.delayed, &ctx, mixer);
    }

    fn pixel(
        &mut self,
        pixel: usize,
        enable: u8,
        freeze: u8,
        regs: &RegisterFile,
        ctx: &DrawContext,
        mixer: &mut Mixer,
    ) {
        if enable == 0 && self.active == 0 {
            return;
        }
        for (n, unit) in self.units.iter_mut().enumerate() {
            let bit = 1 << n;
            let enabled = enable & bit != 0;
            let mut active = self.active & bit != 0;
            if !enabled && !active {
                continue;
            }
            let frozen = freeze & bit != 0;

            if enabled && !active && !frozen && ctx.x_counter + pixel as u16 == regs.sprite_x[n] {
                self.active |= bit;
                active = true;
                unit.exp_flop = true;
                unit.mc_flop = true;
            }
            if !active {
                continue;
            }

            if !frozen {
                if unit.exp_flop {
                    if regs.sprite_multicolor & bit != 0 {
                        if unit.mc_flop {
                            unit.color_bits = ((unit.data >> 22) & 0x03) as u8;
                        }
                        unit.mc_flop = !unit.mc_flop;
                    } else {
                        unit.color_bits = ((unit.data >> 22) & 0x02) as u8;
                    }
                    unit.data = (unit.data << 1) & 0x00FF_FFFF;
                    if unit.data == 0 && unit.color_bits == 0 {
                        self.active &= !bit;
                    }
                }
                unit.exp_flop = !unit.exp_flop || regs.sprite_expand_x & bit == 0;
            }

            if unit.color_bits != 0 && !ctx.hide {
                let color = match unit.color_bits {
                    1 => regs.colors[color::SPRITE_EXTRA_1],
                    2 => regs.colors[color::SPRITE_0 + n],
                    _ => regs.colors[color::SPRITE_EXTRA_2],
                };
                let behind = regs.sprite_priority & bit != 0;
                mixer.sprite(pixel, n, color, behind);
            }
        }
    }
}

struct DrawContext {
    x_counter: u16,
    hide: bool,
}

impl Default for SpriteEngine {
    fn default() -> Self {
        Self::new(true)
    }
}
