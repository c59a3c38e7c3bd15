//! CPU register port ($D000-$D03F).

use super::Vic;
use crate::registers::{Actions, CTRL1_RSEL, CTRL2_CSEL};

impl Vic {
    /// Read a register.
    ///
    /// `&mut self` because reading $D01E/$D01F clears the register at the
    /// end of the next cycle.
    pub fn read(&mut self, reg: u8) -> u8 {
        let value = self.peek(reg);
        match reg & 0x3F {
            0x1E => self.actions.insert(Actions::CLEAR_SPRITE_SPRITE),
            0x1F => self.actions.insert(Actions::CLEAR_SPRITE_BACKGROUND),
            _ => {}
        }
        value
    }

    /// Read a register without side effects.
    #[must_use]
    pub fn peek(&self, reg: u8) -> u8 {
        let regs = &self.regs.current;
        match reg & 0x3F {
            r @ 0x00..=0x0F => {
                let n = usize::from(r >> 1);
                if r & 1 == 0 {
                    regs.sprite_x[n] as u8
                } else {
                    regs.sprite_y[n]
                }
            }
            0x10 => (0..8).fold(0, |msb, n| msb | (((regs.sprite_x[n] >> 8) as u8 & 1) << n)),
            0x11 => (regs.ctrl1 & 0x7F) | if self.y > 0xFF { 0x80 } else { 0 },
            0x12 => self.y as u8,
            0x13 => self.light_pen.x,
            0x14 => self.light_pen.y,
            0x15 => regs.sprite_enable,
            0x16 => regs.ctrl2 | 0xC0,
            0x17 => regs.sprite_expand_y,
            0x18 => self.mem_select | 0x01,
            0x19 => self.irq.read_irr(),
            0x1A => self.irq.read_imr(),
            0x1B => regs.sprite_priority,
            0x1C => regs.sprite_multicolor,
            0x1D => regs.sprite_expand_x,
            0x1E => self.mixer.sprite_sprite,
            0x1F => self.mixer.sprite_background,
            r @ 0x20..=0x2E => regs.colors[usize::from(r - 0x20)] | 0xF0,
            _ => 0xFF,
        }
    }

    /// Write a register.
    pub fn write(&mut self, reg: u8, value: u8) {
        let reg = reg & 0x3F;
        log::trace!(
            "VIC-II write ${reg:02X} = {value:#04X} (line {} cycle {})",
            self.line,
            self.cycle
        );
        let regs = &mut self.regs.current;
        match reg {
            0x00..=0x0F => {
                let n = usize::from(reg >> 1);
                if reg & 1 == 0 {
                    regs.sprite_x[n] = (regs.sprite_x[n] & 0x100) | u16::from(value);
                } else {
                    regs.sprite_y[n] = value;
                }
            }
            0x10 => {
                for (n, x) in regs.sprite_x.iter_mut().enumerate() {
                    *x = (*x & 0xFF) | (u16::from(value >> n) & 1) << 8;
                }
            }
            0x11 => {
                regs.ctrl1 = value;
                self.display.observe_den(self.y, value);
                self.update_bad_line(value);
                self.border.select_rows(value & CTRL1_RSEL != 0);
                self.irq.set_compare_high(value);
                self.check_raster_on_write();
            }
            0x12 => {
                self.irq.set_compare_low(value);
                self.check_raster_on_write();
                return;
            }
            0x13 | 0x14 | 0x1E | 0x1F | 0x2F..=0x3F => return,
            0x15 => regs.sprite_enable = value,
            0x16 => {
                regs.ctrl2 = value;
                self.border.select_columns(value & CTRL2_CSEL != 0);
            }
            0x17 => {
                regs.sprite_expand_y = value;
                self.sprites.write_expand_y(value);
            }
            0x18 => {
                self.mem_select = value;
                return;
            }
            0x19 => {
                self.irq.acknowledge(value, &mut self.actions);
                return;
            }
            0x1A => {
                self.irq.set_mask(value, &mut self.actions);
                return;
            }
            0x1B => regs.sprite_priority = value,
            0x1C => regs.sprite_multicolor = value,
            0x1D => regs.sprite_expand_x = value,
            0x20..=0x2E => {
                let index = usize::from(reg - 0x20);
                regs.colors[index] = value & 0x0F;
                if self.config.emulates_gray_dots() {
                    self.regs.delayed.colors[index] = 0x0F;
                }
                return;
            }
            _ => return,
        }
        self.actions.insert(Actions::UPDATE_REGISTERS);
    }

    /// A write seen by the raster comparator. Before cycle 1 has run the
    /// counter already holds the next line.
    fn check_raster_on_write(&mut self) {
        let counter = if self.cycle == 1 { self.y + 1 } else { self.y };
        self.irq.check_raster(counter, &mut self.actions);
    }
}

#[cfg(test)]
mod tests {
    use crate::bus::FlatVideoMemory;
    use crate::config::{ChipModel, VicConfig};
    use crate::vic::Vic;

    #[test]
    fn register_read_write() {
        let mut vic = Vic::default();
        vic.write(0x20, 0x06);
        assert_eq!(vic.read(0x20), 0xF6);
        vic.write(0x21, 0x01);
        assert_eq!(vic.read(0x21), 0xF1);
        vic.write(0x15, 0xA5);
        assert_eq!(vic.read(0x15), 0xA5);
    }

    #[test]
    fn unused_bits_read_as_one() {
        let mut vic = Vic::default();
        vic.write(0x16, 0x00);
        vic.write(0x18, 0x00);
        vic.write(0x1A, 0x00);
        assert_eq!(vic.read(0x16), 0xC0);
        assert_eq!(vic.read(0x18), 0x01);
        assert_eq!(vic.read(0x1A), 0xF0);
        assert_eq!(vic.read(0x19), 0x70);
        for reg in 0x2F..=0x3F {
            assert_eq!(vic.read(reg), 0xFF, "${reg:02X}");
        }
    }

    #[test]
    fn registers_mirror_every_64_bytes() {
        let mut vic = Vic::default();
        vic.write(0x40 + 0x21, 0x03);
        assert_eq!(vic.read(0xC0 + 0x21), 0xF3);
    }

    #[test]
    fn sprite_x_msb() {
        let mut vic = Vic::default();
        vic.write(0x00, 0x40);
        vic.write(0x10, 0x01);
        assert_eq!(vic.read(0x00), 0x40);
        assert_eq!(vic.read(0x10), 0x01);
        vic.write(0x00, 0x20);
        assert_eq!(vic.read(0x10), 0x01, "low byte write keeps bit 8");
    }

    #[test]
    fn raster_counter_reads_back_nine_bits() {
        let mut vic = Vic::default();
        let mut memory = FlatVideoMemory::new();
        while vic.raster_counter() != 0x105 {
            vic.tick(&mut memory);
        }
        assert_eq!(vic.read(0x12), 0x05);
        assert_eq!(vic.read(0x11) & 0x80, 0x80);
    }

    #[test]
    fn collision_read_clears_after_next_cycle() {
        let mut vic = Vic::default();
        let mut memory = FlatVideoMemory::new();
        vic.mixer.sprite_sprite = 0x03;
        assert_eq!(vic.peek(0x1E), 0x03);
        assert_eq!(vic.read(0x1E), 0x03);
        assert_eq!(vic.peek(0x1E), 0x03);
        vic.tick(&mut memory);
        assert_eq!(vic.peek(0x1E), 0x00);
    }

    #[test]
    fn gray_dot_shows_colour_15_once() {
        let mut vic = Vic::new(VicConfig::new(ChipModel::Pal8565)).expect("valid config");
        vic.write(0x20, 0x02);
        assert_eq!(vic.regs.delayed.colors[0], 0x0F);
        let mut old = Vic::with_model(ChipModel::Pal6569R3);
        old.write(0x20, 0x02);
        assert_eq!(old.regs.delayed.colors[0], 0x0E);
    }

    #[test]
    fn register_changes_reach_pipeline_one_cycle_later() {
        let mut vic = Vic::default();
        let mut memory = FlatVideoMemory::new();
        vic.write(0x16, 0x18);
        assert_eq!(vic.regs.delayed.ctrl2, 0x00);
        vic.tick(&mut memory);
        assert_eq!(vic.regs.delayed.ctrl2, 0x18);
    }
}
