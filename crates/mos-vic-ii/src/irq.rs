//! Interrupt sources and the light-pen latch.
//!
//! IRR bits: 0 raster, 1 sprite-background, 2 sprite-sprite, 3 light pen.
//! A source sets its IRR bit immediately; the IRQ output follows IRR & IMR
//! at the end of the cycle.

use crate::config::ChipModel;
use crate::registers::Actions;

pub use crate::mixer::{IRQ_SPRITE_BACKGROUND, IRQ_SPRITE_SPRITE};

pub const IRQ_RASTER: u8 = 0x01;
pub const IRQ_LIGHT_PEN: u8 = 0x08;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterruptController {
    /// $D019 latch, 4 bits.
    pub irr: u8,
    /// $D01A, 4 bits.
    pub imr: u8,
    /// State of the IRQ output.
    pub output: bool,
    /// 9-bit raster compare value.
    pub raster_compare: u16,
    /// The compare matched at the last check; the IRQ fires on the edge.
    pub line_matches: bool,
}

impl InterruptController {
    pub fn trigger(&mut self, source: u8, actions: &mut Actions) {
        log::trace!("VIC-II IRQ source {source:#04X}");
        self.irr |= source;
        actions.insert(Actions::UPDATE_IRQ_LINE);
    }

    /// Compare `counter` against the raster compare value.
    pub fn check_raster(&mut self, counter: u16, actions: &mut Actions) {
        let matches = counter == self.raster_compare;
        if matches && !self.line_matches {
            self.trigger(IRQ_RASTER, actions);
        }
        self.line_matches = matches;
    }

    /// $D019 write: one bits clear the corresponding latch bits.
    pub fn acknowledge(&mut self, value: u8, actions: &mut Actions) {
        self.irr &= !value & 0x0F;
        actions.insert(Actions::UPDATE_IRQ_LINE);
    }

    /// $D01A write.
    pub fn set_mask(&mut self, value: u8, actions: &mut Actions) {
        self.imr = value & 0x0F;
        actions.insert(Actions::UPDATE_IRQ_LINE);
    }

    pub fn update_output(&mut self) {
        self.output = self.irr & self.imr != 0;
    }

    pub fn set_compare_low(&mut self, value: u8) {
        self.raster_compare = (self.raster_compare & 0x100) | u16::from(value);
    }

    /// Bit 8 from $D011 bit 7.
    pub fn set_compare_high(&mut self, ctrl1: u8) {
        self.raster_compare = (self.raster_compare & 0xFF) | (u16::from(ctrl1 & 0x80) << 1);
    }

    /// $D019 read value. Bit 7 mirrors any masked request.
    #[must_use]
    pub const fn read_irr(&self) -> u8 {
        let any = if self.irr & self.imr != 0 { 0xF0 } else { 0x70 };
        self.irr | any
    }

    #[must_use]
    pub const fn read_imr(&self) -> u8 {
        self.imr | 0xF0
    }
}

/// Latched pen position and the state of the pen input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightPen {
    /// Input level; the pen triggers when it goes low.
    pub line: bool,
    /// $D013: X / 2.
    pub x: u8,
    /// $D014.
    pub y: u8,
    /// A position has been latched this frame.
    pub triggered: bool,
}

impl LightPen {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            line: true,
            x: 0,
            y: 0,
            triggered: false,
        }
    }

    /// Drive the pen input. A falling edge is latched at the end of the
    /// cycle.
    pub fn set_line(&mut self, high: bool, actions: &mut Actions) {
        if high == self.line {
            return;
        }
        if !high {
            actions.insert(Actions::LP_TRANSITION);
        }
        self.line = high;
    }

    /// Pen X coordinate latched in `cycle`.
    #[must_use]
    pub const fn x_position(model: ChipModel, cycle: u8) -> u8 {
        let offset: u16 = if model.is_856x() { 2 } else { 4 };
        let base: u16 = if model.is_pal() { 392 } else { 400 };
        let cycle = cycle as u16;
        let x = if cycle < 14 {
            base + 8 * cycle
        } else {
            (cycle - 14) * 8
        };
        ((offset + x) / 2) as u8
    }

    /// Latch the position for a falling edge in `cycle` of raster line `y`.
    pub fn latch(
        &mut self,
        model: ChipModel,
        y: u16,
        cycle: u8,
        irq: &mut InterruptController,
        actions: &mut Actions,
    ) {
        if self.triggered {
            return;
        }
        if y == model.lines_per_frame() - 1 && cycle != 1 {
            return;
        }
        self.x = Self::x_position(model, cycle);
        self.y = y as u8;
        if !model.delayed_light_pen_irqs() {
            irq.trigger(IRQ_LIGHT_PEN, actions);
        }
        self.triggered = true;
    }

    /// Pen held low as a frame starts.
    pub fn frame_start(&mut self, model: ChipModel, irq: &mut InterruptController, actions: &mut Actions) {
        self.x = if model.is_pal() { 209 } else { 213 };
        self.y = 0;
        irq.trigger(IRQ_LIGHT_PEN, actions);
        self.triggered = true;
    }
}

impl Default for LightPen {
    fn default() -> Self {
        Self::new()
    }
}
