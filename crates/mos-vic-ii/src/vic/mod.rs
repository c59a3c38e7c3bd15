//! The per-cycle state machine.
//!
//! One call to [`Vic::tick`] executes one system clock cycle: the first
//! phase access from the model's slot table, the second phase sprite and
//! character accesses, eight pixels of output, and the border, sprite,
//! counter and interrupt logic tied to that cycle. Effects that the
//! hardware shows one cycle late are queued as [`Actions`] and applied in
//! one place at the end of the cycle.
//!
//! # Cycle numbering
//!
//! Cycles are numbered 1..=N within a line, N being 63 (PAL), 64
//! (6567R56A) or 65 (6567R8/8562). The raster counter advances in cycle 1,
//! except for line 0, where it resets in cycle 2.

mod access;
mod io;
mod observable;

use crate::border::{BorderUnit, LEFT_CHECKS, RIGHT_CHECKS};
use crate::bus::{BaLine, VideoBus};
use crate::config::{ChipModel, ConfigError, VicConfig};
use crate::display::{DisplayUnit, FIRST_BAD_LINE};
use crate::frame::PixelSink;
use crate::irq::{InterruptController, LightPen};
use crate::mixer::Mixer;
use crate::overlay::{AccessKind, DmaTrace, Half, LineMarks, OverlayConfig};
use crate::palette;
use crate::registers::{Actions, RegisterFile, RegisterPipe, color};
use crate::sequencer::{CanvasContext, Sequencer};
use crate::sprite::SpriteEngine;
use crate::timing::{self, BaRequest, Slot};

/// First and last cycle that produce visible pixels.
const FIRST_DRAW_CYCLE: u8 = 14;
const LAST_DRAW_CYCLE: u8 = 61;

/// MOS 6567/6569/856x VIC-II.
pub struct Vic {
    config: VicConfig,
    slots: &'static [Slot],
    palette: [u32; 16],

    regs: RegisterPipe<RegisterFile>,
    /// $D018.
    mem_select: u8,
    actions: Actions,

    /// Line of the next cycle (0-based).
    line: u16,
    /// Next cycle to execute (1-based).
    cycle: u8,
    /// Raster counter as compared and read back through $D011/$D012.
    y: u16,
    x_counter: u16,
    vblank: bool,

    display: DisplayUnit,
    border: BorderUnit,
    sequencer: Sequencer,
    sprites: SpriteEngine,
    mixer: Mixer,
    irq: InterruptController,
    light_pen: LightPen,
    ba: BaLine,

    /// Bank base address: $0000, $4000, $8000 or $C000.
    bank: u16,
    pending_bank: u16,
    /// Data left on the bus by the second clock phase.
    data_bus: u8,

    frame: PixelSink,
    frame_complete: bool,
    frame_count: u64,
    trace: Option<DmaTrace>,
}

impl Vic {
    /// Build a chip from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a palette adjustment is out of range.
    pub fn new(config: VicConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        log::debug!(
            "VIC-II {}: {} cycles x {} lines, {:.3} Hz",
            config.model,
            config.model.cycles_per_line(),
            config.model.lines_per_frame(),
            config.model.frames_per_second()
        );
        Ok(Self::power_up(config))
    }

    /// A chip of `model` with default settings.
    #[must_use]
    pub fn with_model(model: ChipModel) -> Self {
        Self::power_up(VicConfig::new(model))
    }

    fn power_up(config: VicConfig) -> Self {
        let model = config.model;
        let palette = palette::palette(
            model,
            config.palette,
            config.brightness,
            config.contrast,
            config.saturation,
        );
        Self {
            slots: timing::slots(model),
            palette,
            regs: RegisterPipe::new(RegisterFile::power_up()),
            mem_select: 0x10,
            actions: Actions::NONE,
            line: 0,
            cycle: 1,
            y: model.lines_per_frame(),
            x_counter: (u16::from(model.cycles_per_line()) - 14) * 8,
            vblank: model.is_vblank_line(0),
            display: DisplayUnit::new(),
            border: BorderUnit::new(),
            sequencer: Sequencer::new(),
            sprites: SpriteEngine::new(model.is_656x()),
            mixer: Mixer::new(),
            irq: InterruptController::default(),
            light_pen: LightPen::new(),
            ba: BaLine::default(),
            bank: 0,
            pending_bank: 0,
            data_bus: 0xFF,
            frame: PixelSink::new(
                usize::from(model.pixels_per_line()),
                usize::from(model.lines_per_frame()),
            ),
            frame_complete: false,
            frame_count: 0,
            trace: config.dma_trace.then(|| {
                DmaTrace::new(
                    usize::from(model.cycles_per_line()),
                    usize::from(model.lines_per_frame()),
                )
            }),
            config,
        }
    }

    /// Hard reset. Restores power-up state and keeps the configuration.
    pub fn reset(&mut self) {
        log::debug!("VIC-II {} reset", self.config.model);
        *self = Self::power_up(self.config.clone());
    }

    /// Run one cycle. Returns the state of BA: `true` asks the CPU to stop
    /// before its next read.
    pub fn tick(&mut self, bus: &mut impl VideoBus) -> bool {
        let cycle = self.cycle;
        let slot = self.slots[usize::from(cycle - 1)];

        if cycle == 1 {
            self.begin_line();
        }
        if cycle == 2 && self.line == 0 {
            if !self.light_pen.line {
                self.light_pen
                    .frame_start(self.config.model, &mut self.irq, &mut self.actions);
            }
            self.y = 0;
            self.irq.check_raster(0, &mut self.actions);
        }

        if let Some(data) = slot.before.and_then(|fetch| self.sprite_fetch(fetch, bus)) {
            self.record_access(Half::EarlyPhi2, AccessKind::Sprite, data);
        }

        self.check_border(cycle);

        if cycle == 18 {
            self.sequencer.can_load = true;
        }

        self.draw(cycle);

        if cycle == 57 {
            self.sequencer.can_load = false;
        }
        if slot.finalize {
            self.sprites.second_dma = 0;
        }

        self.phi1_access(slot.access, bus);

        if cycle == 1 {
            self.irq.check_raster(self.y, &mut self.actions);
        }

        self.sprite_logic(cycle);

        match cycle {
            14 => self.display.start_row(),
            58 => self.display.finish_row(),
            _ => {}
        }

        let pull_low = match slot.ba {
            BaRequest::Release => false,
            BaRequest::BadLine => self.display.bad_line,
            BaRequest::Sprites(mask) => self.sprites.dma & mask != 0,
        };
        self.ba.update(pull_low);

        if slot.char_access && self.display.bad_line {
            self.c_access(bus);
        }
        if cycle == 15 {
            self.sprites.cleared_expansion = 0;
        }

        if let Some(data) = slot.after.and_then(|fetch| self.sprite_fetch(fetch, bus)) {
            self.record_access(Half::Phi2, AccessKind::Sprite, data);
        }

        self.end_cycle(cycle);
        self.ba.is_low()
    }

    /// Run until the current frame completes. Returns the cycles executed.
    pub fn run_frame(&mut self, bus: &mut impl VideoBus) -> u32 {
        let mut cycles = 0;
        loop {
            self.tick(bus);
            cycles += 1;
            if self.take_frame_complete() {
                return cycles;
            }
        }
    }

    fn begin_line(&mut self) {
        let model = self.config.model;
        if self.line == 0 {
            self.display.begin_frame();
            self.light_pen.triggered = false;
        }
        self.border.set_cond = false;
        self.vblank = model.is_vblank_line(self.line);
        if self.line != 0 {
            self.y += 1;
        }
        if self.line == FIRST_BAD_LINE {
            self.display.den_in_line_30 = self.regs.current.den();
        }
        self.update_bad_line(self.regs.current.ctrl1);
    }

    fn update_bad_line(&mut self, ctrl1: u8) {
        self.display.bad_line = self.display.bad_line_condition(self.y, ctrl1);
        if self.display.bad_line {
            self.actions.insert(Actions::SET_DISPLAY_STATE);
        }
    }

    fn check_border(&mut self, cycle: u8) {
        self.border
            .check_vertical(self.y, self.regs.current.den(), &mut self.actions);
        if cycle == 1 {
            self.border.apply_set_cond(&mut self.actions);
        }
        for (check_cycle, x) in LEFT_CHECKS {
            if cycle == check_cycle {
                self.border.check_left(x, &mut self.actions);
            }
        }
        for (check_cycle, x) in RIGHT_CHECKS {
            if cycle == check_cycle {
                self.border.check_right(x, &mut self.actions);
            }
        }
    }

    fn draw(&mut self, cycle: u8) {
        let model = self.config.model;
        let visible = !self.vblank && (FIRST_DRAW_CYCLE..=LAST_DRAW_CYCLE).contains(&cycle);

        self.mixer.begin_chunk();
        if visible {
            self.draw_canvas(cycle);
        } else {
            for index in color::BORDER..=color::BACKGROUND_3 {
                self.regs.delayed.colors[index] = self.regs.current.colors[index];
            }
        }

        if self.sprites.needs_drawing(cycle) {
            self.sprites.draw(
                &mut self.regs,
                self.x_counter,
                model.is_856x(),
                self.config.hide_sprites,
                &mut self.mixer,
            );
        }

        let sources = self.mixer.check_collisions(
            self.config.sprite_sprite_collisions,
            self.config.sprite_background_collisions,
        );
        if sources != 0 {
            self.irq.trigger(sources, &mut self.actions);
        }

        if visible {
            self.frame.write_chunk(
                usize::from(self.line),
                usize::from(cycle - 1) * 8,
                self.mixer.colors(),
                &self.palette,
            );
        }
    }

    fn draw_canvas(&mut self, cycle: u8) {
        let ctx = CanvasContext {
            g_access: self.display.pipe.delayed(),
            vertical_border: self.border.flops.delayed.vertical,
            old_chip: self.config.model.is_656x(),
        };
        self.sequencer.draw(&mut self.regs, &ctx, &mut self.mixer);

        if let Some((first, last)) = self.border.span(cycle) {
            let delayed = self.regs.delayed.colors[color::BORDER];
            let current = self.regs.current.colors[color::BORDER];
            for pixel in first..=last {
                let border = if pixel == 0 || first == 7 { delayed } else { current };
                self.mixer.border(pixel, border);
            }
        }
        self.regs.delayed.colors[color::BORDER] = self.regs.current.colors[color::BORDER];
    }

    fn sprite_logic(&mut self, cycle: u8) {
        match cycle {
            16 => self.sprites.dma_off(),
            55 => self.sprites.dma_on(&self.regs.current, self.y),
            56 => {
                self.sprites.dma_on(&self.regs.current, self.y);
                self.sprites
                    .toggle_expansion(self.regs.current.sprite_expand_y);
            }
            58 => {
                self.sprites.display_delayed = self.sprites.display;
                self.sprites.turn_display(&self.regs.current, self.y);
            }
            59 => self.sprites.display_delayed = self.sprites.display,
            _ => {}
        }
    }

    fn end_cycle(&mut self, cycle: u8) {
        let model = self.config.model;

        self.data_bus = 0xFF;
        self.x_counter = if cycle == 14 { 0 } else { self.x_counter + 8 };
        self.display.pipe.shift();

        let pending = self.actions.take();
        self.apply(pending, cycle);

        if cycle == model.cycles_per_line() {
            self.border.apply_set_cond(&mut self.actions);
            if let Some(trace) = self.trace.as_mut() {
                let marks = LineMarks {
                    raster_irq: self.y == self.irq.raster_compare,
                    bad_line: self.display.bad_line,
                };
                trace.mark_line(self.line, marks);
            }
            if self.line == model.lines_per_frame() - 1 {
                self.end_frame();
                self.line = 0;
            } else {
                self.line += 1;
            }
            self.cycle = 1;
        } else {
            self.cycle += 1;
        }
    }

    fn apply(&mut self, pending: Actions, cycle: u8) {
        if pending.is_empty() {
            return;
        }
        if pending.contains(Actions::UPDATE_REGISTERS) {
            self.regs.commit();
        }
        if pending.contains(Actions::UPDATE_FLIPFLOPS) {
            self.border.flops.commit();
        }
        if pending.contains(Actions::SET_DISPLAY_STATE) {
            self.display.display_state |= self.display.bad_line;
        }
        if pending.contains(Actions::UPDATE_BANK) {
            self.bank = self.pending_bank;
        }
        if pending.contains(Actions::CLEAR_SPRITE_SPRITE) {
            self.mixer.sprite_sprite = 0;
        }
        if pending.contains(Actions::CLEAR_SPRITE_BACKGROUND) {
            self.mixer.sprite_background = 0;
        }
        if pending.contains(Actions::LP_TRANSITION) {
            self.light_pen.latch(
                self.config.model,
                self.y,
                cycle,
                &mut self.irq,
                &mut self.actions,
            );
        }
        if pending.contains(Actions::UPDATE_IRQ_LINE) {
            self.irq.update_output();
        }
    }

    fn end_frame(&mut self) {
        self.frame.swap();
        if let Some(trace) = self.trace.as_mut() {
            trace.swap();
        }
        self.frame_complete = true;
        self.frame_count += 1;
        log::trace!("VIC-II frame {} complete", self.frame_count);
    }

    /// IRQ output.
    #[must_use]
    pub fn irq_active(&self) -> bool {
        self.irq.output
    }

    /// BA as driven in the last cycle.
    #[must_use]
    pub fn ba_low(&self) -> bool {
        self.ba.is_low()
    }

    /// Drive the light-pen input (`false` = pressed/low).
    pub fn set_light_pen(&mut self, high: bool) {
        self.light_pen.set_line(high, &mut self.actions);
    }

    /// Select the 16K bank (0-3) the chip addresses. Takes effect at the
    /// end of the next cycle.
    pub fn set_bank(&mut self, bank: u8) {
        self.pending_bank = u16::from(bank & 0x03) << 14;
        self.actions.insert(Actions::UPDATE_BANK);
    }

    /// Active bank (0-3).
    #[must_use]
    pub fn bank(&self) -> u8 {
        (self.bank >> 14) as u8
    }

    /// The last complete frame, ARGB32.
    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        self.frame.stable()
    }

    /// Access record, present if the chip was built with a DMA trace.
    #[must_use]
    pub fn dma_trace(&self) -> Option<&DmaTrace> {
        self.trace.as_ref()
    }

    /// The last complete frame with the DMA trace drawn over it. Without
    /// a trace this is a copy of [`Vic::framebuffer`].
    #[must_use]
    pub fn debug_framebuffer(&self, overlay: &OverlayConfig) -> Vec<u32> {
        let mut frame = self.frame.stable().to_vec();
        if let Some(trace) = &self.trace {
            trace.compose(&mut frame, overlay, &self.palette);
        }
        frame
    }

    /// Framebuffer width: 8 pixels per cycle of a line.
    #[must_use]
    pub fn framebuffer_width(&self) -> u32 {
        self.frame.width() as u32
    }

    #[must_use]
    pub fn framebuffer_height(&self) -> u32 {
        self.frame.height() as u32
    }

    /// Check and clear the frame-complete flag.
    pub fn take_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Line of the next cycle.
    #[must_use]
    pub fn raster_line(&self) -> u16 {
        self.line
    }

    /// Next cycle to execute, 1-based.
    #[must_use]
    pub fn raster_cycle(&self) -> u8 {
        self.cycle
    }

    /// Raster counter as read through $D011/$D012.
    #[must_use]
    pub fn raster_counter(&self) -> u16 {
        self.y
    }

    #[must_use]
    pub fn x_counter(&self) -> u16 {
        self.x_counter
    }

    #[must_use]
    pub fn is_badline(&self) -> bool {
        self.display.bad_line
    }

    #[must_use]
    pub fn display_state(&self) -> bool {
        self.display.display_state
    }

    #[must_use]
    pub fn model(&self) -> ChipModel {
        self.config.model
    }

    #[must_use]
    pub fn config(&self) -> &VicConfig {
        &self.config
    }

    /// ARGB32 values of the sixteen colours.
    #[must_use]
    pub fn palette(&self) -> &[u32; 16] {
        &self.palette
    }
}

impl Default for Vic {
    fn default() -> Self {
        Self::power_up(VicConfig::default())
    }
}
