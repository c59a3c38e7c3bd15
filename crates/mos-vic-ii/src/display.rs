//! Bad line controller and the video matrix counters.
//!
//! VC/VCBASE address the 1000-byte video matrix, RC selects the pixel row
//! within a character, VMLI indexes the 40 cached c-access results. The
//! refresh counter drives the five r-accesses per line.

use crate::registers::{CTRL1_BMM, CTRL1_DEN, CTRL1_ECM};

/// First and last raster line that can be a bad line.
pub const FIRST_BAD_LINE: u16 = 0x30;
pub const LAST_BAD_LINE: u16 = 0xF7;

/// g-access results, read back two cycles after the fetch.
///
/// Each entry packs graphics data in bits 0-7, the colour nibble in bits
/// 8-15 and the character code in bits 16-23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphicsPipe {
    stages: [u32; 3],
}

impl GraphicsPipe {
    pub fn write(&mut self, value: u32) {
        self.stages[0] = value;
    }

    /// Advance one cycle.
    pub fn shift(&mut self) {
        self.stages[2] = self.stages[1];
        self.stages[1] = self.stages[0];
    }

    /// The value the shift register loads from.
    #[must_use]
    pub const fn delayed(&self) -> u32 {
        self.stages[2]
    }
}

/// Display/idle state, bad lines and the counters behind c- and g-accesses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayUnit {
    pub vc: u16,
    pub vc_base: u16,
    pub rc: u8,
    pub vmli: u8,
    pub refresh: u8,
    pub display_state: bool,
    pub bad_line: bool,
    /// DEN was seen set at some cycle of line $30.
    pub den_in_line_30: bool,
    pub video_matrix: [u8; 64],
    pub color_line: [u8; 64],
    pub pipe: GraphicsPipe,
}

impl DisplayUnit {
    #[must_use]
    pub fn new() -> Self {
        Self {
            vc: 0,
            vc_base: 0,
            rc: 0,
            vmli: 0,
            refresh: 0xFF,
            display_state: false,
            bad_line: false,
            den_in_line_30: false,
            video_matrix: [0; 64],
            color_line: [0; 64],
            pipe: GraphicsPipe::default(),
        }
    }

    pub fn begin_frame(&mut self) {
        self.refresh = 0xFF;
        self.vc_base = 0;
    }

    /// Evaluate the bad line condition for raster `y` and control 1.
    #[must_use]
    pub const fn bad_line_condition(&self, y: u16, ctrl1: u8) -> bool {
        y >= FIRST_BAD_LINE
            && y <= LAST_BAD_LINE
            && (y & 7) == (ctrl1 & 7) as u16
            && self.den_in_line_30
    }

    /// Latch DEN while the raster is in line $30.
    pub fn observe_den(&mut self, line: u16, ctrl1: u8) {
        if line == FIRST_BAD_LINE && ctrl1 & CTRL1_DEN != 0 {
            self.den_in_line_30 = true;
        }
    }

    /// Cycle 14: VCBASE->VC, clear VMLI, and RC on a bad line.
    pub fn start_row(&mut self) {
        self.vc = self.vc_base;
        self.vmli = 0;
        if self.bad_line {
            self.rc = 0;
        }
    }

    /// Cycle 58: idle after the eighth row, then advance RC.
    pub fn finish_row(&mut self) {
        if self.rc == 7 {
            self.display_state = self.bad_line;
            self.vc_base = self.vc;
        }
        if self.display_state {
            self.rc = (self.rc + 1) & 7;
        }
    }

    /// Address of the next r-access; the counter counts down.
    pub fn next_refresh(&mut self) -> u16 {
        let addr = 0x3F00 | u16::from(self.refresh);
        self.refresh = self.refresh.wrapping_sub(1);
        addr
    }

    /// c-access address for memory pointer register `mem_select`.
    #[must_use]
    pub const fn matrix_address(&self, mem_select: u8) -> u16 {
        ((mem_select & 0xF0) as u16) << 6 | self.vc
    }

    pub fn store_matrix(&mut self, character: u8, color: u8) {
        let slot = usize::from(self.vmli);
        self.video_matrix[slot] = character;
        self.color_line[slot] = color & 0x0F;
    }

    /// g-access address in display state for the given mode bits.
    #[must_use]
    pub const fn graphics_address(&self, mem_select: u8, ctrl1: u8) -> u16 {
        let addr = if ctrl1 & CTRL1_BMM != 0 {
            ((mem_select & 0x08) as u16) << 10 | self.vc << 3 | self.rc as u16
        } else {
            ((mem_select & 0x0E) as u16) << 10
                | (self.video_matrix[self.vmli as usize] as u16) << 3
                | self.rc as u16
        };
        if ctrl1 & CTRL1_ECM != 0 {
            addr & 0xF9FF
        } else {
            addr
        }
    }

    /// g-access address in idle state.
    #[must_use]
    pub const fn idle_address(ctrl1: u8) -> u16 {
        if ctrl1 & CTRL1_ECM != 0 { 0x39FF } else { 0x3FFF }
    }

    /// Push a display-state g-access result and step VC/VMLI.
    pub fn commit_graphics(&mut self, data: u8) {
        let slot = usize::from(self.vmli);
        self.pipe.write(
            u32::from(data)
                | u32::from(self.color_line[slot]) << 8
                | u32::from(self.video_matrix[slot]) << 16,
        );
        self.vc = (self.vc + 1) & 0x3FF;
        self.vmli = (self.vmli + 1) & 0x3F;
    }

    /// Push an idle-state g-access result.
    pub fn commit_idle(&mut self, data: u8) {
        self.pipe.write(u32::from(data));
    }
}

impl Default for DisplayUnit {
    fn default() -> Self {
        Self::new()
    }
}
