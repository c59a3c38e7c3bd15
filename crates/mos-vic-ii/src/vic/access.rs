//! Memory accesses: p, s, r, i, c and g.

use super::Vic;
use crate::bus::{VideoBus, is_char_rom};
use crate::display::DisplayUnit;
use crate::overlay::{AccessKind, Half};
use crate::registers::{CTRL1_BMM, CTRL1_ECM};
use crate::timing::{Access, SpriteFetch};

impl Vic {
    fn fetch(&self, bus: &mut impl VideoBus, address: u16) -> u8 {
        bus.read(self.bank | (address & 0x3FFF))
    }

    pub(super) fn record_access(&mut self, half: Half, kind: AccessKind, data: u8) {
        if let Some(trace) = self.trace.as_mut() {
            trace.record(self.line, self.cycle, half, kind, data);
        }
    }

    pub(super) fn phi1_access(&mut self, access: Access, bus: &mut impl VideoBus) {
        let (kind, data) = match access {
            Access::Pointer(n) => (AccessKind::Pointer, self.p_access(n, bus)),
            Access::SpriteData(n) => self.s_access_2(n, bus),
            Access::Refresh => {
                let address = self.display.next_refresh();
                (AccessKind::Refresh, self.fetch(bus, address))
            }
            Access::Idle => (AccessKind::Idle, self.fetch(bus, 0x3FFF)),
            Access::Graphics => (AccessKind::Graphics, self.g_access(bus)),
        };
        self.record_access(Half::Phi1, kind, data);
    }

    /// Second-phase sprite access. Returns the byte if memory was read.
    pub(super) fn sprite_fetch(&mut self, fetch: SpriteFetch, bus: &mut impl VideoBus) -> Option<u8> {
        match fetch {
            SpriteFetch::First(n) => self.s_access_1(n, bus),
            SpriteFetch::Third(n) => self.s_access_3(n, bus),
        }
    }

    fn p_access(&mut self, n: u8, bus: &mut impl VideoBus) -> u8 {
        let address = u16::from(self.mem_select & 0xF0) << 6 | 0x3F8 | u16::from(n);
        let pointer = self.fetch(bus, address);
        self.sprites.units[usize::from(n)].pointer = u16::from(pointer) << 6;
        pointer
    }

    fn s_access_1(&mut self, n: u8, bus: &mut impl VideoBus) -> Option<u8> {
        let bit = 1 << n;
        let index = usize::from(n);
        self.sprites.first_dma = bit;
        let mut read = None;
        if self.sprites.dma & bit != 0 {
            if self.ba.bus_granted() {
                self.data_bus = self.fetch(bus, self.sprites.units[index].data_address());
                read = Some(self.data_bus);
            }
            self.sprites.units[index].advance();
        }
        self.sprites.units[index].chunks[0] = self.data_bus;
        read
    }

    fn s_access_2(&mut self, n: u8, bus: &mut impl VideoBus) -> (AccessKind, u8) {
        let bit = 1 << n;
        let index = usize::from(n);
        self.sprites.first_dma = 0;
        self.sprites.second_dma = bit;
        let (kind, data) = if self.sprites.dma & bit != 0 {
            let data = self.fetch(bus, self.sprites.units[index].data_address());
            self.sprites.units[index].advance();
            (AccessKind::Sprite, data)
        } else {
            (AccessKind::Idle, self.fetch(bus, 0x3FFF))
        };
        self.sprites.units[index].chunks[1] = data;
        (kind, data)
    }

    fn s_access_3(&mut self, n: u8, bus: &mut impl VideoBus) -> Option<u8> {
        let bit = 1 << n;
        let index = usize::from(n);
        let mut read = None;
        if self.sprites.dma & bit != 0 {
            self.data_bus = self.fetch(bus, self.sprites.units[index].data_address());
            self.sprites.units[index].advance();
            read = Some(self.data_bus);
        }
        self.sprites.units[index].chunks[2] = self.data_bus;
        read
    }

    /// Second-phase video matrix and colour RAM read of a bad line.
    pub(super) fn c_access(&mut self, bus: &mut impl VideoBus) {
        let (character, color) = if self.ba.bus_granted() {
            let character = self.fetch(bus, self.display.matrix_address(self.mem_select));
            (character, bus.color_ram(self.display.vc) & 0x0F)
        } else {
            (0xFF, bus.cpu_bus() & 0x0F)
        };
        self.display.store_matrix(character, color);
        self.record_access(Half::Phi2, AccessKind::Character, character);
    }

    fn g_access(&mut self, bus: &mut impl VideoBus) -> u8 {
        if !self.display.display_state {
            let ctrl1 = if self.config.model.is_856x() {
                self.regs.delayed.ctrl1
            } else {
                self.regs.current.ctrl1
            };
            let data = self.fetch(bus, DisplayUnit::idle_address(ctrl1));
            self.display.commit_idle(data);
            return data;
        }

        let address = if self.config.model.is_856x() {
            self.display
                .graphics_address(self.mem_select, self.regs.delayed.ctrl1)
        } else {
            self.mixed_graphics_address()
        };
        let data = self.fetch(bus, address);
        self.display.commit_graphics(data);
        data
    }

    /// On the 656x a BMM change reaches the address lines in two steps:
    /// a set BMM bit applies at once, a cleared one a cycle later, and
    /// switching from bitmap into the character ROM keeps the low byte
    /// of the bitmap address.
    fn mixed_graphics_address(&self) -> u16 {
        let old = self.regs.delayed.ctrl1;
        let new = self.regs.current.ctrl1;
        let mixed = ((old | new) & CTRL1_BMM) | (new & CTRL1_ECM);
        let address = self.display.graphics_address(self.mem_select, mixed);
        if (old ^ new) & CTRL1_BMM == 0 {
            return address;
        }
        let previous = self.display.graphics_address(self.mem_select, old);
        if is_char_rom(self.bank | address) && !is_char_rom(self.bank | previous) {
            (address & 0x3F00) | (previous & 0x00FF)
        } else {
            address
        }
    }
}
