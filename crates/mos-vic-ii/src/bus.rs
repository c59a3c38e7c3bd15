//! The VIC-II side of the shared system bus.
//!
//! The chip addresses 16K of memory through 14 address lines; the two
//! upper bits come from the bank select supplied by the host (CIA 2 on a
//! C64). Every access goes through [`VideoBus`], so the chip owns no RAM
//! and can be driven in isolation.

/// Memory as seen by the VIC-II.
pub trait VideoBus {
    /// Read a byte. `address` already carries the bank bits (bank | 14-bit
    /// chip address). Character ROM mapping is up to the implementor.
    fn read(&mut self, address: u16) -> u8;

    /// Read colour RAM. Only the low nibble is meaningful.
    fn color_ram(&mut self, index: u16) -> u8;

    /// Value floating on the CPU data bus. c-accesses made before BA has
    /// been low for three cycles see this instead of colour RAM.
    fn cpu_bus(&self) -> u8 {
        0xFF
    }
}

/// Character ROM is visible at $1000-$1FFF and $9000-$9FFF.
#[must_use]
pub const fn is_char_rom(address: u16) -> bool {
    matches!(address >> 12, 0x1 | 0x9)
}

/// The BA (bus available) output and how long it has been held low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BaLine {
    low: bool,
    low_cycles: u8,
}

impl BaLine {
    /// Drive the line for the current cycle.
    pub fn update(&mut self, pull_low: bool) {
        if pull_low {
            if self.low {
                self.low_cycles = self.low_cycles.saturating_add(1);
            } else {
                self.low = true;
                self.low_cycles = 0;
            }
        } else {
            self.low = false;
            self.low_cycles = 0;
        }
    }

    #[must_use]
    pub const fn is_low(&self) -> bool {
        self.low
    }

    /// The CPU has released the bus: BA went low at least three cycles ago.
    #[must_use]
    pub const fn bus_granted(&self) -> bool {
        self.low && self.low_cycles >= 3
    }
}

/// Flat 64K RAM, 1K colour RAM and an optional 4K character ROM.
///
/// A reference [`VideoBus`] for tests and simple hosts.
pub struct FlatVideoMemory {
    ram: Vec<u8>,
    color: Vec<u8>,
    char_rom: Option<Vec<u8>>,
    cpu_data: u8,
}

impl FlatVideoMemory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: vec![0; 0x1_0000],
            color: vec![0; 0x400],
            char_rom: None,
            cpu_data: 0xFF,
        }
    }

    /// Map a character ROM image at $1000/$9000. Shorter images are padded
    /// with zeros; longer ones are truncated to 4K.
    #[must_use]
    pub fn with_char_rom(mut self, rom: &[u8]) -> Self {
        let mut image = vec![0; 0x1000];
        let len = rom.len().min(image.len());
        image[..len].copy_from_slice(&rom[..len]);
        self.char_rom = Some(image);
        self
    }

    pub fn ram_write(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address)] = value;
    }

    #[must_use]
    pub fn ram_read(&self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    /// Copy `data` into RAM starting at `address`, wrapping at 64K.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        for (offset, &byte) in data.iter().enumerate() {
            let addr = address.wrapping_add(offset as u16);
            self.ram[usize::from(addr)] = byte;
        }
    }

    pub fn color_write(&mut self, index: u16, value: u8) {
        self.color[usize::from(index & 0x3FF)] = value & 0x0F;
    }

    pub fn set_cpu_bus(&mut self, value: u8) {
        self.cpu_data = value;
    }
}

impl Default for FlatVideoMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoBus for FlatVideoMemory {
    fn read(&mut self, address: u16) -> u8 {
        match &self.char_rom {
            Some(rom) if is_char_rom(address) => rom[usize::from(address & 0x0FFF)],
            _ => self.ram[usize::from(address)],
        }
    }

    fn color_ram(&mut self, index: u16) -> u8 {
        self.color[usize::from(index & 0x3FF)]
    }

    fn cpu_bus(&self) -> u8 {
        self.cpu_data
    }
}
