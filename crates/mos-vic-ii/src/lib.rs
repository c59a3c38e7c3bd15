//! MOS 6567/6569 VIC-II video chip emulator.
//!
//! Cycle-exact model of the Commodore 64 video chip and its HMOS-II
//! successors (8562/8565): raster counters, the per-cycle memory access
//! schedule, bad lines, border flip-flops, the graphics sequencer, eight
//! sprite units, collision and priority mixing, raster and light-pen
//! interrupts. A DMA trace can record every memory access for a debug
//! overlay.
//!
//! The chip owns no memory. Every access goes through a [`VideoBus`]
//! supplied to [`Vic::tick`]; the CPU is stalled through the returned BA
//! state, and the host polls [`Vic::irq_active`].
//!
//! # Supported models
//!
//! | Model | Standard | Cycles | Lines |
//! |-------|----------|--------|-------|
//! | 6569R1, 6569R3, 8565 | PAL | 63 | 312 |
//! | 6567R56A | NTSC | 64 | 262 |
//! | 6567R8, 8562 | NTSC | 65 | 263 |
//!
//! ```
//! use mos_vic_ii::{ChipModel, FlatVideoMemory, Vic};
//!
//! let mut vic = Vic::with_model(ChipModel::Pal6569R3);
//! let mut memory = FlatVideoMemory::new();
//! assert_eq!(vic.run_frame(&mut memory), 19_656);
//! assert_eq!(vic.framebuffer().len(), 504 * 312);
//! ```

pub mod border;
pub mod bus;
#[cfg(feature = "png")]
pub mod capture;
pub mod config;
pub mod display;
pub mod frame;
pub mod irq;
pub mod mixer;
pub mod observe;
pub mod overlay;
pub mod palette;
pub mod registers;
pub mod sequencer;
pub mod sprite;
pub mod timing;
mod vic;

pub use bus::{FlatVideoMemory, VideoBus};
pub use config::{ChipModel, ConfigError, NTSC_CLOCK_FREQUENCY, PAL_CLOCK_FREQUENCY, VicConfig};
pub use observe::{Observable, ScreenGeometry, SpriteInfo, Value, VicInfo};
pub use overlay::{AccessKind, DmaTrace, OverlayConfig};
pub use palette::PaletteKind;
pub use registers::DisplayMode;
pub use vic::Vic;
