//! Read-only inspection of chip state.
//!
//! Queries never affect emulation state: no collision register is cleared,
//! no counter advances.

use std::collections::HashMap;
use std::fmt;

use crate::config::ChipModel;
use crate::registers::DisplayMode;

/// A dynamically-typed value for state queries.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    String(String),
    Array(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v:#04X}"),
            Value::U16(v) => write!(f, "{v:#06X}"),
            Value::U32(v) => write!(f, "{v:#010X}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                let mut keys: Vec<_> = map.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, k) in keys.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {}", map[k])?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// A component whose state can be inspected.
pub trait Observable {
    /// Query a property by dotted path, e.g. `raster.line` or
    /// `sprite.3.x`. Returns `None` for unknown paths.
    fn query(&self, path: &str) -> Option<Value>;

    /// Every path `query` understands, sprite paths for sprite 0 only
    /// standing in for all eight.
    fn query_paths(&self) -> &'static [&'static str];
}

/// Border and display window in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreenGeometry {
    pub frame_width: u16,
    pub frame_height: u16,
    pub first_visible_line: u16,
    pub visible_lines: u16,
    /// X comparison values currently selected by CSEL.
    pub left: u16,
    pub right: u16,
    /// Raster comparison values currently selected by RSEL.
    pub upper: u16,
    pub lower: u16,
}

/// Snapshot of one sprite unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpriteInfo {
    pub index: u8,
    pub enabled: bool,
    pub x: u16,
    pub y: u8,
    pub color: u8,
    pub multicolor: bool,
    pub expand_x: bool,
    pub expand_y: bool,
    /// Behind foreground graphics.
    pub behind: bool,
    pub dma: bool,
    pub display: bool,
    pub mc: u8,
    pub mcbase: u8,
    /// Address of the 64-byte data block.
    pub data_address: u16,
}

/// Snapshot of the whole chip.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VicInfo {
    pub model: ChipModel,
    pub raster_line: u16,
    pub raster_cycle: u8,
    pub x_counter: u16,
    pub bad_line: bool,
    pub display_state: bool,
    pub ba_low: bool,
    pub display_mode: DisplayMode,
    pub border_color: u8,
    pub background_colors: [u8; 4],
    pub geometry: ScreenGeometry,
    pub x_scroll: u8,
    pub y_scroll: u8,
    pub main_border: bool,
    pub vertical_border: bool,
    /// Bank base address (0, $4000, $8000, $C000).
    pub bank: u16,
    pub screen_address: u16,
    pub charset_address: u16,
    pub bitmap_address: u16,
    pub vc: u16,
    pub rc: u8,
    pub irr: u8,
    pub imr: u8,
    pub raster_irq_line: u16,
    pub irq: bool,
}
