//! Per-cycle memory access schedule.
//!
//! Every rasterline cycle performs exactly one first-phase (phi1) access.
//! Sprite data accesses 1 and 3 happen in the second phase (phi2); they are
//! listed either as `before` (phi2 of the previous cycle, executed at the
//! start of this one) or `after` (phi2 of this cycle). The BA request says
//! which condition pulls BA low at the end of the cycle.
//!
//! # PAL (6569, 8565): 63 cycles
//!
//! ```text
//! cycle  1  3  5  7  9 11    14 15 16        55 56 57 58 59 60 61 62 63
//!        p3 p4 p5 p6 p7 r r r r  r  g ... g  g  i  i  p0 s0 p1 s1 p2 s2
//! ```
//!
//! # NTSC (6567R8, 8562): 65 cycles
//!
//! Sprite fetches run two cycles later than on PAL, with three idle
//! accesses after the display window.
//!
//! # NTSC (6567R56A): 64 cycles
//!
//! Cycles 1-11 follow PAL and cycles 12-64 follow the 65-cycle NTSC table,
//! so sprites 0-2 are fetched as on the 6567R8 and sprites 3-7 as on PAL.

use crate::config::ChipModel;

use self::Access::{Graphics, Idle, Pointer, Refresh, SpriteData};
use self::BaRequest::{BadLine, Release, Sprites};
use self::SpriteFetch::{First, Third};

/// A second-phase sprite data access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteFetch {
    /// s-access 1 of sprite n.
    First(u8),
    /// s-access 3 of sprite n.
    Third(u8),
}

/// The first-phase access of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Access {
    /// p-access: sprite pointer of sprite n.
    Pointer(u8),
    /// s-access 2 of sprite n.
    SpriteData(u8),
    /// r-access: DRAM refresh.
    Refresh,
    /// i-access: idle read of $3FFF.
    Idle,
    /// g-access: graphics data.
    Graphics,
}

/// What pulls the BA line low in a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaRequest {
    Release,
    /// Low while a bad line condition holds.
    BadLine,
    /// Low if DMA is on for any sprite in the mask.
    Sprites(u8),
}

/// Everything the scheduler does in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub before: Option<SpriteFetch>,
    /// End the sprite's second DMA cycle before this cycle's fetch.
    pub finalize: bool,
    pub access: Access,
    /// c-access in the second phase if the line is a bad line.
    pub char_access: bool,
    pub after: Option<SpriteFetch>,
    pub ba: BaRequest,
}

impl Slot {
    const fn new(access: Access, ba: BaRequest) -> Self {
        Self {
            before: None,
            finalize: false,
            access,
            char_access: false,
            after: None,
            ba,
        }
    }

    const fn before(mut self, fetch: SpriteFetch) -> Self {
        self.before = Some(fetch);
        self
    }

    const fn after(mut self, fetch: SpriteFetch) -> Self {
        self.after = Some(fetch);
        self
    }

    const fn finalize(mut self) -> Self {
        self.finalize = true;
        self
    }
}

const fn spr(mask: u8) -> BaRequest {
    Sprites(mask)
}

/// Refresh and display window slots shared by every model.
const fn window_slot(cycle: u8) -> Option<Slot> {
    let slot = match cycle {
        12..=15 => Slot::new(Refresh, BadLine),
        16..=54 => Slot::new(Graphics, BadLine),
        _ => return None,
    };
    Some(Slot {
        char_access: matches!(cycle, 15..=54),
        ..slot
    })
}

const fn pal_slot(cycle: u8) -> Slot {
    if let Some(slot) = window_slot(cycle) {
        return slot;
    }
    match cycle {
        1 => Slot::new(Pointer(3), spr(0x18)).before(Third(2)).finalize(),
        2 => Slot::new(SpriteData(3), spr(0x38)).before(First(3)),
        3 => Slot::new(Pointer(4), spr(0x30)).before(Third(3)).finalize(),
        4 => Slot::new(SpriteData(4), spr(0x70)).before(First(4)),
        5 => Slot::new(Pointer(5), spr(0x60)).before(Third(4)).finalize(),
        6 => Slot::new(SpriteData(5), spr(0xE0)).before(First(5)),
        7 => Slot::new(Pointer(6), spr(0xC0)).before(Third(5)).finalize(),
        8 => Slot::new(SpriteData(6), spr(0xC0)).before(First(6)),
        9 => Slot::new(Pointer(7), spr(0x80)).before(Third(6)).finalize(),
        10 => Slot::new(SpriteData(7), spr(0x80)).before(First(7)),
        11 => Slot::new(Refresh, Release).before(Third(7)).finalize(),
        55 => Slot::new(Graphics, spr(0x01)),
        56 => Slot::new(Idle, spr(0x01)),
        57 => Slot::new(Idle, spr(0x03)),
        58 => Slot::new(Pointer(0), spr(0x03)),
        59 => Slot::new(SpriteData(0), spr(0x07)).before(First(0)),
        60 => Slot::new(Pointer(1), spr(0x06)).before(Third(0)).finalize(),
        61 => Slot::new(SpriteData(1), spr(0x0E)).before(First(1)),
        62 => Slot::new(Pointer(2), spr(0x0C)).before(Third(1)).finalize(),
        _ => Slot::new(SpriteData(2), spr(0x1C)).before(First(2)),
    }
}

const fn ntsc_slot(cycle: u8) -> Slot {
    if let Some(slot) = window_slot(cycle) {
        return slot;
    }
    match cycle {
        1 => Slot::new(SpriteData(3), spr(0x38)).before(First(3)),
        2 => Slot::new(Pointer(4), spr(0x30)).before(Third(3)).finalize(),
        3 => Slot::new(SpriteData(4), spr(0x70)).before(First(4)),
        4 => Slot::new(Pointer(5), spr(0x60)).before(Third(4)).finalize(),
        5 => Slot::new(SpriteData(5), spr(0xE0)).before(First(5)),
        6 => Slot::new(Pointer(6), spr(0xC0)).before(Third(5)).finalize(),
        7 => Slot::new(SpriteData(6), spr(0xC0)).before(First(6)),
        8 => Slot::new(Pointer(7), spr(0x80)).before(Third(6)).finalize(),
        9 => Slot::new(SpriteData(7), spr(0x80)).before(First(7)),
        10 => Slot::new(Idle, Release).before(Third(7)).finalize(),
        11 => Slot::new(Refresh, Release),
        55 => Slot::new(Graphics, Release),
        56 => Slot::new(Idle, spr(0x01)),
        57 => Slot::new(Idle, spr(0x01)),
        58 => Slot::new(Idle, spr(0x03)),
        59 => Slot::new(Pointer(0), spr(0x03)),
        60 => Slot::new(SpriteData(0), spr(0x07))
            .before(First(0))
            .after(Third(0)),
        61 => Slot::new(Pointer(1), spr(0x06)).finalize(),
        62 => Slot::new(SpriteData(1), spr(0x0E)).before(First(1)),
        63 => Slot::new(Pointer(2), spr(0x0C)).before(Third(1)).finalize(),
        64 => Slot::new(SpriteData(2), spr(0x1C))
            .before(First(2))
            .after(Third(2)),
        _ => Slot::new(Pointer(3), spr(0x18)).finalize(),
    }
}

const fn r56a_slot(cycle: u8) -> Slot {
    match cycle {
        1..=11 => pal_slot(cycle),
        // s-access 3 of sprite 2 runs at the start of cycle 1.
        64 => Slot {
            after: None,
            ..ntsc_slot(64)
        },
        _ => ntsc_slot(cycle),
    }
}

/// Which slot function fills a table.
#[derive(Clone, Copy)]
enum Layout {
    Pal,
    Ntsc,
    NtscR56A,
}

const fn build<const N: usize>(layout: Layout) -> [Slot; N] {
    let mut table = [Slot::new(Idle, Release); N];
    let mut i = 0;
    while i < N {
        let cycle = i as u8 + 1;
        table[i] = match layout {
            Layout::Pal => pal_slot(cycle),
            Layout::Ntsc => ntsc_slot(cycle),
            Layout::NtscR56A => r56a_slot(cycle),
        };
        i += 1;
    }
    table
}

/// 6569 / 8565.
pub const PAL_SLOTS: [Slot; 63] = build(Layout::Pal);

/// 6567R8 / 8562.
pub const NTSC_SLOTS: [Slot; 65] = build(Layout::Ntsc);

/// 6567R56A.
pub const NTSC_R56A_SLOTS: [Slot; 64] = build(Layout::NtscR56A);

/// Access table for a model, indexed by `cycle - 1`.
#[must_use]
pub const fn slots(model: ChipModel) -> &'static [Slot] {
    match model {
        ChipModel::Pal6569R1 | ChipModel::Pal6569R3 | ChipModel::Pal8565 => &PAL_SLOTS,
        ChipModel::Ntsc6567 | ChipModel::Ntsc8562 => &NTSC_SLOTS,
        ChipModel::Ntsc6567R56A => &NTSC_R56A_SLOTS,
    }
}
