//! DMA debugger.
//!
//! A [`DmaTrace`] records every memory access of a frame in half-cycle
//! cells: cell 0 of a cycle is its phi1 access, cell 1 its phi2 access.
//! Sprite data accesses that the slot tables run at the start of a cycle
//! belong to the phi2 half of the previous one ([`Half::EarlyPhi2`]).
//!
//! [`DmaTrace::compose`] draws the last complete frame's accesses over a
//! picture. A cell covers four pixels of its cycle's 8-pixel chunk; each
//! pixel takes the channel colour shaded by two bits of the fetched byte,
//! most significant pair first. Raster IRQ lines and bad lines can be
//! marked across the whole line.

/// Memory access channels, one colour each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessKind {
    /// r-access: DRAM refresh.
    Refresh,
    /// i-access: idle read of $3FFF.
    Idle,
    /// c-access: video matrix and colour RAM.
    Character,
    /// g-access: graphics data, including idle-state reads.
    Graphics,
    /// p-access: sprite pointer.
    Pointer,
    /// s-access: sprite data.
    Sprite,
}

impl AccessKind {
    pub const ALL: [Self; 6] = [
        Self::Refresh,
        Self::Idle,
        Self::Character,
        Self::Graphics,
        Self::Pointer,
        Self::Sprite,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Refresh => "r",
            Self::Idle => "i",
            Self::Character => "c",
            Self::Graphics => "g",
            Self::Pointer => "p",
            Self::Sprite => "s",
        }
    }
}

/// Where an access sits relative to the cycle that performs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    Phi1,
    Phi2,
    /// Phi2 of the previous cycle, run at the start of this one.
    EarlyPhi2,
}

/// One recorded access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fetch {
    pub kind: AccessKind,
    pub data: u8,
}

/// Per-line debug markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineMarks {
    /// The raster counter matched the IRQ compare value on this line.
    pub raster_irq: bool,
    pub bad_line: bool,
}

/// How the trace is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverlayConfig {
    /// Channels drawn, indexed like [`AccessKind::ALL`].
    pub channels: [bool; 6],
    /// ARGB colour per channel.
    pub colors: [u32; 6],
    /// Weight of the access colour over the picture, 0-255.
    pub opacity: u8,
    /// Paint raster IRQ lines in colour 1 (white).
    pub mark_raster_irq_lines: bool,
    /// Paint bad lines in colour 2 (red).
    pub mark_bad_lines: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            channels: [true; 6],
            colors: [
                0xFFFF_0000,
                0xFFFF_C000,
                0xFFFF_FF00,
                0xFF00_FFFF,
                0xFF00_FF00,
                0xFF00_80FF,
            ],
            opacity: 0x80,
            mark_raster_irq_lines: false,
            mark_bad_lines: false,
        }
    }
}

impl OverlayConfig {
    #[must_use]
    pub fn with_channel(mut self, kind: AccessKind, shown: bool) -> Self {
        self.channels[kind.index()] = shown;
        self
    }

    #[must_use]
    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    #[must_use]
    pub fn with_line_markers(mut self, raster_irq: bool, bad_lines: bool) -> Self {
        self.mark_raster_irq_lines = raster_irq;
        self.mark_bad_lines = bad_lines;
        self
    }

    /// Channel colour for a two-bit data value: two shades, two tints.
    fn shade(&self, kind: AccessKind, bits: u8) -> u32 {
        let color = self.colors[kind.index()];
        match bits & 0x03 {
            0 => scale(color, 0.3, false),
            1 => scale(color, 0.1, false),
            2 => scale(color, 0.1, true),
            _ => scale(color, 0.3, true),
        }
    }
}

/// Darken towards black or tint towards white by `amount`.
fn scale(color: u32, amount: f64, tint: bool) -> u32 {
    let mut out = 0xFF00_0000;
    for shift in [16, 8, 0] {
        let c = f64::from((color >> shift) as u8);
        let value = if tint { c + (255.0 - c) * amount } else { c * (1.0 - amount) };
        out |= channel(value) << shift;
    }
    out
}

fn mix(base: u32, over: u32, weight: f64) -> u32 {
    let mut out = 0xFF00_0000;
    for shift in [16, 8, 0] {
        let b = f64::from((base >> shift) as u8);
        let o = f64::from((over >> shift) as u8);
        out |= channel(b * (1.0 - weight) + o * weight) << shift;
    }
    out
}

fn channel(value: f64) -> u32 {
    value.round().clamp(0.0, 255.0) as u32
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TraceFrame {
    cells: Vec<Option<Fetch>>,
    marks: Vec<LineMarks>,
}

impl TraceFrame {
    fn new(cycles_per_line: usize, lines: usize) -> Self {
        Self {
            cells: vec![None; cycles_per_line * lines * 2],
            marks: vec![LineMarks::default(); lines],
        }
    }

    fn clear(&mut self) {
        self.cells.fill(None);
        self.marks.fill(LineMarks::default());
    }
}

/// Double-buffered access record, swapped with the frame buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmaTrace {
    cycles_per_line: usize,
    lines: usize,
    current: TraceFrame,
    last: TraceFrame,
}

impl DmaTrace {
    #[must_use]
    pub fn new(cycles_per_line: usize, lines: usize) -> Self {
        Self {
            cycles_per_line,
            lines,
            current: TraceFrame::new(cycles_per_line, lines),
            last: TraceFrame::new(cycles_per_line, lines),
        }
    }

    fn cell(&self, line: u16, cycle: u8) -> Option<usize> {
        let (line, cycle) = (usize::from(line), usize::from(cycle));
        if line >= self.lines || cycle == 0 || cycle > self.cycles_per_line {
            return None;
        }
        Some((line * self.cycles_per_line + cycle - 1) * 2)
    }

    /// Record an access of (`line`, `cycle`). An early phi2 access that
    /// would land before the first cycle of the frame is dropped.
    pub fn record(&mut self, line: u16, cycle: u8, half: Half, kind: AccessKind, data: u8) {
        let Some(first) = self.cell(line, cycle) else { return };
        let index = match half {
            Half::Phi1 => first,
            Half::Phi2 => first + 1,
            Half::EarlyPhi2 => match first.checked_sub(1) {
                Some(index) => index,
                None => return,
            },
        };
        self.current.cells[index] = Some(Fetch { kind, data });
    }

    pub fn mark_line(&mut self, line: u16, marks: LineMarks) {
        if let Some(slot) = self.current.marks.get_mut(usize::from(line)) {
            *slot = marks;
        }
    }

    /// Publish the frame just recorded and start a new one.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.last);
        self.current.clear();
    }

    /// Phi1 and phi2 accesses of (`line`, `cycle`) in the last complete frame.
    #[must_use]
    pub fn accesses(&self, line: u16, cycle: u8) -> Option<[Option<Fetch>; 2]> {
        let index = self.cell(line, cycle)?;
        Some([self.last.cells[index], self.last.cells[index + 1]])
    }

    /// Accesses of (`line`, `cycle`) recorded so far in the current frame.
    #[must_use]
    pub fn pending(&self, line: u16, cycle: u8) -> Option<[Option<Fetch>; 2]> {
        let index = self.cell(line, cycle)?;
        Some([self.current.cells[index], self.current.cells[index + 1]])
    }

    #[must_use]
    pub fn marks(&self, line: u16) -> Option<LineMarks> {
        self.last.marks.get(usize::from(line)).copied()
    }

    /// Count of each access kind in the last complete frame.
    #[must_use]
    pub fn totals(&self) -> [u32; 6] {
        let mut totals = [0; 6];
        for fetch in self.last.cells.iter().flatten() {
            totals[fetch.kind.index()] += 1;
        }
        totals
    }

    /// Draw the last complete frame's accesses over `frame`, a picture of
    /// 8 pixels per cycle and one row per line.
    pub fn compose(&self, frame: &mut [u32], config: &OverlayConfig, palette: &[u32; 16]) {
        let width = self.cycles_per_line * 8;
        let weight = f64::from(config.opacity) / 255.0;
        for (line, row) in frame.chunks_exact_mut(width).take(self.lines).enumerate() {
            let cells = &self.last.cells[line * self.cycles_per_line * 2..][..self.cycles_per_line * 2];
            for (pixels, fetch) in row.chunks_exact_mut(4).zip(cells) {
                let Some(fetch) = fetch else { continue };
                if !config.channels[fetch.kind.index()] {
                    continue;
                }
                for (i, pixel) in pixels.iter_mut().enumerate() {
                    let bits = fetch.data >> (6 - 2 * i);
                    *pixel = mix(*pixel, config.shade(fetch.kind, bits), weight);
                }
            }

            let marks = self.last.marks[line];
            if config.mark_raster_irq_lines && marks.raster_irq {
                row.fill(palette[0x01]);
            }
            if config.mark_bad_lines && marks.bad_line {
                row.fill(palette[0x02]);
            }
        }
    }
}
