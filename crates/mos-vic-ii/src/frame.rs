//! Double-buffered ARGB frame store.
//!
//! Chunks are written into the back buffer while the renderer reads the
//! stable one. The two swap once per frame.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSink {
    width: usize,
    height: usize,
    back: Vec<u32>,
    stable: Vec<u32>,
}

const BLACK: u32 = 0xFF00_0000;

impl PixelSink {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            back: vec![BLACK; width * height],
            stable: vec![BLACK; width * height],
        }
    }

    /// Write an 8-pixel chunk of colour indices at (`line`, `x`).
    /// Pixels outside the frame are dropped.
    pub fn write_chunk(&mut self, line: usize, x: usize, colors: &[u8; 8], palette: &[u32; 16]) {
        if line >= self.height || x >= self.width {
            return;
        }
        let start = line * self.width + x;
        let len = colors.len().min(self.width - x);
        for (dst, &index) in self.back[start..start + len].iter_mut().zip(colors) {
            *dst = palette[usize::from(index & 0x0F)];
        }
    }

    /// Publish the back buffer.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.back, &mut self.stable);
    }

    /// The last complete frame.
    #[must_use]
    pub fn stable(&self) -> &[u32] {
        &self.stable
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }
}
