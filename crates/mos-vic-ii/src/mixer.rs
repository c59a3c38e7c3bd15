//! Layer compositing for one 8-pixel chunk, plus collision detection.
//!
//! Every pixel carries a depth; a layer may only overwrite a pixel whose
//! depth is greater than or equal to its own. Foreground graphics pixels
//! are tagged separately because sprite-background collisions look at
//! the tag, not at what ended up visible.

/// Depth of each layer, front to back.
pub const DEPTH_BORDER: u8 = 0x10;
pub const DEPTH_SPRITE_FG: u8 = 0x20;
pub const DEPTH_FG: u8 = 0x30;
pub const DEPTH_SPRITE_BG: u8 = 0x40;
pub const DEPTH_BG: u8 = 0x50;

/// IRR bits raised by collisions.
pub const IRQ_SPRITE_BACKGROUND: u8 = 0x02;
pub const IRQ_SPRITE_SPRITE: u8 = 0x04;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mixer {
    colors: [u8; 8],
    depth: [u8; 8],
    /// Bit n: pixel n is a foreground graphics pixel.
    foreground: u8,
    /// Sprites with an opaque pixel at each position.
    sprites: [u8; 8],
    /// $D01E.
    pub sprite_sprite: u8,
    /// $D01F.
    pub sprite_background: u8,
}

impl Mixer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new chunk: nothing drawn, nothing tagged.
    pub fn begin_chunk(&mut self) {
        self.colors = [0; 8];
        self.depth = [0; 8];
        self.foreground = 0;
        self.sprites = [0; 8];
    }

    pub fn border(&mut self, pixel: usize, color: u8) {
        self.colors[pixel] = color;
        self.depth[pixel] = DEPTH_BORDER;
        self.foreground &= !(1 << pixel);
    }

    pub fn canvas(&mut self, pixel: usize, color: u8, foreground: bool) {
        self.colors[pixel] = color;
        if foreground {
            self.depth[pixel] = DEPTH_FG;
            self.foreground |= 1 << pixel;
        } else {
            self.depth[pixel] = DEPTH_BG;
            self.foreground &= !(1 << pixel);
        }
    }

    /// An opaque pixel of `sprite`. Only the first sprite to reach a
    /// pixel can colour it; every one is recorded for collisions.
    pub fn sprite(&mut self, pixel: usize, sprite: usize, color: u8, behind: bool) {
        if self.sprites[pixel] == 0 {
            let depth = if behind { DEPTH_SPRITE_BG } else { DEPTH_SPRITE_FG };
            if depth <= self.depth[pixel] {
                self.colors[pixel] = color;
                self.depth[pixel] = depth;
            }
        }
        self.sprites[pixel] |= 1 << sprite;
    }

    /// Fold this chunk's overlaps into the collision registers.
    ///
    /// Returns the IRR bits to raise: a source fires when its register
    /// goes from zero to non-zero.
    pub fn check_collisions(&mut self, sprite_sprite_enable: u8, sprite_background_enable: u8) -> u8 {
        let mut irq = 0;
        for (pixel, &sprites) in self.sprites.iter().enumerate() {
            if sprites == 0 {
                continue;
            }
            let overlap = sprites & sprite_sprite_enable;
            if overlap.count_ones() >= 2 {
                if self.sprite_sprite == 0 {
                    irq |= IRQ_SPRITE_SPRITE;
                }
                self.sprite_sprite |= overlap;
            }
            let hit = sprites & sprite_background_enable;
            if hit != 0 && self.foreground & (1 << pixel) != 0 {
                if self.sprite_background == 0 {
                    irq |= IRQ_SPRITE_BACKGROUND;
                }
                self.sprite_background |= hit;
            }
        }
        irq
    }

    #[must_use]
    pub const fn colors(&self) -> &[u8; 8] {
        &self.colors
    }

    #[must_use]
    pub const fn depth(&self, pixel: usize) -> u8 {
        self.depth[pixel]
    }

    #[must_use]
    pub const fn is_foreground(&self, pixel: usize) -> bool {
        self.foreground & (1 << pixel) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas_chunk(foreground: bool) -> Mixer {
        let mut mixer = Mixer::new();
        mixer.begin_chunk();
        for pixel in 0..8 {
            mixer.canvas(pixel, 6, foreground);
        }
        mixer
    }

    #[test]
    fn sprite_in_front_of_background() {
        let mut mixer = canvas_chunk(false);
        mixer.sprite(0, 3, 2, true);
        assert_eq!(mixer.colors()[0], 2, "behind-priority sprite still beats background");
        assert_eq!(mixer.depth(0), DEPTH_SPRITE_BG);
    }

    #[test]
    fn foreground_hides_low_priority_sprite() {
        let mut mixer = canvas_chunk(true);
        mixer.sprite(0, 0, 2, true);
        assert_eq!(mixer.colors()[0], 6);
        mixer.sprite(1, 0, 2, false);
        assert_eq!(mixer.colors()[1], 2);
    }

    #[test]
    fn border_beats_everything() {
        let mut mixer = canvas_chunk(true);
        mixer.border(4, 14);
        mixer.sprite(4, 0, 2, false);
        assert_eq!(mixer.colors()[4], 14);
        assert!(!mixer.is_foreground(4));
    }

    #[test]
    fn lowest_sprite_wins_and_both_collide() {
        let mut mixer = canvas_chunk(false);
        mixer.sprite(5, 2, 7, false);
        mixer.sprite(5, 6, 1, false);
        assert_eq!(mixer.colors()[5], 7);
        let irq = mixer.check_collisions(0xFF, 0xFF);
        assert_eq!(irq, IRQ_SPRITE_SPRITE);
        assert_eq!(mixer.sprite_sprite, 0b0100_0100);
        assert_eq!(mixer.sprite_background, 0);
    }

    #[test]
    fn collision_irq_fires_only_from_zero() {
        let mut mixer = canvas_chunk(true);
        mixer.sprite(0, 1, 7, false);
        assert_eq!(mixer.check_collisions(0xFF, 0xFF), IRQ_SPRITE_BACKGROUND);
        mixer.begin_chunk();
        mixer.canvas(0, 6, true);
        mixer.sprite(0, 4, 7, false);
        assert_eq!(mixer.check_collisions(0xFF, 0xFF), 0);
        assert_eq!(mixer.sprite_background, 0b0001_0010);
    }

    #[test]
    fn border_pixels_never_collide_with_sprites() {
        let mut mixer = canvas_chunk(true);
        mixer.border(0, 14);
        mixer.sprite(0, 0, 2, false);
        assert_eq!(mixer.check_collisions(0xFF, 0xFF), 0);
    }

    #[test]
    fn disabled_sprites_do_not_collide() {
        let mut mixer = canvas_chunk(true);
        mixer.sprite(0, 0, 2, false);
        mixer.sprite(0, 1, 3, false);
        assert_eq!(mixer.check_collisions(0xFE, 0x00), 0);
        assert_eq!(mixer.sprite_sprite, 0);
        assert_eq!(mixer.sprite_background, 0);
    }
}
