//! Main and vertical border flip-flops.
//!
//! Both flip-flops are held in a [`RegisterPipe`]: a set or clear lands in
//! `current` immediately and reaches `delayed`, which the border drawing
//! uses, at the end of the cycle.

use crate::registers::{Actions, RegisterPipe};

/// (left, right) X comparison values, indexed by CSEL.
pub const COLUMN_WINDOWS: [(u16, u16); 2] = [(31, 335), (24, 344)];

/// (upper, lower) raster comparison values, indexed by RSEL.
pub const ROW_WINDOWS: [(u16, u16); 2] = [(55, 247), (51, 251)];

/// Cycle whose X comparison matches each left or right value.
pub const LEFT_CHECKS: [(u8, u16); 2] = [(17, 24), (18, 31)];
pub const RIGHT_CHECKS: [(u8, u16); 2] = [(56, 335), (57, 344)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlipFlops {
    pub main: bool,
    pub vertical: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderUnit {
    pub flops: RegisterPipe<FlipFlops>,
    /// The lower comparison matched; the vertical flip-flop is set at the
    /// end of the line.
    pub set_cond: bool,
    pub left: u16,
    pub right: u16,
    pub upper: u16,
    pub lower: u16,
}

impl BorderUnit {
    #[must_use]
    pub fn new() -> Self {
        let (left, right) = COLUMN_WINDOWS[0];
        let (upper, lower) = ROW_WINDOWS[0];
        Self {
            flops: RegisterPipe::default(),
            set_cond: false,
            left,
            right,
            upper,
            lower,
        }
    }

    pub fn select_columns(&mut self, csel: bool) {
        (self.left, self.right) = COLUMN_WINDOWS[usize::from(csel)];
    }

    pub fn select_rows(&mut self, rsel: bool) {
        (self.upper, self.lower) = ROW_WINDOWS[usize::from(rsel)];
    }

    pub fn set_main(&mut self, value: bool, actions: &mut Actions) {
        if value != self.flops.delayed.main {
            self.flops.current.main = value;
            actions.insert(Actions::UPDATE_FLIPFLOPS);
        }
    }

    pub fn set_vertical(&mut self, value: bool, actions: &mut Actions) {
        if value != self.flops.delayed.vertical {
            self.flops.current.vertical = value;
            actions.insert(Actions::UPDATE_FLIPFLOPS);
        }
    }

    /// Runs every cycle. The upper comparison clears the vertical
    /// flip-flop at once if DEN is set; the lower one only arms `set_cond`.
    pub fn check_vertical(&mut self, y: u16, den: bool, actions: &mut Actions) {
        if y == self.upper {
            if den {
                self.set_vertical(false, actions);
            }
        } else if y == self.lower {
            self.set_cond = true;
        }
    }

    /// X comparison in the cycles that can reach the left edge.
    pub fn check_left(&mut self, x: u16, actions: &mut Actions) {
        if x == self.left && !self.flops.current.vertical && !self.set_cond {
            self.set_main(false, actions);
        }
    }

    pub fn check_right(&mut self, x: u16, actions: &mut Actions) {
        if x == self.right {
            self.set_main(true, actions);
        }
    }

    pub fn apply_set_cond(&mut self, actions: &mut Actions) {
        if self.set_cond {
            self.set_vertical(true, actions);
        }
    }

    /// Border pixels to draw this cycle as (first, last) pixel indices.
    ///
    /// Cycles 18 and 56 draw partial chunks when the main flip-flop
    /// changes in the 38-column window.
    #[must_use]
    pub const fn span(&self, cycle: u8) -> Option<(usize, usize)> {
        let delayed = self.flops.delayed.main;
        let current = self.flops.current.main;
        match cycle {
            18 if delayed && !current => Some((0, 6)),
            56 if !delayed && current => Some((7, 7)),
            _ if delayed => Some((0, 7)),
            _ => None,
        }
    }
}

impl Default for BorderUnit {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(border: &mut BorderUnit, actions: &mut Actions) {
        if actions.take().contains(Actions::UPDATE_FLIPFLOPS) {
            border.flops.commit();
        }
    }

    #[test]
    fn windows_follow_csel_and_rsel() {
        let mut border = BorderUnit::new();
        border.select_columns(true);
        border.select_rows(true);
        assert_eq!((border.left, border.right), (24, 344));
        assert_eq!((border.upper, border.lower), (51, 251));
        border.select_columns(false);
        border.select_rows(false);
        assert_eq!((border.left, border.right), (31, 335));
        assert_eq!((border.upper, border.lower), (55, 247));
    }

    #[test]
    fn main_flop_stays_set_while_vertical_is_set() {
        let mut border = BorderUnit::new();
        let mut actions = Actions::NONE;
        border.flops.force(FlipFlops {
            main: true,
            vertical: true,
        });
        border.check_left(31, &mut actions);
        assert!(border.flops.current.main);
        assert!(actions.is_empty());
    }

    #[test]
    fn left_compare_clears_main_when_vertical_clear() {
        let mut border = BorderUnit::new();
        let mut actions = Actions::NONE;
        border.flops.force(FlipFlops {
            main: true,
            vertical: false,
        });
        border.check_left(24, &mut actions);
        assert!(border.flops.current.main, "24 is the CSEL=1 value");
        border.check_left(31, &mut actions);
        assert!(!border.flops.current.main);
        assert!(border.flops.delayed.main, "drawing sees the change a cycle later");
        commit(&mut border, &mut actions);
        assert!(!border.flops.delayed.main);
    }

    #[test]
    fn upper_compare_needs_den() {
        let mut border = BorderUnit::new();
        let mut actions = Actions::NONE;
        border.flops.force(FlipFlops {
            main: true,
            vertical: true,
        });
        border.check_vertical(55, false, &mut actions);
        assert!(border.flops.current.vertical);
        border.check_vertical(55, true, &mut actions);
        assert!(!border.flops.current.vertical);
    }

    #[test]
    fn lower_compare_sets_vertical_at_line_end() {
        let mut border = BorderUnit::new();
        let mut actions = Actions::NONE;
        border.check_vertical(247, true, &mut actions);
        assert!(border.set_cond);
        assert!(!border.flops.current.vertical);
        border.check_left(31, &mut actions);
        assert!(actions.is_empty(), "set_cond blocks the left compare");
        border.apply_set_cond(&mut actions);
        assert!(border.flops.current.vertical);
    }

    #[test]
    fn partial_border_chunks() {
        let mut border = BorderUnit::new();
        border.flops.delayed.main = true;
        border.flops.current.main = false;
        assert_eq!(border.span(18), Some((0, 6)));
        assert_eq!(border.span(30), Some((0, 7)));
        border.flops.delayed.main = false;
        border.flops.current.main = true;
        assert_eq!(border.span(56), Some((7, 7)));
        assert_eq!(border.span(30), None);
    }
}
