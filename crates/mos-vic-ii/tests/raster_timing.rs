//! Frame geometry, bad lines and power-up state through the public API.

use std::collections::BTreeSet;

use mos_vic_ii::{ChipModel, FlatVideoMemory, Vic};
use test_log::test;

/// Run until the next cycle to execute is (`line`, `cycle`).
fn run_to(vic: &mut Vic, memory: &mut FlatVideoMemory, line: u16, cycle: u8) {
    while vic.raster_line() != line || vic.raster_cycle() != cycle {
        vic.tick(memory);
    }
}

/// Raster counter values of every bad line in the next frame.
fn bad_lines_of_frame(vic: &mut Vic, memory: &mut FlatVideoMemory) -> BTreeSet<u16> {
    let mut lines = BTreeSet::new();
    loop {
        vic.tick(memory);
        if vic.is_badline() {
            lines.insert(vic.raster_counter());
        }
        if vic.take_frame_complete() {
            return lines;
        }
    }
}

#[test]
fn frame_length_per_model() {
    let expected = [
        (ChipModel::Pal6569R1, 19_656),
        (ChipModel::Pal6569R3, 19_656),
        (ChipModel::Pal8565, 19_656),
        (ChipModel::Ntsc6567R56A, 16_768),
        (ChipModel::Ntsc6567, 17_095),
        (ChipModel::Ntsc8562, 17_095),
    ];
    for (model, cycles) in expected {
        let mut vic = Vic::with_model(model);
        let mut memory = FlatVideoMemory::new();
        assert_eq!(vic.run_frame(&mut memory), cycles, "{model} first frame");
        assert_eq!(vic.run_frame(&mut memory), cycles, "{model} second frame");
        assert_eq!(vic.frame_count(), 2);
    }
}

#[test]
fn raster_counter_wraps_at_line_count() {
    let mut vic = Vic::with_model(ChipModel::Ntsc6567);
    let mut memory = FlatVideoMemory::new();
    let mut highest = 0;
    for _ in 0..ChipModel::Ntsc6567.cycles_per_frame() {
        vic.tick(&mut memory);
        highest = highest.max(vic.raster_counter());
    }
    assert_eq!(highest, 262);
    assert_eq!(vic.raster_line(), 0);
    vic.tick(&mut memory);
    vic.tick(&mut memory);
    assert_eq!(vic.raster_counter(), 0, "counter resets in cycle 2 of line 0");
}

#[test]
fn bad_lines_follow_yscroll() {
    for yscroll in 0..8u8 {
        let mut vic = Vic::with_model(ChipModel::Pal6569R3);
        let mut memory = FlatVideoMemory::new();
        vic.write(0x11, 0x10 | yscroll);
        let lines = bad_lines_of_frame(&mut vic, &mut memory);
        assert_eq!(lines.len(), 25, "yscroll {yscroll}");
        for line in lines {
            assert!((0x30..=0xF7).contains(&line), "line {line:#X}");
            assert_eq!(line & 7, u16::from(yscroll));
        }
    }
}

#[test]
fn den_clear_through_line_30_disables_bad_lines() {
    let mut vic = Vic::with_model(ChipModel::Pal6569R3);
    let mut memory = FlatVideoMemory::new();
    vic.write(0x11, 0x00);
    run_to(&mut vic, &mut memory, 0x40, 1);
    vic.write(0x11, 0x10);
    let lines = bad_lines_of_frame(&mut vic, &mut memory);
    assert!(lines.is_empty(), "bad lines {lines:?}");

    // DEN is still set at line $30 of the next frame.
    let lines = bad_lines_of_frame(&mut vic, &mut memory);
    assert_eq!(lines.len(), 25);
}

#[test]
fn den_set_during_line_30_enables_bad_lines() {
    let mut vic = Vic::with_model(ChipModel::Pal6569R3);
    let mut memory = FlatVideoMemory::new();
    vic.write(0x11, 0x00);
    run_to(&mut vic, &mut memory, 0x30, 40);
    vic.write(0x11, 0x10);
    assert!(vic.is_badline(), "line $30 itself turns into a bad line");
    let mut lines = bad_lines_of_frame(&mut vic, &mut memory);
    lines.insert(0x30);
    assert_eq!(lines.len(), 25);
}

#[test]
fn bad_line_steals_forty_three_cycles() {
    let mut vic = Vic::with_model(ChipModel::Pal6569R3);
    let mut memory = FlatVideoMemory::new();
    run_to(&mut vic, &mut memory, 0x30, 1);
    let stolen = (0..63).filter(|_| vic.tick(&mut memory)).count();
    assert_eq!(stolen, 43);
    run_to(&mut vic, &mut memory, 0x31, 1);
    let stolen = (0..63).filter(|_| vic.tick(&mut memory)).count();
    assert_eq!(stolen, 0);
}

#[test]
fn power_up_register_defaults() {
    let vic = Vic::with_model(ChipModel::Pal6569R3);
    for reg in 0x00..=0x10 {
        assert_eq!(vic.peek(reg), 0x00, "${reg:02X}");
    }
    assert_eq!(vic.peek(0x11) & 0x7F, 0x10, "DEN set, 24 rows, YSCROLL 0");
    assert_eq!(vic.peek(0x15), 0x00);
    assert_eq!(vic.peek(0x16), 0xC0);
    assert_eq!(vic.peek(0x18), 0x11, "screen at $0400, charset at $0000");
    assert_eq!(vic.peek(0x19), 0x70);
    assert_eq!(vic.peek(0x1A), 0xF0);
    assert_eq!(vic.peek(0x20), 0xFE, "light blue border");
    assert_eq!(vic.peek(0x21), 0xF6, "blue background");
    for reg in 0x22..=0x2E {
        assert_eq!(vic.peek(reg), 0xF0, "${reg:02X}");
    }
    for reg in 0x2F..=0x3F {
        assert_eq!(vic.peek(reg), 0xFF, "${reg:02X}");
    }
}

#[test]
fn reset_reproduces_power_up_registers() {
    for model in ChipModel::ALL {
        let mut vic = Vic::with_model(model);
        let mut memory = FlatVideoMemory::new();
        let before: Vec<u8> = (0..0x40).map(|reg| vic.peek(reg)).collect();

        for reg in 0..0x2F {
            vic.write(reg, 0x5A);
        }
        for _ in 0..5000 {
            vic.tick(&mut memory);
        }
        vic.reset();

        let after: Vec<u8> = (0..0x40).map(|reg| vic.peek(reg)).collect();
        assert_eq!(before, after, "{model}");
        assert_eq!(vic.model(), model);
        assert_eq!(vic.frame_count(), 0);
    }
}

#[test]
fn vblank_lines_stay_black() {
    let mut vic = Vic::with_model(ChipModel::Pal6569R3);
    let mut memory = FlatVideoMemory::new();
    vic.run_frame(&mut memory);
    vic.run_frame(&mut memory);
    let width = vic.framebuffer_width() as usize;
    let frame = vic.framebuffer();
    assert!(frame[..16 * width].iter().all(|&p| p == 0xFF00_0000));
    assert!(frame[300 * width..].iter().all(|&p| p == 0xFF00_0000));
    let border = vic.palette()[0x0E];
    assert_eq!(frame[20 * width + 20 * 8], border);
}
