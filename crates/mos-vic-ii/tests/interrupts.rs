//! Raster and light-pen interrupts as seen by a host polling the IRQ line.

use mos_vic_ii::{ChipModel, FlatVideoMemory, Vic};
use test_log::test;

fn run_to(vic: &mut Vic, memory: &mut FlatVideoMemory, line: u16, cycle: u8) {
    while vic.raster_line() != line || vic.raster_cycle() != cycle {
        vic.tick(memory);
    }
}

#[test]
fn raster_irq_fires_once_per_frame() {
    let mut vic = Vic::with_model(ChipModel::Pal6569R3);
    let mut memory = FlatVideoMemory::new();
    vic.write(0x12, 100);
    vic.write(0x19, 0x0F);
    vic.write(0x1A, 0x01);

    let mut edges = Vec::new();
    let mut previous = false;
    for _ in 0..3 * ChipModel::Pal6569R3.cycles_per_frame() {
        vic.tick(&mut memory);
        let irq = vic.irq_active();
        if irq && !previous {
            edges.push((vic.raster_counter(), vic.raster_cycle()));
            vic.write(0x19, 0x01);
        }
        previous = irq;
    }
    assert_eq!(edges, vec![(100, 2); 3]);
}

#[test]
fn acknowledge_drops_irq_after_one_cycle() {
    let mut vic = Vic::with_model(ChipModel::Pal6569R3);
    let mut memory = FlatVideoMemory::new();
    vic.write(0x12, 100);
    vic.write(0x1A, 0x01);
    run_to(&mut vic, &mut memory, 100, 2);
    assert!(vic.irq_active());
    assert_eq!(vic.peek(0x19), 0xF1);

    vic.write(0x19, 0x01);
    assert_eq!(vic.peek(0x19) & 0x0F, 0x00);
    assert!(vic.irq_active(), "output follows at the end of the cycle");
    vic.tick(&mut memory);
    assert!(!vic.irq_active());
    assert_eq!(vic.peek(0x19), 0x70);
}

#[test]
fn masked_raster_match_only_latches() {
    let mut vic = Vic::with_model(ChipModel::Pal6569R3);
    let mut memory = FlatVideoMemory::new();
    vic.write(0x12, 100);
    run_to(&mut vic, &mut memory, 99, 2);
    vic.write(0x19, 0x0F);
    run_to(&mut vic, &mut memory, 100, 1);
    assert_eq!(vic.peek(0x19) & 0x01, 0);
    vic.tick(&mut memory);
    assert_eq!(vic.peek(0x19) & 0x01, 0x01);
    assert!(!vic.irq_active());

    // Unmasking a pending source raises the line.
    vic.write(0x1A, 0x01);
    vic.tick(&mut memory);
    assert!(vic.irq_active());
}

#[test]
fn raster_compare_bit_8_comes_from_d011() {
    let mut vic = Vic::with_model(ChipModel::Pal6569R3);
    let mut memory = FlatVideoMemory::new();
    vic.write(0x11, 0x90);
    vic.write(0x12, 0x05);
    vic.write(0x1A, 0x01);
    run_to(&mut vic, &mut memory, 0x05, 2);
    assert!(!vic.irq_active());
    run_to(&mut vic, &mut memory, 0x105, 2);
    assert!(vic.irq_active());
}

#[test]
fn light_pen_latches_once_per_frame() {
    let mut vic = Vic::with_model(ChipModel::Pal6569R3);
    let mut memory = FlatVideoMemory::new();
    vic.write(0x1A, 0x08);
    run_to(&mut vic, &mut memory, 100, 20);
    vic.set_light_pen(false);
    vic.tick(&mut memory);
    assert_eq!(vic.peek(0x13), 26);
    assert_eq!(vic.peek(0x14), 100);
    assert_eq!(vic.peek(0x19) & 0x08, 0x08);

    vic.set_light_pen(true);
    run_to(&mut vic, &mut memory, 150, 30);
    vic.set_light_pen(false);
    vic.tick(&mut memory);
    assert_eq!(vic.peek(0x14), 100, "second edge in the same frame is ignored");

    // Held low into the next frame: latched at the frame start.
    run_to(&mut vic, &mut memory, 0, 3);
    assert_eq!(vic.peek(0x13), 209);
    assert_eq!(vic.peek(0x14), 0);
}

#[test]
fn ntsc_frame_start_latch_position() {
    let mut vic = Vic::with_model(ChipModel::Ntsc6567);
    let mut memory = FlatVideoMemory::new();
    vic.set_light_pen(false);
    vic.run_frame(&mut memory);
    run_to(&mut vic, &mut memory, 0, 3);
    assert_eq!(vic.peek(0x13), 213);
    assert_eq!(vic.peek(0x14), 0);
}

#[test]
fn old_6569_defers_light_pen_irq_to_frame_start() {
    let mut vic = Vic::with_model(ChipModel::Pal6569R1);
    let mut memory = FlatVideoMemory::new();
    vic.write(0x1A, 0x08);
    run_to(&mut vic, &mut memory, 100, 20);
    vic.write(0x19, 0x0F);
    vic.set_light_pen(false);
    vic.tick(&mut memory);
    assert_eq!(vic.peek(0x14), 100);
    assert_eq!(vic.peek(0x19) & 0x08, 0, "no IRQ for a mid-frame latch");

    run_to(&mut vic, &mut memory, 0, 3);
    assert_eq!(vic.peek(0x19) & 0x08, 0x08);
    vic.tick(&mut memory);
    assert!(vic.irq_active());
}
