//! Observable implementation and state snapshots.

use std::collections::HashMap;

use super::Vic;
use crate::observe::{Observable, ScreenGeometry, SpriteInfo, Value, VicInfo};
use crate::overlay::{AccessKind, DmaTrace};
use crate::registers::color;

/// Query paths supported by the VIC-II.
const VIC_QUERY_PATHS: &[&str] = &[
    "model",
    "raster.line",
    "raster.cycle",
    "raster.counter",
    "raster.x",
    "raster.compare",
    "frame",
    "badline",
    "display_state",
    "ba",
    "irq",
    "irr",
    "imr",
    "border.main",
    "border.vertical",
    "vc",
    "vc_base",
    "rc",
    "vmli",
    "bank",
    "mem_select",
    "mode",
    "registers",
    "collisions.sprite_sprite",
    "collisions.sprite_background",
    "light_pen.x",
    "light_pen.y",
    "dma.trace",
    "dma.totals",
    "sprite.0.x",
    "sprite.0.y",
    "sprite.0.enabled",
    "sprite.0.dma",
    "sprite.0.display",
    "sprite.0.mc",
    "sprite.0.mcbase",
    "sprite.0.color",
];

impl Vic {
    /// Snapshot of the chip state.
    #[must_use]
    pub fn info(&self) -> VicInfo {
        let regs = &self.regs.current;
        let model = self.config.model;
        VicInfo {
            model,
            raster_line: self.line,
            raster_cycle: self.cycle,
            x_counter: self.x_counter,
            bad_line: self.display.bad_line,
            display_state: self.display.display_state,
            ba_low: self.ba.is_low(),
            display_mode: regs.display_mode(),
            border_color: regs.colors[color::BORDER],
            background_colors: [
                regs.colors[color::BACKGROUND_0],
                regs.colors[color::BACKGROUND_1],
                regs.colors[color::BACKGROUND_2],
                regs.colors[color::BACKGROUND_3],
            ],
            geometry: ScreenGeometry {
                frame_width: model.pixels_per_line(),
                frame_height: model.lines_per_frame(),
                first_visible_line: 16,
                visible_lines: model.visible_lines(),
                left: self.border.left,
                right: self.border.right,
                upper: self.border.upper,
                lower: self.border.lower,
            },
            x_scroll: regs.xscroll(),
            y_scroll: regs.yscroll(),
            main_border: self.border.flops.current.main,
            vertical_border: self.border.flops.current.vertical,
            bank: self.bank,
            screen_address: self.bank | u16::from(self.mem_select & 0xF0) << 6,
            charset_address: self.bank | u16::from(self.mem_select & 0x0E) << 10,
            bitmap_address: self.bank | u16::from(self.mem_select & 0x08) << 10,
            vc: self.display.vc,
            rc: self.display.rc,
            irr: self.irq.irr,
            imr: self.irq.imr,
            raster_irq_line: self.irq.raster_compare,
            irq: self.irq.output,
        }
    }

    /// Snapshot of sprite `index` (0-7).
    #[must_use]
    pub fn sprite_info(&self, index: u8) -> Option<SpriteInfo> {
        let n = usize::from(index);
        let unit = self.sprites.units.get(n)?;
        let regs = &self.regs.current;
        let bit = 1 << n;
        Some(SpriteInfo {
            index,
            enabled: regs.sprite_enable & bit != 0,
            x: regs.sprite_x[n],
            y: regs.sprite_y[n],
            color: regs.colors[color::SPRITE_0 + n],
            multicolor: regs.sprite_multicolor & bit != 0,
            expand_x: regs.sprite_expand_x & bit != 0,
            expand_y: regs.sprite_expand_y & bit != 0,
            behind: regs.sprite_priority & bit != 0,
            dma: self.sprites.dma & bit != 0,
            display: self.sprites.display & bit != 0,
            mc: unit.mc,
            mcbase: unit.mcbase,
            data_address: self.bank | unit.pointer,
        })
    }

    fn query_sprite(&self, path: &str) -> Option<Value> {
        let (index, field) = path.split_once('.')?;
        let info = self.sprite_info(index.parse().ok()?)?;
        match field {
            "x" => Some(info.x.into()),
            "y" => Some(info.y.into()),
            "enabled" => Some(info.enabled.into()),
            "dma" => Some(info.dma.into()),
            "display" => Some(info.display.into()),
            "mc" => Some(info.mc.into()),
            "mcbase" => Some(info.mcbase.into()),
            "color" => Some(info.color.into()),
            _ => None,
        }
    }
}

impl Observable for Vic {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("sprite.") {
            return self.query_sprite(rest);
        }
        match path {
            "model" => Some(self.config.model.name().into()),
            "raster.line" => Some(self.line.into()),
            "raster.cycle" => Some(self.cycle.into()),
            "raster.counter" => Some(self.y.into()),
            "raster.x" => Some(self.x_counter.into()),
            "raster.compare" => Some(self.irq.raster_compare.into()),
            "frame" => Some(self.frame_count.into()),
            "badline" => Some(self.display.bad_line.into()),
            "display_state" => Some(self.display.display_state.into()),
            "ba" => Some(self.ba.is_low().into()),
            "irq" => Some(self.irq.output.into()),
            "irr" => Some(self.irq.irr.into()),
            "imr" => Some(self.irq.imr.into()),
            "border.main" => Some(self.border.flops.current.main.into()),
            "border.vertical" => Some(self.border.flops.current.vertical.into()),
            "vc" => Some(self.display.vc.into()),
            "vc_base" => Some(self.display.vc_base.into()),
            "rc" => Some(self.display.rc.into()),
            "vmli" => Some(self.display.vmli.into()),
            "bank" => Some(self.bank.into()),
            "mem_select" => Some(self.mem_select.into()),
            "mode" => Some(format!("{:?}", self.regs.current.display_mode()).into()),
            "registers" => Some(Value::Array(
                (0..0x2F).map(|reg| self.peek(reg).into()).collect(),
            )),
            "collisions.sprite_sprite" => Some(self.mixer.sprite_sprite.into()),
            "collisions.sprite_background" => Some(self.mixer.sprite_background.into()),
            "light_pen.x" => Some(self.light_pen.x.into()),
            "light_pen.y" => Some(self.light_pen.y.into()),
            "dma.trace" => Some(self.trace.is_some().into()),
            "dma.totals" => {
                let totals = self.trace.as_ref().map_or([0; 6], DmaTrace::totals);
                let map: HashMap<String, Value> = AccessKind::ALL
                    .iter()
                    .zip(totals)
                    .map(|(kind, count)| (kind.name().to_string(), count.into()))
                    .collect();
                Some(Value::Map(map))
            }
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        VIC_QUERY_PATHS
    }
}
