// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::ColorMode;
use crate::theme::Theme;

/// Linear RGB in 0..=255 float space so blends accumulate without rounding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32,
            g: g as f32,
            b: b as f32,
        }
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    #[cfg(test)]
    pub fn luma(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    pub fn to_u8(self) -> (u8, u8, u8) {
        (channel(self.r), channel(self.g), channel(self.b))
    }
}

fn channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThemeColors {
    pub background: Rgb,
    pub rain: Rgb,
    pub rain_far: Rgb,
    pub highlight: Rgb,
    pub particle_tiers: [Rgb; 4],
    pub connector: Rgb,
    pub panel: Rgb,
    pub border: Rgb,
    pub text: Rgb,
    pub text_dim: Rgb,
    pub accent: Rgb,
    pub warn: Rgb,
    pub error: Rgb,
}

const DARK_TIER_STOPS: [(u8, u8, u8); 3] = [(0, 0x3a, 0x0c), (0, 0x8f, 0x11), (0, 0xff, 0x41)];
const LIGHT_TIER_STOPS: [(u8, u8, u8); 3] = [(0x9c, 0xd8, 0xac), (0, 0x99, 0x33), (0, 0x44, 0x16)];

pub fn theme_colors(theme: Theme) -> ThemeColors {
    match theme {
        Theme::Dark => ThemeColors {
            background: Rgb::new(0, 0, 0),
            rain: Rgb::new(0, 0xff, 0),
            rain_far: Rgb::new(0, 0x55, 0x11),
            highlight: Rgb::new(0xe8, 0xff, 0xe8),
            particle_tiers: tiers(&DARK_TIER_STOPS),
            connector: Rgb::new(0, 0xff, 0x41),
            panel: Rgb::new(0x05, 0x0d, 0x07),
            border: Rgb::new(0, 0xcc, 0x33),
            text: Rgb::new(0, 0xff, 0x41),
            text_dim: Rgb::new(0, 0x8f, 0x11),
            accent: Rgb::new(0x7d, 0xff, 0xa8),
            warn: Rgb::new(0xff, 0xc1, 0x07),
            error: Rgb::new(0xff, 0x33, 0x33),
        },
        Theme::Light => ThemeColors {
            background: Rgb::new(0xf0, 0xf0, 0xf0),
            rain: Rgb::new(0, 0x77, 0x33),
            rain_far: Rgb::new(0x9c, 0xc8, 0xa8),
            highlight: Rgb::new(0, 0x33, 0x11),
            particle_tiers: tiers(&LIGHT_TIER_STOPS),
            connector: Rgb::new(0, 0x77, 0x33),
            panel: Rgb::new(0xfa, 0xfa, 0xf7),
            border: Rgb::new(0, 0x77, 0x33),
            text: Rgb::new(0x0b, 0x3d, 0x1c),
            text_dim: Rgb::new(0x4a, 0x6b, 0x55),
            accent: Rgb::new(0, 0x77, 0x33),
            warn: Rgb::new(0xa6, 0x6a, 0),
            error: Rgb::new(0xc0, 0x1c, 0x1c),
        },
    }
}

fn tiers(stops: &[(u8, u8, u8)]) -> [Rgb; 4] {
    let g = gradient_from_stops(stops, 4);
    let mut out = [Rgb::new(0, 0, 0); 4];
    for (slot, &(r, gg, b)) in out.iter_mut().zip(g.iter()) {
        *slot = Rgb::new(r, gg, b);
    }
    out
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(
        r,
        g,
        b,
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let (gray_idx, level) = match avg {
        0..=7 => (16, 0),
        239..=255 => (231, 255),
        _ => {
            let step = (avg - 8) / 10;
            (232 + step, 8 + 10 * step)
        }
    };
    let gray_dist = dist2(r, g, b, level, level, level);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    let mut best = Color::White;
    let mut best_d = i32::MAX;
    for (c, (cr, cg, cb)) in TABLE {
        let d = dist2(r, g, b, cr, cg, cb);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

pub fn quantize(rgb: Rgb, mode: ColorMode) -> Option<Color> {
    let (r, g, b) = rgb.to_u8();
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(r, g, b))),
        ColorMode::Color16 => Some(rgb_to_color16(r, g, b)),
    }
}

pub fn background(theme: Theme, mode: ColorMode, default_background: bool) -> Option<Color> {
    if default_background {
        return None;
    }
    quantize(theme_colors(theme).background, mode)
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

fn gradient_from_stops(stops: &[(u8, u8, u8)], steps: usize) -> Vec<(u8, u8, u8)> {
    if steps == 0 || stops.is_empty() {
        return Vec::new();
    }
    if stops.len() == 1 || steps == 1 {
        return vec![stops[0]; steps];
    }

    let segs = stops.len() - 1;
    (0..steps)
        .map(|i| {
            let pos = (i as f32) / ((steps - 1) as f32) * (segs as f32);
            let seg = (pos.floor() as usize).min(segs - 1);
            let lt = pos - (seg as f32);
            let (r0, g0, b0) = stops[seg];
            let (r1, g1, b1) = stops[seg + 1];
            (lerp_u8(r0, r1, lt), lerp_u8(g0, g1, lt), lerp_u8(b0, b1, lt))
        })
        .collect()
}
