// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use crate::charset::{build_chars, Charset};
use crate::palette::{theme_colors, ThemeColors};
use crate::surface::{GlyphStyle, Surface};
use crate::theme::Theme;

pub const STEP_INTERVAL: Duration = Duration::from_millis(35);
/// Chance per step that a drop past the bottom edge restarts at the top.
pub const WRAPAROUND_RESET_PROBABILITY: f32 = 0.025;
pub const MAX_GLYPH_HOLD_TICKS: u32 = 4;

const MAX_CATCHUP_STEPS: u32 = 4;

#[derive(Clone, Debug, PartialEq)]
pub struct RainConfig {
    pub density: f32,
    pub speed: f32,
    pub fade_opacity: f32,
    pub characters: Vec<char>,
    pub glow_effect: bool,
    pub depth_effect: bool,
    pub glyph_size: f32,
    pub highlight_chance: f32,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            density: 1.0,
            speed: 1.0,
            fade_opacity: 0.05,
            characters: build_chars(Charset::NEXUS),
            glow_effect: true,
            depth_effect: true,
            glyph_size: 16.0,
            highlight_chance: 0.02,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Raindrop {
    /// Position in glyph rows. Negative means not yet on screen.
    pub y: f32,
    pub fall_speed: f32,
    pub depth: f32,
    pub glyph: char,
    pub highlighted: bool,
    pub hold_ticks: u32,
    pub ticks_since_change: u32,
}

pub struct RainRenderer {
    config: RainConfig,
    drops: Vec<Raindrop>,
    columns: usize,
    width: f32,
    height: f32,
    pending: Duration,
    initialized: bool,
    rng: StdRng,
}

impl RainRenderer {
    pub fn new(config: RainConfig, rng: StdRng) -> Self {
        Self {
            config,
            drops: Vec::new(),
            columns: 0,
            width: 0.0,
            height: 0.0,
            pending: Duration::ZERO,
            initialized: false,
            rng,
        }
    }

    pub fn config(&self) -> &RainConfig {
        &self.config
    }

    pub fn drops(&self) -> &[Raindrop] {
        &self.drops
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    fn columns_for(&self, width: f32) -> usize {
        if self.config.glyph_size <= 0.0 || width <= 0.0 {
            return 0;
        }
        (width / self.config.glyph_size).floor() as usize
    }

    pub fn initialize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.columns = self.columns_for(width);
        self.drops.clear();
        for _ in 0..self.columns {
            let d = self.new_drop();
            self.drops.push(d);
        }
        self.pending = Duration::ZERO;
        self.initialized = true;
        debug!(columns = self.columns, width, height, "rain initialized");
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if !self.initialized {
            self.initialize(width, height);
            return;
        }
        self.width = width;
        self.height = height;
        self.columns = self.columns_for(width);
        while self.drops.len() < self.columns {
            let d = self.new_drop();
            self.drops.push(d);
        }
    }

    pub fn set_config(&mut self, config: RainConfig) {
        let resized = config.glyph_size != self.config.glyph_size;
        if config.speed != self.config.speed && self.config.speed > 0.0 {
            let ratio = config.speed / self.config.speed;
            for d in &mut self.drops {
                d.fall_speed *= ratio;
            }
        }
        self.config = config;
        if resized && self.initialized {
            let (w, h) = (self.width, self.height);
            self.initialize(w, h);
        }
    }

    fn new_drop(&mut self) -> Raindrop {
        let rows = if self.config.glyph_size > 0.0 {
            (self.height / self.config.glyph_size).max(1.0)
        } else {
            1.0
        };
        let y = -self.rng.random_range(0.0..rows).floor();
        let depth: f32 = if self.config.depth_effect {
            self.rng.random()
        } else {
            1.0
        };
        let fall_speed = self.rng.random_range(0.5..=1.0) * self.config.speed;
        let glyph = random_glyph(&mut self.rng, &self.config.characters);
        let hold_ticks = self.rng.random_range(1..=MAX_GLYPH_HOLD_TICKS);
        Raindrop {
            y,
            fall_speed,
            depth,
            glyph,
            highlighted: false,
            hold_ticks,
            ticks_since_change: 0,
        }
    }

    pub fn tick(&mut self, surface: &mut dyn Surface, theme: Theme, dt: Duration) -> u32 {
        let Some((width, height)) = surface.size() else {
            return 0;
        };
        if dt.is_zero() {
            return 0;
        }
        if !self.initialized {
            self.initialize(width, height);
        } else if (width, height) != (self.width, self.height) {
            self.resize(width, height);
        }

        self.pending += dt;
        let mut steps = 0;
        while self.pending >= STEP_INTERVAL {
            if steps == MAX_CATCHUP_STEPS {
                self.pending = Duration::ZERO;
                break;
            }
            self.pending -= STEP_INTERVAL;
            self.step(surface, theme);
            steps += 1;
        }
        steps
    }

    pub fn step(&mut self, surface: &mut dyn Surface, theme: Theme) {
        let Some((_, height)) = surface.size() else {
            return;
        };
        let colors = theme_colors(theme);
        surface.fill(colors.background, self.config.fade_opacity);

        let Self {
            config,
            drops,
            columns,
            rng,
            ..
        } = self;
        let glyph_size = config.glyph_size;
        let reset_chance = (WRAPAROUND_RESET_PROBABILITY * config.density).clamp(0.0, 1.0);

        for (i, d) in drops.iter_mut().take(*columns).enumerate() {
            d.ticks_since_change += 1;
            if d.ticks_since_change >= d.hold_ticks {
                d.glyph = random_glyph(rng, &config.characters);
                let depth = if config.depth_effect { d.depth } else { 1.0 };
                d.highlighted = rng.random::<f32>() < config.highlight_chance * depth;
                d.ticks_since_change = 0;
            }

            if d.y > 0.0 {
                let style = glyph_style(config, d, &colors);
                surface.glyph(i as f32 * glyph_size, d.y * glyph_size, d.glyph, style);
            }

            d.y += d.fall_speed;

            if d.y * glyph_size > height && rng.random::<f32>() < reset_chance {
                d.y = 0.0;
                if config.depth_effect {
                    d.depth = rng.random();
                    d.fall_speed = rng.random_range(0.5..=1.0) * config.speed;
                }
            }
        }
    }
}

fn random_glyph(rng: &mut StdRng, chars: &[char]) -> char {
    if chars.is_empty() {
        return '0';
    }
    chars[rng.random_range(0..chars.len())]
}

fn glyph_style(config: &RainConfig, d: &Raindrop, colors: &ThemeColors) -> GlyphStyle {
    let depth = if config.depth_effect { d.depth } else { 1.0 };
    if d.highlighted {
        return GlyphStyle {
            color: colors.highlight,
            alpha: 1.0,
            scale: 1.0 + 0.2 * depth,
            glow: if config.glow_effect { 8.0 * depth } else { 0.0 },
        };
    }
    GlyphStyle {
        color: colors.rain_far.lerp(colors.rain, depth),
        alpha: 0.35 + 0.65 * depth,
        scale: 0.8 + 0.4 * depth,
        glow: if config.glow_effect && depth > 0.8 {
            4.0 * depth
        } else {
            0.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::testing::{Op, Recorder};
    use rand::SeedableRng;

    fn renderer(config: RainConfig) -> RainRenderer {
        RainRenderer::new(config, StdRng::seed_from_u64(7))
    }

    fn glyphs(rec: &Recorder) -> Vec<(f32, f32, char)> {
        rec.ops
            .iter()
            .filter_map(|op| match op {
                Op::Glyph { x, y, ch, .. } => Some((*x, *y, *ch)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn initialize_allocates_one_drop_per_column() {
        let mut r = renderer(RainConfig::default());
        r.initialize(800.0, 600.0);
        assert_eq!(r.drops().len(), 50);
        assert_eq!(r.columns(), 50);
        for d in r.drops() {
            assert!((0.0..=1.0).contains(&d.depth));
            assert!(d.y <= 0.0);
            assert!((1..=MAX_GLYPH_HOLD_TICKS).contains(&d.hold_ticks));
        }
    }

    #[test]
    fn zero_dt_changes_nothing() {
        let mut r = renderer(RainConfig::default());
        let mut rec = Recorder::new(320.0, 320.0);
        r.tick(&mut rec, Theme::Dark, STEP_INTERVAL * 3);
        let before = r.drops().to_vec();
        rec.ops.clear();
        assert_eq!(r.tick(&mut rec, Theme::Dark, Duration::ZERO), 0);
        assert_eq!(r.drops(), before.as_slice());
        assert!(rec.ops.is_empty());
    }

    #[test]
    fn detached_surface_is_skipped() {
        let mut r = renderer(RainConfig::default());
        let mut rec = Recorder::detached();
        assert_eq!(r.tick(&mut rec, Theme::Dark, Duration::from_secs(1)), 0);
        assert!(r.drops().is_empty());
        assert!(rec.ops.is_empty());
    }

    #[test]
    fn steps_follow_the_fixed_interval() {
        let mut r = renderer(RainConfig::default());
        let mut rec = Recorder::new(160.0, 160.0);
        assert_eq!(r.tick(&mut rec, Theme::Dark, Duration::from_millis(20)), 0);
        assert_eq!(r.tick(&mut rec, Theme::Dark, Duration::from_millis(20)), 1);
        assert_eq!(r.tick(&mut rec, Theme::Dark, Duration::from_millis(70)), 2);
        assert_eq!(r.tick(&mut rec, Theme::Dark, Duration::from_secs(10)), MAX_CATCHUP_STEPS);
    }

    #[test]
    fn each_step_fades_with_configured_opacity() {
        let mut r = renderer(RainConfig::default());
        let mut rec = Recorder::new(160.0, 160.0);
        r.initialize(160.0, 160.0);
        r.step(&mut rec, Theme::Dark);
        assert_eq!(rec.ops[0], Op::Fill { alpha: 0.05 });

        r.set_config(RainConfig {
            fade_opacity: 0.2,
            ..RainConfig::default()
        });
        rec.ops.clear();
        r.step(&mut rec, Theme::Light);
        assert_eq!(rec.ops[0], Op::Fill { alpha: 0.2 });
    }

    #[test]
    fn only_drops_below_the_top_are_painted() {
        let mut r = renderer(RainConfig::default());
        r.initialize(64.0, 320.0);
        for d in &mut r.drops {
            d.y = -1.0;
            d.fall_speed = 0.5;
        }
        r.drops[2].y = 3.0;
        let mut rec = Recorder::new(64.0, 320.0);
        r.step(&mut rec, Theme::Dark);
        let painted = glyphs(&rec);
        assert_eq!(painted.len(), 1);
        assert_eq!((painted[0].0, painted[0].1), (32.0, 48.0));
        assert_eq!(r.drops[2].y, 3.5);
    }

    #[test]
    fn resize_appends_and_preserves_existing_drops() {
        let mut r = renderer(RainConfig::default());
        let mut rec = Recorder::new(320.0, 160.0);
        r.initialize(320.0, 160.0);
        for _ in 0..5 {
            r.step(&mut rec, Theme::Dark);
        }
        let before = r.drops().to_vec();
        r.resize(640.0, 160.0);
        assert_eq!(r.drops().len(), 40);
        assert_eq!(&r.drops()[..20], before.as_slice());
    }

    #[test]
    fn shrinking_keeps_drops_but_paints_fewer_columns() {
        let mut r = renderer(RainConfig::default());
        r.initialize(640.0, 160.0);
        r.resize(320.0, 160.0);
        assert_eq!(r.drops().len(), 40);
        for d in &mut r.drops {
            d.y = 2.0;
        }
        let mut rec = Recorder::new(320.0, 160.0);
        r.step(&mut rec, Theme::Dark);
        assert_eq!(glyphs(&rec).len(), 20);
    }

    #[test]
    fn glyph_is_held_between_refreshes() {
        let mut r = renderer(RainConfig::default());
        r.initialize(16.0, 1600.0);
        r.drops[0].y = 1.0;
        r.drops[0].hold_ticks = 3;
        r.drops[0].ticks_since_change = 0;
        let first = r.drops[0].glyph;
        let mut rec = Recorder::new(16.0, 1600.0);
        r.step(&mut rec, Theme::Dark);
        r.step(&mut rec, Theme::Dark);
        let painted = glyphs(&rec);
        assert_eq!(painted.len(), 2);
        assert!(painted.iter().all(|g| g.2 == first));
        assert_eq!(r.drops[0].ticks_since_change, 2);
        r.step(&mut rec, Theme::Dark);
        assert_eq!(r.drops[0].ticks_since_change, 0);
    }

    #[test]
    fn drops_past_the_bottom_wrap_when_reset_is_certain() {
        let mut r = renderer(RainConfig {
            density: 1.0 / WRAPAROUND_RESET_PROBABILITY,
            ..RainConfig::default()
        });
        r.initialize(32.0, 160.0);
        r.drops[0].y = 20.0;
        let mut rec = Recorder::new(32.0, 160.0);
        r.step(&mut rec, Theme::Dark);
        assert_eq!(r.drops[0].y, 0.0);
    }

    #[test]
    fn fall_is_monotonic_until_wrap() {
        let mut r = renderer(RainConfig::default());
        r.initialize(160.0, 16_000.0);
        let mut rec = Recorder::new(160.0, 16_000.0);
        for _ in 0..50 {
            let before: Vec<f32> = r.drops().iter().map(|d| d.y).collect();
            r.step(&mut rec, Theme::Dark);
            for (d, y0) in r.drops().iter().zip(before) {
                assert!(d.y >= y0);
            }
        }
    }

    #[test]
    fn zero_highlight_chance_never_highlights() {
        let mut r = renderer(RainConfig {
            highlight_chance: 0.0,
            ..RainConfig::default()
        });
        r.initialize(320.0, 320.0);
        let mut rec = Recorder::new(320.0, 320.0);
        for _ in 0..40 {
            r.step(&mut rec, Theme::Dark);
        }
        assert!(r.drops().iter().all(|d| !d.highlighted));
    }

    #[test]
    fn glyph_size_change_reinitializes() {
        let mut r = renderer(RainConfig::default());
        r.initialize(320.0, 320.0);
        r.set_config(RainConfig {
            glyph_size: 32.0,
            ..RainConfig::default()
        });
        assert_eq!(r.drops().len(), 10);
    }
}
