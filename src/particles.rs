// Copyright (c) 2026 rezky_nightky

use std::f32::consts::TAU;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use crate::palette::theme_colors;
use crate::surface::Surface;
use crate::theme::Theme;

pub const MAX_PARTICLES: usize = 100;
pub const WRAP_MARGIN: f32 = 50.0;
pub const TRAIL_FADE: f32 = 0.05;
pub const PULSE_AMOUNT: f32 = 0.3;

const OPACITY_MIN: f32 = 0.1;
const OPACITY_MAX: f32 = 0.8;
const OPACITY_WALK: f32 = 0.01;
/// Velocities are tuned per 60 Hz frame and scaled by elapsed time.
const REFERENCE_FPS: f32 = 60.0;
const MAX_FRAME_SCALE: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorTier {
    Faint,
    Low,
    High,
    Bright,
}

impl ColorTier {
    pub fn index(self) -> usize {
        match self {
            ColorTier::Faint => 0,
            ColorTier::Low => 1,
            ColorTier::High => 2,
            ColorTier::Bright => 3,
        }
    }
}

pub fn tier_for_depth(depth: f32) -> ColorTier {
    if depth < 0.25 {
        ColorTier::Faint
    } else if depth < 0.5 {
        ColorTier::Low
    } else if depth < 0.75 {
        ColorTier::High
    } else {
        ColorTier::Bright
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleConfig {
    pub count: usize,
    pub connect_distance: f32,
    pub opacity: f32,
    pub pulse_effect: bool,
    pub size: f32,
    pub depth_effect: bool,
    pub trail_effect: bool,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 70,
            connect_distance: 150.0,
            opacity: 1.0,
            pulse_effect: true,
            size: 2.0,
            depth_effect: true,
            trail_effect: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub vx: f32,
    pub vy: f32,
    pub opacity: f32,
    pub depth: f32,
    pub tier: ColorTier,
    pub pulse_phase: f32,
    pub pulse_speed: f32,
}

pub fn connector_alpha(a: &Particle, b: &Particle, config: &ParticleConfig) -> f32 {
    if config.connect_distance <= 0.0 {
        return 0.0;
    }
    let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
    if d >= config.connect_distance {
        return 0.0;
    }
    let proximity = 1.0 - d / config.connect_distance;
    let depth_factor = if config.depth_effect {
        (1.0 - 2.0 * (a.depth - b.depth).abs()).max(0.0)
    } else {
        1.0
    };
    (proximity * a.opacity * b.opacity * depth_factor * config.opacity).clamp(0.0, 1.0)
}

fn wrap_axis(v: &mut f32, extent: f32) {
    if *v < -WRAP_MARGIN {
        *v = extent + WRAP_MARGIN;
    } else if *v > extent + WRAP_MARGIN {
        *v = -WRAP_MARGIN;
    }
}

pub struct ParticleRenderer {
    config: ParticleConfig,
    particles: Vec<Particle>,
    width: f32,
    height: f32,
    time: f32,
    initialized: bool,
    rng: StdRng,
}

impl ParticleRenderer {
    pub fn new(mut config: ParticleConfig, rng: StdRng) -> Self {
        config.count = config.count.min(MAX_PARTICLES);
        Self {
            config,
            particles: Vec::new(),
            width: 0.0,
            height: 0.0,
            time: 0.0,
            initialized: false,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[cfg(test)]
    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    fn spawn(&mut self) -> Particle {
        let rng = &mut self.rng;
        let depth: f32 = if self.config.depth_effect {
            rng.random()
        } else {
            1.0
        };
        let size_scale = if self.config.depth_effect {
            0.5 + depth
        } else {
            1.0
        };
        Particle {
            x: rng.random::<f32>() * self.width,
            y: rng.random::<f32>() * self.height,
            radius: rng.random_range(0.5..1.5) * self.config.size * size_scale,
            vx: (rng.random::<f32>() - 0.5) * 0.7,
            vy: (rng.random::<f32>() - 0.5) * 0.7,
            opacity: rng.random::<f32>() * 0.5 + 0.2,
            depth,
            tier: tier_for_depth(depth),
            pulse_phase: rng.random::<f32>() * TAU,
            pulse_speed: rng.random_range(0.01..0.05),
        }
    }

    pub fn initialize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.particles.clear();
        for _ in 0..self.config.count {
            let p = self.spawn();
            self.particles.push(p);
        }
        self.initialized = true;
        debug!(count = self.particles.len(), width, height, "particle field initialized");
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if !self.initialized {
            self.initialize(width, height);
            return;
        }
        self.width = width;
        self.height = height;
        for i in 0..self.particles.len() {
            let p = &self.particles[i];
            let outside = p.x > width + WRAP_MARGIN || p.y > height + WRAP_MARGIN;
            if outside {
                self.particles[i] = self.spawn();
            }
        }
    }

    pub fn set_config(&mut self, mut config: ParticleConfig) {
        config.count = config.count.min(MAX_PARTICLES);
        if self.config.size > 0.0 && config.size != self.config.size {
            let ratio = config.size / self.config.size;
            for p in &mut self.particles {
                p.radius *= ratio;
            }
        }
        self.config = config;
        if !self.initialized {
            return;
        }
        self.particles.truncate(self.config.count);
        while self.particles.len() < self.config.count {
            let p = self.spawn();
            self.particles.push(p);
        }
    }

    pub fn tick(&mut self, surface: &mut dyn Surface, theme: Theme, dt: Duration) -> bool {
        let Some((width, height)) = surface.size() else {
            return false;
        };
        if dt.is_zero() {
            return false;
        }
        if !self.initialized {
            self.initialize(width, height);
        } else if (width, height) != (self.width, self.height) {
            self.resize(width, height);
        }

        let colors = theme_colors(theme);
        let frames = (dt.as_secs_f32() * REFERENCE_FPS).min(MAX_FRAME_SCALE);
        self.time += dt.as_secs_f32();

        let fade = if self.config.trail_effect { TRAIL_FADE } else { 1.0 };
        surface.fill(colors.background, fade);

        let Self {
            config,
            particles,
            time,
            rng,
            ..
        } = self;

        for (i, p) in particles.iter_mut().enumerate() {
            let pulse = if config.pulse_effect {
                1.0 + p.pulse_phase.sin() * PULSE_AMOUNT
            } else {
                1.0
            };
            let glow = if config.pulse_effect {
                (pulse - 1.0).max(0.0) * p.radius * 4.0
            } else {
                0.0
            };
            let alpha = (p.opacity * config.opacity).clamp(0.0, 1.0);
            surface.disc(
                p.x,
                p.y,
                p.radius * pulse,
                colors.particle_tiers[p.tier.index()],
                alpha,
                glow,
            );

            if config.pulse_effect {
                p.pulse_phase = (p.pulse_phase + p.pulse_speed * frames).rem_euclid(TAU);
            }

            // Drift is phase-shifted per particle so neighbours don't move in lockstep.
            let phase = *time + i as f32;
            p.x += phase.sin() * p.vx * frames;
            p.y += phase.cos() * p.vy * frames;
            wrap_axis(&mut p.x, width);
            wrap_axis(&mut p.y, height);

            p.opacity = (p.opacity + (rng.random::<f32>() - 0.5) * OPACITY_WALK)
                .clamp(OPACITY_MIN, OPACITY_MAX);
        }

        for i in 0..particles.len() {
            for j in (i + 1)..particles.len() {
                let (a, b) = (&particles[i], &particles[j]);
                let alpha = connector_alpha(a, b, config);
                if alpha > 0.0 {
                    surface.line(a.x, a.y, b.x, b.y, colors.connector, alpha);
                }
            }
        }
        true
    }
}
