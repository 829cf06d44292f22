// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;

use crate::charset::{build_chars, charset_from_str, parse_user_chars, PRESETS};
use crate::particles::{ParticleConfig, MAX_PARTICLES};
use crate::rain::RainConfig;
use crate::runtime::{Backdrop, ColorMode};
use crate::theme::Theme;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  nexusfolio --background particles --fps 60 --charset auto --density 1 --speed 1 --fade-opacity 0.05 --font-size 16 --particles 70 --connect-distance 150 --particle-size 2";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_usage(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        if !line.starts_with(' ') && line.ends_with(':') {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else if let Some(rest) = line.strip_prefix("  nexusfolio") {
            out.push_str("  \x1b[1;34mnexusfolio\x1b[0m");
            out.push_str(rest);
        } else {
            out.push_str(line);
        }
        out.push_str(nl);
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_usage(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "theme")]
    Theme,
    #[value(name = "default-background")]
    DefaultBackground,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "nexusfolio", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        long = "background",
        default_value_t = Backdrop::Both,
        value_enum,
        help_heading = "GENERAL",
        help = "Animated layers behind the shell (matrix, particles, both, none)"
    )]
    pub background: Backdrop,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "GENERAL",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "no-boot",
        help_heading = "GENERAL",
        help = "Skip the boot sequence"
    )]
    pub no_boot: bool,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed the random generator for reproducible runs"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "theme",
        help_heading = "APPEARANCE",
        help = "Set and remember the color theme (dark, light)"
    )]
    pub theme: Option<Theme>,

    #[arg(
        long = "prefs",
        help_heading = "APPEARANCE",
        help = "Preference file (default: <config dir>/nexusfolio/prefs.toml)"
    )]
    pub prefs: Option<PathBuf>,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Theme,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (theme, default-background)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        short = 'd',
        long = "density",
        default_value_t = 1.0,
        help_heading = "MATRIX RAIN",
        help = "Drop density (min 0.1 max 5.0)"
    )]
    pub density: f32,

    #[arg(
        short = 'S',
        long = "speed",
        default_value_t = 1.0,
        help_heading = "MATRIX RAIN",
        help = "Fall speed multiplier (min 0.1 max 10)"
    )]
    pub speed: f32,

    #[arg(
        long = "fade-opacity",
        default_value_t = 0.05,
        help_heading = "MATRIX RAIN",
        help = "Trail fade per step (min 0.01 max 1)"
    )]
    pub fade_opacity: f32,

    #[arg(
        long = "charset",
        default_value = "auto",
        help_heading = "MATRIX RAIN",
        help = "Charset preset (see --list-charsets)"
    )]
    pub charset: String,

    #[arg(
        long = "chars",
        help_heading = "MATRIX RAIN",
        help = "Custom characters override"
    )]
    pub chars: Option<String>,

    #[arg(long = "no-glow", help_heading = "MATRIX RAIN", help = "Disable glyph glow")]
    pub no_glow: bool,

    #[arg(
        long = "no-depth",
        help_heading = "MATRIX RAIN",
        help = "Disable depth shading of drops"
    )]
    pub no_depth: bool,

    #[arg(
        long = "font-size",
        default_value_t = 16.0,
        help_heading = "MATRIX RAIN",
        help = "Glyph size in virtual pixels (min 8 max 48)"
    )]
    pub font_size: f32,

    #[arg(
        long = "particles",
        default_value_t = 70,
        help_heading = "PARTICLES",
        help = "Particle count (min 0 max 100)"
    )]
    pub particles: usize,

    #[arg(
        long = "connect-distance",
        default_value_t = 150.0,
        help_heading = "PARTICLES",
        help = "Connector reach in virtual pixels (min 10 max 500)"
    )]
    pub connect_distance: f32,

    #[arg(
        long = "particle-opacity",
        default_value_t = 1.0,
        help_heading = "PARTICLES",
        help = "Global particle opacity (min 0.1 max 1)"
    )]
    pub particle_opacity: f32,

    #[arg(
        long = "particle-size",
        default_value_t = 2.0,
        help_heading = "PARTICLES",
        help = "Base particle radius (min 0.5 max 10)"
    )]
    pub particle_size: f32,

    #[arg(long = "no-pulse", help_heading = "PARTICLES", help = "Disable pulsing")]
    pub no_pulse: bool,

    #[arg(long = "no-trail", help_heading = "PARTICLES", help = "Clear instead of fading")]
    pub no_trail: bool,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List available charset presets and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_f32_range(name: &str, v: f32, min: f32, max: f32) -> f32 {
    require_f64_range(name, v as f64, min as f64, max as f64) as f32
}

fn require_usize_range(name: &str, v: usize, min: usize, max: usize) -> usize {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn default_to_ascii() -> bool {
    let lang = std::env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

pub fn detect_color_mode_auto() -> ColorMode {
    let colorterm = std::env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = std::env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }

    ColorMode::Color16
}

pub fn color_mode_from_flag(m: u16) -> Option<ColorMode> {
    match m {
        0 => Some(ColorMode::Mono),
        16 => Some(ColorMode::Color16),
        8 | 256 => Some(ColorMode::Color256),
        24 | 32 => Some(ColorMode::TrueColor),
        _ => None,
    }
}

impl Args {
    pub fn color_mode(&self) -> ColorMode {
        let Some(m) = self.colormode else {
            return detect_color_mode_auto();
        };
        color_mode_from_flag(m).unwrap_or_else(|| {
            eprintln!("invalid --colormode: {} (allowed: 0,16,8,256,24,32)", m);
            std::process::exit(1);
        })
    }

    pub fn target_fps(&self) -> f64 {
        require_f64_range("--fps", self.fps, 1.0, 240.0)
    }

    pub fn duration_secs(&self) -> Option<f64> {
        let s = self.duration?;
        if !s.is_finite() {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        (s > 0.0).then(|| require_f64_range("--duration", s, 0.1, 86400.0))
    }

    pub fn rain_config(&self) -> RainConfig {
        let def_ascii = default_to_ascii();
        let charset = charset_from_str(&self.charset, def_ascii).unwrap_or_else(|e| {
            eprintln!("{}", e);
            std::process::exit(1);
        });
        let user = self.chars.as_deref().map(parse_user_chars).unwrap_or_default();
        let characters = if user.is_empty() {
            build_chars(charset)
        } else {
            user
        };

        RainConfig {
            density: require_f32_range("--density", self.density, 0.1, 5.0),
            speed: require_f32_range("--speed", self.speed, 0.1, 10.0),
            fade_opacity: require_f32_range("--fade-opacity", self.fade_opacity, 0.01, 1.0),
            characters,
            glow_effect: !self.no_glow,
            depth_effect: !self.no_depth,
            glyph_size: require_f32_range("--font-size", self.font_size, 8.0, 48.0),
            ..RainConfig::default()
        }
    }

    pub fn particle_config(&self) -> ParticleConfig {
        ParticleConfig {
            count: require_usize_range("--particles", self.particles, 0, MAX_PARTICLES),
            connect_distance: require_f32_range(
                "--connect-distance",
                self.connect_distance,
                10.0,
                500.0,
            ),
            opacity: require_f32_range("--particle-opacity", self.particle_opacity, 0.1, 1.0),
            pulse_effect: !self.no_pulse,
            size: require_f32_range("--particle-size", self.particle_size, 0.5, 10.0),
            depth_effect: !self.no_depth,
            trail_effect: !self.no_trail,
        }
    }
}

pub fn print_list_charsets() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE CHARSET PRESETS:\x1b[0m");
        println!("\x1b[2mNOTE: Use only the VALUE (left side) with --charset.\x1b[0m");
    } else {
        println!("AVAILABLE CHARSET PRESETS:");
        println!("NOTE: Use only the VALUE (left side) with --charset.");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    for (name, desc) in PRESETS {
        println!("{:<12} {}", name, desc);
    }
}

pub fn print_check_bitcolor(args: &Args) {
    let colorterm = std::env::var("COLORTERM").unwrap_or_default();
    let term = std::env::var("TERM").unwrap_or_default();
    let auto = detect_color_mode_auto();
    let effective = args.color_mode();

    println!("BITCOLOR CHECK:");
    println!(
        "  COLORTERM: {}",
        if colorterm.is_empty() {
            "(unset)"
        } else {
            &colorterm
        }
    );
    println!(
        "  TERM: {}",
        if term.is_empty() { "(unset)" } else { &term }
    );
    println!("  auto_detected: {}", auto.label());
    if args.colormode.is_some() {
        println!("  forced: {}", effective.label());
    }
    println!("  effective: {}", effective.label());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let args = Args::try_parse_from(["nexusfolio"]).unwrap();
        assert_eq!(args.background, Backdrop::Both);
        assert_eq!(args.theme, None);
        let rain = args.rain_config();
        assert_eq!(rain.fade_opacity, 0.05);
        assert!(rain.glow_effect);
        let p = args.particle_config();
        assert_eq!(p.count, 70);
        assert_eq!(p.connect_distance, 150.0);
    }

    #[test]
    fn flags_reach_configs() {
        let args = Args::try_parse_from([
            "nexusfolio",
            "--background",
            "particles",
            "--theme",
            "light",
            "--chars",
            "AB",
            "--no-glow",
            "--no-trail",
            "--particles",
            "12",
        ])
        .unwrap();
        assert_eq!(args.background, Backdrop::Particles);
        assert_eq!(args.theme, Some(Theme::Light));
        let rain = args.rain_config();
        assert_eq!(rain.characters, vec!['A', 'B']);
        assert!(!rain.glow_effect);
        let p = args.particle_config();
        assert_eq!(p.count, 12);
        assert!(!p.trail_effect);
    }

    #[test]
    fn bad_theme_is_rejected_by_parser() {
        assert!(Args::try_parse_from(["nexusfolio", "--theme", "sepia"]).is_err());
    }

    #[test]
    fn colormode_flags() {
        assert_eq!(color_mode_from_flag(0), Some(ColorMode::Mono));
        assert_eq!(color_mode_from_flag(16), Some(ColorMode::Color16));
        assert_eq!(color_mode_from_flag(256), Some(ColorMode::Color256));
        assert_eq!(color_mode_from_flag(32), Some(ColorMode::TrueColor));
        assert_eq!(color_mode_from_flag(7), None);
    }

    #[test]
    fn usage_colorizer_marks_headings() {
        let out = colorize_usage(DEFAULT_PARAMS_USAGE);
        assert!(out.starts_with("\x1b[1;36mDEFAULT PARAMS USAGE:\x1b[0m"));
    }
}
