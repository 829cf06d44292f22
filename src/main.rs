// Copyright (c) 2026 rezky_nightky

mod cell;
mod charset;
mod config;
mod frame;
mod logging;
mod palette;
mod particles;
mod rain;
mod runtime;
mod screen;
mod shell;
mod storage;
mod surface;
mod theme;
mod window;

use std::cell::Cell as Flag;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use anyhow::Context as _;
use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, warn};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_check_bitcolor,
    print_list_charsets, Args, ColorBg,
};
use crate::frame::Frame;
use crate::palette::{background, theme_colors};
use crate::particles::ParticleRenderer;
use crate::rain::RainRenderer;
use crate::screen::{restore_terminal_best_effort, Screen};
use crate::shell::{Effect, Monitor, Shell};
use crate::storage::{MemoryStore, PreferenceStore, TomlStore};
use crate::surface::Canvas;
use crate::theme::{AmbientSignal, EnvAmbient, ThemeStore};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

/// Shell font size the rain's `--font-size` corresponds to.
const BASE_SHELL_FONT: f32 = 14.0;
const CURSOR_BLINK: Duration = Duration::from_millis(530);

fn build_info() -> &'static str {
    env!("NEXUSFOLIO_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn parse_args() -> Args {
    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches();
    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn open_theme_store(args: &Args) -> ThemeStore {
    let path = args.prefs.clone().or_else(TomlStore::default_path);
    let store: Box<dyn PreferenceStore> = match path.map(TomlStore::open) {
        Some(Ok(s)) => {
            info!(path = %s.path().display(), "preferences loaded");
            Box::new(s)
        }
        Some(Err(e)) => {
            warn!(error = %e, "preferences unavailable, theme kept in memory");
            Box::new(MemoryStore::new())
        }
        None => {
            warn!("no config directory, theme kept in memory");
            Box::new(MemoryStore::new())
        }
    };
    ThemeStore::load(store, &EnvAmbient)
}

fn apply_effects(effects: &[Effect], themes: &mut ThemeStore) -> bool {
    let mut running = true;
    for effect in effects {
        match *effect {
            Effect::ToggleTheme => {
                themes.toggle();
            }
            Effect::SetTheme(t) => themes.set(t),
            Effect::Quit => running = false,
        }
    }
    running
}

fn arrow_delta(code: KeyCode) -> Option<(i16, i16)> {
    match code {
        KeyCode::Left => Some((-1, 0)),
        KeyCode::Right => Some((1, 0)),
        KeyCode::Up => Some((0, -1)),
        KeyCode::Down => Some((0, 1)),
        _ => None,
    }
}

fn handle_key(k: KeyEvent, shell: &mut Shell, themes: &mut ThemeStore, now: Instant) -> bool {
    let ctrl = k.modifiers.contains(KeyModifiers::CONTROL);
    let alt = k.modifiers.contains(KeyModifiers::ALT);

    match k.code {
        KeyCode::Char('q') if ctrl => return false,
        KeyCode::Char('c') if ctrl => shell.clear_input(),
        KeyCode::Char('l') if ctrl => shell.clear_screen(),
        KeyCode::Char('t') if ctrl => {
            themes.toggle();
        }
        KeyCode::F(11) => shell.toggle_fullscreen(),
        KeyCode::Esc => shell.exit_fullscreen(),
        _ if shell.display().minimized => {
            if k.code == KeyCode::Enter {
                shell.restore();
            }
        }
        code if alt && arrow_delta(code).is_some() => {
            if let Some((dx, dy)) = arrow_delta(code) {
                let which = if k.modifiers.contains(KeyModifiers::SHIFT) {
                    Monitor::Security
                } else {
                    Monitor::System
                };
                shell.nudge_monitor(which, dx, dy);
            }
        }
        KeyCode::Enter => {
            if let Some(sub) = shell.submit_input(now) {
                return apply_effects(&sub.effects, themes);
            }
        }
        KeyCode::Up => shell.recall_previous(),
        KeyCode::Down => shell.recall_next(),
        KeyCode::Tab => shell.autocomplete(),
        KeyCode::Backspace => shell.backspace(),
        KeyCode::Char(c) if !ctrl && !alt => shell.insert_char(c),
        _ => {}
    }
    true
}

fn main() -> anyhow::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let args = parse_args();

    if args.list_charsets {
        print_list_charsets();
        return Ok(());
    }

    if args.check_bitcolor {
        print_check_bitcolor(&args);
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        let sha = env!("NEXUSFOLIO_GIT_SHA");
        if !sha.is_empty() {
            println!("Commit: {}", sha);
        }
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        return Ok(());
    }

    // Validate everything before the terminal is taken over.
    let color_mode = args.color_mode();
    let target_fps = args.target_fps();
    let duration_s = args.duration_secs();
    let rain_config = args.rain_config();
    let particle_config = args.particle_config();
    let base_glyph = rain_config.glyph_size;
    let default_bg = args.color_bg == ColorBg::DefaultBackground;

    logging::init();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        build = build_info(),
        color_mode = color_mode.label(),
        "starting"
    );

    let mut themes = open_theme_store(&args);
    if let Some(t) = args.theme {
        themes.set(t);
    }
    let theme_changed = Rc::new(Flag::new(false));
    let theme_sub = {
        let flag = Rc::clone(&theme_changed);
        themes.subscribe(move |_| flag.set(true))
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, "rng seeded");
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rain = RainRenderer::new(rain_config, StdRng::seed_from_u64(rng.random()));
    let mut particles = ParticleRenderer::new(particle_config, StdRng::seed_from_u64(rng.random()));

    let start_time = Instant::now();
    let mut shell = Shell::new(
        start_time,
        StdRng::seed_from_u64(rng.random()),
        !args.no_boot,
    );

    let mut screen = Screen::new().context("failed to set up the terminal")?;
    let (mut cols, mut rows) = screen.size()?;

    let mut theme = themes.get();
    let mut rain_canvas = Canvas::new(cols, rows, theme_colors(theme).background);
    let mut particle_canvas = Canvas::new(cols, rows, theme_colors(theme).background);
    let mut frame = Frame::new(cols, rows, background(theme, color_mode, default_bg));

    let end_time = duration_s.map(|s| start_time + Duration::from_secs_f64(s));
    let target_period = Duration::from_secs_f64(1.0 / target_fps);
    let mut next_frame = Instant::now();
    let mut last_tick = Instant::now();
    let mut last_font = shell.settings().font_size;
    let mut rain_was_on = false;
    let mut running = true;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Screen::poll_event(Duration::from_millis(0))? {
                match Screen::read_event()? {
                    Event::Resize(nw, nh) => pending_resize = Some((nw, nh)),
                    Event::FocusGained => {
                        themes.ambient_changed(EnvAmbient.prefers_dark());
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if !handle_key(k, &mut shell, &mut themes, Instant::now()) {
                            running = false;
                            break;
                        }
                    }
                    _ => {}
                }
            }

            if !running || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Screen::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            cols = nw;
            rows = nh;
            rain_canvas.resize(cols, rows);
            particle_canvas.resize(cols, rows);
            frame = Frame::new(cols, rows, background(theme, color_mode, default_bg));
            screen.invalidate();
            info!(cols, rows, "resized");
            debug!(
                drops = rain.drops().len(),
                columns = rain.columns(),
                particles = particles.particles().len(),
                "renderer fields"
            );
        }
        let attached = cols > 0 && rows > 0;
        rain_canvas.set_attached(attached);
        particle_canvas.set_attached(attached);

        let now = Instant::now();
        let dt = now.saturating_duration_since(last_tick);
        last_tick = now;

        if theme_changed.replace(false) {
            theme = themes.get();
            let bg = theme_colors(theme).background;
            rain_canvas.wipe(bg);
            particle_canvas.wipe(bg);
        }

        let font = shell.settings().font_size;
        if font != last_font {
            let mut cfg = rain.config().clone();
            cfg.glyph_size = base_glyph * f32::from(font) / BASE_SHELL_FONT;
            rain.set_config(cfg);
            last_font = font;
        }

        shell.tick(now);

        let rain_on = args.background.has_rain() || shell.display().matrix_mode;
        if rain_on {
            rain.tick(&mut rain_canvas, theme, dt);
        } else if rain_was_on {
            rain_canvas.wipe(theme_colors(theme).background);
        }
        rain_was_on = rain_on;

        let particles_on = args.background.has_particles();
        if particles_on {
            particles.tick(&mut particle_canvas, theme, dt);
        }

        let bg = background(theme, color_mode, default_bg);
        let mut layers: Vec<&Canvas> = Vec::with_capacity(2);
        if particles_on {
            layers.push(&particle_canvas);
        }
        if rain_on {
            layers.push(&rain_canvas);
        }
        Canvas::present_layers(&layers, &mut frame, color_mode, bg);

        let cursor_on = (now.saturating_duration_since(start_time).as_millis()
            / CURSOR_BLINK.as_millis())
            % 2
            == 0;
        window::draw_window(&mut frame, &shell, theme, color_mode, cursor_on);
        window::draw_hud(&mut frame, &shell, theme, color_mode);
        screen.draw(&frame)?;

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    drop(screen);
    themes.unsubscribe(theme_sub);
    info!(
        elapsed_s = start_time.elapsed().as_secs_f64(),
        commands = shell.history().len(),
        "exiting"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn fixture() -> (Shell, ThemeStore, Instant) {
        let t0 = Instant::now();
        let shell = Shell::new(t0, StdRng::seed_from_u64(3), false);
        let themes = ThemeStore::load(Box::new(MemoryStore::new()), &|| true);
        (shell, themes, t0)
    }

    fn type_line(shell: &mut Shell, themes: &mut ThemeStore, t: Instant, text: &str) -> bool {
        for c in text.chars() {
            handle_key(key(KeyCode::Char(c), KeyModifiers::NONE), shell, themes, t);
        }
        handle_key(key(KeyCode::Enter, KeyModifiers::NONE), shell, themes, t)
    }

    #[test]
    fn typing_and_enter_runs_a_command() {
        let (mut sh, mut th, t0) = fixture();
        assert!(type_line(&mut sh, &mut th, t0, "echo hi"));
        assert_eq!(sh.history().len(), 1);
        assert_eq!(sh.input(), "");
    }

    #[test]
    fn theme_command_and_ctrl_t_reach_the_store() {
        let (mut sh, mut th, t0) = fixture();
        type_line(&mut sh, &mut th, t0, "theme light");
        assert_eq!(th.get(), theme::Theme::Light);
        handle_key(key(KeyCode::Char('t'), KeyModifiers::CONTROL), &mut sh, &mut th, t0);
        assert_eq!(th.get(), theme::Theme::Dark);
    }

    #[test]
    fn quit_paths_stop_the_loop() {
        let (mut sh, mut th, t0) = fixture();
        assert!(!handle_key(key(KeyCode::Char('q'), KeyModifiers::CONTROL), &mut sh, &mut th, t0));
        assert!(!type_line(&mut sh, &mut th, t0, "quit"));
    }

    #[test]
    fn minimized_window_only_listens_for_enter() {
        let (mut sh, mut th, t0) = fixture();
        type_line(&mut sh, &mut th, t0, "exit");
        sh.tick(t0 + Duration::from_secs(3));
        assert!(sh.display().minimized);

        handle_key(key(KeyCode::Char('x'), KeyModifiers::NONE), &mut sh, &mut th, t0);
        assert_eq!(sh.input(), "");
        handle_key(key(KeyCode::Enter, KeyModifiers::NONE), &mut sh, &mut th, t0);
        assert!(!sh.display().minimized);
    }

    #[test]
    fn ctrl_c_clears_input_and_alt_arrows_move_monitors() {
        let (mut sh, mut th, t0) = fixture();
        sh.set_input("half typed");
        handle_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL), &mut sh, &mut th, t0);
        assert_eq!(sh.input(), "");

        let before = sh.display().system_monitor_at;
        handle_key(key(KeyCode::Right, KeyModifiers::ALT), &mut sh, &mut th, t0);
        assert_eq!(sh.display().system_monitor_at, (before.0 + 1, before.1));
    }

    #[test]
    fn f11_and_esc_drive_fullscreen() {
        let (mut sh, mut th, t0) = fixture();
        handle_key(key(KeyCode::F(11), KeyModifiers::NONE), &mut sh, &mut th, t0);
        assert!(sh.settings().fullscreen);
        handle_key(key(KeyCode::Esc, KeyModifiers::NONE), &mut sh, &mut th, t0);
        assert!(!sh.settings().fullscreen);
    }
}
