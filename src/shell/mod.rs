// Copyright (c) 2026 rezky_nightky

pub mod boot;
pub mod card;
mod commands;
pub mod feed;
pub mod history;
pub mod stats;
pub mod timers;

use std::str::FromStr;
use std::time::Instant;

use rand::rngs::StdRng;
use tracing::{debug, info};

use self::boot::{BootPlayback, REPLAY_LINE_INTERVAL, STARTUP_LINE_INTERVAL};
use self::card::TaglinePlayback;
use self::commands::CommandContext;
use self::feed::{SecurityEvent, SecurityFeed};
use self::history::{CommandHistory, HistoryEntry, Recall};
use self::stats::{StatsCollector, SystemStats};
use self::timers::Timers;
use crate::theme::Theme;

pub const PROMPT_HEADER: &str = "┌──(root@nexus)-[~]";
pub const PROMPT_MARK: &str = "└─$ ";
pub const MAX_SCROLLBACK: usize = 1000;

const NOT_FOUND_HINT: &str = "[HINT] Type 'help' for available commands";

pub const SYSTEM_MONITOR_HOME: (u16, u16) = (2, 1);
pub const SECURITY_MONITOR_HOME: (u16, u16) = (2, 12);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    ToggleTheme,
    SetTheme(Theme),
    Quit,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Submission {
    pub output: Vec<String>,
    pub effects: Vec<Effect>,
    pub is_error: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TerminalTheme {
    #[default]
    Auto,
    Matrix,
    Dark,
    Light,
}

impl TerminalTheme {
    pub fn as_str(self) -> &'static str {
        match self {
            TerminalTheme::Auto => "auto",
            TerminalTheme::Matrix => "matrix",
            TerminalTheme::Dark => "dark",
            TerminalTheme::Light => "light",
        }
    }
}

impl FromStr for TerminalTheme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(TerminalTheme::Auto),
            "matrix" => Ok(TerminalTheme::Matrix),
            "dark" => Ok(TerminalTheme::Dark),
            "light" => Ok(TerminalTheme::Light),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub font_size: u8,
    pub opacity: f32,
    pub theme: TerminalTheme,
    pub always_on_top: bool,
    pub fullscreen: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_size: 14,
            opacity: 0.95,
            theme: TerminalTheme::Auto,
            always_on_top: false,
            fullscreen: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Display {
    pub matrix_mode: bool,
    pub hud: bool,
    pub system_monitor: bool,
    pub security_monitor: bool,
    pub system_monitor_at: (u16, u16),
    pub security_monitor_at: (u16, u16),
    pub minimized: bool,
    pub powering_down: bool,
    pub scanning: bool,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            matrix_mode: false,
            hud: true,
            system_monitor: true,
            security_monitor: true,
            system_monitor_at: SYSTEM_MONITOR_HOME,
            security_monitor_at: SECURITY_MONITOR_HOME,
            minimized: false,
            powering_down: false,
            scanning: false,
        }
    }
}

impl Display {
    pub fn reset_monitor_positions(&mut self) {
        self.system_monitor_at = SYSTEM_MONITOR_HOME;
        self.security_monitor_at = SECURITY_MONITOR_HOME;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Monitor {
    System,
    Security,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Deferred {
    EndScan,
    Minimize,
    Reboot,
}

pub struct Shell {
    scrollback: Vec<String>,
    input: String,
    history: CommandHistory,
    settings: Settings,
    display: Display,
    timers: Timers<Deferred>,
    boot: Option<BootPlayback>,
    tagline: Option<TaglinePlayback>,
    feed: SecurityFeed,
    stats: StatsCollector,
    started: Instant,
    rng: StdRng,
}

impl Shell {
    pub fn new(now: Instant, mut rng: StdRng, boot: bool) -> Self {
        let feed = SecurityFeed::new(now, &mut rng);
        let mut shell = Self {
            scrollback: Vec::new(),
            input: String::new(),
            history: CommandHistory::default(),
            settings: Settings::default(),
            display: Display::default(),
            timers: Timers::default(),
            boot: None,
            tagline: None,
            feed,
            stats: StatsCollector::new(),
            started: now,
            rng,
        };
        if boot {
            shell.boot = Some(BootPlayback::start(now, STARTUP_LINE_INTERVAL));
        } else {
            shell.push_line(boot::BOOT_FOOTER.to_string());
        }
        shell
    }

    /// Anything written while a tagline is typing lands after it, so the
    /// tagline is completed first.
    fn push_line(&mut self, line: String) {
        if let Some(t) = self.tagline.take() {
            for rest in t.remaining() {
                self.append_line(rest.to_string());
            }
        }
        self.append_line(line);
    }

    fn append_line(&mut self, line: String) {
        self.scrollback.push(line);
        if self.scrollback.len() > MAX_SCROLLBACK {
            let excess = self.scrollback.len() - MAX_SCROLLBACK;
            self.scrollback.drain(..excess);
        }
    }

    fn echo_prompt(&mut self, text: &str) {
        self.push_line(PROMPT_HEADER.to_string());
        self.push_line(format!("{PROMPT_MARK}{text}"));
    }

    pub fn submit(&mut self, raw: &str, now: Instant) -> Submission {
        let raw = raw.trim();
        self.input.clear();
        self.history.reset_cursor();
        if raw.is_empty() {
            return Submission::default();
        }

        let mut tokens = raw.split_whitespace();
        let name = tokens.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = tokens.collect();

        self.echo_prompt(raw);

        let mut effects = Vec::new();
        let mut type_tagline = false;
        let (output, is_error, clear) = match commands::lookup(&name) {
            Some(handler) => {
                let mut ctx = CommandContext {
                    settings: &mut self.settings,
                    display: &mut self.display,
                    timers: &mut self.timers,
                    history: &self.history,
                    stats: self.stats.stats(),
                    effects: &mut effects,
                    rng: &mut self.rng,
                    now,
                    clear_screen: false,
                    type_tagline: false,
                };
                let output = handler(&args, &mut ctx);
                type_tagline = ctx.type_tagline;
                (output, false, ctx.clear_screen)
            }
            None => (
                vec![
                    format!("Command not found: {name}"),
                    NOT_FOUND_HINT.to_string(),
                ],
                true,
                false,
            ),
        };

        if clear {
            self.clear_screen();
        } else {
            for line in &output {
                self.push_line(line.clone());
            }
            if type_tagline {
                self.tagline = Some(TaglinePlayback::start(now));
            }
        }

        if is_error {
            debug!(command = %name, "unknown command");
        } else {
            info!(command = %name, args = args.len(), "command executed");
        }

        self.history.push(HistoryEntry {
            input: raw.to_string(),
            output: output.clone(),
            is_error,
        });

        Submission {
            output,
            effects,
            is_error,
        }
    }

    pub fn submit_input(&mut self, now: Instant) -> Option<Submission> {
        let raw = std::mem::take(&mut self.input);
        if raw.trim().is_empty() {
            self.history.reset_cursor();
            return None;
        }
        Some(self.submit(&raw, now))
    }

    pub fn recall_previous(&mut self) {
        if let Recall::Entry(s) = self.history.recall_previous() {
            self.input = s.to_string();
        }
    }

    pub fn recall_next(&mut self) {
        match self.history.recall_next() {
            Recall::Entry(s) => self.input = s.to_string(),
            Recall::Cleared => self.input.clear(),
            Recall::Unchanged => {}
        }
    }

    pub fn autocomplete(&mut self) {
        let Some(prefix) = self.input.split_whitespace().next().map(str::to_lowercase) else {
            return;
        };
        let matches: Vec<&str> = commands::names()
            .filter(|n| n.starts_with(prefix.as_str()))
            .collect();
        match matches.as_slice() {
            [] => {}
            [only] => self.input = only.to_string(),
            many => {
                let listed = many.join("  ");
                let typed = self.input.clone();
                self.echo_prompt(&typed);
                self.push_line("Possible commands:".to_string());
                self.push_line(listed);
            }
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if !c.is_control() {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.history.reset_cursor();
    }

    pub fn clear_screen(&mut self) {
        self.scrollback.clear();
        self.tagline = None;
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    #[cfg(test)]
    pub fn set_input(&mut self, s: impl Into<String>) {
        self.input = s.into();
    }

    pub fn scrollback(&self) -> &[String] {
        &self.scrollback
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn typing_line(&self) -> Option<&str> {
        self.tagline.as_ref().map(TaglinePlayback::typing)
    }

    pub fn is_booting(&self) -> bool {
        self.boot.is_some()
    }

    pub fn events(&self) -> impl Iterator<Item = &SecurityEvent> {
        self.feed.events()
    }

    pub fn stats(&self) -> &SystemStats {
        self.stats.stats()
    }

    pub fn restore(&mut self) {
        if self.display.minimized {
            info!("terminal restored");
        }
        self.display.minimized = false;
        self.display.powering_down = false;
    }

    pub fn toggle_fullscreen(&mut self) {
        self.settings.fullscreen = !self.settings.fullscreen;
    }

    pub fn exit_fullscreen(&mut self) {
        self.settings.fullscreen = false;
    }

    pub fn nudge_monitor(&mut self, which: Monitor, dx: i16, dy: i16) {
        let at = match which {
            Monitor::System => &mut self.display.system_monitor_at,
            Monitor::Security => &mut self.display.security_monitor_at,
        };
        at.0 = at.0.saturating_add_signed(dx);
        at.1 = at.1.saturating_add_signed(dy);
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;

        for action in self.timers.drain_due(now) {
            debug!(?action, "deferred action");
            match action {
                Deferred::EndScan => self.display.scanning = false,
                Deferred::Minimize => {
                    self.display.minimized = true;
                    self.display.powering_down = false;
                    info!("terminal minimized");
                }
                Deferred::Reboot => {
                    self.clear_screen();
                    self.boot = Some(BootPlayback::start(now, REPLAY_LINE_INTERVAL));
                }
            }
            changed = true;
        }

        let (lines, done) = match self.boot.as_mut() {
            Some(b) => (b.poll(now), b.is_done()),
            None => (Vec::new(), false),
        };
        if !lines.is_empty() {
            changed = true;
            for line in lines {
                self.push_line(line.to_string());
            }
        }
        if done {
            self.boot = None;
        }

        if let Some(t) = self.tagline.as_mut() {
            let (finished, moved) = t.poll(now);
            let done = t.is_done();
            changed |= moved;
            for line in finished {
                self.append_line(line.to_string());
            }
            if done {
                self.tagline = None;
            }
        }

        changed |= self.feed.poll(now, &mut self.rng);
        changed |= self.stats.maybe_refresh(
            now,
            self.started,
            self.feed.threats_blocked(),
            self.feed.connections(),
            &mut self.rng,
        );
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::time::Duration;

    fn shell() -> (Shell, Instant) {
        let t0 = Instant::now();
        (Shell::new(t0, StdRng::seed_from_u64(42), false), t0)
    }

    #[test]
    fn unknown_command_reports_and_records() {
        let (mut sh, t0) = shell();
        let sub = sh.submit("frobnicate", t0);
        assert_eq!(
            sub.output,
            vec![
                "Command not found: frobnicate".to_string(),
                NOT_FOUND_HINT.to_string()
            ]
        );
        assert!(sub.is_error);
        assert_eq!(sh.history().len(), 1);
        assert!(sh.history().iter().all(|e| e.is_error));
    }

    #[test]
    fn blank_input_is_ignored() {
        let (mut sh, t0) = shell();
        let before = sh.scrollback().len();
        assert_eq!(sh.submit("   ", t0), Submission::default());
        assert!(sh.submit_input(t0).is_none());
        assert!(sh.history().is_empty());
        assert_eq!(sh.scrollback().len(), before);
    }

    #[test]
    fn names_are_case_insensitive_and_echoed() {
        let (mut sh, t0) = shell();
        let sub = sh.submit("  ECHO hello   world ", t0);
        assert_eq!(sub.output, vec!["hello world".to_string()]);
        let tail = &sh.scrollback()[sh.scrollback().len() - 3..];
        assert_eq!(tail[0], PROMPT_HEADER);
        assert_eq!(tail[1], format!("{PROMPT_MARK}ECHO hello   world"));
    }

    #[test]
    fn recall_walks_back_then_clears() {
        let (mut sh, t0) = shell();
        sh.submit("whoami", t0);
        sh.submit("date", t0);

        sh.recall_previous();
        assert_eq!(sh.input(), "date");
        sh.recall_previous();
        assert_eq!(sh.input(), "whoami");
        sh.recall_previous();
        assert_eq!(sh.input(), "whoami");
        sh.recall_next();
        assert_eq!(sh.input(), "date");
        sh.recall_next();
        assert_eq!(sh.input(), "");
    }

    #[test]
    fn autocomplete_single_and_ambiguous() {
        let (mut sh, _) = shell();
        sh.set_input("hel");
        sh.autocomplete();
        assert_eq!(sh.input(), "help");

        sh.set_input("h");
        let before = sh.scrollback().len();
        sh.autocomplete();
        assert_eq!(sh.input(), "h");
        let added = &sh.scrollback()[before..];
        assert_eq!(added[2], "Possible commands:");
        assert_eq!(added[3], "help  hud  history");

        sh.set_input("zzz");
        let before = sh.scrollback().len();
        sh.autocomplete();
        assert_eq!(sh.input(), "zzz");
        assert_eq!(sh.scrollback().len(), before);
    }

    #[test]
    fn nmap_scanning_clears_after_three_seconds() {
        let (mut sh, t0) = shell();
        sh.submit("nmap 10.0.0.1", t0);
        assert!(sh.display().scanning);
        sh.tick(t0 + Duration::from_millis(2900));
        assert!(sh.display().scanning);
        assert!(sh.tick(t0 + Duration::from_secs(3)));
        assert!(!sh.display().scanning);
    }

    #[test]
    fn exit_minimizes_and_restore_brings_back() {
        let (mut sh, t0) = shell();
        sh.submit("exit", t0);
        assert!(sh.display().powering_down);
        sh.tick(t0 + Duration::from_secs(3));
        assert!(sh.display().minimized);
        assert!(!sh.display().powering_down);
        sh.restore();
        assert!(!sh.display().minimized);
    }

    #[test]
    fn reset_replays_boot_after_delay() {
        let (mut sh, t0) = shell();
        sh.submit("reset", t0);
        let t1 = t0 + Duration::from_millis(1500);
        sh.tick(t1);
        assert!(sh.is_booting());
        assert!(sh.scrollback().is_empty());

        sh.tick(t1 + REPLAY_LINE_INTERVAL * 40);
        assert!(!sh.is_booting());
        assert_eq!(sh.scrollback()[0], boot::BOOT_SEQUENCE[0]);
        assert_eq!(sh.scrollback().last().map(String::as_str), Some(boot::BOOT_FOOTER));
    }

    #[test]
    fn set_font_validates_range() {
        let (mut sh, t0) = shell();
        let sub = sh.submit("set_font 30", t0);
        assert_eq!(sub.output, vec!["[ERROR] Font size must be between 8 and 24".to_string()]);
        assert_eq!(sh.settings().font_size, 14);
        sh.submit("set_font 18", t0);
        assert_eq!(sh.settings().font_size, 18);
    }

    #[test]
    fn clear_empties_scrollback_but_keeps_history() {
        let (mut sh, t0) = shell();
        sh.submit("status", t0);
        sh.submit("clear", t0);
        assert!(sh.scrollback().is_empty());
        assert_eq!(sh.history().len(), 2);
    }

    #[test]
    fn theme_command_emits_effects() {
        let (mut sh, t0) = shell();
        assert_eq!(sh.submit("theme", t0).effects, vec![Effect::ToggleTheme]);
        assert_eq!(
            sh.submit("theme light", t0).effects,
            vec![Effect::SetTheme(Theme::Light)]
        );
        assert!(sh.submit("theme sepia", t0).effects.is_empty());
        assert_eq!(sh.submit("quit", t0).effects, vec![Effect::Quit]);
    }

    #[test]
    fn move_monitors_resets_positions() {
        let (mut sh, t0) = shell();
        sh.nudge_monitor(Monitor::System, 5, 3);
        sh.nudge_monitor(Monitor::Security, -10, 0);
        assert_eq!(sh.display().system_monitor_at, (7, 4));
        assert_eq!(sh.display().security_monitor_at, (0, 12));
        sh.submit("move_monitors", t0);
        assert_eq!(sh.display().system_monitor_at, SYSTEM_MONITOR_HOME);
        assert_eq!(sh.display().security_monitor_at, SECURITY_MONITOR_HOME);
    }

    #[test]
    fn autocomplete_looks_at_the_first_word_only() {
        let (mut sh, _) = shell();
        sh.set_input("hel me");
        sh.autocomplete();
        assert_eq!(sh.input(), "help");

        sh.set_input("h x");
        let before = sh.scrollback().len();
        sh.autocomplete();
        assert_eq!(sh.input(), "h x");
        let added = &sh.scrollback()[before..];
        assert_eq!(added[1], format!("{PROMPT_MARK}h x"));
        assert_eq!(added[3], "help  hud  history");

        sh.set_input("   ");
        let before = sh.scrollback().len();
        sh.autocomplete();
        assert_eq!(sh.scrollback().len(), before);
    }

    #[test]
    fn social_prints_card_then_types_taglines() {
        let (mut sh, t0) = shell();
        let sub = sh.submit("social", t0);
        assert!(sub.output.iter().any(|l| l.contains(card::CONTACT_EMAIL)));
        assert_eq!(sh.typing_line(), Some(""));
        let after_card = sh.scrollback().len();

        let (first, step) = card::TAGLINES[0];
        assert!(sh.tick(t0 + step * 4));
        assert_eq!(sh.typing_line(), Some(&first[..4]));
        assert_eq!(sh.scrollback().len(), after_card);

        sh.tick(t0 + Duration::from_secs(30));
        assert_eq!(sh.typing_line(), None);
        let typed: Vec<&str> = sh.scrollback()[after_card..].iter().map(String::as_str).collect();
        assert_eq!(typed, vec![card::TAGLINES[0].0, card::TAGLINES[1].0]);
    }

    #[test]
    fn new_output_completes_a_tagline_in_progress() {
        let (mut sh, t0) = shell();
        sh.submit("contact", t0);
        let after_card = sh.scrollback().len();
        sh.submit("whoami", t0);
        assert_eq!(sh.typing_line(), None);
        assert_eq!(sh.scrollback()[after_card], card::TAGLINES[0].0);
        assert_eq!(sh.scrollback()[after_card + 1], card::TAGLINES[1].0);
        assert_eq!(sh.scrollback()[after_card + 2], PROMPT_HEADER);
    }

    #[test]
    fn clear_drops_a_tagline_in_progress() {
        let (mut sh, t0) = shell();
        sh.submit("social", t0);
        sh.clear_screen();
        assert_eq!(sh.typing_line(), None);
        sh.tick(t0 + Duration::from_secs(30));
        assert!(sh.scrollback().is_empty());
    }

    #[test]
    fn history_command_lists_previous_inputs() {
        let (mut sh, t0) = shell();
        sh.submit("whoami", t0);
        let sub = sh.submit("history", t0);
        assert_eq!(sub.output, vec!["    1  whoami".to_string()]);
    }

    #[test]
    fn scrollback_is_bounded() {
        let (mut sh, t0) = shell();
        for _ in 0..400 {
            sh.submit("echo x", t0);
        }
        assert_eq!(sh.scrollback().len(), MAX_SCROLLBACK);
    }

    #[test]
    fn startup_boot_plays_at_startup_pace() {
        let t0 = Instant::now();
        let mut sh = Shell::new(t0, StdRng::seed_from_u64(1), true);
        assert!(sh.scrollback().is_empty());
        sh.tick(t0 + STARTUP_LINE_INTERVAL);
        assert_eq!(sh.scrollback()[0], boot::BOOT_SEQUENCE[0]);
    }
}
