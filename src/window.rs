// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::{
    cell::Cell,
    frame::Frame,
    palette::{quantize, theme_colors, Rgb, ThemeColors},
    runtime::ColorMode,
    shell::{
        feed::Severity,
        stats::format_uptime,
        Shell, TerminalTheme, PROMPT_HEADER, PROMPT_MARK,
    },
    theme::Theme,
};

const MAX_WIDTH: u16 = 100;
const MAX_HEIGHT: u16 = 32;
const MIN_WIDTH: u16 = 24;
const MIN_HEIGHT: u16 = 6;

const TITLE: &str = " ● ● ●  root@nexus: ~ ";
const MINIMIZED_TAB: &str = " ▣ NEXUS TERMINAL  [Enter] restore ";
const SYSTEM_MONITOR_W: u16 = 32;
const SECURITY_MONITOR_W: u16 = 52;
const BAR_W: usize = 12;

/// Below this opacity blank window cells let the backdrop through, dimmed.
const SEE_THROUGH_BELOW: f32 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

pub fn window_rect(cols: u16, rows: u16, fullscreen: bool) -> Option<Rect> {
    if cols < MIN_WIDTH || rows < MIN_HEIGHT {
        return None;
    }
    if fullscreen {
        return Some(Rect {
            x: 0,
            y: 0,
            w: cols,
            h: rows,
        });
    }
    let w = cols.saturating_sub(4).clamp(MIN_WIDTH, MAX_WIDTH).min(cols);
    let h = rows.saturating_sub(4).clamp(MIN_HEIGHT, MAX_HEIGHT).min(rows);
    Some(Rect {
        x: (cols - w) / 2,
        y: (rows - h) / 2,
        w,
        h,
    })
}

pub fn window_colors(global: Theme, setting: TerminalTheme) -> ThemeColors {
    match setting {
        TerminalTheme::Auto => theme_colors(global),
        TerminalTheme::Dark => theme_colors(Theme::Dark),
        TerminalTheme::Light => theme_colors(Theme::Light),
        TerminalTheme::Matrix => {
            let mut c = theme_colors(Theme::Dark);
            c.panel = Rgb::new(0, 0, 0);
            c.text = Rgb::new(0, 0xff, 0);
            c.border = Rgb::new(0, 0xff, 0);
            c.accent = Rgb::new(0xcc, 0xff, 0xcc);
            c
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Prompt,
    Error,
    Success,
    Notice,
    Boot,
    Boxed,
    Plain,
}

pub fn classify(line: &str) -> LineKind {
    if line.starts_with(PROMPT_HEADER) || line.starts_with(PROMPT_MARK) {
        LineKind::Prompt
    } else if line.starts_with("[ERROR]") || line.starts_with("Command not found") {
        LineKind::Error
    } else if line.starts_with("[SUCCESS]") {
        LineKind::Success
    } else if line.starts_with("[HINT]") || line.starts_with("[WARNING]") {
        LineKind::Notice
    } else if line.starts_with("[BOOT]") {
        LineKind::Boot
    } else if line.starts_with(['╭', '│', '╰']) {
        LineKind::Boxed
    } else {
        LineKind::Plain
    }
}

struct Pens {
    mono: bool,
    panel: Option<Color>,
    border: Option<Color>,
    text: Option<Color>,
    dim: Option<Color>,
    accent: Option<Color>,
    warn: Option<Color>,
    error: Option<Color>,
}

impl Pens {
    fn new(colors: &ThemeColors, mode: ColorMode, opacity: f32) -> Self {
        let panel = colors.background.lerp(colors.panel, opacity);
        Self {
            mono: mode == ColorMode::Mono,
            panel: quantize(panel, mode),
            border: quantize(colors.border, mode),
            text: quantize(colors.text, mode),
            dim: quantize(colors.text_dim, mode),
            accent: quantize(colors.accent, mode),
            warn: quantize(colors.warn, mode),
            error: quantize(colors.error, mode),
        }
    }

    fn cell(&self, fg: Option<Color>) -> Cell {
        Cell::glyph(' ', fg, self.panel)
    }

    fn line_style(&self, kind: LineKind) -> Cell {
        match kind {
            LineKind::Prompt => self.cell(self.accent).bold(true),
            LineKind::Error => self.cell(self.error).bold(self.mono),
            LineKind::Success => self.cell(self.accent).bold(true),
            LineKind::Notice => self.cell(self.warn),
            LineKind::Boot => self.cell(self.dim).dim(self.mono),
            LineKind::Boxed => self.cell(self.border),
            LineKind::Plain => self.cell(self.text),
        }
    }

    fn severity(&self, s: Severity) -> Cell {
        match s {
            Severity::Low => self.cell(self.dim).dim(self.mono),
            Severity::Medium => self.cell(self.text),
            Severity::High => self.cell(self.warn).bold(self.mono),
            Severity::Critical => self.cell(self.error).bold(true),
        }
    }
}

fn draw_border(frame: &mut Frame, r: Rect, style: Cell) {
    let right = r.x.saturating_add(r.w).saturating_sub(1);
    let bottom = r.y.saturating_add(r.h).saturating_sub(1);
    for col in r.x..=right {
        let (top_ch, bottom_ch) = if col == r.x {
            ('╭', '╰')
        } else if col == right {
            ('╮', '╯')
        } else {
            ('─', '─')
        };
        frame.set(col, r.y, Cell { ch: top_ch, ..style });
        frame.set(col, bottom, Cell { ch: bottom_ch, ..style });
    }
    for row in r.y.saturating_add(1)..bottom {
        frame.set(r.x, row, Cell { ch: '│', ..style });
        frame.set(right, row, Cell { ch: '│', ..style });
    }
}

fn fill_inside(frame: &mut Frame, r: Rect, pens: &Pens, see_through: bool) {
    let blank = pens.cell(pens.text);
    let (x, y) = (r.x.saturating_add(1), r.y.saturating_add(1));
    let (w, h) = (r.w.saturating_sub(2), r.h.saturating_sub(2));
    if !see_through {
        frame.fill_rect(x, y, w, h, blank);
        return;
    }
    for row in y..y.saturating_add(h) {
        for col in x..x.saturating_add(w) {
            let under = frame.get(col, row).map(|c| c.ch).unwrap_or(' ');
            let cell = if under != ' ' {
                Cell {
                    ch: under,
                    fg: pens.dim,
                    ..blank
                }
                .dim(true)
            } else {
                blank
            };
            frame.set(col, row, cell);
        }
    }
}

fn draw_box(frame: &mut Frame, at: (u16, u16), w: u16, title: &str, rows: &[(String, Cell)], pens: &Pens) {
    let h = rows.len() as u16 + 2;
    if frame.width < w || frame.height < h {
        return;
    }
    let r = Rect {
        x: at.0.min(frame.width - w),
        y: at.1.min(frame.height - h),
        w,
        h,
    };
    fill_inside(frame, r, pens, false);
    draw_border(frame, r, pens.cell(pens.border));
    frame.put_str(
        r.x + 2,
        r.y,
        r.x + r.w - 1,
        &format!(" {title} "),
        pens.cell(pens.accent).bold(true),
    );
    for (i, (text, style)) in rows.iter().enumerate() {
        frame.put_str(r.x + 2, r.y + 1 + i as u16, r.x + r.w - 2, text, *style);
    }
}

fn bar(pct: f32) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * BAR_W as f32).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_W - filled))
}

pub fn draw_window(frame: &mut Frame, shell: &Shell, global: Theme, mode: ColorMode, cursor_on: bool) {
    let settings = shell.settings();
    let colors = window_colors(global, settings.theme);
    let pens = Pens::new(&colors, mode, settings.opacity);

    if shell.display().minimized {
        let y = frame.height.saturating_sub(1);
        let w = MINIMIZED_TAB.chars().count() as u16;
        frame.put_str(1, y, 1 + w, MINIMIZED_TAB, pens.cell(pens.accent).bold(true));
        return;
    }

    let Some(r) = window_rect(frame.width, frame.height, settings.fullscreen) else {
        return;
    };

    // Matrix mode shows the rain inside the window too.
    let see_through = settings.opacity < SEE_THROUGH_BELOW || shell.display().matrix_mode;
    fill_inside(frame, r, &pens, see_through);
    draw_border(frame, r, pens.cell(pens.border));

    let right = r.x + r.w - 1;
    frame.put_str(r.x + 2, r.y, right, TITLE, pens.cell(pens.text).bold(true));

    let status = if shell.display().powering_down {
        Some((" POWERING DOWN ", pens.cell(pens.error).bold(true)))
    } else if shell.display().scanning {
        Some((" SCANNING ", pens.cell(pens.warn).bold(true)))
    } else if shell.is_booting() {
        Some((" BOOTING ", pens.cell(pens.dim)))
    } else {
        None
    };
    if let Some((tag, style)) = status {
        let w = tag.chars().count() as u16;
        let x = right.saturating_sub(w + 1).max(r.x + 1);
        frame.put_str(x, r.y, right, tag, style);
    }

    let text_x = r.x + 2;
    let text_end = right.saturating_sub(1);
    let prompt_y = r.y + r.h - 3;
    let body_rows = r.h.saturating_sub(4) as usize;

    let typing = shell.typing_line();
    let lines = shell.scrollback();
    let kept = body_rows.saturating_sub(usize::from(typing.is_some()));
    let start = lines.len().saturating_sub(kept);
    let mut row = r.y + 1;
    for line in &lines[start..] {
        let style = pens.line_style(classify(line));
        frame.put_str(text_x, row, text_end, line, style);
        row += 1;
    }
    if let Some(partial) = typing {
        let end = frame.put_str(text_x, row, text_end, partial, pens.cell(pens.accent));
        if cursor_on && end < text_end {
            frame.set(end, row, Cell { ch: '▌', ..pens.cell(pens.accent) });
        }
    }

    frame.put_str(text_x, prompt_y, text_end, PROMPT_HEADER, pens.line_style(LineKind::Prompt));
    let after_mark = frame.put_str(
        text_x,
        prompt_y + 1,
        text_end,
        PROMPT_MARK,
        pens.line_style(LineKind::Prompt),
    );

    // Keep the tail of a long input visible, leaving room for the cursor.
    let room = text_end.saturating_sub(after_mark).saturating_sub(1) as usize;
    let input: Vec<char> = shell.input().chars().collect();
    let shown: String = input[input.len().saturating_sub(room)..].iter().collect();
    let end = frame.put_str(after_mark, prompt_y + 1, text_end, &shown, pens.cell(pens.text));
    if cursor_on {
        let cursor = pens.cell(pens.text).bold(true);
        frame.set(end, prompt_y + 1, Cell { ch: '█', ..cursor });
    }
}

pub fn draw_hud(frame: &mut Frame, shell: &Shell, global: Theme, mode: ColorMode) {
    let display = shell.display();
    if !display.hud || display.minimized {
        return;
    }
    let colors = window_colors(global, shell.settings().theme);
    let pens = Pens::new(&colors, mode, 1.0);
    let text = pens.cell(pens.text);

    if display.system_monitor {
        let s = shell.stats();
        let rows = vec![
            (format!("CPU  {} {:>5.1}%", bar(s.cpu), s.cpu), text),
            (format!("MEM  {} {:>5.1}%", bar(s.memory), s.memory), text),
            (format!("NET  {:.1} MB/s", s.network), text),
            (format!("UP   {}", format_uptime(s.uptime)), text),
            (format!("HOST {}", s.host), pens.cell(pens.dim)),
        ];
        draw_box(frame, display.system_monitor_at, SYSTEM_MONITOR_W, "SYSTEM MONITOR", &rows, &pens);
    }

    if display.security_monitor {
        let s = shell.stats();
        let mut rows = vec![(
            format!("THREATS BLOCKED {:<5} CONNECTIONS {}", s.threats, s.connections),
            pens.cell(pens.accent),
        )];
        let mut any = false;
        for e in shell.events() {
            any = true;
            rows.push((
                format!("{} {:<8} {}", e.at.format("%H:%M:%S"), e.severity.label(), e.message),
                pens.severity(e.severity),
            ));
        }
        if !any {
            rows.push(("monitoring...".to_string(), pens.cell(pens.dim)));
        }
        draw_box(frame, display.security_monitor_at, SECURITY_MONITOR_W, "SECURITY MONITOR", &rows, &pens);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::time::Instant;

    fn row_text(frame: &Frame, y: u16) -> String {
        (0..frame.width)
            .map(|x| frame.get(x, y).map(|c| c.ch).unwrap_or(' '))
            .collect()
    }

    fn shell() -> (Shell, Instant) {
        let t0 = Instant::now();
        (Shell::new(t0, StdRng::seed_from_u64(7), false), t0)
    }

    #[test]
    fn window_is_centred_and_capped() {
        let r = window_rect(200, 60, false).unwrap();
        assert_eq!((r.w, r.h), (MAX_WIDTH, MAX_HEIGHT));
        assert_eq!(r.x, 50);
        assert_eq!(r.y, 14);
        assert_eq!(window_rect(80, 24, true), Some(Rect { x: 0, y: 0, w: 80, h: 24 }));
        assert_eq!(window_rect(10, 24, false), None);
    }

    #[test]
    fn line_kinds_follow_prefix() {
        assert_eq!(classify("[ERROR] Font size must be between 8 and 24"), LineKind::Error);
        assert_eq!(classify("Command not found: x"), LineKind::Error);
        assert_eq!(classify("[SUCCESS] done"), LineKind::Success);
        assert_eq!(classify("[HINT] Type 'help'"), LineKind::Notice);
        assert_eq!(classify("[BOOT] Loading"), LineKind::Boot);
        assert_eq!(classify(PROMPT_HEADER), LineKind::Prompt);
        assert_eq!(classify("╭── X ──╮"), LineKind::Boxed);
        assert_eq!(classify("hello"), LineKind::Plain);
    }

    #[test]
    fn draws_title_scrollback_and_prompt() {
        let (mut sh, t0) = shell();
        sh.submit("echo visible-line", t0);
        sh.set_input("stat");
        let mut f = Frame::new(80, 24, None);
        draw_window(&mut f, &sh, Theme::Dark, ColorMode::TrueColor, true);

        let r = window_rect(80, 24, false).unwrap();
        assert!(row_text(&f, r.y).contains("root@nexus: ~"));
        let all: Vec<String> = (0..24).map(|y| row_text(&f, y)).collect();
        assert!(all.iter().any(|l| l.contains("visible-line")));
        let input_row = &all[(r.y + r.h - 2) as usize];
        assert!(input_row.contains("└─$ stat█"));
    }

    #[test]
    fn tagline_in_progress_follows_scrollback() {
        let (mut sh, t0) = shell();
        sh.submit("social", t0);
        sh.tick(t0 + crate::shell::card::TAGLINES[0].1 * 8);
        let mut f = Frame::new(100, 40, None);
        draw_window(&mut f, &sh, Theme::Dark, ColorMode::TrueColor, false);
        let all: Vec<String> = (0..40).map(|y| row_text(&f, y)).collect();
        let typed = all.iter().position(|l| l.contains("Security") && !l.contains("explorer"));
        let mail = all.iter().position(|l| l.contains(crate::shell::card::CONTACT_EMAIL));
        assert!(typed.is_some() && mail.is_some());
        assert!(typed > mail);
    }

    #[test]
    fn minimized_draws_only_the_tab() {
        let (mut sh, t0) = shell();
        sh.submit("exit", t0);
        sh.tick(t0 + std::time::Duration::from_secs(3));
        let mut f = Frame::new(80, 24, None);
        draw_window(&mut f, &sh, Theme::Dark, ColorMode::Mono, false);
        assert!(row_text(&f, 23).contains("NEXUS TERMINAL"));
        assert!(!(0..23).any(|y| row_text(&f, y).contains("root@nexus")));
    }

    #[test]
    fn fullscreen_uses_whole_screen() {
        let (mut sh, _) = shell();
        sh.toggle_fullscreen();
        let mut f = Frame::new(60, 20, None);
        draw_window(&mut f, &sh, Theme::Light, ColorMode::Color256, false);
        assert_eq!(f.get(0, 0).unwrap().ch, '╭');
        assert_eq!(f.get(59, 19).unwrap().ch, '╯');
    }

    #[test]
    fn hud_boxes_are_clamped_on_screen() {
        let (mut sh, _) = shell();
        sh.nudge_monitor(crate::shell::Monitor::System, 500, 500);
        let mut f = Frame::new(80, 24, None);
        draw_hud(&mut f, &sh, Theme::Dark, ColorMode::TrueColor);
        assert_eq!(f.get(79, 23).unwrap().ch, '╯');
        let all: Vec<String> = (0..24).map(|y| row_text(&f, y)).collect();
        assert!(all.iter().any(|l| l.contains("SECURITY MONITOR")));
    }

    #[test]
    fn hud_off_draws_nothing() {
        let (mut sh, t0) = shell();
        sh.submit("hud", t0);
        let mut f = Frame::new(80, 24, None);
        draw_hud(&mut f, &sh, Theme::Dark, ColorMode::TrueColor);
        assert!((0..24).all(|y| row_text(&f, y).trim().is_empty()));
    }

    #[test]
    fn low_opacity_lets_backdrop_through() {
        let (mut sh, t0) = shell();
        sh.submit("set_opacity 50", t0);
        sh.submit("clear", t0);
        let mut f = Frame::new(80, 24, None);
        let r = window_rect(80, 24, false).unwrap();
        f.set(r.x + 10, r.y + 3, Cell::glyph('ｱ', None, None));
        draw_window(&mut f, &sh, Theme::Dark, ColorMode::TrueColor, false);
        let c = f.get(r.x + 10, r.y + 3).unwrap();
        assert_eq!(c.ch, 'ｱ');
        assert!(c.dim);
    }

    #[test]
    fn matrix_mode_shows_rain_inside_the_window() {
        let (mut sh, t0) = shell();
        sh.submit("clear", t0);
        let r = window_rect(80, 24, false).unwrap();
        let mut f = Frame::new(80, 24, None);
        f.set(r.x + 10, r.y + 3, Cell::glyph('ｱ', None, None));
        draw_window(&mut f, &sh, Theme::Dark, ColorMode::TrueColor, false);
        assert_eq!(f.get(r.x + 10, r.y + 3).unwrap().ch, ' ');

        sh.submit("matrix", t0);
        sh.submit("clear", t0);
        let mut f = Frame::new(80, 24, None);
        f.set(r.x + 10, r.y + 3, Cell::glyph('ｱ', None, None));
        draw_window(&mut f, &sh, Theme::Dark, ColorMode::TrueColor, false);
        assert_eq!(f.get(r.x + 10, r.y + 3).unwrap().ch, 'ｱ');
    }

    #[test]
    fn bars_scale_with_percent() {
        assert_eq!(bar(0.0), "░".repeat(BAR_W));
        assert_eq!(bar(100.0), "█".repeat(BAR_W));
        assert_eq!(bar(50.0).chars().filter(|&c| c == '█').count(), BAR_W / 2);
    }

    #[test]
    fn matrix_setting_overrides_global_theme() {
        let c = window_colors(Theme::Light, TerminalTheme::Matrix);
        assert_eq!(c.text.to_u8(), (0, 0xff, 0));
        let auto = window_colors(Theme::Light, TerminalTheme::Auto);
        assert_eq!(auto.background.to_u8(), theme_colors(Theme::Light).background.to_u8());
    }
}
