// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Run {
    pub x: u16,
    pub y: u16,
    pub start: usize,
    pub len: usize,
}

/// Groups the cells of `frame` that differ from `last` into same-style runs,
/// row by row. `last` must have the frame's dimensions.
pub fn changed_runs(last: &[Cell], frame: &Frame) -> Vec<Run> {
    let width = frame.width as usize;
    let mut runs = Vec::new();
    for y in 0..frame.height {
        let row = y as usize * width;
        let mut x = 0usize;
        while x < width {
            let idx = row + x;
            let cell = frame.cell_at_index(idx);
            if last.get(idx) == Some(&cell) {
                x += 1;
                continue;
            }
            let mut len = 1;
            while x + len < width {
                let next = frame.cell_at_index(idx + len);
                if last.get(idx + len) == Some(&next) || !next.same_style(&cell) {
                    break;
                }
                len += 1;
            }
            runs.push(Run {
                x: x as u16,
                y,
                start: idx,
                len,
            });
            x += len;
        }
    }
    runs
}

pub struct Screen {
    stdout: Stdout,
    last: Option<(u16, u16, Vec<Cell>)>,
    run_buf: String,
}

impl Screen {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            let _ = out.execute(event::EnableFocusChange);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            last: None,
            run_buf: String::with_capacity(64),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn draw(&mut self, frame: &Frame) -> Result<()> {
        let same_size = self
            .last
            .as_ref()
            .is_some_and(|(w, h, _)| *w == frame.width && *h == frame.height);
        if !same_size {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            // A sentinel that matches no real cell forces a full repaint.
            let sentinel = Cell::glyph('\0', None, None);
            let len = frame.width as usize * frame.height as usize;
            self.last = Some((frame.width, frame.height, vec![sentinel; len]));
        }
        let Some((_, _, last)) = self.last.as_mut() else {
            return Ok(());
        };

        let mut cur_fg: Option<Color> = None;
        let mut cur_bg: Option<Color> = None;
        let mut cur_weight: (bool, bool) = (false, false);
        let mut styled = false;
        let mut cur_pos: Option<(u16, u16)> = None;

        for run in changed_runs(last, frame) {
            let first = frame.cell_at_index(run.start);
            self.run_buf.clear();
            for i in run.start..run.start + run.len {
                let cell = frame.cell_at_index(i);
                self.run_buf.push(cell.ch);
                last[i] = cell;
            }

            if cur_pos != Some((run.x, run.y)) {
                self.stdout.queue(cursor::MoveTo(run.x, run.y))?;
            }

            if !styled || first.fg != cur_fg {
                self.stdout
                    .queue(SetForegroundColor(first.fg.unwrap_or(Color::Reset)))?;
                cur_fg = first.fg;
            }
            if !styled || first.bg != cur_bg {
                self.stdout
                    .queue(SetBackgroundColor(first.bg.unwrap_or(Color::Reset)))?;
                cur_bg = first.bg;
            }
            let weight = (first.bold, first.dim);
            if !styled || weight != cur_weight {
                self.stdout.queue(SetAttribute(Attribute::NormalIntensity))?;
                if first.bold {
                    self.stdout.queue(SetAttribute(Attribute::Bold))?;
                } else if first.dim {
                    self.stdout.queue(SetAttribute(Attribute::Dim))?;
                }
                cur_weight = weight;
            }
            styled = true;

            self.stdout.queue(Print(self.run_buf.as_str()))?;
            let next_x = run.x.saturating_add(run.len as u16);
            cur_pos = (next_x < frame.width).then_some((next_x, run.y));
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = self.stdout.execute(SetAttribute(Attribute::Reset));
        let _ = self.stdout.execute(ResetColor);
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(event::DisableFocusChange);
        let _ = self.stdout.execute(terminal::EnableLineWrap);
        let _ = self.stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(event::DisableFocusChange);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
