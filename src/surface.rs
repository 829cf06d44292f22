// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;
use crate::frame::Frame;
use crate::palette::{quantize, Rgb};
use crate::runtime::ColorMode;

/// Virtual pixels per terminal cell. Renderers think in pixels so their
/// constants (glyph size, connect distance, wrap margin) stay resolution-free.
pub const CELL_W: f32 = 8.0;
pub const CELL_H: f32 = 16.0;

const INK_FLOOR: f32 = 0.04;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphStyle {
    pub color: Rgb,
    pub alpha: f32,
    pub scale: f32,
    pub glow: f32,
}

/// A drawable area measured in virtual pixels.
///
/// `size` returning `None` means the surface is detached; renderers skip the
/// whole frame in that case.
pub trait Surface {
    fn size(&self) -> Option<(f32, f32)>;
    fn fill(&mut self, color: Rgb, alpha: f32);
    fn glyph(&mut self, x: f32, y: f32, ch: char, style: GlyphStyle);
    fn disc(&mut self, x: f32, y: f32, radius: f32, color: Rgb, alpha: f32, glow: f32);
    fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb, alpha: f32);
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Pixel {
    ch: char,
    color: Rgb,
    ink: f32,
    bold: bool,
}

impl Pixel {
    fn empty(bg: Rgb) -> Self {
        Self {
            ch: ' ',
            color: bg,
            ink: 0.0,
            bold: false,
        }
    }
}

/// Cell raster behind one animated layer. Fills fade existing ink toward the
/// fill colour, which is what produces trails.
#[derive(Clone, Debug)]
pub struct Canvas {
    cols: u16,
    rows: u16,
    pixels: Vec<Pixel>,
    background: Rgb,
    attached: bool,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16, background: Rgb) -> Self {
        Self {
            cols,
            rows,
            pixels: vec![Pixel::empty(background); cols as usize * rows as usize],
            background,
            attached: true,
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        if (cols, rows) == (self.cols, self.rows) {
            return;
        }
        self.cols = cols;
        self.rows = rows;
        self.pixels = vec![Pixel::empty(self.background); cols as usize * rows as usize];
    }

    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    pub fn wipe(&mut self, background: Rgb) {
        self.background = background;
        self.pixels.fill(Pixel::empty(background));
    }

    fn cell_of(&self, x: f32, y: f32) -> Option<usize> {
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / CELL_W) as usize;
        let row = (y / CELL_H) as usize;
        if col >= self.cols as usize || row >= self.rows as usize {
            return None;
        }
        Some(row * self.cols as usize + col)
    }

    fn ink_at(&mut self, idx: usize, ch: char, color: Rgb, alpha: f32, bold: bool) {
        let bg = self.background;
        let px = &mut self.pixels[idx];
        let base = if px.ink < INK_FLOOR { bg } else { px.color };
        px.ch = ch;
        px.color = base.lerp(color, alpha);
        px.ink = px.ink + (1.0 - px.ink) * alpha.clamp(0.0, 1.0);
        px.bold = bold;
    }

    pub fn present_layers(layers: &[&Canvas], frame: &mut Frame, mode: ColorMode, bg: Option<Color>) {
        for y in 0..frame.height {
            for x in 0..frame.width {
                let mut best: Option<Pixel> = None;
                for layer in layers {
                    if x >= layer.cols || y >= layer.rows {
                        continue;
                    }
                    let px = layer.pixels[y as usize * layer.cols as usize + x as usize];
                    if px.ink < INK_FLOOR || px.ch == ' ' {
                        continue;
                    }
                    if best.map_or(true, |b| px.ink > b.ink) {
                        best = Some(px);
                    }
                }
                let cell = match best {
                    Some(px) => Cell::glyph(px.ch, quantize(px.color, mode), bg)
                        .bold(px.bold && px.ink > 0.6)
                        .dim(matches!(mode, ColorMode::Mono) && px.ink < 0.35),
                    None => Cell::blank(bg),
                };
                frame.set(x, y, cell);
            }
        }
    }
}

impl Surface for Canvas {
    fn size(&self) -> Option<(f32, f32)> {
        if !self.attached || self.cols == 0 || self.rows == 0 {
            return None;
        }
        Some((self.cols as f32 * CELL_W, self.rows as f32 * CELL_H))
    }

    fn fill(&mut self, color: Rgb, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        self.background = color;
        for px in &mut self.pixels {
            px.ink *= 1.0 - alpha;
            px.color = px.color.lerp(color, alpha);
            if px.ink < INK_FLOOR {
                *px = Pixel::empty(color);
            }
        }
    }

    fn glyph(&mut self, x: f32, y: f32, ch: char, style: GlyphStyle) {
        // Glyphs are placed by baseline, so the cell is the one above `y`.
        let Some(idx) = self.cell_of(x, (y - 1.0).max(0.0)) else {
            return;
        };
        let bold = style.glow > 0.0 || style.scale > 1.1;
        self.ink_at(idx, ch, style.color, style.alpha, bold);
    }

    fn disc(&mut self, x: f32, y: f32, radius: f32, color: Rgb, alpha: f32, glow: f32) {
        let Some(idx) = self.cell_of(x, y) else {
            return;
        };
        let ch = if radius < 2.0 {
            '·'
        } else if radius < 3.5 {
            '•'
        } else {
            '●'
        };
        self.ink_at(idx, ch, color, alpha, glow > 0.0);
    }

    fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb, alpha: f32) {
        let (c0, r0) = (x0 / CELL_W, y0 / CELL_H);
        let (c1, r1) = (x1 / CELL_W, y1 / CELL_H);
        let (dc, dr) = (c1 - c0, r1 - r0);
        let steps = dc.abs().max(dr.abs()).ceil() as usize;
        if steps < 2 {
            return;
        }
        let ch = if dc.abs() > 2.0 * dr.abs() {
            '─'
        } else if dr.abs() > 2.0 * dc.abs() {
            '│'
        } else if (dc > 0.0) == (dr > 0.0) {
            '╲'
        } else {
            '╱'
        };
        let start = self.cell_of(x0, y0);
        let end = self.cell_of(x1, y1);
        for i in 1..steps {
            let t = i as f32 / steps as f32;
            let Some(idx) = self.cell_of((c0 + dc * t) * CELL_W, (r0 + dr * t) * CELL_H) else {
                continue;
            };
            if Some(idx) == start || Some(idx) == end || self.pixels[idx].ink >= alpha {
                continue;
            }
            self.ink_at(idx, ch, color, alpha, false);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Op {
        Fill { alpha: f32 },
        Glyph { x: f32, y: f32, ch: char, style: GlyphStyle },
        Disc { x: f32, y: f32, radius: f32 },
        Line { alpha: f32 },
    }

    pub struct Recorder {
        pub size: Option<(f32, f32)>,
        pub ops: Vec<Op>,
    }

    impl Recorder {
        pub fn new(width: f32, height: f32) -> Self {
            Self {
                size: Some((width, height)),
                ops: Vec::new(),
            }
        }

        pub fn detached() -> Self {
            Self {
                size: None,
                ops: Vec::new(),
            }
        }
    }

    impl Surface for Recorder {
        fn size(&self) -> Option<(f32, f32)> {
            self.size
        }

        fn fill(&mut self, _color: Rgb, alpha: f32) {
            self.ops.push(Op::Fill { alpha });
        }

        fn glyph(&mut self, x: f32, y: f32, ch: char, style: GlyphStyle) {
            self.ops.push(Op::Glyph { x, y, ch, style });
        }

        fn disc(&mut self, x: f32, y: f32, radius: f32, _color: Rgb, _alpha: f32, _glow: f32) {
            self.ops.push(Op::Disc { x, y, radius });
        }

        fn line(&mut self, _x0: f32, _y0: f32, _x1: f32, _y1: f32, _color: Rgb, alpha: f32) {
            self.ops.push(Op::Line { alpha });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgb = Rgb::new(0, 0, 0);
    const GREEN: Rgb = Rgb::new(0, 255, 0);

    fn style(alpha: f32) -> GlyphStyle {
        GlyphStyle {
            color: GREEN,
            alpha,
            scale: 1.0,
            glow: 0.0,
        }
    }

    #[test]
    fn size_is_in_virtual_pixels() {
        let c = Canvas::new(10, 5, BLACK);
        assert_eq!(c.size(), Some((80.0, 80.0)));
    }

    #[test]
    fn detached_canvas_reports_no_size() {
        let mut c = Canvas::new(10, 5, BLACK);
        c.set_attached(false);
        assert_eq!(c.size(), None);
    }

    #[test]
    fn repeated_fills_fade_glyphs_out() {
        let mut c = Canvas::new(4, 4, BLACK);
        c.glyph(8.0, 16.0, 'x', style(1.0));
        let mut frame = Frame::new(4, 4, None);
        Canvas::present_layers(&[&c], &mut frame, ColorMode::TrueColor, None);
        assert_eq!(frame.get(1, 0).unwrap().ch, 'x');

        for _ in 0..200 {
            c.fill(BLACK, 0.05);
        }
        Canvas::present_layers(&[&c], &mut frame, ColorMode::TrueColor, None);
        assert_eq!(frame.get(1, 0).unwrap().ch, ' ');
    }

    #[test]
    fn stronger_layer_wins() {
        let mut faint = Canvas::new(2, 2, BLACK);
        let mut strong = Canvas::new(2, 2, BLACK);
        faint.glyph(0.0, 16.0, 'a', style(0.3));
        strong.glyph(0.0, 16.0, 'b', style(0.9));
        let mut frame = Frame::new(2, 2, None);
        Canvas::present_layers(&[&faint, &strong], &mut frame, ColorMode::TrueColor, None);
        assert_eq!(frame.get(0, 0).unwrap().ch, 'b');
    }

    #[test]
    fn line_skips_endpoint_cells() {
        let mut c = Canvas::new(10, 1, BLACK);
        c.line(4.0, 8.0, 76.0, 8.0, GREEN, 0.5);
        let mut frame = Frame::new(10, 1, None);
        Canvas::present_layers(&[&c], &mut frame, ColorMode::TrueColor, None);
        assert_eq!(frame.get(0, 0).unwrap().ch, ' ');
        assert_eq!(frame.get(4, 0).unwrap().ch, '─');
        assert_eq!(frame.get(9, 0).unwrap().ch, ' ');
    }
}
