// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;

#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::blank(bg); len],
        }
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells[i]
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    pub fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, cell: Cell) {
        for row in y..y.saturating_add(h).min(self.height) {
            for col in x..x.saturating_add(w).min(self.width) {
                self.set(col, row, cell);
            }
        }
    }

    /// Writes `text` starting at `(x, y)`, clipped at `max_x` (exclusive).
    /// Returns the column after the last written char.
    pub fn put_str(&mut self, x: u16, y: u16, max_x: u16, text: &str, style: Cell) -> u16 {
        let max_x = max_x.min(self.width);
        let mut col = x;
        for ch in text.chars() {
            if col >= max_x {
                break;
            }
            self.set(col, y, Cell { ch, ..style });
            col += 1;
        }
        col
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_str_clips_at_max_x() {
        let mut f = Frame::new(10, 2, None);
        let end = f.put_str(2, 1, 6, "abcdefgh", Cell::blank(None));
        assert_eq!(end, 6);
        assert_eq!(f.get(5, 1).unwrap().ch, 'd');
        assert_eq!(f.get(6, 1).unwrap().ch, ' ');
    }

    #[test]
    fn fill_rect_covers_the_area() {
        let mut f = Frame::new(4, 3, None);
        f.fill_rect(1, 0, 2, 2, Cell::glyph('x', None, None));
        let xs = (0..12).filter(|&i| f.cell_at_index(i).ch == 'x').count();
        assert_eq!(xs, 4);
        assert_eq!(f.get(0, 0).unwrap().ch, ' ');
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut f = Frame::new(2, 2, None);
        f.set(5, 5, Cell::glyph('x', None, None));
        f.fill_rect(1, 1, 10, 10, Cell::glyph('y', None, None));
        assert_eq!(f.get(1, 1).unwrap().ch, 'y');
        assert!(f.get(2, 2).is_none());
    }
}
