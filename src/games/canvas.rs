use ratatui::prelude::*;

use super::geometry::{Aabb, CANVAS_H, CANVAS_W};

// ── Braille rendering ──────────────────────────────────────────────
//
// Each terminal cell holds a 2x4 grid of braille dots, so a w x h cell
// area gives (2w) x (4h) "pixels". The logical 800x600 canvas is scaled
// onto that dot grid.

fn braille_bit(sub_x: usize, sub_y: usize) -> u8 {
    match (sub_x, sub_y) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0,
    }
}

#[derive(Clone, Copy)]
enum Cell {
    Blank,
    Dots(u8, Style),
    Glyph(char, Style),
}

pub struct BrailleCanvas {
    cells: Vec<Vec<Cell>>,
    w: usize,
    h: usize,
    bg: Color,
    sx: f32,
    sy: f32,
}

impl BrailleCanvas {
    pub fn new(width: usize, height: usize, bg: Color) -> Self {
        let bw = (width * 2) as f32;
        let bh = (height * 4) as f32;
        Self {
            cells: vec![vec![Cell::Blank; width]; height],
            w: width,
            h: height,
            bg,
            sx: bw / CANVAS_W,
            sy: bh / CANVAS_H,
        }
    }

    fn set_dot(&mut self, bx: i32, by: i32, style: Style) {
        if bx < 0 || by < 0 {
            return;
        }
        let cx = bx as usize / 2;
        let cy = by as usize / 4;
        if cx >= self.w || cy >= self.h {
            return;
        }
        let bit = braille_bit(bx as usize % 2, by as usize % 4);
        let cell = &mut self.cells[cy][cx];
        *cell = match *cell {
            // Merge bits, newest colour wins
            Cell::Dots(bits, _) => Cell::Dots(bits | bit, style),
            _ => Cell::Dots(bit, style),
        };
    }

    /// Plot a single logical-space point.
    pub fn point(&mut self, x: f32, y: f32, color: Color) {
        let style = Style::default().fg(color).bg(self.bg);
        self.set_dot((x * self.sx).floor() as i32, (y * self.sy).floor() as i32, style);
    }

    /// Fill a logical-space box with dots. Small boxes still get one dot.
    pub fn fill(&mut self, rect: &Aabb, color: Color, bold: bool) {
        let mut style = Style::default().fg(color).bg(self.bg);
        if bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        let x0 = (rect.x * self.sx).floor() as i32;
        let y0 = (rect.y * self.sy).floor() as i32;
        let x1 = ((rect.right() * self.sx).round() as i32).max(x0 + 1);
        let y1 = ((rect.bottom() * self.sy).round() as i32).max(y0 + 1);
        for by in y0..y1 {
            for bx in x0..x1 {
                self.set_dot(bx, by, style);
            }
        }
    }

    /// Outline a logical-space box.
    pub fn outline(&mut self, rect: &Aabb, color: Color) {
        let style = Style::default().fg(color).bg(self.bg);
        let x0 = (rect.x * self.sx).floor() as i32;
        let y0 = (rect.y * self.sy).floor() as i32;
        let x1 = ((rect.right() * self.sx).round() as i32 - 1).max(x0);
        let y1 = ((rect.bottom() * self.sy).round() as i32 - 1).max(y0);
        for bx in x0..=x1 {
            self.set_dot(bx, y0, style);
            self.set_dot(bx, y1, style);
        }
        for by in y0..=y1 {
            self.set_dot(x0, by, style);
            self.set_dot(x1, by, style);
        }
    }

    /// Bresenham line between two logical-space points.
    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Color) {
        let style = Style::default().fg(color).bg(self.bg);
        let (mut cx, mut cy) = ((from.0 * self.sx).floor() as i32, (from.1 * self.sy).floor() as i32);
        let (x1, y1) = ((to.0 * self.sx).floor() as i32, (to.1 * self.sy).floor() as i32);
        let dx = (x1 - cx).abs();
        let dy = -(y1 - cy).abs();
        let sx = if cx < x1 { 1 } else { -1 };
        let sy = if cy < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_dot(cx, cy, style);
            if cx == x1 && cy == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                cx += sx;
            }
            if e2 <= dx {
                err += dx;
                cy += sy;
            }
        }
    }

    /// Closed outline through `verts`.
    pub fn polygon(&mut self, verts: &[(f32, f32)], color: Color) {
        let n = verts.len();
        for i in 0..n {
            self.line(verts[i], verts[(i + 1) % n], color);
        }
    }

    /// Draw a regular character at the cell covering the logical point.
    pub fn glyph(&mut self, x: f32, y: f32, ch: char, color: Color) {
        let cx = ((x * self.sx).floor() as i32).div_euclid(2);
        let cy = ((y * self.sy).floor() as i32).div_euclid(4);
        if cx < 0 || cy < 0 || cx as usize >= self.w || cy as usize >= self.h {
            return;
        }
        self.cells[cy as usize][cx as usize] = Cell::Glyph(ch, Style::default().fg(color).bg(self.bg));
    }

    /// Fixed background stars, scattered with the same hash on every frame.
    pub fn star_field(&mut self, count: usize, twinkle: u64) {
        for i in 0..count {
            let x = ((i * 137) % CANVAS_W as usize) as f32;
            let y = ((i * 73) % CANVAS_H as usize) as f32;
            let bright = (i as f32).sin() > 0.8 || (i as u64 + twinkle / 20) % 17 == 0;
            let b = if bright { 200 } else { 90 };
            let cx = (x * self.sx) as usize / 2;
            let cy = (y * self.sy) as usize / 4;
            if cx < self.w && cy < self.h && matches!(self.cells[cy][cx], Cell::Blank) {
                self.cells[cy][cx] = Cell::Glyph('.', Style::default().fg(Color::Rgb(b, b, b + 20)).bg(self.bg));
            }
        }
    }

    pub fn into_lines(self) -> Vec<Line<'static>> {
        let bg = self.bg;
        self.cells
            .into_iter()
            .map(|row| {
                let spans: Vec<Span<'static>> = row
                    .into_iter()
                    .map(|cell| match cell {
                        Cell::Blank => Span::styled(" ", Style::default().bg(bg)),
                        Cell::Dots(bits, style) => {
                            let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
                            Span::styled(String::from(ch), style)
                        }
                        Cell::Glyph(ch, style) => Span::styled(String::from(ch), style),
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

/// Linear blend towards the background, used to fade particles.
pub fn fade(color: Color, alpha: f32, bg: (u8, u8, u8)) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            let mix = |c: u8, base: u8| (base as f32 + (c as f32 - base as f32) * alpha) as u8;
            Color::Rgb(mix(r, bg.0), mix(g, bg.1), mix(b, bg.2))
        }
        other => other,
    }
}
