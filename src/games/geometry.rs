/// Logical canvas every game simulates on. Rendering scales it to the terminal.
pub const CANVAS_W: f32 = 800.0;
pub const CANVAS_H: f32 = 600.0;

/// Nominal frame length the per-frame speed constants are tuned for (60 Hz).
pub const FRAME_MS: f32 = 1000.0 / 60.0;

/// Converts a tick duration into "frames" so per-frame constants stay valid
/// regardless of the host tick rate.
pub fn frames(dt_ms: u64) -> f32 {
    dt_ms as f32 / FRAME_MS
}

/// Axis-aligned box in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap: boxes that only share an edge do not collide.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn clamp_within(&mut self, width: f32, height: f32) {
        self.x = self.x.clamp(0.0, (width - self.w).max(0.0));
        self.y = self.y.clamp(0.0, (height - self.h).max(0.0));
    }

    /// Advance by `(vx, vy) * step`, reflecting the velocity on canvas edges.
    pub fn bounce_within(&mut self, vx: &mut f32, vy: &mut f32, step: f32, width: f32, height: f32) {
        self.x += *vx * step;
        self.y += *vy * step;
        if self.x <= 0.0 || self.x >= width - self.w {
            *vx = -*vx;
            self.x = self.x.clamp(0.0, width - self.w);
        }
        if self.y <= 0.0 || self.y >= height - self.h {
            *vy = -*vy;
            self.y = self.y.clamp(0.0, height - self.h);
        }
    }

    /// Advance by `(vx, vy) * step`, reappearing on the opposite edge once fully off-canvas.
    pub fn wrap_around(&mut self, vx: f32, vy: f32, step: f32, width: f32, height: f32) {
        self.x += vx * step;
        self.y += vy * step;
        if self.x < -self.w {
            self.x = width;
        } else if self.x > width {
            self.x = -self.w;
        }
        if self.y < -self.h {
            self.y = height;
        } else if self.y > height {
            self.y = -self.h;
        }
    }
}
