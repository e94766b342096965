use rand::Rng;
use ratatui::style::Color;

pub const PARTICLE_LIFE: f32 = 30.0;

#[derive(Clone, Debug)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    pub color: Color,
}

impl Particle {
    /// Remaining life in `0.0..=1.0`, used to fade the particle out.
    pub fn alpha(&self) -> f32 {
        (self.life / PARTICLE_LIFE).clamp(0.0, 1.0)
    }
}

/// Purely cosmetic sparks. Nothing in the simulation reads them back.
#[derive(Clone, Debug, Default)]
pub struct Particles {
    items: Vec<Particle>,
}

impl Particles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn burst<R: Rng>(&mut self, rng: &mut R, x: f32, y: f32, count: usize, color: Color) {
        for _ in 0..count {
            self.items.push(Particle {
                x,
                y,
                vx: (rng.gen::<f32>() - 0.5) * 4.0,
                vy: (rng.gen::<f32>() - 0.5) * 4.0,
                life: PARTICLE_LIFE,
                color,
            });
        }
    }

    pub fn update(&mut self, step: f32) {
        for p in &mut self.items {
            p.x += p.vx * step;
            p.y += p.vy * step;
            p.life -= step;
        }
        self.items.retain(|p| p.life > 0.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn particles_expire_after_their_life() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut p = Particles::new();
        p.burst(&mut rng, 10.0, 10.0, 5, Color::Yellow);
        assert_eq!(p.iter().count(), 5);

        for _ in 0..29 {
            p.update(1.0);
        }
        assert_eq!(p.iter().count(), 5);
        p.update(1.0);
        assert_eq!(p.iter().count(), 0);
    }

    #[test]
    fn alpha_fades_with_life() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut p = Particles::new();
        p.burst(&mut rng, 0.0, 0.0, 1, Color::Red);
        p.update(15.0);
        let alpha = p.iter().next().map(Particle::alpha).unwrap_or(0.0);
        assert!((alpha - 0.5).abs() < 1e-4);
    }
}
