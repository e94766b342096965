use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::canvas::{fade, BrailleCanvas};
use crate::games::geometry::{frames, Aabb, CANVAS_H, CANVAS_W};
use crate::games::particles::Particles;
use crate::games::{footer_line, game_block, hud_layout, sep, Game, Status};
use crate::input::KeyState;

const PLAYER_SPAWN: (f32, f32) = (385.0, 540.0);
const PLAYER_SIZE: f32 = 30.0;
const PLAYER_SPEED: f32 = 5.0;
const START_LIVES: u32 = 3;
const GEMS_PER_LEVEL: usize = 5;
const GEM_SIZE: f32 = 16.0;
const GEM_POINTS: u32 = 25;
const LEVEL_BONUS: u32 = 100;
/// Asteroids never spawn this close to the player's spawn point.
const SPAWN_KEEP_OUT: f32 = 90.0;
/// How long the level-up badge stays in the HUD.
const LEVEL_UP_BADGE_MS: u64 = 1500;

const BG: (u8, u8, u8) = (8, 8, 20);
const GEM_COLOR: Color = Color::Rgb(0, 255, 200);
const SHIP_COLOR: Color = Color::Rgb(80, 255, 140);

pub fn asteroid_count(level: u32) -> usize {
    8 + 2 * level as usize
}

#[derive(Clone)]
struct Asteroid {
    rect: Aabb,
    vx: f32,
    vy: f32,
    shape_seed: u8,
}

#[derive(Clone)]
struct Gem {
    rect: Aabb,
    collected: bool,
}

pub struct AsteroidBreaker {
    player: Aabb,
    asteroids: Vec<Asteroid>,
    gems: Vec<Gem>,
    particles: Particles,
    score: u32,
    lives: u32,
    level: u32,
    status: Status,
    paused: bool,
    badge_ms: u64,
    tick: u64,
    rng: StdRng,
}

impl AsteroidBreaker {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut a = Self {
            player: Self::spawn_box(),
            asteroids: Vec::new(),
            gems: Vec::new(),
            particles: Particles::new(),
            score: 0,
            lives: START_LIVES,
            level: 1,
            status: Status::Playing,
            paused: false,
            badge_ms: 0,
            tick: 0,
            rng,
        };
        a.init_level();
        a
    }

    fn spawn_box() -> Aabb {
        Aabb::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1, PLAYER_SIZE, PLAYER_SIZE)
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn asteroids_len(&self) -> usize {
        self.asteroids.len()
    }

    pub fn gems_left(&self) -> usize {
        self.gems.iter().filter(|g| !g.collected).count()
    }

    pub fn showing_level_up(&self) -> bool {
        self.badge_ms > 0
    }

    fn init_level(&mut self) {
        let keep_out = Aabb::new(
            PLAYER_SPAWN.0 - SPAWN_KEEP_OUT,
            PLAYER_SPAWN.1 - SPAWN_KEEP_OUT,
            PLAYER_SIZE + SPAWN_KEEP_OUT * 2.0,
            PLAYER_SIZE + SPAWN_KEEP_OUT * 2.0,
        );
        let count = asteroid_count(self.level);
        let base_speed = 1.0 + self.level as f32 * 0.25;

        self.asteroids.clear();
        while self.asteroids.len() < count {
            let size = self.rng.gen_range(20.0..50.0);
            let rect = Aabb::new(
                self.rng.gen_range(0.0..CANVAS_W - size),
                self.rng.gen_range(0.0..CANVAS_H - size),
                size,
                size,
            );
            if rect.overlaps(&keep_out) {
                continue;
            }
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let speed = base_speed + self.rng.gen::<f32>();
            self.asteroids.push(Asteroid {
                rect,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                shape_seed: self.rng.gen(),
            });
        }

        self.gems = (0..GEMS_PER_LEVEL)
            .map(|_| Gem {
                rect: Aabb::new(
                    self.rng.gen_range(20.0..CANVAS_W - 20.0 - GEM_SIZE),
                    self.rng.gen_range(20.0..CANVAS_H - 120.0),
                    GEM_SIZE,
                    GEM_SIZE,
                ),
                collected: false,
            })
            .collect();
    }

    fn update_player(&mut self, keys: &KeyState, step: f32) {
        let d = PLAYER_SPEED * step;
        if keys.left {
            self.player.x -= d;
        }
        if keys.right {
            self.player.x += d;
        }
        if keys.up {
            self.player.y -= d;
        }
        if keys.down {
            self.player.y += d;
        }
        self.player.clamp_within(CANVAS_W, CANVAS_H);
    }

    fn update_asteroids(&mut self, step: f32) {
        for a in &mut self.asteroids {
            a.rect.bounce_within(&mut a.vx, &mut a.vy, step, CANVAS_W, CANVAS_H);
        }
    }

    fn collect_gems(&mut self) {
        let Self { gems, player, particles, rng, score, .. } = self;
        for gem in gems.iter_mut().filter(|g| !g.collected) {
            if gem.rect.overlaps(player) {
                gem.collected = true;
                *score += GEM_POINTS;
                let (cx, cy) = gem.rect.center();
                particles.burst(&mut *rng, cx, cy, 10, GEM_COLOR);
            }
        }
    }

    /// One life per tick of contact; the reset usually ends the contact.
    fn check_hazards(&mut self) {
        if self.asteroids.iter().any(|a| a.rect.overlaps(&self.player)) {
            let (cx, cy) = self.player.center();
            self.particles.burst(&mut self.rng, cx, cy, 12, Color::Rgb(255, 71, 87));
            self.lives = self.lives.saturating_sub(1);
            self.player = Self::spawn_box();
        }
    }

    fn asteroid_verts(rect: &Aabb, seed: u8) -> Vec<(f32, f32)> {
        let n = 9;
        let (cx, cy) = rect.center();
        let r = rect.w / 2.0;
        let mut s = seed as u32;
        (0..n)
            .map(|i| {
                let angle = (i as f32 / n as f32) * std::f32::consts::TAU;
                s = s.wrapping_mul(1103515245).wrapping_add(12345);
                let vr = r * (0.7 + ((s >> 16) % 300) as f32 / 1000.0);
                (cx + angle.cos() * vr, cy + angle.sin() * vr)
            })
            .collect()
    }

    fn render_field(&self, width: usize, height: usize) -> Vec<Line<'static>> {
        let mut canvas = BrailleCanvas::new(width, height, Color::Rgb(BG.0, BG.1, BG.2));
        canvas.star_field(80, self.tick);

        for a in &self.asteroids {
            let shade = 140 + a.shape_seed % 50;
            canvas.polygon(&Self::asteroid_verts(&a.rect, a.shape_seed), Color::Rgb(shade, shade - 15, shade - 40));
        }
        for gem in self.gems.iter().filter(|g| !g.collected) {
            let (cx, cy) = gem.rect.center();
            canvas.glyph(cx, cy, '\u{25c6}', GEM_COLOR);
        }
        for p in self.particles.iter() {
            canvas.point(p.x, p.y, fade(p.color, p.alpha(), BG));
        }
        if self.status != Status::Lost {
            let p = &self.player;
            let ship = [
                (p.x + p.w / 2.0, p.y),
                (p.right(), p.bottom()),
                (p.x + p.w / 2.0, p.bottom() - p.h / 4.0),
                (p.x, p.bottom()),
            ];
            canvas.polygon(&ship, SHIP_COLOR);
        }
        canvas.into_lines()
    }
}

impl Default for AsteroidBreaker {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for AsteroidBreaker {
    fn tick(&mut self, keys: &KeyState, dt_ms: u64) -> Option<u32> {
        if self.status.is_terminal() || self.paused {
            return None;
        }
        self.status = Status::Playing;
        self.tick += 1;
        self.badge_ms = self.badge_ms.saturating_sub(dt_ms);
        let step = frames(dt_ms);

        self.update_player(keys, step);
        self.update_asteroids(step);
        self.particles.update(step);

        self.collect_gems();
        self.check_hazards();

        if self.lives == 0 {
            self.status = Status::Lost;
            log::info!("asteroid breaker lost on level {} with {} points", self.level, self.score);
            return Some(self.score);
        }

        if self.gems.iter().all(|g| g.collected) {
            self.score += LEVEL_BONUS * self.level;
            self.level += 1;
            // The new field only keeps clear of the spawn point.
            self.player = Self::spawn_box();
            self.init_level();
            self.status = Status::LevelComplete;
            self.badge_ms = LEVEL_UP_BADGE_MS;
            log::debug!("asteroid breaker advanced to level {}", self.level);
        }
        None
    }

    fn handle_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') | KeyCode::Char('R') => self.reset(),
            KeyCode::Char('p') | KeyCode::Char('P') => {
                if !self.status.is_terminal() {
                    self.paused = !self.paused;
                }
            }
            KeyCode::Enter if self.status.is_terminal() => self.reset(),
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = game_block(" Asteroid Breaker ", Color::Rgb(160, 110, 255));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let chunks = hud_layout(inner);

        let lives_str = "\u{2666} ".repeat(self.lives as usize);
        let mut spans = vec![
            Span::styled(" \u{2604} ", Style::default()),
            Span::styled(
                format!("Score: {} ", self.score),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            sep(),
            Span::styled(
                format!("Lives: {}", lives_str),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            sep(),
            Span::styled(format!("Level: {} ", self.level), Style::default().fg(Color::Green)),
            sep(),
            Span::styled(
                format!("Gems: {}/{} ", GEMS_PER_LEVEL - self.gems_left(), GEMS_PER_LEVEL),
                Style::default().fg(GEM_COLOR),
            ),
        ];
        if self.showing_level_up() {
            spans.push(Span::styled(
                " LEVEL UP! ",
                Style::default().fg(Color::Black).bg(GEM_COLOR).add_modifier(Modifier::BOLD),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

        let fw = chunks[1].width as usize;
        let fh = chunks[1].height as usize;
        if fw > 0 && fh > 0 {
            frame.render_widget(Paragraph::new(self.render_field(fw, fh)), chunks[1]);
        }

        let footer = footer_line(
            self.status,
            self.paused,
            "",
            "GAME OVER!",
            &[("\u{2190}\u{2191}\u{2192}\u{2193}/WASD", "Move"), ("P", "Pause"), ("R", "Restart"), ("Esc", "Menu")],
        );
        frame.render_widget(Paragraph::new(footer), chunks[2]);
    }

    fn reset(&mut self) {
        self.player = Self::spawn_box();
        self.particles.clear();
        self.score = 0;
        self.lives = START_LIVES;
        self.level = 1;
        self.status = Status::Playing;
        self.paused = false;
        self.badge_ms = 0;
        self.init_level();
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn status(&self) -> Status {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    const DT: u64 = 16;

    #[test]
    fn first_level_layout() {
        let game = AsteroidBreaker::with_seed(7);
        assert_eq!(game.level(), 1);
        assert_eq!(game.asteroids_len(), asteroid_count(1));
        assert_eq!(game.asteroids_len(), 10);
        assert_eq!(game.gems_left(), GEMS_PER_LEVEL);
        let spawn = AsteroidBreaker::spawn_box();
        assert!(game.asteroids.iter().all(|a| !a.rect.overlaps(&spawn)));
    }

    #[test]
    fn final_gem_advances_level_and_scales_obstacles() {
        let mut game = AsteroidBreaker::with_seed(7);
        game.asteroids.clear();
        for gem in game.gems.iter_mut().take(GEMS_PER_LEVEL - 1) {
            gem.collected = true;
        }
        game.gems[GEMS_PER_LEVEL - 1].rect = Aabb::new(game.player.x + 5.0, game.player.y + 5.0, GEM_SIZE, GEM_SIZE);

        assert_eq!(game.tick(&KeyState::default(), DT), None);
        assert_eq!(game.level(), 2);
        assert_eq!(game.asteroids_len(), 8 + 2 * 2);
        assert_eq!(game.gems_left(), GEMS_PER_LEVEL);
        assert_eq!(game.score(), GEM_POINTS + LEVEL_BONUS);
        assert_eq!(game.status(), Status::LevelComplete);

        game.tick(&KeyState::default(), DT);
        assert_eq!(game.status(), Status::Playing);
    }

    #[test]
    fn level_up_never_drops_asteroids_on_the_ship() {
        for seed in 0..200 {
            let mut game = AsteroidBreaker::with_seed(seed);
            game.asteroids.clear();
            game.player = Aabb::new(100.0, 100.0, PLAYER_SIZE, PLAYER_SIZE);
            for gem in &mut game.gems {
                gem.collected = true;
            }
            game.tick(&KeyState::default(), DT);
            assert_eq!(game.level(), 2, "seed {}", seed);
            assert!(
                game.asteroids.iter().all(|a| !a.rect.overlaps(&game.player)),
                "seed {} spawned an asteroid on the ship",
                seed
            );
        }
    }

    #[test]
    fn level_up_badge_outlasts_the_transition_tick() {
        let mut game = AsteroidBreaker::with_seed(5);
        game.asteroids.clear();
        for gem in &mut game.gems {
            gem.collected = true;
        }
        game.tick(&KeyState::default(), DT);
        assert!(game.showing_level_up());

        game.asteroids.clear();
        for _ in 0..60 {
            game.tick(&KeyState::default(), DT);
        }
        assert_eq!(game.status(), Status::Playing);
        assert!(game.showing_level_up());

        for _ in 0..60 {
            game.tick(&KeyState::default(), DT);
        }
        assert!(!game.showing_level_up());
    }

    #[test]
    fn only_enter_or_r_restarts_after_game_over() {
        let mut game = AsteroidBreaker::with_seed(7);
        game.status = Status::Lost;
        game.handle_input(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        assert_eq!(game.status(), Status::Lost);
        game.handle_input(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(game.status(), Status::Playing);
    }

    #[test]
    fn level_bonus_grows_with_level() {
        let mut game = AsteroidBreaker::with_seed(11);
        game.level = 4;
        game.asteroids.clear();
        for gem in &mut game.gems {
            gem.collected = true;
        }
        game.tick(&KeyState::default(), DT);
        assert_eq!(game.score(), 4 * LEVEL_BONUS);
        assert_eq!(game.asteroids_len(), asteroid_count(5));
    }

    #[test]
    fn every_tick_of_contact_costs_a_life() {
        let mut game = AsteroidBreaker::with_seed(7);
        game.gems.clear();
        game.gems.push(Gem { rect: Aabb::new(0.0, 0.0, GEM_SIZE, GEM_SIZE), collected: false });
        // Parked on the spawn point, so the reset never clears the contact.
        game.asteroids = vec![Asteroid {
            rect: Aabb::new(PLAYER_SPAWN.0 - 5.0, PLAYER_SPAWN.1 - 5.0, 40.0, 40.0),
            vx: 0.0,
            vy: 0.0,
            shape_seed: 0,
        }];

        assert_eq!(game.tick(&KeyState::default(), DT), None);
        assert_eq!(game.lives(), 2);
        assert_eq!(game.tick(&KeyState::default(), DT), None);
        assert_eq!(game.lives(), 1);
        assert_eq!(game.tick(&KeyState::default(), DT), Some(0));
        assert_eq!(game.status(), Status::Lost);
        assert_eq!(game.tick(&KeyState::default(), DT), None);
    }

    #[test]
    fn contact_resets_player_to_spawn() {
        let mut game = AsteroidBreaker::with_seed(7);
        game.player = Aabb::new(100.0, 100.0, PLAYER_SIZE, PLAYER_SIZE);
        game.asteroids = vec![Asteroid {
            rect: Aabb::new(90.0, 90.0, 30.0, 30.0),
            vx: 0.0,
            vy: 0.0,
            shape_seed: 0,
        }];
        game.tick(&KeyState::default(), DT);
        assert_eq!(game.lives(), START_LIVES - 1);
        assert_eq!(game.player, AsteroidBreaker::spawn_box());
    }

    #[test]
    fn player_stays_on_canvas() {
        let mut game = AsteroidBreaker::with_seed(3);
        game.asteroids.clear();
        game.gems.clear();
        game.gems.push(Gem { rect: Aabb::new(700.0, 300.0, GEM_SIZE, GEM_SIZE), collected: false });
        let up_left = KeyState { up: true, left: true, ..KeyState::default() };
        for _ in 0..200 {
            game.tick(&up_left, DT);
            assert!(game.player.x >= 0.0 && game.player.y >= 0.0);
        }
        assert_eq!((game.player.x, game.player.y), (0.0, 0.0));

        let down_right = KeyState { down: true, right: true, ..KeyState::default() };
        for _ in 0..200 {
            game.tick(&down_right, DT);
            assert!(game.player.right() <= CANVAS_W && game.player.bottom() <= CANVAS_H);
        }
        assert_eq!(game.player.x, CANVAS_W - PLAYER_SIZE);
        assert_eq!(game.player.y, CANVAS_H - PLAYER_SIZE);
    }

    #[test]
    fn restart_generates_a_fresh_field() {
        let mut game = AsteroidBreaker::with_seed(7);
        let before: Vec<Aabb> = game.asteroids.iter().map(|a| a.rect).collect();
        game.level = 3;
        game.score = 900;
        game.lives = 1;
        game.status = Status::Lost;

        game.reset();
        assert_eq!(game.score(), 0);
        assert_eq!(game.lives(), START_LIVES);
        assert_eq!(game.level(), 1);
        assert_eq!(game.asteroids_len(), asteroid_count(1));
        let after: Vec<Aabb> = game.asteroids.iter().map(|a| a.rect).collect();
        assert_ne!(before, after);
    }
}
