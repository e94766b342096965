use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::canvas::{fade, BrailleCanvas};
use crate::games::geometry::{frames, Aabb, CANVAS_H, CANVAS_W};
use crate::games::particles::Particles;
use crate::games::{footer_line, game_block, hud_layout, sep, Game, Status};
use crate::input::KeyState;

const PLAYER_SPAWN_X: f32 = 350.0;
const PLAYER_Y: f32 = 520.0;
const PLAYER_W: f32 = 40.0;
const PLAYER_H: f32 = 30.0;
const PLAYER_SPEED: f32 = 5.0;
const BULLET_W: f32 = 4.0;
const BULLET_H: f32 = 10.0;
const BULLET_SPEED: f32 = -8.0;
const FIRE_COOLDOWN_MS: u64 = 200;
const ENEMY_ROWS: usize = 5;
const ENEMY_COLS: usize = 10;
const ENEMY_W: f32 = 40.0;
const ENEMY_H: f32 = 30.0;
const ENEMY_STEP_DOWN: f32 = 20.0;
const ENEMY_POINTS: u32 = 10;
const VICTORY_BONUS: u32 = 100;
const START_LIVES: u32 = 3;

const BG: (u8, u8, u8) = (10, 10, 10);
const PLAYER_COLOR: Color = Color::Rgb(0, 191, 255);

#[derive(Clone)]
struct Bullet {
    rect: Aabb,
    dy: f32,
}

#[derive(Clone)]
struct Enemy {
    rect: Aabb,
    dx: f32,
    color: Color,
}

fn row_color(row: usize) -> Color {
    match row {
        0 | 1 => Color::Rgb(255, 107, 157),
        2 | 3 => Color::Rgb(196, 69, 105),
        _ => Color::Rgb(248, 181, 0),
    }
}

pub struct SpaceInvaders {
    player: Aabb,
    bullets: Vec<Bullet>,
    enemies: Vec<Enemy>,
    particles: Particles,
    score: u32,
    lives: u32,
    shots: u32,
    status: Status,
    paused: bool,
    clock_ms: u64,
    last_shot_ms: Option<u64>,
    tick: u64,
    rng: StdRng,
}

impl SpaceInvaders {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut s = Self {
            player: Aabb::new(PLAYER_SPAWN_X, PLAYER_Y, PLAYER_W, PLAYER_H),
            bullets: Vec::new(),
            enemies: Vec::new(),
            particles: Particles::new(),
            score: 0,
            lives: START_LIVES,
            shots: 0,
            status: Status::Playing,
            paused: false,
            clock_ms: 0,
            last_shot_ms: None,
            tick: 0,
            rng,
        };
        s.init_enemies();
        s
    }

    fn init_enemies(&mut self) {
        self.enemies = (0..ENEMY_ROWS)
            .flat_map(|row| {
                (0..ENEMY_COLS).map(move |col| Enemy {
                    rect: Aabb::new(col as f32 * 60.0 + 50.0, row as f32 * 50.0 + 50.0, ENEMY_W, ENEMY_H),
                    dx: 1.0,
                    color: row_color(row),
                })
            })
            .collect();
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn enemies_left(&self) -> usize {
        self.enemies.len()
    }

    fn update_player(&mut self, keys: &KeyState, step: f32) {
        if keys.left {
            self.player.x -= PLAYER_SPEED * step;
        }
        if keys.right {
            self.player.x += PLAYER_SPEED * step;
        }
        self.player.clamp_within(CANVAS_W, CANVAS_H);

        let ready = self
            .last_shot_ms
            .map_or(true, |t| self.clock_ms - t > FIRE_COOLDOWN_MS);
        if keys.fire && ready {
            self.bullets.push(Bullet {
                rect: Aabb::new(
                    self.player.x + self.player.w / 2.0 - BULLET_W / 2.0,
                    self.player.y,
                    BULLET_W,
                    BULLET_H,
                ),
                dy: BULLET_SPEED,
            });
            self.last_shot_ms = Some(self.clock_ms);
            self.shots += 1;
        }
    }

    fn update_bullets(&mut self, step: f32) {
        for b in &mut self.bullets {
            b.rect.y += b.dy * step;
        }
        self.bullets
            .retain(|b| b.rect.y > -b.rect.h && b.rect.y < CANVAS_H);
    }

    fn update_enemies(&mut self, step: f32) {
        let mut hit_edge = false;
        for enemy in &mut self.enemies {
            enemy.rect.x += enemy.dx * step;
            if enemy.rect.x <= 0.0 || enemy.rect.x >= CANVAS_W - enemy.rect.w {
                hit_edge = true;
            }
        }
        if hit_edge {
            for enemy in &mut self.enemies {
                enemy.dx = -enemy.dx;
                enemy.rect.y += ENEMY_STEP_DOWN;
            }
        }
    }

    fn check_collisions(&mut self) {
        let Self { bullets, enemies, particles, rng, score, .. } = self;
        // A bullet is spent on the first enemy it touches.
        bullets.retain(|bullet| {
            match enemies.iter().position(|e| bullet.rect.overlaps(&e.rect)) {
                Some(i) => {
                    let enemy = enemies.remove(i);
                    let (cx, cy) = enemy.rect.center();
                    particles.burst(&mut *rng, cx, cy, 8, enemy.color);
                    *score += ENEMY_POINTS;
                    false
                }
                None => true,
            }
        });

        // Each enemy touching the ship costs a life; the ship snaps back
        // after every hit, so later enemies are tested at the spawn column.
        for enemy in &self.enemies {
            if enemy.rect.overlaps(&self.player) {
                self.lives = self.lives.saturating_sub(1);
                self.player.x = PLAYER_SPAWN_X;
            }
        }
    }

    fn finish(&mut self, status: Status) -> Option<u32> {
        self.status = status;
        log::info!("space invaders finished: {:?} with {} points", status, self.score);
        Some(self.score)
    }

    fn render_field(&self, width: usize, height: usize) -> Vec<Line<'static>> {
        let mut canvas = BrailleCanvas::new(width, height, Color::Rgb(BG.0, BG.1, BG.2));
        canvas.star_field(60, self.tick);

        for enemy in &self.enemies {
            canvas.fill(&enemy.rect, enemy.color, false);
        }
        for bullet in &self.bullets {
            canvas.fill(&bullet.rect, PLAYER_COLOR, true);
        }
        for p in self.particles.iter() {
            canvas.point(p.x, p.y, fade(p.color, p.alpha(), BG));
        }
        if self.status != Status::Lost {
            canvas.fill(&self.player, PLAYER_COLOR, true);
        }
        canvas.into_lines()
    }
}

impl Default for SpaceInvaders {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for SpaceInvaders {
    fn tick(&mut self, keys: &KeyState, dt_ms: u64) -> Option<u32> {
        if self.status.is_terminal() || self.paused {
            return None;
        }
        self.tick += 1;
        self.clock_ms += dt_ms;
        let step = frames(dt_ms);

        self.update_player(keys, step);
        self.update_bullets(step);
        self.update_enemies(step);
        self.particles.update(step);

        self.check_collisions();

        if self.enemies.is_empty() {
            self.score += VICTORY_BONUS;
            return self.finish(Status::Won);
        }
        if self.lives == 0 {
            return self.finish(Status::Lost);
        }
        if self.enemies.iter().any(|e| e.rect.bottom() >= self.player.y) {
            return self.finish(Status::Lost);
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
        let block = game_block(" Space Invaders ", Color::Rgb(0, 191, 255));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let chunks = hud_layout(inner);

        let lives_str = "\u{2666} ".repeat(self.lives as usize);
        let status = Line::from(vec![
            Span::styled(" \u{1f47e} ", Style::default()),
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
            Span::styled(
                format!("Invaders: {} ", self.enemies.len()),
                Style::default().fg(Color::Rgb(255, 107, 157)),
            ),
            sep(),
            Span::styled(format!("Shots: {} ", self.shots), Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(status), chunks[0]);

        let fw = chunks[1].width as usize;
        let fh = chunks[1].height as usize;
        if fw > 0 && fh > 0 {
            frame.render_widget(Paragraph::new(self.render_field(fw, fh)), chunks[1]);
        }

        let footer = footer_line(
            self.status,
            self.paused,
            "VICTORY!",
            "GAME OVER!",
            &[("\u{2190}\u{2192}/AD", "Move"), ("Space", "Shoot"), ("P", "Pause"), ("R", "Restart"), ("Esc", "Menu")],
        );
        frame.render_widget(Paragraph::new(footer), chunks[2]);
    }

    fn reset(&mut self) {
        self.player = Aabb::new(PLAYER_SPAWN_X, PLAYER_Y, PLAYER_W, PLAYER_H);
        self.bullets.clear();
        self.particles.clear();
        self.score = 0;
        self.lives = START_LIVES;
        self.shots = 0;
        self.status = Status::Playing;
        self.paused = false;
        self.clock_ms = 0;
        self.last_shot_ms = None;
        self.init_enemies();
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

    fn idle() -> KeyState {
        KeyState::default()
    }

    #[test]
    fn starts_with_fifty_enemies() {
        let game = SpaceInvaders::with_seed(1);
        assert_eq!(game.enemies_left(), 50);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.status(), Status::Playing);
    }

    #[test]
    fn clearing_the_grid_wins_and_reports_once() {
        let mut game = SpaceInvaders::with_seed(1);
        game.bullets = game
            .enemies
            .iter()
            .map(|e| {
                let (cx, cy) = e.rect.center();
                Bullet { rect: Aabb::new(cx - 2.0, cy - 5.0, BULLET_W, BULLET_H), dy: BULLET_SPEED }
            })
            .collect();

        let reported = game.tick(&idle(), DT);
        assert_eq!(game.status(), Status::Won);
        assert_eq!(reported, Some(50 * ENEMY_POINTS + VICTORY_BONUS));

        let mut later = 0;
        for _ in 0..10 {
            if game.tick(&idle(), DT).is_some() {
                later += 1;
            }
        }
        assert_eq!(later, 0);
    }

    #[test]
    fn one_bullet_destroys_at_most_one_enemy() {
        let mut game = SpaceInvaders::with_seed(1);
        // Wide enough to straddle two neighbours
        let a = game.enemies[0].rect;
        game.bullets.push(Bullet { rect: Aabb::new(a.x, a.y, 100.0, 10.0), dy: 0.0 });
        game.tick(&idle(), DT);
        assert_eq!(game.enemies_left(), 49);
        assert_eq!(game.score(), ENEMY_POINTS);
        assert!(game.bullets.is_empty());
    }

    #[test]
    fn fire_cooldown_limits_shots_per_second() {
        let mut game = SpaceInvaders::with_seed(1);
        let keys = KeyState { fire: true, ..KeyState::default() };
        let mut elapsed = 0;
        while elapsed + DT <= 1000 {
            game.tick(&keys, DT);
            elapsed += DT;
        }
        assert_eq!(game.shots, 5);

        let mut game = SpaceInvaders::with_seed(1);
        for _ in 0..1000 {
            game.tick(&keys, 1);
        }
        assert!(game.shots <= 5);
    }

    #[test]
    fn player_is_clamped_to_canvas() {
        let mut game = SpaceInvaders::with_seed(1);
        let left = KeyState { left: true, ..KeyState::default() };
        for _ in 0..120 {
            game.tick(&left, DT);
            assert!(game.player.x >= 0.0);
        }
        assert_eq!(game.player.x, 0.0);

        let right = KeyState { right: true, ..KeyState::default() };
        for _ in 0..200 {
            game.tick(&right, DT);
            assert!(game.player.right() <= CANVAS_W);
        }
        assert_eq!(game.player.x, CANVAS_W - PLAYER_W);
    }

    #[test]
    fn grid_reverses_and_steps_down_at_the_edge() {
        let mut game = SpaceInvaders::with_seed(1);
        let top = game.enemies[0].rect.y;
        // Rightmost column starts at 590 and reaches 760 after ~170 frames.
        for _ in 0..200 {
            game.tick(&idle(), 17);
        }
        assert!(game.enemies.iter().all(|e| e.dx < 0.0));
        assert_eq!(game.enemies[0].rect.y, top + ENEMY_STEP_DOWN);
    }

    #[test]
    fn enemy_contact_costs_a_life_and_resets_player() {
        let mut game = SpaceInvaders::with_seed(1);
        game.player.x = 100.0;
        game.enemies = vec![Enemy {
            rect: Aabb::new(100.0, PLAYER_Y - 20.0, ENEMY_W, ENEMY_H),
            dx: 0.0,
            color: Color::Red,
        }];

        let reported = game.tick(&idle(), DT);
        assert_eq!(game.lives(), 2);
        assert_eq!(game.player.x, PLAYER_SPAWN_X);
        // The same enemy has also reached the player's row.
        assert_eq!(game.status(), Status::Lost);
        assert_eq!(reported, Some(0));
    }

    #[test]
    fn losing_last_life_ends_the_session() {
        let mut game = SpaceInvaders::with_seed(1);
        game.lives = 1;
        game.enemies = vec![
            Enemy { rect: Aabb::new(PLAYER_SPAWN_X, 100.0, 40.0, 30.0), dx: 0.0, color: Color::Red },
            Enemy { rect: Aabb::new(PLAYER_SPAWN_X, 100.0, 40.0, 30.0), dx: 0.0, color: Color::Red },
        ];
        game.player.y = 110.0;
        let reported = game.tick(&idle(), DT);
        assert_eq!(game.status(), Status::Lost);
        assert_eq!(reported, Some(0));
    }

    #[test]
    fn each_touching_enemy_costs_a_life() {
        let mut game = SpaceInvaders::with_seed(1);
        game.enemies = vec![
            Enemy { rect: Aabb::new(PLAYER_SPAWN_X, 100.0, 40.0, 30.0), dx: 0.0, color: Color::Red },
            Enemy { rect: Aabb::new(PLAYER_SPAWN_X + 10.0, 100.0, 40.0, 30.0), dx: 0.0, color: Color::Red },
        ];
        game.player.y = 110.0;
        game.tick(&idle(), DT);
        assert_eq!(game.lives(), START_LIVES - 2);
    }

    #[test]
    fn held_fire_does_not_skip_the_victory_panel() {
        let mut game = SpaceInvaders::with_seed(1);
        let a = game.enemies[0].rect;
        game.enemies.truncate(1);
        game.bullets.push(Bullet { rect: Aabb::new(a.x + 5.0, a.y + 5.0, BULLET_W, BULLET_H), dy: 0.0 });
        let firing = KeyState { fire: true, ..KeyState::default() };
        assert!(game.tick(&firing, DT).is_some());
        assert_eq!(game.status(), Status::Won);

        // Without release reporting, auto-repeat arrives as plain presses.
        game.handle_input(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        assert_eq!(game.status(), Status::Won);

        game.handle_input(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(game.status(), Status::Playing);
        assert_eq!(game.enemies_left(), 50);
    }

    #[test]
    fn restart_restores_initial_session() {
        let mut game = SpaceInvaders::with_seed(1);
        game.enemies.truncate(3);
        game.score = 470;
        game.lives = 1;
        game.status = Status::Lost;

        game.reset();
        assert_eq!(game.score(), 0);
        assert_eq!(game.lives(), START_LIVES);
        assert_eq!(game.enemies_left(), 50);
        assert_eq!(game.status(), Status::Playing);
        assert!(game.bullets.is_empty());
    }

    #[test]
    fn paused_game_does_not_advance() {
        let mut game = SpaceInvaders::with_seed(1);
        game.paused = true;
        let x = game.enemies[0].rect.x;
        game.tick(&idle(), DT);
        assert_eq!(game.enemies[0].rect.x, x);
    }
}
