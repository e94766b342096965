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

const PLAYER_SPAWN: (f32, f32) = (50.0, 300.0);
const PLAYER_W: f32 = 40.0;
const PLAYER_H: f32 = 25.0;
const PLAYER_SPEED: f32 = 3.0;
const START_FUEL: f32 = 100.0;
const FUEL_BURN: f32 = 0.2;
const DEBRIS_FUEL_HIT: f32 = 5.0;

pub const SAFE_ZONE: Aabb = Aabb::new(0.0, 250.0, 100.0, 100.0);
pub const SATELLITES_NEEDED: usize = 8;
const SATELLITE_SIZE: f32 = 25.0;
const MAX_HEALTH: f32 = 100.0;
const HEALTH_DECAY: f32 = 0.1;
/// Satellites never spawn within this distance of the player.
const SPAWN_CLEARANCE: f32 = 100.0;
const DEBRIS_COUNT: usize = 15;

const BG: (u8, u8, u8) = (5, 5, 18);
const PLAYER_COLOR: Color = Color::Rgb(0, 191, 255);
const SATELLITE_COLOR: Color = Color::Rgb(255, 215, 0);
const DEBRIS_COLOR: Color = Color::Rgb(139, 90, 60);
const THRUST_COLOR: Color = Color::Rgb(255, 107, 157);
const DAMAGE_COLOR: Color = Color::Rgb(255, 71, 87);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SatelliteState {
    Drifting,
    Rescued,
    Lost,
}

#[derive(Clone, Debug)]
struct Satellite {
    rect: Aabb,
    vx: f32,
    vy: f32,
    health: f32,
    state: SatelliteState,
}

impl Satellite {
    fn rescuable(&self) -> bool {
        self.state == SatelliteState::Drifting && self.health > 0.0
    }
}

#[derive(Clone, Debug)]
struct Debris {
    rect: Aabb,
    vx: f32,
    vy: f32,
    rotation: f32,
    spin: f32,
}

pub struct SatelliteRescue {
    player: Aabb,
    satellites: Vec<Satellite>,
    debris: Vec<Debris>,
    particles: Particles,
    score: u32,
    fuel: f32,
    rescued: usize,
    status: Status,
    paused: bool,
    tick: u64,
    rng: StdRng,
}

impl SatelliteRescue {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut s = Self {
            player: Self::spawn_box(),
            satellites: Vec::new(),
            debris: Vec::new(),
            particles: Particles::new(),
            score: 0,
            fuel: START_FUEL,
            rescued: 0,
            status: Status::Playing,
            paused: false,
            tick: 0,
            rng,
        };
        s.init_field();
        s
    }

    fn spawn_box() -> Aabb {
        Aabb::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1, PLAYER_W, PLAYER_H)
    }

    pub fn fuel(&self) -> f32 {
        self.fuel
    }

    pub fn rescued(&self) -> usize {
        self.rescued
    }

    pub fn satellite_states(&self) -> Vec<SatelliteState> {
        self.satellites.iter().map(|s| s.state).collect()
    }

    fn init_field(&mut self) {
        self.satellites.clear();
        while self.satellites.len() < SATELLITES_NEEDED {
            let x = self.rng.gen_range(200.0..700.0);
            let y = self.rng.gen_range(50.0..550.0);
            let dist = ((x - PLAYER_SPAWN.0).powi(2) + (y - PLAYER_SPAWN.1).powi(2)).sqrt();
            if dist < SPAWN_CLEARANCE {
                continue;
            }
            self.satellites.push(Satellite {
                rect: Aabb::new(x, y, SATELLITE_SIZE, SATELLITE_SIZE),
                vx: self.rng.gen_range(-1.0..1.0),
                vy: self.rng.gen_range(-1.0..1.0),
                health: MAX_HEALTH,
                state: SatelliteState::Drifting,
            });
        }

        self.debris = (0..DEBRIS_COUNT)
            .map(|_| Debris {
                rect: Aabb::new(
                    self.rng.gen_range(150.0..750.0),
                    self.rng.gen_range(0.0..CANVAS_H),
                    self.rng.gen_range(15.0..35.0),
                    self.rng.gen_range(15.0..35.0),
                ),
                vx: self.rng.gen_range(-2.0..2.0),
                vy: self.rng.gen_range(-2.0..2.0),
                rotation: 0.0,
                spin: self.rng.gen_range(-0.1..0.1),
            })
            .collect();
    }

    /// Returns true if the ship actually moved.
    fn update_player(&mut self, keys: &KeyState, step: f32) -> bool {
        let before = (self.player.x, self.player.y);
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
        let moved = (self.player.x, self.player.y) != before;
        if moved {
            self.fuel = (self.fuel - FUEL_BURN * step).max(0.0);
            let (cx, _) = self.player.center();
            self.particles.burst(&mut self.rng, cx, self.player.bottom(), 1, THRUST_COLOR);
        }
        moved
    }

    fn update_satellites(&mut self, step: f32) {
        for sat in self.satellites.iter_mut().filter(|s| s.state == SatelliteState::Drifting) {
            sat.rect.bounce_within(&mut sat.vx, &mut sat.vy, step, CANVAS_W, CANVAS_H);
            sat.health -= HEALTH_DECAY * step;
            if sat.health <= 0.0 {
                sat.health = 0.0;
                sat.state = SatelliteState::Lost;
                log::debug!("satellite lost at ({:.0}, {:.0})", sat.rect.x, sat.rect.y);
            }
        }
    }

    fn update_debris(&mut self, step: f32) {
        for d in &mut self.debris {
            d.rect.wrap_around(d.vx, d.vy, step, CANVAS_W, CANVAS_H);
            d.rotation += d.spin * step;
        }
    }

    /// A rescue needs the ship over a live satellite and inside the safe zone
    /// on the same tick.
    fn check_rescues(&mut self) {
        let Self { satellites, player, particles, rng, score, rescued, .. } = self;
        let in_zone = player.overlaps(&SAFE_ZONE);
        for sat in satellites.iter_mut() {
            if sat.rescuable() && sat.rect.overlaps(player) && in_zone {
                sat.state = SatelliteState::Rescued;
                *rescued += 1;
                *score += sat.health.floor() as u32;
                particles.burst(&mut *rng, sat.rect.x, sat.rect.y, 10, SATELLITE_COLOR);
            }
        }
    }

    fn check_debris(&mut self) {
        let hits = self.debris.iter().filter(|d| d.rect.overlaps(&self.player)).count();
        if hits > 0 {
            self.fuel = (self.fuel - DEBRIS_FUEL_HIT * hits as f32).max(0.0);
            self.particles.burst(&mut self.rng, self.player.x, self.player.y, 5 * hits, DAMAGE_COLOR);
        }
    }

    fn finish(&mut self, status: Status, final_score: u32) -> Option<u32> {
        self.status = status;
        log::info!(
            "satellite rescue {:?}: {} rescued, final score {}",
            status,
            self.rescued,
            final_score
        );
        Some(final_score)
    }

    fn debris_verts(d: &Debris) -> [(f32, f32); 4] {
        let (cx, cy) = d.rect.center();
        let (hw, hh) = (d.rect.w / 2.0, d.rect.h / 2.0);
        let (sin, cos) = d.rotation.sin_cos();
        [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)].map(|(x, y)| (cx + x * cos - y * sin, cy + x * sin + y * cos))
    }

    fn render_field(&self, width: usize, height: usize) -> Vec<Line<'static>> {
        let mut canvas = BrailleCanvas::new(width, height, Color::Rgb(BG.0, BG.1, BG.2));
        canvas.star_field(60, self.tick);

        canvas.outline(&SAFE_ZONE, PLAYER_COLOR);
        canvas.glyph(SAFE_ZONE.x + 30.0, SAFE_ZONE.y + 45.0, '\u{25c9}', Color::Rgb(0, 150, 255));

        for sat in self.satellites.iter().filter(|s| s.rescuable()) {
            canvas.fill(&sat.rect, SATELLITE_COLOR, true);
            let bar = Aabb::new(sat.rect.x, sat.rect.y - 8.0, sat.rect.w, 4.0);
            canvas.fill(&bar, DAMAGE_COLOR, false);
            let left = Aabb::new(bar.x, bar.y, bar.w * (sat.health / MAX_HEALTH), bar.h);
            canvas.fill(&left, Color::Rgb(46, 213, 115), false);
        }
        for d in &self.debris {
            canvas.polygon(&Self::debris_verts(d), DEBRIS_COLOR);
        }
        for p in self.particles.iter() {
            canvas.point(p.x, p.y, fade(p.color, p.alpha(), BG));
        }
        canvas.fill(&self.player, PLAYER_COLOR, true);
        canvas.into_lines()
    }
}

impl Default for SatelliteRescue {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for SatelliteRescue {
    fn tick(&mut self, keys: &KeyState, dt_ms: u64) -> Option<u32> {
        if self.status.is_terminal() || self.paused {
            return None;
        }
        self.tick += 1;
        let step = frames(dt_ms);

        self.update_player(keys, step);
        self.update_satellites(step);
        self.update_debris(step);
        self.particles.update(step);

        self.check_rescues();
        self.check_debris();

        if self.rescued >= SATELLITES_NEEDED {
            let bonus = (self.fuel * 10.0).floor() as u32;
            return self.finish(Status::Won, self.score + bonus);
        }
        if self.fuel <= 0.0 {
            return self.finish(Status::Lost, self.score);
        }
        // Every remaining satellite burned out: the target can no longer be met.
        if !self.satellites.iter().any(|s| s.state == SatelliteState::Drifting) {
            return self.finish(Status::Lost, self.score);
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
        let block = game_block(" Satellite Rescue ", PLAYER_COLOR);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let chunks = hud_layout(inner);

        let fuel_color = if self.fuel > 50.0 {
            Color::Green
        } else if self.fuel > 20.0 {
            Color::Yellow
        } else {
            Color::Red
        };
        let status = Line::from(vec![
            Span::styled(" \u{1f6f0} ", Style::default()),
            Span::styled(
                format!("Score: {} ", self.score),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            sep(),
            Span::styled(
                format!("Rescued: {}/{} ", self.rescued, SATELLITES_NEEDED),
                Style::default().fg(SATELLITE_COLOR),
            ),
            sep(),
            Span::styled(
                format!("Fuel: {:.0}% ", self.fuel),
                Style::default().fg(fuel_color).add_modifier(Modifier::BOLD),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), chunks[0]);

        let fw = chunks[1].width as usize;
        let fh = chunks[1].height as usize;
        if fw > 0 && fh > 0 {
            frame.render_widget(Paragraph::new(self.render_field(fw, fh)), chunks[1]);
        }

        let lost_text = if self.fuel <= 0.0 { "OUT OF FUEL!" } else { "MISSION FAILED!" };
        let footer = footer_line(
            self.status,
            self.paused,
            "ALL SATELLITES RESCUED!",
            lost_text,
            &[
                ("\u{2190}\u{2191}\u{2192}\u{2193}/WASD", "Move"),
                ("Zone", "Bring satellites home"),
                ("P", "Pause"),
                ("R", "Restart"),
                ("Esc", "Menu"),
            ],
        );
        frame.render_widget(Paragraph::new(footer), chunks[2]);
    }

    fn reset(&mut self) {
        self.player = Self::spawn_box();
        self.particles.clear();
        self.score = 0;
        self.fuel = START_FUEL;
        self.rescued = 0;
        self.status = Status::Playing;
        self.paused = false;
        self.init_field();
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

    fn parked(x: f32, y: f32, health: f32) -> Satellite {
        Satellite {
            rect: Aabb::new(x, y, SATELLITE_SIZE, SATELLITE_SIZE),
            vx: 0.0,
            vy: 0.0,
            health,
            state: SatelliteState::Drifting,
        }
    }

    /// No debris, and one far-away satellite so the session can't strand.
    fn quiet_game() -> SatelliteRescue {
        let mut game = SatelliteRescue::with_seed(5);
        game.debris.clear();
        game.satellites = vec![parked(700.0, 50.0, MAX_HEALTH)];
        game
    }

    #[test]
    fn field_layout() {
        let game = SatelliteRescue::with_seed(1);
        assert_eq!(game.satellites.len(), SATELLITES_NEEDED);
        assert_eq!(game.debris.len(), DEBRIS_COUNT);
        assert!(game.player.overlaps(&SAFE_ZONE));
        for sat in &game.satellites {
            assert!(sat.rect.x >= 200.0 && sat.rect.x < 700.0);
            assert!(sat.rect.y >= 50.0 && sat.rect.y < 550.0);
        }
    }

    #[test]
    fn zero_health_satellite_is_never_rescued() {
        let mut game = quiet_game();
        game.satellites.push(parked(60.0, 300.0, 0.0));
        game.satellites.push(parked(55.0, 305.0, 0.05));

        assert_eq!(game.tick(&KeyState::default(), DT), None);
        assert_eq!(game.rescued(), 0);
        assert_eq!(game.score(), 0);
        assert_eq!(game.satellites[1].state, SatelliteState::Lost);
        assert_eq!(game.satellites[2].state, SatelliteState::Lost);
    }

    #[test]
    fn rescue_needs_satellite_and_zone_together() {
        let mut game = quiet_game();
        game.player = Aabb::new(300.0, 100.0, PLAYER_W, PLAYER_H);
        game.satellites.push(parked(310.0, 100.0, MAX_HEALTH));

        game.tick(&KeyState::default(), DT);
        assert_eq!(game.rescued(), 0, "touching the satellite outside the zone");

        game.satellites[1].rect.x = 20.0;
        game.satellites[1].rect.y = 300.0;
        game.tick(&KeyState::default(), DT);
        assert_eq!(game.rescued(), 0, "satellite in the zone but the ship is not on it");

        game.player = Aabb::new(10.0, 300.0, PLAYER_W, PLAYER_H);
        game.tick(&KeyState::default(), DT);
        assert_eq!(game.rescued(), 1);
        assert_eq!(game.satellites[1].state, SatelliteState::Rescued);
        // 100 health minus three ticks of decay
        assert_eq!(game.score(), 99);
    }

    #[test]
    fn eighth_rescue_wins_with_fuel_bonus() {
        let mut game = quiet_game();
        game.rescued = SATELLITES_NEEDED - 1;
        game.satellites.push(parked(60.0, 300.0, MAX_HEALTH));

        let done = game.tick(&KeyState::default(), DT);
        assert_eq!(game.status(), Status::Won);
        assert_eq!(game.score(), 99);
        assert_eq!(done, Some(99 + 1000));
        assert_eq!(game.tick(&KeyState::default(), DT), None);
    }

    #[test]
    fn each_overlapping_debris_costs_fuel() {
        let mut game = quiet_game();
        for _ in 0..2 {
            game.debris.push(Debris {
                rect: Aabb::new(55.0, 300.0, 20.0, 20.0),
                vx: 0.0,
                vy: 0.0,
                rotation: 0.0,
                spin: 0.0,
            });
        }
        game.tick(&KeyState::default(), DT);
        assert_eq!(game.fuel(), START_FUEL - 2.0 * DEBRIS_FUEL_HIT);
    }

    #[test]
    fn moving_burns_fuel_and_idling_does_not() {
        let mut game = quiet_game();
        game.tick(&KeyState::default(), DT);
        assert_eq!(game.fuel(), START_FUEL);

        game.tick(&KeyState { right: true, ..KeyState::default() }, DT);
        assert!(game.fuel() < START_FUEL);
    }

    #[test]
    fn running_dry_loses() {
        let mut game = quiet_game();
        game.score = 42;
        game.fuel = 0.1;
        let done = game.tick(&KeyState { right: true, ..KeyState::default() }, DT);
        assert_eq!(game.fuel(), 0.0);
        assert_eq!(game.status(), Status::Lost);
        assert_eq!(done, Some(42));
    }

    #[test]
    fn space_does_not_restart_a_failed_mission() {
        let mut game = quiet_game();
        game.fuel = 0.1;
        game.tick(&KeyState { right: true, ..KeyState::default() }, DT);
        assert_eq!(game.status(), Status::Lost);

        game.handle_input(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        assert_eq!(game.status(), Status::Lost);
        game.handle_input(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE));
        assert_eq!(game.status(), Status::Playing);
        assert_eq!(game.fuel(), START_FUEL);
    }

    #[test]
    fn losing_every_satellite_ends_the_mission() {
        let mut game = quiet_game();
        game.satellites[0].health = 0.01;
        assert_eq!(game.tick(&KeyState::default(), DT), Some(0));
        assert_eq!(game.status(), Status::Lost);
    }

    #[test]
    fn player_stays_on_canvas() {
        let mut game = quiet_game();
        game.satellites[0].health = f32::MAX;
        let up_left = KeyState { up: true, left: true, ..KeyState::default() };
        for _ in 0..150 {
            game.fuel = START_FUEL;
            game.tick(&up_left, DT);
            assert!(game.player.x >= 0.0 && game.player.y >= 0.0);
        }
        assert_eq!((game.player.x, game.player.y), (0.0, 0.0));

        let down_right = KeyState { down: true, right: true, ..KeyState::default() };
        for _ in 0..400 {
            game.fuel = START_FUEL;
            game.tick(&down_right, DT);
            assert!(game.player.right() <= CANVAS_W && game.player.bottom() <= CANVAS_H);
        }
        assert_eq!(game.player.x, CANVAS_W - PLAYER_W);
        assert_eq!(game.player.y, CANVAS_H - PLAYER_H);
    }

    #[test]
    fn restart_refuels_and_reseeds() {
        let mut game = SatelliteRescue::with_seed(9);
        let before: Vec<Aabb> = game.satellites.iter().map(|s| s.rect).collect();
        game.score = 300;
        game.fuel = 3.0;
        game.rescued = 4;
        game.status = Status::Lost;

        game.reset();
        assert_eq!(game.score(), 0);
        assert_eq!(game.fuel(), START_FUEL);
        assert_eq!(game.rescued(), 0);
        assert_eq!(game.status(), Status::Playing);
        assert!(game.satellite_states().iter().all(|s| *s == SatelliteState::Drifting));
        let after: Vec<Aabb> = game.satellites.iter().map(|s| s.rect).collect();
        assert_ne!(before, after);
    }
}
