pub mod asteroid_breaker;
pub mod canvas;
pub mod geometry;
pub mod particles;
pub mod satellite_rescue;
pub mod space_invaders;

use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::input::KeyState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Playing,
    /// AsteroidBreaker only: the tick that cleared a level.
    LevelComplete,
    Won,
    Lost,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Won | Status::Lost)
    }
}

/// One mini-game session.
///
/// `tick` is the whole simulation step and never touches the terminal;
/// `render` only reads state.
pub trait Game {
    /// Advance by `dt_ms`. Returns the final score on the tick the session
    /// ends, and `None` on every other tick (including all ticks after it).
    fn tick(&mut self, keys: &KeyState, dt_ms: u64) -> Option<u32>;
    /// Non-movement keys (pause, restart).
    fn handle_input(&mut self, key: KeyEvent);
    fn render(&self, frame: &mut Frame, area: Rect);
    fn reset(&mut self);
    fn score(&self) -> u32;
    fn status(&self) -> Status;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameId {
    SpaceInvaders,
    AsteroidBreaker,
    SatelliteRescue,
}

impl GameId {
    pub const ALL: [GameId; 3] = [GameId::SpaceInvaders, GameId::AsteroidBreaker, GameId::SatelliteRescue];

    pub fn slug(self) -> &'static str {
        match self {
            GameId::SpaceInvaders => "space-invaders",
            GameId::AsteroidBreaker => "asteroid-breaker",
            GameId::SatelliteRescue => "satellite-rescue",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GameId::SpaceInvaders => "Space Invaders",
            GameId::AsteroidBreaker => "Asteroid Breaker",
            GameId::SatelliteRescue => "Satellite Rescue",
        }
    }

    pub fn difficulty(self) -> &'static str {
        match self {
            GameId::SpaceInvaders => "Medium",
            GameId::AsteroidBreaker => "Easy",
            GameId::SatelliteRescue => "Hard",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GameId::SpaceInvaders => "Defend Earth from\nthe alien invasion!",
            GameId::AsteroidBreaker => "Dodge the asteroid field\nand collect space gems.",
            GameId::SatelliteRescue => "Guide satellites home\nwhile avoiding debris.",
        }
    }

    pub fn index(self) -> usize {
        match self {
            GameId::SpaceInvaders => 0,
            GameId::AsteroidBreaker => 1,
            GameId::SatelliteRescue => 2,
        }
    }

    /// Builds a fresh session for this game.
    pub fn launch(self) -> Box<dyn Game> {
        match self {
            GameId::SpaceInvaders => Box::new(space_invaders::SpaceInvaders::new()),
            GameId::AsteroidBreaker => Box::new(asteroid_breaker::AsteroidBreaker::new()),
            GameId::SatelliteRescue => Box::new(satellite_rescue::SatelliteRescue::new()),
        }
    }
}

// ── Shared HUD pieces ──────────────────────────────────────────────

pub(crate) fn game_block(title: &str, accent: Color) -> ratatui::widgets::Block<'_> {
    use ratatui::widgets::{Block, BorderType, Borders};
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(accent))
        .title(title)
        .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
}

pub(crate) fn hud_layout(inner: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(inner)
}

pub(crate) fn sep() -> Span<'static> {
    Span::styled(" | ", Style::default().fg(Color::DarkGray))
}

/// Bottom bar: win/lose panel with restart prompt, pause notice, or help.
pub(crate) fn footer_line(
    status: Status,
    paused: bool,
    won_text: &'static str,
    lost_text: &'static str,
    help: &[(&'static str, &'static str)],
) -> Line<'static> {
    match status {
        Status::Won => Line::from(vec![
            Span::styled(format!(" {} ", won_text), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::styled("Press ENTER to play again, Esc for menu", Style::default().fg(Color::Gray)),
        ]),
        Status::Lost => Line::from(vec![
            Span::styled(format!(" {} ", lost_text), Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::styled("Press ENTER to restart, Esc for menu", Style::default().fg(Color::Gray)),
        ]),
        _ if paused => Line::from(Span::styled(
            " PAUSED - Press P to resume ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        _ => {
            let mut spans = vec![Span::raw(" ")];
            for (i, (key, what)) in help.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled("| ", Style::default().fg(Color::Rgb(60, 60, 60))));
                }
                spans.push(Span::styled(*key, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
                spans.push(Span::styled(format!(" {} ", what), Style::default().fg(Color::DarkGray)));
            }
            Line::from(spans)
        }
    }
}
