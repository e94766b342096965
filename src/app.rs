use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::ArcadeSettings;
use crate::games::{Game, GameId};
use crate::input::InputAdapter;
use crate::scores::ScoreBoard;

pub const TAGLINE: &str = "Full Stack Developer & Space Enthusiast";
const TAGLINE_CHAR_MS: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Home,
    Game(GameId),
}

const TABS: [Tab; 4] = [
    Tab::Home,
    Tab::Game(GameId::SpaceInvaders),
    Tab::Game(GameId::AsteroidBreaker),
    Tab::Game(GameId::SatelliteRescue),
];

impl Tab {
    pub fn all() -> &'static [Tab] {
        &TABS
    }

    pub fn title(&self) -> &str {
        match self {
            Tab::Home => " Home ",
            Tab::Game(GameId::SpaceInvaders) => " Invaders ",
            Tab::Game(GameId::AsteroidBreaker) => " Asteroids ",
            Tab::Game(GameId::SatelliteRescue) => " Rescue ",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Home => 0,
            Tab::Game(id) => id.index() + 1,
        }
    }
}

/// Reveals `text` one character per `char_ms`.
#[derive(Debug, Clone)]
pub struct Typewriter {
    text: &'static str,
    char_ms: u64,
    elapsed_ms: u64,
}

impl Typewriter {
    pub fn new(text: &'static str, char_ms: u64) -> Self {
        Self {
            text,
            char_ms: char_ms.max(1),
            elapsed_ms: 0,
        }
    }

    pub fn advance(&mut self, dt_ms: u64) {
        if !self.is_done() {
            self.elapsed_ms += dt_ms;
        }
    }

    pub fn visible(&self) -> &'static str {
        let shown = (self.elapsed_ms / self.char_ms) as usize;
        let end = self
            .text
            .char_indices()
            .nth(shown)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len());
        &self.text[..end]
    }

    pub fn is_done(&self) -> bool {
        self.visible().len() == self.text.len()
    }
}

/// A mounted game together with the key state it reads.
pub struct Session {
    pub id: GameId,
    pub game: Box<dyn Game>,
    pub input: InputAdapter,
}

pub struct App {
    pub should_quit: bool,
    pub current_tab: Tab,
    pub selected_game: usize,
    pub scoreboard: ScoreBoard,
    pub show_scores: bool,
    pub tagline: Typewriter,
    pub last_result: Option<(GameId, u32)>,
    session: Option<Session>,
    clock_ms: u64,
    key_release_timeout_ms: u64,
}

impl App {
    pub fn new(settings: &ArcadeSettings) -> Self {
        Self {
            should_quit: false,
            current_tab: Tab::Home,
            selected_game: 0,
            scoreboard: ScoreBoard::new(),
            show_scores: false,
            tagline: Typewriter::new(TAGLINE, TAGLINE_CHAR_MS),
            last_result: None,
            session: None,
            clock_ms: 0,
            key_release_timeout_ms: settings.key_release_timeout_ms,
        }
    }

    /// Milliseconds of ticks since start.
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Start a fresh session of `id`, dropping any other one.
    pub fn mount(&mut self, id: GameId) {
        if self.session.as_ref().is_some_and(|s| s.id == id) {
            return;
        }
        self.install(id, id.launch());
    }

    fn install(&mut self, id: GameId, game: Box<dyn Game>) {
        self.unmount();
        log::info!("mounted {}", id.slug());
        self.session = Some(Session {
            id,
            game,
            input: InputAdapter::new(self.key_release_timeout_ms),
        });
        self.current_tab = Tab::Game(id);
        self.selected_game = id.index();
    }

    pub fn unmount(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!("unmounted {} at score {}", session.id.slug(), session.game.score());
        }
    }

    pub fn open_tab(&mut self, tab: Tab) {
        match tab {
            Tab::Home => {
                self.unmount();
                self.current_tab = Tab::Home;
            }
            Tab::Game(id) => self.mount(id),
        }
    }

    pub fn on_tick(&mut self, dt_ms: u64) {
        self.clock_ms += dt_ms;
        self.tagline.advance(dt_ms);

        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.input.expire(self.clock_ms);
        if let Some(score) = session.game.tick(session.input.keys(), dt_ms) {
            log::info!("{} finished ({:?}) with {}", session.id.slug(), session.game.status(), score);
            self.scoreboard.record(session.id, score);
            self.last_result = Some((session.id, score));
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        // Releases only matter to the held-key state.
        if key.kind == KeyEventKind::Release {
            if let Some(session) = self.session.as_mut() {
                session.input.handle_event(key, self.clock_ms);
            }
            return;
        }

        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if let Some(session) = self.session.as_mut() {
            session.input.handle_event(key, self.clock_ms);
        }
        if key.kind == KeyEventKind::Repeat {
            return;
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') if self.current_tab == Tab::Home => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.prev_tab();
                } else {
                    self.next_tab();
                }
                return;
            }
            KeyCode::BackTab => {
                self.prev_tab();
                return;
            }
            KeyCode::Esc if self.current_tab != Tab::Home => {
                self.open_tab(Tab::Home);
                return;
            }
            _ => {}
        }

        if self.current_tab == Tab::Home {
            self.on_home_key(key);
            return;
        }

        if let Some(session) = self.session.as_mut() {
            session.game.handle_input(key);
        }
    }

    fn on_home_key(&mut self, key: KeyEvent) {
        let count = GameId::ALL.len();
        match key.code {
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                if let Some(id) = GameId::ALL.get(idx) {
                    self.mount(*id);
                }
            }
            KeyCode::Right | KeyCode::Down => self.selected_game = (self.selected_game + 1) % count,
            KeyCode::Left | KeyCode::Up => self.selected_game = (self.selected_game + count - 1) % count,
            KeyCode::Enter => {
                if let Some(id) = GameId::ALL.get(self.selected_game) {
                    self.mount(*id);
                }
            }
            KeyCode::Char('h') | KeyCode::Char('H') => self.show_scores = !self.show_scores,
            _ => {}
        }
    }

    fn next_tab(&mut self) {
        let tabs = Tab::all();
        let idx = self.current_tab.index();
        self.open_tab(tabs[(idx + 1) % tabs.len()]);
    }

    fn prev_tab(&mut self) {
        let tabs = Tab::all();
        let idx = self.current_tab.index();
        self.open_tab(tabs[(idx + tabs.len() - 1) % tabs.len()]);
    }
}
