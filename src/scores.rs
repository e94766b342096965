use std::collections::HashMap;

use crate::games::GameId;

/// Best score per game for this run. Nothing is written to disk.
#[derive(Clone, Debug, Default)]
pub struct ScoreBoard {
    best: HashMap<GameId, u32>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished session. Returns true if it set a new best.
    pub fn record(&mut self, id: GameId, score: u32) -> bool {
        let best = self.best.entry(id).or_insert(0);
        if score > *best {
            log::info!("new best for {}: {} (was {})", id.slug(), score, *best);
            *best = score;
            true
        } else {
            false
        }
    }

    pub fn best(&self, id: GameId) -> u32 {
        self.best.get(&id).copied().unwrap_or(0)
    }

    /// Sum of the best score in every game.
    pub fn total(&self) -> u32 {
        self.best.values().sum()
    }
}
