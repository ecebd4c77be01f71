use super::game::{Game, GameId};
use rustc_hash::FxHashSet;

/// Insertion-ordered games, unique by id. The first occurrence of an id wins.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    games: Vec<Game>,
    ids: FxHashSet<GameId>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, games: Vec<Game>) {
        self.games.clear();
        self.ids.clear();
        self.extend(games);
    }

    /// Appends games whose id is not yet present and returns how many were added.
    pub fn extend(&mut self, games: Vec<Game>) -> usize {
        let before = self.games.len();
        for game in games {
            if self.ids.insert(game.id) {
                self.games.push(game);
            }
        }
        self.games.len() - before
    }

    pub fn contains(&self, id: GameId) -> bool {
        self.ids.contains(&id)
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub current_page: u32,
    pub has_more: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            current_page: 1,
            has_more: true,
        }
    }
}
