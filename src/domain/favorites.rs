use super::game::GameId;

/// Favorite ids in toggle order. Ids may refer to games that are not loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    ids: Vec<GameId>,
}

impl Favorites {
    pub fn from_ids(ids: Vec<GameId>) -> Self {
        let mut favorites = Self::default();
        for id in ids {
            if !favorites.contains(id) {
                favorites.ids.push(id);
            }
        }
        favorites
    }

    /// Flips membership and returns whether `id` is now a favorite.
    pub fn toggle(&mut self, id: GameId) -> bool {
        if let Some(pos) = self.ids.iter().position(|&fav| fav == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    pub fn contains(&self, id: GameId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[GameId] {
        &self.ids
    }
}
