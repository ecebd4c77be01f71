use super::GameId;
use crate::error::Result;

/// Durable key-value storage for client-side state.
pub trait Storage: Send + Sync {
    fn load_favorites(&self) -> Result<Option<Vec<GameId>>>;
    fn save_favorites(&self, ids: &[GameId]) -> Result<()>;
}

pub struct StorageKeys;

impl StorageKeys {
    pub const FAVORITES: &'static str = "gameFavorites";
}
