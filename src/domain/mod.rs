mod catalog;
mod favorites;
mod game;
mod source;
pub mod storage;

pub use catalog::{Catalog, Cursor};
pub use favorites::Favorites;
pub use game::{Game, GameId, GamePage, Genre};
pub use source::{CatalogSource, PAGE_SIZE};
