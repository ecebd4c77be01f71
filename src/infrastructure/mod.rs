mod clients;
mod storage;

pub use clients::rawg::{games_url, Endpoint, RawgClient};
pub use storage::fs_store::FileSystemStore;
