use crate::domain::storage::{Storage, StorageKeys};
use crate::domain::GameId;
use crate::error::Result;
use std::fs;
use std::path::PathBuf;

/// Stores each key as `<data_dir>/<key>.json`.
#[derive(Clone)]
pub struct FileSystemStore {
    data_dir: PathBuf,
}

impl FileSystemStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn get_path_for_key(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }

    fn write_json_file<T: serde::Serialize + ?Sized>(&self, key: &str, data: &T) -> Result<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)?;
        }

        let content = serde_json::to_string(data)?;
        fs::write(self.get_path_for_key(key), content)?;
        Ok(())
    }

    fn read_json_file<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.get_path_for_key(key);
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(Some(serde_json::from_str(&content)?))
        } else {
            Ok(None)
        }
    }
}

impl Storage for FileSystemStore {
    fn load_favorites(&self) -> Result<Option<Vec<GameId>>> {
        self.read_json_file(StorageKeys::FAVORITES)
    }

    fn save_favorites(&self, ids: &[GameId]) -> Result<()> {
        self.write_json_file(StorageKeys::FAVORITES, ids)
    }
}
