use serde::{Deserialize, Deserializer, Serialize};

pub type GameId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
}

/// One catalog entry as delivered by the RAWG `games` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ratings_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

impl Game {
    pub fn new(id: GameId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            rating: None,
            ratings_count: 0,
            genres: Vec::new(),
            background_image: None,
        }
    }

    pub fn with_rating(mut self, rating: f64, ratings_count: u64) -> Self {
        self.rating = Some(rating);
        self.ratings_count = ratings_count;
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres
            .into_iter()
            .map(|name| Genre { name: name.into() })
            .collect();
        self
    }

    /// Rating used for comparisons; absent counts as zero.
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    pub fn genre_names(&self) -> impl Iterator<Item = &str> {
        self.genres.iter().map(|g| g.name.as_str())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of the upstream collection endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GamePage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Game>,
    /// Only its presence matters.
    #[serde(default)]
    pub next: Option<String>,
}

impl GamePage {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}
