use crate::domain::{Game, GameId};
use rustc_hash::FxHashSet;

pub const TOP_GENRES: usize = 5;

/// Genre name to the games carrying it, in first-seen genre order.
pub type GenreGroups = Vec<(String, Vec<Game>)>;

/// Most popular game: highest `ratings_count`, then highest rating.
/// Exact ties keep the earliest game.
pub fn compute_winner(games: &[Game]) -> Option<&Game> {
    games.iter().fold(None, |best, game| match best {
        None => Some(game),
        Some(best) => {
            let better = game.ratings_count > best.ratings_count
                || (game.ratings_count == best.ratings_count
                    && game.rating_or_zero() > best.rating_or_zero());
            Some(if better { game } else { best })
        }
    })
}

/// Case-insensitive substring match against the name or any genre name.
/// An empty filter matches everything.
pub fn matches_filter(game: &Game, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }

    let needle = filter.to_lowercase();
    game.name.to_lowercase().contains(&needle)
        || game
            .genre_names()
            .any(|genre| genre.to_lowercase().contains(&needle))
}

pub fn filter_games(games: &[Game], filter: &str) -> Vec<Game> {
    games
        .iter()
        .filter(|game| matches_filter(game, filter))
        .cloned()
        .collect()
}

pub fn group_by_genre(games: &[Game]) -> GenreGroups {
    let mut groups: GenreGroups = Vec::new();
    let mut seen: Vec<FxHashSet<GameId>> = Vec::new();

    for game in games {
        for genre in game.genre_names() {
            let index = match groups.iter().position(|(name, _)| name == genre) {
                Some(index) => index,
                None => {
                    groups.push((genre.to_string(), Vec::new()));
                    seen.push(FxHashSet::default());
                    groups.len() - 1
                }
            };

            if seen[index].insert(game.id) {
                groups[index].1.push(game.clone());
            }
        }
    }

    groups
}

/// Up to `k` genre names by descending group size; ties keep first-seen order.
pub fn top_genres(groups: &GenreGroups, k: usize) -> Vec<String> {
    let mut ranked: Vec<_> = groups
        .iter()
        .map(|(name, games)| (name, games.len()))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(k)
        .map(|(name, _)| name.clone())
        .collect()
}
