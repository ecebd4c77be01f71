use crate::domain::{Game, GameId};
use crate::services::aggregator::{DashboardSnapshot, LoadStatus};
use std::fmt::Write;

const TRENDING_ROW_LIMIT: usize = 40;

/// Commands the terminal dashboard sends back to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    More,
    Search(String),
    Clear,
    Favorite(GameId),
    Quit,
}

impl UserCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        match verb {
            "more" | "m" => Some(Self::More),
            "search" | "s" => Some(Self::Search(rest.trim().to_string())),
            "clear" | "c" => Some(Self::Clear),
            "fav" | "f" => rest.trim().parse().ok().map(Self::Favorite),
            "quit" | "q" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Zero counts as unrated, the same as a missing rating.
pub fn rating_label(game: &Game) -> String {
    match game.rating {
        Some(rating) if rating != 0.0 => format!("{:.2}", rating),
        _ => "N/A".to_string(),
    }
}

pub fn genre_label(game: &Game) -> String {
    if game.genres.is_empty() {
        return "Game".to_string();
    }
    game.genre_names().take(2).collect::<Vec<_>>().join(" | ")
}

pub fn genre_icon(genre: &str) -> &'static str {
    match genre {
        "Action" | "RPG" => "⚔",
        "Adventure" => "🎯",
        "Shooter" => "🔫",
        _ => "🎮",
    }
}

fn render_card(out: &mut String, game: &Game, snapshot: &DashboardSnapshot) {
    let crown = if snapshot.winner == Some(game.id) {
        "👑 "
    } else {
        ""
    };
    let heart = if snapshot.is_favorite(game.id) {
        "♥"
    } else {
        "♡"
    };
    let _ = writeln!(
        out,
        "  {heart} {crown}{} [#{}] ⭐ {} · {}",
        game.name,
        game.id,
        rating_label(game),
        genre_label(game)
    );
}

fn render_row(out: &mut String, title: &str, games: &[Game], snapshot: &DashboardSnapshot) {
    let _ = writeln!(out, "{title}");
    for game in games {
        render_card(out, game, snapshot);
    }
    out.push('\n');
}

pub fn render(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();

    match &snapshot.status {
        LoadStatus::Loading => return "Loading games...\n".to_string(),
        LoadStatus::Failed(message) => return format!("{message}\n"),
        LoadStatus::Ready => {}
    }

    if !snapshot.search.is_empty() {
        let title = format!("Search Results ({})", snapshot.filtered.len());
        render_row(&mut out, &title, &snapshot.filtered, snapshot);
        return out;
    }

    if !snapshot.favorites.is_empty() {
        render_row(&mut out, "❤️ Your Favorites →", &snapshot.favorites, snapshot);
    }

    let trending = &snapshot.games[..snapshot.games.len().min(TRENDING_ROW_LIMIT)];
    render_row(&mut out, "🔥 Trending Games →", trending, snapshot);

    for genre in &snapshot.top_genres {
        let title = format!("{} {} →", genre_icon(genre), genre);
        render_row(&mut out, &title, snapshot.group(genre), snapshot);
    }

    if snapshot.has_more {
        if snapshot.loading_more {
            out.push_str("Loading more games...\n");
        } else {
            out.push_str("See More (type `more`)\n");
        }
    }

    out
}
