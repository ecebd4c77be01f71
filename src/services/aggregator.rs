use crate::domain::storage::Storage;
use crate::domain::{Catalog, CatalogSource, Cursor, Favorites, Game, GameId};
use crate::error::Result;
use crate::services::ranking::{
    compute_winner, filter_games, group_by_genre, top_genres, GenreGroups, TOP_GENRES,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub const FIRST_PAGE_ERROR: &str =
    "Failed to load games. Please check your API key or use the proxy server.";

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(String),
}

/// What happened to a `load_next_page` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Nothing requested: the first page is not loaded, a load is in flight,
    /// no more pages, or a search is active.
    Skipped,
    Appended(usize),
    Exhausted,
    Failed,
}

/// Immutable view of the dashboard handed to the presentation layer.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub status: LoadStatus,
    pub games: Vec<Game>,
    pub filtered: Vec<Game>,
    pub favorites: Vec<Game>,
    pub favorite_ids: Vec<GameId>,
    pub genre_groups: GenreGroups,
    pub top_genres: Vec<String>,
    pub winner: Option<GameId>,
    pub has_more: bool,
    pub loading_more: bool,
    pub search: String,
}

impl DashboardSnapshot {
    pub fn is_favorite(&self, id: GameId) -> bool {
        self.favorite_ids.contains(&id)
    }

    pub fn group(&self, genre: &str) -> &[Game] {
        self.genre_groups
            .iter()
            .find(|(name, _)| name == genre)
            .map(|(_, games)| games.as_slice())
            .unwrap_or_default()
    }
}

struct AggregatorState {
    catalog: Catalog,
    cursor: Cursor,
    favorites: Favorites,
    search: String,
    loading: bool,
    status: LoadStatus,
    winner: Option<GameId>,
}

impl AggregatorState {
    fn recompute_winner(&mut self) {
        self.winner = compute_winner(self.catalog.games()).map(|game| game.id);
    }

    fn favorites_view(&self) -> Vec<Game> {
        self.catalog
            .games()
            .iter()
            .filter(|game| self.favorites.contains(game.id))
            .cloned()
            .collect()
    }

    fn genre_groups(&self) -> GenreGroups {
        if self.search.is_empty() {
            group_by_genre(self.catalog.games())
        } else {
            GenreGroups::new()
        }
    }

    fn snapshot(&self) -> DashboardSnapshot {
        let genre_groups = self.genre_groups();
        DashboardSnapshot {
            status: self.status.clone(),
            games: self.catalog.games().to_vec(),
            filtered: filter_games(self.catalog.games(), &self.search),
            favorites: self.favorites_view(),
            favorite_ids: self.favorites.ids().to_vec(),
            top_genres: top_genres(&genre_groups, TOP_GENRES),
            genre_groups,
            winner: self.winner,
            has_more: self.cursor.has_more,
            loading_more: self.loading,
            search: self.search.clone(),
        }
    }
}

/// Owns the fetched catalog, the pagination cursor and the favorites set.
///
/// Every mutation publishes a fresh [`DashboardSnapshot`] to subscribers. The
/// state lock is never held across a fetch, so a second `load_next_page`
/// issued while one is pending observes the in-flight flag and returns.
pub struct Aggregator<S> {
    source: S,
    store: Arc<dyn Storage>,
    state: Mutex<AggregatorState>,
    snapshots: watch::Sender<Arc<DashboardSnapshot>>,
}

impl<S: CatalogSource> Aggregator<S> {
    pub fn new(source: S, store: Arc<dyn Storage + 'static>) -> Self {
        let favorites = match store.load_favorites() {
            Ok(ids) => Favorites::from_ids(ids.unwrap_or_default()),
            Err(e) => {
                warn!("Could not read saved favorites, starting empty: {}", e);
                Favorites::default()
            }
        };

        let state = AggregatorState {
            catalog: Catalog::new(),
            cursor: Cursor::default(),
            favorites,
            search: String::new(),
            loading: false,
            status: LoadStatus::Loading,
            winner: None,
        };
        let (snapshots, _) = watch::channel(Arc::new(state.snapshot()));

        Self {
            source,
            store,
            state: Mutex::new(state),
            snapshots,
        }
    }

    fn state(&self) -> MutexGuard<'_, AggregatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &AggregatorState) {
        self.snapshots.send_replace(Arc::new(state.snapshot()));
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardSnapshot>> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Replaces the catalog with page 1. A failure leaves the catalog empty and
    /// puts the dashboard into its terminal error state.
    pub async fn load_first_page(&self) -> Result<()> {
        {
            let mut state = self.state();
            state.loading = true;
            state.status = LoadStatus::Loading;
            self.publish(&state);
        }

        let fetched = self.source.fetch_page(1).await;

        let mut state = self.state();
        state.loading = false;
        match fetched {
            Ok(page) => {
                let has_next = page.has_next() && !page.results.is_empty();
                state.catalog.replace(page.results);
                state.cursor = Cursor {
                    current_page: 1,
                    has_more: has_next,
                };
                state.recompute_winner();
                state.status = LoadStatus::Ready;
                info!("Loaded {} games from page 1", state.catalog.len());
                self.publish(&state);
                Ok(())
            }
            Err(e) => {
                error!("Error fetching games: {}", e);
                state.catalog.replace(Vec::new());
                state.winner = None;
                state.status = LoadStatus::Failed(FIRST_PAGE_ERROR.to_string());
                self.publish(&state);
                Err(e)
            }
        }
    }

    /// Fetches the page after the cursor and appends unseen games. The page
    /// number only advances on success, so a failed page is refetched by the
    /// next call.
    pub async fn load_next_page(&self) -> PageOutcome {
        let next_page = {
            let mut state = self.state();
            // A failed first load is terminal; nothing loads before it either.
            if state.status != LoadStatus::Ready
                || state.loading
                || !state.cursor.has_more
                || !state.search.is_empty()
            {
                debug!("Skipping next page request");
                return PageOutcome::Skipped;
            }
            state.loading = true;
            self.publish(&state);
            state.cursor.current_page + 1
        };

        let fetched = self.source.fetch_page(next_page).await;

        let mut state = self.state();
        state.loading = false;
        let outcome = match fetched {
            Ok(page) if page.results.is_empty() => {
                info!("Page {next_page} was empty, no more games");
                state.cursor.has_more = false;
                PageOutcome::Exhausted
            }
            Ok(page) => {
                let has_next = page.has_next();
                let added = state.catalog.extend(page.results);
                state.cursor = Cursor {
                    current_page: next_page,
                    has_more: has_next,
                };
                state.recompute_winner();
                info!("Appended {added} new games from page {next_page}");
                PageOutcome::Appended(added)
            }
            Err(e) => {
                error!("Error loading more games: {}", e);
                PageOutcome::Failed
            }
        };
        self.publish(&state);
        outcome
    }

    /// Flips the favorite flag of `id`, persists the list and returns the new flag.
    pub fn toggle_favorite(&self, id: GameId) -> bool {
        let mut state = self.state();
        let now_favorite = state.favorites.toggle(id);
        if let Err(e) = self.store.save_favorites(state.favorites.ids()) {
            warn!("Failed to persist favorites: {}", e);
        }
        self.publish(&state);
        now_favorite
    }

    pub fn set_search(&self, text: impl Into<String>) {
        let mut state = self.state();
        state.search = text.into();
        self.publish(&state);
    }

    pub fn filtered_view(&self) -> Vec<Game> {
        let state = self.state();
        filter_games(state.catalog.games(), &state.search)
    }

    pub fn favorites_view(&self) -> Vec<Game> {
        self.state().favorites_view()
    }

    /// Empty while a search filter is active.
    pub fn grouped_by_genre(&self) -> GenreGroups {
        self.state().genre_groups()
    }

    pub fn winner(&self) -> Option<GameId> {
        self.state().winner
    }

    pub fn cursor(&self) -> Cursor {
        self.state().cursor
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn status(&self) -> LoadStatus {
        self.state().status.clone()
    }
}
