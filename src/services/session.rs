use crate::domain::CatalogSource;
use crate::error::Result;
use crate::services::aggregator::{Aggregator, DashboardSnapshot, PageOutcome};
use crate::services::presenter::{render, UserCommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::{info, warn};

pub struct BrowseOptions {
    pub extra_pages: u32,
    pub search: Option<String>,
    pub interactive: bool,
}

/// Drives one dashboard session: the presenter only redraws published
/// snapshots and feeds user commands back into the aggregator.
pub struct BrowseSession<S, W> {
    aggregator: Aggregator<S>,
    updates: watch::Receiver<Arc<DashboardSnapshot>>,
    out: W,
}

impl<S: CatalogSource, W: AsyncWrite + Unpin> BrowseSession<S, W> {
    pub fn new(aggregator: Aggregator<S>, out: W) -> Self {
        let updates = aggregator.subscribe();
        Self {
            aggregator,
            updates,
            out,
        }
    }

    pub fn aggregator(&self) -> &Aggregator<S> {
        &self.aggregator
    }

    pub async fn run<R: AsyncBufRead + Unpin>(
        &mut self,
        options: BrowseOptions,
        input: R,
    ) -> Result<()> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Loading games...");
        spinner.enable_steady_tick(Duration::from_millis(120));

        let loaded = self.aggregator.load_first_page().await;
        spinner.finish_and_clear();

        if loaded.is_err() {
            // Terminal for this session: show the error and stop.
            self.redraw().await?;
            return Ok(());
        }

        for _ in 0..options.extra_pages {
            match self.aggregator.load_next_page().await {
                PageOutcome::Appended(_) => {}
                PageOutcome::Failed => {
                    warn!("Page load failed, stopping with what we have");
                    break;
                }
                PageOutcome::Exhausted | PageOutcome::Skipped => break,
            }
        }

        if let Some(search) = options.search {
            self.aggregator.set_search(search);
        }
        self.redraw().await?;

        if options.interactive {
            self.command_loop(input).await?;
        }

        Ok(())
    }

    async fn command_loop<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            match UserCommand::parse(&line) {
                Some(UserCommand::Quit) => break,
                Some(command) => self.apply(command).await,
                None => {
                    self.out
                        .write_all(b"Commands: more, search <text>, clear, fav <id>, quit\n")
                        .await?;
                }
            }
            self.redraw_if_changed().await?;
        }

        info!("Session ended");
        Ok(())
    }

    pub async fn apply(&mut self, command: UserCommand) {
        match command {
            UserCommand::More => {
                let outcome = self.aggregator.load_next_page().await;
                info!("Next page: {:?}", outcome);
            }
            UserCommand::Search(text) => self.aggregator.set_search(text),
            UserCommand::Clear => self.aggregator.set_search(""),
            UserCommand::Favorite(id) => {
                self.aggregator.toggle_favorite(id);
            }
            UserCommand::Quit => {}
        }
    }

    async fn redraw_if_changed(&mut self) -> Result<()> {
        if self.updates.has_changed().unwrap_or(false) {
            self.redraw().await?;
        }
        Ok(())
    }

    async fn redraw(&mut self) -> Result<()> {
        let snapshot = self.updates.borrow_and_update().clone();
        self.out.write_all(render(&snapshot).as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }
}
