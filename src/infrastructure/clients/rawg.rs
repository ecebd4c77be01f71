use crate::domain::{CatalogSource, GamePage, PAGE_SIZE};
use crate::error::{DashError, Result};
use reqwest::Client;
use tracing::{debug, error};

/// Where pages come from: RAWG itself, or the relay gateway's fixed query.
#[derive(Debug, Clone)]
pub enum Endpoint {
    Direct { base_url: String, api_key: String },
    Gateway { base_url: String },
}

pub struct RawgClient {
    client: Client,
    endpoint: Endpoint,
}

impl RawgClient {
    pub fn new(client: Client, endpoint: Endpoint) -> Self {
        Self { client, endpoint }
    }

    pub fn direct(client: Client, base_url: impl Into<String>, api_key: String) -> Self {
        Self::new(
            client,
            Endpoint::Direct {
                base_url: base_url.into(),
                api_key,
            },
        )
    }

    pub fn via_gateway(client: Client, base_url: impl Into<String>) -> Self {
        Self::new(
            client,
            Endpoint::Gateway {
                base_url: base_url.into(),
            },
        )
    }

    pub async fn get_games_page(&self, page: u32) -> Result<GamePage> {
        let request = match &self.endpoint {
            Endpoint::Direct { base_url, api_key } => self
                .client
                .get(games_url(base_url))
                .query(&[
                    ("key", api_key.as_str()),
                    ("page", &page.to_string()),
                    ("page_size", &PAGE_SIZE.to_string()),
                ]),
            // The gateway serves one fixed query, so the page number is not forwarded.
            Endpoint::Gateway { base_url } => self
                .client
                .get(format!("{}/trending", base_url.trim_end_matches('/'))),
        };

        debug!("Requesting games page {page}");
        let response = request.send().await?;

        if !response.status().is_success() {
            error!("RAWG API error: Status {}", response.status());
            return Err(DashError::UpstreamStatus(response.status()));
        }

        Ok(response.json().await?)
    }
}

impl CatalogSource for RawgClient {
    async fn fetch_page(&self, page: u32) -> Result<GamePage> {
        self.get_games_page(page).await
    }
}

pub fn games_url(base_url: &str) -> String {
    format!("{}/games", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::get, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

    async fn fake_rawg(status: StatusCode, body: &'static str) -> (String, Seen) {
        let seen: Seen = Arc::default();
        let recorder = seen.clone();
        let app = Router::new().route(
            "/api/games",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let recorder = recorder.clone();
                async move {
                    recorder.lock().unwrap().push(params);
                    (status, body)
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{addr}/api/"), seen)
    }

    fn client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    #[tokio::test]
    async fn direct_requests_carry_key_page_and_size() {
        let (base, seen) = fake_rawg(
            StatusCode::OK,
            r#"{"next":"https://api.rawg.io/api/games?page=4","results":[{"id":1,"name":"Doom"}]}"#,
        )
        .await;
        let rawg = RawgClient::direct(client(), base, "abc123".to_string());

        let page = rawg.fetch_page(3).await.unwrap();

        assert!(page.has_next());
        assert_eq!(page.results[0].name, "Doom");
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0]["key"], "abc123");
        assert_eq!(seen[0]["page"], "3");
        assert_eq!(seen[0]["page_size"], "40");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base, _) = fake_rawg(StatusCode::NOT_FOUND, r#"{"detail":"Invalid page."}"#).await;
        let rawg = RawgClient::direct(client(), base, "abc123".to_string());

        match rawg.fetch_page(99).await {
            Err(DashError::UpstreamStatus(status)) => assert_eq!(status, StatusCode::NOT_FOUND),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn games_url_tolerates_trailing_slash() {
        assert_eq!(games_url("https://api.rawg.io/api/"), "https://api.rawg.io/api/games");
        assert_eq!(games_url("https://api.rawg.io/api"), "https://api.rawg.io/api/games");
    }
}
