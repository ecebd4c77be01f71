use crate::infrastructure::games_url;
use axum::{
    body::Body,
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use reqwest::Client;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const TRENDING_PATH: &str = "/trending";
pub const INDEX_DOCUMENT: &str = "index.html";
pub const TRENDING_PAGE_SIZE: u32 = 20;
pub const PROXY_ERROR_BODY: &str = r#"{"error":"Failed to fetch from RAWG API"}"#;
const NOT_FOUND_BODY: &str = "<h1>404 - File Not Found</h1>";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub upstream_base: String,
    pub api_key: String,
    pub doc_root: PathBuf,
}

#[derive(Clone)]
struct GatewayState {
    client: Client,
    config: Arc<GatewayConfig>,
}

/// `GET /trending` is relayed upstream; every other request is a static file lookup.
pub fn router(client: Client, config: GatewayConfig) -> Router {
    let state = GatewayState {
        client,
        config: Arc::new(config),
    };

    Router::new()
        .route(TRENDING_PATH, get(trending_handler).fallback(static_handler))
        .fallback(static_handler)
        .with_state(state)
}

async fn trending_handler(
    State(state): State<GatewayState>,
    method: Method,
    uri: Uri,
) -> Response {
    // Only a bare GET is relayed. HEAD reaches this handler too, and anything
    // with a query string is a file lookup.
    if method != Method::GET || uri.query().is_some() {
        return serve_static(&state.config.doc_root, uri.path()).await;
    }
    proxy_trending(&state.client, &state.config).await
}

async fn static_handler(State(state): State<GatewayState>, uri: Uri) -> Response {
    serve_static(&state.config.doc_root, uri.path()).await
}

/// Issues the fixed trending query with the server-side key and streams the
/// upstream status and body back untouched.
pub async fn proxy_trending(client: &Client, config: &GatewayConfig) -> Response {
    let page_size = TRENDING_PAGE_SIZE.to_string();
    let upstream = client
        .get(games_url(&config.upstream_base))
        .query(&[
            ("key", config.api_key.as_str()),
            ("ordering", "-rating"),
            ("page_size", page_size.as_str()),
        ])
        .send()
        .await;

    match upstream {
        Ok(response) => {
            let status = response.status();
            info!("Relaying trending games, upstream status {}", status);
            (
                status,
                [
                    (header::CONTENT_TYPE, "application/json"),
                    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
                ],
                Body::from_stream(response.bytes_stream()),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to reach RAWG API: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [
                    (header::CONTENT_TYPE, "application/json"),
                    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
                ],
                PROXY_ERROR_BODY,
            )
                .into_response()
        }
    }
}

pub async fn serve_static(doc_root: &Path, request_path: &str) -> Response {
    let Some(path) = resolve_path(doc_root, request_path) else {
        warn!("Rejected path outside document root: {}", request_path);
        return not_found();
    };

    match tokio::fs::read(&path).await {
        Ok(content) => {
            debug!("Serving {}", path.display());
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, content_type(&path))],
                content,
            )
                .into_response()
        }
        Err(e) if e.kind() == ErrorKind::NotFound => not_found(),
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Server Error: {:?}", e.kind()),
            )
                .into_response()
        }
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/html")],
        NOT_FOUND_BODY,
    )
        .into_response()
}

/// Maps a request path under `doc_root`. Returns `None` for paths that try
/// to climb out of it.
pub fn resolve_path(doc_root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    let relative = if relative.is_empty() {
        INDEX_DOCUMENT
    } else {
        relative
    };

    let mut path = doc_root.to_path_buf();
    for segment in relative.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            segment => path.push(segment),
        }
    }
    Some(path)
}

pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("html") => "text/html",
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CatalogSource;
    use crate::infrastructure::RawgClient;
    use axum::extract::Query;
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::Mutex;
    use tokio::net::TcpListener;

    const UPSTREAM_BODY: &str =
        r#"{"count":1,"next":null,"results":[{"id":3328,"name":"The Witcher 3","rating":4.66, "ratings_count":6000,"genres":[{"name":"RPG"}]}]}"#;

    type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

    fn local_client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    async fn http_get(url: impl reqwest::IntoUrl) -> reqwest::Result<reqwest::Response> {
        local_client().get(url).send().await
    }

    async fn spawn(app: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        addr
    }

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
        let addr = spawn(app).await;
        (format!("http://{addr}/api"), seen)
    }

    async fn spawn_gateway(upstream_base: String, doc_root: &Path) -> String {
        let config = GatewayConfig {
            upstream_base,
            api_key: "secret-key".to_string(),
            doc_root: doc_root.to_path_buf(),
        };
        let addr = spawn(router(local_client(), config)).await;
        format!("http://{addr}")
    }

    fn doc_root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<div id=\"app\"></div>").unwrap();
        std::fs::write(dir.path().join("app.JS"), "console.log(1)").unwrap();
        std::fs::write(dir.path().join("data.bin"), [0u8, 159, 146, 150]).unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        dir
    }

    #[tokio::test]
    async fn trending_is_relayed_byte_identical_with_cors() {
        let (upstream, seen) = fake_rawg(StatusCode::OK, UPSTREAM_BODY).await;
        let root = doc_root();
        let gateway = spawn_gateway(upstream, root.path()).await;

        let response = http_get(format!("{gateway}/trending")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(response.text().await.unwrap(), UPSTREAM_BODY);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["key"], "secret-key");
        assert_eq!(seen[0]["ordering"], "-rating");
        assert_eq!(seen[0]["page_size"], "20");
    }

    #[tokio::test]
    async fn upstream_error_status_passes_through() {
        let body = r#"{"detail":"Invalid API key"}"#;
        let (upstream, _) = fake_rawg(StatusCode::UNAUTHORIZED, body).await;
        let root = doc_root();
        let gateway = spawn_gateway(upstream, root.path()).await;

        let response = http_get(format!("{gateway}/trending")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(response.text().await.unwrap(), body);
    }

    #[tokio::test]
    async fn unreachable_upstream_yields_fixed_error_body() {
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead = closed.local_addr().unwrap();
        drop(closed);

        let root = doc_root();
        let gateway = spawn_gateway(format!("http://{dead}/api"), root.path()).await;

        let response = http_get(format!("{gateway}/trending")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(response.text().await.unwrap(), PROXY_ERROR_BODY);
    }

    #[tokio::test]
    async fn each_proxy_request_goes_upstream() {
        let (upstream, seen) = fake_rawg(StatusCode::OK, UPSTREAM_BODY).await;
        let root = doc_root();
        let gateway = spawn_gateway(upstream, root.path()).await;

        let url = format!("{gateway}/trending");
        let (a, b) = tokio::join!(http_get(&url), http_get(&url));
        assert!(a.unwrap().status().is_success());
        assert!(b.unwrap().status().is_success());

        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn other_methods_and_queries_fall_through_to_files() {
        let (upstream, seen) = fake_rawg(StatusCode::OK, UPSTREAM_BODY).await;
        let root = doc_root();
        let gateway = spawn_gateway(upstream, root.path()).await;
        let client = local_client();

        let post = client
            .post(format!("{gateway}/trending"))
            .send()
            .await
            .unwrap();
        assert_eq!(post.status(), StatusCode::NOT_FOUND);

        let with_query = http_get(format!("{gateway}/trending?page=2"))
            .await
            .unwrap();
        assert_eq!(with_query.status(), StatusCode::NOT_FOUND);

        let head = client
            .head(format!("{gateway}/trending"))
            .send()
            .await
            .unwrap();
        assert_eq!(head.status(), StatusCode::NOT_FOUND);
        assert!(head.headers().get("access-control-allow-origin").is_none());

        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn static_files_use_extension_mime_types() {
        let (upstream, _) = fake_rawg(StatusCode::OK, UPSTREAM_BODY).await;
        let root = doc_root();
        let gateway = spawn_gateway(upstream, root.path()).await;

        let index = http_get(format!("{gateway}/")).await.unwrap();
        assert_eq!(index.status(), StatusCode::OK);
        assert_eq!(index.headers()["content-type"], "text/html");
        assert_eq!(index.text().await.unwrap(), "<div id=\"app\"></div>");

        let script = http_get(format!("{gateway}/app.JS")).await.unwrap();
        assert_eq!(script.headers()["content-type"], "text/javascript");

        let binary = http_get(format!("{gateway}/data.bin")).await.unwrap();
        assert_eq!(binary.headers()["content-type"], "application/octet-stream");
        assert_eq!(binary.bytes().await.unwrap().as_ref(), [0u8, 159, 146, 150]);
    }

    #[tokio::test]
    async fn missing_and_unreadable_files() {
        let (upstream, _) = fake_rawg(StatusCode::OK, UPSTREAM_BODY).await;
        let root = doc_root();
        let gateway = spawn_gateway(upstream, root.path()).await;

        let missing = http_get(format!("{gateway}/nope.css")).await.unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.headers()["content-type"], "text/html");
        assert_eq!(missing.text().await.unwrap(), NOT_FOUND_BODY);

        let directory = http_get(format!("{gateway}/assets")).await.unwrap();
        assert_eq!(directory.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(directory.text().await.unwrap().starts_with("Server Error: "));
    }

    #[tokio::test]
    async fn client_pages_through_gateway() {
        let (upstream, _) = fake_rawg(StatusCode::OK, UPSTREAM_BODY).await;
        let root = doc_root();
        let gateway = spawn_gateway(upstream, root.path()).await;

        let client = RawgClient::via_gateway(local_client(), gateway);
        let page = client.fetch_page(1).await.unwrap();

        assert!(!page.has_next());
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].name, "The Witcher 3");
        assert_eq!(page.results[0].ratings_count, 6000);
    }

    #[test]
    fn parent_segments_never_resolve() {
        let root = Path::new("/srv/www");
        assert_eq!(resolve_path(root, "/../etc/passwd"), None);
        assert_eq!(resolve_path(root, "/css/../../x"), None);
        assert_eq!(
            resolve_path(root, "/"),
            Some(PathBuf::from("/srv/www/index.html"))
        );
        assert_eq!(
            resolve_path(root, "/css//./style.css"),
            Some(PathBuf::from("/srv/www/css/style.css"))
        );
    }

    #[test]
    fn mime_table() {
        assert_eq!(content_type(Path::new("a.HTML")), "text/html");
        assert_eq!(content_type(Path::new("a.css")), "text/css");
        assert_eq!(content_type(Path::new("a.json")), "application/json");
        assert_eq!(content_type(Path::new("Makefile")), "application/octet-stream");
    }
}
