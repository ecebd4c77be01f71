use gamedash::config::cli::Command;
use gamedash::config::Config;
use gamedash::error::Result;
use gamedash::infrastructure::{FileSystemStore, RawgClient};
use gamedash::services::aggregator::Aggregator;
use gamedash::services::gateway::{self, GatewayConfig};
use gamedash::services::session::{BrowseOptions, BrowseSession};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::new()?;
    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .with_writer(std::io::stderr)
        .init();

    match &config.args.command {
        Command::Serve {
            port,
            doc_root,
            upstream,
        } => {
            let gateway_config = GatewayConfig {
                upstream_base: upstream.clone(),
                api_key: config.api_key()?,
                doc_root: doc_root.clone(),
            };
            let app = gateway::router(config.http_client.clone(), gateway_config);

            let addr = SocketAddr::from(([0, 0, 0, 0], *port));
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("Server running at http://localhost:{}/", port);
            info!("Open http://localhost:{}/index.html in your browser", port);
            axum::serve(listener, app).await?;
        }
        Command::Browse {
            gateway,
            upstream,
            pages,
            search,
            interactive,
        } => {
            config.ensure_directories()?;

            let source = match gateway {
                Some(url) => RawgClient::via_gateway(config.http_client.clone(), url.clone()),
                None => RawgClient::direct(
                    config.http_client.clone(),
                    upstream.clone(),
                    config.api_key()?,
                ),
            };
            let store = Arc::new(FileSystemStore::new(&config.args.data_dir));

            let mut session =
                BrowseSession::new(Aggregator::new(source, store), tokio::io::stdout());
            session
                .run(
                    BrowseOptions {
                        extra_pages: *pages,
                        search: search.clone(),
                        interactive: *interactive,
                    },
                    BufReader::new(tokio::io::stdin()),
                )
                .await?;
        }
    }

    Ok(())
}
