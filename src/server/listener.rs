use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::site::{Clock, FileSource, Site};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Binds the configured address and serves the configured site forever.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!("Listening on {}", cfg.server.listen_addr);

    let site = Arc::new(Site::from_config(&cfg.static_files));
    serve(listener, site, cfg.server.max_connections).await
}

/// Accept loop. At most `max_connections` connections are handled at once;
/// each runs on its own task from accept to close.
pub async fn serve<F, C>(
    listener: TcpListener,
    site: Arc<Site<F, C>>,
    max_connections: usize,
) -> anyhow::Result<()>
where
    F: FileSource + 'static,
    C: Clock + 'static,
{
    let slots = Arc::new(Semaphore::new(max_connections));

    loop {
        let permit = slots.clone().acquire_owned().await?;

        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let site = site.clone();
        tokio::spawn(async move {
            let _permit = permit;
            let mut conn = Connection::new(socket, site);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {:#}", peer, e);
            }
        });
    }
}
