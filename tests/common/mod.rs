#![allow(dead_code)]

use axum::Router;
use gleaner::config::Config;
use gleaner::fetch::Fetcher;
use tokio::net::TcpListener;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn test_config() -> Config {
    Config {
        http_timeout: std::time::Duration::from_secs(5),
        ..Config::default()
    }
}

pub fn test_fetcher() -> Fetcher {
    Fetcher::new(&test_config()).unwrap()
}
