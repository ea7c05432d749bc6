//! Shared fixtures for tests that need a listing page over HTTP.

use axum::response::Html;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use url::Url;

/// A listing page with three story cards, the last missing its summary.
pub const LISTING_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Technology</title></head>
  <body>
    <section class="ex">
      <div class="dr"><h3 class="ai"><a href="https://medium.com/p/rust-async">Async Rust in Practice</a></h3></div>
      <div class="dw"><p><a href="https://medium.com/p/rust-async">What the runtime actually does</a></p></div>
    </section>
    <section class="ex">
      <div class="dr"><h3 class="ai"><a href="https://medium.com/p/sqlite">SQLite Everywhere</a></h3></div>
      <div class="dw"><p><a href="https://medium.com/p/sqlite">Small databases, big wins</a></p></div>
    </section>
    <section class="ex">
      <div class="dr"><h3 class="ai"><a href="https://medium.com/p/untitled">A Card Without a Summary</a></h3></div>
    </section>
  </body>
</html>
"#;

/// Number of story cards in [`LISTING_HTML`].
pub const LISTING_LEN: usize = 3;

/// Serve `app` on an ephemeral localhost port.
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Serve [`LISTING_HTML`] and return its URL.
pub async fn serve_listing() -> Url {
    let app = Router::new().route("/topic/technology", get(|| async { Html(LISTING_HTML) }));
    let addr = spawn(app).await;
    Url::parse(&format!("http://{addr}/topic/technology")).unwrap()
}

/// A URL on a localhost port that nothing is listening on.
pub async fn closed_port_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}/topic/technology")).unwrap()
}
