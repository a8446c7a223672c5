//! Demo loading a viewer's home feed from the configured backend.
//!
//! Run with `CONNECT_VIEWER_ID=<id> RUST_LOG=debug cargo run --example feed_demo`.

use std::sync::Arc;

use chrono::Utc;
use connect_feed_lib_rs::config::FeedConfig;
use connect_feed_lib_rs::feed::FeedAggregator;
use connect_feed_lib_rs::interactions::ReactionSummary;
use connect_feed_lib_rs::network::ApiClient;
use connect_feed_lib_rs::session::Session;
use connect_feed_lib_rs::view::HomeFeedView;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = FeedConfig::from_env()?;
    let client = Arc::new(ApiClient::new(&config)?);
    let aggregator = Arc::new(FeedAggregator::new(Arc::clone(&client), client, &config));

    let session = Session::new(std::env::var("CONNECT_VIEWER_ID").ok());
    let mut view = HomeFeedView::new(aggregator, session);

    view.refresh_avatar().await;
    view.reload().await;

    println!("=== Viewer ===");
    println!("Avatar: {}", view.avatar().url());

    println!("\n=== Notices ===");
    for notice in view.drain_notices() {
        println!("{:?}: {}", notice.level, notice.message);
    }

    println!("\n=== Feed ({} posts) ===", view.feed().len());
    let now = Utc::now();
    for post in view.posts() {
        println!("{}", post.format_for_display(now));
        let reactions = ReactionSummary::from_post(post);
        if !reactions.is_empty() {
            let line: Vec<String> = reactions
                .counts
                .iter()
                .map(|(emoji, count)| format!("{emoji} {count}"))
                .collect();
            println!("{}", line.join("  "));
        }
        println!();
    }

    Ok(())
}
