//! # connect-feed-lib-rs
//!
//! The home feed core of the Connect social client.
//!
//! ## Overview
//!
//! connect-feed-lib-rs gathers the posts of everyone a viewer follows from the Connect REST backend,
//! resolves their media to absolute URLs and keeps the view state of the home screen: the sorted feed,
//! the compose form and the reaction/comment affordances. The backend itself is an external service.
//!
//! ## Features
//!
//! - **Feed Aggregation**: Fetch followed users and their posts with bounded concurrency, filtered by status
//! - **Typed Failures**: A dead follow list fails the load; a single failing connection only drops its posts
//! - **Media Resolution**: Relative avatar and media references become CDN URLs
//! - **Post Composition**: Validate and submit text plus already-uploaded media
//! - **Cancellable Loads**: Feed loads are aborted when the view goes away
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use connect_feed_lib_rs::{config::FeedConfig, feed::FeedAggregator, network::ApiClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FeedConfig::from_env()?;
//!     let client = Arc::new(ApiClient::new(&config)?);
//!     let aggregator = FeedAggregator::new(Arc::clone(&client), client, &config);
//!
//!     let feed = aggregator.resolve_feed("42").await?.into_feed();
//!     for post in &feed.posts {
//!         println!("{}: {}", post.author().username(), post.summary(40));
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod feed;
pub mod interactions;
pub mod media;
pub mod network;
pub mod new_post;
pub mod post;
pub mod session;
pub mod store;
pub mod user;
pub mod util;
pub mod view;

#[cfg(test)]
pub(crate) mod test_utils;
