//! Network module for talking to the Connect REST backend.
//!
//! `ApiClient` implements the `UserDirectory` and `PostStore` ports over
//! HTTP/JSON. Every request carries `Content-Type: application/json`; only
//! `POST` requests carry a body.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::FeedConfig;
use crate::error::ApiError;
use crate::post::{NewPost, Post};
use crate::store::{PostStore, UserDirectory};
use crate::user::{Connection, User};

/// HTTP client for the backend, cheap to clone.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &FeedConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> Result<reqwest::Url, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        reqwest::Url::parse(&url).map_err(|e| ApiError::InvalidUrl {
            url,
            reason: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url_for(path)?;
        debug!(%url, "GET");

        let response = self.client.get(url).send().await?;
        decode_response(path, response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url_for(path)?;
        debug!(%url, "POST");

        let response = self.client.post(url).json(body).send().await?;
        decode_response(path, response).await
    }

    /// Decodes a JSON list where the body itself or any entry may be `null`.
    ///
    /// Entries are decoded one by one; an entry that does not fit `T` is
    /// logged and skipped.
    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let items: Option<Vec<serde_json::Value>> = self.get_json(path).await?;

        Ok(items
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter(|(_, item)| !item.is_null())
            .filter_map(|(index, item)| match serde_json::from_value(item) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!(path, index, error = %e, "skipping malformed list entry");
                    None
                }
            })
            .collect())
    }
}

async fn decode_response<T: DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|source| ApiError::Decode {
        path: path.to_string(),
        source,
    })
}

fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

#[async_trait]
impl UserDirectory for ApiClient {
    async fn fetch_user(&self, user_id: &str) -> Result<User, ApiError> {
        self.get_json(&format!("/users/{}", segment(user_id))).await
    }

    async fn fetch_followed(&self, user_id: &str) -> Result<Vec<Connection>, ApiError> {
        self.get_list(&format!("/followers/{}/followed", segment(user_id)))
            .await
    }
}

#[async_trait]
impl PostStore for ApiClient {
    async fn fetch_user_posts(&self, user_id: &str) -> Result<Vec<Post>, ApiError> {
        self.get_list(&format!("/posts/user/{}", segment(user_id)))
            .await
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        self.post_json("/posts", post).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_has_no_trailing_slash() {
        let config = FeedConfig {
            api_base_url: "http://localhost:8080/api/".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
    }

    #[tokio::test]
    async fn test_unparseable_base_url_is_invalid_url() {
        let config = FeedConfig {
            api_base_url: "not a url".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(&config).unwrap();

        let err = client.fetch_user("1").await.unwrap_err();

        assert!(matches!(err, ApiError::InvalidUrl { ref url, .. } if url == "not a url/users/1"));
    }

    #[test]
    fn test_path_segments_are_encoded() {
        assert_eq!(segment("42"), "42");
        assert_eq!(segment("a b/c"), "a%20b%2Fc");
    }
}
