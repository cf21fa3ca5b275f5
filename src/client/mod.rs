//! Client for the assistant's admin REST API.
//!
//! [`AdminClient`] issues the HTTP calls and decodes responses into the typed
//! records in [`crate::models`]. Code that only needs the operations should
//! depend on the [`AdminApi`] trait instead, so it can run against a fake.

pub mod error;
mod prompt;
mod support;
mod users;

pub use error::{ClientError, ErrorClass};

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::models::{ApiUser, Page, PageQuery, Prompt, SupportRequest};

/// The operations the console performs against the backend
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Fetch the global prompt; `Ok(None)` means none has been created yet
    async fn get_prompt(&self) -> Result<Option<Prompt>, ClientError>;

    async fn create_prompt(&self, text: &str) -> Result<Prompt, ClientError>;

    async fn update_prompt(&self, text: &str) -> Result<Prompt, ClientError>;

    async fn list_support_requests(
        &self,
        query: PageQuery,
    ) -> Result<Page<SupportRequest>, ClientError>;

    async fn list_users(&self, query: PageQuery) -> Result<Page<ApiUser>, ClientError>;

    /// Flip a user's suspension flag and return the updated record
    async fn toggle_suspension(&self, user_id: &str) -> Result<ApiUser, ClientError>;
}

/// HTTP implementation of [`AdminApi`]
#[derive(Debug, Clone)]
pub struct AdminClient {
    base_url: Url,
    client: Client,
}

impl AdminClient {
    /// Create a client for `base_url`, optionally sending a bearer token.
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "base URL {} cannot carry a path",
                base_url
            )));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = token {
            let value = format!("Bearer {}", token)
                .parse()
                .map_err(|_| ClientError::Config("invalid token format".to_string()))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .user_agent(concat!("voxdash/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        Self::new(&config.base_url, config.token.as_deref(), config.timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve API path segments against the base URL, percent-encoding each.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Build a list URL carrying `page` and `limit` query parameters
    fn paged_url(&self, segments: &[&str], query: PageQuery) -> Url {
        let mut url = self.url(segments);
        url.query_pairs_mut()
            .append_pair("page", &query.page.to_string())
            .append_pair("limit", &query.limit.to_string());
        url
    }

    /// Send a request and return the raw body of a successful response.
    ///
    /// Non-2xx responses become [`ClientError::from_response`].
    async fn send_raw<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<String, ClientError> {
        let path = url.path().to_string();
        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(method = %method, path = %path, status = status.as_u16(), "admin API call");

        let text = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::from_response(status.as_u16(), &text));
        }
        Ok(text)
    }

    async fn send<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let path = url.path().to_string();
        let text = self.send_raw(method, url, body).await?;
        serde_json::from_str(&text).map_err(|e| ClientError::decode(path, e))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        self.send::<T, ()>(Method::GET, url, None).await
    }
}

#[async_trait]
impl AdminApi for AdminClient {
    async fn get_prompt(&self) -> Result<Option<Prompt>, ClientError> {
        self.fetch_prompt().await
    }

    async fn create_prompt(&self, text: &str) -> Result<Prompt, ClientError> {
        self.write_prompt(Method::POST, text).await
    }

    async fn update_prompt(&self, text: &str) -> Result<Prompt, ClientError> {
        self.write_prompt(Method::PUT, text).await
    }

    async fn list_support_requests(
        &self,
        query: PageQuery,
    ) -> Result<Page<SupportRequest>, ClientError> {
        self.fetch_support_page(query).await
    }

    async fn list_users(&self, query: PageQuery) -> Result<Page<ApiUser>, ClientError> {
        self.fetch_users_page(query).await
    }

    async fn toggle_suspension(&self, user_id: &str) -> Result<ApiUser, ClientError> {
        self.put_suspension(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> AdminClient {
        AdminClient::new(base, Some("t0ken"), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_joins_segments() {
        let c = client("https://api.example.com");
        assert_eq!(
            c.url(&["admin", "prompt"]).as_str(),
            "https://api.example.com/admin/prompt"
        );

        let c = client("https://api.example.com/v1/");
        assert_eq!(
            c.url(&["admin", "users"]).as_str(),
            "https://api.example.com/v1/admin/users"
        );
    }

    #[test]
    fn test_url_encodes_ids() {
        let c = client("http://localhost:3000");
        let url = c.url(&["admin", "users", "suspension", "a/b c"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/admin/users/suspension/a%2Fb%20c"
        );
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            AdminClient::new("not a url", None, Duration::from_secs(1)),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            AdminClient::new("mailto:ops@example.com", None, Duration::from_secs(1)),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            AdminClient::new("http://localhost", Some("bad\ntoken"), Duration::from_secs(1)),
            Err(ClientError::Config(_))
        ));
    }
}
