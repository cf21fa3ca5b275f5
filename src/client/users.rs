//! `/admin/users` endpoints.

use reqwest::Method;

use super::{AdminClient, ClientError};
use crate::models::{ApiUser, Page, PageQuery, UserEnvelope, UsersListResponse};

impl AdminClient {
    pub(super) async fn fetch_users_page(&self, query: PageQuery) -> Result<Page<ApiUser>, ClientError> {
        let url = self.paged_url(&["admin", "users"], query);
        let path = url.path().to_string();
        let response: UsersListResponse = self.get(url).await?;

        Page {
            items: response.users,
            meta: response.meta,
        }
        .validate()
        .map_err(|reason| ClientError::decode(path, reason))
    }

    pub(super) async fn put_suspension(&self, user_id: &str) -> Result<ApiUser, ClientError> {
        if user_id.trim().is_empty() {
            return Err(ClientError::Validation("User id is required".to_string()));
        }

        let url = self.url(&["admin", "users", "suspension", user_id]);
        let envelope: UserEnvelope = self.send::<_, ()>(Method::PUT, url, None).await?;
        Ok(envelope.user)
    }
}
