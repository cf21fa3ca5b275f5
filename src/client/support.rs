//! `/admin/support` endpoints.

use super::{AdminClient, ClientError};
use crate::models::{Page, PageQuery, SupportListResponse, SupportRequest};

impl AdminClient {
    pub(super) async fn fetch_support_page(
        &self,
        query: PageQuery,
    ) -> Result<Page<SupportRequest>, ClientError> {
        let url = self.paged_url(&["admin", "support"], query);
        let path = url.path().to_string();
        let response: SupportListResponse = self.get(url).await?;

        Page {
            items: response.support_requests,
            meta: response.meta,
        }
        .validate()
        .map_err(|reason| ClientError::decode(path, reason))
    }
}
