//! Support requests submitted by end users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{string_or_number, PageMeta};

/// The user who filed a support request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub is_suspended: bool,
    pub created_at: DateTime<Utc>,
}

/// A support request. Read-only from the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequest {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub message: String,
    pub user: SupportUser,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response of `GET /admin/support`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportListResponse {
    pub support_requests: Vec<SupportRequest>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_list_decoding() {
        let json = r#"{
            "supportRequests": [{
                "id": "s1",
                "message": "My minutes disappeared",
                "user": {
                    "id": "u1",
                    "username": "ada",
                    "email": "ada@example.com",
                    "profilePicture": null,
                    "isSuspended": false,
                    "createdAt": "2024-01-05T12:00:00Z"
                },
                "createdAt": "2024-02-01T09:00:00Z",
                "updatedAt": "2024-02-01T09:00:00Z"
            }],
            "meta": {"total": 1, "limit": 10, "totalPages": 1, "currentPage": 1}
        }"#;

        let response: SupportListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.support_requests.len(), 1);
        let request = &response.support_requests[0];
        assert_eq!(request.user.username.as_deref(), Some("ada"));
        assert!(request.user.profile_picture.is_none());
        assert_eq!(response.meta.total_pages, 1);
    }

    #[test]
    fn test_support_request_without_user_is_rejected() {
        let json = r#"{
            "id": "s1",
            "message": "hello",
            "createdAt": "2024-02-01T09:00:00Z",
            "updatedAt": "2024-02-01T09:00:00Z"
        }"#;
        assert!(serde_json::from_str::<SupportRequest>(json).is_err());
    }
}
