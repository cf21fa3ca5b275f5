//! User accounts and their subscriptions, as the backend returns them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{string_or_number, LooseNumber, PageMeta};

fn default_role() -> String {
    "user".to_string()
}

/// The subscription currently attached to a user, if any.
///
/// Minute counts and price may arrive as numbers or numeric strings. Billing
/// dates are kept as raw strings and parsed by the transformer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiSubscription {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<LooseNumber>,
    #[serde(default, alias = "totalMinutes")]
    pub total_minutes: Option<LooseNumber>,
    #[serde(default, alias = "availableMinutes")]
    pub available_minutes: Option<LooseNumber>,
    #[serde(default, alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(default, alias = "endDate")]
    pub end_date: Option<String>,
}

/// A user record from `/admin/users`.
///
/// Some backend versions put the minute counters directly on the user instead
/// of on the subscription; both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    #[serde(default, alias = "profilePicture")]
    pub profile_picture: Option<String>,
    #[serde(default, alias = "isSuspended")]
    pub is_suspended: bool,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "currentSubscription")]
    pub current_subscription: Option<ApiSubscription>,
    #[serde(default, alias = "totalMinutes")]
    pub total_minutes: Option<LooseNumber>,
    #[serde(default, alias = "availableMinutes")]
    pub available_minutes: Option<LooseNumber>,
}

/// Response of `GET /admin/users`
#[derive(Debug, Deserialize)]
pub struct UsersListResponse {
    pub users: Vec<ApiUser>,
    pub meta: PageMeta,
}

/// Response of `PUT /admin/users/suspension/:id`
#[derive(Debug, Deserialize)]
pub struct UserEnvelope {
    pub user: ApiUser,
}
