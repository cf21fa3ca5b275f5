//! Flattening of API users into the rows the users view shows.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::{avatar_color, display_name, initials};
use crate::models::{ApiSubscription, ApiUser, LooseNumber, Page};

/// Plan assumed when a user has no subscription
pub const FREE_PLAN: &str = "Free";

/// Placeholder card shown for paid plans; the API does not expose cards
pub const PLACEHOLDER_PAYMENT_METHOD: &str = "visa ****4242";

/// Minutes included in each known plan
const PLAN_MINUTES: [(&str, f64); 3] = [("Free", 2.0), ("Premium", 200.0), ("Super", 500.0)];

/// Minutes included in a plan, by name (case-insensitive)
pub fn infer_plan_minutes(plan: &str) -> Option<f64> {
    PLAN_MINUTES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(plan.trim()))
        .map(|(_, minutes)| *minutes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UserStatus {
    Active,
    Suspended,
}

impl UserStatus {
    pub fn from_suspended(is_suspended: bool) -> Self {
        if is_suspended {
            UserStatus::Suspended
        } else {
            UserStatus::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "Active",
            UserStatus::Suspended => "Suspended",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription details as shown in the user detail panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionView {
    pub plan: String,
    pub price: f64,
    pub minutes_total: f64,
    pub minutes_used: f64,
    pub started_at: Option<DateTime<Utc>>,
    pub next_billing_at: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub auto_renew: bool,
}

/// A user as the console displays it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontendUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub initials: String,
    pub avatar_color: &'static str,
    pub role: String,
    pub plan: String,
    pub plan_price: f64,
    pub status: UserStatus,
    pub minutes_used: f64,
    pub minutes_total: f64,
    pub joined_at: Option<DateTime<Utc>>,
    pub subscription: SubscriptionView,
}

impl FrontendUser {
    pub fn minutes_remaining(&self) -> f64 {
        (self.minutes_total - self.minutes_used).max(0.0)
    }
}

fn finite(value: Option<&LooseNumber>) -> Option<f64> {
    value.and_then(LooseNumber::as_finite)
}

/// Parse a billing date sent either as RFC 3339 or as a bare `YYYY-MM-DD`
fn parse_billing_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
        Err(_) => {
            debug!(value = raw, "ignoring unparseable billing date");
            None
        }
    }
}

/// Map an API user onto its display record.
///
/// Resolution order for the minute counters: the subscription's own fields,
/// then the user-level fields, then the plan table. `available` falls back to
/// `total`, so an account with no usage data shows zero minutes used.
pub fn transform_user(user: &ApiUser) -> FrontendUser {
    let empty = ApiSubscription::default();
    let sub = user.current_subscription.as_ref().unwrap_or(&empty);

    let plan = sub
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(FREE_PLAN)
        .to_string();

    let mut total = finite(sub.total_minutes.as_ref()).or(finite(user.total_minutes.as_ref()));
    let mut available =
        finite(sub.available_minutes.as_ref()).or(finite(user.available_minutes.as_ref()));

    if total.is_none() {
        total = infer_plan_minutes(&plan);
        if total.is_none() {
            debug!(user_id = %user.id, plan = %plan, "no minute total for unknown plan");
        }
    }
    if available.is_none() {
        available = total;
    }

    let minutes_total = total.unwrap_or(0.0);
    let minutes_used = (minutes_total - available.unwrap_or(minutes_total)).max(0.0);

    let status = UserStatus::from_suspended(user.is_suspended);
    let plan_price = finite(sub.price.as_ref()).unwrap_or(0.0).max(0.0);

    let started_at = parse_billing_date(sub.start_date.as_deref()).or(user.created_at);
    let next_billing_at = parse_billing_date(sub.end_date.as_deref()).or_else(|| {
        if plan_price > 0.0 {
            started_at.and_then(|start| start.checked_add_months(Months::new(1)))
        } else {
            None
        }
    });

    let name = display_name(user.username.as_deref(), &user.email);

    FrontendUser {
        id: user.id.clone(),
        initials: initials(&name),
        avatar_color: avatar_color(&user.id),
        name,
        email: user.email.clone(),
        avatar_url: user.profile_picture.clone().filter(|u| !u.trim().is_empty()),
        role: user.role.clone(),
        plan_price,
        status,
        minutes_used,
        minutes_total,
        joined_at: user.created_at,
        subscription: SubscriptionView {
            plan: plan.clone(),
            price: plan_price,
            minutes_total,
            minutes_used,
            started_at,
            next_billing_at,
            payment_method: (plan_price > 0.0).then(|| PLACEHOLDER_PAYMENT_METHOD.to_string()),
            auto_renew: !plan.eq_ignore_ascii_case(FREE_PLAN) && status == UserStatus::Active,
        },
        plan,
    }
}

/// Transform a whole page, keeping the server's metadata
pub fn transform_users(page: Page<ApiUser>) -> Page<FrontendUser> {
    page.map(|user| transform_user(&user))
}

/// Summary figures for the users currently on screen
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserStats {
    pub shown: usize,
    pub active: usize,
    pub suspended: usize,
    pub by_plan: BTreeMap<String, usize>,
    pub minutes_used: f64,
}

pub fn user_stats<'a>(users: impl IntoIterator<Item = &'a FrontendUser>) -> UserStats {
    users
        .into_iter()
        .fold(UserStats::default(), |mut stats, user| {
            stats.shown += 1;
            match user.status {
                UserStatus::Active => stats.active += 1,
                UserStatus::Suspended => stats.suspended += 1,
            }
            *stats.by_plan.entry(user.plan.clone()).or_default() += 1;
            stats.minutes_used += user.minutes_used;
            stats
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn api_user(id: &str) -> ApiUser {
        ApiUser {
            id: id.to_string(),
            username: Some("ada".to_string()),
            email: "ada@example.com".to_string(),
            profile_picture: None,
            is_suspended: false,
            role: "user".to_string(),
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()),
            updated_at: None,
            current_subscription: None,
            total_minutes: None,
            available_minutes: None,
        }
    }

    fn subscription(name: &str) -> ApiSubscription {
        ApiSubscription {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_user_without_subscription_is_free() {
        let user = transform_user(&api_user("u1"));
        assert_eq!(user.plan, "Free");
        assert_eq!(user.minutes_total, 2.0);
        assert_eq!(user.minutes_used, 0.0);
        assert_eq!(user.plan_price, 0.0);
        assert_eq!(user.status, UserStatus::Active);
        assert!(!user.subscription.auto_renew);
        assert!(user.subscription.payment_method.is_none());
        assert!(user.subscription.next_billing_at.is_none());
        assert_eq!(user.initials, "A");
    }

    #[test]
    fn test_lowercase_free_plan_never_auto_renews() {
        let mut api = api_user("u1");
        api.current_subscription = Some(subscription("free"));

        let user = transform_user(&api);
        assert_eq!(user.plan, "free");
        assert_eq!(user.minutes_total, 2.0);
        assert!(!user.subscription.auto_renew);
        assert!(user.subscription.next_billing_at.is_none());
    }

    #[test]
    fn test_minutes_from_subscription() {
        let mut api = api_user("u2");
        api.current_subscription = Some(ApiSubscription {
            total_minutes: Some(200.0.into()),
            available_minutes: Some("150".into()),
            ..subscription("Premium")
        });

        let user = transform_user(&api);
        assert_eq!(user.minutes_total, 200.0);
        assert_eq!(user.minutes_used, 50.0);
        assert_eq!(user.minutes_remaining(), 150.0);
    }

    #[test]
    fn test_subscription_minutes_win_over_flat_minutes() {
        let mut api = api_user("u3");
        api.total_minutes = Some(999.0.into());
        api.available_minutes = Some(1.0.into());
        api.current_subscription = Some(ApiSubscription {
            total_minutes: Some(500.0.into()),
            available_minutes: Some(480.0.into()),
            ..subscription("Super")
        });

        let user = transform_user(&api);
        assert_eq!(user.minutes_total, 500.0);
        assert_eq!(user.minutes_used, 20.0);
    }

    #[test]
    fn test_flat_minutes_used_when_subscription_has_none() {
        let mut api = api_user("u4");
        api.total_minutes = Some("300".into());
        api.available_minutes = Some(100.0.into());
        api.current_subscription = Some(subscription("Premium"));

        let user = transform_user(&api);
        assert_eq!(user.minutes_total, 300.0);
        assert_eq!(user.minutes_used, 200.0);
    }

    #[test]
    fn test_plan_inference_when_totals_missing() {
        let mut api = api_user("u5");
        api.current_subscription = Some(ApiSubscription {
            available_minutes: Some(150.0.into()),
            ..subscription("Premium")
        });

        let user = transform_user(&api);
        assert_eq!(user.minutes_total, 200.0);
        assert_eq!(user.minutes_used, 50.0);
    }

    #[test]
    fn test_unknown_plan_has_no_total() {
        assert_eq!(infer_plan_minutes("Enterprise"), None);

        let mut api = api_user("u6");
        api.current_subscription = Some(subscription("Enterprise"));
        let user = transform_user(&api);
        assert_eq!(user.plan, "Enterprise");
        assert_eq!(user.minutes_total, 0.0);
        assert_eq!(user.minutes_used, 0.0);
    }

    #[test]
    fn test_malformed_minutes_fall_back() {
        let mut api = api_user("u7");
        api.current_subscription = Some(ApiSubscription {
            total_minutes: Some("lots".into()),
            available_minutes: Some(LooseNumber::Other(serde_json::json!({"x": 1}))),
            ..subscription("Super")
        });

        let user = transform_user(&api);
        assert_eq!(user.minutes_total, 500.0);
        assert_eq!(user.minutes_used, 0.0);
    }

    #[test]
    fn test_minutes_used_never_negative() {
        let totals: [Option<LooseNumber>; 5] = [
            None,
            Some(0.0.into()),
            Some(10.0.into()),
            Some("abc".into()),
            Some(f64::NAN.into()),
        ];
        let availables: [Option<LooseNumber>; 5] = [
            None,
            Some(0.0.into()),
            Some(50.0.into()),
            Some("7".into()),
            Some(f64::INFINITY.into()),
        ];
        let plans = [None, Some("Free"), Some("Premium"), Some("Mystery")];

        for total in &totals {
            for available in &availables {
                for plan in &plans {
                    let mut api = api_user("grid");
                    api.current_subscription = plan.map(|p| ApiSubscription {
                        total_minutes: total.clone(),
                        available_minutes: available.clone(),
                        ..subscription(p)
                    });
                    let user = transform_user(&api);

                    let expected_total = total
                        .as_ref()
                        .and_then(LooseNumber::as_finite)
                        .or_else(|| infer_plan_minutes(plan.unwrap_or("Free")));
                    let expected_available = available
                        .as_ref()
                        .and_then(LooseNumber::as_finite)
                        .or(expected_total);
                    let expected_used = (expected_total.unwrap_or(0.0)
                        - expected_available.unwrap_or(0.0))
                    .max(0.0);

                    if plan.is_some() {
                        assert_eq!(user.minutes_used, expected_used);
                    }
                    assert!(user.minutes_used >= 0.0);
                    assert!(user.minutes_used.is_finite());
                }
            }
        }
    }

    #[test]
    fn test_suspended_user() {
        let mut api = api_user("u8");
        api.is_suspended = true;
        api.current_subscription = Some(ApiSubscription {
            price: Some(9.99.into()),
            ..subscription("Premium")
        });

        let user = transform_user(&api);
        assert_eq!(user.status, UserStatus::Suspended);
        assert_eq!(user.status.to_string(), "Suspended");
        assert!(!user.subscription.auto_renew);
        assert_eq!(
            user.subscription.payment_method.as_deref(),
            Some(PLACEHOLDER_PAYMENT_METHOD)
        );
    }

    #[test]
    fn test_paid_subscription_billing_dates() {
        let mut api = api_user("u9");
        api.current_subscription = Some(ApiSubscription {
            price: Some("19.00".into()),
            start_date: Some("2024-03-10".to_string()),
            ..subscription("Super")
        });

        let user = transform_user(&api);
        assert_eq!(user.plan_price, 19.0);
        assert!(user.subscription.auto_renew);
        assert_eq!(
            user.subscription.started_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap())
        );
        assert_eq!(
            user.subscription.next_billing_at,
            Some(Utc.with_ymd_and_hms(2024, 4, 10, 0, 0, 0).unwrap())
        );

        api.current_subscription = Some(ApiSubscription {
            price: Some(19.0.into()),
            start_date: Some("garbage".to_string()),
            end_date: Some("2024-05-01T12:00:00Z".to_string()),
            ..subscription("Super")
        });
        let user = transform_user(&api);
        assert_eq!(user.subscription.started_at, api.created_at);
        assert_eq!(
            user.subscription.next_billing_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_avatar_matches_support_view() {
        let user = transform_user(&api_user("65f0c2a9"));
        assert_eq!(user.avatar_color, avatar_color("65f0c2a9"));
    }

    #[test]
    fn test_user_stats() {
        let mut suspended = api_user("b");
        suspended.is_suspended = true;
        let mut premium = api_user("c");
        premium.current_subscription = Some(ApiSubscription {
            total_minutes: Some(200.0.into()),
            available_minutes: Some(170.0.into()),
            ..subscription("Premium")
        });

        let users: Vec<FrontendUser> = [api_user("a"), suspended, premium]
            .iter()
            .map(transform_user)
            .collect();
        let stats = user_stats(&users);

        assert_eq!(stats.shown, 3);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.suspended, 1);
        assert_eq!(stats.by_plan.get("Free"), Some(&2));
        assert_eq!(stats.by_plan.get("Premium"), Some(&1));
        assert_eq!(stats.minutes_used, 30.0);
    }
}
