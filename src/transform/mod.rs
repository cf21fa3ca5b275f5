//! Pure mapping from wire records to display records.
//!
//! Nothing in here fails: missing or malformed fields fall back to documented
//! defaults so one bad record never takes down a whole page.

pub mod avatar;
pub mod support;
pub mod user;

pub use avatar::{avatar_color, initials, AVATAR_PALETTE};
pub use support::{transform_support_page, transform_support_request, SupportRow};
pub use user::{
    infer_plan_minutes, transform_user, transform_users, user_stats, FrontendUser,
    SubscriptionView, UserStats, UserStatus,
};

/// Name to show for an account: the username, else the local part of the e-mail
pub fn display_name(username: Option<&str>, email: &str) -> String {
    match username.map(str::trim).filter(|u| !u.is_empty()) {
        Some(name) => name.to_string(),
        None => email.split('@').next().unwrap_or(email).to_string(),
    }
}
