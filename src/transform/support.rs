//! Support request rows.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{avatar_color, display_name, initials, UserStatus};
use crate::models::{Page, SupportRequest};

const PREVIEW_CHARS: usize = 80;

/// A support request as the support view shows it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub initials: String,
    pub avatar_color: &'static str,
    pub requester_status: UserStatus,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

impl SupportRow {
    /// First line of the message, cut to a fixed width
    pub fn preview(&self) -> String {
        let first_line = self.message.lines().next().unwrap_or("").trim();
        if first_line.chars().count() > PREVIEW_CHARS {
            let cut: String = first_line.chars().take(PREVIEW_CHARS - 3).collect();
            format!("{}...", cut)
        } else if self.message.trim().lines().count() > 1 {
            format!("{} ...", first_line)
        } else {
            first_line.to_string()
        }
    }
}

/// Map a support request onto its display row.
///
/// Avatar colors come from the requester's user id, so a person has the same
/// color here as in the users view.
pub fn transform_support_request(request: &SupportRequest) -> SupportRow {
    let user = &request.user;
    let name = display_name(user.username.as_deref(), &user.email);

    SupportRow {
        id: request.id.clone(),
        user_id: user.id.clone(),
        initials: initials(&name),
        avatar_color: avatar_color(&user.id),
        name,
        email: user.email.clone(),
        avatar_url: user.profile_picture.clone().filter(|u| !u.trim().is_empty()),
        requester_status: UserStatus::from_suspended(user.is_suspended),
        message: request.message.clone(),
        submitted_at: request.created_at,
    }
}

pub fn transform_support_page(page: Page<SupportRequest>) -> Page<SupportRow> {
    page.map(|request| transform_support_request(&request))
}
