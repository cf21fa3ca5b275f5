//! Reply links for support requests.
//!
//! The console does not send mail itself. A reply opens the operator's web
//! mail compose screen with the recipient, subject and a greeting filled in.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;

use crate::config::MailConfig;

lazy_static! {
    /// Loose address check: something@something.tld, no whitespace
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Placeholder in the body template replaced with the recipient's name
pub const NAME_PLACEHOLDER: &str = "{name}";

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email address cannot be empty".to_string());
    }
    if email.len() > 254 {
        return Err("Email address cannot exceed 254 characters".to_string());
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(format!("Invalid email address: {}", email));
    }
    Ok(())
}

/// Greeting and signature sent back to a requester
pub struct ReplyTemplate<'a> {
    pub name: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
}

impl<'a> ReplyTemplate<'a> {
    pub fn from_config(mail: &'a MailConfig, name: &'a str) -> Self {
        Self {
            name,
            subject: &mail.subject,
            body: &mail.body,
        }
    }

    pub fn render(&self) -> String {
        let name = self.name.trim();
        let name = if name.is_empty() { "there" } else { name };
        self.body.replace(NAME_PLACEHOLDER, name)
    }
}

/// Build the compose link for a reply to `to`.
pub fn compose_link(mail: &MailConfig, to: &str, name: &str) -> Result<Url, String> {
    let to = to.trim();
    validate_email(to)?;

    let mut url = Url::parse(&mail.compose_url)
        .map_err(|e| format!("Invalid compose URL '{}': {}", mail.compose_url, e))?;
    let template = ReplyTemplate::from_config(mail, name);
    url.query_pairs_mut()
        .clear()
        .append_pair("view", "cm")
        .append_pair("fs", "1")
        .append_pair("to", to)
        .append_pair("su", template.subject)
        .append_pair("body", &template.render());
    Ok(url)
}
