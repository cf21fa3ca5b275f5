//! Terminal rendering of presenter state.
//!
//! Every view is a borrowed wrapper implementing `Display`, so the CLI prints
//! it with `println!` and tests compare the rendered text directly. Avatar
//! badges are drawn in their palette color when `color` is set.

pub mod email;

pub use email::{compose_link, validate_email, ReplyTemplate};

use chrono::{DateTime, Utc};
use std::fmt::{self, Display, Formatter};
use std::io::IsTerminal;

use crate::presenter::{EditorMode, ListItem, ListState, LoadStatus, PageItem, PromptEditor};
use crate::transform::{user_stats, FrontendUser, SupportRow, UserStatus};

/// Whether stdout is a terminal that should get ANSI colors
pub fn stdout_supports_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Truncate a string to max characters with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Short calendar date, e.g. `Feb 1, 2024`
pub fn format_date(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => "-".to_string(),
    }
}

/// Minutes without a trailing `.0` for whole numbers
pub fn format_minutes(minutes: f64) -> String {
    if minutes.fract() == 0.0 {
        format!("{:.0}", minutes)
    } else {
        format!("{:.1}", minutes)
    }
}

pub fn format_price(price: f64) -> String {
    if price > 0.0 {
        format!("${:.2}", price)
    } else {
        "Free".to_string()
    }
}

/// Two-letter avatar badge, padded to a fixed width
fn avatar(initials: &str, hex: &str, color: bool) -> String {
    let badge = format!(" {:<2} ", initials);
    match (color, parse_hex(hex)) {
        (true, Some((r, g, b))) => {
            format!("\x1b[48;2;{};{};{}m\x1b[97m{}\x1b[0m", r, g, b, badge)
        }
        _ => badge,
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Status line shared by both list views. Returns true when rows should be
/// drawn underneath it.
fn write_list_status<T: ListItem>(
    f: &mut Formatter<'_>,
    state: &ListState<T>,
    noun: &str,
) -> Result<bool, fmt::Error> {
    match state.status() {
        LoadStatus::Idle => {
            writeln!(f, "Nothing loaded yet.")?;
            Ok(false)
        }
        LoadStatus::Loading if state.meta().is_none() => {
            writeln!(f, "Loading {}...", noun)?;
            Ok(false)
        }
        LoadStatus::Loading => {
            writeln!(f, "Loading page {}...", state.page())?;
            Ok(true)
        }
        LoadStatus::Errored => {
            writeln!(
                f,
                "[!!] Failed to load {}: {}",
                noun,
                state.error().unwrap_or("unknown error")
            )?;
            writeln!(f, "     Type 'r' to retry.")?;
            Ok(state.meta().is_some())
        }
        LoadStatus::Loaded => {
            if state.items().is_empty() {
                writeln!(f, "No {} found.", noun)?;
                return Ok(false);
            }
            if state.visible().is_empty() {
                writeln!(f, "No {} on this page match \"{}\".", noun, state.search())?;
                return Ok(false);
            }
            Ok(true)
        }
    }
}

fn write_list_footer<T: ListItem>(f: &mut Formatter<'_>, state: &ListState<T>) -> fmt::Result {
    let Some(meta) = state.meta() else {
        return Ok(());
    };
    writeln!(f)?;
    let shown = state.visible().len();
    if state.search().trim().is_empty() {
        writeln!(
            f,
            "Showing {} of {} total (page {} of {})",
            shown,
            meta.total,
            meta.current_page,
            meta.total_pages
        )?;
    } else {
        writeln!(
            f,
            "Showing {} matching \"{}\" on this page, {} total (page {} of {})",
            shown,
            state.search().trim(),
            meta.total,
            meta.current_page,
            meta.total_pages
        )?;
    }
    writeln!(f, "{}", PaginationBar::new(state))
}

/// Prev/next arrows around the windowed page numbers, e.g.
/// `< 1 ... 4 [5] 6 ... 10 >`. Disabled arrows are blanked out.
pub struct PaginationBar {
    items: Vec<PageItem>,
    current: u32,
    can_prev: bool,
    can_next: bool,
}

impl PaginationBar {
    pub fn new<T: ListItem>(state: &ListState<T>) -> Self {
        Self {
            items: state.page_window(),
            current: state.meta().map(|m| m.current_page).unwrap_or(0),
            can_prev: state.can_prev(),
            can_next: state.can_next(),
        }
    }
}

impl Display for PaginationBar {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return Ok(());
        }
        f.write_str(if self.can_prev { "<" } else { " " })?;
        for item in &self.items {
            match item {
                PageItem::Page(n) if *n == self.current => write!(f, " [{}]", n)?,
                PageItem::Page(n) => write!(f, " {}", n)?,
                PageItem::Ellipsis => f.write_str(" ...")?,
            }
        }
        f.write_str(if self.can_next { " >" } else { "  " })
    }
}

/// Table of support requests on the loaded page
pub struct SupportTable<'a> {
    state: &'a ListState<SupportRow>,
    color: bool,
}

impl<'a> SupportTable<'a> {
    pub fn new(state: &'a ListState<SupportRow>, color: bool) -> Self {
        Self { state, color }
    }
}

impl Display for SupportTable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !write_list_status(f, self.state, "support requests")? {
            return write_list_footer(f, self.state);
        }

        writeln!(
            f,
            "  {:<4}  {:<4}  {:<20}  {:<28}  {:<12}  {}",
            "#", "", "NAME", "EMAIL", "SUBMITTED", "MESSAGE"
        )?;
        writeln!(f, "{}", "-".repeat(120))?;
        for (index, row) in self.state.visible().into_iter().enumerate() {
            let marker = if index == self.state.scroll() { '>' } else { ' ' };
            let suspended = if row.requester_status == UserStatus::Suspended {
                " (suspended)"
            } else {
                ""
            };
            writeln!(
                f,
                "{} {:<4}  {}  {:<20}  {:<28}  {:<12}  {}",
                marker,
                index + 1,
                avatar(&row.initials, row.avatar_color, self.color),
                truncate(&format!("{}{}", row.name, suspended), 20),
                truncate(&row.email, 28),
                format_date(Some(&row.submitted_at)),
                truncate(&row.preview(), 40)
            )?;
        }
        write_list_footer(f, self.state)
    }
}

/// Full text of one support request
pub struct SupportDetail<'a> {
    row: &'a SupportRow,
    color: bool,
}

impl<'a> SupportDetail<'a> {
    pub fn new(row: &'a SupportRow, color: bool) -> Self {
        Self { row, color }
    }
}

impl Display for SupportDetail<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let row = self.row;
        writeln!(
            f,
            "{} {} <{}>",
            avatar(&row.initials, row.avatar_color, self.color),
            row.name,
            row.email
        )?;
        writeln!(f, "Request:   {}", row.id)?;
        writeln!(f, "User:      {} ({})", row.user_id, row.requester_status)?;
        writeln!(f, "Submitted: {}", row.submitted_at.format("%Y-%m-%d %H:%M UTC"))?;
        writeln!(f)?;
        for line in row.message.lines() {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}

/// Table of users on the loaded page, with a summary of what is shown
pub struct UsersTable<'a> {
    state: &'a ListState<FrontendUser>,
    color: bool,
}

impl<'a> UsersTable<'a> {
    pub fn new(state: &'a ListState<FrontendUser>, color: bool) -> Self {
        Self { state, color }
    }
}

impl Display for UsersTable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !write_list_status(f, self.state, "users")? {
            return write_list_footer(f, self.state);
        }

        let visible = self.state.visible();
        let stats = user_stats(visible.iter().copied());
        let plans: Vec<String> = stats
            .by_plan
            .iter()
            .map(|(plan, count)| format!("{} {}", count, plan))
            .collect();
        writeln!(
            f,
            "{} shown: {} active, {} suspended | {} | {} minutes used",
            stats.shown,
            stats.active,
            stats.suspended,
            plans.join(", "),
            format_minutes(stats.minutes_used)
        )?;
        writeln!(f)?;

        writeln!(
            f,
            "  {:<4}  {:<4}  {:<20}  {:<28}  {:<8}  {:<10}  {:<11}  {:<12}  {}",
            "#", "", "NAME", "EMAIL", "PLAN", "STATUS", "MINUTES", "JOINED", "ROLE"
        )?;
        writeln!(f, "{}", "-".repeat(120))?;
        for (index, user) in visible.into_iter().enumerate() {
            let marker = if index == self.state.scroll() { '>' } else { ' ' };
            let status = match self.state.mutation(&user.id) {
                Some(m) if m.is_pending() => "updating".to_string(),
                _ => user.status.to_string(),
            };
            writeln!(
                f,
                "{} {:<4}  {}  {:<20}  {:<28}  {:<8}  {:<10}  {:<11}  {:<12}  {}",
                marker,
                index + 1,
                avatar(&user.initials, user.avatar_color, self.color),
                truncate(&user.name, 20),
                truncate(&user.email, 28),
                truncate(&user.plan, 8),
                status,
                format!(
                    "{}/{}",
                    format_minutes(user.minutes_used),
                    format_minutes(user.minutes_total)
                ),
                format_date(user.joined_at.as_ref()),
                user.role
            )?;
            if let Some(error) = self.state.mutation(&user.id).and_then(|m| m.error()) {
                writeln!(f, "        [!!] {}", error)?;
            }
        }
        write_list_footer(f, self.state)
    }
}

/// Profile and subscription panel for one user
pub struct UserDetail<'a> {
    user: &'a FrontendUser,
    color: bool,
}

impl<'a> UserDetail<'a> {
    pub fn new(user: &'a FrontendUser, color: bool) -> Self {
        Self { user, color }
    }
}

impl Display for UserDetail<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let user = self.user;
        let sub = &user.subscription;
        writeln!(
            f,
            "{} {} <{}>",
            avatar(&user.initials, user.avatar_color, self.color),
            user.name,
            user.email
        )?;
        writeln!(f, "ID:          {}", user.id)?;
        writeln!(f, "Role:        {}", user.role)?;
        writeln!(f, "Status:      {}", user.status)?;
        writeln!(f, "Joined:      {}", format_date(user.joined_at.as_ref()))?;
        writeln!(f)?;
        writeln!(f, "Subscription:")?;
        writeln!(f, "  Plan:         {} ({})", sub.plan, format_price(sub.price))?;
        writeln!(
            f,
            "  Minutes:      {} used of {} ({} left)",
            format_minutes(sub.minutes_used),
            format_minutes(sub.minutes_total),
            format_minutes(user.minutes_remaining())
        )?;
        writeln!(f, "  Started:      {}", format_date(sub.started_at.as_ref()))?;
        writeln!(f, "  Next billing: {}", format_date(sub.next_billing_at.as_ref()))?;
        writeln!(
            f,
            "  Payment:      {}",
            sub.payment_method.as_deref().unwrap_or("-")
        )?;
        writeln!(
            f,
            "  Auto-renew:   {}",
            if sub.auto_renew { "Yes" } else { "No" }
        )
    }
}

/// The prompt card: the saved text, or the draft while editing
pub struct PromptCard<'a> {
    editor: &'a PromptEditor,
}

impl<'a> PromptCard<'a> {
    pub fn new(editor: &'a PromptEditor) -> Self {
        Self { editor }
    }
}

impl Display for PromptCard<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let editor = self.editor;
        match editor.status() {
            LoadStatus::Idle => return writeln!(f, "Prompt not loaded."),
            LoadStatus::Loading if editor.prompt().is_none() => {
                return writeln!(f, "Loading prompt...")
            }
            LoadStatus::Errored => {
                writeln!(
                    f,
                    "[!!] Failed to load prompt: {}",
                    editor.load_error().unwrap_or("unknown error")
                )?;
                return writeln!(f, "     Run the command again to retry.");
            }
            _ => {}
        }

        writeln!(f, "=== AI Prompt ===")?;
        writeln!(f)?;
        if editor.is_first_run() {
            writeln!(f, "No prompt has been set yet. The first save creates it.")?;
            writeln!(f)?;
        }
        if editor.mode() == EditorMode::Editing && editor.has_changes() {
            writeln!(f, "Draft (unsaved):")?;
        }
        for line in editor.buffer().lines() {
            writeln!(f, "  {}", line)?;
        }
        if let Some(prompt) = editor.prompt() {
            writeln!(f)?;
            writeln!(f, "ID:      {}", prompt.id)?;
            writeln!(f, "Updated: {}", prompt.updated_at.format("%Y-%m-%d %H:%M UTC"))?;
        }
        if editor.is_saving() {
            writeln!(f, "Saving...")?;
        }
        if let Some(error) = editor.validation_error().or(editor.save_error()) {
            writeln!(f, "[!!] {}", error)?;
        }
        Ok(())
    }
}
