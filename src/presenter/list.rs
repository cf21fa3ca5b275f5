//! Paged list presenter shared by the support and users views.
//!
//! Lifecycle: `Idle -> Loading -> Loaded | Errored`. The search box filters
//! the page that is already loaded and never issues requests; totals and page
//! numbers always come from the server's metadata.

use std::collections::HashMap;
use tracing::debug;

use super::{page_window, LoadStatus, Mutation, PageItem, RequestId, RequestSeq};
use crate::models::{Page, PageMeta, PageQuery};
use crate::transform::{FrontendUser, SupportRow};

/// What a list needs to know about its rows
pub trait ListItem {
    fn item_id(&self) -> &str;

    /// Fields the search box matches against
    fn search_fields(&self) -> Vec<&str>;
}

impl ListItem for SupportRow {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.message.as_str()]
    }
}

impl ListItem for FrontendUser {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.email.as_str(),
            self.plan.as_str(),
            self.status.as_str(),
            self.role.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListAction<T> {
    /// Fetch the current page (first load); may be answered from cache
    Load,
    /// Fetch the current page again from the server
    Refresh,
    /// Fetch the current page again after a failure
    Retry,
    Next,
    Prev,
    JumpTo(u32),
    Search(String),
    Scroll(usize),
    Loaded {
        request: RequestId,
        page: Page<T>,
    },
    Failed {
        request: RequestId,
        error: String,
    },
    /// Run the row's mutation (e.g. toggle suspension)
    Mutate {
        item_id: String,
    },
    Mutated {
        request: RequestId,
        item_id: String,
        result: Result<T, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEffect {
    /// Load a page. `fresh` asks for the server copy rather than a cached one.
    Fetch {
        request: RequestId,
        query: PageQuery,
        fresh: bool,
    },
    Mutate { request: RequestId, item_id: String },
}

#[derive(Debug)]
pub struct ListState<T> {
    status: LoadStatus,
    items: Vec<T>,
    meta: Option<PageMeta>,
    page: u32,
    limit: u32,
    search: String,
    scroll: usize,
    error: Option<String>,
    pending: Option<RequestId>,
    mutations: HashMap<String, Mutation>,
    seq: RequestSeq,
}

impl<T: ListItem> ListState<T> {
    pub fn new(query: PageQuery) -> Self {
        Self {
            status: LoadStatus::Idle,
            items: Vec::new(),
            meta: None,
            page: query.page,
            limit: query.limit,
            search: String::new(),
            scroll: 0,
            error: None,
            pending: None,
            mutations: HashMap::new(),
            seq: RequestSeq::default(),
        }
    }

    pub fn update(&mut self, action: ListAction<T>) -> Option<ListEffect> {
        match action {
            ListAction::Load => Some(self.fetch(self.page, false)),
            ListAction::Refresh => Some(self.fetch(self.page, true)),
            ListAction::Retry => {
                if self.status == LoadStatus::Errored {
                    Some(self.fetch(self.page, true))
                } else {
                    None
                }
            }
            ListAction::Next => {
                let meta = self.meta.filter(PageMeta::has_next)?;
                Some(self.fetch(meta.current_page + 1, false))
            }
            ListAction::Prev => {
                let meta = self.meta.filter(PageMeta::has_prev)?;
                Some(self.fetch(meta.current_page - 1, false))
            }
            ListAction::JumpTo(page) => self.can_jump(page).then(|| self.fetch(page, false)),
            ListAction::Search(text) => {
                self.search = text;
                self.scroll = 0;
                None
            }
            ListAction::Scroll(offset) => {
                self.scroll = offset.min(self.visible_len().saturating_sub(1));
                None
            }
            ListAction::Loaded { request, page } => {
                if !self.is_current(request) {
                    return None;
                }
                self.pending = None;
                self.status = LoadStatus::Loaded;
                self.error = None;
                self.page = page.meta.current_page.max(1);
                self.meta = Some(page.meta);
                self.items = page.items;
                self.scroll = 0;
                self.prune_mutations();
                None
            }
            ListAction::Failed { request, error } => {
                if !self.is_current(request) {
                    return None;
                }
                self.pending = None;
                self.status = LoadStatus::Errored;
                self.error = Some(error);
                None
            }
            ListAction::Mutate { item_id } => {
                if !self.items.iter().any(|item| item.item_id() == item_id) {
                    return None;
                }
                let request = self.seq.next();
                let mutation = self.mutations.entry(item_id.clone()).or_default();
                mutation
                    .begin(request)
                    .then_some(ListEffect::Mutate { request, item_id })
            }
            ListAction::Mutated {
                request,
                item_id,
                result,
            } => {
                let Some(mutation) = self.mutations.get_mut(&item_id) else {
                    return None;
                };
                let error = result.as_ref().err().cloned();
                if !mutation.settle(request, error) {
                    debug!(?request, item_id = %item_id, "ignoring stale mutation result");
                    return None;
                }
                let updated = result.ok()?;
                if let Some(slot) = self.items.iter_mut().find(|i| i.item_id() == item_id) {
                    *slot = updated;
                }
                // Re-read the page so it reflects the server's copy
                Some(self.fetch(self.page, true))
            }
        }
    }

    fn fetch(&mut self, page: u32, fresh: bool) -> ListEffect {
        let request = self.seq.next();
        self.pending = Some(request);
        self.status = LoadStatus::Loading;
        self.page = page;
        self.error = None;
        ListEffect::Fetch {
            request,
            query: PageQuery {
                page,
                limit: self.limit,
            },
            fresh,
        }
    }

    /// Forget settled mutations, keeping running ones and errors for rows
    /// still on screen
    fn prune_mutations(&mut self) {
        let items = &self.items;
        self.mutations.retain(|item_id, mutation| {
            let on_screen = items.iter().any(|i| i.item_id() == item_id.as_str());
            mutation.is_pending() || (mutation.error().is_some() && on_screen)
        });
    }

    fn is_current(&self, request: RequestId) -> bool {
        if self.pending == Some(request) {
            true
        } else {
            debug!(?request, pending = ?self.pending, "ignoring stale list response");
            false
        }
    }

    fn can_jump(&self, page: u32) -> bool {
        match self.meta {
            Some(meta) => page >= 1 && page <= meta.total_pages && page != meta.current_page,
            None => false,
        }
    }

    pub fn can_prev(&self) -> bool {
        self.meta.map(|m| m.has_prev()).unwrap_or(false)
    }

    pub fn can_next(&self) -> bool {
        self.meta.map(|m| m.has_next()).unwrap_or(false)
    }

    /// Items of the loaded page that match the search text
    pub fn visible(&self) -> Vec<&T> {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return self.items.iter().collect();
        }
        self.items
            .iter()
            .filter(|item| {
                item.search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    fn visible_len(&self) -> usize {
        self.visible().len()
    }

    pub fn page_window(&self) -> Vec<PageItem> {
        self.meta
            .map(|m| page_window(m.current_page, m.total_pages))
            .unwrap_or_default()
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn meta(&self) -> Option<&PageMeta> {
        self.meta.as_ref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn mutation(&self, item_id: &str) -> Option<&Mutation> {
        self.mutations.get(item_id)
    }
}
