//! Executes presenter effects against the admin API.
//!
//! A [`Session`] owns the API client and the per-resource caches. Presenters
//! stay pure; the `run_*` methods here feed them an action, perform whatever
//! effect comes back, and feed the outcome in until the presenter settles.

mod cache;

pub use cache::QueryCache;

use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

use crate::client::{AdminApi, ClientError};
use crate::models::{ApiUser, Page, PageQuery, Prompt, SupportRequest};
use crate::presenter::{
    ListAction, ListEffect, ListItem, ListState, PromptAction, PromptEditor, PromptEffect,
    RequestId,
};
use crate::transform::{
    transform_support_page, transform_user, transform_users, FrontendUser, SupportRow,
};

/// A row type a [`Session`] knows how to load and mutate
#[async_trait]
pub trait Resource: ListItem + Sized + Send + 'static {
    async fn fetch_page<A: AdminApi>(
        session: &mut Session<A>,
        query: PageQuery,
    ) -> Result<Page<Self>, ClientError>;

    async fn mutate<A: AdminApi>(
        session: &mut Session<A>,
        item_id: &str,
    ) -> Result<Self, ClientError>;

    /// Drop any cached copy of the page for `query`
    fn invalidate<A: AdminApi>(session: &mut Session<A>, query: PageQuery);
}

#[async_trait]
impl Resource for SupportRow {
    async fn fetch_page<A: AdminApi>(
        session: &mut Session<A>,
        query: PageQuery,
    ) -> Result<Page<Self>, ClientError> {
        session.support_page(query).await
    }

    async fn mutate<A: AdminApi>(
        _session: &mut Session<A>,
        _item_id: &str,
    ) -> Result<Self, ClientError> {
        Err(ClientError::Validation(
            "Support requests are read-only".to_string(),
        ))
    }

    fn invalidate<A: AdminApi>(session: &mut Session<A>, query: PageQuery) {
        session.support_cache.invalidate(&query);
    }
}

#[async_trait]
impl Resource for FrontendUser {
    async fn fetch_page<A: AdminApi>(
        session: &mut Session<A>,
        query: PageQuery,
    ) -> Result<Page<Self>, ClientError> {
        session.users_page(query).await
    }

    async fn mutate<A: AdminApi>(
        session: &mut Session<A>,
        item_id: &str,
    ) -> Result<Self, ClientError> {
        session.toggle_suspension(item_id).await
    }

    fn invalidate<A: AdminApi>(session: &mut Session<A>, query: PageQuery) {
        session.users_cache.invalidate(&query);
    }
}

pub struct Session<A> {
    api: A,
    prompt_cache: QueryCache<(), Option<Prompt>>,
    support_cache: QueryCache<PageQuery, Page<SupportRequest>>,
    users_cache: QueryCache<PageQuery, Page<ApiUser>>,
}

impl<A: AdminApi> Session<A> {
    pub fn new(api: A, cache_ttl: Duration) -> Self {
        Self {
            api,
            prompt_cache: QueryCache::new(cache_ttl),
            support_cache: QueryCache::new(cache_ttl),
            users_cache: QueryCache::new(cache_ttl),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// The current prompt, from cache when fresh
    pub async fn prompt(&mut self) -> Result<Option<Prompt>, ClientError> {
        if let Some(cached) = self.prompt_cache.get(&()) {
            return Ok(cached);
        }
        let prompt = self.api.get_prompt().await?;
        self.prompt_cache.insert((), prompt.clone());
        Ok(prompt)
    }

    pub async fn create_prompt(&mut self, text: &str) -> Result<Prompt, ClientError> {
        let prompt = self.api.create_prompt(text).await?;
        self.prompt_cache.invalidate(&());
        info!(prompt_id = %prompt.id, "prompt created");
        Ok(prompt)
    }

    pub async fn update_prompt(&mut self, text: &str) -> Result<Prompt, ClientError> {
        let prompt = self.api.update_prompt(text).await?;
        self.prompt_cache.invalidate(&());
        info!(prompt_id = %prompt.id, "prompt updated");
        Ok(prompt)
    }

    pub async fn support_page(&mut self, query: PageQuery) -> Result<Page<SupportRow>, ClientError> {
        let page = match self.support_cache.get(&query) {
            Some(page) => page,
            None => {
                let page = self.api.list_support_requests(query).await?;
                self.support_cache.insert(query, page.clone());
                page
            }
        };
        Ok(transform_support_page(page))
    }

    pub async fn users_page(&mut self, query: PageQuery) -> Result<Page<FrontendUser>, ClientError> {
        let page = match self.users_cache.get(&query) {
            Some(page) => page,
            None => {
                let page = self.api.list_users(query).await?;
                self.users_cache.insert(query, page.clone());
                page
            }
        };
        Ok(transform_users(page))
    }

    /// Flip a user's suspension. Every cached users page is dropped, since
    /// the user may appear on any of them.
    pub async fn toggle_suspension(&mut self, user_id: &str) -> Result<FrontendUser, ClientError> {
        let user = self.api.toggle_suspension(user_id).await?;
        self.users_cache.clear();
        let user = transform_user(&user);
        info!(user_id = %user.id, status = %user.status, "suspension toggled");
        Ok(user)
    }

    /// Drive the prompt editor until it has no effect left to run.
    pub async fn run_prompt(&mut self, editor: &mut PromptEditor, action: PromptAction) {
        let mut next = editor.update(action);
        while let Some(effect) = next.take() {
            let outcome = match effect {
                PromptEffect::Fetch { request } => match self.prompt().await {
                    Ok(prompt) => PromptAction::Loaded { request, prompt },
                    Err(e) => {
                        warn!(error = %e, "failed to load prompt");
                        PromptAction::LoadFailed {
                            request,
                            error: e.to_string(),
                        }
                    }
                },
                PromptEffect::Create { request, text } => {
                    save_outcome(request, self.create_prompt(&text).await)
                }
                PromptEffect::Update { request, text } => {
                    save_outcome(request, self.update_prompt(&text).await)
                }
            };
            next = editor.update(outcome);
        }
    }

    /// Drive a list presenter until it has no effect left to run.
    pub async fn run_list<T: Resource>(&mut self, state: &mut ListState<T>, action: ListAction<T>) {
        let mut next = state.update(action);
        while let Some(effect) = next.take() {
            let outcome = match effect {
                ListEffect::Fetch {
                    request,
                    query,
                    fresh,
                } => {
                    if fresh {
                        T::invalidate(self, query);
                    }
                    match T::fetch_page(self, query).await {
                        Ok(page) => ListAction::Loaded { request, page },
                        Err(e) => {
                            warn!(error = %e, page = query.page(), "failed to load page");
                            ListAction::Failed {
                                request,
                                error: e.to_string(),
                            }
                        }
                    }
                }
                ListEffect::Mutate { request, item_id } => {
                    let result = T::mutate(self, &item_id).await.map_err(|e| {
                        warn!(error = %e, item_id = %item_id, "mutation failed");
                        e.to_string()
                    });
                    ListAction::Mutated {
                        request,
                        item_id,
                        result,
                    }
                }
            };
            next = state.update(outcome);
        }
    }
}

fn save_outcome(request: RequestId, result: Result<Prompt, ClientError>) -> PromptAction {
    match result {
        Ok(prompt) => PromptAction::Saved { request, prompt },
        Err(e) => {
            warn!(error = %e, "failed to save prompt");
            PromptAction::SaveFailed {
                request,
                error: e.to_string(),
            }
        }
    }
}
