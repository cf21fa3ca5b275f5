//! Editor for the global prompt.
//!
//! Two modes, `Viewing` and `Editing`. The edit buffer is compared against the
//! last text loaded from the server to decide whether there is anything to
//! save. When no prompt exists yet the editor opens straight into `Editing`
//! and the first save creates it; every later save updates it.

use tracing::debug;

use super::{LoadStatus, Mutation, RequestId, RequestSeq};
use crate::models::Prompt;

/// Message shown when the operator tries to save blank text
pub const EMPTY_PROMPT_MESSAGE: &str = "Prompt cannot be empty";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Viewing,
    Editing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PromptAction {
    Load,
    /// `None` means the server has no prompt yet
    Loaded {
        request: RequestId,
        prompt: Option<Prompt>,
    },
    LoadFailed {
        request: RequestId,
        error: String,
    },
    Edit,
    Input(String),
    Cancel,
    Save,
    Saved {
        request: RequestId,
        prompt: Prompt,
    },
    SaveFailed {
        request: RequestId,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEffect {
    Fetch { request: RequestId },
    Create { request: RequestId, text: String },
    Update { request: RequestId, text: String },
}

#[derive(Debug)]
pub struct PromptEditor {
    status: LoadStatus,
    server: Option<Prompt>,
    mode: EditorMode,
    buffer: String,
    pending_load: Option<RequestId>,
    load_error: Option<String>,
    validation_error: Option<String>,
    save: Mutation,
    seq: RequestSeq,
}

impl Default for PromptEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptEditor {
    pub fn new() -> Self {
        Self {
            status: LoadStatus::Idle,
            server: None,
            mode: EditorMode::Viewing,
            buffer: String::new(),
            pending_load: None,
            load_error: None,
            validation_error: None,
            save: Mutation::default(),
            seq: RequestSeq::default(),
        }
    }

    pub fn update(&mut self, action: PromptAction) -> Option<PromptEffect> {
        match action {
            PromptAction::Load => Some(self.fetch()),
            PromptAction::Loaded { request, prompt } => {
                if self.pending_load != Some(request) {
                    debug!(?request, "ignoring stale prompt response");
                    return None;
                }
                // Keep an in-progress draft rather than overwrite it
                let keep_draft = self.mode == EditorMode::Editing && self.has_changes();

                self.pending_load = None;
                self.status = LoadStatus::Loaded;
                self.load_error = None;
                self.server = prompt;

                if !keep_draft {
                    self.reset_to_server();
                }
                None
            }
            PromptAction::LoadFailed { request, error } => {
                if self.pending_load != Some(request) {
                    debug!(?request, "ignoring stale prompt failure");
                    return None;
                }
                self.pending_load = None;
                self.status = LoadStatus::Errored;
                self.load_error = Some(error);
                None
            }
            PromptAction::Edit => {
                if self.status == LoadStatus::Loaded && self.mode == EditorMode::Viewing {
                    self.mode = EditorMode::Editing;
                    self.buffer = self.server_text().to_string();
                }
                None
            }
            PromptAction::Input(text) => {
                if self.mode == EditorMode::Editing && !self.save.is_pending() {
                    self.buffer = text;
                    self.validation_error = None;
                }
                None
            }
            PromptAction::Cancel => {
                if self.mode == EditorMode::Editing && !self.save.is_pending() {
                    self.validation_error = None;
                    self.save.clear_error();
                    self.reset_to_server();
                }
                None
            }
            PromptAction::Save => self.save(),
            PromptAction::Saved { request, prompt } => {
                if !self.save.settle(request, None) {
                    debug!(?request, "ignoring stale save result");
                    return None;
                }
                self.buffer = prompt.text.clone();
                self.server = Some(prompt);
                self.mode = EditorMode::Viewing;
                // The cached copy is stale now; read back the canonical one
                Some(self.fetch())
            }
            PromptAction::SaveFailed { request, error } => {
                if !self.save.settle(request, Some(error)) {
                    debug!(?request, "ignoring stale save failure");
                }
                None
            }
        }
    }

    fn fetch(&mut self) -> PromptEffect {
        let request = self.seq.next();
        self.pending_load = Some(request);
        if self.status != LoadStatus::Loaded {
            self.status = LoadStatus::Loading;
        }
        PromptEffect::Fetch { request }
    }

    fn save(&mut self) -> Option<PromptEffect> {
        if self.mode != EditorMode::Editing || self.save.is_pending() {
            return None;
        }

        let text = self.buffer.trim().to_string();
        if text.is_empty() {
            self.validation_error = Some(EMPTY_PROMPT_MESSAGE.to_string());
            return None;
        }
        self.validation_error = None;

        if self.is_unchanged() {
            self.mode = EditorMode::Viewing;
            return None;
        }

        let request = self.seq.next();
        if !self.save.begin(request) {
            return None;
        }
        Some(match &self.server {
            Some(_) => PromptEffect::Update { request, text },
            None => PromptEffect::Create { request, text },
        })
    }

    /// Drop the draft and show whatever the server last returned
    fn reset_to_server(&mut self) {
        self.buffer = self.server_text().to_string();
        self.mode = if self.server.is_some() {
            EditorMode::Viewing
        } else {
            EditorMode::Editing
        };
    }

    fn server_text(&self) -> &str {
        self.server.as_ref().map(|p| p.text.as_str()).unwrap_or("")
    }

    pub fn has_changes(&self) -> bool {
        self.buffer != self.server_text()
    }

    /// True when a prompt exists and the draft matches it exactly, in which
    /// case saving sends nothing
    pub fn is_unchanged(&self) -> bool {
        self.server.is_some() && !self.has_changes()
    }

    /// Whether the save control should be enabled
    pub fn can_save(&self) -> bool {
        self.mode == EditorMode::Editing && !self.save.is_pending()
    }

    pub fn is_saving(&self) -> bool {
        self.save.is_pending()
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.server.as_ref()
    }

    /// True once loaded and the server reported no prompt
    pub fn is_first_run(&self) -> bool {
        self.status == LoadStatus::Loaded && self.server.is_none()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    pub fn save_error(&self) -> Option<&str> {
        self.save.error()
    }
}
