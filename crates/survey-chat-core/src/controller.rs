//! Chat submission and session reset.

use std::ops::{Deref, DerefMut};

use chrono::Utc;
use survey_types::{ChatMessage, ChatRequest, DEFAULT_MODEL};
use tracing::{debug, info, warn};

use crate::backend::{BackendError, ChatBackend};
use crate::transcript::TranscriptStore;

/// Banner shown when the backend answers 429.
pub const BUSY_MESSAGE: &str = "The server is busy. Please wait a moment and try again.";

/// Banner shown when a failed response carried no detail of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred while processing your request.";

/// What a call to [`ChatController::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input or a request already in flight: nothing changed.
    Ignored,
    /// An assistant reply was appended.
    Replied,
    /// The backend was busy; the busy banner is set.
    RateLimited,
    /// The backend rejected the request; the banner holds its message.
    Failed,
    /// No usable response arrived; only the log records it.
    Unreachable,
}

/// Drives one chat session against a [`ChatBackend`].
pub struct ChatController<B> {
    backend: B,
    store: TranscriptStore,
    model: String,
}

impl<B: ChatBackend> ChatController<B> {
    pub fn new(backend: B) -> Self {
        Self::with_model(backend, DEFAULT_MODEL)
    }

    pub fn with_model(backend: B, model: impl Into<String>) -> Self {
        Self {
            backend,
            store: TranscriptStore::default(),
            model: model.into(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.store.set_input(text);
    }

    /// Submit the current input.
    ///
    /// The user turn is appended before the backend is called, so a failed
    /// turn still shows what was asked. An assistant turn is appended only
    /// on success. Loading and input are cleared whatever the outcome,
    /// including when the returned future is dropped before it completes.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if !self.store.can_submit() {
            debug!(loading = self.store.is_loading, "submission ignored");
            return SubmitOutcome::Ignored;
        }

        let text = std::mem::take(&mut self.store.input);
        self.store.transcript.push(ChatMessage::user(text, Utc::now()));

        let request = ChatRequest {
            messages: self.store.transcript.messages().to_vec(),
            model: self.model.clone(),
        };

        let mut store = InFlight::begin(&mut self.store);
        match self.backend.send(&request).await {
            Ok(response) => {
                info!(
                    reply_len = response.reply.len(),
                    datasets = response.source_data.as_ref().map_or(0, |d| d.len()),
                    "reply received"
                );
                store
                    .transcript
                    .push(ChatMessage::assistant(response.reply, Utc::now()));
                store.source_data = response.source_data;
                SubmitOutcome::Replied
            }
            Err(BackendError::RateLimited) => {
                warn!("backend rate limited the request");
                store.error = Some(BUSY_MESSAGE.to_owned());
                SubmitOutcome::RateLimited
            }
            Err(BackendError::Status { status, detail }) => {
                warn!(%status, ?detail, "backend rejected the request");
                store.error = Some(detail.unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_owned()));
                SubmitOutcome::Failed
            }
            Err(e @ BackendError::Transport(_)) => {
                warn!(error = %e, "error fetching data");
                SubmitOutcome::Unreachable
            }
        }
    }

    /// Start over without contacting the backend.
    pub fn new_chat(&mut self) {
        self.store.reset(Utc::now());
        debug!("new chat started");
    }
}

/// Marks the store as loading for as long as it lives.
///
/// Dropping it clears the loading flag and the input, so a cancelled
/// submission never leaves the session stuck.
struct InFlight<'a> {
    store: &'a mut TranscriptStore,
}

impl<'a> InFlight<'a> {
    fn begin(store: &'a mut TranscriptStore) -> Self {
        store.is_loading = true;
        store.error = None;
        Self { store }
    }
}

impl Deref for InFlight<'_> {
    type Target = TranscriptStore;

    fn deref(&self) -> &TranscriptStore {
        self.store
    }
}

impl DerefMut for InFlight<'_> {
    fn deref_mut(&mut self) -> &mut TranscriptStore {
        self.store
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.store.is_loading = false;
        self.store.input.clear();
    }
}
