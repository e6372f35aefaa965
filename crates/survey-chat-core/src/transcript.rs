//! Session state for one chat window.

use chrono::{DateTime, Utc};
use survey_types::{ChatMessage, SourceData};

/// Opening assistant turn of every session.
pub const GREETING: &str = "Hello! I am your survey analysis assistant. How can I help you today?";

/// Ordered chat turns, oldest first.
///
/// Append-only: the only way to drop messages is to replace the whole
/// transcript with a fresh seeded one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// A transcript holding only the assistant greeting.
    pub fn seeded(at: DateTime<Utc>) -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING, at)],
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a ChatMessage;
    type IntoIter = std::slice::Iter<'a, ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// Everything the chat window shows besides layout: the transcript, the
/// pending input, the loading/error flags, and the latest source data.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    pub(crate) transcript: Transcript,
    pub(crate) input: String,
    pub(crate) is_loading: bool,
    pub(crate) error: Option<String>,
    pub(crate) source_data: Option<SourceData>,
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl TranscriptStore {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            transcript: Transcript::seeded(at),
            input: String::new(),
            is_loading: false,
            error: None,
            source_data: None,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Banner text of the last failed submission, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn source_data(&self) -> Option<&SourceData> {
        self.source_data.as_ref()
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_loading && !self.input.trim().is_empty()
    }

    /// Start a new session in one step: seeded transcript, no input, no
    /// error, no source data.
    pub fn reset(&mut self, at: DateTime<Utc>) {
        self.transcript = Transcript::seeded(at);
        self.input.clear();
        self.error = None;
        self.source_data = None;
    }
}
