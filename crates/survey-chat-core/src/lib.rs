//! Front-end core of the survey chat assistant.
//!
//! - [`transcript`]: the in-memory session state (transcript, input, flags).
//! - [`backend`]: how a submission reaches the chat backend.
//! - [`controller`]: submission and "new chat" orchestration.
//! - [`render`]: presentation of messages and attached source data.

pub mod backend;
pub mod controller;
pub mod render;
pub mod transcript;

pub use backend::{BackendError, ChatBackend, HttpChatBackend};
pub use controller::{ChatController, SubmitOutcome};
pub use transcript::{Transcript, TranscriptStore};
