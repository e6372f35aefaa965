//! Shared data model for survey-chat.
//!
//! The chat types describe what travels between the front-end and the chat
//! backend (`POST /chat`); the analyze types describe the relay contract
//! (`POST /api/analyze`). Neither side holds any state beyond what is
//! declared here.

pub mod analyze;
pub mod chat;
pub mod models;
pub mod source_data;

pub use analyze::{
    AnalyzeRequest, AnalyzeResult, EMPTY_RESULT_MESSAGE, ErrorBody, INVALID_MODEL_MESSAGE, ModelSelector,
};
pub use chat::{ChatMessage, ChatRequest, ChatResponse, ErrorDetail, Role};
pub use models::{DEFAULT_MODEL, MODEL_OPTIONS, ModelOption};
pub use source_data::{DataRow, SourceData, SourceDataset};
