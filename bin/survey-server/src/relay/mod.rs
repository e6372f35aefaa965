//! Upstream provider clients and the event-stream pass-through.
//!
//! Every call is stateless: a client holds only its configuration and a
//! shared connection pool.

pub mod huggingface;
pub mod openai;
pub mod passthrough;
pub mod sse;
