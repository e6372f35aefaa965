//! Presentation of chat turns and source data.
//!
//! Views are plain data: a front-end decides how alignment or tone maps to
//! pixels or terminal colours. Each view also has a plain-text rendering
//! used by the terminal client.

pub mod message;
pub mod source_data;

pub use message::{
    Alignment, Avatar, BubbleTone, MessageView, TYPING_LABEL, format_time, format_time_in,
    submit_label, typing_placeholder,
};
pub use source_data::{DatasetSection, PANEL_HEADER, SourceDataPanel, capitalize_name, dataset_title};
