//! Collapsible panel listing the datasets behind the latest reply.

use std::collections::BTreeSet;

use survey_types::{SourceData, SourceDataset};
use tracing::debug;

pub const PANEL_HEADER: &str = "Source Data";

/// Upper-case every alphanumeric that starts a word; underscores become
/// spaces. `"climate_survey"` becomes `"Climate Survey"`.
pub fn capitalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Section title for a dataset name.
pub fn dataset_title(name: &str) -> String {
    format!("{} Data", capitalize_name(name))
}

/// One dataset as shown in the panel.
#[derive(Debug, Clone)]
pub struct DatasetSection<'a> {
    pub name: &'a str,
    pub title: String,
    pub expanded: bool,
    dataset: &'a SourceDataset,
}

impl DatasetSection<'_> {
    pub fn marker(&self) -> char {
        if self.expanded { '-' } else { '+' }
    }

    pub fn heading(&self) -> String {
        format!("{} {}", self.marker(), self.title)
    }

    /// Body lines shown when expanded.
    pub fn body(&self) -> String {
        let mut out = format!("Top {} Columns:\n", self.dataset.columns.len());
        for column in &self.dataset.columns {
            out.push_str("  ");
            out.push_str(column);
            out.push('\n');
        }
        out.push_str("Data Samples:\n");
        // Map/Value serialisation cannot fail.
        let dump = serde_json::to_string_pretty(&self.dataset.rows).unwrap_or_default();
        out.push_str(&dump);
        out
    }

    pub fn render_text(&self) -> String {
        if self.expanded {
            format!("{}\n{}", self.heading(), self.body())
        } else {
            self.heading()
        }
    }
}

/// Expansion state for the datasets of one reply.
///
/// Every section starts collapsed. Replacing the data forgets all toggles.
#[derive(Debug, Clone, Default)]
pub struct SourceDataPanel {
    data: Option<SourceData>,
    expanded: BTreeSet<String>,
}

impl SourceDataPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> Option<&SourceData> {
        self.data.as_ref()
    }

    /// Show new data if it differs from what is shown; toggles reset.
    pub fn replace(&mut self, data: Option<&SourceData>) {
        if self.data.as_ref() == data {
            return;
        }
        self.data = data.cloned();
        self.expanded.clear();
    }

    /// Flip a section. Returns the new state, or `None` for an unknown name.
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        if !self.data.as_ref()?.contains_key(name) {
            return None;
        }
        let now_expanded = if self.expanded.remove(name) {
            false
        } else {
            self.expanded.insert(name.to_owned());
            true
        };
        debug!(dataset = name, expanded = now_expanded, "toggled source data section");
        Some(now_expanded)
    }

    pub fn is_expanded(&self, name: &str) -> bool {
        self.expanded.contains(name)
    }

    pub fn sections(&self) -> Vec<DatasetSection<'_>> {
        let Some(data) = &self.data else {
            return Vec::new();
        };
        data.iter()
            .map(|(name, dataset)| DatasetSection {
                name,
                title: dataset_title(name),
                expanded: self.is_expanded(name),
                dataset,
            })
            .collect()
    }

    /// Whole panel as text, or `None` when there is nothing to show.
    pub fn render_text(&self) -> Option<String> {
        let sections = self.sections();
        if sections.is_empty() {
            return None;
        }
        let mut out = String::from(PANEL_HEADER);
        for section in sections {
            out.push('\n');
            out.push_str(&section.render_text());
        }
        Some(out)
    }
}
