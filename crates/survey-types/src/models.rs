/// A model the chat backend can be asked to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

pub const MODEL_OPTIONS: &[ModelOption] = &[
    ModelOption { value: "gpt-3.5-turbo", label: "GPT-3.5 Turbo (4K tokens)" },
    ModelOption { value: "gpt-3.5-turbo-16k", label: "GPT-3.5 Turbo (16K tokens)" },
    ModelOption { value: "gpt-4", label: "GPT-4 (8K tokens)" },
    ModelOption { value: "gpt-4-32k", label: "GPT-4 (32K tokens)" },
];

impl ModelOption {
    pub fn find(value: &str) -> Option<&'static ModelOption> {
        MODEL_OPTIONS.iter().find(|m| m.value == value)
    }
}
