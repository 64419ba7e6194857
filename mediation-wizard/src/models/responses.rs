// API response models
// Shapes returned by the mediation backend (snake_case JSON).

use crate::i18n::Language;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub fr: String,
}

impl LocalizedText {
    /// Text in `language`, falling back to the other language when that one is empty.
    pub fn display(&self, language: Language) -> &str {
        let (preferred, fallback) = match language {
            Language::En => (&self.en, &self.fr),
            Language::Fr => (&self.fr, &self.en),
        };
        if preferred.trim().is_empty() {
            fallback
        } else {
            preferred
        }
    }
}

/// The organization application a request is addressed to.
///
/// When present, the wizard skips its "organization" step and attaches the request to this
/// application instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationApp {
    pub id: String,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub logo_alternative: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub text_color: String,
    #[serde(default)]
    pub button_background_color: String,
    #[serde(default)]
    pub border_color: String,
    #[serde(default)]
    pub button_hover_color: String,
    #[serde(default)]
    pub step_color: String,
    #[serde(default)]
    pub footer_color: String,
}

impl OrganizationApp {
    /// App with no display data, only what the wizard needs to address a request.
    pub fn new(id: &str, slug: &str) -> Self {
        Self {
            id: id.to_string(),
            name: LocalizedText::default(),
            slug: slug.to_string(),
            logo: String::new(),
            logo_alternative: LocalizedText::default(),
            description: LocalizedText::default(),
            text_color: String::new(),
            button_background_color: String::new(),
            border_color: String::new(),
            button_hover_color: String::new(),
            step_color: String::new(),
            footer_color: String::new(),
        }
    }
}

/// Outcome of a successful submission. The backend body is not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub status: u16,
    pub correlation_id: String,
}
