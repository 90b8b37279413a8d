use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ApiError;

/// Filename → content mapping produced by the backend.
pub type FileSet = BTreeMap<String, String>;

/// Free-form stylistic suggestions derived from a reference image.
pub type DesignHints = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerateRequest {
    pub company_name: String,
    pub description: String,
    #[serde(default)]
    pub theme_hint: Option<String>,
    #[serde(default)]
    pub pages: Option<Vec<String>>,
    #[serde(default)]
    pub require_dark_mode: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HealthResponse {
    pub status: String,
    pub ollama_connected: bool,
}

/// Strips characters that could break out of the prompt or generated markup.
pub fn sanitize_text(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | '&'))
        .collect()
}

/// Splits a comma-separated page list, dropping empty segments.
pub fn split_pages(raw: &str, max_pages: usize) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .take(max_pages)
        .map(str::to_string)
        .collect()
}

fn page_name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Letters, numbers, spaces, hyphens and underscores in any language.
    RE.get_or_init(|| Regex::new(r"^[\w\s-]+$").unwrap())
}

impl GenerateRequest {
    /// Applies the dangerous-character filter to every free-text field.
    pub fn sanitized(mut self) -> Self {
        self.company_name = sanitize_text(&self.company_name);
        self.description = sanitize_text(&self.description);
        self.theme_hint = self.theme_hint.map(|h| sanitize_text(&h));
        self
    }

    /// Bounds-checks all fields against the configured limits.
    pub fn validate(&self, config: &Config) -> Result<(), ApiError> {
        let name_len = self.company_name.chars().count();
        if name_len == 0 || name_len > 100 {
            return Err(ApiError::Validation(
                "company_name must be 1-100 characters".to_string(),
            ));
        }

        let description_len = self.description.chars().count();
        if description_len < 10 || description_len > config.max_description_length {
            return Err(ApiError::Validation(format!(
                "description must be 10-{} characters",
                config.max_description_length
            )));
        }

        if let Some(hint) = &self.theme_hint {
            if hint.chars().count() > 200 {
                return Err(ApiError::Validation(
                    "theme_hint must be at most 200 characters".to_string(),
                ));
            }
        }

        if let Some(pages) = &self.pages {
            if pages.len() > config.max_pages {
                return Err(ApiError::Validation(format!(
                    "Maximum {} pages allowed",
                    config.max_pages
                )));
            }
            for page in pages {
                if !page_name_pattern().is_match(page) {
                    return Err(ApiError::Validation(format!(
                        "Invalid page name: {page}. Only letters, numbers, spaces, hyphens and underscores allowed."
                    )));
                }
                if page.chars().count() > 50 {
                    return Err(ApiError::Validation(format!("Page name too long: {page}")));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(pages: Option<Vec<&str>>) -> GenerateRequest {
        GenerateRequest {
            company_name: "Acme".to_string(),
            description: "A bakery in town".to_string(),
            theme_hint: None,
            pages: pages.map(|p| p.iter().map(|s| s.to_string()).collect()),
            require_dark_mode: false,
        }
    }

    #[test]
    fn sanitize_strips_markup_characters() {
        assert_eq!(sanitize_text("Acme <Corp> & \"Sons\"'"), "Acme Corp  Sons");
        assert_eq!(sanitize_text("plain text"), "plain text");
    }

    #[test]
    fn sanitized_covers_all_free_text_fields() {
        let mut req = request(None);
        req.company_name = "<b>Acme</b>".to_string();
        req.description = "we sell \"everything\" & more!".to_string();
        req.theme_hint = Some("'dark'".to_string());
        let req = req.sanitized();
        assert_eq!(req.company_name, "bAcme/b");
        assert_eq!(req.description, "we sell everything  more!");
        assert_eq!(req.theme_hint.as_deref(), Some("dark"));
    }

    #[test]
    fn company_name_bounds() {
        let config = Config::default();
        let mut req = request(None);
        req.company_name = String::new();
        assert!(req.validate(&config).is_err());
        req.company_name = "x".repeat(101);
        assert!(req.validate(&config).is_err());
        req.company_name = "x".repeat(100);
        assert!(req.validate(&config).is_ok());
    }

    #[test]
    fn description_bounds() {
        let config = Config::default();
        let mut req = request(None);
        req.description = "too short".to_string();
        assert!(req.validate(&config).is_err());
        req.description = "x".repeat(config.max_description_length + 1);
        assert!(req.validate(&config).is_err());
        req.description = "a perfectly fine description".to_string();
        assert!(req.validate(&config).is_ok());
    }

    #[test]
    fn unicode_page_names_are_accepted() {
        let config = Config::default();
        let req = request(Some(vec!["about-us", "услуги", "关于我们", "page 2"]));
        assert!(req.validate(&config).is_ok());
    }

    #[test]
    fn punctuation_in_page_names_is_rejected() {
        let config = Config::default();
        for bad in ["about!", "../etc", "a/b", "page?", "nav;drop"] {
            let req = request(Some(vec![bad]));
            let err = req.validate(&config).unwrap_err();
            assert!(err.to_string().contains("Invalid page name"), "{bad}: {err}");
        }
    }

    #[test]
    fn page_name_length_cap() {
        let config = Config::default();
        let long = "a".repeat(51);
        let req = request(Some(vec![long.as_str()]));
        let err = req.validate(&config).unwrap_err();
        assert!(err.to_string().contains("Page name too long"));
    }

    #[test]
    fn page_count_cap() {
        let config = Config::default();
        let req = request(Some(vec!["a", "b", "c", "d", "e", "f"]));
        let err = req.validate(&config).unwrap_err();
        assert!(err.to_string().contains("Maximum 5 pages"));
    }

    #[test]
    fn split_pages_trims_and_caps() {
        assert_eq!(
            split_pages(" index , about ,, contact ", 5),
            vec!["index", "about", "contact"]
        );
        assert_eq!(split_pages("a,b,c", 2), vec!["a", "b"]);
    }
}
