use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::models::FileSet;

pub const HOME_PAGE: &str = "index.html";
pub const STYLES_FILE: &str = "styles.css";
pub const SCRIPT_FILE: &str = "script.js";

const FALLBACK_STYLES: &str =
    "/* Default styles */\n* { margin: 0; padding: 0; box-sizing: border-box; }";
const FALLBACK_SCRIPT: &str = "// Default script\nconsole.log('Website loaded');";

const PREVIEW_LIMIT: usize = 500;

/// Drops markdown code-fence markers. The output-format contract says "no
/// fencing", but the backend is free text and routinely ignores it.
pub fn strip_code_fences(content: &str) -> String {
    static OPEN: OnceLock<Regex> = OnceLock::new();
    static CLOSE: OnceLock<Regex> = OnceLock::new();
    let open = OPEN.get_or_init(|| Regex::new(r"(?m)^```(?:json)?[ \t]*\n?").unwrap());
    let close = CLOSE.get_or_init(|| Regex::new(r"\n?[ \t]*```\s*$").unwrap());

    let stripped = open.replace_all(content, "");
    close.replace_all(&stripped, "").trim().to_string()
}

/// Greedy first-`{`-to-last-`}` extraction, tolerating narrative text
/// around the JSON object.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn preview(content: &str) -> &str {
    if content.len() <= PREVIEW_LIMIT {
        return content;
    }
    let mut end = PREVIEW_LIMIT;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}

/// Injects minimal bodies for whichever support files the backend omitted.
/// Partial cooperation should not void an otherwise-usable website.
pub fn repair_file_set(files: &mut FileSet) {
    for (name, fallback) in [(STYLES_FILE, FALLBACK_STYLES), (SCRIPT_FILE, FALLBACK_SCRIPT)] {
        if !files.contains_key(name) {
            warn!("⚠️ Missing required file: {name}, adding default");
            files.insert(name.to_string(), fallback.to_string());
        }
    }
}

/// Turns raw backend text into a validated FileSet: fence stripping, greedy
/// JSON extraction, parse, repair, completeness enforcement. Parse failures
/// are not retried here; the caller owns retry policy.
pub fn parse_file_set(raw: &str) -> Result<FileSet, ApiError> {
    let stripped = strip_code_fences(raw);
    let span = extract_json_object(&stripped).unwrap_or(&stripped);

    let mut files: FileSet = serde_json::from_str(span).map_err(|e| {
        ApiError::Parse(format!("{e}; content preview: {}", preview(span)))
    })?;

    repair_file_set(&mut files);

    if !files.contains_key(HOME_PAGE) {
        return Err(ApiError::IncompleteOutput(
            "AI model did not generate index.html".to_string(),
        ));
    }
    if !files.keys().any(|k| k.ends_with(".html")) {
        return Err(ApiError::IncompleteOutput("No HTML files generated".to_string()));
    }

    info!(
        "Successfully parsed {} files: {:?}",
        files.len(),
        files.keys().collect::<Vec<_>>()
    );
    Ok(files)
}
