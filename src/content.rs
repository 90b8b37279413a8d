use tracing::warn;

use crate::error::ApiError;
use crate::models::FileSet;

/// Best-effort denylist of obviously unsafe constructs. This is a screen,
/// not a sound sanitizer; its coverage is no security guarantee.
const DANGEROUS_KEYWORDS: &[&str] = &[
    "eval(",
    "exec(",
    "function(",
    "__import__",
    "subprocess",
    "<script>alert",
    "document.cookie",
    "window.location",
];

/// Rejects the whole FileSet on any match. Selective stripping of matched
/// substrings could silently corrupt otherwise-valid code, so no per-file
/// sanitization is attempted.
pub fn screen_file_set(files: &FileSet) -> Result<(), ApiError> {
    for (filename, content) in files {
        let lowered = content.to_lowercase();
        for keyword in DANGEROUS_KEYWORDS {
            if lowered.contains(keyword) {
                warn!("⚠️ Dangerous keyword '{keyword}' found in {filename}");
                return Err(ApiError::ContentSecurity(format!(
                    "keyword '{keyword}' in {filename}"
                )));
            }
        }
    }
    Ok(())
}
