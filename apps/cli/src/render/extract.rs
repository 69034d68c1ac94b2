//! Document Extractor — pulls the first fenced code block with a given
//! language tag out of a larger Markdown document.

use regex::Regex;

use crate::errors::AppError;

/// Returns the trimmed inner text of the first fenced block tagged `lang`.
///
/// Additional fenced blocks with the same tag are ignored, not an error.
/// Fails with `BlockNotFound` when no block matches.
pub fn extract_fenced(document: &str, lang: &str) -> Result<String, AppError> {
    let pattern = format!(r"(?s)```{}[ \t]*\r?\n(.*?)```", regex::escape(lang));
    let re = Regex::new(&pattern).expect("fence pattern is valid");
    re.captures(document)
        .map(|captures| captures[1].trim().to_string())
        .ok_or_else(|| AppError::BlockNotFound(lang.to_string()))
}
