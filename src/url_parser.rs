//! Extraction of Drive folder ids from pasted links or raw ids.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{DriveError, Result};

/// Link shapes the Drive web UI hands out, each capturing the id in group 1.
static LINK_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Folders, including shared drive roots and `/u/<n>/` account switches.
        r"^https?://drive\.google\.com/drive/(?:u/\d+/)?folders/([a-zA-Z0-9_-]+)",
        // File and document viewers.
        r"^https?://(?:drive|docs)\.google\.com/(?:file|document|spreadsheets|presentation)/d/([a-zA-Z0-9_-]+)",
        // Legacy `open?id=` and `uc?id=` links, id possibly after other params.
        r"^https?://drive\.google\.com/(?:open|uc)\?(?:[^#]*&)?id=([a-zA-Z0-9_-]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid Drive link regex"))
    .collect()
});

/// Valid Drive id (alphanumeric, underscore, hyphen).
static ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid ID regex"));

/// Extract a Drive id from a link, or validate a raw id.
///
/// ```
/// use drive_tree::url_parser::extract_id;
///
/// let id = extract_id("https://drive.google.com/drive/u/1/folders/0AbCdEf").unwrap();
/// assert_eq!(id, "0AbCdEf");
///
/// assert_eq!(extract_id(" 0AbCdEf ").unwrap(), "0AbCdEf");
/// ```
pub fn extract_id(url_or_id: &str) -> Result<String> {
    let trimmed = url_or_id.trim();

    let from_link = LINK_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(trimmed)?.get(1));
    if let Some(id) = from_link {
        return Ok(id.as_str().to_string());
    }

    if ID_REGEX.is_match(trimmed) {
        return Ok(trimmed.to_string());
    }

    Err(DriveError::InvalidUrlOrId(url_or_id.to_string()))
}
