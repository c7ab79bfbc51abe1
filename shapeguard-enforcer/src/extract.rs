//! Pulls a JSON object out of free-form generator output.

const FENCE: &str = "```";

/// Extract the JSON object candidate from a response.
///
/// Surrounding whitespace is trimmed and a Markdown code fence (opening line
/// and closing marker) is removed. The candidate is the span from the first
/// `{` to the last `}`. Returns `None` when no such span exists.
pub fn extract_json_object(response: &str) -> Option<&str> {
    let mut cleaned = response.trim();
    if cleaned.is_empty() {
        return None;
    }

    if cleaned.starts_with(FENCE) {
        if let Some(newline) = cleaned.find('\n') {
            cleaned = &cleaned[newline + 1..];
        }
        if let Some(stripped) = cleaned.strip_suffix(FENCE) {
            cleaned = stripped;
        }
    }

    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }
    Some(cleaned[start..=end].trim())
}
