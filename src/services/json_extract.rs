const FENCE: &str = "```";

/// Pulls the JSON candidate out of a model response.
///
/// When the text holds a ```` ``` ```` fenced block (optionally tagged `json`),
/// the trimmed interior of the first such block is returned. Otherwise the whole
/// text is returned trimmed. The result is not validated.
pub fn extract_json(text: &str) -> &str {
    if let Some(start) = text.find(FENCE) {
        let rest = &text[start + FENCE.len()..];
        let body = rest.strip_prefix("json").unwrap_or(rest);

        if let Some(end) = body.find(FENCE) {
            return body[..end].trim();
        }
    }

    text.trim()
}
