use std::borrow::Cow;

const TRUNCATED_MARKER: char = '…';

/// Shortens `text` to at most `max_chars` characters, ending with an ellipsis
/// when anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    if text.chars().count() <= max_chars {
        return Cow::Borrowed(text);
    }
    if max_chars == 0 {
        return Cow::Borrowed("");
    }
    let end = text
        .char_indices()
        .nth(max_chars - 1)
        .map_or(text.len(), |(idx, _)| idx);
    let mut truncated = text[..end].trim_end().to_string();
    truncated.push(TRUNCATED_MARKER);
    Cow::Owned(truncated)
}
