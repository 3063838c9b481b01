/// Truncates a string to at most `max_bytes` while ensuring it's a valid UTF-8 sequence.
/// Adds an ellipsis if truncated.
pub fn truncate_utf8_with_ellipsis(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }

    let mut end = 0usize;
    for (i, ch) in s.char_indices() {
        let next = i + ch.len_utf8();
        if next <= max_bytes {
            end = next;
        } else {
            break;
        }
    }

    if end == 0 && !s.is_empty() {
        let first_end = s.chars().next().map(|c| c.len_utf8()).unwrap_or(0);
        end = std::cmp::min(first_end, s.len());
    }

    format!("{}...", &s[..end])
}

/// Character count as reported to users (Unicode scalar values, not bytes).
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// `None` for empty or whitespace-only input, otherwise the trimmed text.
pub fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|v| !v.is_empty())
}

/// Escape characters that would break a markdown link label.
pub fn escape_link_label(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('[', "\\[")
        .replace(']', "\\]")
}
