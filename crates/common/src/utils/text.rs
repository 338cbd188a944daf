//! Char-boundary safe windows over UTF-8 text.
//!
//! Detection spans carry byte offsets into the original input. Windows around
//! them are measured in characters so that multibyte input never produces a
//! slice that panics on a non-boundary index.

/// Moves `byte_idx` left by up to `chars` characters.
///
/// `byte_idx` must be a char boundary of `text`; the result always is.
pub fn expand_left(text: &str, mut byte_idx: usize, mut chars: usize) -> usize {
    while byte_idx > 0 && chars > 0 {
        if let Some((prev_idx, _)) = text[..byte_idx].char_indices().next_back() {
            byte_idx = prev_idx;
        } else {
            byte_idx = 0;
            break;
        }
        chars -= 1;
    }
    byte_idx
}

/// Moves `byte_idx` right by up to `chars` characters, clamped to `text.len()`.
pub fn expand_right(text: &str, mut byte_idx: usize, mut chars: usize) -> usize {
    let len = text.len();
    while byte_idx < len && chars > 0 {
        if let Some(ch) = text[byte_idx..].chars().next() {
            byte_idx = (byte_idx + ch.len_utf8()).min(len);
        } else {
            byte_idx = len;
            break;
        }
        chars -= 1;
    }
    byte_idx
}

/// Returns the substring spanning `chars` characters on each side of
/// `start..end`, clamped to the text bounds.
pub fn context_window(text: &str, start: usize, end: usize, chars: usize) -> &str {
    if start > end || end > text.len() || !text.is_char_boundary(start) || !text.is_char_boundary(end)
    {
        return "";
    }
    let window_start = expand_left(text, start, chars);
    let window_end = expand_right(text, end, chars);
    &text[window_start..window_end]
}

/// Returns up to `chars` characters immediately before `start`.
pub fn preceding_window(text: &str, start: usize, chars: usize) -> &str {
    if start > text.len() || !text.is_char_boundary(start) {
        return "";
    }
    &text[expand_left(text, start, chars)..start]
}
