use console::measure_text_width;

/// Truncate `text` to at most `max_words` whitespace-separated words.
///
/// Returns the kept text and whether anything was dropped. Input within
/// the limit is returned unchanged, spacing included; truncated input is
/// rejoined with single spaces. Same input and limit always produce the
/// same output.
pub fn truncate_to_word_limit(text: &str, max_words: usize) -> (String, bool) {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        (text.to_string(), false)
    } else {
        (words[..max_words].join(" "), true)
    }
}

/// Wrap text into lines no wider than `max_width` display columns.
///
/// Existing line breaks are preserved; overlong lines break at the last
/// space that fits, or mid-word when there is none. Widths are measured
/// in terminal columns, so wide characters count for two.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut lines = Vec::new();

    for raw_line in text.split('\n') {
        let mut remaining = raw_line;
        loop {
            if measure_text_width(remaining) <= max_width {
                lines.push(remaining.to_string());
                break;
            }

            // Widest prefix that still fits, remembering the last space in it.
            let mut space_at = 0;
            let mut fit_end = 0;
            let mut width = 0;
            let mut buf = [0u8; 4];
            for (pos, ch) in remaining.char_indices() {
                let ch_width = measure_text_width(ch.encode_utf8(&mut buf));
                if width + ch_width > max_width && fit_end > 0 {
                    break;
                }
                if ch == ' ' {
                    space_at = pos;
                }
                width += ch_width;
                fit_end = pos + ch.len_utf8();
            }

            if space_at > 0 {
                lines.push(remaining[..space_at].to_string());
                remaining = remaining[space_at + 1..].trim_start();
            } else {
                lines.push(remaining[..fit_end].to_string());
                remaining = &remaining[fit_end..];
            }
        }
    }

    lines
}
