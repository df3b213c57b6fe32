//! Tag extraction over freeform node text.
//!
//! A line starting with `#` is a whole-line tag and leaves the displayed
//! text; a bare `#` line is dropped without producing an empty tag.
//! Otherwise the first `#name` or `#name:value` inside a line is cut out as
//! an inline tag, and whatever text remains is kept trimmed.

/// Display text and tags extracted from one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedText {
    pub text: String,
    pub tags: Vec<String>,
}

/// Split raw node text into display text and tags, in file order.
pub fn extract_tags(raw: &str) -> TaggedText {
    let mut lines = Vec::new();
    let mut tags = Vec::new();

    for line in raw.split('\n') {
        let trimmed = line.trim();
        if let Some(tag) = trimmed.strip_prefix('#') {
            let tag = tag.trim();
            if !tag.is_empty() {
                tags.push(tag.to_string());
            }
            continue;
        }

        match find_inline_tag(line) {
            Some((start, end)) => {
                tags.push(normalize_inline(&line[start..end]));
                let remaining = format!("{}{}", &line[..start], &line[end..]);
                let remaining = remaining.trim();
                if !remaining.is_empty() {
                    lines.push(remaining.to_string());
                }
            }
            None => lines.push(line.to_string()),
        }
    }

    TaggedText {
        text: lines.join("\n").trim().to_string(),
        tags,
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte span of the first `#\s*word(:word)?` in a line.
fn find_inline_tag(line: &str) -> Option<(usize, usize)> {
    let bytes = line.as_bytes();

    for (start, _) in line.match_indices('#') {
        let mut pos = start + 1;
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        let name_start = pos;
        while pos < bytes.len() && is_word_byte(bytes[pos]) {
            pos += 1;
        }
        if pos == name_start {
            continue;
        }

        // Optional `:value`, only taken when a value follows.
        if pos < bytes.len() && bytes[pos] == b':' {
            let value_start = pos + 1;
            let mut value_end = value_start;
            while value_end < bytes.len() && is_word_byte(bytes[value_end]) {
                value_end += 1;
            }
            if value_end > value_start {
                pos = value_end;
            }
        }

        return Some((start, pos));
    }

    None
}

fn normalize_inline(matched: &str) -> String {
    matched.trim_start_matches('#').trim().to_string()
}
