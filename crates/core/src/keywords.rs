//! Word-boundary keyword matching shared by the router and the parsers.

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Returns the byte offset of the first occurrence of `keyword` in `text`
/// that is not glued to surrounding word characters. Both sides are
/// compared case-insensitively; `text` should already be lower-cased.
pub fn find_keyword(text: &str, keyword: &str) -> Option<usize> {
    let keyword = keyword.to_lowercase();
    if keyword.is_empty() {
        return None;
    }

    let mut start = 0;
    while let Some(offset) = text[start..].find(&keyword) {
        let at = start + offset;
        let end = at + keyword.len();

        let before_ok = !keyword.starts_with(is_word_char)
            || text[..at].chars().next_back().map_or(true, |c| !is_word_char(c));
        let after_ok = !keyword.ends_with(is_word_char)
            || text[end..].chars().next().map_or(true, |c| !is_word_char(c));

        if before_ok && after_ok {
            return Some(at);
        }

        start = at + text[at..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    find_keyword(text, keyword).is_some()
}

pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| contains_keyword(text, kw))
}

/// Removes every whole-word occurrence of `keywords` (case-insensitive)
/// and collapses the leftover whitespace.
pub fn strip_keywords(text: &str, keywords: &[&str]) -> String {
    let mut out = text.to_string();
    for kw in keywords {
        loop {
            let lowered = out.to_lowercase();
            // Lower-casing can change byte lengths for non-ASCII text; only
            // splice when offsets line up.
            if lowered.len() != out.len() {
                break;
            }
            match find_keyword(&lowered, kw) {
                Some(at) => out.replace_range(at..at + kw.len(), " "),
                None => break,
            }
        }
    }
    collapse_whitespace(&out)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_respects_word_boundaries() {
        assert!(contains_keyword("open my file", "file"));
        assert!(!contains_keyword("open my profile", "file"));
        assert!(!contains_keyword("javascript please", "java"));
        assert!(contains_keyword("in java please", "java"));
    }

    #[test]
    fn test_keyword_with_symbols() {
        assert!(contains_keyword("write c++ code", "c++"));
        assert!(contains_keyword("run notepad.exe now", "notepad.exe"));
        assert!(contains_keyword("d-desk", "d-desk"));
    }

    #[test]
    fn test_multi_word_keyword() {
        assert!(contains_keyword("please turn on bluetooth", "turn on"));
        assert!(!contains_keyword("return online", "turn on"));
    }

    #[test]
    fn test_strip_keywords_preserves_case_of_rest() {
        let out = strip_keywords("Write Python code for Fibonacci", &["write", "python"]);
        assert_eq!(out, "code for Fibonacci");
    }
}
