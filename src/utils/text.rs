//! Keyword matching shared by the classifier and voice selection.

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Search `haystack` for `keyword` starting at a word boundary.
///
/// With `whole_word` the match must also end at a word boundary. The
/// comparison is case-sensitive; callers lowercase both sides first.
pub fn contains_keyword(haystack: &str, keyword: &str, whole_word: bool) -> bool {
    if keyword.is_empty() {
        return false;
    }
    haystack.match_indices(keyword).any(|(start, m)| {
        let starts_word = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let ends_word = !whole_word
            || haystack[start + m.len()..]
                .chars()
                .next()
                .map_or(true, |c| !is_word_char(c));
        starts_word && ends_word
    })
}

/// True if any keyword matches.
pub fn contains_any(haystack: &str, keywords: &[&str], whole_word: bool) -> bool {
    keywords
        .iter()
        .any(|kw| contains_keyword(haystack, kw, whole_word))
}
