use lazy_static::lazy_static;
use regex::Regex;

/// Word count a generated preview is cut to.
pub const PREVIEW_WORDS: usize = 25;

/// Marker appended when a preview was truncated.
pub const TRUNCATION_MARKER: &str = "…";

/// Drops `<...>` markup sequences, leaving only the text between tags.
pub fn strip_tags(content: &str) -> String {
    lazy_static! {
        static ref TAG_RE: Regex = Regex::new(r"<[^>]*>").unwrap();
    }
    TAG_RE.replace_all(content, "").into_owned()
}

/// First `limit` whitespace-delimited words joined by single spaces, with the
/// truncation marker appended only when the source had more than `limit` words.
pub fn truncate_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return words.join(" ");
    }
    let mut out = words[..limit].join(" ");
    out.push(' ');
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Derives the short-form summary stored alongside an article.
pub fn generate_preview(content: &str) -> String {
    truncate_words(&strip_tags(content), PREVIEW_WORDS)
}

/// Preview value to store on save.
///
/// A non-empty requested preview is kept verbatim on every save. When none is
/// requested, an already-stored preview stays untouched; an empty request (or
/// no stored value) regenerates from the content.
pub fn resolve_preview(
    requested: Option<&str>,
    existing: Option<&str>,
    content: &str,
) -> String {
    match requested {
        Some(custom) if !custom.is_empty() => custom.to_string(),
        Some(_) => generate_preview(content),
        None => match existing {
            Some(current) if !current.is_empty() => current.to_string(),
            _ => generate_preview(content),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        std::iter::repeat("word")
            .take(n)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn strip_tags_removes_markup() {
        assert_eq!(strip_tags("<p>hello <b>world</b></p>"), "hello world");
        assert_eq!(strip_tags("no markup here"), "no markup here");
        assert_eq!(strip_tags("<br/>"), "");
    }

    #[test]
    fn short_content_is_kept_whole() {
        let content = "just a few words";
        assert_eq!(generate_preview(content), content);
    }

    #[test]
    fn exactly_twenty_five_words_has_no_marker() {
        let content = words(25);
        let preview = generate_preview(&content);
        assert_eq!(preview, content);
        assert!(!preview.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn long_content_is_cut_to_twenty_five_words_plus_marker() {
        let preview = generate_preview(&words(40));
        assert!(preview.ends_with(TRUNCATION_MARKER));
        let body = preview
            .strip_suffix(TRUNCATION_MARKER)
            .unwrap()
            .trim_end();
        assert_eq!(body.split_whitespace().count(), 25);
    }

    #[test]
    fn markup_is_stripped_before_counting() {
        // "<p>word word ... (30 words) ...</p>" -> 25 words + marker,
        // the trailing five words absent.
        let content = format!("<p>{}</p>", words(30));
        let preview = generate_preview(&content);
        assert!(preview.ends_with(TRUNCATION_MARKER));
        assert!(!preview.contains('<'));
        let body = preview
            .strip_suffix(TRUNCATION_MARKER)
            .unwrap()
            .trim_end();
        assert_eq!(body.split_whitespace().count(), 25);
        assert_eq!(body, words(25));
    }

    #[test]
    fn runs_of_whitespace_collapse_to_single_spaces() {
        assert_eq!(generate_preview("one\n\ntwo\t three"), "one two three");
    }

    #[test]
    fn custom_preview_is_preserved_verbatim_across_saves() {
        let first = resolve_preview(Some("my own summary"), None, "ignored content");
        assert_eq!(first, "my own summary");
        // Re-save with the stored value and no new request: unchanged.
        let second = resolve_preview(None, Some(&first), "changed content entirely");
        assert_eq!(second, "my own summary");
    }

    #[test]
    fn absent_request_keeps_existing_generated_preview() {
        let stored = generate_preview("original body");
        let resolved = resolve_preview(None, Some(&stored), "a different body now");
        assert_eq!(resolved, stored);
    }

    #[test]
    fn cleared_preview_is_regenerated_from_content() {
        let resolved = resolve_preview(Some(""), Some("stale preview"), "fresh body text");
        assert_eq!(resolved, "fresh body text");
    }

    #[test]
    fn first_save_with_no_preview_generates_one() {
        let resolved = resolve_preview(None, None, "<p>body</p>");
        assert_eq!(resolved, "body");
        assert!(!resolved.is_empty());
    }
}
