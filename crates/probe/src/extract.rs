use once_cell::sync::Lazy;
use regex::Regex;

/// The one fixed pattern link discovery is built on. Deliberately regex-only,
/// not an HTML parser: false positives inside comments or embedded JSON are
/// tolerated because they simply fail to resolve downstream.
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[A-Za-z0-9\-._]+").unwrap());

/// Applies the fixed pattern to a page body, yielding an ordered multiset
/// of raw URL strings (duplicates and overlaps are both possible and kept —
/// coalescing happens later, at normalize time).
pub fn extract_links(body: &str) -> Vec<String> {
    LINK_RE.find_iter(body).map(|m| m.as_str().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_both_schemes() {
        let body = r#"<a href="https://foo.bar">x</a> see also http://baz.qux/path"#;
        let found = extract_links(body);
        assert_eq!(found, vec!["https://foo.bar", "http://baz.qux"]);
    }

    #[test]
    fn no_matches_is_empty() {
        assert!(extract_links("no links here").is_empty());
    }

    #[test]
    fn matches_inside_comments_and_json_are_not_special_cased() {
        let body = "<!-- https://comment.example --> {\"u\":\"https://json.example\"}";
        let found = extract_links(body);
        assert_eq!(found, vec!["https://comment.example", "https://json.example"]);
    }
}
