//! Shared utility functions.

/// Convert a slug to title case.
///
/// Splits on `-` and `_`, capitalizes each word.
/// "getting-started" -> "Getting Started"
/// "api_reference" -> "Api Reference"
pub fn title_case(s: &str) -> String {
    s.split(['-', '_'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Join url segments with single slashes.
///
/// Surrounding whitespace and slashes are trimmed from every part and empty
/// parts are dropped. A leading slash on the first part is kept.
/// ("https://x.org/", "tags", "rust") -> "https://x.org/tags/rust"
/// ("/", "about") -> "/about"
pub fn url_join(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .map(|part| part.trim().trim_matches('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    let rooted = parts.first().is_some_and(|first| first.starts_with('/'));
    if rooted && !joined.starts_with('/') {
        format!("/{}", joined)
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("getting-started"), "Getting Started");
        assert_eq!(title_case("installation"), "Installation");
        assert_eq!(title_case("api_reference"), "Api Reference");
        assert_eq!(title_case("README"), "README");
        assert_eq!(title_case("my-cool-feature"), "My Cool Feature");
    }

    #[test]
    fn test_url_join() {
        assert_eq!(url_join(&["https://x.org/", "tags", "rust"]), "https://x.org/tags/rust");
        assert_eq!(url_join(&["/", "about"]), "/about");
        assert_eq!(url_join(&["/blog/", "/2024/", "post"]), "/blog/2024/post");
        assert_eq!(url_join(&["", "a", ""]), "a");
        assert_eq!(url_join(&["/"]), "/");
    }
}
