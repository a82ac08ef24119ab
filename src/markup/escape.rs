//! Backslash escapes and HTML quoting.

/// Map the character following a backslash to the character it stands for.
///
/// `n`, `r` and `t` become control characters; everything else (including
/// `\`, `'` and `"`) stands for itself.
pub fn escaped_char(c: char) -> char {
    match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        other => other,
    }
}

/// Resolve every backslash escape in `text`.
///
/// A trailing backslash with nothing after it is kept as-is.
pub fn apply_escapes(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => out.push(escaped_char(next)),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Escape HTML special characters, including both quote styles.
pub fn quote_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '>' => out.push_str("&gt;"),
            '<' => out.push_str("&lt;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaped_char() {
        assert_eq!(escaped_char('n'), '\n');
        assert_eq!(escaped_char('r'), '\r');
        assert_eq!(escaped_char('t'), '\t');
        assert_eq!(escaped_char('\\'), '\\');
        assert_eq!(escaped_char('\''), '\'');
        assert_eq!(escaped_char('"'), '"');
        assert_eq!(escaped_char('*'), '*');
    }

    #[test]
    fn test_apply_escapes() {
        assert_eq!(apply_escapes(r"one\ntwo"), "one\ntwo");
        assert_eq!(apply_escapes(r"\*not bold\*"), "*not bold*");
        assert_eq!(apply_escapes(r"back\\slash"), "back\\slash");
        assert_eq!(apply_escapes(r"dangling\"), "dangling\\");
        assert_eq!(apply_escapes("plain"), "plain");
    }

    #[test]
    fn test_quote_html() {
        assert_eq!(
            quote_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&apos;s&lt;/a&gt;"
        );
    }
}
