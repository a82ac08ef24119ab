//! Inline `${name}` and `$if{name:then:else}` substitution.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::context::Context;

/// `$if{name:then:else}`. Branches may hold `${name}` placeholders but no other `:` or `}`.
static IF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$if\{([a-z0-9_]+):((?:\$\{[a-z0-9_]+\}|[^:}])*):((?:\$\{[a-z0-9_]+\}|[^:}])*)\}")
        .unwrap()
});

static VAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([a-z0-9_]+)\}").unwrap());

/// Substitute the inline placeholders of `text`.
///
/// Conditionals are resolved first so the chosen branch can itself contain
/// `${name}` placeholders. Substituted values are not scanned again.
pub fn substitute(text: &str, ctx: &Context) -> String {
    if !text.contains('$') {
        return text.to_string();
    }

    let text = IF_RE.replace_all(text, |caps: &Captures| {
        let branch = if ctx.is_truthy(&caps[1]) { 2 } else { 3 };
        caps[branch].to_string()
    });
    VAR_RE
        .replace_all(&text, |caps: &Captures| ctx.text(&caps[1]).to_string())
        .into_owned()
}
