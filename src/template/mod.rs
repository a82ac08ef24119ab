//! Line-oriented templates.
//!
//! A template is plain text with two kinds of markers:
//! - inline `${name}` and `$if{name:then:else}` substitutions, available on every line
//! - whole-line directives: `%{include "NAME"}`, `%{foreach VAR}`, `%{if VAR}`,
//!   `%{elif VAR}` and `%{end}`
//!
//! Templates are loaded by name from a [`TemplateSource`], parsed once and
//! cached for the lifetime of the [`TemplateEngine`].

mod context;
mod parse;
mod substitute;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

pub use context::{Context, Value};
pub use substitute::substitute;

use parse::{Node, Template};

/// Includes nested deeper than this are treated as a cycle.
pub const MAX_INCLUDE_DEPTH: usize = 64;

/// File extension of templates in a [`DirSource`].
const TEMPLATE_EXTENSION: &str = "tpl";

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum TemplateError {
    #[error("{template}: unterminated %{{{construct}}} in line {line}")]
    Unterminated {
        template: String,
        construct: &'static str,
        line: usize,
    },

    #[error("{template}: %{{elif}} outside of %{{if}} in line {line}")]
    StrayElif { template: String, line: usize },

    #[error("{template}: %{{end}} without open block in line {line}")]
    StrayEnd { template: String, line: usize },

    #[error("template not found: {0}")]
    NotFound(String),

    #[error("failed to read template {name}: {source}")]
    Io {
        name: String,
        source: std::io::Error,
    },

    #[error("includes nested too deeply while including {0}")]
    IncludeDepth(String),

    #[error("failed to serialize template context: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("template context must serialize to an object")]
    ContextNotObject,
}

// =============================================================================
// Sources
// =============================================================================

/// Where template text comes from.
pub trait TemplateSource: Send + Sync {
    fn load(&self, name: &str) -> Result<String, TemplateError>;
}

/// Templates stored as `NAME.tpl` files in one directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TemplateSource for DirSource {
    fn load(&self, name: &str) -> Result<String, TemplateError> {
        let path = self.dir.join(format!("{}.{}", name, TEMPLATE_EXTENSION));
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                TemplateError::NotFound(name.to_string())
            } else {
                TemplateError::Io {
                    name: name.to_string(),
                    source,
                }
            }
        })
    }
}

/// Templates held in memory, for tests and embedded defaults.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    templates: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.templates.insert(name.into(), text.into());
        self
    }
}

impl TemplateSource for MemorySource {
    fn load(&self, name: &str) -> Result<String, TemplateError> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Builds templates by name against a [`Context`].
pub struct TemplateEngine {
    source: Box<dyn TemplateSource>,
    cache: Mutex<HashMap<String, Arc<Template>>>,
}

impl TemplateEngine {
    pub fn new(source: impl TemplateSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Engine reading `NAME.tpl` files from `dir`.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(DirSource::new(dir))
    }

    /// Render the template `name` with `ctx`.
    pub fn build(&self, name: &str, ctx: &Context) -> Result<String, TemplateError> {
        self.build_nested(name, ctx, 0)
    }

    fn build_nested(&self, name: &str, ctx: &Context, depth: usize) -> Result<String, TemplateError> {
        if depth > MAX_INCLUDE_DEPTH {
            return Err(TemplateError::IncludeDepth(name.to_string()));
        }

        match self.template(name)?.as_ref() {
            Template::Plain(text) => Ok(substitute(text, ctx)),
            Template::Tree(nodes) => {
                let mut pieces = Vec::new();
                self.render_nodes(nodes, ctx, depth, &mut pieces)?;
                Ok(pieces.join("\n"))
            }
        }
    }

    /// Fetch a parsed template, parsing and caching it on first use.
    fn template(&self, name: &str) -> Result<Arc<Template>, TemplateError> {
        if let Some(template) = self.cache.lock().unwrap_or_else(PoisonError::into_inner).get(name) {
            return Ok(Arc::clone(template));
        }

        let text = self.source.load(name)?;
        let template = Arc::new(Template::parse(name, &text)?);
        tracing::debug!(template = name, "parsed template");

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Arc::clone(&template));
        Ok(template)
    }

    fn render_nodes(
        &self,
        nodes: &[Node],
        ctx: &Context,
        depth: usize,
        pieces: &mut Vec<String>,
    ) -> Result<(), TemplateError> {
        for node in nodes {
            match node {
                Node::Text(text) => pieces.push(substitute(text, ctx)),
                Node::Include(name) => pieces.push(self.build_nested(name, ctx, depth + 1)?),
                Node::Foreach { var, body } => {
                    if let Some(Value::List(items)) = ctx.get(var) {
                        for item in items {
                            self.render_nodes(body, &ctx.overlay(item), depth, pieces)?;
                        }
                    }
                }
                Node::If { branches } => {
                    if let Some(branch) = branches.iter().find(|b| ctx.is_truthy(&b.condition)) {
                        self.render_nodes(&branch.body, ctx, depth, pieces)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn engine(templates: &[(&str, &str)]) -> TemplateEngine {
        let source = templates
            .iter()
            .fold(MemorySource::new(), |source, (name, text)| source.with(*name, *text));
        TemplateEngine::new(source)
    }

    fn item(name: &str, value: &str) -> Context {
        Context::new().with(name, value)
    }

    #[test]
    fn test_plain_template_substitutes() {
        let engine = engine(&[("page", "<h1>${title}</h1>\n$if{draft:DRAFT:}")]);
        let ctx = Context::new().with("title", "Hello");
        assert_eq!(engine.build("page", &ctx).unwrap(), "<h1>Hello</h1>\n");
    }

    #[test]
    fn test_foreach() {
        let engine = engine(&[("list", "<ul>\n%{foreach items}\n<li>${x}</li>\n%{end}\n</ul>")]);
        let ctx = Context::new().with("items", vec![item("x", "a"), item("x", "b")]);
        assert_eq!(
            engine.build("list", &ctx).unwrap(),
            "<ul>\n<li>a</li>\n<li>b</li>\n</ul>"
        );
    }

    #[test]
    fn test_foreach_item_fields_shadow_parent() {
        let engine = engine(&[("t", "%{foreach items}\n${x} ${y}\n%{end}")]);
        let ctx = Context::new()
            .with("x", "outer")
            .with("y", "parent")
            .with("items", vec![item("x", "inner")]);
        assert_eq!(engine.build("t", &ctx).unwrap(), "inner parent");
    }

    #[test]
    fn test_foreach_over_missing_or_scalar_renders_nothing() {
        let engine = engine(&[("t", "a\n%{foreach items}\nrow\n%{end}\nb")]);
        assert_eq!(engine.build("t", &Context::new()).unwrap(), "a\nb");
        let ctx = Context::new().with("items", "not a list");
        assert_eq!(engine.build("t", &ctx).unwrap(), "a\nb");
    }

    #[test]
    fn test_if_elif_picks_first_truthy_branch() {
        let engine = engine(&[("t", "%{if a}\nA\n%{elif b}\nB\n%{end}")]);
        let ctx = Context::new().with("a", "").with("b", "1");
        assert_eq!(engine.build("t", &ctx).unwrap(), "B");
        let ctx = Context::new().with("a", true).with("b", "1");
        assert_eq!(engine.build("t", &ctx).unwrap(), "A");
        assert_eq!(engine.build("t", &Context::new()).unwrap(), "");
    }

    #[test]
    fn test_include_shares_context() {
        let engine = engine(&[
            ("page", "<html>\n  %{include \"header\"}\n${body}\n</html>"),
            ("header", "<h1>${title}</h1>"),
        ]);
        let ctx = Context::new().with("title", "T").with("body", "B");
        assert_eq!(
            engine.build("page", &ctx).unwrap(),
            "<html>\n<h1>T</h1>\nB\n</html>"
        );
    }

    #[test]
    fn test_include_inside_foreach_sees_item() {
        let engine = engine(&[
            ("list", "%{foreach tags}\n%{include \"tag\"}\n%{end}"),
            ("tag", "#${tag_name}"),
        ]);
        let ctx = Context::new().with("tags", vec![item("tag_name", "rust"), item("tag_name", "web")]);
        assert_eq!(engine.build("list", &ctx).unwrap(), "#rust\n#web");
    }

    #[test]
    fn test_unterminated_if_names_line() {
        let engine = engine(&[("t", "one\n%{if a}\nthree")]);
        let err = engine.build("t", &Context::new()).unwrap_err();
        assert!(matches!(err, TemplateError::Unterminated { line: 2, .. }));
    }

    #[test]
    fn test_missing_template() {
        let engine = engine(&[("page", "%{include \"nope\"}")]);
        let err = engine.build("page", &Context::new()).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(name) if name == "nope"));
    }

    #[test]
    fn test_recursive_include_is_bounded() {
        let engine = engine(&[("loop", "%{include \"loop\"}")]);
        let err = engine.build("loop", &Context::new()).unwrap_err();
        assert!(matches!(err, TemplateError::IncludeDepth(_)));
    }

    #[test]
    fn test_builds_are_deterministic_and_cached() {
        let engine = engine(&[("t", "%{foreach xs}\n${x}\n%{end}")]);
        let ctx = Context::new().with("xs", vec![item("x", "1"), item("x", "2")]);
        let first = engine.build("t", &ctx).unwrap();
        let second = engine.build("t", &ctx).unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.cache.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_dir_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.tpl"), "<p>${x}</p>").unwrap();
        let engine = TemplateEngine::from_dir(dir.path());

        let ctx = Context::new().with("x", "hi");
        assert_eq!(engine.build("page", &ctx).unwrap(), "<p>hi</p>");
        assert!(matches!(
            engine.build("other", &ctx),
            Err(TemplateError::NotFound(_))
        ));
    }

    #[test]
    fn test_dir_source_keeps_dotted_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("post.tpl"), "post").unwrap();
        std::fs::write(dir.path().join("post.header.tpl"), "header").unwrap();
        let engine = TemplateEngine::from_dir(dir.path());

        assert_eq!(engine.build("post.header", &Context::new()).unwrap(), "header");
        assert_eq!(engine.build("post", &Context::new()).unwrap(), "post");
    }
}
