//! Data contexts for template evaluation.

use std::collections::HashMap;

use serde::Serialize;

use super::TemplateError;

/// A value stored in a [`Context`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Bool(bool),
    /// A sequence of sub-contexts for `%{foreach}`.
    List(Vec<Context>),
}

impl Value {
    /// Non-empty strings, non-empty lists and `true` are truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::List(items) => !items.is_empty(),
        }
    }

    /// The text substituted for `${name}`.
    pub fn as_text(&self) -> &str {
        match self {
            Value::Str(s) => s,
            Value::Bool(true) => "true",
            Value::Bool(false) | Value::List(_) => "",
        }
    }

    /// Convert a JSON value. Nulls and nested objects have no template
    /// representation and yield `None`; numbers become strings.
    fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null | serde_json::Value::Object(_) => None,
            serde_json::Value::Bool(b) => Some(Value::Bool(b)),
            serde_json::Value::Number(n) => Some(Value::Str(n.to_string())),
            serde_json::Value::String(s) => Some(Value::Str(s)),
            serde_json::Value::Array(items) => Some(Value::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        serde_json::Value::Object(map) => Some(Context::from_json_map(map)),
                        _ => None,
                    })
                    .collect(),
            )),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Context>> for Value {
    fn from(items: Vec<Context>) -> Self {
        Value::List(items)
    }
}

/// Name to value mapping that templates are evaluated against.
///
/// Missing names behave as empty strings and false conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    vars: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from any value that serializes to a JSON object.
    ///
    /// Arrays of objects become lists of sub-contexts.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, TemplateError> {
        match serde_json::to_value(value)? {
            serde_json::Value::Object(map) => Ok(Self::from_json_map(map)),
            _ => Err(TemplateError::ContextNotObject),
        }
    }

    fn from_json_map(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let vars = map
            .into_iter()
            .filter_map(|(name, value)| Value::from_json(value).map(|value| (name, value)))
            .collect();
        Self { vars }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Builder-style [`Context::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Returns true if `name` is present and truthy.
    pub fn is_truthy(&self, name: &str) -> bool {
        self.get(name).is_some_and(Value::is_truthy)
    }

    /// The substitution text for `name`, empty when missing.
    pub fn text(&self, name: &str) -> &str {
        self.get(name).map(Value::as_text).unwrap_or("")
    }

    /// Copy every entry of `other` into this context, replacing existing names.
    pub fn extend(&mut self, other: &Context) {
        self.vars
            .extend(other.vars.iter().map(|(name, value)| (name.clone(), value.clone())));
    }

    /// A copy of this context with `item`'s entries laid over it.
    pub fn overlay(&self, item: &Context) -> Context {
        let mut child = self.clone();
        child.extend(item);
        child
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Serialize;

    use super::*;

    #[test]
    fn test_truthiness() {
        let ctx = Context::new()
            .with("empty", "")
            .with("full", "x")
            .with("yes", true)
            .with("no", false)
            .with("none", Vec::<Context>::new())
            .with("some", vec![Context::new()]);

        assert!(!ctx.is_truthy("empty"));
        assert!(ctx.is_truthy("full"));
        assert!(ctx.is_truthy("yes"));
        assert!(!ctx.is_truthy("no"));
        assert!(!ctx.is_truthy("none"));
        assert!(ctx.is_truthy("some"));
        assert!(!ctx.is_truthy("missing"));
    }

    #[test]
    fn test_text() {
        let ctx = Context::new().with("name", "blogen").with("flag", true);
        assert_eq!(ctx.text("name"), "blogen");
        assert_eq!(ctx.text("flag"), "true");
        assert_eq!(ctx.text("missing"), "");
    }

    #[test]
    fn test_overlay_prefers_item() {
        let parent = Context::new().with("x", "parent").with("y", "kept");
        let item = Context::new().with("x", "item");
        let child = parent.overlay(&item);
        assert_eq!(child.text("x"), "item");
        assert_eq!(child.text("y"), "kept");
        assert_eq!(parent.text("x"), "parent");
    }

    #[derive(Serialize)]
    struct Tag {
        tag_name: String,
    }

    #[derive(Serialize)]
    struct Vars {
        title: String,
        draft: bool,
        count: u32,
        subtitle: Option<String>,
        tag: Vec<Tag>,
    }

    #[test]
    fn test_from_serialize() {
        let ctx = Context::from_serialize(&Vars {
            title: "Hello".into(),
            draft: false,
            count: 3,
            subtitle: None,
            tag: vec![Tag {
                tag_name: "rust".into(),
            }],
        })
        .unwrap();

        assert_eq!(ctx.text("title"), "Hello");
        assert_eq!(ctx.get("draft"), Some(&Value::Bool(false)));
        assert_eq!(ctx.text("count"), "3");
        assert_eq!(ctx.get("subtitle"), None);
        assert_eq!(
            ctx.get("tag"),
            Some(&Value::List(vec![Context::new().with("tag_name", "rust")]))
        );
    }

    #[test]
    fn test_from_serialize_rejects_scalars() {
        assert!(matches!(
            Context::from_serialize(&"just a string"),
            Err(TemplateError::ContextNotObject)
        ));
    }
}
