//! Line-oriented parsing of template directives into a tree.

use std::sync::LazyLock;

use regex::Regex;

use super::TemplateError;

static INCLUDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*%\{\s*include\s+"(.*)"\s*\}\s*$"#).unwrap());

static FOREACH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*%\{\s*foreach\s+([a-z0-9_]+)\s*\}\s*$").unwrap());

static IF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*%\{\s*if\s+([^\s}]+)\s*\}\s*$").unwrap());

static ELIF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*%\{\s*elif\s+([^\s}]+)\s*\}\s*$").unwrap());

static END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*%\{\s*end\s*\}\s*$").unwrap());

/// Marker whose presence switches a template from plain substitution to directive parsing.
const DIRECTIVE_MARKER: &str = "%{";

/// A parsed template, ready to be evaluated any number of times.
#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    /// No directives: the whole text is substituted at once.
    Plain(String),
    /// Directive tree, rendered line by line.
    Tree(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Include(String),
    Foreach { var: String, body: Vec<Node> },
    If { branches: Vec<Branch> },
}

/// One `%{if}` or `%{elif}` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub condition: String,
    pub body: Vec<Node>,
}

/// A container still open while parsing.
enum Frame {
    Foreach {
        line: usize,
        var: String,
        body: Vec<Node>,
    },
    If {
        line: usize,
        branches: Vec<Branch>,
    },
}

impl Frame {
    /// Append a node to the active body of this container.
    fn push(&mut self, node: Node) {
        match self {
            Frame::Foreach { body, .. } => body.push(node),
            Frame::If { branches, .. } => {
                if let Some(branch) = branches.last_mut() {
                    branch.body.push(node);
                }
            }
        }
    }

    fn construct(&self) -> &'static str {
        match self {
            Frame::Foreach { .. } => "foreach",
            Frame::If { .. } => "if",
        }
    }

    fn line(&self) -> usize {
        match self {
            Frame::Foreach { line, .. } | Frame::If { line, .. } => *line,
        }
    }

    fn into_node(self) -> Node {
        match self {
            Frame::Foreach { var, body, .. } => Node::Foreach { var, body },
            Frame::If { branches, .. } => Node::If { branches },
        }
    }
}

/// Open containers above the document root.
#[derive(Default)]
struct Builder {
    root: Vec<Node>,
    open: Vec<Frame>,
}

impl Builder {
    fn push(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(frame) => frame.push(node),
            None => self.root.push(node),
        }
    }

    /// Close the innermost container. Returns false if only the root is open.
    fn close(&mut self) -> bool {
        match self.open.pop() {
            Some(frame) => {
                self.push(frame.into_node());
                true
            }
            None => false,
        }
    }
}

impl Template {
    /// Parse template text. `name` is only used in error messages.
    pub fn parse(name: &str, text: &str) -> Result<Self, TemplateError> {
        if !text.contains(DIRECTIVE_MARKER) {
            return Ok(Template::Plain(text.to_string()));
        }

        let mut builder = Builder::default();

        for (index, line) in text.split('\n').enumerate() {
            let line_num = index + 1;

            if let Some(caps) = INCLUDE_RE.captures(line) {
                builder.push(Node::Include(caps[1].to_string()));
            } else if let Some(caps) = FOREACH_RE.captures(line) {
                builder.open.push(Frame::Foreach {
                    line: line_num,
                    var: caps[1].to_string(),
                    body: Vec::new(),
                });
            } else if let Some(caps) = IF_RE.captures(line) {
                builder.open.push(Frame::If {
                    line: line_num,
                    branches: vec![Branch {
                        condition: caps[1].to_string(),
                        body: Vec::new(),
                    }],
                });
            } else if let Some(caps) = ELIF_RE.captures(line) {
                let Some(Frame::If { branches, .. }) = builder.open.last_mut() else {
                    return Err(TemplateError::StrayElif {
                        template: name.to_string(),
                        line: line_num,
                    });
                };
                branches.push(Branch {
                    condition: caps[1].to_string(),
                    body: Vec::new(),
                });
            } else if END_RE.is_match(line) {
                if !builder.close() {
                    return Err(TemplateError::StrayEnd {
                        template: name.to_string(),
                        line: line_num,
                    });
                }
            } else {
                builder.push(Node::Text(line.to_string()));
            }
        }

        if let Some(frame) = builder.open.last() {
            return Err(TemplateError::Unterminated {
                template: name.to_string(),
                construct: frame.construct(),
                line: frame.line(),
            });
        }

        Ok(Template::Tree(builder.root))
    }
}
