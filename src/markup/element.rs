//! The parsed element tree and its HTML rendering.

use crate::command::CommandProcessor;

use super::escape::quote_html;

/// A child of a container element: either literal text or a nested element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

impl Node {
    /// Render this node, passing literal text through unchanged.
    pub fn render(&self, processor: &dyn CommandProcessor) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element(el) => el.render(processor),
        }
    }

    /// Returns true if this node is, or contains, a block element.
    pub fn contains_block(&self) -> bool {
        match self {
            Node::Text(_) => false,
            Node::Element(el) => el.contains_block(),
        }
    }

    /// The literal text of this node with all markup stripped.
    pub fn plain_text(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element(Element::Code(code)) => code.clone(),
            Node::Element(Element::Header { text, .. }) => text.clone(),
            Node::Element(el) => el.children().into_iter().map(Node::plain_text).collect(),
        }
    }
}

/// Render a sequence of nodes and concatenate the output.
pub fn render_nodes(nodes: &[Node], processor: &dyn CommandProcessor) -> String {
    nodes.iter().map(|node| node.render(processor)).collect()
}

/// Inline text style produced by emphasis markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// `**text**`
    Strong,
    /// `*text*`
    Emphasis,
    /// Unstyled inline container.
    Span,
}

impl Style {
    /// The style for an emphasis marker as written in the source.
    pub fn from_marker(marker: &str) -> Self {
        match marker {
            "**" => Style::Strong,
            "*" => Style::Emphasis,
            _ => Style::Span,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Style::Strong => "strong",
            Style::Emphasis => "em",
            Style::Span => "span",
        }
    }
}

/// Horizontal alignment of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// Alignment from a separator cell such as `:---:`.
    pub fn from_separator(cell: &str) -> Self {
        let cell = cell.trim();
        match (cell.starts_with(':'), cell.ends_with(':')) {
            (true, true) => Align::Center,
            (false, true) => Align::Right,
            _ => Align::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

/// A table cell: the inline nodes parsed from its text.
pub type Cell = Vec<Node>;

/// A table with per-column alignment and data rows.
///
/// The separator row of the source is folded into `aligns` and is never
/// stored as a row. The first data row renders as a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub aligns: Vec<Align>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Alignment of a column, defaulting to left past the end of the separator row.
    pub fn column_align(&self, col: usize) -> Align {
        self.aligns.get(col).copied().unwrap_or_default()
    }

    fn render_row(&self, out: &mut String, row: &[Cell], tag: &str, processor: &dyn CommandProcessor) {
        out.push_str("<tr>\n");
        for (col, cell) in row.iter().enumerate() {
            out.push_str(&format!("<{} align=\"{}\">", tag, self.column_align(col).as_str()));
            out.push_str(&render_nodes(cell, processor));
            out.push_str(&format!("</{}>", tag));
        }
        out.push_str("</tr>\n");
    }

    fn render(&self, processor: &dyn CommandProcessor) -> String {
        let mut out = String::new();
        out.push_str("<div class=\"table-wrapper\"><div class=\"table-scroll\">\n");
        out.push_str("<table>\n");

        if let Some((head, body)) = self.rows.split_first() {
            if head.iter().any(|cell| !cell.is_empty()) {
                self.render_row(&mut out, head, "th", processor);
            }
            for row in body {
                self.render_row(&mut out, row, "td", processor);
            }
        }

        out.push_str("</table>");
        out.push_str("</div></div>\n");
        out
    }
}

/// A fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Language tag from the first line of the fence.
    pub language: String,
    /// Free text following the language tag, shown above the code.
    pub header: String,
    /// Code lines (never empty).
    pub lines: Vec<String>,
}

impl CodeBlock {
    /// Build a code block from the text between the fence markers.
    ///
    /// The first line holds `language optional-header`; the rest is the body.
    pub fn from_fenced(text: &str) -> Self {
        let mut lines = text.split('\n').map(str::to_string);
        let first = lines.next().unwrap_or_default();
        let mut lines: Vec<String> = lines.collect();
        if lines.is_empty() {
            lines.push(String::new());
        }

        let (language, header) = match first.split_once(char::is_whitespace) {
            Some((language, header)) => (language.to_string(), header.trim_start().to_string()),
            None => (first, String::new()),
        };

        Self {
            language,
            header,
            lines,
        }
    }

    fn render(&self) -> String {
        let header = if self.header.is_empty() {
            String::new()
        } else {
            format!("<div class=\"multiline-code-header\">{}</div>\n", self.header)
        };
        format!(
            "{}<div class=\"multiline-code-wrapper\">\n<div class=\"multiline-code\">\n<pre>{}</pre>\n</div>\n</div>",
            header,
            self.lines.join("\n")
        )
    }
}

/// A parsed markup element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// `# text`; level 0 when the line is not a well-formed header.
    Header { level: usize, text: String },
    Table(Table),
    /// Flat list of items, one per `- ` line.
    List { items: Vec<Vec<Node>> },
    /// `![caption](url)`; the url is resolved through the command processor.
    Image { url: String, caption: Vec<Node> },
    Link { url: String, label: Vec<Node> },
    TextFormat { style: Style, children: Vec<Node> },
    /// Inline code, kept verbatim.
    Code(String),
    MultilineCode(CodeBlock),
    /// A blank-line separated block of the document.
    Paragraph { children: Vec<Node> },
    /// `{% command args %}`, resolved through the command processor.
    Command(String),
}

impl Element {
    /// Returns true for elements that occupy their own layout block.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Element::Header { .. }
                | Element::Table(_)
                | Element::List { .. }
                | Element::Image { .. }
                | Element::MultilineCode(_)
        )
    }

    /// Direct children of this element, in document order.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Element::Table(table) => table.rows.iter().flatten().flatten().collect(),
            Element::List { items } => items.iter().flatten().collect(),
            Element::Image { caption, .. } => caption.iter().collect(),
            Element::Link { label, .. } => label.iter().collect(),
            Element::TextFormat { children, .. } | Element::Paragraph { children } => {
                children.iter().collect()
            }
            Element::Header { .. }
            | Element::Code(_)
            | Element::MultilineCode(_)
            | Element::Command(_) => Vec::new(),
        }
    }

    /// Returns true if this element or any descendant is a block element.
    pub fn contains_block(&self) -> bool {
        self.is_block() || self.children().into_iter().any(Node::contains_block)
    }

    /// Render this element to an HTML fragment.
    pub fn render(&self, processor: &dyn CommandProcessor) -> String {
        match self {
            Element::Header { level, text } => format!("<p class=\"header-{}\">{}</p>", level, text),
            Element::Table(table) => table.render(processor),
            Element::List { items } => {
                let mut lines = vec!["<ul>".to_string()];
                for item in items {
                    lines.push(format!("  <li>{}</li>", render_nodes(item, processor)));
                }
                lines.push("</ul>".to_string());
                lines.join("\n")
            }
            Element::Image { url, caption } => render_image(url, caption, processor),
            Element::Link { url, label } => {
                format!("<a href=\"{}\">{}</a>", url, render_nodes(label, processor))
            }
            Element::TextFormat { style, children } => format!(
                "<{tag}>{}</{tag}>",
                render_nodes(children, processor),
                tag = style.tag()
            ),
            Element::Code(text) => format!("<code>{}</code>", text),
            Element::MultilineCode(block) => block.render(),
            Element::Paragraph { children } => render_paragraph(children, processor),
            Element::Command(command) => processor.resolve_command(command),
        }
    }
}

/// A lone block child stands in for the paragraph; any nested block turns the
/// paragraph into a plain `<div>`.
fn render_paragraph(children: &[Node], processor: &dyn CommandProcessor) -> String {
    if let [Node::Element(child)] = children
        && child.is_block()
    {
        return child.render(processor);
    }

    let content = render_nodes(children, processor);
    if children.iter().any(Node::contains_block) {
        format!("<div>\n{}\n</div>", content)
    } else {
        format!("<p>\n{}\n</p>", content)
    }
}

fn render_image(url: &str, caption: &[Node], processor: &dyn CommandProcessor) -> String {
    let info = processor.resolve_image(url);
    let alt: String = caption.iter().map(Node::plain_text).collect();
    let alt = quote_html(&alt.replace('\n', " "));

    let img_tag = match (info.width, info.height) {
        (Some(width), Some(height)) => format!(
            "<img width=\"{}\" height=\"{}\" src=\"{}\" alt=\"{}\" title=\"{}\">",
            width, height, info.url, alt, alt
        ),
        _ => format!("<img src=\"{}\" alt=\"{}\" title=\"{}\">", info.url, alt, alt),
    };

    format!(
        "<div class=\"image\">\n  {}\n  <div class=\"image-caption\">{}</div>\n</div>",
        img_tag,
        render_nodes(caption, processor).replace('\n', " ")
    )
}

/// A parsed document: one paragraph element per source block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    blocks: Vec<Element>,
}

impl Markup {
    pub fn new(blocks: Vec<Element>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Element] {
        &self.blocks
    }

    /// Render every block and separate them with a blank line.
    pub fn render(&self, processor: &dyn CommandProcessor) -> String {
        self.blocks
            .iter()
            .map(|block| block.render(processor))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Collect every element in the tree matching `predicate`, depth first.
    pub fn find_all<F>(&self, predicate: F) -> Vec<&Element>
    where
        F: Fn(&Element) -> bool,
    {
        fn sweep<'a, F: Fn(&Element) -> bool>(el: &'a Element, predicate: &F, found: &mut Vec<&'a Element>) {
            if predicate(el) {
                found.push(el);
            }
            for child in el.children() {
                if let Node::Element(child) = child {
                    sweep(child, predicate, found);
                }
            }
        }

        let mut found = Vec::new();
        for block in &self.blocks {
            sweep(block, &predicate, &mut found);
        }
        found
    }
}
