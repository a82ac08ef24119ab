//! Hand-written recursive parser for the blog markup.
//!
//! A document is split into blocks on blank lines. Fenced code blocks are
//! taken verbatim; every other block is scanned once, left to right, by
//! [`parse_text`], which tries the element recognizers whenever it meets one
//! of the trigger characters and otherwise accumulates literal text.

use std::sync::LazyLock;

use regex::Regex;

use super::element::{Align, Cell, CodeBlock, Element, Markup, Node, Style, Table};
use super::escape::apply_escapes;

const FENCE: &str = "```";

/// Characters that may start an element.
const TRIGGERS: &[u8] = b"{}[]!#%|`-*";

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#+)\s*([^#].*)$").unwrap());

static EMPTY_CELL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<!--\s*-->$").unwrap());

static SEPARATOR_CELL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^:?-{2,}:?$").unwrap());

/// Parse a whole document.
pub fn parse_markup(text: &str) -> Markup {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        if trimmed.is_empty() {
            break;
        }

        if let Some(body) = trimmed.strip_prefix(FENCE) {
            let (code, consumed) = match body.find(FENCE) {
                Some(end) => (&body[..end], FENCE.len() + end + FENCE.len()),
                None => {
                    tracing::warn!(offset = pos, "unterminated code fence, treating the rest of the input as code");
                    (body, trimmed.len())
                }
            };
            let block = Element::MultilineCode(CodeBlock::from_fenced(code));
            blocks.push(Element::Paragraph {
                children: vec![Node::Element(block)],
            });
            pos += consumed;
        } else {
            let end = trimmed.find("\n\n").unwrap_or(trimmed.len());
            blocks.push(Element::Paragraph {
                children: parse_text(&trimmed[..end]),
            });
            pos += end;
        }
    }

    Markup::new(blocks)
}

/// Parse a run of text into literal fragments and inline elements.
///
/// Structural elements (headers, tables, lists) are only recognized at the
/// very start of `text` and swallow the remainder of it.
pub fn parse_text(text: &str) -> Vec<Node> {
    let bytes = text.as_bytes();
    let mut nodes = Vec::new();
    let mut start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        if c == b'\\' {
            // The escaped character never starts an element.
            pos += 2;
            continue;
        }
        if TRIGGERS.contains(&c)
            && let Some((end, element)) = parse_special(text, pos)
        {
            push_literal(&mut nodes, &text[start..pos]);
            nodes.push(Node::Element(element));
            start = end;
            pos = end;
            continue;
        }
        pos += 1;
    }

    push_literal(&mut nodes, &text[start..]);
    nodes
}

fn push_literal(nodes: &mut Vec<Node>, literal: &str) {
    if !literal.is_empty() {
        nodes.push(Node::Text(apply_escapes(literal)));
    }
}

/// Try every recognizer at `pos`, returning the end offset and the element on success.
fn parse_special(text: &str, pos: usize) -> Option<(usize, Element)> {
    let bytes = text.as_bytes();
    let rest = &text[pos..];

    if pos == 0 {
        match bytes[0] {
            b'#' => return Some((text.len(), parse_header(text))),
            b'|' => return Some((text.len(), Element::Table(parse_table(text)))),
            b'-' if is_list_item(text) => {
                return Some((
                    text.len(),
                    Element::List {
                        items: parse_list(text),
                    },
                ));
            }
            _ => {}
        }
    }

    match bytes[pos] {
        b'*' => {
            let marker = if rest.starts_with("**") { "**" } else { "*" };
            let inner = pos + marker.len();
            let end = inner + text[inner..].find(marker)?;
            Some((
                end + marker.len(),
                Element::TextFormat {
                    style: Style::from_marker(marker),
                    children: parse_text(&text[inner..end]),
                },
            ))
        }
        b'`' => {
            let close = pos + 1 + text[pos + 1..].find('`')?;
            Some((close + 1, Element::Code(text[pos + 1..close].to_string())))
        }
        b'{' if rest.starts_with("{%") => {
            let end = find_matching(text, pos + 2, "%}")?;
            Some((end, Element::Command(text[pos + 2..end - 2].trim().to_string())))
        }
        b'!' if rest.starts_with("![") => {
            let (end, caption, url) = parse_target(text, pos + 2)?;
            Some((
                end,
                Element::Image {
                    url: url.to_string(),
                    caption: parse_text(caption),
                },
            ))
        }
        b'[' => {
            let (end, label, url) = parse_target(text, pos + 1)?;
            Some((
                end,
                Element::Link {
                    url: url.to_string(),
                    label: parse_text(label),
                },
            ))
        }
        _ => None,
    }
}

/// Parse `label](url)` starting just after the opening bracket.
///
/// Returns the end offset, the label text and the url text.
fn parse_target(text: &str, label_start: usize) -> Option<(usize, &str, &str)> {
    let paren = find_matching(text, label_start, "]")?;
    if text.as_bytes().get(paren) != Some(&b'(') {
        return None;
    }
    let end = find_matching(text, paren + 1, ")")?;
    Some((end, &text[label_start..paren - 1], &text[paren + 1..end - 1]))
}

/// Find `terminator` at or after `start`, skipping over balanced `[]` and `()`
/// pairs and backslash-escaped characters.
///
/// Returns the offset just past the terminator, or `None` if the input runs
/// out first.
pub fn find_matching(text: &str, start: usize, terminator: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let terminator = terminator.as_bytes();
    let mut expected: Vec<u8> = Vec::new();
    let mut pos = start;

    while pos + terminator.len() <= bytes.len() {
        if expected.is_empty() && bytes[pos..].starts_with(terminator) {
            return Some(pos + terminator.len());
        }
        let c = bytes[pos];
        if expected.last() == Some(&c) {
            expected.pop();
        } else if c == b'[' {
            expected.push(b']');
        } else if c == b'(' {
            expected.push(b')');
        } else if c == b'\\' {
            pos += 1;
        }
        pos += 1;
    }

    None
}

fn parse_header(text: &str) -> Element {
    match HEADER_RE.captures(text.trim_end()) {
        Some(caps) => Element::Header {
            level: caps[1].len(),
            text: caps[2].to_string(),
        },
        None => Element::Header {
            level: 0,
            text: text.to_string(),
        },
    }
}

/// Returns true if `line` starts a list item: a dash followed by whitespace or nothing.
fn is_list_item(line: &str) -> bool {
    match line.strip_prefix('-') {
        Some(rest) => rest.is_empty() || rest.starts_with(char::is_whitespace),
        None => false,
    }
}

/// Split a list block into its items. Lines that do not start a new item
/// continue the previous one.
fn parse_list(text: &str) -> Vec<Vec<Node>> {
    let mut raw_items: Vec<String> = Vec::new();
    for line in text.split('\n') {
        match raw_items.last_mut() {
            Some(item) if !is_list_item(line) => {
                item.push('\n');
                item.push_str(line);
            }
            _ => raw_items.push(line.strip_prefix('-').unwrap_or(line).to_string()),
        }
    }

    raw_items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(parse_text)
        .collect()
}

/// Returns true if a row is the alignment row, judged by its first cell.
fn is_separator_row(first_cell: &str) -> bool {
    first_cell.contains("---") || SEPARATOR_CELL_RE.is_match(first_cell.trim())
}

fn parse_table(text: &str) -> Table {
    let mut table = Table::default();

    for line in text.split('\n') {
        let fields: Vec<&str> = line.split('|').collect();
        let cells = if fields.len() < 2 {
            &[][..]
        } else {
            &fields[1..fields.len() - 1]
        };

        match cells.first() {
            Some(first) if is_separator_row(first) => {
                table.aligns.extend(cells.iter().map(|cell| Align::from_separator(cell)));
            }
            _ => table.rows.push(cells.iter().map(|cell| parse_cell(cell)).collect()),
        }
    }

    table
}

/// Parse a cell, treating a lone `<!-- -->` as an intentionally blank cell.
fn parse_cell(cell: &str) -> Cell {
    let nodes = parse_text(cell.trim());
    match nodes.as_slice() {
        [Node::Text(literal)] if EMPTY_CELL_RE.is_match(literal) => Vec::new(),
        _ => nodes,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::command::PlainCommandProcessor;

    fn text(s: &str) -> Node {
        Node::Text(s.to_string())
    }

    fn el(element: Element) -> Node {
        Node::Element(element)
    }

    fn render(source: &str) -> String {
        parse_markup(source).render(&PlainCommandProcessor)
    }

    #[test]
    fn test_plain_text_round_trips() {
        let source = "Just some words, with punctuation. And numbers: 1 2 3.";
        assert_eq!(parse_text(source), vec![text(source)]);
        assert_eq!(render(source), format!("<p>\n{}\n</p>", source));
    }

    #[test]
    fn test_blocks_split_on_blank_lines() {
        let markup = parse_markup("first\n\n\n  second\nstill second");
        assert_eq!(markup.blocks().len(), 2);
        assert_eq!(
            render("first\n\nsecond"),
            "<p>\nfirst\n</p>\n\n<p>\nsecond\n</p>"
        );
    }

    #[test]
    fn test_trailing_whitespace_adds_no_block() {
        assert_eq!(parse_markup("only\n\n   \n").blocks().len(), 1);
        assert!(parse_markup("").blocks().is_empty());
    }

    #[test]
    fn test_emphasis_styles() {
        assert_eq!(
            parse_text("a **b** *c*"),
            vec![
                text("a "),
                el(Element::TextFormat {
                    style: Style::Strong,
                    children: vec![text("b")],
                }),
                text(" "),
                el(Element::TextFormat {
                    style: Style::Emphasis,
                    children: vec![text("c")],
                }),
            ]
        );
    }

    #[test]
    fn test_single_star_matches_next_single_star() {
        let em = |s: &str| {
            el(Element::TextFormat {
                style: Style::Emphasis,
                children: vec![text(s)],
            })
        };
        assert_eq!(parse_text("*a**b**c*"), vec![em("a"), em("b"), em("c")]);
    }

    #[test]
    fn test_unmatched_markers_stay_literal() {
        assert_eq!(parse_text("2 * 3 = 6"), vec![text("2 * 3 = 6")]);
        assert_eq!(parse_text("a `b"), vec![text("a `b")]);
        assert_eq!(parse_text("[not a link]"), vec![text("[not a link]")]);
        assert_eq!(parse_text("{% open"), vec![text("{% open")]);
    }

    #[test]
    fn test_inline_code_is_verbatim() {
        assert_eq!(
            parse_text("run `*x*` now"),
            vec![text("run "), el(Element::Code("*x*".into())), text(" now")]
        );
    }

    #[test]
    fn test_link_with_nested_parens() {
        assert_eq!(
            parse_text("see [the *docs*](https://x.org/a_(b)) here"),
            vec![
                text("see "),
                el(Element::Link {
                    url: "https://x.org/a_(b)".into(),
                    label: vec![
                        text("the "),
                        el(Element::TextFormat {
                            style: Style::Emphasis,
                            children: vec![text("docs")],
                        }),
                    ],
                }),
                text(" here"),
            ]
        );
    }

    #[test]
    fn test_link_requires_adjacent_paren() {
        assert_eq!(parse_text("[a] (b)"), vec![text("[a] (b)")]);
    }

    #[test]
    fn test_image_with_brackets_in_caption() {
        assert_eq!(
            parse_text("![a [nested] caption](post/pic.png)"),
            vec![el(Element::Image {
                url: "post/pic.png".into(),
                caption: vec![text("a [nested] caption")],
            })]
        );
    }

    #[test]
    fn test_command_is_bracket_aware() {
        assert_eq!(
            parse_text("x {% post_link 'a' '[%}]' %} y"),
            vec![
                text("x "),
                el(Element::Command("post_link 'a' '[%}]'".into())),
                text(" y"),
            ]
        );
    }

    #[test]
    fn test_find_matching() {
        assert_eq!(find_matching("ab]", 0, "]"), Some(3));
        assert_eq!(find_matching("[x]]", 0, "]"), Some(4));
        assert_eq!(find_matching(r"\]x]", 0, "]"), Some(4));
        assert_eq!(find_matching("(x", 0, ")"), None);
        assert_eq!(find_matching("a %} b", 0, "%}"), Some(4));
    }

    #[test]
    fn test_escapes_in_text() {
        assert_eq!(parse_text(r"line\nbreak"), vec![text("line\nbreak")]);
        assert_eq!(parse_text(r"\*literal\*"), vec![text("*literal*")]);
        assert_eq!(parse_text(r"\[x](y)"), vec![text("[x](y)")]);
    }

    #[test]
    fn test_header() {
        assert_eq!(
            parse_text("## Section title"),
            vec![el(Element::Header {
                level: 2,
                text: "Section title".into(),
            })]
        );
        assert_eq!(render("# Hi"), "<p class=\"header-1\">Hi</p>");
    }

    #[test]
    fn test_header_only_at_block_start() {
        assert_eq!(parse_text("issue #42"), vec![text("issue #42")]);
    }

    #[test]
    fn test_table_alignments() {
        let nodes = parse_text("|:--|:--:|--:|\n|x|y|z|");
        let [Node::Element(Element::Table(table))] = nodes.as_slice() else {
            panic!("expected a table, got {:?}", nodes);
        };
        assert_eq!(table.aligns, vec![Align::Left, Align::Center, Align::Right]);
        assert_eq!(
            table.rows,
            vec![vec![vec![text("x")], vec![text("y")], vec![text("z")]]]
        );
    }

    #[test]
    fn test_table_render() {
        let html = render("| Name | Count |\n|------|------:|\n| a | **1** |");
        assert_eq!(
            html,
            "<div class=\"table-wrapper\"><div class=\"table-scroll\">\n<table>\n\
             <tr>\n<th align=\"left\">Name</th><th align=\"right\">Count</th></tr>\n\
             <tr>\n<td align=\"left\">a</td><td align=\"right\"><strong>1</strong></td></tr>\n\
             </table></div></div>\n"
        );
    }

    #[test]
    fn test_table_row_longer_than_alignments() {
        let nodes = parse_text("|a|b|c|\n|:--:|\n|1|2|3|");
        let [Node::Element(Element::Table(table))] = nodes.as_slice() else {
            panic!("expected a table");
        };
        assert_eq!(table.aligns, vec![Align::Center]);
        assert_eq!(table.column_align(0), Align::Center);
        assert_eq!(table.column_align(2), Align::Left);
        let html = render("|a|b|c|\n|:--:|\n|1|2|3|");
        assert!(html.contains("<td align=\"center\">1</td><td align=\"left\">2</td><td align=\"left\">3</td>"));
    }

    #[test]
    fn test_table_blank_cell_marker() {
        let nodes = parse_text("| <!-- --> | <!----> |\n|---|---|\n| 1 | 2 |");
        let [Node::Element(Element::Table(table))] = nodes.as_slice() else {
            panic!("expected a table");
        };
        assert_eq!(table.rows[0], vec![Vec::new(), Vec::new()]);
        assert!(!render("| <!-- --> |\n|---|\n| 1 |").contains("<th"));
    }

    #[test]
    fn test_list_items() {
        assert_eq!(
            parse_text("- one\n- *two*\n-   \n- three\n  continued"),
            vec![el(Element::List {
                items: vec![
                    vec![text("one")],
                    vec![el(Element::TextFormat {
                        style: Style::Emphasis,
                        children: vec![text("two")],
                    })],
                    vec![text("three\n  continued")],
                ],
            })]
        );
    }

    #[test]
    fn test_dash_without_space_is_not_a_list() {
        assert_eq!(parse_text("-5 degrees"), vec![text("-5 degrees")]);
    }

    #[test]
    fn test_nested_dash_lines_stay_flat() {
        let nodes = parse_text("- a\n  - b");
        let [Node::Element(Element::List { items })] = nodes.as_slice() else {
            panic!("expected a list");
        };
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_fenced_code_block() {
        let markup = parse_markup("intro\n\n```rust Example\nlet x = 1;\n\nlet y = 2;\n```\n\nafter");
        assert_eq!(markup.blocks().len(), 3);
        let Element::Paragraph { children } = &markup.blocks()[1] else {
            panic!("expected a paragraph");
        };
        assert_eq!(
            children,
            &vec![el(Element::MultilineCode(CodeBlock {
                language: "rust".into(),
                header: "Example".into(),
                lines: vec![
                    "let x = 1;".into(),
                    String::new(),
                    "let y = 2;".into(),
                    String::new(),
                ],
            }))]
        );
        assert!(render("```sh\nls\n```").starts_with("<div class=\"multiline-code-wrapper\">"));
    }

    #[test]
    fn test_unterminated_fence_consumes_rest() {
        let markup = parse_markup("```py\nprint(1)\n\nprint(2)");
        assert_eq!(markup.blocks().len(), 1);
        let found = markup.find_all(|el| matches!(el, Element::MultilineCode(_)));
        let [Element::MultilineCode(block)] = found.as_slice() else {
            panic!("expected one code block");
        };
        assert_eq!(block.lines, vec!["print(1)", "", "print(2)"]);
    }

    #[test]
    fn test_paragraph_with_image_and_text_becomes_div() {
        let html = render("look: ![cat](cat.png)");
        assert!(html.starts_with("<div>\nlook: <div class=\"image\">"));
        assert!(html.ends_with("</div>\n</div>"));
    }

    #[test]
    fn test_lone_image_collapses() {
        let html = render("![cat](cat.png)");
        assert!(html.starts_with("<div class=\"image\">"));
    }

    #[test]
    fn test_unicode_text_survives_scanning() {
        assert_eq!(
            parse_text("héllo *wörld* ✓"),
            vec![
                text("héllo "),
                el(Element::TextFormat {
                    style: Style::Emphasis,
                    children: vec![text("wörld")],
                }),
                text(" ✓"),
            ]
        );
    }
}
