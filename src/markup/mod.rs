//! Blog markup: parsing source text into an element tree and rendering it to HTML.
//!
//! ```ignore
//! let markup = parse_markup("Hello *world*");
//! let html = render_markup(&markup, &PlainCommandProcessor);
//! ```

mod element;
mod escape;
mod parser;

pub use element::{Align, Cell, CodeBlock, Element, Markup, Node, Style, Table, render_nodes};
pub use escape::{apply_escapes, escaped_char, quote_html};
pub use parser::{find_matching, parse_markup, parse_text};

use crate::command::CommandProcessor;

/// Render a parsed document, resolving commands and images through `processor`.
pub fn render_markup(markup: &Markup, processor: &dyn CommandProcessor) -> String {
    markup.render(processor)
}
