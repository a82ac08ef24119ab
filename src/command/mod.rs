//! Markup commands and image resolution.
//!
//! Rendering hands every `{% command %}` and every image url to a
//! [`CommandProcessor`]. [`SiteCommandProcessor`] resolves them against the
//! pages of a site; [`PlainCommandProcessor`] leaves them mostly untouched.

mod args;
mod processor;

use std::path::{Path, PathBuf};

pub use args::{parse_args, split_command};
pub use processor::SiteCommandProcessor;

use crate::markup::quote_html;

/// Image location and, when readable, its intrinsic size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub url: String,
    pub width: Option<usize>,
    pub height: Option<usize>,
}

impl ImageInfo {
    /// An image that is used as-is, without known dimensions.
    pub fn unresolved(url: &str) -> Self {
        Self {
            url: url.to_string(),
            width: None,
            height: None,
        }
    }
}

/// Resolves markup commands and image references during rendering.
pub trait CommandProcessor {
    /// Render the raw text of a `{% ... %}` command to HTML.
    fn resolve_command(&self, command: &str) -> String;

    /// Resolve an image reference to its final url and dimensions.
    fn resolve_image(&self, id: &str) -> ImageInfo;
}

/// What the command processor needs to know about a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    pub title: String,
    pub publish_url: String,
    pub source_dir: PathBuf,
    pub publish_dir: PathBuf,
}

/// Looks up pages by name.
pub trait PageResolver {
    fn resolve(&self, name: &str) -> Option<PageRef>;
}

/// Collects files that must be copied into the output.
pub trait AssetSink {
    fn register(&self, source: &Path, dest: &Path);
}

/// A processor with no site behind it.
///
/// Commands become HTML comments and images keep their url.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCommandProcessor;

impl CommandProcessor for PlainCommandProcessor {
    fn resolve_command(&self, command: &str) -> String {
        format!("<!-- markup command: \"{}\" -->", quote_html(command))
    }

    fn resolve_image(&self, id: &str) -> ImageInfo {
        ImageInfo::unresolved(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_processor() {
        let processor = PlainCommandProcessor;
        assert_eq!(
            processor.resolve_command("post_link \"x\""),
            "<!-- markup command: \"post_link &quot;x&quot;\" -->"
        );
        assert_eq!(processor.resolve_image("a/b.png"), ImageInfo::unresolved("a/b.png"));
    }
}
