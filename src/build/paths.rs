//! File layout of pages in the content and output directories.
//!
//! A page named `about` is read from `<content>/about/index.md` and written
//! to `<output>/about/index.html`. Files next to the source are copied to
//! the same relative path under the page's output directory.

use std::path::{Path, PathBuf};

/// Markup file inside each page directory.
pub const PAGE_SOURCE_FILE: &str = "index.md";

/// Rendered file inside each page output directory.
pub const PAGE_OUTPUT_FILE: &str = "index.html";

/// Template every page is rendered with.
pub const PAGE_TEMPLATE: &str = "page";

/// The html file a page with output directory `publish_dir` is written to.
pub fn page_output_file(publish_dir: &Path) -> PathBuf {
    publish_dir.join(PAGE_OUTPUT_FILE)
}

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
