use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::command::{PageRef, PageResolver};
use crate::config::BlogConfig;
use crate::util::{title_case, url_join};

use super::paths::{PAGE_SOURCE_FILE, page_output_file};

static DATE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)-(\d+)-(\d+)(?:\s+(\d+):(\d+):(\d+))?$").unwrap()
});

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum PageError {
    #[error("content directory does not exist: {0}")]
    ContentNotFound(PathBuf),

    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read page {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

// =============================================================================
// Front matter
// =============================================================================

/// Front matter metadata parsed from the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    pub title: Option<String>,
    /// `YYYY-MM-DD` optionally followed by `HH:MM:SS`
    pub date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Result of parsing front matter from page source.
#[derive(Debug)]
pub struct ParsedContent {
    /// The parsed front matter (empty if none found)
    pub front_matter: FrontMatter,
    /// The markup without the front matter block
    pub content: String,
}

/// Parse front matter from page source.
///
/// Front matter is a YAML block delimited by `---` at the start of the file:
///
/// ```text
/// ---
/// title: My Page
/// date: 2024-03-01 12:30:00
/// tags:
///   - rust
/// ---
///
/// Content starts here
/// ```
pub fn parse_front_matter(content: &str) -> ParsedContent {
    let content = content.trim_start();

    if !content.starts_with("---") {
        return ParsedContent {
            front_matter: FrontMatter::default(),
            content: content.to_string(),
        };
    }

    let after_opening = &content[3..];
    let Some(closing_pos) = after_opening.find("\n---") else {
        // No closing delimiter, the whole file is markup
        return ParsedContent {
            front_matter: FrontMatter::default(),
            content: content.to_string(),
        };
    };

    let yaml_content = after_opening[..closing_pos].trim_start_matches('\n');

    // "---" + yaml + "\n---"
    let body_start = 3 + closing_pos + 4;
    let body = content
        .get(body_start..)
        .map(|rest| rest.trim_start_matches('\n').to_string())
        .unwrap_or_default();

    let front_matter = if yaml_content.trim().is_empty() {
        FrontMatter::default()
    } else {
        match serde_yaml::from_str(yaml_content) {
            Ok(fm) => fm,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse front matter");
                FrontMatter::default()
            }
        }
    };

    ParsedContent {
        front_matter,
        content: body,
    }
}

/// A page date split for templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageDate {
    /// `YYYY-MM-DD`, or the raw text when it does not parse
    pub date: String,
    /// `HH:MM:SS`, empty when absent
    pub time: String,
}

impl PageDate {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let Some(caps) = DATE_TIME_RE.captures(text) else {
            return Self {
                date: text.to_string(),
                time: String::new(),
            };
        };

        let time = match (caps.get(4), caps.get(5), caps.get(6)) {
            (Some(h), Some(m), Some(s)) => format!("{}:{}:{}", h.as_str(), m.as_str(), s.as_str()),
            _ => String::new(),
        };
        Self {
            date: format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]),
            time,
        }
    }
}

// =============================================================================
// Pages
// =============================================================================

/// A page read from `<content>/<name>/index.md`.
#[derive(Debug, Clone)]
pub struct Page {
    /// Directory name, used to reference the page from markup
    pub name: String,
    pub source_dir: PathBuf,
    pub publish_dir: PathBuf,
    pub publish_url: String,
    pub front_matter: FrontMatter,
    /// Markup without front matter
    pub text: String,
    pub modified: Option<SystemTime>,
}

impl Page {
    /// Load the page stored in `source_dir`.
    pub fn load(source_dir: &Path, config: &BlogConfig) -> Result<Self, PageError> {
        let name = source_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let source_file = source_dir.join(PAGE_SOURCE_FILE);

        let raw = std::fs::read_to_string(&source_file).map_err(|source| PageError::Read {
            path: source_file.clone(),
            source,
        })?;
        let modified = std::fs::metadata(&source_file)
            .and_then(|m| m.modified())
            .ok();
        let parsed = parse_front_matter(&raw);

        Ok(Self {
            publish_dir: config.site.output.join(&name),
            publish_url: url_join(&[config.site.url.as_str(), name.as_str()]),
            source_dir: source_dir.to_path_buf(),
            front_matter: parsed.front_matter,
            text: parsed.content,
            modified,
            name,
        })
    }

    /// The title from front matter, or the title-cased directory name.
    pub fn title(&self) -> String {
        self.front_matter
            .title
            .clone()
            .unwrap_or_else(|| title_case(&self.name))
    }

    pub fn date(&self) -> PageDate {
        self.front_matter
            .date
            .as_deref()
            .map(PageDate::parse)
            .unwrap_or_default()
    }

    pub fn tags(&self) -> &[String] {
        &self.front_matter.tags
    }

    pub fn output_file(&self) -> PathBuf {
        page_output_file(&self.publish_dir)
    }

    /// Returns true if the output is missing or older than the source.
    pub fn needs_update(&self) -> bool {
        let output = std::fs::metadata(self.output_file()).and_then(|m| m.modified());
        match (self.modified, output) {
            (Some(source), Ok(output)) => source > output,
            _ => true,
        }
    }

    fn to_page_ref(&self) -> PageRef {
        PageRef {
            title: self.title(),
            publish_url: self.publish_url.clone(),
            source_dir: self.source_dir.clone(),
            publish_dir: self.publish_dir.clone(),
        }
    }
}

/// All pages of a site, addressable by name.
#[derive(Debug, Default)]
pub struct PageSet {
    pages: Vec<Page>,
    by_name: HashMap<String, usize>,
}

impl PageSet {
    /// Load every `<content>/<name>/index.md`.
    ///
    /// Directories starting with `_` or `.` and directories without an
    /// `index.md` are skipped. Pages are ordered by name.
    pub fn load(config: &BlogConfig) -> Result<Self, PageError> {
        let content_dir = &config.content;
        if !content_dir.is_dir() {
            return Err(PageError::ContentNotFound(content_dir.clone()));
        }

        let entries = std::fs::read_dir(content_dir).map_err(|source| PageError::ReadDir {
            path: content_dir.clone(),
            source,
        })?;

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PageError::ReadDir {
                path: content_dir.clone(),
                source,
            })?;
            let path = entry.path();
            let hidden = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with('_') || name.starts_with('.'));
            if hidden || !path.join(PAGE_SOURCE_FILE).is_file() {
                continue;
            }
            dirs.push(path);
        }
        dirs.sort();

        let mut set = Self::default();
        for dir in dirs {
            let page = Page::load(&dir, config)?;
            tracing::debug!(page = %page.name, "loaded page");
            set.push(page);
        }
        Ok(set)
    }

    pub fn push(&mut self, page: Page) {
        self.by_name.insert(page.name.clone(), self.pages.len());
        self.pages.push(page);
    }

    pub fn get(&self, name: &str) -> Option<&Page> {
        self.by_name.get(name).map(|&index| &self.pages[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl PageResolver for PageSet {
    fn resolve(&self, name: &str) -> Option<PageRef> {
        self.get(name).map(Page::to_page_ref)
    }
}
