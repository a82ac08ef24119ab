//! Configuration type definitions.
//!
//! These types are pure data - no I/O or complex logic.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// =============================================================================
// Blog configuration
// =============================================================================

/// The contents of `blogen.yaml`.
///
/// ```yaml
/// site:
///   title: My Blog
///   url: https://example.com
///   output: _site
/// content: pages
/// templates: templates
/// vars:
///   analytics_id: abc
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    pub site: SiteConfig,
    /// Directory holding one subdirectory per page, each with an `index.md`
    #[serde(default = "default_content")]
    pub content: PathBuf,
    /// Directory holding `NAME.tpl` files
    #[serde(default = "default_templates")]
    pub templates: PathBuf,
    /// Extra variables passed to every template
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, String>,
}

impl BlogConfig {
    /// Make every relative path absolute against `base_path`.
    pub fn resolve_paths(mut self, base_path: &std::path::Path) -> Self {
        for path in [&mut self.site.output, &mut self.content, &mut self.templates] {
            if path.is_relative() {
                *path = base_path.join(&*path);
            }
        }
        self
    }
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            content: default_content(),
            templates: default_templates(),
            vars: BTreeMap::new(),
        }
    }
}

fn default_content() -> PathBuf {
    PathBuf::from("pages")
}

fn default_templates() -> PathBuf {
    PathBuf::from("templates")
}

// =============================================================================
// Site configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub author: String,
    /// Url the output directory is published at
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".into(),
            subtitle: String::new(),
            author: String::new(),
            url: default_url(),
            output: default_output(),
        }
    }
}

fn default_url() -> String {
    "/".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("_site")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_minimal_config_defaults() {
        let config: BlogConfig = serde_yaml::from_str("site:\n  title: Notes\n").unwrap();
        assert_eq!(config.site.title, "Notes");
        assert_eq!(config.site.url, "/");
        assert_eq!(config.site.output, PathBuf::from("_site"));
        assert_eq!(config.content, PathBuf::from("pages"));
        assert_eq!(config.templates, PathBuf::from("templates"));
        assert!(config.vars.is_empty());
    }

    #[test]
    fn test_missing_site_is_rejected() {
        assert!(serde_yaml::from_str::<BlogConfig>("content: pages\n").is_err());
    }

    #[test]
    fn test_resolve_paths_keeps_absolute() {
        let mut config = BlogConfig::default();
        config.templates = PathBuf::from("/etc/blog/tpl");
        let config = config.resolve_paths(Path::new("/home/me/blog"));
        assert_eq!(config.site.output, PathBuf::from("/home/me/blog/_site"));
        assert_eq!(config.content, PathBuf::from("/home/me/blog/pages"));
        assert_eq!(config.templates, PathBuf::from("/etc/blog/tpl"));
    }
}
