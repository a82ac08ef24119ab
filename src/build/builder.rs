use std::path::{Path, PathBuf};

use chrono::Datelike;
use serde::Serialize;

use crate::command::SiteCommandProcessor;
use crate::config::BlogConfig;
use crate::markup::{parse_markup, render_markup};
use crate::template::{Context, TemplateEngine, TemplateError};
use crate::util::url_join;

use super::assets::AssetList;
use super::page::{Page, PageError, PageSet};
use super::paths::PAGE_TEMPLATE;

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("page error: {0}")]
    Page(#[from] PageError),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug)]
pub struct BuildResult {
    pub output_dir: PathBuf,
    pub pages: usize,
    pub written: usize,
    pub skipped: usize,
    pub assets_copied: usize,
}

/// Variables shared by every template.
#[derive(Serialize)]
struct CommonVars<'a> {
    blog_url: String,
    favicon_url: String,
    css_url: String,
    blog_title: &'a str,
    blog_subtitle: &'a str,
    blog_author: &'a str,
    blog_year: String,
}

#[derive(Serialize)]
struct PageVars<'a> {
    page_name: &'a str,
    page_title: String,
    page_date: String,
    page_time: String,
    page_url: &'a str,
    page_content: String,
    page_tag: Vec<TagVars>,
}

#[derive(Serialize)]
struct TagVars {
    tag_name: String,
    tag_url: String,
}

pub struct Builder {
    config: BlogConfig,
}

impl Builder {
    /// Create a builder. Relative paths in `config` resolve against `base_path`,
    /// typically the config file's directory.
    pub fn new(config: BlogConfig, base_path: &Path) -> Self {
        Self {
            config: config.resolve_paths(base_path),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.site.output
    }

    /// Render every page that changed since the last build (or all pages with
    /// `force`), then copy the files they reference.
    pub fn build(&self, force: bool) -> Result<BuildResult, BuildError> {
        let pages = PageSet::load(&self.config)?;
        println!(
            "Found {} page(s) in {}",
            pages.len(),
            self.config.content.display()
        );

        let engine = TemplateEngine::from_dir(&self.config.templates);
        let assets = AssetList::new();
        let processor = SiteCommandProcessor::new(&pages, &assets, self.config.site.url.as_str());
        let common = self.common_vars(&pages)?;

        let mut written = 0;
        let mut skipped = 0;
        for page in pages.iter() {
            // Markup is rendered even for up-to-date pages so their images get registered.
            let markup = parse_markup(&page.text);
            let content = render_markup(&markup, &processor);

            if !force && !page.needs_update() {
                tracing::debug!(page = %page.name, "page up to date");
                skipped += 1;
                continue;
            }

            let ctx = common.overlay(&self.page_vars(page, content)?);
            let html = engine.build(PAGE_TEMPLATE, &ctx)?;

            write_output(&page.output_file(), &html)?;
            tracing::info!(page = %page.name, "wrote page");
            written += 1;
        }

        let assets_copied = assets.copy_all(force);

        let output_dir = self.output_dir().to_path_buf();
        let display_output = output_dir.canonicalize().unwrap_or(output_dir.clone());
        println!(
            "Wrote {} page(s) to {} ({} up to date, {} of {} file(s) copied)",
            written,
            display_output.display(),
            skipped,
            assets_copied,
            assets.len()
        );

        Ok(BuildResult {
            output_dir,
            pages: pages.len(),
            written,
            skipped,
            assets_copied,
        })
    }

    /// Site-wide variables, with the config's `vars` laid over them.
    ///
    /// Every page also gets a `<name>_url` variable so templates can link to it.
    fn common_vars(&self, pages: &PageSet) -> Result<Context, TemplateError> {
        let site = &self.config.site;
        let url = site.url.as_str();
        let mut ctx = Context::from_serialize(&CommonVars {
            blog_url: url_join(&[url, "/"]),
            favicon_url: url_join(&[url, "favicon.png"]),
            css_url: url_join(&[url, "css", "style.css"]),
            blog_title: &site.title,
            blog_subtitle: &site.subtitle,
            blog_author: &site.author,
            blog_year: chrono::Local::now().year().to_string(),
        })?;
        for page in pages.iter() {
            ctx.insert(format!("{}_url", page.name), page.publish_url.as_str());
        }
        for (name, value) in &self.config.vars {
            ctx.insert(name.as_str(), value.as_str());
        }
        Ok(ctx)
    }

    fn page_vars(&self, page: &Page, content: String) -> Result<Context, TemplateError> {
        let date = page.date();
        let tags = page
            .tags()
            .iter()
            .map(|tag| TagVars {
                tag_name: tag.clone(),
                tag_url: url_join(&[self.config.site.url.as_str(), "tags", tag.as_str()]),
            })
            .collect();

        Context::from_serialize(&PageVars {
            page_name: &page.name,
            page_title: page.title(),
            page_date: date.date,
            page_time: date.time,
            page_url: &page.publish_url,
            page_content: content,
            page_tag: tags,
        })
    }
}

fn write_output(path: &Path, content: &str) -> Result<(), BuildError> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    };
    write().map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}
