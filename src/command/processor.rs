use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::markup::quote_html;
use crate::util::url_join;

use super::args::{parse_args, split_command};
use super::{AssetSink, CommandProcessor, ImageInfo, PageResolver};

/// Command processor backed by the pages of a site.
///
/// Supported commands:
/// - `post_link NAME [TEXT]` links to a page, using its title as the default text
/// - `tag_archive_link TAG [TEXT]` links to the archive page of a tag
///
/// Images referenced as `page-name/file.png` are resolved relative to that
/// page, measured, and registered for copying. Results are cached per image
/// reference for the lifetime of the processor.
pub struct SiteCommandProcessor<'a> {
    pages: &'a dyn PageResolver,
    assets: &'a dyn AssetSink,
    publish_url: String,
    images: Mutex<HashMap<String, ImageInfo>>,
}

impl<'a> SiteCommandProcessor<'a> {
    pub fn new(
        pages: &'a dyn PageResolver,
        assets: &'a dyn AssetSink,
        publish_url: impl Into<String>,
    ) -> Self {
        Self {
            pages,
            assets,
            publish_url: publish_url.into(),
            images: Mutex::new(HashMap::new()),
        }
    }

    fn post_link(&self, args: &str) -> String {
        let args = parse_args(args);
        let Some(name) = args.first() else {
            return command_error("post_link command must be given a post name");
        };
        let Some(page) = self.pages.resolve(name) else {
            return command_error(&format!("post_link: post \"{}\" not found", quote_html(name)));
        };
        let text = args.get(1).cloned().unwrap_or(page.title);
        format!("<a href=\"{}\">{}</a>", page.publish_url, text)
    }

    fn tag_archive_link(&self, args: &str) -> String {
        let args = parse_args(args);
        let Some(tag) = args.first() else {
            return command_error("tag_archive_link command must be given a tag name");
        };
        let url = url_join(&[self.publish_url.as_str(), "tags", tag.as_str()]);
        let text = args.get(1).cloned().unwrap_or_else(|| url.clone());
        format!("<a href=\"{}\">{}</a>", url, text)
    }

    fn load_image(&self, id: &str) -> ImageInfo {
        let Some((page_name, file_name)) = id.split_once('/') else {
            return ImageInfo::unresolved(id);
        };
        let Some(page) = self.pages.resolve(page_name) else {
            tracing::debug!(image = id, page = page_name, "image owner not found");
            return ImageInfo::unresolved(id);
        };

        let source = page.source_dir.join(file_name);
        let dest = page.publish_dir.join(file_name);

        let (width, height) = match imagesize::size(&source) {
            Ok(size) => (Some(size.width), Some(size.height)),
            Err(e) => {
                tracing::debug!(path = %source.display(), error = %e, "could not read image size");
                (None, None)
            }
        };

        self.assets.register(&source, &dest);

        ImageInfo {
            url: url_join(&[page.publish_url.as_str(), file_name]),
            width,
            height,
        }
    }
}

impl CommandProcessor for SiteCommandProcessor<'_> {
    fn resolve_command(&self, command: &str) -> String {
        let (name, args) = split_command(command);
        match name {
            "post_link" => self.post_link(args),
            "tag_archive_link" => self.tag_archive_link(args),
            other => {
                tracing::warn!(command = other, "unknown markup command");
                command_error(&format!("UNKNOWN COMMAND: {}", quote_html(other)))
            }
        }
    }

    fn resolve_image(&self, id: &str) -> ImageInfo {
        if let Some(info) = self.images.lock().unwrap_or_else(PoisonError::into_inner).get(id) {
            return info.clone();
        }

        let info = self.load_image(id);
        self.images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), info.clone());
        info
    }
}

/// A visible inline error marker.
fn command_error(message: &str) -> String {
    format!(
        "<span style=\"background-color: #833; color: #fff;\">{}</span>",
        message
    )
}
