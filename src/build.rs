mod assets;
mod builder;
mod page;
mod paths;

pub use assets::{AssetCopy, AssetList, is_source_newer};
pub use builder::{BuildError, BuildResult, Builder};
pub use page::{FrontMatter, Page, PageDate, PageError, PageSet, ParsedContent, parse_front_matter};
pub use paths::{PAGE_OUTPUT_FILE, PAGE_SOURCE_FILE, PAGE_TEMPLATE, base_path_from_config, page_output_file};
