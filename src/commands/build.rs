use blogen::build::{Builder, base_path_from_config};
use blogen::config::{BlogConfig, DEFAULT_CONFIG_FILE};

use crate::BuildArgs;

pub fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    // Determine the config file path
    let config_path = args
        .config_file
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.into());
    let config_path = if config_path.is_relative() {
        std::env::current_dir()?.join(&config_path)
    } else {
        config_path
    };

    let config = BlogConfig::load_from_arg(Some(config_path.as_path()))?;
    tracing::info!(config = %config_path.display(), "loaded config");

    // Get the base path for resolving relative paths
    let base_path = base_path_from_config(&config_path);

    let builder = Builder::new(config, &base_path);
    let result = builder.build(args.force)?;

    println!(
        "Built blog to {} ({} of {} pages written, {} files copied)",
        result.output_dir.display(),
        result.written,
        result.pages,
        result.assets_copied
    );

    Ok(())
}
