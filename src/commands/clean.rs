use blogen::build::base_path_from_config;
use blogen::config::{BlogConfig, DEFAULT_CONFIG_FILE};

use crate::CleanArgs;

pub fn run(args: &CleanArgs) -> Result<(), anyhow::Error> {
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

    // Get the base path for resolving relative paths
    let base_path = base_path_from_config(&config_path);
    let config = config.resolve_paths(&base_path);

    // Delete the generated site folder
    let site_path = config
        .site
        .output
        .canonicalize()
        .unwrap_or(config.site.output.clone());
    let base_path = base_path.canonicalize().unwrap_or(base_path);
    if base_path.starts_with(&site_path) {
        return Err(anyhow::anyhow!(
            "Refusing to delete {}: it contains the blog sources",
            site_path.display()
        ));
    }

    if site_path.exists() {
        if args.dry_run {
            println!("Would delete {}", site_path.display());
        } else {
            std::fs::remove_dir_all(&site_path)?;
            println!("Deleted {}", site_path.display());
        }
    } else {
        println!("Nothing to delete at {}", site_path.display());
    }

    Ok(())
}
