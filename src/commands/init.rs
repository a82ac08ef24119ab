use std::path::Path;

use blogen::build::{PAGE_SOURCE_FILE, PAGE_TEMPLATE};
use blogen::config::{BlogConfig, DEFAULT_CONFIG_FILE};

use crate::InitArgs;

const DEFAULT_PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>${page_title} - ${blog_title}</title>
  <link rel="icon" href="${favicon_url}">
  <link rel="stylesheet" href="${css_url}">
</head>
<body>
  <header>
    <h1><a href="${blog_url}">${blog_title}</a></h1>
    $if{blog_subtitle:<p>${blog_subtitle}</p>:}
  </header>
  <article>
    <h2>${page_title}</h2>
    $if{page_date:<p class="date">${page_date}</p>:}
${page_content}
%{if page_tag}
    <ul class="tags">
%{foreach page_tag}
      <li><a href="${tag_url}">${tag_name}</a></li>
%{end}
    </ul>
%{end}
  </article>
</body>
</html>
"#;

const WELCOME_PAGE: &str = r#"---
title: Hello
date: 2024-01-01
tags:
  - blogen
---

# Welcome

This page lives in *pages/hello/index.md*. Edit it and run `blogen build`.

- Pages are directories with an index.md
- Templates live in templates/
"#;

pub fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = if args.path.is_relative() {
        std::env::current_dir()?.join(&args.path)
    } else {
        args.path.clone()
    };

    if !path.exists() {
        if args.create {
            std::fs::create_dir_all(&path)?;
            println!("Created directory {path}", path = path.display());
        } else {
            return Err(anyhow::anyhow!(
                "Directory does not exist: {path}",
                path = path.display()
            ));
        }
    }

    let config_file = path.join(DEFAULT_CONFIG_FILE);
    if config_file.exists() {
        return Err(anyhow::anyhow!(
            "Config file already exists: {config_file}",
            config_file = config_file.display()
        ));
    }

    let default_config = BlogConfig::default();

    println!("Initializing blog in {}", path.display());

    let config_text = serde_yaml::to_string(&default_config)?;
    std::fs::write(&config_file, config_text)?;
    println!(
        "Created config file {config_file}",
        config_file = config_file.display()
    );

    let template_file = path
        .join(&default_config.templates)
        .join(format!("{PAGE_TEMPLATE}.tpl"));
    write_new(&template_file, DEFAULT_PAGE_TEMPLATE)?;

    let page_file = path
        .join(&default_config.content)
        .join("hello")
        .join(PAGE_SOURCE_FILE);
    write_new(&page_file, WELCOME_PAGE)?;

    Ok(())
}

/// Write `content` to `path` unless the file already exists.
fn write_new(path: &Path, content: &str) -> Result<(), anyhow::Error> {
    if path.exists() {
        println!("Keeping existing {}", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    println!("Created {}", path.display());
    Ok(())
}
