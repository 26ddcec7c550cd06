//! mdxprep: content pipeline for a portfolio blog
//!
//! Posts live as JSON records in a hosted document tree and are rendered as
//! MDX-ish markup on every page view. This crate sanitizes raw post bodies
//! so a strict markup compiler never crashes on author sloppiness, and
//! carries the supporting pieces around that pass: the post record model,
//! snapshot-backed store access, markdown rendering with highlighting, and
//! a small CLI for authoring and debugging workflows.

pub mod commands;
pub mod config;
pub mod content;
pub mod render;
pub mod sanitize;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::JsonStore;
use render::MarkdownRenderer;

/// The site content pipeline
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
}

impl Site {
    /// Create a pipeline rooted at a directory, loading `_config.yml` when
    /// one is present.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self { config, base_dir })
    }

    /// Open the content store named by the configuration
    pub fn store(&self) -> Result<JsonStore> {
        let store = match &self.config.content_dir {
            Some(dir) => JsonStore::from_dir(&self.base_dir.join(dir))?,
            None => JsonStore::from_file(&self.base_dir.join(&self.config.content_file))?,
        };
        Ok(store)
    }

    /// Build a renderer with the configured highlight theme
    pub fn renderer(&self) -> MarkdownRenderer {
        MarkdownRenderer::with_theme(&self.config.highlight.theme)
    }
}
