//! Content store access
//!
//! The deployed site reads the `blogs` tree of a hosted realtime database.
//! This module is the seam for that collaborator: a trait for anything that
//! can produce post records, and a JSON snapshot implementation used by the
//! local tooling and the tests.

use indexmap::IndexMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

use super::BlogPost;

/// Errors from store access
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read content snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed content snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unexpected snapshot shape: {0}")]
    Shape(String),
}

/// Access to the post collection
pub trait ContentStore {
    /// All posts, newest first
    fn all_posts(&self) -> Result<Vec<BlogPost>, StoreError>;

    /// Look up a single post by slug
    fn post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, StoreError> {
        Ok(self.all_posts()?.into_iter().find(|p| p.slug == slug))
    }

    /// Posts matching a search term; an empty term matches everything
    fn search(&self, term: &str) -> Result<Vec<BlogPost>, StoreError> {
        let posts = self.all_posts()?;
        if term.is_empty() {
            return Ok(posts);
        }
        Ok(posts.into_iter().filter(|p| p.matches(term)).collect())
    }
}

/// In-memory store backed by a JSON snapshot of the hosted tree
pub struct JsonStore {
    records: IndexMap<String, BlogPost>,
}

impl JsonStore {
    /// Load a snapshot file. Accepts the whole tree (a top-level `blogs`
    /// object of id-to-record entries) or the record map directly.
    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a snapshot from JSON text
    pub fn from_json(text: &str) -> Result<Self, StoreError> {
        let root: Value = serde_json::from_str(text)?;
        let tree = match &root {
            Value::Object(map) => match map.get("blogs") {
                Some(Value::Object(inner)) => inner,
                Some(other) => {
                    return Err(StoreError::Shape(format!(
                        "`blogs` is {}, expected an object",
                        json_kind(other)
                    )))
                }
                None => map,
            },
            other => {
                return Err(StoreError::Shape(format!(
                    "snapshot root is {}, expected an object",
                    json_kind(other)
                )))
            }
        };

        let mut records = IndexMap::new();
        for (id, value) in tree {
            match serde_json::from_value::<BlogPost>(value.clone()) {
                Ok(mut post) => {
                    if post.id.is_empty() {
                        post.id = id.clone();
                    }
                    records.insert(id.clone(), post);
                }
                Err(e) => {
                    tracing::warn!("Skipping malformed record {}: {}", id, e);
                }
            }
        }

        Ok(Self { records })
    }

    /// Load per-record `.json` files from a directory; the file stem becomes
    /// the record id.
    pub fn from_dir(dir: &Path) -> Result<Self, StoreError> {
        let mut records = IndexMap::new();

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("record")
                .to_string();
            let text = fs::read_to_string(path)?;
            match serde_json::from_str::<BlogPost>(&text) {
                Ok(mut post) => {
                    if post.id.is_empty() {
                        post.id = id.clone();
                    }
                    records.insert(id, post);
                }
                Err(e) => {
                    tracing::warn!("Skipping malformed record {:?}: {}", path, e);
                }
            }
        }

        // Walk order is platform-dependent
        records.sort_keys();

        Ok(Self { records })
    }

    /// Number of records in the snapshot
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the snapshot holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ContentStore for JsonStore {
    fn all_posts(&self) -> Result<Vec<BlogPost>, StoreError> {
        let mut posts: Vec<BlogPost> = self.records.values().cloned().collect();
        // Newest first; posts without a parseable date go last
        posts.sort_by(|a, b| match (a.parse_date(), b.parse_date()) {
            (Some(da), Some(db)) => db.cmp(&da),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        Ok(posts)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
