//! Show a single post by slug

use anyhow::Result;

use crate::content::ContentStore;
use crate::sanitize::sanitize;
use crate::Site;

/// Print one post: metadata plus the rendered HTML body, or just the
/// sanitized body when `raw` is set.
pub fn run(site: &Site, slug: &str, raw: bool) -> Result<()> {
    let store = site.store()?;
    let Some(post) = store.post_by_slug(slug)? else {
        anyhow::bail!("No post with slug: {}", slug);
    };

    println!("Title:    {}", post.title);
    println!("Category: {}", post.category);
    println!("Date:     {}", post.date);
    if !post.read_time.is_empty() {
        println!("Read:     {}", post.read_time);
    }
    println!();

    if raw {
        println!("{}", sanitize(&post.content));
    } else {
        println!("{}", site.renderer().render_post(&post.content));
    }

    Ok(())
}
