//! List posts in the content store

use anyhow::Result;

use crate::content::ContentStore;
use crate::Site;

/// List all posts, newest first
pub fn run(site: &Site) -> Result<()> {
    let store = site.store()?;
    let posts = store.all_posts()?;

    println!("Posts ({}):", posts.len());
    for post in posts {
        let date = post
            .parse_date()
            .map(|d| d.format(&site.config.date_format).to_string())
            .unwrap_or_else(|| post.date.clone());
        println!(
            "  {} - {} [{}] ({})",
            date,
            post.title,
            post.category,
            post.slug_or_title()
        );
    }

    Ok(())
}
