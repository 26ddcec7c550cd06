//! Search posts by title, description, or category

use anyhow::Result;

use crate::content::ContentStore;
use crate::Site;

/// Print posts matching a term
pub fn run(site: &Site, term: &str) -> Result<()> {
    let store = site.store()?;
    let matches = store.search(term)?;

    if matches.is_empty() {
        println!("No posts matching: {}", term);
        return Ok(());
    }

    println!("Matches ({}):", matches.len());
    for post in matches {
        println!("  {} [{}] - {}", post.title, post.category, post.description);
    }

    Ok(())
}
