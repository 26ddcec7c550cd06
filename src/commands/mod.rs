//! CLI subcommand implementations

pub mod list;
pub mod sanitize;
pub mod search;
pub mod show;
