//! Sanitize markup from a file or stdin

use anyhow::Result;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::sanitize::sanitize;

/// Run the sanitizer over a file (or stdin when no file is given) and print
/// the result to stdout.
pub fn run(input: Option<&Path>) -> Result<()> {
    let raw = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    print!("{}", sanitize(&raw));
    Ok(())
}
