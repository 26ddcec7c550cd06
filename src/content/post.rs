//! Blog post records

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One blog post document, shaped exactly like the records in the hosted
/// content tree (camelCase keys). `content` is the raw body as authored;
/// run it through [`crate::sanitize::sanitize`] before rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlogPost {
    /// Record id, normally the key of the record in the tree
    pub id: String,

    /// Post title
    pub title: String,

    /// Short description shown in listings
    pub description: String,

    /// Raw post body
    pub content: String,

    /// Publication date, stored as a plain string
    pub date: String,

    /// Display read time, e.g. "4 min read"
    pub read_time: String,

    /// Post category
    pub category: String,

    /// Cover image URL
    pub image: String,

    /// URL-friendly name
    pub slug: String,
}

impl BlogPost {
    /// Best-effort parse of the stored date string. Returns `None` when no
    /// known format matches; callers sort such posts last.
    pub fn parse_date(&self) -> Option<DateTime<Local>> {
        parse_date_string(&self.date)
    }

    /// The stored slug, or one derived from the title for records that
    /// predate the slug field.
    pub fn slug_or_title(&self) -> String {
        if self.slug.is_empty() {
            slug::slugify(&self.title)
        } else {
            self.slug.clone()
        }
    }

    /// Case-insensitive search over title, description, and category.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
            || self.category.to_lowercase().contains(&term)
    }
}

/// Parse a date string in the formats authors actually put in the store
fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return local_datetime(dt);
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y"];
    for fmt in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return local_datetime(d.and_hms_opt(0, 0, 0)?);
        }
    }

    // Last resort: RFC 3339 / ISO 8601
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }

    None
}

/// Interpret a naive timestamp in the local timezone
fn local_datetime(dt: NaiveDateTime) -> Option<DateTime<Local>> {
    use chrono::TimeZone;
    Local.from_local_datetime(&dt).earliest()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_record() {
        let json = r#"{
            "title": "Shipping a Side Project",
            "description": "Notes from launch week",
            "content": "Body text",
            "date": "2024-03-02",
            "readTime": "4 min read",
            "category": "Development",
            "image": "https://cdn.example.com/cover.png",
            "slug": "shipping-a-side-project"
        }"#;

        let post: BlogPost = serde_json::from_str(json).unwrap();
        assert_eq!(post.title, "Shipping a Side Project");
        assert_eq!(post.read_time, "4 min read");
        assert_eq!(post.slug, "shipping-a-side-project");
        // Missing fields fall back to defaults
        assert_eq!(post.id, "");
    }

    #[test]
    fn test_parse_date_formats() {
        for date in [
            "2024-03-02",
            "2024/03/02",
            "2024-03-02 08:15:00",
            "March 2, 2024",
            "Mar 2, 2024",
            "2024-03-02T08:15:00",
        ] {
            let post = BlogPost {
                date: date.to_string(),
                ..Default::default()
            };
            let parsed = post.parse_date().unwrap_or_else(|| panic!("{}", date));
            assert_eq!(parsed.format("%Y-%m-%d").to_string(), "2024-03-02");
        }
    }

    #[test]
    fn test_parse_date_garbage() {
        let post = BlogPost {
            date: "someday".to_string(),
            ..Default::default()
        };
        assert!(post.parse_date().is_none());
    }

    #[test]
    fn test_slug_fallback() {
        let post = BlogPost {
            title: "Hello World!".to_string(),
            ..Default::default()
        };
        assert_eq!(post.slug_or_title(), "hello-world");
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let post = BlogPost {
            title: "Designing in the Open".to_string(),
            description: "A look at public roadmaps".to_string(),
            category: "Design".to_string(),
            ..Default::default()
        };
        assert!(post.matches("design"));
        assert!(post.matches("ROADMAP"));
        assert!(!post.matches("cooking"));
    }
}
