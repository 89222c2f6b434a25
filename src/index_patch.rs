use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::dates::short_date;

pub const RECENT_BLOGS_HEADING: &str = "<h2>Recent Blogs</h2>";
pub const BODY_CLOSE: &str = "</body>";

lazy_static! {
    static ref RECENT_BLOGS_LIST: Regex = Regex::new(r"<h2>Recent Blogs</h2>\s*<ul>").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlogLinkEntry {
    pub display_date: String,
    pub title: String,
    pub path: String,
}

impl BlogLinkEntry {
    pub fn new(title: &str, path: &str, date: &DateTime<Utc>) -> Self {
        Self {
            display_date: short_date(date),
            title: title.to_string(),
            path: path.to_string(),
        }
    }

    pub fn list_item(&self) -> String {
        format!(r#"<li><a href="{}">{}: {}</a></li>"#, self.path, self.display_date, self.title)
    }
}

/// Adds `entry` to the "Recent Blogs" list of a theme page.
///
/// The entry goes right below the `<ul>` that follows the heading, so the list
/// reads newest first. Pages without the heading get a new section in front of
/// `</body>`. A page with neither is returned untouched.
pub fn patch_index(existing: &str, entry: &BlogLinkEntry) -> String {
    let item = format!("    {}", entry.list_item());

    if existing.contains(RECENT_BLOGS_HEADING) {
        // Heading without a list right after it: leave the page alone rather than add a second section
        return match RECENT_BLOGS_LIST.find(existing) {
            Some(list_open) => {
                let mut patched = String::with_capacity(existing.len() + item.len() + 1);
                patched.push_str(&existing[..list_open.end()]);
                patched.push('\n');
                patched.push_str(&item);
                patched.push_str(&existing[list_open.end()..]);
                patched
            }
            None => existing.to_string(),
        };
    }

    let section = format!("  {}\n  <ul>\n{}\n  </ul>\n{}", RECENT_BLOGS_HEADING, item, BODY_CLOSE);
    existing.replacen(BODY_CLOSE, &section, 1)
}
