//! Canonical paths for topic views.

pub fn home() -> &'static str {
    "/"
}

pub fn topic_show(slug: &str) -> String {
    format!("/topics/{slug}")
}

/// Slug named by a topic show path, if `path` is one.
pub fn topic_slug(path: &str) -> Option<&str> {
    path.strip_prefix("/topics/")
        .filter(|slug| !slug.is_empty() && !slug.contains('/'))
}
