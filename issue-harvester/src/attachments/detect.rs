//! Attachment reference detection in issue and comment bodies.
//!
//! GitHub renders uploaded files and images as plain URLs in markdown; a
//! fixed set of URL shapes identifies them: legacy file uploads, the
//! user-images CDN, and the newer assets endpoint.

use crate::models::{Attachment, Issue};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static FILE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://github\.com/[\w-]+/[\w-]+/files/\d+/[\w.-]+\??[\w=&]*")
        .expect("hard-coded pattern compiles")
});

static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://user-images\.githubusercontent\.com/\d+/[\w.-]+\??[\w=&]*")
        .expect("hard-coded pattern compiles")
});

static ASSET_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://github\.com/[\w-]+/[\w-]+/assets/\d+")
        .expect("hard-coded pattern compiles")
});

/// Detects attachment references in one block of text.
///
/// `source` tags where the reference was found (`issue_body` or
/// `comment_<id>`). Returns attachments in the order of appearance per
/// pattern family.
#[must_use]
pub fn detect_attachments(text: &str, source: &str) -> Vec<Attachment> {
    if text.is_empty() {
        return Vec::new();
    }

    [&*FILE_URL, &*IMAGE_URL, &*ASSET_URL]
        .iter()
        .flat_map(|pattern| pattern.find_iter(text))
        .map(|found| {
            let url = found.as_str().to_string();
            let filename = extract_filename(&url);
            Attachment::detected(url, filename, source.to_string())
        })
        .collect()
}

/// Scans an issue's body and every comment body, replacing the issue's
/// attachment list with the detected set (all pending).
pub fn scan_issue(issue: &mut Issue) {
    let mut attachments = Vec::new();

    if let Some(body) = &issue.body {
        attachments.extend(detect_attachments(body, "issue_body"));
    }
    for comment in &issue.comments {
        attachments.extend(detect_attachments(
            &comment.body,
            &format!("comment_{}", comment.id),
        ));
    }

    issue.attachments = attachments;
}

/// Extracts a filename from an attachment URL: the last path segment with
/// any query string removed, falling back to a generic name.
#[must_use]
pub fn extract_filename(url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or(url);
    match without_query.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => "attachment".to_string(),
    }
}

/// Produces a filesystem-safe filename that does not collide with existing
/// files in `dir`.
///
/// Characters outside `[A-Za-z0-9.-_]` are replaced with underscores;
/// collisions get a numeric suffix before the extension.
#[must_use]
pub fn safe_filename(filename: &str, dir: &Path) -> String {
    let mut safe: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if safe.is_empty() {
        safe = "attachment".to_string();
    }

    let mut candidate = safe.clone();
    let mut counter = 1;
    while dir.join(&candidate).exists() {
        candidate = match safe.rsplit_once('.') {
            Some((stem, ext)) => format!("{stem}_{counter}.{ext}"),
            None => format!("{safe}_{counter}"),
        };
        counter += 1;
    }

    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttachmentStatus, Comment, User};
    use chrono::Utc;

    #[test]
    fn detects_legacy_file_uploads() {
        let text = "see the log: https://github.com/acme/widgets/files/123456/crash.log";
        let attachments = detect_attachments(text, "issue_body");

        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].filename, "crash.log");
        assert_eq!(attachments[0].source, "issue_body");
        assert_eq!(attachments[0].status, AttachmentStatus::Pending);
    }

    #[test]
    fn detects_user_images_and_assets() {
        let text = "![img](https://user-images.githubusercontent.com/999/shot.png) \
                    and https://github.com/acme/widgets/assets/4242";
        let attachments = detect_attachments(text, "comment_7");

        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].filename, "shot.png");
        assert_eq!(attachments[1].filename, "4242");
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(detect_attachments("", "issue_body").is_empty());
        assert!(detect_attachments("no links here", "issue_body").is_empty());
    }

    #[test]
    fn scan_issue_tags_comment_sources() {
        let mut issue = crate::models::Issue {
            number: 1,
            title: "t".to_string(),
            body: Some("https://github.com/acme/widgets/files/1/a.txt".to_string()),
            state: "open".to_string(),
            labels: vec![],
            user: User {
                login: "octocat".to_string(),
                id: 1,
            },
            comments: vec![Comment {
                id: 77,
                user: User {
                    login: "octocat".to_string(),
                    id: 1,
                },
                body: "https://github.com/acme/widgets/files/2/b.txt".to_string(),
                created_at: Utc::now(),
                updated_at: None,
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
            closed_at: None,
            repository: "widgets".to_string(),
            attachments: vec![],
        };

        scan_issue(&mut issue);

        assert_eq!(issue.attachments.len(), 2);
        assert_eq!(issue.attachments[0].source, "issue_body");
        assert_eq!(issue.attachments[1].source, "comment_77");
    }

    #[test]
    fn filename_extraction_strips_queries() {
        assert_eq!(
            extract_filename("https://github.com/a/b/files/1/report.pdf?raw=true"),
            "report.pdf"
        );
        assert_eq!(extract_filename("https://example.com/"), "attachment");
    }

    #[test]
    fn unsafe_characters_are_replaced() {
        let temp = tempfile::TempDir::new().unwrap();
        assert_eq!(safe_filename("my file (1).txt", temp.path()), "my_file__1_.txt");
        assert_eq!(safe_filename("", temp.path()), "attachment");
    }

    #[test]
    fn colliding_filenames_get_numeric_suffixes() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("log.txt"), b"first").unwrap();
        assert_eq!(safe_filename("log.txt", temp.path()), "log_1.txt");

        std::fs::write(temp.path().join("log_1.txt"), b"second").unwrap();
        assert_eq!(safe_filename("log.txt", temp.path()), "log_2.txt");
    }
}
