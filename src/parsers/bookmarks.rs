use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{entry_list, first_i64, first_str, first_text, now_millis, ParseError};
use crate::entries::{root_folder, BookmarkCreate};

static FOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)>([^<]+)</H3>").unwrap());
static HREF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)HREF="([^"]+)""#).unwrap());
static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)>([^<]+)</A>").unwrap());
static ADD_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)ADD_DATE="([^"]+)""#).unwrap());

/// Picks the parser from the file extension.
pub fn parse_bookmarks_file(path: &Path, content: &str) -> Result<Vec<BookmarkCreate>, ParseError> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match ext.as_deref() {
        Some("json") => parse_bookmarks_json(content),
        Some("html") | Some("htm") => Ok(parse_bookmarks_html(content)),
        _ => Err(ParseError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Reads a JSON bookmark list: a bare array or `{"bookmarks": [...]}`.
pub fn parse_bookmarks_json(content: &str) -> Result<Vec<BookmarkCreate>, ParseError> {
    let doc: Value = serde_json::from_str(content)?;
    let items = entry_list(&doc, &["bookmarks"]).ok_or(ParseError::Shape("\"bookmarks\""))?;

    let entries = items
        .iter()
        .filter_map(|item| {
            let url = first_str(item, &["url", "URL", "href"]).filter(|url| !url.trim().is_empty())?;

            Some(BookmarkCreate {
                title: first_str(item, &["title", "name"]).unwrap_or_else(|| url.clone()),
                folder_path: first_str(item, &["folder", "folderPath", "parent"])
                    .unwrap_or_else(root_folder),
                add_date: Some(
                    first_i64(item, &["addDate", "add_date", "date_added"])
                        .unwrap_or_else(now_millis),
                ),
                last_visit: first_text(item, &["lastVisit", "last_visit"]),
                visit_count: first_i64(item, &["visitCount", "visit_count"]).unwrap_or(0),
                url,
            })
        })
        .collect::<Vec<_>>();

    log::debug!("parsed {} of {} bookmark items", entries.len(), items.len());
    Ok(entries)
}

/// Reads a Netscape bookmark file line by line.
///
/// `<H3>` headings open a folder nested in the current one and `</DL>`
/// closes it; the root folder is `/` and is never popped.
pub fn parse_bookmarks_html(content: &str) -> Vec<BookmarkCreate> {
    let mut folders = vec![root_folder()];
    let mut entries = vec![];

    for line in content.lines() {
        let line = line.trim();
        let upper = line.to_uppercase();

        if upper.contains("<DT><H3") {
            if let Some(name) = FOLDER_RE.captures(line).map(|caps| caps[1].to_string()) {
                let parent = folders.last().cloned().unwrap_or_else(root_folder);
                folders.push(format!("{parent}{name}/"));
            }
        }

        if upper.contains("</DL>") && folders.len() > 1 {
            folders.pop();
        }

        if upper.contains("<DT><A HREF=") {
            let url = HREF_RE.captures(line).map(|caps| caps[1].to_string());
            let title = TITLE_RE.captures(line).map(|caps| caps[1].to_string());

            if let (Some(url), Some(title)) = (url, title) {
                entries.push(BookmarkCreate {
                    url,
                    title,
                    folder_path: folders.last().cloned().unwrap_or_else(root_folder),
                    add_date: ADD_DATE_RE
                        .captures(line)
                        .and_then(|caps| caps[1].parse().ok()),
                    last_visit: None,
                    visit_count: 0,
                });
            }
        }
    }

    log::debug!("parsed {} bookmarks from html", entries.len());
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETSCAPE: &str = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<TITLE>Bookmarks</TITLE>
<H1>Bookmarks</H1>
<DL><p>
    <DT><A HREF="https://news.ycombinator.com/" ADD_DATE="1600000000">Hacker News</A>
    <DT><H3 ADD_DATE="1600000001">Work</H3>
    <DL><p>
        <DT><A HREF="https://github.com/" ADD_DATE="1600000002">GitHub</A>
        <DT><H3>Projects</H3>
        <DL><p>
            <DT><A HREF="javascript:void(0)">Bookmarklet</A>
        </DL><p>
        <DT><A HREF="https://docs.rs/">Docs</A>
    </DL><p>
    <DT><A HREF="https://example.com/">Example</A>
</DL><p>
"#;

    #[test]
    fn html_tracks_folder_nesting() {
        let bmarks = parse_bookmarks_html(NETSCAPE);
        let folders = bmarks
            .iter()
            .map(|b| (b.title.as_str(), b.folder_path.as_str()))
            .collect::<Vec<_>>();

        assert_eq!(
            folders,
            vec![
                ("Hacker News", "/"),
                ("GitHub", "/Work/"),
                ("Bookmarklet", "/Work/Projects/"),
                ("Docs", "/Work/"),
                ("Example", "/"),
            ]
        );
        assert_eq!(bmarks[0].add_date, Some(1600000000));
        assert_eq!(bmarks[3].add_date, None);
        assert!(bmarks[2].is_bookmarklet());
    }

    #[test]
    fn json_reads_aliases_and_defaults() {
        let bmarks = parse_bookmarks_json(
            r#"{"bookmarks": [
                {"href": "https://a.com", "name": "A", "parent": "/Work/", "date_added": 5, "visit_count": 3,
                 "lastVisit": 1700000000000},
                {"url": "https://b.com", "last_visit": "2024-01-02T03:04:05Z"},
                {"url": "   "},
                {"title": "missing url"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(bmarks.len(), 2);
        assert_eq!(bmarks[0].title, "A");
        assert_eq!(bmarks[0].folder_path, "/Work/");
        assert_eq!(bmarks[0].add_date, Some(5));
        assert_eq!(bmarks[0].visit_count, 3);
        assert_eq!(bmarks[0].last_visit.as_deref(), Some("1700000000000"));

        assert_eq!(bmarks[1].title, "https://b.com");
        assert_eq!(bmarks[1].folder_path, "/");
        assert!(bmarks[1].add_date.is_some());
        assert_eq!(bmarks[1].last_visit.as_deref(), Some("2024-01-02T03:04:05Z"));
    }

    #[test]
    fn file_extension_selects_parser() {
        let html = parse_bookmarks_file(Path::new("export.HTML"), NETSCAPE).unwrap();
        assert_eq!(html.len(), 5);

        let json = parse_bookmarks_file(Path::new("b.json"), r#"[{"url": "https://a.com"}]"#).unwrap();
        assert_eq!(json.len(), 1);

        assert!(matches!(
            parse_bookmarks_file(Path::new("b.csv"), ""),
            Err(ParseError::UnsupportedFormat(_))
        ));
    }
}
