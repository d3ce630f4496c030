//! `Link` header parsing.
//!
//! GitHub Link headers look like:
//! `<https://api.github.com/user/starred?per_page=100&page=2>; rel="next", <...&page=6>; rel="last"`

use url::Url;

/// Page numbers advertised by a `Link` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPagination {
    /// The last page number (from rel="last" link).
    pub last_page: Option<u32>,
    /// The next page number (from rel="next" link).
    pub next_page: Option<u32>,
}

impl LinkPagination {
    /// Total number of pages. Without a `last` relation the result is a
    /// single page.
    pub fn total_pages(&self) -> u32 {
        self.last_page.unwrap_or(1).max(1)
    }
}

/// Parse a `Link` header into [`LinkPagination`].
///
/// Entries are split on commas outside `<...>`, each entry's parameters on
/// semicolons. `rel` may be quoted or bare and may list several
/// space-separated relations. Entries without a `page` query parameter are
/// ignored.
pub fn parse_link_header(link_header: &str) -> LinkPagination {
    let mut info = LinkPagination::default();

    for entry in split_entries(link_header) {
        let Some((target, params)) = split_target(entry) else {
            continue;
        };
        let Some(page) = extract_page_from_url(target) else {
            continue;
        };

        for param in params.split(';') {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            if !key.trim().eq_ignore_ascii_case("rel") {
                continue;
            }
            for rel in value.trim().trim_matches('"').split_ascii_whitespace() {
                match rel.to_ascii_lowercase().as_str() {
                    "last" => info.last_page = Some(page),
                    "next" => info.next_page = Some(page),
                    _ => {}
                }
            }
        }
    }

    info
}

/// Split on commas that are not inside a `<...>` target.
fn split_entries(header: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (idx, ch) in header.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                entries.push(header[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    entries.push(header[start..].trim());
    entries.retain(|e| !e.is_empty());
    entries
}

/// Split `<target>; params` into the target and the parameter string.
fn split_target(entry: &str) -> Option<(&str, &str)> {
    let rest = entry.strip_prefix('<')?;
    let end = rest.find('>')?;
    Some((&rest[..end], &rest[end + 1..]))
}

/// Extract the `page` query parameter from an absolute or relative URL.
fn extract_page_from_url(target: &str) -> Option<u32> {
    let base = Url::parse("https://link.invalid/").ok()?;
    let url = base.join(target).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_link_header_full() {
        let header = r#"<https://api.github.com/user/starred?per_page=100&page=2>; rel="next", <https://api.github.com/user/starred?per_page=100&page=6>; rel="last""#;

        let info = parse_link_header(header);
        assert_eq!(info.next_page, Some(2));
        assert_eq!(info.last_page, Some(6));
        assert_eq!(info.total_pages(), 6);
    }

    #[test]
    fn test_parse_link_header_middle_page() {
        let header = r#"<https://api.github.com/user/starred?page=2>; rel="prev", <https://api.github.com/user/starred?page=4>; rel="next", <https://api.github.com/user/starred?page=9>; rel="last", <https://api.github.com/user/starred?page=1>; rel="first""#;

        let info = parse_link_header(header);
        assert_eq!(info.next_page, Some(4));
        assert_eq!(info.last_page, Some(9));
    }

    #[test]
    fn test_parse_link_header_only_next_is_single_page() {
        let header = r#"<https://api.github.com/user/starred?per_page=100&page=2>; rel="next""#;

        let info = parse_link_header(header);
        assert_eq!(info.next_page, Some(2));
        assert_eq!(info.last_page, None);
        assert_eq!(info.total_pages(), 1);
    }

    #[test]
    fn test_parse_link_header_empty() {
        let info = parse_link_header("");
        assert_eq!(info, LinkPagination::default());
        assert_eq!(info.total_pages(), 1);
    }

    #[test]
    fn test_parse_link_header_tolerates_spacing_and_bare_rel() {
        let header = "<https://api.github.com/user/starred?page=3>;rel=last ,<https://api.github.com/user/starred?page=2> ; REL=\"next\"";

        let info = parse_link_header(header);
        assert_eq!(info.last_page, Some(3));
        assert_eq!(info.next_page, Some(2));
    }

    #[test]
    fn test_parse_link_header_commas_inside_target() {
        let header = r#"<https://api.github.com/search?q=a,b&page=5>; rel="last""#;
        assert_eq!(parse_link_header(header).last_page, Some(5));
    }

    #[test]
    fn test_parse_link_header_multiple_relations() {
        let header = r#"<https://api.github.com/user/starred?page=2>; rel="next last""#;

        let info = parse_link_header(header);
        assert_eq!(info.next_page, Some(2));
        assert_eq!(info.last_page, Some(2));
    }

    #[test]
    fn test_parse_link_header_ignores_garbage() {
        let header = r#"garbage, <https://api.github.com/user/starred>; rel="last", <no-page>; rel="next""#;
        assert_eq!(parse_link_header(header), LinkPagination::default());
    }

    #[test]
    fn test_extract_page_from_url() {
        assert_eq!(
            extract_page_from_url("https://api.github.com/repos?page=5"),
            Some(5)
        );
        assert_eq!(
            extract_page_from_url("https://api.github.com/repos?per_page=100&page=3"),
            Some(3)
        );
        assert_eq!(extract_page_from_url("/user/starred?page=7"), Some(7));
        assert_eq!(
            extract_page_from_url("https://api.github.com/repos?per_page=100"),
            None
        );
        assert_eq!(extract_page_from_url("https://api.github.com/repos"), None);
    }
}
