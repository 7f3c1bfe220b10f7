use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

const SITE_PATH_MAX: usize = 40;
const HIGHLIGHT_OPEN: &str = "<span class=\"highlight\">";
const HIGHLIGHT_CLOSE: &str = "</span>";

pub fn split_url(url: &str) -> Option<(&str, &str)> {
    let scheme_end = url.find("://")?;
    if scheme_end == 0 {
        return None;
    }
    let after_scheme = scheme_end + 3;
    let rest = &url[after_scheme..];
    let host_len = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    if host_len == 0 {
        return None;
    }
    let origin_end = after_scheme + host_len;
    let tail = &url[origin_end..];
    let path_end = tail.find(['?', '#']).unwrap_or(tail.len());
    Some((&url[..origin_end], &tail[..path_end]))
}

fn host_of(origin: &str) -> &str {
    origin
        .split_once("://")
        .map(|(_, host)| host)
        .unwrap_or(origin)
}

pub fn site_name(url: &str) -> String {
    let Some((origin, path)) = split_url(url) else {
        return String::new();
    };

    let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
    let site_index = parts.iter().position(|part| {
        part.eq_ignore_ascii_case("sites") || part.eq_ignore_ascii_case("teams")
    });

    if let Some(index) = site_index {
        if let Some(site) = parts.get(index + 1) {
            return (*site).to_string();
        }
    }

    host_of(origin)
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}

pub fn format_path(url: &str) -> String {
    match split_url(url) {
        Some((_, "")) => "/".to_string(),
        Some((_, path)) => path.to_string(),
        None => url.to_string(),
    }
}

pub fn site_path_line(url: &str) -> String {
    let site = site_name(url);
    let path = format_path(url);
    let line = if site.is_empty() {
        path
    } else {
        format!("{site} - {path}")
    };
    truncate(&line, SITE_PATH_MAX)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Author fields look like `Display Name | account`; the second part is shown.
pub fn author_name(author: &str) -> &str {
    match author.split('|').nth(1) {
        Some(name) => name.trim(),
        None => author,
    }
}

pub fn size_kb(bytes: u64) -> String {
    format!("{} KB", (bytes as f64 / 1024.0).round() as u64)
}

const ELLIPSIS_MARKER: &str = "<ddd/>";

fn service_highlight() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| match Regex::new(r"<c0>(.*?)</c0>") {
            Ok(pattern) => Some(pattern),
            Err(error) => {
                tracing::error!(%error, "service highlight pattern rejected");
                None
            }
        })
        .as_ref()
}

pub fn highlight_summary(summary: &str, query: &str) -> String {
    if summary.is_empty() || query.trim().is_empty() {
        return summary.to_string();
    }

    let clean = summary.replace(ELLIPSIS_MARKER, "...");
    if clean.contains("<c0>") {
        return match service_highlight() {
            Some(markers) => markers
                .replace_all(&clean, format!("{HIGHLIGHT_OPEN}$1{HIGHLIGHT_CLOSE}").as_str())
                .into_owned(),
            None => clean,
        };
    }

    let terms: Vec<String> = query
        .split_whitespace()
        .filter(|term| term.chars().count() > 2)
        .map(regex::escape)
        .collect();
    if terms.is_empty() {
        return clean;
    }

    let pattern = format!("({})", terms.join("|"));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(matcher) => matcher
            .replace_all(&clean, format!("{HIGHLIGHT_OPEN}$1{HIGHLIGHT_CLOSE}").as_str())
            .into_owned(),
        Err(error) => {
            tracing::debug!(%error, "highlight pattern rejected");
            clean
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{author_name, format_path, highlight_summary, site_name, site_path_line, size_kb};

    #[test]
    fn site_name_prefers_sites_segment() {
        assert_eq!(
            site_name("https://contoso.sharepoint.com/sites/Finance/Shared Documents/a.docx"),
            "Finance"
        );
        assert_eq!(site_name("https://contoso.sharepoint.com/Shared/a.docx"), "contoso");
        assert_eq!(site_name("not a url"), "");
    }

    #[test]
    fn format_path_strips_origin() {
        assert_eq!(
            format_path("https://contoso.sharepoint.com/sites/hr/a.pdf?web=1"),
            "/sites/hr/a.pdf"
        );
        assert_eq!(format_path("relative/a.pdf"), "relative/a.pdf");
    }

    #[test]
    fn long_site_path_is_truncated() {
        let line = site_path_line(
            "https://contoso.sharepoint.com/sites/hr/Shared Documents/Policies/2024/handbook.pdf",
        );
        assert_eq!(line.chars().count(), 40);
        assert!(line.ends_with("..."));
        assert!(line.starts_with("hr - /sites/hr/"));
    }

    #[test]
    fn author_and_size_formatting() {
        assert_eq!(author_name("Ada Lovelace | ada@contoso.com"), "ada@contoso.com");
        assert_eq!(author_name("Ada"), "Ada");
        assert_eq!(size_kb(2048), "2 KB");
    }

    #[test]
    fn service_markers_become_spans() {
        assert_eq!(
            highlight_summary("the <c0>budget</c0> plan<ddd/>", "budget"),
            "the <span class=\"highlight\">budget</span> plan..."
        );
    }

    #[test]
    fn query_terms_are_highlighted_when_markers_absent() {
        assert_eq!(
            highlight_summary("Annual Budget for Q4", "budget q4"),
            "Annual <span class=\"highlight\">Budget</span> for Q4"
        );
    }

    #[test]
    fn unterminated_service_marker_is_left_in_place() {
        assert_eq!(
            highlight_summary("<c0>budget plan<ddd/>", "budget"),
            "<c0>budget plan..."
        );
    }
}
