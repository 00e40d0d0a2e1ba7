//! Rewrites external sharing links into URLs that can be fetched directly.
//!
//! Only Drive-style links are recognised: an identifier in a `/d/<id>` path
//! segment or an `id=<id>` query parameter. Anything else passes through.
//! Callers that fail to load the resulting URL hide the image instead of
//! showing a placeholder.
use regex::Regex;
use std::sync::LazyLock;

pub const DIRECT_VIEW_PREFIX: &str = "https://drive.google.com/uc?export=view&id=";

static PATH_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/d/([^/?#&]+)").unwrap());
static QUERY_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?&]id=([^&#]+)").unwrap());

/// `None` and empty input stay absent; unmatched input is returned unchanged.
pub fn normalize(url: Option<&str>) -> Option<String> {
    let url = url.filter(|u| !u.is_empty())?;
    Some(match extract_id(url) {
        Some(id) => format!("{DIRECT_VIEW_PREFIX}{id}"),
        None => url.to_owned(),
    })
}

fn extract_id(url: &str) -> Option<&str> {
    PATH_ID
        .captures(url)
        .or_else(|| QUERY_ID.captures(url))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_form_is_rewritten() {
        let out = normalize(Some("https://drive.google.com/file/d/1AbC-xyz_9/view?usp=sharing"));
        assert_eq!(out.as_deref(), Some("https://drive.google.com/uc?export=view&id=1AbC-xyz_9"));
    }

    #[test]
    fn query_forms_are_rewritten() {
        let q = normalize(Some("https://drive.google.com/open?id=XYZ123"));
        assert_eq!(q.as_deref(), Some("https://drive.google.com/uc?export=view&id=XYZ123"));
        let amp = normalize(Some("https://drive.google.com/uc?export=download&id=XYZ123&foo=1"));
        assert_eq!(amp.as_deref(), Some("https://drive.google.com/uc?export=view&id=XYZ123"));
    }

    #[test]
    fn path_segment_takes_precedence_over_query() {
        let out = normalize(Some("https://host/d/PATHID?id=QUERYID"));
        assert_eq!(out.as_deref(), Some("https://drive.google.com/uc?export=view&id=PATHID"));
    }

    #[test]
    fn unknown_forms_pass_through() {
        for url in ["https://cdn.example.com/logo.png", "not a url at all", "/d/", "?id="] {
            assert_eq!(normalize(Some(url)).as_deref(), Some(url));
        }
    }

    #[test]
    fn absent_and_empty_stay_absent() {
        assert_eq!(normalize(None), None);
        assert_eq!(normalize(Some("")), None);
    }

    #[test]
    fn normalize_is_idempotent() {
        for url in [
            "https://drive.google.com/file/d/abc/view",
            "https://drive.google.com/open?id=abc",
            "https://cdn.example.com/a.jpg",
            "x?id=1&id=2",
        ] {
            let once = normalize(Some(url));
            let twice = normalize(once.as_deref());
            assert_eq!(once, twice, "not idempotent for {url}");
        }
    }
}
