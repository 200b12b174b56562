//! URL construction for redirects and generated links.

use url::Url;

/// Absolute path made of percent-encoded `segments`, e.g. `/insights/1-abc/x.html`.
pub fn path_of(segments: &[&str]) -> String {
    // The host is a placeholder; only the path is kept.
    match Url::parse("http://localhost/") {
        Ok(mut url) => {
            if let Ok(mut path) = url.path_segments_mut() {
                path.clear().extend(segments);
            }
            url.path().to_string()
        }
        Err(_) => format!("/{}", segments.join("/")),
    }
}

/// `base` followed by the percent-encoded `segments`.
pub fn join(base: &str, segments: &[&str]) -> String {
    match Url::parse(base) {
        Ok(mut url) => {
            if let Ok(mut path) = url.path_segments_mut() {
                path.pop_if_empty().extend(segments);
            }
            url.to_string()
        }
        Err(_) => format!("{}/{}", base.trim_end_matches('/'), segments.join("/")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_encodes_segments() {
        assert_eq!(
            path_of(&["insights", "1-abc_acme", "go_seo_BusinessInsights.html"]),
            "/insights/1-abc_acme/go_seo_BusinessInsights.html"
        );
        assert_eq!(path_of(&["my cache", "a"]), "/my%20cache/a");
    }

    #[test]
    fn join_appends_to_base() {
        assert_eq!(
            join("https://app.example.com", &["acme retail", "demo"]),
            "https://app.example.com/acme%20retail/demo"
        );
        assert_eq!(
            join("https://app.example.com/", &["acme", "demo"]),
            "https://app.example.com/acme/demo"
        );
    }
}
