//! Version display strings and product links.

/// Renders versions and product links for blob bodies
pub trait VersionFormatter: Send + Sync {
    /// Human readable form of `version` ("40.0b2" → "40.0 Beta 2")
    fn pretty_version(&self, version: &str) -> String;

    /// Release notes page shown by `detailsUrl`
    fn product_details_url(&self, product: &str, app_version: &str) -> String;
}

/// Formatter matching the release tooling conventions
#[derive(Debug, Clone)]
pub struct DefaultVersionFormatter {
    details_root: String,
}

impl Default for DefaultVersionFormatter {
    fn default() -> Self {
        Self {
            details_root: "https://www.mozilla.org/%LOCALE%".to_string(),
        }
    }
}

impl DefaultVersionFormatter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VersionFormatter for DefaultVersionFormatter {
    fn pretty_version(&self, version: &str) -> String {
        let (base, prerelease) = split_prerelease(version);

        let mut segments: Vec<&str> = base.split('.').collect();
        while segments.len() > 2 && segments.last() == Some(&"0") {
            segments.pop();
        }
        let base = segments.join(".");

        match prerelease {
            Some((label, number)) => format!("{} {} {}", base, label, number),
            None => base,
        }
    }

    fn product_details_url(&self, product: &str, app_version: &str) -> String {
        format!(
            "{}/{}/{}/releasenotes/",
            self.details_root,
            product.to_lowercase(),
            app_version
        )
    }
}

/// Split "40.0b2" into ("40.0", Some(("Beta", "2")))
fn split_prerelease(version: &str) -> (&str, Option<(&'static str, &str)>) {
    let digits_start = version.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits_start == version.len() {
        return (version, None);
    }

    let (head, number) = version.split_at(digits_start);
    for (marker, label) in [("rc", "RC"), ("a", "Alpha"), ("b", "Beta")] {
        if let Some(base) = head.strip_suffix(marker) {
            if base.ends_with(|c: char| c.is_ascii_digit()) {
                return (base, Some((label, number)));
            }
        }
    }

    (version, None)
}
