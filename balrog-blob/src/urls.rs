//! Download locations referenced from release blobs.
//!
//! `%OS_BOUNCER%`, `%OS_FTP%`, `%LOCALE%`, `%PRODUCT%` and `%FILENAME%` are
//! substituted by the update server per request and must be emitted verbatim.

use serde::{Deserialize, Serialize};

use crate::ReleaseCoordinate;

/// Servers that serve release files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlConfig {
    pub staging_server: String,
    pub bouncer_server: String,
    pub protocol: String,
    pub ftp_root: String,
}

impl UrlConfig {
    pub fn new<S: Into<String>, B: Into<String>>(staging_server: S, bouncer_server: B) -> Self {
        Self {
            staging_server: staging_server.into(),
            bouncer_server: bouncer_server.into(),
            protocol: "http".to_string(),
            ftp_root: "/pub/".to_string(),
        }
    }

    pub fn with_protocol<S: Into<String>>(mut self, protocol: S) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// `{protocol}://{staging}/pub/{product}/{nightly_dir}/{version}-candidates/build{n}/`
    pub fn candidates_dir(&self, coordinate: &ReleaseCoordinate, nightly_dir: &str) -> String {
        format!(
            "{}://{}{}{}/{}/{}-candidates/build{}/",
            self.protocol,
            self.staging_server,
            self.ftp_root,
            coordinate.product.to_lowercase(),
            nightly_dir,
            coordinate.version,
            coordinate.build_number
        )
    }

    /// File under the candidates `update/` tree, per platform and locale
    pub fn staging_file_url(&self, coordinate: &ReleaseCoordinate, nightly_dir: &str, filename: &str) -> String {
        format!(
            "{}update/%OS_FTP%/%LOCALE%/{}",
            self.candidates_dir(coordinate, nightly_dir),
            filename
        )
    }

    /// Bouncer lookup for `product`, which may itself be a placeholder
    pub fn bouncer_url(&self, product: &str) -> String {
        format!(
            "{}://{}/?product={}&os=%OS_BOUNCER%&lang=%LOCALE%",
            self.protocol, self.bouncer_server, product
        )
    }
}

/// Name of the complete MAR for a release
pub fn complete_mar(coordinate: &ReleaseCoordinate) -> String {
    format!(
        "{}-{}.complete.mar",
        coordinate.product.to_lowercase(),
        coordinate.version
    )
}

/// Name of the partial MAR from `previous_version` to this release
pub fn partial_mar(coordinate: &ReleaseCoordinate, previous_version: &str) -> String {
    format!(
        "{}-{}-{}.partial.mar",
        coordinate.product.to_lowercase(),
        previous_version,
        coordinate.version
    )
}

/// Bouncer product of the complete MAR
pub fn complete_bouncer_product(coordinate: &ReleaseCoordinate) -> String {
    format!("{}-{}-complete", coordinate.product.to_lowercase(), coordinate.version)
}

/// Bouncer product of the partial MAR from `previous_version`
pub fn partial_bouncer_product(coordinate: &ReleaseCoordinate, previous_version: &str) -> String {
    format!(
        "{}-{}-partial-{}",
        coordinate.product.to_lowercase(),
        coordinate.version,
        previous_version
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_urls() {
        let urls = UrlConfig::new("ftp.example.net", "download.example.net");
        let coordinate = ReleaseCoordinate::new("Firefox", "40.0", 2);

        assert_eq!(
            urls.candidates_dir(&coordinate, "nightly"),
            "http://ftp.example.net/pub/firefox/nightly/40.0-candidates/build2/"
        );
        assert_eq!(
            urls.staging_file_url(&coordinate, "nightly", &complete_mar(&coordinate)),
            "http://ftp.example.net/pub/firefox/nightly/40.0-candidates/build2/update/%OS_FTP%/%LOCALE%/firefox-40.0.complete.mar"
        );
    }

    #[test]
    fn test_bouncer_url() {
        let urls = UrlConfig::new("ftp.example.net", "download.example.net");
        let coordinate = ReleaseCoordinate::new("Firefox", "40.0", 2);

        assert_eq!(
            urls.bouncer_url(&partial_bouncer_product(&coordinate, "39.0")),
            "http://download.example.net/?product=firefox-40.0-partial-39.0&os=%OS_BOUNCER%&lang=%LOCALE%"
        );
    }
}
