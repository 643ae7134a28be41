//! Blocking HTTP downloads for bootstrap scripts and toolchain archives.
use anyhow::Result;

use crate::error::ActionError;

/// Largest body accepted from a download (toolchain tarballs are ~70 MiB).
const MAX_DOWNLOAD_SIZE: u64 = 512 * 1024 * 1024;

/// Source of remote content.
pub trait Fetcher: Send + Sync + std::fmt::Debug {
    /// Download `url` and return the body.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Download`] if the request or the body read fails.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// Download `url` as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails or the body is not UTF-8.
    fn fetch_text(&self, url: &str) -> Result<String> {
        let bytes = self.fetch(url)?;
        String::from_utf8(bytes).map_err(|e| {
            ActionError::Download {
                url: url.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// [`Fetcher`] backed by [`ureq`]. No timeout or retry is applied.
#[derive(Debug)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Fetcher with ureq's default agent settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let download_err = |reason: String| ActionError::Download {
            url: url.to_string(),
            reason,
        };
        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", concat!("devsetup/", env!("CARGO_PKG_VERSION")))
            .call()
            .map_err(|e| download_err(e.to_string()))?;
        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_DOWNLOAD_SIZE)
            .read_to_vec()
            .map_err(|e| download_err(e.to_string()))?;
        Ok(bytes)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct StaticFetcher(Vec<u8>);

    impl Fetcher for StaticFetcher {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn fetch_text_decodes_utf8() {
        let f = StaticFetcher(b"#!/bin/sh\necho hi\n".to_vec());
        assert_eq!(f.fetch_text("https://x").unwrap(), "#!/bin/sh\necho hi\n");
    }

    #[test]
    fn fetch_text_rejects_binary() {
        let f = StaticFetcher(vec![0xff, 0xfe, 0x00]);
        let err = f.fetch_text("https://example.invalid/x").unwrap_err();
        assert!(err.to_string().contains("https://example.invalid/x"));
    }
}
