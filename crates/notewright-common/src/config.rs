use url::Url;

use crate::error::NotewrightError;

/// Base URL used when nothing else is configured; matches the dev backend.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/";

/// Environment variable consulted for the API base URL.
pub const API_URL_ENV: &str = "NOTEWRIGHT_API_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL every endpoint is joined onto. Always ends with `/`.
    pub base_url: Url,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self, NotewrightError> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(NotewrightError::Config(format!(
                "{base_url} cannot be used as an API base"
            )));
        }
        // Url::join drops the last path segment unless it ends in a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url })
    }

    /// Native builds read the environment at runtime, the browser build bakes
    /// the value in at compile time since there is no process environment.
    pub fn from_env() -> Result<Self, NotewrightError> {
        #[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
        let configured = std::env::var(API_URL_ENV).ok();
        #[cfg(all(target_family = "wasm", target_os = "unknown"))]
        let configured = option_env!("NOTEWRIGHT_API_URL").map(str::to_owned);

        match configured.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Self::new(url),
            _ => Self::new(DEFAULT_API_URL),
        }
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, NotewrightError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// `articles/<id>`, with the id encoded as a single path segment.
    pub fn document_endpoint(&self, id: &str) -> Result<Url, NotewrightError> {
        let mut url = self.endpoint("articles/")?;
        url.path_segments_mut()
            .map_err(|()| NotewrightError::Config("API base cannot take path segments".into()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_under_base() {
        let config = ApiConfig::new("http://localhost:8000/api").unwrap();
        assert_eq!(
            config.endpoint("articles").unwrap().as_str(),
            "http://localhost:8000/api/articles"
        );
        assert_eq!(
            config.endpoint("/articles/7").unwrap().as_str(),
            "http://localhost:8000/api/articles/7"
        );
    }

    #[test]
    fn document_id_stays_one_segment() {
        let config = ApiConfig::new("http://localhost:8000/api").unwrap();
        assert_eq!(
            config.document_endpoint("7").unwrap().as_str(),
            "http://localhost:8000/api/articles/7"
        );
        let url = config.document_endpoint("a/b?c#d").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/articles/a%2Fb%3Fc%23d");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn default_points_at_dev_backend() {
        let config = ApiConfig::new(DEFAULT_API_URL).unwrap();
        assert_eq!(
            config.endpoint("generate-article").unwrap().as_str(),
            "http://localhost:8000/api/generate-article"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(ApiConfig::new("mailto:someone@example.com").is_err());
        assert!(ApiConfig::new("not a url").is_err());
    }
}
