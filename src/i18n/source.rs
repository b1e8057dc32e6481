use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;

use super::{LocaleCode, LocaleError};

/// Where resource documents come from.
pub trait ResourceSource: Send + Sync + 'static {
    /// Fetch the raw document for `locale`.
    fn fetch(
        &self,
        locale: &LocaleCode,
    ) -> impl Future<Output = Result<String, LocaleError>> + Send;
}

/// Fetches `<base>/<locale>.xml` from a static asset server.
#[derive(Clone, Debug)]
pub struct HttpResources {
    client: Client,
    base_url: String,
}

impl HttpResources {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|err| {
                warn!("locale assets: falling back to default HTTP client configuration ({err})");
                Client::new()
            });
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    pub fn url_for(&self, locale: &LocaleCode) -> String {
        format!("{}{}", self.base_url, locale.resource_path())
    }
}

impl ResourceSource for HttpResources {
    async fn fetch(&self, locale: &LocaleCode) -> Result<String, LocaleError> {
        let url = self.url_for(locale);
        debug!("locale assets: GET {url}");
        let unavailable = |reason: String| LocaleError::ResourceUnavailable {
            locale: locale.clone(),
            reason,
        };
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| unavailable(format!("GET {url} failed: {err}")))?;
        if !resp.status().is_success() {
            return Err(unavailable(format!("GET {url} returned {}", resp.status())));
        }
        resp.text()
            .await
            .map_err(|err| unavailable(format!("reading {url} failed: {err}")))
    }
}

/// Reads `<dir>/<locale>.xml` from the local filesystem.
#[derive(Clone, Debug)]
pub struct DirResources {
    dir: PathBuf,
}

impl DirResources {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, locale: &LocaleCode) -> PathBuf {
        self.dir.join(format!("{locale}.xml"))
    }
}

impl ResourceSource for DirResources {
    async fn fetch(&self, locale: &LocaleCode) -> Result<String, LocaleError> {
        let path = self.path_for(locale);
        debug!("locale assets: reading {}", path.display());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| LocaleError::ResourceUnavailable {
                locale: locale.clone(),
                reason: format!("{}: {err}", path.display()),
            })
    }
}

/// Source selected at startup from the command line.
#[derive(Clone, Debug)]
pub enum Resources {
    Http(HttpResources),
    Dir(DirResources),
}

impl ResourceSource for Resources {
    async fn fetch(&self, locale: &LocaleCode) -> Result<String, LocaleError> {
        match self {
            Resources::Http(source) => source.fetch(locale).await,
            Resources::Dir(source) => source.fetch(locale).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::serve;
    use super::*;

    fn code(raw: &str) -> LocaleCode {
        raw.parse().unwrap()
    }

    #[tokio::test]
    async fn http_source_fetches_locale_document() {
        let body = r#"<resources><string id="play">Play</string></resources>"#.to_owned();
        let (base, mut requests) = serve(vec![("200 OK", body.clone())]).await;

        let source = HttpResources::new(format!("{base}/"));
        let fetched = source.fetch(&code("en")).await.unwrap();

        assert_eq!(fetched, body);
        assert_eq!(requests.recv().await.unwrap(), "GET /en.xml HTTP/1.1");
    }

    #[tokio::test]
    async fn http_source_maps_missing_document_to_unavailable() {
        let (base, _requests) = serve(vec![("404 Not Found", String::new())]).await;

        let err = HttpResources::new(base).fetch(&code("xx")).await.unwrap_err();

        assert!(matches!(
            err,
            LocaleError::ResourceUnavailable { ref locale, .. } if locale.as_str() == "xx"
        ));
    }

    #[tokio::test]
    async fn http_source_maps_refused_connection_to_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = HttpResources::new(format!("http://{addr}"))
            .fetch(&code("fa"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LocaleError::ResourceUnavailable { ref locale, .. } if locale.as_str() == "fa"
        ));
    }

    #[tokio::test]
    async fn dir_source_reads_and_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("fa.xml"), "<resources/>").unwrap();
        let source = DirResources::new(dir.path());

        assert_eq!(source.fetch(&code("fa")).await.unwrap(), "<resources/>");
        let err = source.fetch(&code("xx")).await.unwrap_err();
        assert_eq!(err.locale().as_str(), "xx");
        assert!(matches!(err, LocaleError::ResourceUnavailable { .. }));
    }
}
