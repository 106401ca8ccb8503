//! Catalog provider and the session context that carries the loaded catalog.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use coffee_box_core::{Catalog, CatalogError};
use thiserror::Error;
use url::Url;

/// Path of the catalog document relative to the storefront base URL.
pub const CATALOG_PATH: &str = "static/data/catalog.json";

/// Errors that can occur while obtaining the catalog.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// The catalog request could not be sent or read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("catalog request to {url} returned status {status}")]
    Status { url: Url, status: u16 },

    /// The catalog URL could not be built.
    #[error("invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The document is not a valid catalog.
    #[error(transparent)]
    Invalid(#[from] CatalogError),
}

/// Fetches the static catalog document.
#[derive(Debug, Clone, Default)]
pub struct CatalogProvider {
    http: reqwest::Client,
}

impl CatalogProvider {
    #[must_use]
    pub const fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch the catalog from `url`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogLoadError`] on transport failure, a non-2xx status or
    /// an invalid document.
    pub async fn fetch(&self, url: &Url) -> Result<Catalog, CatalogLoadError> {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogLoadError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let catalog = Catalog::from_json(&body)?;
        tracing::debug!(
            %url,
            plans = catalog.plans.len(),
            brands = catalog.coffee_brands.len(),
            "Catalog fetched"
        );
        Ok(catalog)
    }

    /// Load the catalog from a file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogLoadError::Io`] if the file cannot be read and
    /// [`CatalogLoadError::Invalid`] if it is not a valid catalog.
    pub fn load(path: &Path) -> Result<Catalog, CatalogLoadError> {
        let body = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Catalog::from_json(&body)?)
    }
}

/// Per-session context: the catalog loaded once and shared read-only with
/// every component that needs it.
#[derive(Debug, Clone)]
pub struct Session {
    catalog: Arc<Catalog>,
}

impl Session {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    /// Fetch the catalog from a storefront and start a session with it.
    ///
    /// # Errors
    ///
    /// See [`CatalogProvider::fetch`].
    pub async fn from_storefront(
        provider: &CatalogProvider,
        base_url: &Url,
    ) -> Result<Self, CatalogLoadError> {
        let url = base_url.join(CATALOG_PATH)?;
        provider.fetch(&url).await.map(Self::new)
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// A shared handle to the catalog.
    #[must_use]
    pub fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, http::StatusCode, routing::get};

    use super::*;
    use crate::test_support::{spawn_server, unreachable_url};

    const SHIPPED_CATALOG: &str = include_str!("../../storefront/static/data/catalog.json");

    #[tokio::test]
    async fn test_session_from_storefront() {
        let router = Router::new().route(
            "/static/data/catalog.json",
            get(|| async { SHIPPED_CATALOG }),
        );
        let base = spawn_server(router).await;

        let session = Session::from_storefront(&CatalogProvider::default(), &base)
            .await
            .unwrap();
        assert!(session.catalog().plan("standard").is_some());
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let router = Router::new().route(
            "/static/data/catalog.json",
            get(|| async { StatusCode::NOT_FOUND }),
        );
        let base = spawn_server(router).await;
        let url = base.join(CATALOG_PATH).unwrap();

        let err = CatalogProvider::default().fetch(&url).await.unwrap_err();
        assert!(matches!(err, CatalogLoadError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_unreachable() {
        let url = unreachable_url().join(CATALOG_PATH).unwrap();
        let err = CatalogProvider::default().fetch(&url).await.unwrap_err();
        assert!(matches!(err, CatalogLoadError::Http(_)));
    }

    #[test]
    fn test_load_from_disk() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../storefront/static/data/catalog.json");
        let catalog = CatalogProvider::load(&path).unwrap();
        assert_eq!(catalog.coffee_brands.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let err = CatalogProvider::load(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(matches!(err, CatalogLoadError::Io { .. }));
    }

    #[test]
    fn test_session_shares_catalog() {
        let session = Session::new(Catalog::from_json(SHIPPED_CATALOG).unwrap());
        let copy = session.clone();
        assert!(Arc::ptr_eq(&session.shared_catalog(), &copy.shared_catalog()));
    }
}
