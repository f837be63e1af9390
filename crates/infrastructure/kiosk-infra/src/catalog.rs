use camino::Utf8PathBuf;
use kiosk_core::Catalog;
use reqwest::Client;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog server answered {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("catalog is not a valid slide list: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Load the slide catalog from a local path or an `http(s)://` URL.
pub async fn load_catalog(client: &Client, source: &str) -> Result<Catalog, CatalogError> {
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        let resp = client.get(source).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: source.to_string(),
                status: status.as_u16(),
            });
        }
        resp.bytes().await?.to_vec()
    } else {
        let path = Utf8PathBuf::from(source);
        tokio::fs::read(path.as_std_path())
            .await
            .map_err(|source| CatalogError::Io { path, source })?
    };

    let catalog = Catalog::from_json_slice(&bytes)?;
    info!(source, slides = catalog.len(), "catalog loaded");
    Ok(catalog)
}
