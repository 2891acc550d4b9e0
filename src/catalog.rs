//! Loading of the static inputs the engine works on
//!
//! This module handles:
//! - Reading embedding catalogs from disk or over HTTP
//! - Checking that a catalog has one consistent embedding dimension
//! - Reading portfolio snapshots for the anomaly scorer

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::anomaly::HoldingSnapshot;
use crate::error::{EngineError, Result};
use crate::search::CatalogEntry;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub fn load_catalog_file<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogEntry>> {
    let contents = fs::read_to_string(path.as_ref())?;
    let catalog: Vec<CatalogEntry> = serde_json::from_str(&contents)?;
    log::info!("loaded {} catalog entries from {}", catalog.len(), path.as_ref().display());
    Ok(catalog)
}

pub async fn fetch_catalog(url: &str) -> Result<Vec<CatalogEntry>> {
    let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;

    let resp = client.get(url).send().await?.error_for_status()?;
    let catalog: Vec<CatalogEntry> = resp.json().await?;
    log::info!("fetched {} catalog entries from {}", catalog.len(), url);
    Ok(catalog)
}

/// Load a catalog from an `http(s)://` URL or a local path.
pub async fn load_catalog(source: &str) -> Result<Vec<CatalogEntry>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        fetch_catalog(source).await
    } else {
        load_catalog_file(source)
    }
}

/// Every embedding must share one dimension, which is returned.
pub fn validate_catalog(catalog: &[CatalogEntry]) -> Result<usize> {
    let Some(first) = catalog.first() else {
        return Err(EngineError::InsufficientData("catalog is empty".into()));
    };
    let dim = first.embedding.len();

    if let Some(bad) = catalog.iter().find(|e| e.embedding.len() != dim) {
        log::warn!("catalog entry {} has dimension {}, expected {}", bad.id, bad.embedding.len(), dim);
        return Err(EngineError::DimensionMismatch {
            expected: dim,
            found: bad.embedding.len(),
        });
    }
    Ok(dim)
}

pub fn load_holdings<P: AsRef<Path>>(path: P) -> Result<Vec<HoldingSnapshot>> {
    let contents = fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&contents)?)
}
