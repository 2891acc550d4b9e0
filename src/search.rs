//! Embedding-based stock search.
//!
//! The catalog holds precomputed embeddings; this module only ranks them. The
//! text helpers at the bottom mirror the dashboard search box: queries shorter
//! than [`MIN_QUERY_CHARS`] are ignored and longer ones are turned into a
//! hashed bag-of-words vector before ranking.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::Result;
use crate::vector_math::cosine_similarity;

pub const DEFAULT_TOP_K: usize = 5;
pub const MIN_QUERY_CHARS: usize = 2;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("static token regex"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(alias = "symbol", alias = "ticker")]
    pub id: String,
    pub embedding: Vec<f64>,
    /// Every other field of the catalog record (name, sector, ...)
    #[serde(flatten)]
    pub metadata: HashMap<String, Value>,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, embedding: Vec<f64>) -> Self {
        CatalogEntry {
            id: id.into(),
            embedding,
            metadata: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedResult<'a> {
    #[serde(flatten)]
    pub entry: &'a CatalogEntry,
    #[serde(rename = "similarity")]
    pub score: f64,
}

/// Score every entry against `query` and keep the best `top_k`.
///
/// Ties keep catalog order.
pub fn rank_by_similarity<'a>(
    query: &[f64],
    catalog: &'a [CatalogEntry],
    top_k: usize,
) -> Result<Vec<RankedResult<'a>>> {
    let mut results = catalog
        .iter()
        .map(|entry| {
            cosine_similarity(query, &entry.embedding).map(|score| RankedResult { entry, score })
        })
        .collect::<Result<Vec<_>>>()?;

    // sort_by is stable
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(top_k);
    Ok(results)
}

/// 64-bit FNV-1a, used to bucket tokens so embeddings are stable across builds.
fn fnv1a(token: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    token
        .bytes()
        .fold(OFFSET, |hash, b| (hash ^ b as u64).wrapping_mul(PRIME))
}

/// Hashed bag-of-words embedding of free text, L2-normalized.
///
/// Returns an all-zero vector when the text has no alphanumeric tokens.
pub fn embed_text(text: &str, dim: usize) -> Vec<f64> {
    let mut v = vec![0.0; dim];
    if dim == 0 {
        return v;
    }

    let lower = text.to_lowercase();
    for token in TOKEN_RE.find_iter(&lower) {
        let bucket = (fnv1a(token.as_str()) % dim as u64) as usize;
        v[bucket] += 1.0;
    }

    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}

/// Search the catalog with a raw query string.
///
/// Short or token-less queries produce an empty result instead of an error.
pub fn search_text<'a>(
    text: &str,
    catalog: &'a [CatalogEntry],
    top_k: usize,
    dim: usize,
) -> Result<Vec<RankedResult<'a>>> {
    let query = text.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Ok(Vec::new());
    }

    let embedding = embed_text(query, dim);
    if embedding.iter().all(|x| *x == 0.0) {
        log::debug!("query {:?} has no searchable tokens", query);
        return Ok(Vec::new());
    }

    rank_by_similarity(&embedding, catalog, top_k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    fn catalog() -> Vec<CatalogEntry> {
        (0..10)
            .map(|i| {
                let angle = i as f64 * 0.3;
                CatalogEntry::new(format!("S{}", i), vec![angle.cos(), angle.sin()])
            })
            .collect()
    }

    #[test]
    fn returns_top_k_in_non_increasing_order() {
        let catalog = catalog();
        let results = rank_by_similarity(&[1.0, 0.0], &catalog, DEFAULT_TOP_K).unwrap();

        assert_eq!(results.len(), 5);
        assert_eq!(results[0].entry.id, "S0");
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn top_k_larger_than_catalog_returns_everything() {
        let catalog = catalog();
        assert_eq!(rank_by_similarity(&[0.0, 1.0], &catalog, 50).unwrap().len(), 10);
    }

    #[test]
    fn ties_keep_catalog_order() {
        let catalog = vec![
            CatalogEntry::new("A", vec![1.0, 0.0]),
            CatalogEntry::new("B", vec![0.0, 1.0]),
            CatalogEntry::new("C", vec![1.0, 0.0]),
            CatalogEntry::new("D", vec![1.0, 0.0]),
        ];
        let ids: Vec<&str> = rank_by_similarity(&[1.0, 0.0], &catalog, 4)
            .unwrap()
            .iter()
            .map(|r| r.entry.id.as_str())
            .collect();
        assert_eq!(ids, vec!["A", "C", "D", "B"]);
    }

    #[test]
    fn mismatched_entry_fails_the_search() {
        let mut catalog = catalog();
        catalog.push(CatalogEntry::new("BAD", vec![1.0, 2.0, 3.0]));
        assert!(matches!(
            rank_by_similarity(&[1.0, 0.0], &catalog, 5),
            Err(EngineError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn zero_vector_entry_fails_the_search() {
        let mut catalog = catalog();
        catalog.insert(3, CatalogEntry::new("EMPTY", vec![0.0, 0.0]));
        assert!(matches!(
            rank_by_similarity(&[1.0, 0.0], &catalog, 5),
            Err(EngineError::ZeroVector)
        ));
    }

    #[test]
    fn short_queries_are_ignored() {
        let catalog = catalog();
        assert!(search_text("a", &catalog, 5, 2).unwrap().is_empty());
        assert!(search_text("  x  ", &catalog, 5, 2).unwrap().is_empty());
        assert!(search_text("--", &catalog, 5, 2).unwrap().is_empty());
    }

    #[test]
    fn text_embedding_is_unit_length_and_stable() {
        let a = embed_text("Reliance Industries", 16);
        let b = embed_text("reliance  industries!", 16);
        let norm: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        assert_eq!(a, b);
    }

    #[test]
    fn text_search_finds_matching_embedding() {
        let dim = 64;
        let catalog = vec![
            CatalogEntry::new("HDFCBANK", embed_text("hdfc bank deposits", dim)),
            CatalogEntry::new("INFY", embed_text("infosys software services", dim)),
        ];
        let results = search_text("software", &catalog, 1, dim).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.id, "INFY");
    }

    #[test]
    fn catalog_metadata_is_flattened() {
        let json = r#"{"symbol":"TCS","name":"Tata Consultancy","sector":"IT","embedding":[0.1,0.2]}"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, "TCS");
        assert_eq!(entry.metadata["sector"], "IT");
        assert!(!entry.metadata.contains_key("embedding"));
    }
}
