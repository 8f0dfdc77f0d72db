//! Deterministic storage-location derivation.
//!
//! The on-disk directory for a file-persisted store is a function of the
//! configuration's identity-relevant fields only: the embedding model, the
//! sorted sitemap URLs, and (for file-backed retrievers) the sorted document
//! paths. Two configurations that differ only in array order resolve to the
//! same location; configurations embedding under different models never do.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use toebox_core::{RetrieverProvider, RunConfig};

/// Number of hex characters kept from the identity hash.
const HASH_PREFIX_LEN: usize = 10;

/// The identity-relevant slice of a configuration.
///
/// Field order matters: the hash is computed over this struct's canonical
/// JSON encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreIdentity {
    pub document_paths: Vec<String>,
    pub embedding_model: String,
    pub sitemap_urls: Vec<String>,
}

impl StoreIdentity {
    /// Extract the identity fields from a configuration, sorting the arrays
    /// so input order never changes the result. Document paths participate
    /// only for the file-backed provider.
    pub fn from_config(config: &RunConfig) -> Self {
        let mut sitemap_urls = config.sitemap_urls.clone();
        sitemap_urls.sort();

        let mut document_paths = if config.retriever_provider == RetrieverProvider::LocalFile {
            config
                .document_paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect()
        } else {
            Vec::new()
        };
        document_paths.sort();

        Self {
            document_paths,
            embedding_model: config.embedding_model.clone(),
            sitemap_urls,
        }
    }

    /// Short hex fingerprint of the canonical JSON encoding.
    pub fn hash(&self) -> String {
        let canonical =
            serde_json::to_string(self).expect("identity fields always serialize");
        blake3::hash(canonical.as_bytes()).to_hex()[..HASH_PREFIX_LEN].to_string()
    }
}

/// The storage directory for a configuration, nested under a per-partition
/// base directory.
pub fn storage_dir(config: &RunConfig) -> PathBuf {
    config
        .index_dir
        .join(&config.user_id)
        .join(StoreIdentity::from_config(config).hash())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_sitemaps(urls: &[&str]) -> RunConfig {
        RunConfig {
            sitemap_urls: urls.iter().map(|s| s.to_string()).collect(),
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_sitemap_order_does_not_change_location() {
        let a = config_with_sitemaps(&[
            "https://example.com/a.xml",
            "https://example.com/b.xml",
        ]);
        let b = config_with_sitemaps(&[
            "https://example.com/b.xml",
            "https://example.com/a.xml",
        ]);

        assert_eq!(storage_dir(&a), storage_dir(&b));
    }

    #[test]
    fn test_document_path_order_does_not_change_location() {
        let mut a = RunConfig::default();
        a.document_paths = vec![PathBuf::from("/docs/x"), PathBuf::from("/docs/y")];
        let mut b = RunConfig::default();
        b.document_paths = vec![PathBuf::from("/docs/y"), PathBuf::from("/docs/x")];

        assert_eq!(storage_dir(&a), storage_dir(&b));
    }

    #[test]
    fn test_embedding_model_changes_location() {
        let a = config_with_sitemaps(&["https://example.com/a.xml"]);
        let mut b = config_with_sitemaps(&["https://example.com/a.xml"]);
        b.embedding_model = "openai/text-embedding-3-large".to_string();

        assert_ne!(storage_dir(&a), storage_dir(&b));
    }

    #[test]
    fn test_different_sitemaps_change_location() {
        let a = config_with_sitemaps(&["https://example.com/a.xml"]);
        let b = config_with_sitemaps(&["https://example.com/b.xml"]);

        assert_ne!(storage_dir(&a), storage_dir(&b));
    }

    #[test]
    fn test_location_nested_under_partition() {
        let mut config = config_with_sitemaps(&["https://example.com/a.xml"]);
        config.user_id = "nick".to_string();

        let dir = storage_dir(&config);
        let components: Vec<String> = dir
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        assert!(components.contains(&"vector_store".to_string()));
        assert!(components.contains(&"nick".to_string()));
    }

    #[test]
    fn test_hash_prefix_length() {
        let identity = StoreIdentity::from_config(&RunConfig::default());
        assert_eq!(identity.hash().len(), HASH_PREFIX_LEN);
    }

    #[test]
    fn test_document_paths_ignored_for_non_file_provider() {
        let mut a = RunConfig::default();
        a.retriever_provider = RetrieverProvider::Memory;
        a.document_paths = vec![PathBuf::from("/docs/x")];
        let mut b = RunConfig::default();
        b.retriever_provider = RetrieverProvider::Memory;

        assert_eq!(
            StoreIdentity::from_config(&a).hash(),
            StoreIdentity::from_config(&b).hash()
        );
    }
}
