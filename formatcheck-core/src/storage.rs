use crate::cache::{ReportCacheKey, ReportCacheValue};
use crate::config::StorageConfig;
use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Storage abstraction for published files and cached reports
pub trait DocumentStorage {
    // Blob store: generated practice documents, keyed by file name
    fn get_blob(&self, name: &str) -> Result<Option<Vec<u8>>>;
    fn store_blob(&self, name: &str, data: &[u8]) -> Result<()>;
    /// Where a stored blob can be fetched from (the download link)
    fn blob_location(&self, name: &str) -> Option<String>;

    // Report cache (document bytes + checklist → report)
    fn get_report(&self, cache_key: &ReportCacheKey) -> Result<Option<ReportCacheValue>>;
    fn store_report(&self, cache_key: &ReportCacheKey, cache_value: &ReportCacheValue) -> Result<()>;
}

/// File-based storage implementation using a local directory
pub struct FileStorage {
    root_dir: PathBuf,
}

impl FileStorage {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        Self::open(&config.root_dir)
    }

    pub fn open(root_dir: &Path) -> Result<Self> {
        // Ensure storage directories exist
        fs::create_dir_all(root_dir.join("files"))?;
        fs::create_dir_all(root_dir.join("reports"))?;

        Ok(Self {
            root_dir: root_dir.to_path_buf(),
        })
    }

    fn blob_path(&self, name: &str) -> Result<PathBuf> {
        // Blob names are flat file names, never paths
        let file_name = Path::new(name)
            .file_name()
            .filter(|file_name| file_name.to_str() == Some(name))
            .ok_or_else(|| anyhow!("Invalid blob name: {name}"))?;
        Ok(self.root_dir.join("files").join(file_name))
    }

    fn report_path(&self, cache_key: &ReportCacheKey) -> PathBuf {
        self.root_dir
            .join("reports")
            .join(format!("{}.json", cache_key.to_cache_hash()))
    }
}

impl DocumentStorage for FileStorage {
    fn get_blob(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.blob_path(name)?;
        if path.exists() {
            Ok(Some(fs::read(path)?))
        } else {
            Ok(None)
        }
    }

    fn store_blob(&self, name: &str, data: &[u8]) -> Result<()> {
        fs::write(self.blob_path(name)?, data)?;
        Ok(())
    }

    fn blob_location(&self, name: &str) -> Option<String> {
        self.blob_path(name)
            .ok()
            .map(|path| path.to_string_lossy().into_owned())
    }

    fn get_report(&self, cache_key: &ReportCacheKey) -> Result<Option<ReportCacheValue>> {
        let path = self.report_path(cache_key);
        if path.exists() {
            let json_str = fs::read_to_string(path)?;
            let cache_value: ReportCacheValue = serde_json::from_str(&json_str)
                .map_err(|e| anyhow!("Failed to deserialize cached report: {}", e))?;
            Ok(Some(cache_value))
        } else {
            Ok(None)
        }
    }

    fn store_report(&self, cache_key: &ReportCacheKey, cache_value: &ReportCacheValue) -> Result<()> {
        let json_str = serde_json::to_string_pretty(cache_value)
            .map_err(|e| anyhow!("Failed to serialize report: {}", e))?;
        fs::write(self.report_path(cache_key), json_str)?;
        Ok(())
    }
}

/// Hash the full document bytes
pub fn calculate_document_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Calculate hash for configuration data (for the report cache key)
pub fn calculate_config_hash<T: serde::Serialize>(config: &T) -> Result<String> {
    let config_json = serde_json::to_string(config)
        .map_err(|e| anyhow!("Failed to serialize config for hashing: {}", e))?;

    let mut hasher = Sha256::new();
    hasher.update(config_json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// No-op storage implementation that disables caching and publishing
pub struct NoOpStorage;

impl Default for NoOpStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl NoOpStorage {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentStorage for NoOpStorage {
    fn get_blob(&self, _name: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn store_blob(&self, _name: &str, _data: &[u8]) -> Result<()> {
        Ok(())
    }

    fn blob_location(&self, _name: &str) -> Option<String> {
        None
    }

    fn get_report(&self, _cache_key: &ReportCacheKey) -> Result<Option<ReportCacheValue>> {
        Ok(None) // Always cache miss
    }

    fn store_report(&self, _cache_key: &ReportCacheKey, _cache_value: &ReportCacheValue) -> Result<()> {
        Ok(())
    }
}
