use crate::types::ScanReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version constants for cache invalidation
pub mod versions {
    pub const FORMATCHECK_VERSION: &str = env!("CARGO_PKG_VERSION");
    /// Bump when locator or rule semantics change
    pub const RULES_VERSION: &str = "1.0.0";
}

/// Report cache key (document bytes + checklist → report)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ReportCacheKey {
    pub document_hash: String,
    pub checklist_hash: String,
    pub formatcheck_version: String,
    pub rules_version: String,
}

impl ReportCacheKey {
    pub fn new(document_hash: String, checklist_hash: String) -> Self {
        Self {
            document_hash,
            checklist_hash,
            formatcheck_version: versions::FORMATCHECK_VERSION.to_string(),
            rules_version: versions::RULES_VERSION.to_string(),
        }
    }

    /// Compute cache key hash for storage
    pub fn to_cache_hash(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(&self.document_hash);
        hasher.update(&self.checklist_hash);
        hasher.update(&self.formatcheck_version);
        hasher.update(&self.rules_version);
        format!("{:x}", hasher.finalize())
    }
}

/// Cached report with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportCacheValue {
    pub report: ScanReport,
    pub created_at: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub cache_version: String,
}

impl ReportCacheValue {
    pub fn new(report: ScanReport, processing_time_ms: u64) -> Self {
        Self {
            report,
            created_at: Utc::now(),
            processing_time_ms,
            cache_version: versions::FORMATCHECK_VERSION.to_string(),
        }
    }
}
