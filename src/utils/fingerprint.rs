use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Integrity fingerprint attached to every generated report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportFingerprint {
    /// SHA-256 hash of the rendered report content
    pub content_hash: String,
    /// Size of the rendered content in bytes
    pub size_bytes: usize,
    /// Timestamp when the fingerprint was created
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ReportFingerprint {
    pub fn of(content: &[u8]) -> Self {
        Self {
            content_hash: content_digest(content),
            size_bytes: content.len(),
            created_at: chrono::Utc::now(),
        }
    }

    /// Check whether `content` is what this fingerprint was taken from
    pub fn matches(&self, content: &[u8]) -> bool {
        self.size_bytes == content.len() && self.content_hash == content_digest(content)
    }

    /// Get a short representation of the fingerprint for logging
    pub fn short_hash(&self) -> &str {
        &self.content_hash[..8]
    }
}

/// Hex-encoded SHA-256 digest of `content`
pub fn content_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}
