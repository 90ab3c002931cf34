pub mod fingerprint;
pub mod performance;

pub use fingerprint::{ReportFingerprint, content_digest};
pub use performance::Timer;
