//! Key-value bucket configuration traits.

use std::time::Duration;

/// Marker trait for KV bucket configuration.
pub trait KvBucket: Clone + Send + Sync + 'static {
    /// Bucket name used in NATS KV.
    const NAME: &'static str;

    /// Human-readable description for the bucket.
    const DESCRIPTION: &'static str;

    /// Default TTL for entries in this bucket.
    /// Returns `None` for buckets where entries should not expire.
    const TTL: Option<Duration>;
}

/// Bucket for task status entries.
///
/// Entries expire after a day; terminal states older than that are only of
/// historical interest and the documents table remains the durable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TaskStatusBucket;

impl KvBucket for TaskStatusBucket {
    const NAME: &'static str = "task_status";
    const DESCRIPTION: &'static str = "OCR task status registry";
    const TTL: Option<Duration> = Some(Duration::from_secs(24 * 60 * 60)); // 24 hours
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_bucket_config() {
        assert_eq!(TaskStatusBucket::NAME, "task_status");
        assert_eq!(
            TaskStatusBucket::TTL,
            Some(Duration::from_secs(24 * 60 * 60))
        );
    }
}
