//! Typed key-value storage on NATS JetStream.
//!
//! The task status registry lives here: a KV bucket keyed by task id whose
//! values record each task's progress through the pipeline.

mod kv_bucket;
mod kv_key;
mod kv_store;
mod task_state;

pub use kv_bucket::{KvBucket, TaskStatusBucket};
pub use kv_key::{KvKey, TaskKey};
pub use kv_store::{KvEntry, KvStore, KvValue};
pub use task_state::{TaskResult, TaskResultStatus, TaskState};

/// Status registry mapping task ids to their current [`TaskState`].
pub type TaskStatusStore = KvStore<TaskKey, TaskState, TaskStatusBucket>;
