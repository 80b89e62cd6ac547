//! Task processing handlers.
//!
//! One worker type exists today: [`RecognitionWorker`], which drains the
//! OCR task queue. Each worker process runs one of these; tasks are
//! processed concurrently up to the configured limit.

mod recognize;

pub use recognize::RecognitionWorker;
