//! Durable task queue for OCR work.

mod task;
mod task_queue;

pub use task::{OcrTask, TaskCommand};
pub use task_queue::{TaskDelivery, TaskQueue};
