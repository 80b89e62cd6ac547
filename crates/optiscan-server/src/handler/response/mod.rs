//! Response bodies for the gateway routes.

mod document;
mod error_response;
mod monitor;
mod task;

pub use document::{DeleteDocumentResponse, DocumentResponse, DocumentTextResponse};
pub use error_response::ErrorResponse;
pub use monitor::{HealthResponse, ServiceHealthEntry};
pub use task::{TaskDispatchResponse, TaskStatusResponse};
