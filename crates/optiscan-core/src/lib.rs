#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for OCR operations.
pub const TRACING_TARGET_OCR: &str = "optiscan_core::ocr";

/// Tracing target for content store operations.
pub const TRACING_TARGET_FS: &str = "optiscan_core::fs";

mod error;
mod health;

pub mod fs;
pub mod ocr;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use health::{ServiceHealth, ServiceStatus};
