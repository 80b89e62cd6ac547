#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
pub mod handler;
pub mod service;

pub use error::{Result, WorkerError};
pub use handler::RecognitionWorker;
pub use service::{WorkerConfig, WorkerState};
