//! Worker configuration and shared state.

pub(crate) mod config;
mod state;

pub use config::WorkerConfig;
pub use state::WorkerState;
