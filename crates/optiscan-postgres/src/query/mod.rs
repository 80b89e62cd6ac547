//! Database query repositories.
//!
//! Repository traits provide the high-level operations the gateway and
//! worker need, implemented against [`PgClient`].
//!
//! [`PgClient`]: crate::PgClient

pub mod document;
pub mod document_text;

pub use document::DocumentRepository;
pub use document_text::{DocumentTextRepository, TextAttachOutcome};
