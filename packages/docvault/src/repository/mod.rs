//! Typed access to the document tables.
//!
//! Every repository borrows a `ConnectionTrait`, so the same code runs against
//! the pool or inside an open transaction.

mod audit;
mod document;
mod version;

pub use audit::AuditRepository;
pub use document::DocumentRepository;
pub use version::VersionRepository;
