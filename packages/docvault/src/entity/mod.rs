pub mod audit_trail;
pub mod document;
pub mod document_version;
