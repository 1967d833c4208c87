//! # doctree - In-memory documentation tree
//!
//! The category/document forest behind the documentation viewer: node model,
//! arena-backed tree store, id generation, sibling ordering and the validation
//! rules for new nodes.
//!
//! ## Key Features
//! - O(1) lookup, cascading delete and transactional inserts
//! - Display order recomputed on every read, ties broken by id
//! - Seed datasets in nested JSON form

pub mod draft;
pub mod error;
pub mod forest;
pub mod id;
pub mod node;
pub mod seed;
pub mod select;
pub mod sort;

// Re-export main types for easy use
pub use draft::{DocumentDraft, DraftSource};
pub use error::{TreeError, TreeResult};
pub use forest::{Forest, TreeRow};
pub use id::IdGenerator;
pub use node::{Document, DocumentFormat, DocumentSource, FilePath, Node, NodeId, NodeKind};
pub use select::initial_selection;
