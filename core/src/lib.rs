pub mod doc_cache;
pub mod index;
pub mod tokenizer;

pub use doc_cache::{DocCache, DocMeta};
pub use index::{InvertedIndex, TermStats};

/// Identifier of a document, owned by the external document store.
pub type DocId = String;
