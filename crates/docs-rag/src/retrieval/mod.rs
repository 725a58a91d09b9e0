//! Vector index gateway and retrieval

mod index;
mod retriever;

pub use index::VectorIndex;
pub use retriever::Retriever;
