// Word vector models and the semantic image embedding built on them
pub mod types;
pub mod skipgram;
pub mod combine;

pub use types::{EmbeddingError, InMemoryEmbedding, WordEmbedding};
pub use skipgram::SkipGramModel;
pub use combine::{convex_combination, embed_label, find_label};
