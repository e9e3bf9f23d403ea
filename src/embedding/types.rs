use std::collections::HashMap;
use std::fmt;
use std::error::Error;

/// Errors raised while loading word vectors or embedding images
#[derive(Debug)]
pub enum EmbeddingError {
    /// Wraps std::io::Error for file operations
    IoError(std::io::Error),
    /// Invalid model files
    InvalidFormat(String),
    /// None of the given labels exist in the embedding vocabulary
    NothingEmbedded,
    /// Prediction scores sum to zero, so no weighted average exists
    ZeroWeight,
}

impl fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EmbeddingError::IoError(e) => write!(f, "I/O error: {}", e),
            EmbeddingError::InvalidFormat(msg) => write!(f, "Invalid word vector model: {}", msg),
            EmbeddingError::NothingEmbedded => {
                write!(f, "None of the labels are known to the word vector model")
            }
            EmbeddingError::ZeroWeight => write!(f, "Prediction scores sum to zero"),
        }
    }
}

impl Error for EmbeddingError {}

impl From<std::io::Error> for EmbeddingError {
    fn from(err: std::io::Error) -> Self {
        EmbeddingError::IoError(err)
    }
}

/// Maps words into a fixed dimensional vector space.
pub trait WordEmbedding: Send + Sync {
    /// Dimensionality of every returned vector
    fn dim(&self) -> usize;

    /// Vector for `word`, or `None` if the word is not in the vocabulary
    fn embed(&self, word: &str) -> Option<Vec<f32>>;
}

/// Word vectors kept in a hash map
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmbedding {
    dim: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl InMemoryEmbedding {
    pub fn new(dim: usize) -> Self {
        Self { dim, vectors: HashMap::new() }
    }

    /// Adds a word; vectors of the wrong length are rejected.
    pub fn insert(&mut self, word: impl Into<String>, vector: Vec<f32>) -> Result<(), EmbeddingError> {
        if vector.len() != self.dim {
            return Err(EmbeddingError::InvalidFormat(format!(
                "vector has {} dimensions, expected {}",
                vector.len(),
                self.dim
            )));
        }
        self.vectors.insert(word.into(), vector);
        Ok(())
    }
}

impl WordEmbedding for InMemoryEmbedding {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, word: &str) -> Option<Vec<f32>> {
        self.vectors.get(word).cloned()
    }
}
