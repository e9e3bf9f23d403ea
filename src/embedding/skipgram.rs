use std::collections::HashMap;
use std::fs::{self, File};
use std::path::Path;
use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;
use tracing::info;

use super::types::{EmbeddingError, WordEmbedding};

const SHAPE_FILE: &str = "shape.txt";
const ID_FILE: &str = "id.txt";
const DATA_FILE: &str = "feature.bin";

const F32_SIZE: usize = 4;

/// Skip-gram word vectors stored as three files in one directory:
///
/// * `shape.txt` - `"<number of words> <dimensions>"`
/// * `id.txt` - the vocabulary, whitespace separated, in row order
/// * `feature.bin` - row-major little-endian `f32` matrix
///
/// The feature matrix is memory mapped, so only touched rows are paged in.
pub struct SkipGramModel {
    dims: usize,
    word_index: HashMap<String, usize>,
    data: Mmap,
}

impl SkipGramModel {
    pub fn load(dir: &Path) -> Result<Self, EmbeddingError> {
        info!("Loading word vectors from {}", dir.display());

        let shape = fs::read_to_string(dir.join(SHAPE_FILE))?;
        let (num_words, dims) = parse_shape(&shape)?;

        let ids = fs::read_to_string(dir.join(ID_FILE))?;
        let words: Vec<&str> = ids.split_whitespace().collect();
        if words.len() != num_words {
            return Err(EmbeddingError::InvalidFormat(format!(
                "{} lists {} words but {} declares {}",
                ID_FILE,
                words.len(),
                SHAPE_FILE,
                num_words
            )));
        }

        let file = File::open(dir.join(DATA_FILE))?;
        let expected = num_words * dims * F32_SIZE;
        let actual = file.metadata()?.len() as usize;
        if actual < expected {
            return Err(EmbeddingError::InvalidFormat(format!(
                "{} holds {} bytes, expected at least {}",
                DATA_FILE, actual, expected
            )));
        }
        let data = unsafe { Mmap::map(&file)? };

        let word_index = words
            .into_iter()
            .enumerate()
            .map(|(i, w)| (w.to_string(), i))
            .collect();

        info!("Loaded {} word vectors with {} dimensions", num_words, dims);
        Ok(Self { dims, word_index, data })
    }

    pub fn vocabulary_size(&self) -> usize {
        self.word_index.len()
    }
}

fn parse_shape(content: &str) -> Result<(usize, usize), EmbeddingError> {
    let mut parts = content.split_whitespace().map(|p| p.parse::<usize>());
    match (parts.next(), parts.next()) {
        (Some(Ok(words)), Some(Ok(dims))) if words > 0 && dims > 0 => Ok((words, dims)),
        _ => Err(EmbeddingError::InvalidFormat(format!(
            "{} must contain two positive integers, got {:?}",
            SHAPE_FILE,
            content.trim()
        ))),
    }
}

impl WordEmbedding for SkipGramModel {
    fn dim(&self) -> usize {
        self.dims
    }

    fn embed(&self, word: &str) -> Option<Vec<f32>> {
        let row = *self.word_index.get(word)?;
        let start = row * self.dims * F32_SIZE;
        let end = start + self.dims * F32_SIZE;

        let mut vector = vec![0.0f32; self.dims];
        LittleEndian::read_f32_into(&self.data[start..end], &mut vector);
        Some(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_model(dir: &Path, shape: &str, ids: &str, rows: &[[f32; 2]]) {
        fs::write(dir.join(SHAPE_FILE), shape).unwrap();
        fs::write(dir.join(ID_FILE), ids).unwrap();
        let mut bytes = Vec::new();
        for row in rows {
            for v in row {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
        }
        fs::write(dir.join(DATA_FILE), bytes).unwrap();
    }

    #[test]
    fn test_load_and_embed() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), "3 2\n", "cat dog fish\n", &[[1.0, 0.0], [0.0, 1.0], [0.5, 0.5]]);

        let model = SkipGramModel::load(dir.path()).unwrap();
        assert_eq!(model.dim(), 2);
        assert_eq!(model.vocabulary_size(), 3);
        assert_eq!(model.embed("dog"), Some(vec![0.0, 1.0]));
        assert_eq!(model.embed("fish"), Some(vec![0.5, 0.5]));
        assert_eq!(model.embed("bird"), None);
    }

    #[test]
    fn test_truncated_features_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), "3 2", "cat dog fish", &[[1.0, 0.0]]);
        assert!(matches!(
            SkipGramModel::load(dir.path()),
            Err(EmbeddingError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_vocabulary_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), "2 2", "cat", &[[1.0, 0.0], [0.0, 1.0]]);
        assert!(SkipGramModel::load(dir.path()).is_err());
    }

    #[test]
    fn test_parse_shape() {
        assert_eq!(parse_shape("10 300\n").unwrap(), (10, 300));
        assert!(parse_shape("10").is_err());
        assert!(parse_shape("0 300").is_err());
    }
}
