// Zero-shot tagging pipeline
pub mod types;
pub mod tagger;

pub use types::{TaggedImage, TaggerError, TaggerOptions};
pub use tagger::Tagger;
