//! Classifier seam: the external model that produces probability vectors,
//! plus the registry of models the tagger knows by name.

pub mod types;
pub mod registry;
pub mod precomputed;

pub use types::{Classifier, ClassifierDescription, ClassifierError};
pub use precomputed::PrecomputedClassifier;
