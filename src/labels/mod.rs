// Label resources: where class names come from and how they are cached
pub mod types;
pub mod source;
pub mod cached;

pub use types::{LabelError, LabelTable};
pub use source::{FileLabelSource, LabelSource, StaticLabelSource};
pub use cached::{CachedLabelSource, IMAGENET_LABELS_URL};
