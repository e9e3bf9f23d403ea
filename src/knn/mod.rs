pub mod distance;
pub mod search;

pub use distance::DistanceFn;
pub use search::{knn_search, EmbeddedLabel, Neighbour};
