//! Risk classifier: random forest over the engineered feature vector, and its on-disk artifact.

mod artifact;
pub mod forest;

pub use artifact::{ArtifactMetadata, ModelArtifact, FORMAT_VERSION};
pub use forest::{DecisionTree, ForestConfig, RandomForest, TreeNode};
