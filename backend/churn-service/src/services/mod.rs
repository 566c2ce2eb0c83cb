pub mod classifier;
pub mod generator;
pub mod scorer;

pub use classifier::{load_classifier, ChurnClassifier, ModelInfo};
pub use generator::{generate_record, generate_seeded};
pub use scorer::Scorer;
