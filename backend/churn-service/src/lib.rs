pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod openapi;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result, SchemaError, ScoringError, StartupError};
pub use models::{FeatureRecord, OneHotGroup, ScoreResult};
pub use services::{load_classifier, ChurnClassifier, Scorer};
