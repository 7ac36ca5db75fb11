pub mod config;
pub mod error;
pub mod logger;
pub mod schema;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::BreedMatchError;
pub use schema::{Trait, TraitScores, FEATURE_COUNT, SCHEMA_VERSION};
pub type Result<T> = std::result::Result<T, BreedMatchError>;
