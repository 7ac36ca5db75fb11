/// BreedMatch error types
#[derive(Debug, thiserror::Error)]
pub enum BreedMatchError {
    /// Dataset loading or parsing error
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Model training or inference error
    #[error("Model error: {0}")]
    Model(String),

    /// Similarity search related error
    #[error("Similarity search error: {0}")]
    Similarity(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system error
    #[error("File system error: {0}")]
    FileSystem(String),

    /// Template rendering error
    #[error("Template error: {0}")]
    Template(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BreedMatchError {
    /// Create dataset error
    pub fn dataset<S: Into<String>>(msg: S) -> Self {
        Self::Dataset(msg.into())
    }

    /// Create model error
    pub fn model<S: Into<String>>(msg: S) -> Self {
        Self::Model(msg.into())
    }

    /// Create similarity search error
    pub fn similarity<S: Into<String>>(msg: S) -> Self {
        Self::Similarity(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create file system error
    pub fn file_system<S: Into<String>>(msg: S) -> Self {
        Self::FileSystem(msg.into())
    }

    /// Create template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// True for errors caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

// HTTP response conversion (mapped to actix-web in the server crate)
impl BreedMatchError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::NotFound(_) => 404,
            Self::Dataset(_) => 500,
            Self::Model(_) => 500,
            Self::Similarity(_) => 500,
            Self::Config(_) => 500,
            Self::FileSystem(_) => 500,
            Self::Template(_) => 500,
            Self::Serialization(_) => 500,
            Self::Internal(_) => 500,
            Self::Io(_) => 500,
            Self::Json(_) => 400,
            Self::Csv(_) => 500,
            Self::Other(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(BreedMatchError::invalid_input("bad").status_code(), 400);
        assert_eq!(BreedMatchError::not_found("x").status_code(), 404);
        assert_eq!(BreedMatchError::config("x").status_code(), 500);
    }

    #[test]
    fn test_client_error() {
        assert!(BreedMatchError::invalid_input("bad").is_client_error());
        assert!(!BreedMatchError::internal("boom").is_client_error());
    }

    #[test]
    fn test_display() {
        let err = BreedMatchError::dataset("row 3: missing breed name");
        assert_eq!(err.to_string(), "Dataset error: row 3: missing breed name");
    }
}
