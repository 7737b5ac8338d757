use thiserror::Error;

/// Main error type for snort2ndjson
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Rule parsing error: {0}")]
    RuleParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConvertError {
    /// Per-line failures are skipped and counted; anything else aborts the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ConvertError::RuleParse(_) | ConvertError::Json(_))
    }
}

/// Result type alias for snort2ndjson operations
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality_split() {
        assert!(!ConvertError::RuleParse("invalid rule format".to_string()).is_fatal());
        assert!(ConvertError::Config("bad sid".to_string()).is_fatal());
        assert!(ConvertError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing"
        ))
        .is_fatal());
    }
}
