//! Error types for loading scenes and configuration

use thiserror::Error;

/// Errors that can occur when reading or validating a scene file
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Duplicate object id '{0}'")]
    DuplicateId(String),

    #[error("Object '{id}' has a negative {dimension} ({value})")]
    NegativeSize {
        id: String,
        dimension: &'static str,
        value: f64,
    },

    #[error("Fixed object '{id}' is not in the scene{}", format_suggestions(.suggestions))]
    UnknownFixedObject { id: String, suggestions: Vec<String> },

    #[error("Unsupported scene format '{0}' (expected .json or .toml)")]
    UnsupportedFormat(String),
}

/// Errors that can occur when loading a detector configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SceneError {
    /// Get suggestions if available
    pub fn suggestions(&self) -> Option<&[String]> {
        match self {
            Self::UnknownFixedObject { suggestions, .. } => Some(suggestions),
            _ => None,
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean {}?)", suggestions.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fixed_object_with_suggestions() {
        let err = SceneError::UnknownFixedObject {
            id: "heder".to_string(),
            suggestions: vec!["header".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Fixed object 'heder' is not in the scene (did you mean header?)"
        );
        assert_eq!(err.suggestions(), Some(&["header".to_string()][..]));
    }

    #[test]
    fn test_unknown_fixed_object_without_suggestions() {
        let err = SceneError::UnknownFixedObject {
            id: "zzz".to_string(),
            suggestions: vec![],
        };
        assert_eq!(err.to_string(), "Fixed object 'zzz' is not in the scene");
    }

    #[test]
    fn test_negative_size_message() {
        let err = SceneError::NegativeSize {
            id: "card".to_string(),
            dimension: "width",
            value: -4.0,
        };
        assert_eq!(err.to_string(), "Object 'card' has a negative width (-4)");
    }

    #[test]
    fn test_config_read_error_message() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ConfigError::from(missing);
        assert!(matches!(err, ConfigError::Io(_)));
        assert_eq!(err.to_string(), "Failed to read config: no such file");
    }
}
