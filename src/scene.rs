//! Scene files: objects plus the ids the user pinned
//!
//! Scenes and constraint lists can be stored as JSON or TOML; the format is
//! picked from the file extension.
//!
//! ```toml
//! fixed = ["title"]
//!
//! [[objects]]
//! id = "title"
//! x = 0.0
//! y = 0.0
//! width = 200.0
//! height = 40.0
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::layout::{apply_adjustments, find_similar, Adjustment, Constraint, LayoutObject};

/// A flat list of objects and the subset that must not move
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub objects: Vec<LayoutObject>,
    #[serde(default)]
    pub fixed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ConstraintFile {
    #[serde(default)]
    constraints: Vec<Constraint>,
}

/// Supported on-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFormat {
    Json,
    Toml,
}

impl SceneFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, SceneError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(SceneFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(SceneFormat::Toml),
            _ => Err(SceneError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl Scene {
    pub fn new(objects: Vec<LayoutObject>) -> Self {
        Self {
            objects,
            fixed: Vec::new(),
        }
    }

    /// Pin additional objects
    pub fn with_fixed(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for id in ids {
            let id = id.into();
            if !self.fixed.contains(&id) {
                self.fixed.push(id);
            }
        }
        self
    }

    /// Parse and validate a scene
    pub fn parse(content: &str, format: SceneFormat) -> Result<Self, SceneError> {
        let scene: Scene = match format {
            SceneFormat::Json => serde_json::from_str(content)?,
            SceneFormat::Toml => toml::from_str(content)?,
        };
        scene.validate()?;
        Ok(scene)
    }

    /// Load and validate a scene file
    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let format = SceneFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Check ids are unique, sizes non-negative and fixed ids known
    pub fn validate(&self) -> Result<(), SceneError> {
        let mut ids = HashSet::new();
        for object in &self.objects {
            if !ids.insert(object.id.as_str()) {
                return Err(SceneError::DuplicateId(object.id.clone()));
            }
            for (dimension, value) in [("width", object.width), ("height", object.height)] {
                if value < 0.0 {
                    return Err(SceneError::NegativeSize {
                        id: object.id.clone(),
                        dimension,
                        value,
                    });
                }
            }
        }

        if let Some(unknown) = self.fixed.iter().find(|id| !ids.contains(id.as_str())) {
            return Err(SceneError::UnknownFixedObject {
                id: unknown.clone(),
                suggestions: find_similar(ids.iter().copied(), unknown, 2),
            });
        }
        Ok(())
    }

    pub fn fixed_ids(&self) -> HashSet<String> {
        self.fixed.iter().cloned().collect()
    }

    /// The scene with `adjustments` applied; fixed ids are carried over
    pub fn apply(&self, adjustments: &[Adjustment]) -> Scene {
        Scene {
            objects: apply_adjustments(&self.objects, adjustments),
            fixed: self.fixed.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse a constraint list: a JSON array, or a TOML `[[constraints]]` array
pub fn parse_constraints(content: &str, format: SceneFormat) -> Result<Vec<Constraint>, SceneError> {
    match format {
        SceneFormat::Json => Ok(serde_json::from_str(content)?),
        SceneFormat::Toml => {
            let file: ConstraintFile = toml::from_str(content)?;
            Ok(file.constraints)
        }
    }
}

/// Load a constraint list from disk
pub fn load_constraints(path: &Path) -> Result<Vec<Constraint>, SceneError> {
    let format = SceneFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_constraints(&content, format)
}
