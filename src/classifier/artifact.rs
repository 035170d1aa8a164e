//! Persisted classifier artifact: a model paired with its feature schema.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

use super::BaggedTrees;
use crate::error::{AllotError, Result};
use crate::features::FeatureSchema;

/// Current on-disk format version.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// A trained classifier and the ordered feature names it was trained on.
///
/// Stored as JSON:
///
/// ```json
/// { "format_version": 1, "feature_names": ["..."], "model": { "n_features": 0, "trees": [] } }
/// ```
///
/// Deserialization runs [`ModelArtifact::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ArtifactData")]
pub struct ModelArtifact {
    /// Artifact layout version; only `1` is accepted.
    pub format_version: u32,
    /// Column order the model was trained on.
    pub feature_names: FeatureSchema,
    /// The fitted ensemble.
    pub model: BaggedTrees,
}

#[derive(Deserialize)]
struct ArtifactData {
    format_version: u32,
    feature_names: FeatureSchema,
    model: BaggedTrees,
}

impl TryFrom<ArtifactData> for ModelArtifact {
    type Error = AllotError;

    fn try_from(data: ArtifactData) -> Result<Self> {
        let artifact = Self {
            format_version: data.format_version,
            feature_names: data.feature_names,
            model: data.model,
        };
        artifact.validate()?;
        Ok(artifact)
    }
}

impl ModelArtifact {
    /// Pairs a model with its schema, checking they agree on width.
    pub fn new(model: BaggedTrees, feature_names: FeatureSchema) -> Result<Self> {
        let artifact = Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_names,
            model,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Checks version, model integrity, and model/schema width agreement.
    pub fn validate(&self) -> Result<()> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(AllotError::SchemaMismatch(format!(
                "unsupported artifact format version {} (expected {})",
                self.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        self.model.validate()?;
        if self.model.n_features() != self.feature_names.len() {
            return Err(AllotError::SchemaMismatch(format!(
                "model expects {} features but schema lists {}",
                self.model.n_features(),
                self.feature_names.len()
            )));
        }
        Ok(())
    }

    /// The feature schema.
    pub fn schema(&self) -> &FeatureSchema {
        &self.feature_names
    }

    /// The classifier.
    pub fn classifier(&self) -> &BaggedTrees {
        &self.model
    }

    /// Reads and validates an artifact.
    ///
    /// A missing file yields `NotReady`; unreadable, corrupt, or
    /// inconsistent content yields `Artifact`.
    pub fn read_from(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AllotError::NotReady {
                path: path.to_path_buf(),
                waited_ms: 0,
            },
            _ => AllotError::Artifact {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;
        let artifact: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| AllotError::Artifact {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(artifact)
    }

    /// Writes the artifact as JSON to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
