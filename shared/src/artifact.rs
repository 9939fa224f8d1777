use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::place::ResolvedPlace;

/// Output of a render call. The render boundary never fails: a map that could
/// not be composed still yields an artifact whose image reference is a
/// human-readable message and whose place lists are present but empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapArtifact {
    /// Embeddable markdown image block, or a plain error message when
    /// composition failed outright.
    pub image_reference: String,
    /// Outbound deep link into Google Maps; absent on degraded artifacts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_reference: Option<String>,
    pub resolved: Vec<ResolvedPlace>,
    pub failed: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl MapArtifact {
    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            image_reference: message.into(),
            link_reference: None,
            resolved: Vec::new(),
            failed: Vec::new(),
            generated_at: Utc::now(),
        }
    }
}
