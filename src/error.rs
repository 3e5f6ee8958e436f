//! Error taxonomy for scene construction, asset loading and the render surface
//!
//! Construction errors abort the scene build, asset errors are isolated to
//! the load that produced them, and surface errors stop the application.

use std::path::PathBuf;

use thiserror::Error;

use crate::gfx::scene::graph::NodeId;

/// Errors produced while building, texturing or presenting a scene
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    /// A primitive was configured with a non-positive dimension or too few segments
    #[error("invalid geometry parameter for {shape}: `{parameter}` = {value}")]
    InvalidGeometryParameter {
        shape: &'static str,
        parameter: &'static str,
        value: f32,
    },

    /// A texture could not be read or decoded
    #[error("failed to load asset '{}': {reason}", path.display())]
    AssetLoadFailure { path: PathBuf, reason: String },

    /// The drawable surface, adapter or device could not be created
    #[error("render surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// A graph operation referenced a node that does not exist
    #[error("no scene node with id {0:?}")]
    UnknownNode(NodeId),
}

impl SceneError {
    pub(crate) fn invalid(shape: &'static str, parameter: &'static str, value: f32) -> Self {
        Self::InvalidGeometryParameter {
            shape,
            parameter,
            value,
        }
    }

    pub(crate) fn asset(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::AssetLoadFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error must stop scene construction or rendering
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::AssetLoadFailure { .. })
    }
}

/// Result alias used across the crate
pub type Result<T, E = SceneError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_failures_are_recoverable() {
        let err = SceneError::asset("img/missing.png", "not found");
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            "failed to load asset 'img/missing.png': not found"
        );
    }

    #[test]
    fn construction_and_surface_errors_are_fatal() {
        assert!(SceneError::invalid("box", "width", -1.0).is_fatal());
        assert!(SceneError::SurfaceUnavailable("no adapter".into()).is_fatal());
    }
}
