//! Named failure points of the portal room.
//!
//! Application boundaries (window/GPU setup, the event loop) use
//! `anyhow::Result`; everything callers may want to match on is a
//! [`PortalError`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    /// A loaded model lacks a top-level child the scene binds a material to.
    #[error("model has no child named `{0}`")]
    MissingNode(String),

    #[error("`{0}` is not a colour (expected `#rrggbb`, `#rgb` or a known name)")]
    InvalidColor(String),

    #[error("the debug panel has no control named `{0}`")]
    UnknownControl(String),

    #[error("failed to load asset `{path}`")]
    AssetLoad {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    /// The glTF file requires an extension this loader cannot decode.
    #[error("asset `{path}` requires unsupported extension `{extension}`")]
    UnsupportedExtension { path: String, extension: String },
}

/// Why no surface texture could be acquired for a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("timed out waiting for the next surface texture")]
    Timeout,

    #[error("window is occluded")]
    Occluded,

    /// The surface must be reconfigured before the next frame.
    #[error("surface configuration is outdated")]
    Outdated,

    #[error("surface was lost")]
    Lost,

    #[error("surface texture acquisition failed validation")]
    Validation,
}

impl SurfaceError {
    /// Reconfiguring the surface is enough to recover.
    pub fn needs_reconfigure(self) -> bool {
        matches!(self, Self::Outdated | Self::Lost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_stale_surfaces_are_reconfigured() {
        assert!(SurfaceError::Outdated.needs_reconfigure());
        assert!(SurfaceError::Lost.needs_reconfigure());
        assert!(!SurfaceError::Timeout.needs_reconfigure());
        assert!(!SurfaceError::Occluded.needs_reconfigure());
        assert!(!SurfaceError::Validation.needs_reconfigure());
    }

    #[test]
    fn asset_errors_keep_their_source() {
        let err = anyhow::Error::from(PortalError::AssetLoad {
            path: "portal.glb".into(),
            source: anyhow::anyhow!("file not found"),
        });
        let chain = format!("{err:#}");
        assert!(chain.contains("portal.glb"), "{chain}");
        assert!(chain.contains("file not found"), "{chain}");
    }
}
