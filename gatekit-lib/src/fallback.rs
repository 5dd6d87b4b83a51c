//! Bundled fallback snapshots of remote configuration.
//!
//! Hosts ship a static JSON snapshot of their paywall configuration with the
//! app binary. When network fetches fail, the backend serves placements from
//! the last installed snapshot instead, keeping paywalls available on
//! degraded networks. Installation is best-effort by policy.

use crate::{GatekitError, PlacementId, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A bundled static snapshot of remote paywall configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackBundle {
    /// Snapshot format version.
    pub version: u32,
    /// Raw paywall snapshots keyed by placement id.
    pub placements: HashMap<String, serde_json::Value>,
}

impl FallbackBundle {
    /// Parse a bundle from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(GatekitError::from)
    }

    /// Read and parse a bundle from a file shipped with the host app.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|err| {
            GatekitError::internal(format!("fallback file {}: {}", path.display(), err))
        })?;
        Self::from_slice(&bytes)
    }

    /// Look up the snapshot for a placement.
    pub fn get(&self, placement: &PlacementId) -> Option<&serde_json::Value> {
        self.placements.get(placement.as_str())
    }

    /// Number of placements in the snapshot.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether the snapshot carries no placements.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Serialize the bundle into the payload handed to the backend.
    pub fn into_payload(self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(GatekitError::from)
    }
}

/// Where a fallback bundle is loaded from.
#[derive(Debug, Clone)]
pub enum FallbackSource {
    /// In-memory JSON bytes (e.g. an embedded resource).
    Bytes(Vec<u8>),
    /// A file path inside the app bundle.
    File(PathBuf),
}

impl FallbackSource {
    /// Load and parse the bundle.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn load(&self) -> Result<FallbackBundle> {
        match self {
            Self::Bytes(bytes) => FallbackBundle::from_slice(bytes),
            Self::File(path) => FallbackBundle::from_file(path),
        }
    }
}
