//! Engine options.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::util::{Error, Result, IDENTITY_TOLERANCE};

/// Options shared by the read and write paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    // Transforms
    /// Max per-component distance from identity for a transform to be elided.
    pub identity_tolerance: f64,
    /// Author a transform sample every frame, bypassing the diff cache.
    pub force_transforms: bool,

    // Primvars
    /// Broadcast constant primvars onto primitives or points.
    pub promote_constants: bool,
    /// Rename `displayColor` / `displayOpacity` to `Cd` / `Alpha`.
    pub rename_display_primvars: bool,
    /// Pattern of primvars to load when the caller passes none.
    pub primvar_pattern: String,

    // Subsets
    /// Strip a redundant `<family>_` prefix from subset names.
    pub strip_partition_prefix: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            identity_tolerance: IDENTITY_TOLERANCE,
            force_transforms: false,
            promote_constants: true,
            rename_display_primvars: true,
            primvar_pattern: "*".to_string(),
            strip_partition_prefix: true,
        }
    }
}

impl SyncOptions {
    /// Parse and validate options from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Load and validate options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Write options as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.identity_tolerance.is_finite() || self.identity_tolerance < 0.0 {
            return Err(Error::Config(format!(
                "identity_tolerance must be a finite non-negative number, got {}",
                self.identity_tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let o = SyncOptions::default();
        assert_eq!(o.identity_tolerance, 1e-10);
        assert!(o.promote_constants);
        assert!(!o.force_transforms);
        assert!(o.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let o = SyncOptions::from_json(r#"{ "force_transforms": true }"#).unwrap();
        assert!(o.force_transforms);
        assert_eq!(o.primvar_pattern, "*");
    }

    #[test]
    fn test_rejects_bad_tolerance() {
        let err = SyncOptions::from_json(r#"{ "identity_tolerance": -1.0 }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(matches!(SyncOptions::from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gusd.json");
        let o = SyncOptions {
            rename_display_primvars: false,
            ..Default::default()
        };
        o.save(&path).unwrap();
        assert_eq!(SyncOptions::load(&path).unwrap(), o);
        assert!(matches!(SyncOptions::load(dir.path().join("missing.json")), Err(Error::Io(_))));
    }
}
