//! Compilation pipeline configuration.
//!
//! Loaded from YAML or JSON. Every field has a default, so an empty document
//! is a valid configuration that enables the full pipeline.
//!
//! ```yaml
//! routing:
//!   fake_run: false
//! selection:
//!   toffoli: true
//!   cx: true
//!   bridge: true
//!   cancel_inverses: true
//! check_adjacency: true
//! durations:
//!   - { control: 0, target: 1, duration: 300.0 }
//!   - { control: 1, target: 0, duration: 420.0 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CompileError, CompileResult};
use crate::orientation::{EdgeDuration, OrientationMap};

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileConfig {
    /// Routing settings.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Which decomposition passes run.
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Run the adjacency check before and after routing.
    #[serde(default = "default_true")]
    pub check_adjacency: bool,

    /// Calibrated two-qubit gate durations. When present, they decide the
    /// native CX direction of each edge instead of the coupling map.
    #[serde(default)]
    pub durations: Vec<EdgeDuration>,
}

/// Routing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Compute the SWAP trace and final layout without rewriting.
    #[serde(default)]
    pub fake_run: bool,
}

/// Decomposition pass switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Context-aware CCX decomposition.
    #[serde(default = "default_true")]
    pub toffoli: bool,

    /// Orientation-aware CX decomposition.
    #[serde(default = "default_true")]
    pub cx: bool,

    /// SWAP decomposition with bridge and merge rewrites.
    #[serde(default = "default_true")]
    pub bridge: bool,

    /// Inverse-pair cancellation after each decomposition stage.
    #[serde(default = "default_true")]
    pub cancel_inverses: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            routing: RoutingConfig::default(),
            selection: SelectionConfig::default(),
            check_adjacency: default_true(),
            durations: Vec::new(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self { fake_run: false }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            toffoli: default_true(),
            cx: default_true(),
            bridge: default_true(),
            cancel_inverses: default_true(),
        }
    }
}

impl CompileConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(contents: &str) -> CompileResult<Self> {
        let config: CompileConfig = serde_yaml_ng::from_str(contents)
            .map_err(|e| CompileError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(contents: &str) -> CompileResult<Self> {
        let config: CompileConfig = serde_json::from_str(contents)
            .map_err(|e| CompileError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are read as JSON, anything else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CompileResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CompileError::InvalidConfiguration(format!("{}: {e}", path.display()))
        })?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Check internal consistency.
    ///
    /// A fake routing run leaves the circuit unrouted, so no decomposition
    /// pass that needs adjacent operands may follow it. Durations must form
    /// a valid [`OrientationMap`].
    pub fn validate(&self) -> CompileResult<()> {
        if self.routing.fake_run
            && (self.selection.toffoli || self.selection.cx || self.selection.bridge)
        {
            return Err(CompileError::InvalidConfiguration(
                "routing.fake_run requires selection.toffoli, selection.cx and selection.bridge to be disabled"
                    .into(),
            ));
        }
        self.orientation_map()?;
        Ok(())
    }

    /// The orientation override described by `durations`, if any.
    pub fn orientation_map(&self) -> CompileResult<Option<OrientationMap>> {
        if self.durations.is_empty() {
            return Ok(None);
        }
        OrientationMap::from_durations(self.durations.iter().copied()).map(Some)
    }
}
