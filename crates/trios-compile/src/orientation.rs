//! Per-edge native CX direction, independent of the adjacency relation.
//!
//! Calibration data often disagrees with the direction a topology was
//! declared in. An [`OrientationMap`] overrides [`CouplingMap::orientation`]
//! when present in the [`PropertySet`](crate::PropertySet).

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::coupling::{CouplingMap, Orientation};
use crate::error::{CompileError, CompileResult};

/// A calibrated two-qubit gate duration between two physical qubits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeDuration {
    /// Control qubit of the measured gate.
    pub control: u32,
    /// Target qubit of the measured gate.
    pub target: u32,
    /// Duration in device units.
    pub duration: f64,
}

/// Set of natively oriented `(control, target)` pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrientationMap {
    native: FxHashSet<(u32, u32)>,
}

impl OrientationMap {
    /// Take the orientation declared by the coupling map's edges.
    pub fn from_coupling_map(coupling_map: &CouplingMap) -> Self {
        Self {
            native: coupling_map.edges().iter().copied().collect(),
        }
    }

    /// Derive native directions from measured gate durations.
    ///
    /// For each pair the faster direction is native. A pair measured in one
    /// direction only is native in that direction. Equal durations make the
    /// edge natively bidirectional.
    pub fn from_durations(durations: impl IntoIterator<Item = EdgeDuration>) -> CompileResult<Self> {
        let mut measured: Vec<EdgeDuration> = Vec::new();
        for d in durations {
            if !d.duration.is_finite() || d.duration <= 0.0 {
                return Err(CompileError::InvalidConfiguration(format!(
                    "duration for {}->{} must be positive, got {}",
                    d.control, d.target, d.duration
                )));
            }
            if d.control == d.target {
                return Err(CompileError::InvalidConfiguration(format!(
                    "self-loop on qubit {}",
                    d.control
                )));
            }
            if measured
                .iter()
                .any(|m| m.control == d.control && m.target == d.target)
            {
                return Err(CompileError::InvalidConfiguration(format!(
                    "duplicate duration for {}->{}",
                    d.control, d.target
                )));
            }
            measured.push(d);
        }

        let mut native = FxHashSet::default();
        for d in &measured {
            let reverse = measured
                .iter()
                .find(|m| m.control == d.target && m.target == d.control);
            match reverse {
                Some(r) if r.duration < d.duration => {}
                _ => {
                    native.insert((d.control, d.target));
                }
            }
        }
        Ok(Self { native })
    }

    /// Mark `control -> target` as native.
    pub fn set_native(&mut self, control: u32, target: u32) {
        self.native.insert((control, target));
    }

    /// Whether `control -> target` is natively calibrated.
    pub fn is_native(&self, control: u32, target: u32) -> bool {
        self.native.contains(&(control, target))
    }

    /// Direction of `control -> target`; fails for uncalibrated pairs.
    pub fn orientation(&self, control: u32, target: u32) -> CompileResult<Orientation> {
        if self.is_native(control, target) {
            Ok(Orientation::Forward)
        } else if self.is_native(target, control) {
            Ok(Orientation::Backward)
        } else {
            Err(CompileError::NotAdjacent {
                gate: "cx".into(),
                qubits: vec![control, target],
            })
        }
    }
}
