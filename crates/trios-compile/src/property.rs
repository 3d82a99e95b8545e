//! `PropertySet` and related types for pass communication.
//!
//! The [`PropertySet`] is the shared context passed through all compilation
//! passes. It holds the target description (coupling map, optional
//! orientation override), the mapping state produced by layout and routing,
//! and arbitrary typed analysis results.
//!
//! # Examples
//!
//! ```
//! use trios_compile::{CouplingMap, Layout, PropertySet};
//! use trios_ir::QubitId;
//!
//! let props = PropertySet::new()
//!     .with_coupling_map(CouplingMap::linear(5))
//!     .with_layout(Layout::trivial(5));
//!
//! let layout = props.layout.as_ref().unwrap();
//! assert_eq!(layout.physical_of(QubitId(3)), Some(3));
//! ```
//!
//! Custom properties are keyed by type:
//!
//! ```
//! use trios_compile::PropertySet;
//!
//! #[derive(Debug, PartialEq)]
//! struct Visits(usize);
//!
//! let mut props = PropertySet::new();
//! props.insert(Visits(3));
//! assert_eq!(props.get::<Visits>(), Some(&Visits(3)));
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};

use trios_ir::QubitId;

use crate::coupling::{CouplingMap, Orientation};
use crate::error::{CompileError, CompileResult};
use crate::orientation::OrientationMap;

/// A bijection between logical and physical qubits over the full register.
///
/// Both directions are dense index vectors, so lookups and
/// [`exchange`](Self::exchange) are O(1). Logical qubits beyond the
/// program's own wires act as ancillas; the size never changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// `logical_to_physical[l]` is the physical position of logical `l`.
    logical_to_physical: Vec<u32>,
    /// `physical_to_logical[p]` is the logical qubit on physical `p`.
    physical_to_logical: Vec<QubitId>,
}

impl Layout {
    /// Create a trivial layout (logical qubit i -> physical qubit i).
    pub fn trivial(num_qubits: u32) -> Self {
        Self {
            logical_to_physical: (0..num_qubits).collect(),
            physical_to_logical: (0..num_qubits).map(QubitId).collect(),
        }
    }

    /// Build a layout from `assignment[logical] = physical`.
    ///
    /// The assignment must be a permutation of `0..assignment.len()`.
    pub fn from_physical(assignment: Vec<u32>) -> CompileResult<Self> {
        let n = assignment.len();
        let mut physical_to_logical = vec![None; n];
        for (logical, &physical) in assignment.iter().enumerate() {
            let slot = physical_to_logical
                .get_mut(physical as usize)
                .ok_or_else(|| {
                    CompileError::InvalidLayout(format!(
                        "physical qubit {physical} outside a register of {n}"
                    ))
                })?;
            if slot.is_some() {
                return Err(CompileError::InvalidLayout(format!(
                    "physical qubit {physical} assigned twice"
                )));
            }
            #[allow(clippy::cast_possible_truncation)]
            {
                *slot = Some(QubitId(logical as u32));
            }
        }
        let physical_to_logical = physical_to_logical.into_iter().flatten().collect();
        Ok(Self {
            logical_to_physical: assignment,
            physical_to_logical,
        })
    }

    /// Get the physical qubit for a logical qubit.
    #[inline]
    pub fn physical_of(&self, logical: QubitId) -> Option<u32> {
        self.logical_to_physical.get(logical.index()).copied()
    }

    /// Get the logical qubit on a physical qubit.
    #[inline]
    pub fn logical_of(&self, physical: u32) -> Option<QubitId> {
        self.physical_to_logical.get(physical as usize).copied()
    }

    /// Exchange the logical qubits sitting on two physical qubits.
    ///
    /// # Panics
    ///
    /// Panics if either position is outside the register.
    pub fn exchange(&mut self, p1: u32, p2: u32) {
        let l1 = self.physical_to_logical[p1 as usize];
        let l2 = self.physical_to_logical[p2 as usize];
        self.physical_to_logical.swap(p1 as usize, p2 as usize);
        self.logical_to_physical[l1.index()] = p2;
        self.logical_to_physical[l2.index()] = p1;
    }

    /// Chain two layouts: `self` places program qubits on wires, `after`
    /// moves wires to their final physical positions.
    #[must_use]
    pub fn compose(&self, after: &Layout) -> Layout {
        let logical_to_physical: Vec<u32> = self
            .logical_to_physical
            .iter()
            .map(|&wire| after.physical_of(QubitId(wire)).unwrap_or(wire))
            .collect();
        let mut physical_to_logical = vec![QubitId(0); logical_to_physical.len()];
        for (logical, &physical) in logical_to_physical.iter().enumerate() {
            if let Some(slot) = physical_to_logical.get_mut(physical as usize) {
                #[allow(clippy::cast_possible_truncation)]
                {
                    *slot = QubitId(logical as u32);
                }
            }
        }
        Layout {
            logical_to_physical,
            physical_to_logical,
        }
    }

    /// Get the register size.
    pub fn len(&self) -> usize {
        self.logical_to_physical.len()
    }

    /// Check if the layout is empty.
    pub fn is_empty(&self) -> bool {
        self.logical_to_physical.is_empty()
    }

    /// Iterate over (logical, physical) pairs in logical order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (QubitId, u32)> + '_ {
        self.logical_to_physical
            .iter()
            .enumerate()
            .map(|(l, &p)| (QubitId(l as u32), p))
    }
}

/// Properties shared between compilation passes.
///
/// # Standard Properties
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `layout` | [`Layout`] | Initial logical-to-physical mapping |
/// | `final_layout` | [`Layout`] | Wire-to-physical mapping after routing |
/// | `coupling_map` | [`CouplingMap`] | Device connectivity graph |
/// | `orientation_map` | [`OrientationMap`] | Native CX directions, if calibrated separately |
///
/// # Custom Properties
///
/// Passes can store arbitrary data using the type-safe [`insert`](Self::insert)
/// and [`get`](Self::get) methods. Each type can have at most one value stored.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Initial qubit layout mapping (program qubit -> physical).
    ///
    /// Read by the scorer and by `ApplyLayout`; set by layout passes.
    pub layout: Option<Layout>,

    /// Mapping from physical wire to final physical position after routing.
    pub final_layout: Option<Layout>,

    /// Target coupling map.
    pub coupling_map: Option<CouplingMap>,

    /// Native CX directions, overriding the coupling map's edge direction.
    pub orientation_map: Option<OrientationMap>,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target coupling map.
    #[must_use]
    pub fn with_coupling_map(mut self, coupling_map: CouplingMap) -> Self {
        self.coupling_map = Some(coupling_map);
        self
    }

    /// Set the orientation override.
    #[must_use]
    pub fn with_orientation_map(mut self, orientation_map: OrientationMap) -> Self {
        self.orientation_map = Some(orientation_map);
        self
    }

    /// Set the initial layout.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// The coupling map, or [`CompileError::MissingCouplingMap`].
    pub fn require_coupling_map(&self) -> CompileResult<&CouplingMap> {
        self.coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)
    }

    /// Direction of `control -> target`, preferring the orientation override.
    pub fn orientation(&self, control: u32, target: u32) -> CompileResult<Orientation> {
        match &self.orientation_map {
            Some(map) => map.orientation(control, target),
            None => self.require_coupling_map()?.orientation(control, target),
        }
    }

    /// The mapping from each program qubit to where it ends up, combining
    /// the initial layout with the routing permutation.
    pub fn program_to_final(&self) -> Option<Layout> {
        let final_layout = self.final_layout.as_ref()?;
        Some(match &self.layout {
            Some(initial) => initial.compose(final_layout),
            None => final_layout.clone(),
        })
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_trivial() {
        let layout = Layout::trivial(5);
        assert_eq!(layout.physical_of(QubitId(0)), Some(0));
        assert_eq!(layout.physical_of(QubitId(4)), Some(4));
        assert_eq!(layout.logical_of(2), Some(QubitId(2)));
        assert_eq!(layout.physical_of(QubitId(5)), None);
    }

    #[test]
    fn test_layout_exchange() {
        let mut layout = Layout::trivial(3);
        layout.exchange(0, 2);

        assert_eq!(layout.physical_of(QubitId(0)), Some(2));
        assert_eq!(layout.physical_of(QubitId(2)), Some(0));
        assert_eq!(layout.logical_of(0), Some(QubitId(2)));
        assert_eq!(layout.logical_of(2), Some(QubitId(0)));

        layout.exchange(2, 0);
        assert_eq!(layout, Layout::trivial(3));
    }

    #[test]
    fn test_layout_from_physical() {
        let layout = Layout::from_physical(vec![2, 0, 1]).unwrap();
        assert_eq!(layout.physical_of(QubitId(0)), Some(2));
        assert_eq!(layout.logical_of(0), Some(QubitId(1)));

        assert!(matches!(
            Layout::from_physical(vec![0, 0, 1]),
            Err(CompileError::InvalidLayout(_))
        ));
        assert!(matches!(
            Layout::from_physical(vec![0, 3]),
            Err(CompileError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_layout_compose() {
        let initial = Layout::from_physical(vec![1, 2, 0]).unwrap();
        let mut routed = Layout::trivial(3);
        routed.exchange(1, 2);

        let combined = initial.compose(&routed);
        // Logical 0 starts on wire 1, which routing moved to position 2.
        assert_eq!(combined.physical_of(QubitId(0)), Some(2));
        assert_eq!(combined.physical_of(QubitId(1)), Some(1));
        assert_eq!(combined.physical_of(QubitId(2)), Some(0));
        assert_eq!(combined.logical_of(2), Some(QubitId(0)));
    }

    #[test]
    fn test_orientation_override() {
        let mut props = PropertySet::new().with_coupling_map(CouplingMap::linear(2));
        assert_eq!(props.orientation(1, 0).unwrap(), Orientation::Backward);

        let mut reversed = OrientationMap::default();
        reversed.set_native(1, 0);
        props.orientation_map = Some(reversed);
        assert_eq!(props.orientation(1, 0).unwrap(), Orientation::Forward);
    }

    #[test]
    #[allow(clippy::items_after_statements)]
    fn test_property_set_custom() {
        let mut props = PropertySet::new();

        #[derive(Debug, PartialEq)]
        struct CustomData(i32);

        props.insert(CustomData(42));
        assert_eq!(props.get::<CustomData>(), Some(&CustomData(42)));

        let removed = props.remove::<CustomData>();
        assert_eq!(removed, Some(CustomData(42)));
        assert_eq!(props.get::<CustomData>(), None);
    }
}
