//! Qubit identifiers.
//!
//! A [`QubitId`] names a wire of the dependency graph. Before layout it is a
//! logical resource; after layout is applied it is the index of a physical
//! resource on the target topology.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A wire index, logical or physical depending on the compilation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// The raw index as a `usize`, for indexing dense tables.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// A declared wire, optionally named as `register[index]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qubit {
    pub id: QubitId,
    pub register: Option<String>,
    /// Position inside `register`.
    pub index: Option<u32>,
}

impl Qubit {
    /// An anonymous wire, displayed as `q{id}`.
    pub fn new(id: QubitId) -> Self {
        Self {
            id,
            register: None,
            index: None,
        }
    }

    pub fn with_register(id: QubitId, register: impl Into<String>, index: u32) -> Self {
        Self {
            id,
            register: Some(register.into()),
            index: Some(index),
        }
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.register, self.index) {
            (Some(register), Some(index)) => write!(f, "{register}[{index}]"),
            _ => fmt::Display::fmt(&self.id, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_display() {
        assert_eq!(Qubit::new(QubitId(4)).to_string(), "q4");
        assert_eq!(
            Qubit::with_register(QubitId(1), "anc", 0).to_string(),
            "anc[0]"
        );
    }

    #[test]
    fn test_qubit_ordering() {
        let mut ids = vec![QubitId(3), QubitId(0), QubitId(2)];
        ids.sort();
        assert_eq!(ids, vec![QubitId(0), QubitId(2), QubitId(3)]);
        assert_eq!(QubitId(7).index(), 7);
    }
}
