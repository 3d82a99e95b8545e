//! Two-operand variant tables: oriented CX, SWAP and bridge sequences.

use serde::{Deserialize, Serialize};

use super::Step::{self, Cx, H};
use crate::coupling::Orientation;

/// Which Hadamard pairs a reversed CX keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Boundary {
    /// Both pairs.
    Whole,
    /// The trailing pair is left to a following reversed CX.
    OpenTail,
    /// The leading pair was left by a preceding reversed CX.
    OpenHead,
}

const CX_FORWARD: &[Step] = &[Cx(0, 1)];
const CX_BACKWARD: &[Step] = &[H(0), H(1), Cx(1, 0), H(0), H(1)];
const CX_BACKWARD_OPEN_TAIL: &[Step] = &[H(0), H(1), Cx(1, 0)];
const CX_BACKWARD_OPEN_HEAD: &[Step] = &[Cx(1, 0), H(0), H(1)];

/// CX on operands `(0, 1)` for the given edge orientation.
pub fn cx_variant(orientation: Orientation, boundary: Boundary) -> &'static [Step] {
    match (orientation, boundary) {
        (Orientation::Forward, _) => CX_FORWARD,
        (Orientation::Backward, Boundary::Whole) => CX_BACKWARD,
        (Orientation::Backward, Boundary::OpenTail) => CX_BACKWARD_OPEN_TAIL,
        (Orientation::Backward, Boundary::OpenHead) => CX_BACKWARD_OPEN_HEAD,
    }
}

/// The two three-CX SWAP decompositions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapVariant {
    /// `CX(0,1) CX(1,0) CX(0,1)`.
    ZeroOne,
    /// `CX(1,0) CX(0,1) CX(1,0)`.
    OneZero,
}

impl SwapVariant {
    /// The variant whose outer CX run natively for `orientation` of `(0, 1)`.
    pub fn for_orientation(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Forward => SwapVariant::ZeroOne,
            Orientation::Backward => SwapVariant::OneZero,
        }
    }

    /// The sequence.
    pub fn steps(self) -> &'static [Step] {
        match self {
            SwapVariant::ZeroOne => &[Cx(0, 1), Cx(1, 0), Cx(0, 1)],
            SwapVariant::OneZero => &[Cx(1, 0), Cx(0, 1), Cx(1, 0)],
        }
    }
}

/// SWAP followed by `CX(0,1)`, merged.
pub const SWAP_THEN_CX: &[Step] = &[Cx(0, 1), Cx(1, 0)];

/// `CX(0,1)` followed by SWAP, merged.
pub const CX_THEN_SWAP: &[Step] = &[Cx(1, 0), Cx(0, 1)];

/// CX from operand 0 to operand 2 through the middle operand 1.
pub const BRIDGE_OUTER_TO_FAR: &[Step] = &[Cx(1, 2), Cx(0, 1), Cx(1, 2), Cx(0, 1)];

/// CX from operand 2 to operand 0 through the middle operand 1.
pub const BRIDGE_FAR_TO_OUTER: &[Step] = &[Cx(1, 0), Cx(2, 1), Cx(1, 0), Cx(2, 1)];
