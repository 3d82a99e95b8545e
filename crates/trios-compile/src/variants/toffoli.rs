//! CCX variant tables.
//!
//! Keyed entries carry a boundary block on their biased side: a
//! predecessor-biased entry for pair `(x, y)` opens with
//! `CX(x,y) T†(x) T(y) CX(x,y)`, a successor-biased one closes with
//! `CX(x,y) T(x) T†(y) CX(x,y)`. The two blocks are exact inverses, so a
//! successor-biased node followed by a predecessor-biased node on the same
//! physical pair cancels down after [`InverseCancellation`].
//!
//! [`InverseCancellation`]: crate::passes::InverseCancellation

use std::cmp::Reverse;
use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use super::AdjacencyClass::{self, Full, Pivot};
use super::Bias::{self, Predecessor, Successor};
use super::Step::{self, Cx, H, T, Tdg};
use super::{OperandPair, SelectorKey, VariantChoice};
use crate::error::{CompileError, CompileResult};

const fn key(pred: (u8, u8), succ: (u8, u8), class: AdjacencyClass, bias: Bias) -> SelectorKey {
    SelectorKey {
        predecessor: Some(OperandPair::new(pred.0, pred.1)),
        successor: Some(OperandPair::new(succ.0, succ.1)),
        class,
        bias,
    }
}

#[rustfmt::skip]
static KEYED: &[(SelectorKey, &[Step])] = &[
    (
        key((0, 1), (1, 2), Full, Predecessor),
        &[
            H(2), Cx(0, 1), Tdg(0), T(1), Cx(0, 1), Tdg(1), Tdg(2), Cx(0, 2), T(2), Cx(1, 2),
            Tdg(2), Cx(0, 2), T(2), Cx(1, 2), H(2),
        ],
    ),
    (
        key((0, 2), (2, 1), Full, Predecessor),
        &[
            H(2), Cx(0, 2), Tdg(0), T(2), Cx(0, 2), Tdg(1), Tdg(2), Cx(0, 1), T(1), Cx(2, 1),
            Tdg(1), Cx(0, 1), T(1), Cx(2, 1), H(2),
        ],
    ),
    (
        key((1, 0), (0, 2), Full, Predecessor),
        &[
            H(2), Cx(1, 0), Tdg(1), T(0), Cx(1, 0), Tdg(0), Tdg(2), Cx(1, 2), T(2), Cx(0, 2),
            Tdg(2), Cx(1, 2), T(2), Cx(0, 2), H(2),
        ],
    ),
    (
        key((1, 2), (2, 0), Full, Predecessor),
        &[
            H(2), Cx(1, 2), Tdg(1), T(2), Cx(1, 2), Tdg(0), Tdg(2), Cx(1, 0), T(0), Cx(2, 0),
            Tdg(0), Cx(1, 0), T(0), Cx(2, 0), H(2),
        ],
    ),
    (
        key((2, 0), (0, 1), Full, Predecessor),
        &[
            H(2), Cx(2, 0), Tdg(2), T(0), Cx(2, 0), Tdg(0), Tdg(1), Cx(2, 1), T(1), Cx(0, 1),
            Tdg(1), Cx(2, 1), T(1), Cx(0, 1), H(2),
        ],
    ),
    (
        key((2, 1), (1, 0), Full, Predecessor),
        &[
            H(2), Cx(2, 1), Tdg(2), T(1), Cx(2, 1), Tdg(0), Tdg(1), Cx(2, 0), T(0), Cx(1, 0),
            Tdg(0), Cx(2, 0), T(0), Cx(1, 0), H(2),
        ],
    ),
    (
        key((1, 2), (0, 1), Full, Successor),
        &[
            H(2), T(1), T(2), Cx(1, 2), Tdg(2), Cx(0, 2), T(2), Cx(1, 2), Tdg(2), Cx(0, 2),
            Cx(0, 1), T(0), Tdg(1), Cx(0, 1), H(2),
        ],
    ),
    (
        key((2, 1), (0, 2), Full, Successor),
        &[
            H(2), T(1), T(2), Cx(2, 1), Tdg(1), Cx(0, 1), T(1), Cx(2, 1), Tdg(1), Cx(0, 1),
            Cx(0, 2), T(0), Tdg(2), Cx(0, 2), H(2),
        ],
    ),
    (
        key((0, 2), (1, 0), Full, Successor),
        &[
            H(2), T(0), T(2), Cx(0, 2), Tdg(2), Cx(1, 2), T(2), Cx(0, 2), Tdg(2), Cx(1, 2),
            Cx(1, 0), T(1), Tdg(0), Cx(1, 0), H(2),
        ],
    ),
    (
        key((2, 0), (1, 2), Full, Successor),
        &[
            H(2), T(0), T(2), Cx(2, 0), Tdg(0), Cx(1, 0), T(0), Cx(2, 0), Tdg(0), Cx(1, 0),
            Cx(1, 2), T(1), Tdg(2), Cx(1, 2), H(2),
        ],
    ),
    (
        key((0, 1), (2, 0), Full, Successor),
        &[
            H(2), T(0), T(1), Cx(0, 1), Tdg(1), Cx(2, 1), T(1), Cx(0, 1), Tdg(1), Cx(2, 1),
            Cx(2, 0), T(2), Tdg(0), Cx(2, 0), H(2),
        ],
    ),
    (
        key((1, 0), (2, 1), Full, Successor),
        &[
            H(2), T(0), T(1), Cx(1, 0), Tdg(0), Cx(2, 0), T(0), Cx(1, 0), Tdg(0), Cx(2, 0),
            Cx(2, 1), T(2), Tdg(1), Cx(2, 1), H(2),
        ],
    ),
    (
        key((0, 1), (2, 0), Pivot(0), Predecessor),
        &[
            H(2), Cx(0, 1), Tdg(0), T(1), Cx(0, 1), Tdg(1), Tdg(2), Cx(0, 1), Cx(2, 0), T(0),
            Cx(0, 1), T(1), Cx(2, 0), Cx(0, 1), Tdg(1), Cx(2, 0), Cx(0, 1), Cx(2, 0), H(2),
        ],
    ),
    (
        key((0, 2), (1, 0), Pivot(0), Predecessor),
        &[
            H(2), Cx(0, 2), Tdg(0), T(2), Cx(0, 2), Tdg(1), Tdg(2), Cx(0, 1), T(1), Cx(1, 0),
            Cx(0, 1), Cx(2, 0), T(0), Cx(1, 0), Tdg(0), Cx(2, 0), Cx(0, 1), Cx(1, 0), H(2),
        ],
    ),
    (
        key((1, 0), (2, 0), Pivot(0), Predecessor),
        &[
            H(2), Cx(1, 0), Tdg(1), T(0), Cx(1, 0), Tdg(0), Tdg(2), Cx(0, 1), Cx(2, 0), T(0),
            Cx(0, 1), T(1), Cx(2, 0), Cx(0, 1), Tdg(1), Cx(2, 0), Cx(0, 1), Cx(2, 0), H(2),
        ],
    ),
    (
        key((2, 0), (1, 0), Pivot(0), Predecessor),
        &[
            H(2), Cx(2, 0), Tdg(2), T(0), Cx(2, 0), Tdg(0), Tdg(1), Cx(0, 1), T(1), Cx(1, 0),
            Cx(0, 1), Cx(2, 0), T(0), Cx(1, 0), Tdg(0), Cx(2, 0), Cx(0, 1), Cx(1, 0), H(2),
        ],
    ),
    (
        key((0, 1), (0, 1), Pivot(0), Successor),
        &[
            H(2), T(1), T(2), Cx(0, 1), Cx(2, 0), Tdg(0), Cx(0, 1), Tdg(1), Cx(2, 0), Cx(0, 1),
            T(1), Cx(2, 0), Cx(0, 1), Cx(2, 0), Cx(0, 1), T(0), Tdg(1), Cx(0, 1), H(2),
        ],
    ),
    (
        key((0, 1), (0, 2), Pivot(0), Successor),
        &[
            H(2), T(1), T(2), Cx(0, 1), Tdg(1), Cx(1, 0), Cx(0, 1), Cx(2, 0), Tdg(0), Cx(1, 0),
            T(0), Cx(2, 0), Cx(0, 1), Cx(1, 0), Cx(0, 2), T(0), Tdg(2), Cx(0, 2), H(2),
        ],
    ),
    (
        key((0, 1), (1, 0), Pivot(0), Successor),
        &[
            H(2), T(0), T(2), Cx(0, 1), Cx(2, 0), Tdg(0), Cx(0, 1), Tdg(1), Cx(2, 0), Cx(0, 1),
            T(1), Cx(2, 0), Cx(0, 1), Cx(2, 0), Cx(1, 0), T(1), Tdg(0), Cx(1, 0), H(2),
        ],
    ),
    (
        key((0, 1), (2, 0), Pivot(0), Successor),
        &[
            H(2), T(0), T(1), Cx(0, 1), Tdg(1), Cx(1, 0), Cx(0, 1), Cx(2, 0), Tdg(0), Cx(1, 0),
            T(0), Cx(2, 0), Cx(0, 1), Cx(1, 0), Cx(2, 0), T(2), Tdg(0), Cx(2, 0), H(2),
        ],
    ),
    (
        key((0, 1), (1, 2), Pivot(1), Predecessor),
        &[
            H(2), Cx(0, 1), Tdg(0), T(1), Cx(0, 1), Tdg(1), Tdg(2), Cx(0, 1), Cx(1, 2), Tdg(2),
            Cx(0, 1), Cx(1, 2), T(2), Cx(0, 1), Cx(1, 2), T(2), Cx(0, 1), Cx(1, 2), H(2),
        ],
    ),
    (
        key((1, 0), (1, 2), Pivot(1), Predecessor),
        &[
            H(2), Cx(1, 0), Tdg(1), T(0), Cx(1, 0), Tdg(0), Tdg(2), Cx(0, 1), Cx(1, 2), Tdg(2),
            Cx(0, 1), Cx(1, 2), T(2), Cx(0, 1), Cx(1, 2), T(2), Cx(0, 1), Cx(1, 2), H(2),
        ],
    ),
    (
        key((1, 2), (0, 1), Pivot(1), Predecessor),
        &[
            H(2), Cx(1, 2), Tdg(1), T(2), Cx(1, 2), Tdg(0), Tdg(2), Cx(0, 1), T(1), Cx(1, 0),
            Cx(0, 1), Cx(2, 1), T(1), Cx(0, 1), Tdg(1), Cx(2, 1), Cx(1, 0), Cx(0, 1), H(2),
        ],
    ),
    (
        key((2, 1), (0, 1), Pivot(1), Predecessor),
        &[
            H(2), Cx(2, 1), Tdg(2), T(1), Cx(2, 1), Tdg(0), Tdg(1), Cx(0, 1), T(1), Cx(1, 0),
            Cx(0, 1), Cx(2, 1), T(1), Cx(0, 1), Tdg(1), Cx(2, 1), Cx(1, 0), Cx(0, 1), H(2),
        ],
    ),
    (
        key((0, 1), (0, 1), Pivot(1), Successor),
        &[
            H(2), T(1), T(2), Cx(0, 1), Cx(1, 2), T(2), Cx(0, 1), Cx(1, 2), Tdg(2), Cx(0, 1),
            Cx(1, 2), Tdg(2), Cx(0, 1), Cx(1, 2), Cx(0, 1), T(0), Tdg(1), Cx(0, 1), H(2),
        ],
    ),
    (
        key((0, 1), (1, 0), Pivot(1), Successor),
        &[
            H(2), T(0), T(2), Cx(0, 1), Cx(1, 2), T(2), Cx(0, 1), Cx(1, 2), Tdg(2), Cx(0, 1),
            Cx(1, 2), Tdg(2), Cx(0, 1), Cx(1, 2), Cx(1, 0), T(1), Tdg(0), Cx(1, 0), H(2),
        ],
    ),
    (
        key((0, 1), (1, 2), Pivot(1), Successor),
        &[
            H(2), T(0), T(2), Cx(0, 1), Tdg(1), Cx(1, 0), Cx(0, 1), Cx(2, 1), Tdg(1), Cx(0, 1),
            T(1), Cx(2, 1), Cx(1, 0), Cx(0, 1), Cx(1, 2), T(1), Tdg(2), Cx(1, 2), H(2),
        ],
    ),
    (
        key((0, 1), (2, 1), Pivot(1), Successor),
        &[
            H(2), T(0), T(1), Cx(0, 1), Tdg(1), Cx(1, 0), Cx(0, 1), Cx(2, 1), Tdg(1), Cx(0, 1),
            T(1), Cx(2, 1), Cx(1, 0), Cx(0, 1), Cx(2, 1), T(2), Tdg(1), Cx(2, 1), H(2),
        ],
    ),
    (
        key((0, 2), (2, 1), Pivot(2), Predecessor),
        &[
            H(2), Cx(0, 2), Tdg(0), T(2), Cx(0, 2), Tdg(1), Tdg(2), Cx(0, 2), Cx(2, 1), Tdg(1),
            Cx(0, 2), Cx(2, 1), T(1), Cx(0, 2), Cx(2, 1), T(1), Cx(0, 2), Cx(2, 1), H(2),
        ],
    ),
    (
        key((1, 2), (0, 2), Pivot(2), Predecessor),
        &[
            H(2), Cx(1, 2), Tdg(1), T(2), Cx(1, 2), Tdg(0), Tdg(2), Cx(0, 2), T(2), Cx(2, 0),
            Cx(0, 2), Cx(1, 2), T(2), Cx(0, 2), Tdg(2), Cx(1, 2), Cx(2, 0), Cx(0, 2), H(2),
        ],
    ),
    (
        key((2, 0), (2, 1), Pivot(2), Predecessor),
        &[
            H(2), Cx(2, 0), Tdg(2), T(0), Cx(2, 0), Tdg(0), Tdg(1), Cx(0, 2), Cx(2, 1), Tdg(1),
            Cx(0, 2), Cx(2, 1), T(1), Cx(0, 2), Cx(2, 1), T(1), Cx(0, 2), Cx(2, 1), H(2),
        ],
    ),
    (
        key((2, 1), (0, 2), Pivot(2), Predecessor),
        &[
            H(2), Cx(2, 1), Tdg(2), T(1), Cx(2, 1), Tdg(0), Tdg(1), Cx(0, 2), T(2), Cx(2, 0),
            Cx(0, 2), Cx(1, 2), T(2), Cx(0, 2), Tdg(2), Cx(1, 2), Cx(2, 0), Cx(0, 2), H(2),
        ],
    ),
    (
        key((0, 2), (0, 2), Pivot(2), Successor),
        &[
            H(2), T(1), T(2), Cx(0, 2), Cx(2, 1), T(1), Cx(0, 2), Cx(2, 1), Tdg(1), Cx(0, 2),
            Cx(2, 1), Tdg(1), Cx(0, 2), Cx(2, 1), Cx(0, 2), T(0), Tdg(2), Cx(0, 2), H(2),
        ],
    ),
    (
        key((0, 2), (1, 2), Pivot(2), Successor),
        &[
            H(2), T(0), T(2), Cx(0, 2), Tdg(2), Cx(2, 0), Cx(0, 2), Cx(1, 2), Tdg(2), Cx(0, 2),
            T(2), Cx(1, 2), Cx(2, 0), Cx(0, 2), Cx(1, 2), T(1), Tdg(2), Cx(1, 2), H(2),
        ],
    ),
    (
        key((0, 2), (2, 0), Pivot(2), Successor),
        &[
            H(2), T(0), T(1), Cx(0, 2), Cx(2, 1), T(1), Cx(0, 2), Cx(2, 1), Tdg(1), Cx(0, 2),
            Cx(2, 1), Tdg(1), Cx(0, 2), Cx(2, 1), Cx(2, 0), T(2), Tdg(0), Cx(2, 0), H(2),
        ],
    ),
    (
        key((0, 2), (2, 1), Pivot(2), Successor),
        &[
            H(2), T(0), T(1), Cx(0, 2), Tdg(2), Cx(2, 0), Cx(0, 2), Cx(1, 2), Tdg(2), Cx(0, 2),
            T(2), Cx(1, 2), Cx(2, 0), Cx(0, 2), Cx(2, 1), T(2), Tdg(1), Cx(2, 1), H(2),
        ],
    ),
];

#[rustfmt::skip]
mod canonical {
    use super::Step;
    use super::{Cx, H, T, Tdg};

    /// Standard 6-CX decomposition for fully connected operands.
    pub(super) const CANONICAL_FULL: &[Step] = &[
        H(2), Cx(1, 2), Tdg(2), Cx(0, 2), T(2), Cx(1, 2), Tdg(2), Cx(0, 2), T(1), T(2), H(2),
        Cx(0, 1), T(0), Tdg(1), Cx(0, 1),
    ];

    /// 8-CX decomposition with operand 0 adjacent to both others.
    pub(super) const CANONICAL_PIVOT_0: &[Step] = &[
        H(2), T(0), T(1), T(2), Cx(0, 1), Tdg(1), Cx(2, 0), Tdg(0), Cx(0, 1), Tdg(1), Cx(2, 0),
        Cx(0, 1), T(1), Cx(2, 0), Cx(0, 1), Cx(2, 0), H(2),
    ];

    /// 8-CX decomposition with operand 1 adjacent to both others.
    pub(super) const CANONICAL_PIVOT_1: &[Step] = &[
        H(2), T(0), T(1), T(2), Cx(0, 1), Tdg(1), Cx(1, 2), T(2), Cx(0, 1), Cx(1, 2), Tdg(2),
        Cx(0, 1), Cx(1, 2), Tdg(2), Cx(0, 1), Cx(1, 2), H(2),
    ];

    /// 8-CX decomposition with operand 2 adjacent to both others.
    pub(super) const CANONICAL_PIVOT_2: &[Step] = &[
        H(2), T(0), T(1), T(2), Cx(0, 2), Tdg(2), Cx(2, 1), T(1), Cx(0, 2), Cx(2, 1), Tdg(1),
        Cx(0, 2), Cx(2, 1), Tdg(1), Cx(0, 2), Cx(2, 1), H(2),
    ];

}

static CANONICAL: &[(AdjacencyClass, &[Step])] = &[
    (Full, canonical::CANONICAL_FULL),
    (Pivot(0), canonical::CANONICAL_PIVOT_0),
    (Pivot(1), canonical::CANONICAL_PIVOT_1),
    (Pivot(2), canonical::CANONICAL_PIVOT_2),
];

static STANDARD: LazyLock<ToffoliLibrary> =
    LazyLock::new(|| ToffoliLibrary::new(KEYED.iter().copied(), CANONICAL.iter().copied()));

/// Lookup structure over CCX variants.
///
/// Entries are kept sorted by key; an index gives O(1) exact lookup.
#[derive(Debug, Clone, Default)]
pub struct ToffoliLibrary {
    entries: Vec<(SelectorKey, &'static [Step])>,
    index: FxHashMap<SelectorKey, usize>,
    canonical: FxHashMap<AdjacencyClass, &'static [Step]>,
}

impl ToffoliLibrary {
    /// The built-in tables.
    pub fn standard() -> &'static ToffoliLibrary {
        &STANDARD
    }

    /// Build a library from keyed entries and per-class canonical sequences.
    ///
    /// A key listed twice keeps its first sequence.
    pub fn new(
        entries: impl IntoIterator<Item = (SelectorKey, &'static [Step])>,
        canonical: impl IntoIterator<Item = (AdjacencyClass, &'static [Step])>,
    ) -> Self {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by_key(|(k, _)| *k);
        entries.dedup_by_key(|(k, _)| *k);
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (k, _))| (*k, i))
            .collect();
        Self {
            entries,
            index,
            canonical: canonical.into_iter().collect(),
        }
    }

    /// Exact lookup.
    pub fn get(&self, key: &SelectorKey) -> Option<&'static [Step]> {
        self.index.get(key).map(|&i| self.entries[i].1)
    }

    /// The canonical sequence of a class.
    pub fn canonical(&self, class: AdjacencyClass) -> Option<&'static [Step]> {
        self.canonical.get(&class).copied()
    }

    /// All keyed entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&SelectorKey, &'static [Step])> {
        self.entries.iter().map(|(k, s)| (k, *s))
    }

    /// Number of keyed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no keyed entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry biased toward `bias` whose pattern on that side is exactly
    /// `pattern`.
    pub fn biased_entry(
        &self,
        class: AdjacencyClass,
        bias: Bias,
        pattern: OperandPair,
    ) -> Option<(SelectorKey, &'static [Step])> {
        self.entries
            .iter()
            .find(|(k, _)| k.class == class && k.bias == bias && k.pattern(bias) == Some(pattern))
            .copied()
    }

    /// Resolve a requested key to a sequence.
    ///
    /// An exact hit wins. Otherwise the candidates are the entries of the
    /// same class whose pattern on the requested bias side equals the
    /// requested one or its reversal, ranked by: the other side also
    /// matching, exact before reversed, same bias, smallest key. With no
    /// candidate the class's canonical sequence is used.
    pub fn select(&self, requested: &SelectorKey) -> CompileResult<(VariantChoice, &'static [Step])> {
        if let Some(steps) = self.get(requested) {
            return Ok((VariantChoice::Keyed(*requested), steps));
        }

        let side = requested.bias;
        let other = side.other();
        let best = requested.pattern(side).and_then(|want| {
            self.entries
                .iter()
                .filter(|(k, _)| k.class == requested.class)
                .filter_map(|(k, steps)| {
                    let have = k.pattern(side)?;
                    let exact = have == want;
                    if !exact && have != want.reversed() {
                        return None;
                    }
                    let other_matches =
                        requested.pattern(other).is_some() && k.pattern(other) == requested.pattern(other);
                    let rank = (
                        Reverse(other_matches),
                        Reverse(exact),
                        Reverse(k.bias == side),
                        *k,
                    );
                    Some((rank, *k, *steps))
                })
                .min_by(|a, b| a.0.cmp(&b.0))
        });
        if let Some((_, key, steps)) = best {
            return Ok((VariantChoice::Keyed(key), steps));
        }

        self.canonical(requested.class)
            .map(|steps| (VariantChoice::Canonical(requested.class), steps))
            .ok_or_else(|| CompileError::UndefinedVariant(requested.class.to_string()))
    }
}
