//! Dense unitary simulation for small circuits.
//!
//! Used to check that rewrites preserve semantics. Qubit `q` is bit `q` of
//! the basis index (little-endian). Matrices are stored column-major, so
//! applying a gate touches each column independently.

use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;
use std::f64::consts::PI;

use trios_ir::{CircuitDag, Instruction, InstructionKind, StandardGate};

use crate::error::{CompileError, CompileResult};
use crate::variants::{Step, bind_steps};

/// Tolerance for floating point comparisons.
const EPSILON: f64 = 1e-9;

/// Largest register [`Unitary`] will simulate.
pub const MAX_SIMULATED_QUBITS: usize = 10;

/// A dense `2^n × 2^n` unitary matrix.
#[derive(Debug, Clone)]
pub struct Unitary {
    num_qubits: usize,
    /// Column-major elements.
    data: Vec<Complex64>,
}

impl Unitary {
    /// Create the identity on `num_qubits` qubits.
    pub fn identity(num_qubits: usize) -> Self {
        let dim = 1usize << num_qubits;
        let mut data = vec![Complex64::new(0.0, 0.0); dim * dim];
        for i in 0..dim {
            data[i * dim + i] = Complex64::new(1.0, 0.0);
        }
        Self { num_qubits, data }
    }

    /// Simulate an instruction sequence. Barriers are ignored.
    pub fn from_instructions<'a>(
        num_qubits: usize,
        instructions: impl IntoIterator<Item = &'a Instruction>,
    ) -> CompileResult<Self> {
        if num_qubits > MAX_SIMULATED_QUBITS {
            return Err(CompileError::CapacityExceeded {
                required: num_qubits,
                available: MAX_SIMULATED_QUBITS as u32,
            });
        }
        let mut unitary = Self::identity(num_qubits);
        for inst in instructions {
            unitary.apply(inst)?;
        }
        Ok(unitary)
    }

    /// Simulate a DAG in topological order over `num_qubits` wires.
    pub fn from_dag(dag: &CircuitDag, num_qubits: usize) -> CompileResult<Self> {
        Self::from_instructions(num_qubits, dag.topological_ops().map(|(_, inst)| inst))
    }

    /// Simulate a variant sequence on `num_qubits` operands.
    pub fn from_steps(num_qubits: usize, steps: &[Step]) -> CompileResult<Self> {
        #[allow(clippy::cast_possible_truncation)]
        let operands: Vec<_> = (0..num_qubits as u32).map(trios_ir::QubitId).collect();
        Self::from_instructions(num_qubits, &bind_steps(steps, &operands)?)
    }

    /// Unitary of a single standard gate on operands `0..arity`.
    pub fn of_gate(gate: StandardGate) -> Self {
        let n = gate.num_qubits() as usize;
        let mut unitary = Self::identity(n);
        let operands: Vec<usize> = (0..n).collect();
        unitary.apply_standard(gate, &operands);
        unitary
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        1 << self.num_qubits
    }

    /// Element at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[col * self.dim() + row]
    }

    /// Left-multiply by one instruction.
    pub fn apply(&mut self, inst: &Instruction) -> CompileResult<()> {
        let gate = match &inst.kind {
            InstructionKind::Barrier => return Ok(()),
            InstructionKind::Gate(g) => g.as_standard().ok_or_else(|| {
                CompileError::StructuralViolation(format!(
                    "cannot simulate custom gate '{}'",
                    g.name()
                ))
            })?,
        };
        let qubits: Vec<usize> = inst.qubits.iter().map(|q| q.index()).collect();
        if let Some(&q) = qubits.iter().find(|&&q| q >= self.num_qubits) {
            return Err(CompileError::StructuralViolation(format!(
                "wire {q} outside a simulated register of {}",
                self.num_qubits
            )));
        }
        self.apply_standard(gate, &qubits);
        Ok(())
    }

    fn apply_standard(&mut self, gate: StandardGate, qubits: &[usize]) {
        let dim = self.dim();
        for column in self.data.chunks_mut(dim) {
            apply_to_vector(column, gate, qubits);
        }
    }

    /// Relabel the register: bit `l` of an input index moves to position
    /// `input[l]`, bit `l` of an output index to position `output[l]`.
    ///
    /// With `input` the initial layout and `output` the final layout, this
    /// turns a program unitary into the one a routed circuit must realize.
    #[must_use]
    pub fn permuted(&self, input: &[usize], output: &[usize]) -> Self {
        let dim = self.dim();
        let mut data = vec![Complex64::new(0.0, 0.0); dim * dim];
        for col in 0..dim {
            let new_col = relabel(col, input);
            for row in 0..dim {
                let new_row = relabel(row, output);
                data[new_col * dim + new_row] = self.data[col * dim + row];
            }
        }
        Self {
            num_qubits: self.num_qubits,
            data,
        }
    }

    /// Element-wise equality within tolerance.
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.num_qubits == other.num_qubits
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).norm() < EPSILON)
    }

    /// Equality up to a global phase.
    pub fn equals_up_to_global_phase(&self, other: &Self) -> bool {
        if self.num_qubits != other.num_qubits {
            return false;
        }
        let Some((a, b)) = self
            .data
            .iter()
            .zip(&other.data)
            .find(|(a, _)| a.norm() > EPSILON)
        else {
            return other.data.iter().all(|b| b.norm() < EPSILON);
        };
        if b.norm() < EPSILON {
            return false;
        }
        let phase = b / a;
        if (phase.norm() - 1.0).abs() > EPSILON {
            return false;
        }
        self.data
            .iter()
            .zip(&other.data)
            .all(|(a, b)| (a * phase - b).norm() < EPSILON)
    }
}

fn relabel(index: usize, positions: &[usize]) -> usize {
    positions
        .iter()
        .enumerate()
        .filter(|&(bit, _)| index & (1 << bit) != 0)
        .fold(0, |acc, (_, &pos)| acc | (1 << pos))
}

/// The 2x2 matrix of a single-qubit gate in row-major order.
fn single_qubit_matrix(gate: StandardGate) -> [Complex64; 4] {
    let zero = Complex64::new(0.0, 0.0);
    let one = Complex64::new(1.0, 0.0);
    let i = Complex64::new(0.0, 1.0);
    let half = Complex64::new(0.5, 0.0);
    let half_i = Complex64::new(0.0, 0.5);
    let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
    match gate {
        StandardGate::X => [zero, one, one, zero],
        StandardGate::Y => [zero, -i, i, zero],
        StandardGate::Z => [one, zero, zero, -one],
        StandardGate::H => [s, s, s, -s],
        StandardGate::S => [one, zero, zero, i],
        StandardGate::Sdg => [one, zero, zero, -i],
        StandardGate::T => [one, zero, zero, Complex64::from_polar(1.0, PI / 4.0)],
        StandardGate::Tdg => [one, zero, zero, Complex64::from_polar(1.0, -PI / 4.0)],
        StandardGate::SX => [half + half_i, half - half_i, half - half_i, half + half_i],
        StandardGate::SXdg => [half - half_i, half + half_i, half + half_i, half - half_i],
        _ => [one, zero, zero, one],
    }
}

fn apply_to_vector(v: &mut [Complex64], gate: StandardGate, q: &[usize]) {
    let bit = |i: usize, k: usize| i & (1 << q[k]) != 0;
    match gate {
        StandardGate::CX => {
            for i in 0..v.len() {
                if bit(i, 0) && !bit(i, 1) {
                    v.swap(i, i | (1 << q[1]));
                }
            }
        }
        StandardGate::CZ => {
            for (i, amp) in v.iter_mut().enumerate() {
                if bit(i, 0) && bit(i, 1) {
                    *amp = -*amp;
                }
            }
        }
        StandardGate::Swap => {
            for i in 0..v.len() {
                if bit(i, 0) && !bit(i, 1) {
                    v.swap(i, i ^ (1 << q[0]) ^ (1 << q[1]));
                }
            }
        }
        StandardGate::CCX => {
            for i in 0..v.len() {
                if bit(i, 0) && bit(i, 1) && !bit(i, 2) {
                    v.swap(i, i | (1 << q[2]));
                }
            }
        }
        StandardGate::CSwap => {
            for i in 0..v.len() {
                if bit(i, 0) && bit(i, 1) && !bit(i, 2) {
                    v.swap(i, i ^ (1 << q[1]) ^ (1 << q[2]));
                }
            }
        }
        single => {
            let [m00, m01, m10, m11] = single_qubit_matrix(single);
            let mask = 1 << q[0];
            for i in 0..v.len() {
                if i & mask == 0 {
                    let (a, b) = (v[i], v[i | mask]);
                    v[i] = m00 * a + m01 * b;
                    v[i | mask] = m10 * a + m11 * b;
                }
            }
        }
    }
}
