//! Routing pass inserting SWAP gates.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use trios_ir::{CircuitDag, CircuitLevel, Instruction, IrError, QubitId, StandardGate};

use crate::coupling::CouplingMap;
use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{Layout, PropertySet};

/// Physical SWAPs inserted by [`BasicRouting`], in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTrace {
    /// `(p1, p2)` for each exchange.
    pub swaps: Vec<(u32, u32)>,
}

impl RoutingTrace {
    /// Number of inserted SWAPs.
    pub fn len(&self) -> usize {
        self.swaps.len()
    }

    /// Check if no SWAP was needed.
    pub fn is_empty(&self) -> bool {
        self.swaps.is_empty()
    }
}

/// Basic routing pass.
///
/// Walks the physical circuit layer by layer and, right before each gate
/// whose operands are not adjacent, inserts the SWAPs that move them
/// together along shortest paths. Each gate is emitted immediately after
/// its own SWAPs, so a later chain never undoes an earlier gate's
/// adjacency.
///
/// For CCX the operand with the smallest summed distance to the other two
/// becomes the pivot (ties to the lower operand index). The lower-indexed
/// other operand walks to the pivot first; the remaining one then walks
/// with the first one's position blocked. If the first operand cuts it off
/// from the pivot, it walks to the first operand instead.
///
/// Results: [`PropertySet::final_layout`] maps each wire to its physical
/// position at the end, and a [`RoutingTrace`] lists the SWAPs. With
/// `fake_run` both are computed but the circuit is left unchanged.
#[derive(Debug, Clone, Default)]
pub struct BasicRouting {
    /// Compute the trace without rewriting the circuit.
    pub fake_run: bool,
}

impl BasicRouting {
    /// A routing pass that rewrites the circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// A routing pass that only computes the trace and final layout.
    pub fn fake_run() -> Self {
        Self { fake_run: true }
    }
}

impl Pass for BasicRouting {
    fn name(&self) -> &'static str {
        "BasicRouting"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    #[instrument(skip(self, dag, properties), fields(fake_run = self.fake_run))]
    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties.require_coupling_map()?;
        let mut router = Router::new(coupling_map, dag, !self.fake_run)?;

        for layer in dag.layers() {
            for node in layer {
                let inst = dag.get_instruction(node).ok_or(IrError::InvalidNode)?;
                router.route(inst)?;
            }
        }

        let Router {
            output,
            mapping,
            trace,
            ..
        } = router;
        debug!("Routing inserted {} swaps", trace.len());

        if let Some(mut output) = output {
            output.set_level(CircuitLevel::Physical);
            *dag = output;
        }
        properties.final_layout = Some(mapping);
        properties.insert(trace);
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.coupling_map.is_some()
    }
}

/// Routing state for one run.
struct Router<'a> {
    coupling_map: &'a CouplingMap,
    /// Rebuilt circuit; `None` on a fake run.
    output: Option<CircuitDag>,
    /// Wire to current physical position.
    mapping: Layout,
    trace: RoutingTrace,
}

impl<'a> Router<'a> {
    fn new(coupling_map: &'a CouplingMap, dag: &CircuitDag, emit: bool) -> CompileResult<Self> {
        let num_physical = coupling_map.num_qubits();
        if dag.num_qubits() > num_physical as usize {
            return Err(CompileError::CapacityExceeded {
                required: dag.num_qubits(),
                available: num_physical,
            });
        }
        if let Some(wire) = dag.qubits().find(|q| q.0 >= num_physical) {
            return Err(CompileError::StructuralViolation(format!(
                "wire {wire} is outside the physical register of {num_physical} qubits"
            )));
        }

        let output = emit.then(|| {
            let mut output = CircuitDag::new();
            for p in 0..num_physical {
                output.add_qubit(QubitId(p));
            }
            output
        });
        Ok(Self {
            coupling_map,
            output,
            mapping: Layout::trivial(num_physical),
            trace: RoutingTrace::default(),
        })
    }

    fn position(&self, wire: QubitId) -> u32 {
        self.mapping.physical_of(wire).unwrap_or(wire.0)
    }

    fn route(&mut self, inst: &Instruction) -> CompileResult<()> {
        if inst.is_barrier() || inst.is_native() || inst.arity() == 1 {
            return self.emit(inst);
        }
        match inst.arity() {
            2 => self.route_pair(inst)?,
            3 if inst.standard_gate() == Some(StandardGate::CCX) => self.route_triple(inst)?,
            3 => {
                return Err(CompileError::StructuralViolation(format!(
                    "cannot route three-qubit gate '{}'",
                    inst.name()
                )));
            }
            n => {
                return Err(CompileError::StructuralViolation(format!(
                    "cannot route gate '{}' on {n} qubits",
                    inst.name()
                )));
            }
        }
        self.emit(inst)
    }

    fn route_pair(&mut self, inst: &Instruction) -> CompileResult<()> {
        let a = self.position(inst.qubits[0]);
        let b = self.position(inst.qubits[1]);
        if self.coupling_map.is_adjacent(a, b) {
            return Ok(());
        }
        let path = self.coupling_map.shortest_path(a, b)?;
        debug!("Routing {} on ({a}, {b}) along {path:?}", inst.name());
        self.walk(&path)
    }

    fn route_triple(&mut self, inst: &Instruction) -> CompileResult<()> {
        let positions: Vec<u32> = inst.qubits.iter().map(|&q| self.position(q)).collect();

        let mut pivot = 0;
        let mut best = u64::MAX;
        for candidate in 0..3 {
            let mut cost = 0u64;
            for other in (0..3).filter(|&o| o != candidate) {
                let d = self.coupling_map.distance(positions[other], positions[candidate])?;
                cost += u64::from(d.saturating_sub(1));
            }
            if cost < best {
                best = cost;
                pivot = candidate;
            }
        }
        if best == 0 {
            return Ok(());
        }

        let mut others = (0..3).filter(|&o| o != pivot);
        let (Some(first), Some(second)) = (others.next(), others.next()) else {
            return Ok(());
        };
        let pivot_wire = inst.qubits[pivot];
        let first_wire = inst.qubits[first];
        let second_wire = inst.qubits[second];
        debug!(
            "Routing {} with pivot operand {pivot} at {}",
            inst.name(),
            self.position(pivot_wire)
        );

        let from = self.position(first_wire);
        let to = self.position(pivot_wire);
        if !self.coupling_map.is_adjacent(from, to) {
            let path = self.coupling_map.shortest_path(from, to)?;
            self.walk(&path)?;
        }

        let pivot_at = self.position(pivot_wire);
        let first_at = self.position(first_wire);
        let second_at = self.position(second_wire);
        if self.coupling_map.is_adjacent(second_at, pivot_at)
            || self.coupling_map.is_adjacent(second_at, first_at)
        {
            return Ok(());
        }
        let path = self
            .coupling_map
            .shortest_path_avoiding(second_at, pivot_at, &[first_at])
            .or_else(|| {
                self.coupling_map
                    .shortest_path_avoiding(second_at, first_at, &[pivot_at])
            })
            .ok_or(CompileError::UnreachableTopology {
                from: second_at,
                to: pivot_at,
            })?;
        self.walk(&path)
    }

    /// Exchange along `path` until its first element sits next to its last.
    fn walk(&mut self, path: &[u32]) -> CompileResult<()> {
        for hop in path.windows(2).take(path.len().saturating_sub(2)) {
            self.exchange(hop[0], hop[1])?;
        }
        Ok(())
    }

    fn exchange(&mut self, p1: u32, p2: u32) -> CompileResult<()> {
        if let Some(output) = self.output.as_mut() {
            output.apply(Instruction::two_qubit_gate(
                StandardGate::Swap,
                QubitId(p1),
                QubitId(p2),
            ))?;
        }
        self.mapping.exchange(p1, p2);
        self.trace.swaps.push((p1, p2));
        Ok(())
    }

    fn emit(&mut self, inst: &Instruction) -> CompileResult<()> {
        let Some(output) = self.output.as_mut() else {
            return Ok(());
        };
        let mapping = &self.mapping;
        output.apply(inst.remapped(|q| mapping.physical_of(q).map_or(q, QubitId)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::{CheckMap, check_adjacency};
    use trios_ir::Circuit;

    fn routed(circuit: &Circuit, coupling_map: CouplingMap) -> (CircuitDag, PropertySet) {
        let mut dag = circuit.dag().clone();
        let mut props = PropertySet::new().with_coupling_map(coupling_map);
        BasicRouting::new().run(&mut dag, &mut props).unwrap();
        (dag, props)
    }

    #[test]
    fn test_basic_routing_connected() {
        let mut circuit = Circuit::with_size("test", 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let (dag, props) = routed(&circuit, CouplingMap::linear(5));
        assert_eq!(dag.num_ops(), 2);
        assert_eq!(dag.num_qubits(), 5);
        assert!(props.get::<RoutingTrace>().unwrap().is_empty());
        assert_eq!(props.final_layout, Some(Layout::trivial(5)));
    }

    #[test]
    fn test_basic_routing_needs_swap() {
        let mut circuit = Circuit::with_size("test", 3);
        circuit.cx(QubitId(0), QubitId(2)).unwrap();

        let (dag, props) = routed(&circuit, CouplingMap::linear(3));
        assert_eq!(props.get::<RoutingTrace>().unwrap().swaps, vec![(0, 1)]);
        assert_eq!(dag.count_ops().get("swap"), Some(&1));

        let last = dag.topological_ops().last().unwrap().1;
        assert_eq!(last.qubits, vec![QubitId(1), QubitId(2)]);

        let final_layout = props.final_layout.unwrap();
        assert_eq!(final_layout.physical_of(QubitId(0)), Some(1));
        assert_eq!(final_layout.physical_of(QubitId(1)), Some(0));
        assert!(check_adjacency(&dag, None, &CouplingMap::linear(3)).unwrap().satisfied);
    }

    #[test]
    fn test_native_gate_is_not_routed() {
        let mut circuit = Circuit::with_size("test", 3);
        circuit
            .native(StandardGate::CX, [QubitId(0), QubitId(2)])
            .unwrap();

        let (dag, props) = routed(&circuit, CouplingMap::linear(3));
        assert!(props.get::<RoutingTrace>().unwrap().is_empty());
        let (_, inst) = dag.topological_ops().next().unwrap();
        assert!(inst.is_native());
        assert_eq!(inst.qubits, vec![QubitId(0), QubitId(2)]);
    }

    #[test]
    fn test_ccx_pivot_selection() {
        // Operand 1 sits between the others on a line: no swaps needed.
        let mut circuit = Circuit::with_size("test", 3);
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        let (_, props) = routed(&circuit, CouplingMap::linear(3));
        assert!(props.get::<RoutingTrace>().unwrap().is_empty());

        // Operands at 0, 2, 4: pivot is operand 1 (cost 2), operand 0 walks first.
        let mut circuit = Circuit::with_size("test", 5);
        circuit.ccx(QubitId(0), QubitId(2), QubitId(4)).unwrap();
        let (dag, props) = routed(&circuit, CouplingMap::linear(5));
        assert_eq!(props.get::<RoutingTrace>().unwrap().swaps, vec![(0, 1), (4, 3)]);
        assert!(check_adjacency(&dag, None, &CouplingMap::linear(5)).unwrap().satisfied);
    }

    #[test]
    fn test_ccx_second_chain_keeps_first() {
        // Star: the hub is the only connector, so every operand pair
        // must go through it.
        let mut circuit = Circuit::with_size("test", 5);
        circuit.ccx(QubitId(1), QubitId(2), QubitId(3)).unwrap();
        let (dag, _) = routed(&circuit, CouplingMap::star(5));
        assert!(check_adjacency(&dag, None, &CouplingMap::star(5)).unwrap().satisfied);
        dag.verify_integrity().unwrap();
    }

    #[test]
    fn test_fake_run_matches_real_run() {
        let mut circuit = Circuit::with_size("test", 5);
        circuit.cx(QubitId(0), QubitId(4)).unwrap();
        circuit.ccx(QubitId(1), QubitId(3), QubitId(0)).unwrap();
        let original_ops = circuit.dag().num_ops();

        let (_, real) = routed(&circuit, CouplingMap::linear(5));

        let mut dag = circuit.dag().clone();
        let mut fake = PropertySet::new().with_coupling_map(CouplingMap::linear(5));
        BasicRouting::fake_run().run(&mut dag, &mut fake).unwrap();

        assert_eq!(dag.num_ops(), original_ops);
        assert_eq!(real.get::<RoutingTrace>(), fake.get::<RoutingTrace>());
        assert_eq!(real.final_layout, fake.final_layout);
    }

    #[test]
    fn test_capacity_and_structure_errors() {
        let circuit = Circuit::with_size("test", 4);
        let mut dag = circuit.into_dag();
        let mut props = PropertySet::new().with_coupling_map(CouplingMap::linear(3));
        assert!(matches!(
            BasicRouting::new().run(&mut dag, &mut props),
            Err(CompileError::CapacityExceeded { .. })
        ));

        let mut circuit = Circuit::with_size("test", 3);
        circuit
            .cswap(QubitId(0), QubitId(1), QubitId(2))
            .unwrap();
        let mut dag = circuit.into_dag();
        let mut props = PropertySet::new().with_coupling_map(CouplingMap::linear(3));
        assert!(matches!(
            BasicRouting::new().run(&mut dag, &mut props),
            Err(CompileError::StructuralViolation(_))
        ));
    }

    #[test]
    fn test_disconnected_topology() {
        let mut circuit = Circuit::with_size("test", 4);
        circuit.cx(QubitId(0), QubitId(3)).unwrap();
        let mut dag = circuit.into_dag();
        let mut props =
            PropertySet::new().with_coupling_map(CouplingMap::from_edges(4, [(0, 1), (2, 3)]));
        assert!(matches!(
            BasicRouting::new().run(&mut dag, &mut props),
            Err(CompileError::UnreachableTopology { .. })
        ));
    }

    #[test]
    fn test_check_map_after_routing() {
        let mut circuit = Circuit::with_size("test", 4);
        circuit.cx(QubitId(0), QubitId(3)).unwrap();
        circuit.cx(QubitId(3), QubitId(1)).unwrap();
        let (mut dag, mut props) = routed(&circuit, CouplingMap::ring(4));
        CheckMap.run(&mut dag, &mut props).unwrap();
        assert!(props.get::<crate::passes::AdjacencyReport>().unwrap().satisfied);
    }
}
