//! DAG-based circuit representation.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use petgraph::Direction;
use petgraph::graph::NodeIndex as PetNodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::QubitId;

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a wire.
    In(QubitId),
    /// Output node for a wire.
    Out(QubitId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl DagNode {
    /// Check if this is an input node.
    #[inline]
    pub fn is_input(&self) -> bool {
        matches!(self, DagNode::In(_))
    }

    /// Check if this is an output node.
    #[inline]
    pub fn is_output(&self) -> bool {
        matches!(self, DagNode::Out(_))
    }

    /// Check if this is an operation node.
    #[inline]
    pub fn is_op(&self) -> bool {
        matches!(self, DagNode::Op(_))
    }

    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }

    /// Get mutable reference to the instruction.
    #[inline]
    pub fn instruction_mut(&mut self) -> Option<&mut Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

/// An edge in the circuit DAG: one hop along a qubit wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge belongs to.
    pub wire: QubitId,
}

/// The abstraction level of a circuit in the compilation pipeline.
///
/// Circuits start at the `Logical` level (abstract qubits) and are
/// lowered to the `Physical` level once a layout has been applied
/// (wire `i` is physical resource `i` of the target topology).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CircuitLevel {
    /// Logical level: qubits are abstract, no physical mapping applied.
    #[default]
    Logical,
    /// Physical level: qubits are physical device positions.
    Physical,
}

/// DAG-based circuit representation.
///
/// The circuit is represented as a directed acyclic graph where:
/// - Nodes are either input nodes, output nodes, or operation nodes
/// - Every edge belongs to exactly one qubit wire
/// - Each wire has exactly one input and one output node
/// - Along a wire, operations form a total order from In to Out
///
/// The graph is a [`StableDiGraph`], so node indices held by passes stay
/// valid while other nodes are removed or substituted.
///
/// All iteration orders are deterministic: wires are kept in a sorted map
/// and the topological sort breaks ties by the smallest node index.
#[derive(Debug, Clone)]
pub struct CircuitDag {
    /// The underlying graph.
    graph: StableDiGraph<DagNode, DagEdge, u32>,
    /// Map from qubit to its input node.
    qubit_inputs: BTreeMap<QubitId, NodeIndex>,
    /// Map from qubit to its output node.
    qubit_outputs: BTreeMap<QubitId, NodeIndex>,
    /// Wire front: maps each wire to the node just before the output node.
    wire_front: FxHashMap<QubitId, NodeIndex>,
    /// Abstraction level of the circuit.
    level: CircuitLevel,
}

impl CircuitDag {
    /// Create a new empty circuit DAG.
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::default(),
            qubit_inputs: BTreeMap::new(),
            qubit_outputs: BTreeMap::new(),
            wire_front: FxHashMap::default(),
            level: CircuitLevel::Logical,
        }
    }

    /// Add a qubit to the circuit.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.qubit_inputs.contains_key(&qubit) {
            return;
        }
        let in_node = self.graph.add_node(DagNode::In(qubit));
        let out_node = self.graph.add_node(DagNode::Out(qubit));
        self.graph.add_edge(in_node, out_node, DagEdge { wire: qubit });
        self.qubit_inputs.insert(qubit, in_node);
        self.qubit_outputs.insert(qubit, out_node);
        self.wire_front.insert(qubit, in_node);
    }

    /// Check an instruction against the wires it is about to be attached to.
    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let op = instruction.name();

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits() as usize;
            if expected != instruction.arity() {
                return Err(IrError::ArityMismatch {
                    op: op.to_string(),
                    expected,
                    got: instruction.arity(),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !self.qubit_inputs.contains_key(&qubit) {
                return Err(IrError::UnknownWire {
                    qubit,
                    op: op.to_string(),
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::RepeatedOperand {
                    qubit,
                    op: op.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Apply an instruction to the end of the circuit.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        self.validate(&instruction)?;

        let qubits = instruction.qubits.clone();
        let op_node = self.graph.add_node(DagNode::Op(instruction));

        for qubit in qubits {
            let out_node = self.qubit_outputs[&qubit];
            let prev_node = self.wire_front[&qubit];

            let eid = self
                .graph
                .edges_directed(prev_node, Direction::Outgoing)
                .find(|e| e.weight().wire == qubit && e.target() == out_node)
                .map(|e| e.id())
                .ok_or_else(|| {
                    IrError::BrokenGraph(format!(
                        "Missing edge from predecessor to output for qubit wire {qubit:?}"
                    ))
                })?;
            self.graph.remove_edge(eid);
            self.graph.add_edge(prev_node, op_node, DagEdge { wire: qubit });
            self.graph.add_edge(op_node, out_node, DagEdge { wire: qubit });
            self.wire_front.insert(qubit, op_node);
        }

        Ok(op_node)
    }

    /// All nodes (including In/Out) in deterministic topological order.
    ///
    /// Kahn's algorithm with a min-heap on node index. On a cyclic graph the
    /// result is shorter than the node count.
    pub fn topological_order(&self) -> Vec<NodeIndex> {
        let mut indegree: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        let mut ready = BinaryHeap::new();
        for node in self.graph.node_indices() {
            let degree = self.graph.edges_directed(node, Direction::Incoming).count();
            if degree == 0 {
                ready.push(Reverse(node));
            }
            indegree.insert(node, degree);
        }

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for edge in self.graph.edges_directed(node, Direction::Outgoing) {
                if let Some(degree) = indegree.get_mut(&edge.target()) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse(edge.target()));
                    }
                }
            }
        }
        order
    }

    /// Iterate over operations in topological order.
    pub fn topological_ops(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        self.topological_order()
            .into_iter()
            .filter_map(|idx| self.graph[idx].instruction().map(|inst| (idx, inst)))
    }

    /// Operation nodes with exactly `arity` operands, in topological order.
    pub fn ops_with_arity(&self, arity: usize) -> Vec<NodeIndex> {
        self.topological_ops()
            .filter(|(_, inst)| inst.is_gate() && inst.arity() == arity)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Partition the operations into layers of mutually independent nodes.
    ///
    /// Layer `k` holds every operation whose longest chain of predecessors
    /// has length `k`. Inside a layer, nodes keep topological order.
    pub fn layers(&self) -> Vec<Vec<NodeIndex>> {
        let mut level: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        let mut layers: Vec<Vec<NodeIndex>> = Vec::new();

        for node in self.topological_order() {
            if !self.graph[node].is_op() {
                continue;
            }
            let layer = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .filter_map(|e| level.get(&e.source()).map(|l| l + 1))
                .max()
                .unwrap_or(0);
            level.insert(node, layer);
            if layers.len() <= layer {
                layers.resize_with(layer + 1, Vec::new);
            }
            layers[layer].push(node);
        }
        layers
    }

    /// Get an instruction by node index.
    #[inline]
    pub fn get_instruction(&self, node: NodeIndex) -> Option<&Instruction> {
        self.graph.node_weight(node).and_then(|n| n.instruction())
    }

    /// Get a mutable instruction by node index.
    #[inline]
    pub fn get_instruction_mut(&mut self, node: NodeIndex) -> Option<&mut Instruction> {
        self.graph
            .node_weight_mut(node)
            .and_then(|n| n.instruction_mut())
    }

    /// Check whether a node index is still live.
    #[inline]
    pub fn contains_node(&self, node: NodeIndex) -> bool {
        self.graph.contains_node(node)
    }

    fn wire_neighbor(&self, node: NodeIndex, wire: QubitId, dir: Direction) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, dir)
            .find(|e| e.weight().wire == wire)
            .map(|e| match dir {
                Direction::Outgoing => e.target(),
                Direction::Incoming => e.source(),
            })
    }

    /// The next operation after `node` on `wire`, if any.
    pub fn next_on_wire(&self, node: NodeIndex, wire: QubitId) -> Option<NodeIndex> {
        self.wire_neighbor(node, wire, Direction::Outgoing)
            .filter(|n| self.graph[*n].is_op())
    }

    /// The operation before `node` on `wire`, if any.
    pub fn prev_on_wire(&self, node: NodeIndex, wire: QubitId) -> Option<NodeIndex> {
        self.wire_neighbor(node, wire, Direction::Incoming)
            .filter(|n| self.graph[*n].is_op())
    }

    /// Operations along one wire, from input to output.
    pub fn wire_ops(&self, wire: QubitId) -> Vec<NodeIndex> {
        let mut ops = Vec::new();
        let Some(&start) = self.qubit_inputs.get(&wire) else {
            return ops;
        };
        let mut current = self.next_on_wire(start, wire);
        while let Some(node) = current {
            ops.push(node);
            current = self.next_on_wire(node, wire);
        }
        ops
    }

    /// Remove an operation node, reconnecting each of its wires.
    pub fn remove_op(&mut self, node: NodeIndex) -> IrResult<Instruction> {
        match self.graph.node_weight(node) {
            Some(DagNode::Op(_)) => {}
            Some(_) => {
                return Err(IrError::BrokenGraph(
                    "Cannot remove non-operation node".into(),
                ));
            }
            None => return Err(IrError::InvalidNode),
        }

        let incoming: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| (e.source(), e.weight().wire))
            .collect();
        let outgoing: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.target(), e.weight().wire))
            .collect();

        for (pred, wire) in &incoming {
            if self.wire_front.get(wire) == Some(&node) {
                self.wire_front.insert(*wire, *pred);
            }
        }

        let Some(DagNode::Op(instruction)) = self.graph.remove_node(node) else {
            return Err(IrError::InvalidNode);
        };

        for (pred, wire) in &incoming {
            for (succ, succ_wire) in &outgoing {
                if wire == succ_wire {
                    self.graph.add_edge(*pred, *succ, DagEdge { wire: *wire });
                }
            }
        }

        Ok(instruction)
    }

    /// Replace a block of operations by a new instruction sequence, in place.
    ///
    /// `block` lists operation nodes in topological order. On every wire it
    /// touches, its nodes must be consecutive, and no path may leave the
    /// block and re-enter it. The replacement may only use wires of the
    /// block; it is spliced between the block's predecessor and successor
    /// on each wire, so the order of every other operation is untouched.
    /// Wires of the block that the replacement does not use are reconnected
    /// directly. Returns the new nodes in sequence order.
    pub fn replace_block(
        &mut self,
        block: &[NodeIndex],
        replacement: Vec<Instruction>,
    ) -> IrResult<Vec<NodeIndex>> {
        if block.is_empty() {
            return Err(IrError::BrokenGraph("Cannot replace an empty block".into()));
        }

        // Per-wire boundary: predecessor of the first block node and
        // successor of the last block node on that wire.
        let mut boundary: BTreeMap<QubitId, (NodeIndex, NodeIndex)> = BTreeMap::new();
        let mut last_on_wire: FxHashMap<QubitId, NodeIndex> = FxHashMap::default();
        for &node in block {
            let inst = self.get_instruction(node).ok_or(IrError::InvalidNode)?;
            for &wire in &inst.qubits {
                if let Some(&prev) = last_on_wire.get(&wire) {
                    if self.next_on_wire(prev, wire) != Some(node) {
                        return Err(IrError::BrokenGraph(format!(
                            "Block is not contiguous on wire {wire:?}"
                        )));
                    }
                }
                last_on_wire.insert(wire, node);
            }
        }
        for (&wire, &last) in &last_on_wire {
            let first = block
                .iter()
                .copied()
                .find(|&n| {
                    self.get_instruction(n)
                        .is_some_and(|inst| inst.qubits.contains(&wire))
                })
                .ok_or(IrError::InvalidNode)?;
            let pred = self
                .wire_neighbor(first, wire, Direction::Incoming)
                .ok_or_else(|| IrError::BrokenGraph(format!("Broken wire {wire:?}")))?;
            let succ = self
                .wire_neighbor(last, wire, Direction::Outgoing)
                .ok_or_else(|| IrError::BrokenGraph(format!("Broken wire {wire:?}")))?;
            boundary.insert(wire, (pred, succ));
        }

        for inst in &replacement {
            self.validate(inst)?;
            if let Some(&qubit) = inst.qubits.iter().find(|q| !boundary.contains_key(q)) {
                return Err(IrError::ForeignWire { qubit });
            }
        }

        for &node in block {
            self.graph.remove_node(node);
        }

        let mut cursor: BTreeMap<QubitId, NodeIndex> =
            boundary.iter().map(|(&w, &(pred, _))| (w, pred)).collect();
        let mut new_nodes = Vec::with_capacity(replacement.len());
        for inst in replacement {
            let qubits = inst.qubits.clone();
            let node = self.graph.add_node(DagNode::Op(inst));
            for wire in qubits {
                let prev = cursor[&wire];
                self.graph.add_edge(prev, node, DagEdge { wire });
                cursor.insert(wire, node);
            }
            new_nodes.push(node);
        }

        for (wire, (_, succ)) in boundary {
            let last = cursor[&wire];
            self.graph.add_edge(last, succ, DagEdge { wire });
            if self.graph[succ].is_output() {
                self.wire_front.insert(wire, last);
            }
        }

        Ok(new_nodes)
    }

    /// Substitute a node with a sequence of instructions on its own wires.
    pub fn substitute_node(
        &mut self,
        node: NodeIndex,
        replacement: impl IntoIterator<Item = Instruction>,
    ) -> IrResult<Vec<NodeIndex>> {
        self.replace_block(&[node], replacement.into_iter().collect())
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubit_inputs.len()
    }

    /// Get the number of operations.
    #[inline]
    pub fn num_ops(&self) -> usize {
        let io_nodes = 2 * self.qubit_inputs.len();
        self.graph.node_count().saturating_sub(io_nodes)
    }

    /// Count operations by name.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for (_, inst) in self.topological_ops() {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Calculate the circuit depth.
    pub fn depth(&self) -> usize {
        self.layers().len()
    }

    /// Iterate over qubits in ascending order.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.qubit_inputs.keys().copied()
    }

    /// Get the input node for a qubit.
    #[inline]
    pub fn qubit_input_node(&self, qubit: QubitId) -> Option<NodeIndex> {
        self.qubit_inputs.get(&qubit).copied()
    }

    /// Get the abstraction level of this circuit.
    pub fn level(&self) -> CircuitLevel {
        self.level
    }

    /// Set the abstraction level of this circuit.
    pub fn set_level(&mut self, level: CircuitLevel) {
        self.level = level;
    }

    /// Get a reference to the underlying graph.
    pub fn graph(&self) -> &StableDiGraph<DagNode, DagEdge, u32> {
        &self.graph
    }

    /// Verify the structural integrity of the DAG.
    ///
    /// Checks that:
    /// - The graph is acyclic
    /// - Every qubit has exactly one In node and one Out node
    /// - Wire edges form valid paths from In to Out for each wire
    /// - Every operation has one incoming and one outgoing edge per operand
    pub fn verify_integrity(&self) -> IrResult<()> {
        if petgraph::algo::is_cyclic_directed(&self.graph) {
            return Err(IrError::BrokenGraph("Graph contains a cycle".into()));
        }

        if self.qubit_inputs.len() != self.qubit_outputs.len()
            || self
                .qubit_inputs
                .keys()
                .any(|q| !self.qubit_outputs.contains_key(q))
        {
            return Err(IrError::BrokenGraph(
                "Qubit In and Out nodes do not match".into(),
            ));
        }

        for (&qubit, &in_node) in &self.qubit_inputs {
            let out_node = self.qubit_outputs[&qubit];
            let mut current = in_node;
            let mut steps = 0;
            let max_steps = self.graph.node_count();

            while current != out_node {
                current = self
                    .wire_neighbor(current, qubit, Direction::Outgoing)
                    .ok_or_else(|| {
                        IrError::BrokenGraph(format!(
                            "Wire for qubit {qubit:?} is broken: no outgoing edge from node {current:?}"
                        ))
                    })?;
                steps += 1;
                if steps > max_steps {
                    return Err(IrError::BrokenGraph(format!(
                        "Wire for qubit {qubit:?} has too many steps (possible infinite loop)"
                    )));
                }
            }
            if self.wire_front.get(&qubit)
                != self.wire_neighbor(out_node, qubit, Direction::Incoming).as_ref()
            {
                return Err(IrError::BrokenGraph(format!(
                    "Wire front for qubit {qubit:?} is stale"
                )));
            }
        }

        for node in self.graph.node_indices() {
            let Some(inst) = self.graph[node].instruction() else {
                continue;
            };
            for &wire in &inst.qubits {
                let count = |dir| {
                    self.graph
                        .edges_directed(node, dir)
                        .filter(|e| e.weight().wire == wire)
                        .count()
                };
                if count(Direction::Incoming) != 1 || count(Direction::Outgoing) != 1 {
                    return Err(IrError::BrokenGraph(format!(
                        "Operation {node:?} is not threaded exactly once on wire {wire:?}"
                    )));
                }
            }
            let degree = self.graph.edges_directed(node, Direction::Incoming).count();
            if degree != inst.qubits.len() {
                return Err(IrError::BrokenGraph(format!(
                    "Operation {node:?} carries edges for wires it does not act on"
                )));
            }
        }

        Ok(())
    }
}

impl Default for CircuitDag {
    fn default() -> Self {
        Self::new()
    }
}
