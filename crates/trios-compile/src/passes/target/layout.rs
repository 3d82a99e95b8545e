//! Layout passes for mapping logical qubits to physical qubits.

use tracing::debug;
use trios_ir::{CircuitDag, CircuitLevel, QubitId};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{Layout, PropertySet};

/// Trivial layout pass.
///
/// Maps logical qubit i to physical qubit i over the whole device register.
/// Qubits the program does not use become ancillas.
pub struct TrivialLayout;

impl Pass for TrivialLayout {
    fn name(&self) -> &'static str {
        "TrivialLayout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties.require_coupling_map()?;

        let num_logical = dag.num_qubits();
        let num_physical = coupling_map.num_qubits();
        if num_logical > num_physical as usize {
            return Err(CompileError::CapacityExceeded {
                required: num_logical,
                available: num_physical,
            });
        }

        properties.layout = Some(Layout::trivial(num_physical));
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.layout.is_none() && properties.coupling_map.is_some()
    }
}

/// Rewrite a logical circuit onto physical wires.
///
/// Every operand is relabelled through the initial layout and the result
/// carries one wire per physical qubit. The circuit is then marked
/// [`CircuitLevel::Physical`]; later passes read wire ids as physical
/// positions.
pub struct ApplyLayout;

impl Pass for ApplyLayout {
    fn name(&self) -> &'static str {
        "ApplyLayout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let num_physical = properties.require_coupling_map()?.num_qubits();
        let layout = properties.layout.as_ref().ok_or(CompileError::MissingLayout)?;

        if layout.len() != num_physical as usize {
            return Err(CompileError::InvalidLayout(format!(
                "layout covers {} qubits but the target has {num_physical}",
                layout.len()
            )));
        }
        if dag.num_qubits() > layout.len() {
            return Err(CompileError::CapacityExceeded {
                required: dag.num_qubits(),
                available: num_physical,
            });
        }
        if let Some(wire) = dag.qubits().find(|&q| layout.physical_of(q).is_none()) {
            return Err(CompileError::StructuralViolation(format!(
                "wire {wire} has no physical qubit in the layout"
            )));
        }

        let mut physical = CircuitDag::new();
        for p in 0..num_physical {
            physical.add_qubit(QubitId(p));
        }
        for (_, inst) in dag.topological_ops() {
            let mapped = inst.remapped(|q| layout.physical_of(q).map_or(q, QubitId));
            physical.apply(mapped)?;
        }
        physical.set_level(CircuitLevel::Physical);

        debug!(
            "Applied layout to {} ops on {} physical qubits",
            physical.num_ops(),
            num_physical
        );
        *dag = physical;
        Ok(())
    }

    fn should_run(&self, dag: &CircuitDag, properties: &PropertySet) -> bool {
        dag.level() == CircuitLevel::Logical && properties.layout.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupling::CouplingMap;
    use trios_ir::{Circuit, StandardGate};

    #[test]
    fn test_trivial_layout() {
        let mut circuit = Circuit::with_size("test", 3);
        circuit.h(QubitId(0)).unwrap();
        let mut dag = circuit.into_dag();

        let mut props = PropertySet::new().with_coupling_map(CouplingMap::linear(5));
        TrivialLayout.run(&mut dag, &mut props).unwrap();

        let layout = props.layout.as_ref().unwrap();
        assert_eq!(layout.len(), 5);
        assert_eq!(layout.physical_of(QubitId(0)), Some(0));
        assert_eq!(layout.physical_of(QubitId(2)), Some(2));
        assert_eq!(layout.logical_of(4), Some(QubitId(4)));
        assert_eq!(dag.level(), CircuitLevel::Logical);
    }

    #[test]
    fn test_trivial_layout_too_large() {
        let circuit = Circuit::with_size("test", 10);
        let mut dag = circuit.into_dag();

        let mut props = PropertySet::new().with_coupling_map(CouplingMap::linear(5));
        let result = TrivialLayout.run(&mut dag, &mut props);
        assert!(matches!(
            result,
            Err(CompileError::CapacityExceeded {
                required: 10,
                available: 5
            })
        ));
    }

    #[test]
    fn test_trivial_layout_keeps_user_layout() {
        let props = PropertySet::new()
            .with_coupling_map(CouplingMap::linear(3))
            .with_layout(Layout::from_physical(vec![2, 1, 0]).unwrap());
        assert!(!TrivialLayout.should_run(&CircuitDag::new(), &props));
    }

    #[test]
    fn test_apply_layout() {
        let mut circuit = Circuit::with_size("test", 2);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        let mut dag = circuit.into_dag();

        let mut props = PropertySet::new()
            .with_coupling_map(CouplingMap::linear(3))
            .with_layout(Layout::from_physical(vec![2, 0, 1]).unwrap());
        ApplyLayout.run(&mut dag, &mut props).unwrap();

        assert_eq!(dag.level(), CircuitLevel::Physical);
        assert_eq!(dag.num_qubits(), 3);
        let (_, inst) = dag.topological_ops().next().unwrap();
        assert_eq!(inst.standard_gate(), Some(StandardGate::CX));
        assert_eq!(inst.qubits, vec![QubitId(2), QubitId(0)]);
        dag.verify_integrity().unwrap();
    }

    #[test]
    fn test_apply_layout_size_mismatch() {
        let mut dag = Circuit::with_size("test", 2).into_dag();
        let mut props = PropertySet::new()
            .with_coupling_map(CouplingMap::linear(3))
            .with_layout(Layout::trivial(2));
        assert!(matches!(
            ApplyLayout.run(&mut dag, &mut props),
            Err(CompileError::InvalidLayout(_))
        ));
    }
}
