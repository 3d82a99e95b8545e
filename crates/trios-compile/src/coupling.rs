//! Target topology: which physical qubits may interact, and in which direction.

use std::collections::VecDeque;

use petgraph::graph::UnGraph;
use serde::{Deserialize, Serialize};

use crate::error::{CompileError, CompileResult};

/// Direction of a two-qubit interaction relative to the native calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// The requested control is the native control of the edge.
    Forward,
    /// The requested control is the native target; the gate must be reversed.
    Backward,
}

/// Target device coupling map.
///
/// Each edge is stored as `(control, target)` in its native direction. The
/// adjacency relation itself is undirected: `is_adjacent(a, b)` holds if
/// either direction was added. Listing both directions makes an edge
/// natively bidirectional.
///
/// ## Performance
///
/// On construction, an all-pairs distance matrix is precomputed using BFS
/// from each node, so `distance()` is O(1) and `shortest_path()` is
/// O(distance · degree).
///
/// ## Deserialization
///
/// After deserialization, call [`rebuild_caches()`](Self::rebuild_caches) to
/// recompute the adjacency lists and the distance matrix, which are not
/// serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingMap {
    /// Native directed edges `(control, target)`.
    edges: Vec<(u32, u32)>,
    /// Number of physical qubits.
    num_qubits: u32,
    /// Sorted undirected neighbour lists.
    #[serde(skip)]
    adjacency: Vec<Vec<u32>>,
    /// `dist_matrix[from][to]`: hop count, or `u32::MAX` if unreachable.
    #[serde(skip)]
    dist_matrix: Vec<Vec<u32>>,
}

impl CouplingMap {
    /// Create a new coupling map with the given number of qubits and no edges.
    pub fn new(num_qubits: u32) -> Self {
        let mut map = Self {
            edges: vec![],
            num_qubits,
            adjacency: vec![],
            dist_matrix: vec![],
        };
        map.rebuild_caches();
        map
    }

    /// Build a coupling map from a list of native directed edges.
    pub fn from_edges(num_qubits: u32, edges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut map = Self {
            edges: vec![],
            num_qubits,
            adjacency: vec![],
            dist_matrix: vec![],
        };
        for (a, b) in edges {
            map.push_edge(a, b);
        }
        map.rebuild_caches();
        map
    }

    fn push_edge(&mut self, control: u32, target: u32) -> bool {
        if control == target
            || control >= self.num_qubits
            || target >= self.num_qubits
            || self.edges.contains(&(control, target))
        {
            return false;
        }
        self.edges.push((control, target));
        true
    }

    /// Add a native edge `control -> target`.
    ///
    /// Self-loops, out-of-range endpoints and exact duplicates are ignored.
    pub fn add_edge(&mut self, control: u32, target: u32) {
        if self.push_edge(control, target) {
            self.rebuild_caches();
        }
    }

    /// Add an edge that is native in both directions.
    pub fn add_bidirectional_edge(&mut self, q1: u32, q2: u32) {
        let added = self.push_edge(q1, q2) | self.push_edge(q2, q1);
        if added {
            self.rebuild_caches();
        }
    }

    /// Rebuild the adjacency lists and the distance matrix from the edge list.
    pub fn rebuild_caches(&mut self) {
        let n = self.num_qubits as usize;
        self.adjacency = vec![vec![]; n];
        for &(a, b) in &self.edges {
            let (a, b) = (a as usize, b as usize);
            if a >= n || b >= n {
                continue;
            }
            if !self.adjacency[a].contains(&(b as u32)) {
                self.adjacency[a].push(b as u32);
            }
            if !self.adjacency[b].contains(&(a as u32)) {
                self.adjacency[b].push(a as u32);
            }
        }
        for neighbors in &mut self.adjacency {
            neighbors.sort_unstable();
        }
        self.dist_matrix = (0..n).map(|src| self.bfs(src as u32, &[])).collect();
    }

    /// BFS hop counts from `src`, never entering `blocked`.
    fn bfs(&self, src: u32, blocked: &[u32]) -> Vec<u32> {
        let n = self.num_qubits as usize;
        let mut dist = vec![u32::MAX; n];
        if (src as usize) >= n {
            return dist;
        }
        dist[src as usize] = 0;
        let mut queue = VecDeque::from([src]);
        while let Some(current) = queue.pop_front() {
            let next = dist[current as usize] + 1;
            for &neighbor in &self.adjacency[current as usize] {
                if blocked.contains(&neighbor) || dist[neighbor as usize] != u32::MAX {
                    continue;
                }
                dist[neighbor as usize] = next;
                queue.push_back(neighbor);
            }
        }
        dist
    }

    fn check_qubit(&self, qubit: u32) -> CompileResult<()> {
        if qubit < self.num_qubits {
            Ok(())
        } else {
            Err(CompileError::StructuralViolation(format!(
                "physical qubit {qubit} outside a topology of {} qubits",
                self.num_qubits
            )))
        }
    }

    /// Get the number of physical qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Get the native directed edges.
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Neighbours of a qubit in ascending order.
    pub fn neighbors(&self, qubit: u32) -> impl Iterator<Item = u32> + '_ {
        self.adjacency
            .get(qubit as usize)
            .into_iter()
            .flatten()
            .copied()
    }

    /// Check if two qubits share an edge (in either direction).
    #[inline]
    pub fn is_adjacent(&self, q1: u32, q2: u32) -> bool {
        self.adjacency
            .get(q1 as usize)
            .is_some_and(|neighbors| neighbors.binary_search(&q2).is_ok())
    }

    /// Whether every qubit can reach every other one.
    pub fn is_connected(&self) -> bool {
        let mut graph = UnGraph::<(), ()>::with_capacity(self.num_qubits as usize, self.edges.len());
        let nodes: Vec<_> = (0..self.num_qubits).map(|_| graph.add_node(())).collect();
        for &(a, b) in &self.edges {
            graph.add_edge(nodes[a as usize], nodes[b as usize], ());
        }
        petgraph::algo::connected_components(&graph) <= 1
    }

    /// Hop distance between two qubits. Zero iff `from == to`.
    pub fn distance(&self, from: u32, to: u32) -> CompileResult<u32> {
        self.check_qubit(from)?;
        self.check_qubit(to)?;
        match self.dist_matrix[from as usize][to as usize] {
            u32::MAX => Err(CompileError::UnreachableTopology { from, to }),
            d => Ok(d),
        }
    }

    /// The lexicographically smallest shortest path from `from` to `to`,
    /// both endpoints included.
    pub fn shortest_path(&self, from: u32, to: u32) -> CompileResult<Vec<u32>> {
        self.check_qubit(from)?;
        self.check_qubit(to)?;
        let dist = &self.dist_matrix[to as usize];
        Self::walk(&self.adjacency, dist, from).ok_or(CompileError::UnreachableTopology { from, to })
    }

    /// Like [`shortest_path`](Self::shortest_path) on the topology with the
    /// `blocked` qubits removed. Returns `None` if no such path exists.
    pub fn shortest_path_avoiding(&self, from: u32, to: u32, blocked: &[u32]) -> Option<Vec<u32>> {
        if from >= self.num_qubits || to >= self.num_qubits {
            return None;
        }
        if blocked.contains(&from) || blocked.contains(&to) {
            return None;
        }
        let dist = self.bfs(to, blocked);
        Self::walk(&self.adjacency, &dist, from)
    }

    /// Greedy descent on distances-to-target, always taking the smallest
    /// neighbour one hop closer.
    fn walk(adjacency: &[Vec<u32>], dist_to_target: &[u32], from: u32) -> Option<Vec<u32>> {
        if dist_to_target[from as usize] == u32::MAX {
            return None;
        }
        let mut path = vec![from];
        let mut current = from;
        while dist_to_target[current as usize] > 0 {
            let want = dist_to_target[current as usize] - 1;
            current = adjacency[current as usize]
                .iter()
                .copied()
                .find(|&n| dist_to_target[n as usize] == want)?;
            path.push(current);
        }
        Some(path)
    }

    /// Direction of `control -> target` relative to the native edge.
    pub fn orientation(&self, control: u32, target: u32) -> CompileResult<Orientation> {
        if self.edges.contains(&(control, target)) {
            Ok(Orientation::Forward)
        } else if self.edges.contains(&(target, control)) {
            Ok(Orientation::Backward)
        } else {
            Err(CompileError::NotAdjacent {
                gate: "cx".into(),
                qubits: vec![control, target],
            })
        }
    }

    /// Create a linear coupling map (0->1->2->...).
    pub fn linear(n: u32) -> Self {
        Self::from_edges(n, (0..n.saturating_sub(1)).map(|i| (i, i + 1)))
    }

    /// Create a ring: a linear map closed by `n-1 -> 0`.
    pub fn ring(n: u32) -> Self {
        let mut edges: Vec<_> = (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect();
        if n > 2 {
            edges.push((n - 1, 0));
        }
        Self::from_edges(n, edges)
    }

    /// Create a fully connected coupling map, lower index as native control.
    pub fn full(n: u32) -> Self {
        Self::from_edges(n, (0..n).flat_map(|i| ((i + 1)..n).map(move |j| (i, j))))
    }

    /// Create a star topology (center qubit 0 connected to all others).
    pub fn star(n: u32) -> Self {
        Self::from_edges(n, (1..n).map(|i| (0, i)))
    }

    /// Create a `rows x cols` grid, qubit `r * cols + c`.
    pub fn grid(rows: u32, cols: u32) -> Self {
        let mut edges = vec![];
        for r in 0..rows {
            for c in 0..cols {
                let q = r * cols + c;
                if c + 1 < cols {
                    edges.push((q, q + 1));
                }
                if r + 1 < rows {
                    edges.push((q, q + cols));
                }
            }
        }
        Self::from_edges(rows * cols, edges)
    }
}
