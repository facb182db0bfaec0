//! The analytic Markov model - the exact joint-state transition system
//! implied by the revision rule, without tie-resolving randomness.
//!
//! Built from a frozen snapshot of an [`InfluenceGraph`]'s topology and
//! model universe, a [`MarkovModel`] enumerates every joint configuration
//! (one representative model per agent), derives the deterministic tie-set
//! transition structure, assembles a row-stochastic transition matrix, and
//! extracts long-run behavior through eigen-analysis.
//!
//! Two documented simplifications relative to the stochastic engine:
//! - Scoring uses each connection's *single representative* model, not its
//!   whole belief set. Once every agent holds a singleton (after any round
//!   of [`InfluenceGraph::update`]) the two rules coincide.
//! - Reachable next states are weighted `1 / |reachable set|`, i.e. the
//!   agents' tiebreaks are assumed independent and uniform.
//!
//! Topology changes invalidate the snapshot; rebuild the model.

use crate::graph::{GraphError, InfluenceGraph};
use crate::interpretation::{Interpretation, InterpretationError};
use nalgebra::{Complex, DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Absolute tolerance when matching an eigenvalue against 1.
pub const STATIONARY_TOLERANCE: f64 = 1e-6;

/// Singular values below this are treated as zero in null-space extraction.
const NULLSPACE_TOLERANCE: f64 = 1e-6;

/// Eigenvalues closer than this are treated as one repeated eigenvalue.
const EIGENVALUE_CLUSTER_TOLERANCE: f64 = 1e-6;

/// Errors raised by the analytic model.
#[derive(Debug, Error, PartialEq)]
pub enum MarkovError {
    #[error(transparent)]
    Interpretation(#[from] InterpretationError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    /// No eigenvalue lies within [`STATIONARY_TOLERANCE`] of 1.
    #[error("no eigenvalue within tolerance of 1; stationary distribution not found")]
    NoStationaryDistributionFound,

    /// The matrix has no full eigenvector basis.
    #[error("matrix is not diagonalizable")]
    NotDiagonalizable,

    /// Input the model cannot be built from or applied to.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
}

/// An assignment of exactly one universe model to every agent.
///
/// Stored as one universe index per agent, in roster order; the matrix
/// forms (one column per agent, or one-hot coordinates) are derived views.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JointState {
    assignment: Vec<usize>,
}

impl JointState {
    /// Creates a joint state from per-agent universe indices.
    pub fn new(assignment: Vec<usize>) -> Self {
        Self { assignment }
    }

    /// Universe index per agent, in roster order.
    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }

    /// Number of agents this state assigns.
    pub fn agent_count(&self) -> usize {
        self.assignment.len()
    }
}

/// The exact joint-state transition system for one graph snapshot.
#[derive(Debug, Clone)]
pub struct MarkovModel {
    universe: Vec<Interpretation>,
    agent_names: Vec<String>,
    /// Propositions x universe models; column `j` is universe model `j`.
    model_matrix: DMatrix<f64>,
    /// One-hot universe-index x agent encoding of the agents' current
    /// representatives. Invariant: exactly one 1 per column.
    coord_matrix: DMatrix<f64>,
    /// `adjacency[(i, j)] = 1` iff agent `j` appears in agent `i`'s
    /// connection list.
    adjacency: DMatrix<f64>,
    states: Vec<JointState>,
    state_index: HashMap<Vec<usize>, usize>,
}

impl MarkovModel {
    /// Freezes a snapshot of the graph's universe, topology, and current
    /// representatives, and enumerates the full joint-state space.
    ///
    /// Fails with [`MarkovError::DegenerateInput`] if a representative is
    /// outside the universe or the `|universe|^|agents|` state count
    /// overflows.
    pub fn new(graph: &InfluenceGraph) -> Result<Self, MarkovError> {
        let universe = graph.universe().to_vec();
        let width = universe[0].len();
        let agent_count = graph.agents().len();

        let agent_names: Vec<String> = graph
            .agents()
            .iter()
            .map(|a| a.name().to_string())
            .collect();

        let model_matrix = DMatrix::from_fn(width, universe.len(), |i, j| {
            if universe[j].get(i).unwrap_or(false) {
                1.0
            } else {
                0.0
            }
        });

        // One-hot columns for the agents' current single representatives.
        let mut coord_matrix = DMatrix::zeros(universe.len(), agent_count);
        for (col, agent) in graph.agents().iter().enumerate() {
            let row = universe
                .iter()
                .position(|m| m == agent.model())
                .ok_or_else(|| {
                    MarkovError::DegenerateInput(format!(
                        "agent {} holds model {} outside the universe",
                        agent.name(),
                        agent.model()
                    ))
                })?;
            coord_matrix[(row, col)] = 1.0;
        }

        let mut adjacency = DMatrix::zeros(agent_count, agent_count);
        for (i, id) in graph.agent_ids().enumerate() {
            for conn in graph.connections(id)? {
                adjacency[(i, conn.index())] = 1.0;
            }
        }

        let states = enumerate_joint_states(universe.len(), agent_count)?;
        let state_index = states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.assignment.clone(), i))
            .collect();

        Ok(Self {
            universe,
            agent_names,
            model_matrix,
            coord_matrix,
            adjacency,
            states,
            state_index,
        })
    }

    /// The frozen model universe.
    pub fn universe(&self) -> &[Interpretation] {
        &self.universe
    }

    /// Agent names, in roster order.
    pub fn agent_names(&self) -> &[String] {
        &self.agent_names
    }

    /// Propositions x universe model matrix.
    pub fn model_matrix(&self) -> &DMatrix<f64> {
        &self.model_matrix
    }

    /// One-hot encoding of the snapshot's current representatives.
    pub fn coordinate_matrix(&self) -> &DMatrix<f64> {
        &self.coord_matrix
    }

    /// Agents x agents 0/1 adjacency matrix.
    pub fn adjacency(&self) -> &DMatrix<f64> {
        &self.adjacency
    }

    /// Every joint state, in lexicographic product order.
    pub fn states(&self) -> &[JointState] {
        &self.states
    }

    /// One-hot encodes a joint state: universe-index rows, agent columns,
    /// exactly one 1 per column.
    pub fn encode_state(&self, state: &JointState) -> Result<DMatrix<f64>, MarkovError> {
        self.check_state(state)?;
        let mut coord = DMatrix::zeros(self.universe.len(), state.agent_count());
        for (col, &row) in state.assignment.iter().enumerate() {
            coord[(row, col)] = 1.0;
        }
        Ok(coord)
    }

    /// Decodes a one-hot coordinate matrix back to a joint state.
    ///
    /// Rejects any column that does not hold exactly one 1 (and zeros
    /// elsewhere).
    pub fn decode_state(&self, coord: &DMatrix<f64>) -> Result<JointState, MarkovError> {
        if coord.nrows() != self.universe.len() {
            return Err(MarkovError::DegenerateInput(format!(
                "coordinate matrix has {} rows for a universe of {}",
                coord.nrows(),
                self.universe.len()
            )));
        }

        let mut assignment = Vec::with_capacity(coord.ncols());
        for col in 0..coord.ncols() {
            let mut hit = None;
            for row in 0..coord.nrows() {
                let entry = coord[(row, col)];
                if (entry - 1.0).abs() < 0.5 {
                    if hit.replace(row).is_some() {
                        return Err(MarkovError::DegenerateInput(format!(
                            "coordinate column {col} holds more than one 1"
                        )));
                    }
                } else if entry.abs() > 0.5 {
                    return Err(MarkovError::DegenerateInput(format!(
                        "coordinate column {col} holds a non-0/1 entry"
                    )));
                }
            }
            assignment.push(hit.ok_or_else(|| {
                MarkovError::DegenerateInput(format!("coordinate column {col} holds no 1"))
            })?);
        }

        Ok(JointState::new(assignment))
    }

    /// Renders a joint state as a propositions x agents matrix, one model
    /// column per agent.
    pub fn state_matrix(&self, state: &JointState) -> Result<DMatrix<f64>, MarkovError> {
        self.check_state(state)?;
        let width = self.model_matrix.nrows();
        let mut matrix = DMatrix::zeros(width, state.agent_count());
        for (col, &idx) in state.assignment.iter().enumerate() {
            for row in 0..width {
                matrix[(row, col)] = self.model_matrix[(row, idx)];
            }
        }
        Ok(matrix)
    }

    /// All-pairs Hamming distances between the models-as-rows of `a` and
    /// the models-as-columns of `b`.
    ///
    /// Fails with a length mismatch unless `a.ncols() == b.nrows()`.
    pub fn model_distances(a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<DMatrix<f64>, MarkovError> {
        if a.ncols() != b.nrows() {
            return Err(InterpretationError::LengthMismatch {
                left: a.ncols(),
                right: b.nrows(),
            }
            .into());
        }

        let mut distances = DMatrix::zeros(a.nrows(), b.ncols());
        for i in 0..a.nrows() {
            for j in 0..b.ncols() {
                let mut count = 0u32;
                for k in 0..a.ncols() {
                    if (a[(i, k)] - b[(k, j)]).abs() > 0.5 {
                        count += 1;
                    }
                }
                distances[(i, j)] = f64::from(count);
            }
        }
        Ok(distances)
    }

    /// The deterministic revision rule applied to one joint state.
    ///
    /// Scores every universe candidate against each agent's connections'
    /// representatives in `state` and marks every index tied for the
    /// per-agent minimum: the result is a universe-index x agent matrix
    /// with 1 on each agent's tie set. A pure function of its inputs.
    pub fn update_from_state(&self, state: &JointState) -> Result<DMatrix<f64>, MarkovError> {
        let distances =
            Self::model_distances(&self.model_matrix.transpose(), &self.state_matrix(state)?)?;
        let scores = distances * self.adjacency.transpose();

        let mut ties = DMatrix::zeros(scores.nrows(), scores.ncols());
        for col in 0..scores.ncols() {
            let min = scores.column(col).min();
            for row in 0..scores.nrows() {
                if scores[(row, col)] <= min + 0.5 {
                    ties[(row, col)] = 1.0;
                }
            }
        }
        Ok(ties)
    }

    /// Every joint state reachable in one step from a tie matrix: the
    /// Cartesian product, across agents, of the per-agent tie sets.
    ///
    /// Under the independence assumption each product state carries
    /// probability `1 / |product|`.
    pub fn possible_next_states(&self, ties: &DMatrix<f64>) -> Result<Vec<JointState>, MarkovError> {
        let mut tie_sets: Vec<Vec<usize>> = Vec::with_capacity(ties.ncols());
        for col in 0..ties.ncols() {
            let set: Vec<usize> = (0..ties.nrows())
                .filter(|&row| ties[(row, col)] > 0.5)
                .collect();
            if set.is_empty() {
                return Err(MarkovError::DegenerateInput(format!(
                    "tie matrix column {col} is empty"
                )));
            }
            tie_sets.push(set);
        }

        // Lexicographic product, first agent varying slowest.
        let mut product: Vec<Vec<usize>> = vec![Vec::new()];
        for set in &tie_sets {
            let mut next = Vec::with_capacity(product.len() * set.len());
            for prefix in &product {
                for &choice in set {
                    let mut extended = prefix.clone();
                    extended.push(choice);
                    next.push(extended);
                }
            }
            product = next;
        }

        Ok(product.into_iter().map(JointState::new).collect())
    }

    /// Assembles the full transition matrix: rows are source states in
    /// enumeration order, columns destination states, and each row spreads
    /// its mass uniformly over the states reachable from it. Row-stochastic
    /// by construction.
    pub fn transition_matrix(&self) -> Result<DMatrix<f64>, MarkovError> {
        let n = self.states.len();
        let mut transition = DMatrix::zeros(n, n);

        for (i, state) in self.states.iter().enumerate() {
            let ties = self.update_from_state(state)?;
            let next = self.possible_next_states(&ties)?;
            let mass = 1.0 / next.len() as f64;

            for successor in &next {
                let j = *self.state_index.get(successor.assignment()).ok_or_else(|| {
                    MarkovError::DegenerateInput(format!(
                        "successor {:?} outside the enumerated state space",
                        successor.assignment()
                    ))
                })?;
                transition[(i, j)] = mass;
            }
        }

        Ok(transition)
    }

    /// Extracts a stationary distribution from a row-stochastic transition
    /// matrix by eigen-analysis.
    ///
    /// Locates an eigenvalue within [`STATIONARY_TOLERANCE`] of 1, takes
    /// the associated left eigenspace (the null space of `Pᵀ - I`), and
    /// returns its minimum-norm member normalized to component sum 1. For
    /// an irreducible chain that is exactly the normalized eigenvector; for
    /// a reducible chain it is a positive mixture of the per-class
    /// stationary vectors.
    pub fn find_stationary(transition: &DMatrix<f64>) -> Result<DVector<f64>, MarkovError> {
        let n = check_square(transition)?;

        let eigenvalues = transition.complex_eigenvalues();
        let near_one = eigenvalues
            .iter()
            .any(|lambda| (lambda - Complex::new(1.0, 0.0)).norm() < STATIONARY_TOLERANCE);
        if !near_one {
            return Err(MarkovError::NoStationaryDistributionFound);
        }

        // Left eigenvectors at 1 = null space of P^T - I.
        let shifted = transition.transpose() - DMatrix::identity(n, n);
        let svd = shifted.svd(false, true);
        let v_t = svd
            .v_t
            .ok_or_else(|| MarkovError::DegenerateInput("SVD produced no basis".to_string()))?;

        // Minimum-norm sum-1 combination of the orthonormal null basis:
        // x = sum_i s_i v_i / sum_i s_i^2 with s_i the component sum of v_i.
        let mut x = DVector::zeros(n);
        let mut weight = 0.0;
        for (i, &sigma) in svd.singular_values.iter().enumerate() {
            if sigma < NULLSPACE_TOLERANCE {
                let v = v_t.row(i).transpose();
                let s: f64 = v.sum();
                x += v * s;
                weight += s * s;
            }
        }

        if weight < NULLSPACE_TOLERANCE {
            return Err(MarkovError::NoStationaryDistributionFound);
        }
        x /= weight;

        // Float hygiene: the construction already sums to 1 up to rounding.
        let total = x.sum();
        if total.abs() < NULLSPACE_TOLERANCE {
            return Err(MarkovError::NoStationaryDistributionFound);
        }
        Ok(x / total)
    }

    /// Raises a matrix to a large power through its eigendecomposition:
    /// `V D^k V^{-1}`, recombined from the eigenvector basis.
    ///
    /// Valid only for diagonalizable matrices; fails with
    /// [`MarkovError::NotDiagonalizable`] when no full eigenbasis exists.
    /// Used as a cross-check against [`MarkovModel::find_stationary`] for
    /// large exponents.
    pub fn fast_power(matrix: &DMatrix<f64>, exponent: u32) -> Result<DMatrix<f64>, MarkovError> {
        let n = check_square(matrix)?;

        let eigenvalues = matrix.complex_eigenvalues();
        let complex: DMatrix<Complex<f64>> = matrix.map(|x| Complex::new(x, 0.0));

        // Cluster repeated eigenvalues, then pull each cluster's eigenspace
        // out of the null space of A - lambda I.
        let mut basis: Vec<DVector<Complex<f64>>> = Vec::with_capacity(n);
        let mut diagonal: Vec<Complex<f64>> = Vec::with_capacity(n);
        let mut claimed = vec![false; n];

        for i in 0..n {
            if claimed[i] {
                continue;
            }
            let lambda = eigenvalues[i];
            let mut multiplicity = 0;
            for (j, flag) in claimed.iter_mut().enumerate() {
                if !*flag && (eigenvalues[j] - lambda).norm() < EIGENVALUE_CLUSTER_TOLERANCE {
                    *flag = true;
                    multiplicity += 1;
                }
            }

            let mut shifted = complex.clone();
            for d in 0..n {
                shifted[(d, d)] -= lambda;
            }
            let svd = shifted.svd(false, true);
            let v_t = svd
                .v_t
                .ok_or_else(|| MarkovError::DegenerateInput("SVD produced no basis".to_string()))?;

            // Geometric multiplicity below algebraic means a defective
            // eigenvalue.
            let mut null_rows: Vec<(usize, f64)> = svd
                .singular_values
                .iter()
                .enumerate()
                .filter(|(_, sigma)| **sigma < NULLSPACE_TOLERANCE)
                .map(|(row, sigma)| (row, *sigma))
                .collect();
            if null_rows.len() < multiplicity {
                return Err(MarkovError::NotDiagonalizable);
            }
            null_rows.sort_by(|a, b| a.1.total_cmp(&b.1));

            for &(row, _) in null_rows.iter().take(multiplicity) {
                basis.push(v_t.row(row).adjoint());
                diagonal.push(lambda);
            }
        }

        if basis.len() != n {
            return Err(MarkovError::NotDiagonalizable);
        }

        let eigenvectors = DMatrix::from_columns(&basis);
        let inverse = eigenvectors
            .clone()
            .try_inverse()
            .ok_or(MarkovError::NotDiagonalizable)?;

        let mut powered = DMatrix::zeros(n, n);
        for (d, lambda) in diagonal.iter().enumerate() {
            powered[(d, d)] = lambda.powu(exponent);
        }

        let result = eigenvectors * powered * inverse;
        Ok(result.map(|c| c.re))
    }

    fn check_state(&self, state: &JointState) -> Result<(), MarkovError> {
        if state.agent_count() != self.agent_names.len() {
            return Err(MarkovError::DegenerateInput(format!(
                "joint state assigns {} agents, model has {}",
                state.agent_count(),
                self.agent_names.len()
            )));
        }
        for &idx in state.assignment() {
            if idx >= self.universe.len() {
                return Err(MarkovError::DegenerateInput(format!(
                    "universe index {idx} out of range"
                )));
            }
        }
        Ok(())
    }
}

/// Enumerates every assignment of one universe model per agent, in the
/// lexicographic order of the repeated Cartesian product (first agent
/// varying slowest).
fn enumerate_joint_states(
    universe_size: usize,
    agent_count: usize,
) -> Result<Vec<JointState>, MarkovError> {
    let count = universe_size
        .checked_pow(agent_count as u32)
        .ok_or_else(|| {
            MarkovError::DegenerateInput(format!(
                "state space {universe_size}^{agent_count} overflows"
            ))
        })?;

    let mut states = Vec::with_capacity(count);
    let mut assignment = vec![0usize; agent_count];
    for _ in 0..count {
        states.push(JointState::new(assignment.clone()));

        // Odometer increment, last agent fastest.
        for pos in (0..agent_count).rev() {
            assignment[pos] += 1;
            if assignment[pos] < universe_size {
                break;
            }
            assignment[pos] = 0;
        }
    }

    Ok(states)
}

fn check_square(matrix: &DMatrix<f64>) -> Result<usize, MarkovError> {
    if matrix.nrows() != matrix.ncols() {
        return Err(MarkovError::DegenerateInput(format!(
            "matrix is {}x{}, expected square",
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    Ok(matrix.nrows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use approx::assert_relative_eq;

    fn universe() -> Vec<Interpretation> {
        vec![
            Interpretation::from_bits(&[0, 0, 1]),
            Interpretation::from_bits(&[0, 1, 1]),
            Interpretation::from_bits(&[1, 0, 0]),
            Interpretation::from_bits(&[1, 1, 1]),
        ]
    }

    /// The worked 3-agent fixture from the influence-graph tests.
    fn triangle() -> InfluenceGraph {
        let agents = vec![
            Agent::from_model("A", Interpretation::from_bits(&[1, 0, 0])),
            Agent::from_model("B", Interpretation::from_bits(&[1, 1, 1])),
            Agent::from_model("C", Interpretation::from_bits(&[0, 0, 1])),
        ];
        let mut graph = InfluenceGraph::from_models(universe(), agents).unwrap();
        let (a, b, c) = (
            graph.id_of("A").unwrap(),
            graph.id_of("B").unwrap(),
            graph.id_of("C").unwrap(),
        );
        graph.add_connections(a, vec![a, b, c]).unwrap();
        graph.add_connections(b, vec![a, b]).unwrap();
        graph.add_connections(c, vec![c]).unwrap();
        graph
    }

    #[test]
    fn test_snapshot_shapes() {
        let model = MarkovModel::new(&triangle()).unwrap();

        assert_eq!(model.model_matrix().shape(), (3, 4));
        assert_eq!(model.coordinate_matrix().shape(), (4, 3));
        assert_eq!(model.adjacency().shape(), (3, 3));
        assert_eq!(model.agent_names(), &["A", "B", "C"]);
    }

    #[test]
    fn test_adjacency_matches_topology() {
        let model = MarkovModel::new(&triangle()).unwrap();
        let expected = DMatrix::from_row_slice(
            3,
            3,
            &[
                1.0, 1.0, 1.0, // A -> {A, B, C}
                1.0, 1.0, 0.0, // B -> {A, B}
                0.0, 0.0, 1.0, // C -> {C}
            ],
        );
        assert_eq!(model.adjacency(), &expected);
    }

    #[test]
    fn test_enumeration_covers_the_product_space_once() {
        let model = MarkovModel::new(&triangle()).unwrap();

        assert_eq!(model.states().len(), 64); // 4^3
        let mut seen = std::collections::HashSet::new();
        for state in model.states() {
            assert!(seen.insert(state.assignment().to_vec()));
        }

        // Lexicographic product order, first agent slowest.
        assert_eq!(model.states()[0].assignment(), &[0, 0, 0]);
        assert_eq!(model.states()[1].assignment(), &[0, 0, 1]);
        assert_eq!(model.states()[4].assignment(), &[0, 1, 0]);
        assert_eq!(model.states()[16].assignment(), &[1, 0, 0]);
        assert_eq!(model.states()[63].assignment(), &[3, 3, 3]);
    }

    #[test]
    fn test_coordinate_round_trip() {
        let model = MarkovModel::new(&triangle()).unwrap();

        for state in model.states().iter().step_by(7) {
            let coord = model.encode_state(state).unwrap();
            assert_eq!(&model.decode_state(&coord).unwrap(), state);
        }

        // The snapshot's own coordinate matrix decodes to the agents'
        // representatives: A=(1,0,0)=index 2, B=(1,1,1)=3, C=(0,0,1)=0.
        let initial = model.decode_state(model.coordinate_matrix()).unwrap();
        assert_eq!(initial.assignment(), &[2, 3, 0]);
    }

    #[test]
    fn test_decode_rejects_malformed_columns() {
        let model = MarkovModel::new(&triangle()).unwrap();

        let empty_column = DMatrix::zeros(4, 3);
        assert!(matches!(
            model.decode_state(&empty_column),
            Err(MarkovError::DegenerateInput(_))
        ));

        let mut doubled = DMatrix::zeros(4, 3);
        doubled[(0, 0)] = 1.0;
        doubled[(1, 0)] = 1.0;
        doubled[(0, 1)] = 1.0;
        doubled[(0, 2)] = 1.0;
        assert!(matches!(
            model.decode_state(&doubled),
            Err(MarkovError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_model_distances_rejects_width_mismatch() {
        let a = DMatrix::zeros(2, 3);
        let b = DMatrix::zeros(4, 2);
        assert_eq!(
            MarkovModel::model_distances(&a, &b),
            Err(MarkovError::Interpretation(
                InterpretationError::LengthMismatch { left: 3, right: 4 }
            ))
        );
    }

    #[test]
    fn test_update_from_state_marks_all_minima() {
        let model = MarkovModel::new(&triangle()).unwrap();
        // A=(1,0,0), B=(1,1,1), C=(0,0,1): the fixture's initial state.
        let state = JointState::new(vec![2, 3, 0]);
        let ties = model.update_from_state(&state).unwrap();

        // A (scores 4,5,4,4) ties on {0,2,3}; B (4,4,2,2) on {2,3};
        // C (0,...) keeps its own model {0}.
        let expected = DMatrix::from_row_slice(
            4,
            3,
            &[
                1.0, 0.0, 1.0, //
                0.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                1.0, 1.0, 0.0, //
            ],
        );
        assert_eq!(ties, expected);

        let next = model.possible_next_states(&ties).unwrap();
        assert_eq!(next.len(), 6); // 3 * 2 * 1
    }

    #[test]
    fn test_update_from_state_is_pure() {
        let model = MarkovModel::new(&triangle()).unwrap();
        let state = JointState::new(vec![1, 2, 3]);
        assert_eq!(
            model.update_from_state(&state).unwrap(),
            model.update_from_state(&state).unwrap()
        );
    }

    #[test]
    fn test_transition_rows_are_stochastic() {
        let model = MarkovModel::new(&triangle()).unwrap();
        let transition = model.transition_matrix().unwrap();

        assert_eq!(transition.shape(), (64, 64));
        for i in 0..transition.nrows() {
            assert_relative_eq!(transition.row(i).sum(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_stationary_of_triangle_chain() {
        let model = MarkovModel::new(&triangle()).unwrap();
        let transition = model.transition_matrix().unwrap();
        let stationary = MarkovModel::find_stationary(&transition).unwrap();

        assert_eq!(stationary.len(), 64);
        assert_relative_eq!(stationary.sum(), 1.0, epsilon = 1e-9);
        for &p in stationary.iter() {
            assert!(p > -1e-9, "negative stationary mass: {p}");
        }

        // Invariance under one step: pi P = pi.
        let stepped = transition.transpose() * &stationary;
        assert_relative_eq!((stepped - &stationary).norm(), 0.0, epsilon = 1e-8);
    }

    #[test]
    fn test_stationary_of_two_state_chain() {
        let transition = DMatrix::from_row_slice(2, 2, &[0.5, 0.5, 0.25, 0.75]);
        let stationary = MarkovModel::find_stationary(&transition).unwrap();

        assert_relative_eq!(stationary[0], 1.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(stationary[1], 2.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_stationary_requires_a_unit_eigenvalue() {
        let shrinking = DMatrix::from_row_slice(2, 2, &[0.5, 0.0, 0.0, 0.5]);
        assert_eq!(
            MarkovModel::find_stationary(&shrinking),
            Err(MarkovError::NoStationaryDistributionFound)
        );
    }

    #[test]
    fn test_fast_power_converges_to_the_stationary_rows() {
        let transition = DMatrix::from_row_slice(2, 2, &[0.5, 0.5, 0.25, 0.75]);
        let limit = MarkovModel::fast_power(&transition, 1000).unwrap();

        for i in 0..2 {
            assert_relative_eq!(limit[(i, 0)], 1.0 / 3.0, epsilon = 1e-9);
            assert_relative_eq!(limit[(i, 1)], 2.0 / 3.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_fast_power_at_exponent_zero_is_identity() {
        let transition = DMatrix::from_row_slice(2, 2, &[0.5, 0.5, 0.25, 0.75]);
        let powered = MarkovModel::fast_power(&transition, 0).unwrap();
        assert_relative_eq!((powered - DMatrix::identity(2, 2)).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fast_power_rejects_defective_matrices() {
        // A Jordan block: eigenvalue 1 twice, one-dimensional eigenspace.
        let shear = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 0.0, 1.0]);
        assert_eq!(
            MarkovModel::fast_power(&shear, 1000),
            Err(MarkovError::NotDiagonalizable)
        );
    }

    #[test]
    fn test_fast_power_handles_permutation_cycle() {
        // Swap matrix: eigenvalues 1 and -1; even powers are the identity.
        let swap = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]);
        let powered = MarkovModel::fast_power(&swap, 1000).unwrap();
        assert_relative_eq!((powered - DMatrix::identity(2, 2)).norm(), 0.0, epsilon = 1e-8);
    }

    #[test]
    fn test_snapshot_rejects_representative_outside_universe() {
        let agents = vec![Agent::from_model(
            "A",
            Interpretation::from_bits(&[0, 0, 0]), // not a model of the theory
        )];
        let graph = InfluenceGraph::from_models(universe(), agents).unwrap();
        assert!(matches!(
            MarkovModel::new(&graph),
            Err(MarkovError::DegenerateInput(_))
        ));
    }
}
