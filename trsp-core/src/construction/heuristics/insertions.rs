#[cfg(test)]
#[path = "../../../tests/unit/construction/heuristics/insertions_test.rs"]
mod insertions_test;

use crate::construction::constraints::{ConstraintChecker, FeasibilityMode};
use crate::models::common::{Cost, NodeId, UNLIMITED_SPARE_PARTS};
use crate::models::solution::{CostDelegate, Tour, TourError};
use crate::utils::{GenericError, compare_floats};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// An error returned when an insertion move cannot be executed.
#[derive(Clone, Debug, PartialEq)]
pub enum MoveError {
    /// The move was evaluated as infeasible.
    Infeasible,
    /// The move belongs to another technician's tour.
    WrongTour {
        /// Technician of the move.
        expected: usize,
        /// Technician of the tour.
        actual: usize,
    },
    /// The insertion position does not exist anymore.
    Stale {
        /// Expected predecessor.
        pred: Option<NodeId>,
        /// Expected successor.
        succ: Option<NodeId>,
    },
    /// The tour rejected the insertion.
    Tour(TourError),
}

impl Display for MoveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveError::Infeasible => write!(f, "move is infeasible"),
            MoveError::WrongTour { expected, actual } => {
                write!(f, "move for technician {expected} is applied to tour of technician {actual}")
            }
            MoveError::Stale { pred, succ } => write!(f, "nodes {pred:?} and {succ:?} are not adjacent anymore"),
            MoveError::Tour(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for MoveError {}

impl From<TourError> for MoveError {
    fn from(value: TourError) -> Self {
        MoveError::Tour(value)
    }
}

impl From<MoveError> for GenericError {
    fn from(value: MoveError) -> Self {
        value.to_string().into()
    }
}

/// Describes insertion of a node into a technician's tour between two adjacent nodes.
///
/// Cost and feasibility are evaluated once against the tour state at the moment of creation.
/// A move can plan a trip to the main depot together with the insertion: then the technician's
/// main depot duplicate is inserted before `depot_succ`.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertionMove {
    /// Inserted node.
    pub node: NodeId,
    /// Technician whose tour is modified.
    pub technician: usize,
    /// Predecessor of the inserted node, `None` means the tour head.
    pub pred: Option<NodeId>,
    /// Successor of the inserted node, `None` means the tour end.
    pub succ: Option<NodeId>,
    /// A node before which the main depot visit is planned, it is either the inserted node itself or
    /// a node visited before it. `None` means no main depot trip.
    pub depot_succ: Option<NodeId>,
    /// Marginal cost of the insertion including the main depot trip.
    pub cost: Cost,
    /// Whether the insertion is feasible.
    pub feasible: bool,
}

impl InsertionMove {
    /// Creates a new feasible insertion move.
    pub fn new(node: NodeId, technician: usize, pred: Option<NodeId>, succ: Option<NodeId>, cost: Cost) -> Self {
        Self { node, technician, pred, succ, depot_succ: None, cost, feasible: true }
    }

    /// Creates a new feasible insertion move which visits the main depot before `depot_succ`.
    pub fn new_with_depot_trip(
        node: NodeId,
        technician: usize,
        pred: Option<NodeId>,
        succ: Option<NodeId>,
        depot_succ: NodeId,
        cost: Cost,
    ) -> Self {
        Self { node, technician, pred, succ, depot_succ: Some(depot_succ), cost, feasible: true }
    }

    /// Creates a move which marks that the node cannot be inserted into the technician's tour.
    pub fn infeasible(node: NodeId, technician: usize) -> Self {
        Self { node, technician, pred: None, succ: None, depot_succ: None, cost: Cost::INFINITY, feasible: false }
    }

    /// Checks whether the move plans a trip to the main depot.
    pub fn is_depot_trip(&self) -> bool {
        self.depot_succ.is_some()
    }

    /// Returns the position of the main depot visit in the tour before the move is executed.
    pub fn depot_position(&self, tour: &Tour) -> Option<(Option<NodeId>, Option<NodeId>)> {
        self.depot_succ.map(|depot_succ| {
            if depot_succ == self.node { (self.pred, self.succ) } else { (tour.pred(depot_succ), Some(depot_succ)) }
        })
    }

    /// Checks whether the insertion position still exists in the tour.
    pub fn is_applicable(&self, tour: &Tour) -> bool {
        let is_position_valid = match self.pred {
            Some(pred) => tour.is_visited(pred) && tour.succ(pred) == self.succ,
            None => tour.first_node() == self.succ,
        };

        is_position_valid
            && match self.depot_succ {
                None => true,
                Some(depot_succ) if depot_succ == self.node => !tour.is_visited(tour.technician().main_depot_duplicate),
                Some(depot_succ) => {
                    !tour.is_visited(tour.technician().main_depot_duplicate)
                        && self.pred.and_then(|pred| tour.node_position(pred)).zip(tour.node_position(depot_succ)).is_some_and(
                            |(pred_idx, depot_succ_idx)| depot_succ_idx <= pred_idx,
                        )
                }
            }
    }

    /// Inserts the node into the tour.
    pub fn execute(&self, tour: &mut Tour) -> Result<(), MoveError> {
        if !self.feasible {
            return Err(MoveError::Infeasible);
        }

        if tour.technician_id() != self.technician {
            return Err(MoveError::WrongTour { expected: self.technician, actual: tour.technician_id() });
        }

        if !self.is_applicable(tour) {
            return Err(MoveError::Stale { pred: self.pred, succ: self.succ });
        }

        tour.insert_after(self.pred, self.node)?;

        if let Some(depot_succ) = self.depot_succ {
            tour.insert_before(Some(depot_succ), tour.technician().main_depot_duplicate)?;
        }

        Ok(())
    }
}

impl Display for InsertionMove {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ins({} in t{}: {:?} -> {:?}, ", self.node, self.technician, self.pred, self.succ)?;
        if let Some(depot_succ) = self.depot_succ {
            write!(f, "depot before {depot_succ}, ")?;
        }
        write!(f, "cost={}, feasible={})", self.cost, self.feasible)
    }
}

/// Finds the cheapest feasible position to insert `node` into the tour. Positions are scanned from the
/// head: before the first node, between every pair of adjacent nodes and after the last node. Among
/// positions with equal cost the earliest one wins.
///
/// When no position is feasible, the tour does not visit the main depot yet and the technician lacks
/// tools or spare parts for the node, positions which visit the main depot before the node are scanned.
///
/// Returns an infeasible move if no position passes the constraint check. The tour is not modified.
pub fn best_insertion(
    node: NodeId,
    tour: &Tour,
    cost_delegate: &dyn CostDelegate,
    constraints: &dyn ConstraintChecker,
    mode: FeasibilityMode,
) -> InsertionMove {
    let technician = tour.technician_id();
    if tour.is_visited(node) || !tour.instance().is_compatible(technician, node) {
        return InsertionMove::infeasible(node, technician);
    }

    let mut best = InsertionMove::infeasible(node, technician);
    scan_positions(tour, None, |pred, succ| {
        let state = constraints.check_insertion(tour, pred, node, succ, mode);

        if state.feasible {
            let cost = cost_delegate.insertion_cost(tour, pred, node, succ);
            if !best.feasible || compare_floats(cost, best.cost) == Ordering::Less {
                best = InsertionMove::new(node, technician, pred, succ, cost);
            }
        }

        state.forward_feasible
    });

    if best.feasible || !is_depot_trip_needed(tour, node) {
        return best;
    }

    best_depot_trip_insertion(node, tour, cost_delegate, constraints, mode)
}

/// Returns a copy of the tour where the main depot duplicate is inserted after `depot_pred`.
pub(crate) fn with_depot_visit(tour: &Tour, depot_pred: Option<NodeId>) -> Option<Tour> {
    let mut copy = tour.clone();
    copy.insert_after(depot_pred, tour.technician().main_depot_duplicate).ok().map(|_| copy)
}

/// Calls `visit` with every `(pred, succ)` position starting after `start` (before the head if `None`)
/// until it returns false.
fn scan_positions(tour: &Tour, start: Option<NodeId>, mut visit: impl FnMut(Option<NodeId>, Option<NodeId>) -> bool) {
    let head = start.is_none().then_some((None, tour.first_node()));
    let rest = start.or(tour.first_node()).into_iter().flat_map(|from| tour.iter_from(from)).map(|pred| (Some(pred), tour.succ(pred)));

    for (pred, succ) in head.into_iter().chain(rest) {
        if !visit(pred, succ) {
            break;
        }
    }
}

fn is_depot_trip_needed(tour: &Tour, node: NodeId) -> bool {
    let instance = tour.instance();
    let technician = tour.technician();

    let Some(first) = tour.first_node() else {
        return false;
    };

    let is_depot_visited = tour.last_node().is_some_and(|last| tour.is_main_depot_visited(last));
    if !instance.is_request(node) || is_depot_visited {
        return false;
    }

    let lacks_parts = technician.spare_parts.iter().enumerate().any(|(part, &carried)| {
        let required = instance.spare_part_requirement(node, part);
        required > 0 && carried != UNLIMITED_SPARE_PARTS && carried - tour.required_spare_parts(first, part) < required
    });

    lacks_parts || !instance.has_required_tools(technician.id, node)
}

/// Scans every main depot position and, for each, every position of the node after it. The cost of
/// such move is the cost of the depot detour plus the cost of the node insertion into the tour which
/// already visits the depot.
fn best_depot_trip_insertion(
    node: NodeId,
    tour: &Tour,
    cost_delegate: &dyn CostDelegate,
    constraints: &dyn ConstraintChecker,
    mode: FeasibilityMode,
) -> InsertionMove {
    let technician = tour.technician_id();
    let depot = tour.technician().main_depot_duplicate;

    let mut best = InsertionMove::infeasible(node, technician);
    scan_positions(tour, None, |depot_pred, depot_succ| {
        let depot_state = constraints.check_insertion(tour, depot_pred, depot, depot_succ, mode);

        if let Some(with_depot) = depot_state.feasible.then(|| with_depot_visit(tour, depot_pred)).flatten() {
            let depot_cost = cost_delegate.insertion_cost(tour, depot_pred, depot, depot_succ);

            scan_positions(&with_depot, Some(depot), |pred, succ| {
                let state = constraints.check_insertion(&with_depot, pred, node, succ, mode);

                if state.feasible {
                    let cost = depot_cost + cost_delegate.insertion_cost(&with_depot, pred, node, succ);
                    if !best.feasible || compare_floats(cost, best.cost) == Ordering::Less {
                        best = match (pred, depot_succ) {
                            (Some(pred), Some(depot_succ)) if pred != depot => {
                                InsertionMove::new_with_depot_trip(node, technician, Some(pred), succ, depot_succ, cost)
                            }
                            // the depot is visited right before the node
                            _ => InsertionMove::new_with_depot_trip(node, technician, depot_pred, succ, node, cost),
                        };
                    }
                }

                state.forward_feasible
            });
        }

        depot_state.forward_feasible
    });

    best
}
