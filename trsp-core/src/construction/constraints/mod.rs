//! Provides constraints which decide whether a node can be inserted at a given position of the tour.

#[cfg(test)]
#[path = "../../../tests/unit/construction/constraints/constraints_test.rs"]
mod constraints_test;

use crate::models::common::NodeId;
use crate::models::solution::Tour;
use std::sync::Arc;

mod resources;
pub use self::resources::{SparePartsConstraint, ToolsConstraint};

mod routing;
pub use self::routing::{CompatibilityConstraint, TourBoundsConstraint};

mod time_window;
pub use self::time_window::TimeWindowConstraint;

/// Specifies how deep an insertion is checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeasibilityMode {
    /// The arrival at the successor is verified against its latest feasible arrival time, so the rest
    /// of the tour is known to stay feasible.
    #[default]
    Forward,
    /// Only the inserted node itself is verified.
    Local,
}

/// A result of an insertion check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeasibilityState {
    /// Whether insertion at the position is feasible.
    pub feasible: bool,
    /// Whether insertion at some position after this one can still be feasible.
    pub forward_feasible: bool,
}

impl FeasibilityState {
    /// Insertion is feasible.
    pub const FEASIBLE: Self = Self { feasible: true, forward_feasible: true };

    /// Insertion is infeasible here, but later positions are worth checking.
    pub const SKIP: Self = Self { feasible: false, forward_feasible: true };

    /// Insertion is infeasible here and at every later position.
    pub const STOP: Self = Self { feasible: false, forward_feasible: false };
}

/// Checks whether `node` can be inserted between `pred` and `succ` of the tour.
pub trait ConstraintChecker: Send + Sync {
    /// Checks insertion feasibility at given position.
    fn check_insertion(
        &self,
        tour: &Tour,
        pred: Option<NodeId>,
        node: NodeId,
        succ: Option<NodeId>,
        mode: FeasibilityMode,
    ) -> FeasibilityState;

    /// Returns whether insertion at given position is feasible.
    fn is_feasible(&self, tour: &Tour, pred: Option<NodeId>, node: NodeId, succ: Option<NodeId>, mode: FeasibilityMode) -> bool {
        self.check_insertion(tour, pred, node, succ, mode).feasible
    }
}

/// Combines multiple constraints: insertion is feasible only if all of them agree.
pub struct TourConstraintHandler {
    constraints: Vec<Arc<dyn ConstraintChecker>>,
}

impl TourConstraintHandler {
    /// Creates a new instance of `TourConstraintHandler`.
    pub fn new(constraints: Vec<Arc<dyn ConstraintChecker>>) -> Self {
        Self { constraints }
    }

    /// Adds a constraint.
    pub fn add_constraint(mut self, constraint: Arc<dyn ConstraintChecker>) -> Self {
        self.constraints.push(constraint);
        self
    }
}

impl Default for TourConstraintHandler {
    /// Creates a handler with compatibility, tour bounds, time window, tools and spare parts constraints.
    fn default() -> Self {
        Self::new(vec![
            Arc::new(CompatibilityConstraint),
            Arc::new(TourBoundsConstraint),
            Arc::new(TimeWindowConstraint),
            Arc::new(ToolsConstraint),
            Arc::new(SparePartsConstraint),
        ])
    }
}

impl ConstraintChecker for TourConstraintHandler {
    fn check_insertion(
        &self,
        tour: &Tour,
        pred: Option<NodeId>,
        node: NodeId,
        succ: Option<NodeId>,
        mode: FeasibilityMode,
    ) -> FeasibilityState {
        self.constraints.iter().try_fold(FeasibilityState::FEASIBLE, |state, constraint| {
            let result = constraint.check_insertion(tour, pred, node, succ, mode);
            let state = FeasibilityState {
                feasible: state.feasible && result.feasible,
                forward_feasible: state.forward_feasible && result.forward_feasible,
            };

            if state.forward_feasible { Ok(state) } else { Err(state) }
        })
        .unwrap_or_else(|state| state)
    }
}
