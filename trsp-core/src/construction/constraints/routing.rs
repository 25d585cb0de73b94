use super::*;

/// Allows only nodes which the tour's technician is compatible with: skills and reachability for
/// requests, own main depot duplicate for depots.
#[derive(Clone, Debug, Default)]
pub struct CompatibilityConstraint;

impl ConstraintChecker for CompatibilityConstraint {
    fn check_insertion(&self, tour: &Tour, _: Option<NodeId>, node: NodeId, _: Option<NodeId>, _: FeasibilityMode) -> FeasibilityState {
        if tour.instance().is_compatible(tour.technician_id(), node) {
            FeasibilityState::FEASIBLE
        } else {
            FeasibilityState::STOP
        }
    }
}

/// Keeps technician's home first and its duplicate last in an initialized tour.
#[derive(Clone, Debug, Default)]
pub struct TourBoundsConstraint;

impl ConstraintChecker for TourBoundsConstraint {
    fn check_insertion(
        &self,
        tour: &Tour,
        pred: Option<NodeId>,
        _: NodeId,
        succ: Option<NodeId>,
        _: FeasibilityMode,
    ) -> FeasibilityState {
        let technician = tour.technician();

        if succ.is_none() && tour.last_node() == Some(technician.home_duplicate) {
            FeasibilityState::STOP
        } else if pred.is_none() && tour.first_node() == Some(technician.home) {
            FeasibilityState::SKIP
        } else {
            FeasibilityState::FEASIBLE
        }
    }
}
