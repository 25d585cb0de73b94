use super::*;

/// Checks time windows of the inserted node and, in forward mode, the latest feasible arrival at the successor.
#[derive(Clone, Debug, Default)]
pub struct TimeWindowConstraint;

impl ConstraintChecker for TimeWindowConstraint {
    fn check_insertion(
        &self,
        tour: &Tour,
        pred: Option<NodeId>,
        node: NodeId,
        succ: Option<NodeId>,
        mode: FeasibilityMode,
    ) -> FeasibilityState {
        let instance = tour.instance();
        let technician = tour.technician_id();
        let time_window = instance.time_window(node);

        if pred.is_some_and(|pred| !instance.is_arc_feasible(pred, node))
            || succ.is_some_and(|succ| !instance.is_arc_feasible(node, succ))
        {
            return FeasibilityState::SKIP;
        }

        let arrival = match pred {
            Some(pred) => {
                let departure = tour.earliest_departure_time(pred);
                // departure is not decreasing along the tour, so no later predecessor can help
                if departure > time_window.end {
                    return FeasibilityState::STOP;
                }

                departure + instance.travel_time(pred, node, technician)
            }
            None => instance.time_window(tour.technician().home).start,
        };

        if !time_window.is_feasible(arrival) {
            return FeasibilityState::SKIP;
        }

        match (succ, mode) {
            (Some(succ), FeasibilityMode::Forward) => {
                let succ_arrival = time_window.earliest_start_of_service(arrival)
                    + instance.service_time(node)
                    + instance.travel_time(node, succ, technician);

                if succ_arrival > tour.latest_feasible_arrival_time(succ) {
                    FeasibilityState::SKIP
                } else {
                    FeasibilityState::FEASIBLE
                }
            }
            _ => FeasibilityState::FEASIBLE,
        }
    }
}
