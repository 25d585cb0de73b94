#[cfg(test)]
#[path = "../../../tests/unit/construction/costs/working_time_test.rs"]
mod working_time_test;

use crate::models::common::{Cost, Duration, NodeId, Timestamp};
use crate::models::solution::{CostDelegate, Tour};
use crate::utils::is_same_float;

/// Evaluates tours by their working time: from the technician's start to the departure from the last node.
///
/// Detours are evaluated using arrival times cached in the tour, so the tour has to be auto updated.
#[derive(Clone, Debug, Default)]
pub struct WorkingTimeDelegate;

impl WorkingTimeDelegate {
    /// Simulates the tour where the part between `pred` and `succ` is replaced by `node` (or by nothing)
    /// and returns the new working time.
    fn simulate(&self, tour: &Tour, pred: Option<NodeId>, node: Option<NodeId>, succ: Option<NodeId>) -> Duration {
        let instance = tour.instance();
        let technician = tour.technician_id();
        let start = instance.time_window(tour.technician().home).start;

        let mut current: Option<(NodeId, Timestamp)> = pred.map(|pred| (pred, tour.earliest_arrival_time(pred)));
        let rest = succ.into_iter().flat_map(|succ| tour.iter_from(succ));

        for next in node.into_iter().chain(rest) {
            let arrival = match current {
                Some((pred, pred_arrival)) => instance.arrival_time(next, pred, pred_arrival, technician),
                None => start,
            };

            if Some(next) != node && is_same_float(arrival, tour.earliest_arrival_time(next)) {
                // arrival is not changed, so the rest of the tour is the same
                return tour.duration();
            }

            current = Some((next, arrival));
        }

        current.map_or(0., |(last, arrival)| {
            instance.time_window(last).earliest_start_of_service(arrival) + instance.service_time(last) - start
        })
    }
}

impl CostDelegate for WorkingTimeDelegate {
    fn evaluate_tour(&self, tour: &Tour) -> Cost {
        let instance = tour.instance();
        let technician = tour.technician_id();
        let start = instance.time_window(tour.technician().home).start;

        let departure = tour.iter().fold(None, |current: Option<(NodeId, Timestamp)>, node| {
            let arrival = match current {
                Some((pred, departure)) => departure + instance.travel_time(pred, node, technician),
                None => start,
            };
            let departure = instance.time_window(node).earliest_start_of_service(arrival) + instance.service_time(node);

            Some((node, departure))
        });

        departure.map_or(0., |(_, departure)| departure - start)
    }

    fn update_tour(&self, tour: &mut Tour, from: Option<NodeId>) -> Cost {
        let start = tour.first_node().map_or(0., |first| tour.earliest_arrival_time(first));
        let from = from.filter(|&node| tour.is_visited(node)).or(tour.first_node());

        let mut cursor = from;
        while let Some(node) = cursor {
            let cost = tour.earliest_departure_time(node) - start;
            tour.set_cumulative_cost(node, cost);
            cursor = tour.succ(node);
        }

        let total = tour.duration();
        tour.set_total_cost(total);

        total
    }

    fn evaluate_detour(
        &self,
        tour: &Tour,
        pred: Option<NodeId>,
        node: NodeId,
        succ: Option<NodeId>,
        is_removal: bool,
    ) -> Cost {
        debug_assert!(tour.is_auto_updated(), "working time detour requires an auto updated tour");

        if is_removal {
            tour.duration() - self.simulate(tour, pred, None, succ)
        } else {
            self.simulate(tour, pred, Some(node), succ) - tour.duration()
        }
    }
}
