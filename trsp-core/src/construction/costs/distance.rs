#[cfg(test)]
#[path = "../../../tests/unit/construction/costs/distance_test.rs"]
mod distance_test;

use crate::models::common::{Cost, NodeId};
use crate::models::solution::{CostDelegate, Tour};

/// Evaluates tours by the total travelled distance.
#[derive(Clone, Debug, Default)]
pub struct DistanceDelegate;

impl CostDelegate for DistanceDelegate {
    fn evaluate_tour(&self, tour: &Tour) -> Cost {
        let instance = tour.instance();

        tour.iter().zip(tour.iter().skip(1)).map(|(from, to)| instance.distance(from, to)).sum()
    }

    fn update_tour(&self, tour: &mut Tour, from: Option<NodeId>) -> Cost {
        let instance = tour.instance().clone();
        let start = from.filter(|&node| tour.is_visited(node)).or(tour.first_node());

        let mut pred = start.and_then(|start| tour.pred(start));
        let mut cursor = start;
        while let Some(node) = cursor {
            let cost = pred.map_or(0., |pred| tour.cumulative_cost(pred) + instance.distance(pred, node));
            tour.set_cumulative_cost(node, cost);

            pred = Some(node);
            cursor = tour.succ(node);
        }

        let total = tour.last_node().map_or(0., |last| tour.cumulative_cost(last));
        tour.set_total_cost(total);

        total
    }

    fn evaluate_detour(&self, tour: &Tour, pred: Option<NodeId>, node: NodeId, succ: Option<NodeId>, _: bool) -> Cost {
        let instance = tour.instance();

        match (pred, succ) {
            (Some(pred), Some(succ)) => {
                instance.distance(pred, node) + instance.distance(node, succ) - instance.distance(pred, succ)
            }
            (Some(pred), None) => instance.distance(pred, node),
            (None, Some(succ)) => instance.distance(node, succ),
            (None, None) => 0.,
        }
    }
}
