use crate::algorithms::structures::BitVec;
use crate::construction::costs::DistanceDelegate;
use crate::models::common::{NodeId, UNLIMITED_SPARE_PARTS};
use crate::models::problem::Instance;
use crate::models::solution::{CostDelegate, Solution, Tour};
use std::sync::Arc;

/// Creates an initialized tour of the technician which visits given nodes between home and home duplicate.
pub fn create_test_tour(instance: Arc<Instance>, technician: usize, nodes: &[NodeId]) -> Tour {
    create_test_tour_with_delegate(instance, technician, nodes, Arc::new(DistanceDelegate))
}

pub fn create_test_tour_with_delegate(
    instance: Arc<Instance>,
    technician: usize,
    nodes: &[NodeId],
    cost_delegate: Arc<dyn CostDelegate>,
) -> Tour {
    let mut tour = Tour::new(instance, technician, cost_delegate);
    tour.initialize().expect("cannot initialize tour");

    let home_duplicate = tour.technician().home_duplicate;
    nodes.iter().for_each(|&node| tour.insert_before(Some(home_duplicate), node).expect("cannot insert node"));

    tour
}

/// Creates a solution with initialized tours evaluated by distance.
pub fn create_test_solution(instance: Arc<Instance>) -> Solution {
    let mut solution = Solution::new(instance, Arc::new(DistanceDelegate));
    solution.initialize_tours().expect("cannot initialize tours");

    solution
}

pub fn get_tour_nodes(tour: &Tour) -> Vec<NodeId> {
    tour.iter().collect()
}

fn is_same(left: f64, right: f64) -> bool {
    left == right || (left.is_nan() && right.is_nan()) || (left - right).abs() < 1E-9
}

/// Recomputes derived state of the tour from scratch and compares it with the cached one.
pub fn assert_tour_state(tour: &Tour) {
    let instance = tour.instance();
    let technician = tour.technician();
    let parts = instance.dimensions().spare_parts;
    let nodes = get_tour_nodes(tour);

    assert_eq!(nodes.len(), tour.length());
    assert_eq!(tour.first_node(), nodes.first().copied());
    assert_eq!(tour.last_node(), nodes.last().copied());
    assert_eq!(tour.iter_rev().collect::<Vec<_>>(), nodes.iter().rev().copied().collect::<Vec<_>>());

    let mut pred: Option<NodeId> = None;
    let mut arrival = f64::NAN;
    let mut cumulative_waiting = 0.;
    let mut tools = technician.tools.clone();
    let mut spare_parts = technician.spare_parts.clone();
    let mut depot_visited = false;

    for &node in nodes.iter() {
        assert_eq!(tour.pred(node), pred, "wrong pred of {node}");
        if let Some(pred) = pred {
            assert_eq!(tour.succ(pred), Some(node), "wrong succ of {pred}");
        }

        arrival = match pred {
            Some(pred) => instance.arrival_time(node, pred, arrival, technician.id),
            None => instance.time_window(technician.home).start,
        };
        let waiting = instance.time_window(node).waiting(arrival);
        cumulative_waiting += waiting;

        if instance.is_main_depot(node) {
            tools = BitVec::new_full(instance.dimensions().tools);
        }
        for (part, amount) in spare_parts.iter_mut().enumerate() {
            *amount = if instance.is_main_depot(node) {
                UNLIMITED_SPARE_PARTS
            } else if *amount == UNLIMITED_SPARE_PARTS {
                UNLIMITED_SPARE_PARTS
            } else {
                *amount - instance.spare_part_requirement(node, part)
            };
        }
        depot_visited |= instance.is_main_depot(node);

        assert!(is_same(tour.earliest_arrival_time(node), arrival), "wrong arrival at {node}");
        assert!(is_same(tour.waiting_time(node), waiting), "wrong waiting at {node}");
        assert_eq!(tour.available_tools(node), &tools, "wrong tools at {node}");
        (0..parts).for_each(|part| assert_eq!(tour.available_spare_parts(node, part), spare_parts[part]));
        assert_eq!(tour.is_main_depot_visited(node), depot_visited, "wrong depot flag at {node}");

        if let Some(first) = tour.first_node() {
            let expected = if node == first { 0. } else { cumulative_waiting - waiting - tour.waiting_time(first) };
            assert!(is_same(tour.waiting_time_between(first, node), expected), "wrong waiting between {first} and {node}");
        }

        pred = Some(node);
    }
    if let Some(&last) = nodes.last() {
        assert_eq!(tour.succ(last), None);
    }

    let mut latest = f64::NAN;
    let mut required = vec![0; parts];
    let mut succ: Option<NodeId> = None;
    for &node in nodes.iter().rev() {
        let end = instance.time_window(node).end;
        latest = match succ {
            Some(succ) => end.min(latest - instance.service_time(node) - instance.travel_time(node, succ, technician.id)),
            None => end,
        };
        for (part, amount) in required.iter_mut().enumerate() {
            *amount = if instance.is_main_depot(node) { 0 } else { *amount + instance.spare_part_requirement(node, part) };
        }

        assert!(is_same(tour.latest_feasible_arrival_time(node), latest), "wrong latest arrival at {node}");
        (0..parts).for_each(|part| assert_eq!(tour.required_spare_parts(node, part), required[part]));

        succ = Some(node);
    }

    assert!(is_same(tour.total_cost(), tour.cost_delegate().evaluate_tour(tour)), "wrong total cost");
}
